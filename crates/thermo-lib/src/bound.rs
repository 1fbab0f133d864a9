use crate::{Error, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BoundMode {
    #[default]
    Auto,
    Manual,
}

/// Auto/manual choice for one axis bound, plus the text typed for manual mode.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundControl {
    pub label: String,
    pub mode: BoundMode,
    pub manual_text: String,
}

impl BoundControl {
    pub fn new(label: impl Into<String>, initial: i64) -> Self {
        Self {
            label: label.into(),
            mode: BoundMode::Auto,
            manual_text: initial.to_string(),
        }
    }

    pub fn is_auto(&self) -> bool {
        self.mode == BoundMode::Auto
    }

    /// The text field only accepts input in manual mode.
    pub fn text_enabled(&self) -> bool {
        self.mode == BoundMode::Manual
    }

    pub fn manual_value(&self) -> Result<i64> {
        self.manual_text
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidBound {
                bound: self.label.clone(),
                value: self.manual_text.clone(),
            })
    }

    /// `auto` is only used in auto mode; the text is only parsed in manual mode.
    pub fn resolve(&self, auto: f64) -> Result<f64> {
        match self.mode {
            BoundMode::Auto => Ok(auto),
            BoundMode::Manual => self.manual_value().map(|v| v as f64),
        }
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "thermoplot.toml";

/// Window and export settings. Every key is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_title: String,
    /// Saved figure size in inches, multiplied by `dpi` for the PNG.
    pub figure_inches: [f64; 2],
    pub dpi: u32,
    pub x_min_default: i64,
    pub x_max_default: i64,
    pub threshold_default: String,
    pub pick_radius_px: f64,
    pub export_file_name: String,
    pub export_sheet_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "Thermal Testing Data Analysis".into(),
            figure_inches: [10.0, 8.0],
            dpi: 120,
            x_min_default: 0,
            x_max_default: 400,
            threshold_default: "0".into(),
            pick_radius_px: 5.0,
            export_file_name: "testreport_new.xlsx".into(),
            export_sheet_name: "Pics".into(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Falls back to defaults when the file is absent or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("ignoring config: {err:#}");
                Self::default()
            }
        }
    }

    /// PNG size in pixels.
    pub fn png_size(&self) -> (u32, u32) {
        let dpi = self.dpi.max(1) as f64;
        let w = (self.figure_inches[0] * dpi).round().max(1.0) as u32;
        let h = (self.figure_inches[1] * dpi).round().max(1.0) as u32;
        (w, h)
    }
}

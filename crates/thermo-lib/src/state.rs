use crate::bound::BoundControl;
use crate::config::AppConfig;
use crate::io::workbook::{SheetTable, Workbook};
use crate::plot::Figure;
use crate::signal::max_finite;
use crate::Result;

/// The flat lists the draw routines read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotState {
    pub time: Vec<f64>,
    pub data: Vec<f64>,
    /// `None` until a column is selected; nothing is plotted while unset.
    pub legend: Option<String>,
    pub threshold: Vec<f64>,
}

/// Everything the window shows, independent of any widget toolkit.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub workbook: Option<Workbook>,
    pub selected_sheet: Option<usize>,
    pub sheet: Option<SheetTable>,
    pub columns: Vec<String>,
    pub selected_column: Option<usize>,
    pub plot: PlotState,
    pub figure: Figure,
    pub x_min: BoundControl,
    pub x_max: BoundControl,
    pub threshold_text: String,
    pub grid: bool,
    pub status: String,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            x_min: BoundControl::new("X min", config.x_min_default),
            x_max: BoundControl::new("X max", config.x_max_default),
            threshold_text: config.threshold_default.clone(),
            config,
            workbook: None,
            selected_sheet: None,
            sheet: None,
            columns: Vec::new(),
            selected_column: None,
            plot: PlotState::default(),
            figure: Figure::default(),
            grid: false,
            status: "No workbook imported".into(),
        }
    }

    pub fn sheet_names(&self) -> &[String] {
        self.workbook
            .as_ref()
            .map(|wb| wb.sheet_names.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_sheet_name(&self) -> Option<&str> {
        self.selected_sheet
            .and_then(|i| self.sheet_names().get(i))
            .map(String::as_str)
    }

    /// Forget everything derived from a previously loaded sheet.
    pub fn reset_columns(&mut self) {
        self.sheet = None;
        self.columns.clear();
        self.selected_column = None;
        self.plot.time.clear();
        self.plot.data.clear();
        self.plot.legend = None;
    }

    /// Visible x-range for a primary draw: auto min is 0, auto max is the
    /// largest time value.
    pub fn x_bounds(&self) -> Result<(f64, f64)> {
        let auto_max = max_finite(&self.plot.time).unwrap_or(0.0);
        let xmax = self.x_max.resolve(auto_max)?;
        let xmin = self.x_min.resolve(0.0)?;
        Ok((xmin, xmax))
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        log::info!("{}", self.status);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

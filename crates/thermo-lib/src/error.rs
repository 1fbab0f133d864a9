use std::path::PathBuf;

/// Failures that end a single user action. The window stays alive.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no workbook imported; use File > Import first")]
    NoWorkbook,
    #[error("no sheet selected; pick a sheet from the list first")]
    NoSheetSelected,
    #[error("sheet index {index} is out of range ({count} sheets)")]
    SheetOutOfRange { index: usize, count: usize },
    #[error("no sheet loaded; press Column to load the selected sheet first")]
    SheetNotLoaded,
    #[error("column index {index} is out of range ({count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },
    #[error("{bound}: '{value}' is not an integer")]
    InvalidBound { bound: String, value: String },
    #[error("Tprochot: '{0}' is not a number")]
    InvalidThreshold(String),
    #[error("refusing to overwrite the source workbook {}", .0.display())]
    ExportWouldOverwrite(PathBuf),
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Precondition and input errors are expected during normal use.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

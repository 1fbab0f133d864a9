use crate::signal::Column;
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};

/// Extensions offered by the import dialog.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Column holding the time axis, counted from zero.
pub const TIME_COLUMN: usize = 1;

/// An imported spreadsheet: where it lives and which sheets it has.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheet_names: Vec<String>,
}

/// Read the sheet names of a workbook. The file is closed before returning.
pub fn open_workbook(path: &Path) -> Result<Workbook> {
    let book = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;
    let sheet_names = book.sheet_names();
    Ok(Workbook {
        path: path.to_path_buf(),
        sheet_names,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            Cell::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
            Cell::Empty => f64::NAN,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Cell::Number(v) => v.to_string(),
            Cell::Text(text) => text.clone(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(v) => Cell::Number(*v as f64),
            Data::Float(v) => Cell::Number(*v),
            Data::Bool(v) => Cell::Number(if *v { 1.0 } else { 0.0 }),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::String(text) => Cell::Text(text.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Rectangular copy of one sheet, anchored at cell A1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetTable {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    /// Rows shorter than the widest one are padded with empty cells.
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self {
            name: name.into(),
            rows,
        }
    }

    fn from_range(name: &str, range: &Range<Data>) -> Self {
        let Some((last_row, last_col)) = range.end() else {
            return Self::from_rows(name, Vec::new());
        };
        let rows = (0..=last_row)
            .map(|r| {
                (0..=last_col)
                    .map(|c| range.get_value((r, c)).map(Cell::from).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();
        Self::from_rows(name, rows)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// First-row labels.
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.iter().map(Cell::label).collect())
            .unwrap_or_default()
    }

    /// Column `index` below the header row. Every column of a sheet has the
    /// same length, so series taken from one table always line up.
    pub fn column(&self, index: usize) -> Option<Column> {
        if index >= self.width() {
            return None;
        }
        let label = self.cell(0, index).map(Cell::label).unwrap_or_default();
        let values = self
            .rows
            .iter()
            .skip(1)
            .map(|row| row[index].as_f64())
            .collect();
        Some(Column { label, values })
    }

    /// The time axis, or an empty series when the sheet is too narrow.
    pub fn time_values(&self) -> Vec<f64> {
        self.column(TIME_COLUMN)
            .map(|column| column.values)
            .unwrap_or_default()
    }
}

/// Re-open a workbook and copy out one sheet by name.
pub fn load_sheet(path: &Path, sheet: &str) -> Result<SheetTable> {
    let mut book = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;
    let range = book
        .worksheet_range(sheet)
        .with_context(|| format!("failed to read sheet '{}' of {}", sheet, path.display()))?;
    let table = SheetTable::from_range(sheet, &range);
    log::debug!(
        "sheet '{}' is {}x{} cells",
        sheet,
        table.height(),
        table.width()
    );
    Ok(table)
}

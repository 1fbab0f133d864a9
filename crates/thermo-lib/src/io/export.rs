use anyhow::{Context, Result};
use calamine::{open_workbook_auto, CellType, Data, Range, Reader};
use rust_xlsxwriter::{Format, Image, Workbook as XlsxWorkbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

/// Default row height of a fresh worksheet, in pixels.
const ROW_HEIGHT_PX: f64 = 20.0;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const DURATION_FORMAT: &str = "[h]:mm:ss";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub source: PathBuf,
    pub images: Vec<PathBuf>,
    pub destination: PathBuf,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub destination: PathBuf,
    pub sheet_name: String,
    pub copied_sheets: usize,
    /// Top row of each placed image, in insertion order.
    pub image_rows: Vec<u32>,
}

impl ExportSummary {
    pub fn message(&self) -> String {
        format!(
            "Exported {} picture(s) to sheet '{}' of {}",
            self.image_rows.len(),
            self.sheet_name,
            self.destination.display()
        )
    }
}

/// Number formats for date-like cells, built once per export.
struct DateFormats {
    date: Format,
    datetime: Format,
    duration: Format,
}

impl DateFormats {
    fn new() -> Self {
        Self {
            date: Format::new().set_num_format(DATE_FORMAT),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
            duration: Format::new().set_num_format(DURATION_FORMAT),
        }
    }
}

/// `base`, or `base1`, `base2`, ... when the name is already taken.
pub fn unique_sheet_name(existing: &[String], base: &str) -> String {
    let taken = |name: &str| existing.iter().any(|s| s.eq_ignore_ascii_case(name));
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}{n}"))
        .find(|name| !taken(name))
        .unwrap_or_else(|| base.to_string())
}

/// Copy every sheet of the source workbook into a new file and append a
/// sheet holding the images, stacked downwards from A1. The source file is
/// only read.
///
/// Cell values, date formats and formulas are carried over; other styling is
/// not.
pub fn export_with_images(request: &ExportRequest) -> Result<ExportSummary> {
    let mut source = open_workbook_auto(&request.source)
        .with_context(|| format!("failed to open workbook {}", request.source.display()))?;
    let sheet_names = source.sheet_names();
    let formats = DateFormats::new();

    let mut out = XlsxWorkbook::new();
    for name in &sheet_names {
        let values = source
            .worksheet_range(name)
            .with_context(|| format!("failed to read sheet '{name}'"))?;
        let formulas = match source.worksheet_formula(name) {
            Ok(formulas) => formulas,
            Err(err) => {
                log::debug!("no formulas read from '{name}': {err}");
                Range::default()
            }
        };
        let sheet = out.add_worksheet();
        sheet
            .set_name(name.as_str())
            .with_context(|| format!("invalid sheet name '{name}'"))?;
        for (row, col, cell) in absolute_cells(&values) {
            write_cell(sheet, row, col, cell, &formats)
                .with_context(|| format!("failed to copy cell ({row}, {col}) of '{name}'"))?;
        }
        // Written last so a formula replaces its cached value.
        for (row, col, formula) in absolute_cells(&formulas) {
            sheet
                .write_formula(row, col, formula.as_str())
                .with_context(|| format!("failed to copy formula ({row}, {col}) of '{name}'"))?;
        }
    }

    let pics_name = unique_sheet_name(&sheet_names, &request.sheet_name);
    let pics = out.add_worksheet();
    pics.set_name(pics_name.as_str())
        .with_context(|| format!("invalid sheet name '{pics_name}'"))?;
    let mut image_rows = Vec::with_capacity(request.images.len());
    let mut row = 0u32;
    for path in &request.images {
        let image = Image::new(path)
            .with_context(|| format!("failed to load image {}", path.display()))?;
        pics.insert_image(row, 0, &image)
            .with_context(|| format!("failed to place image {}", path.display()))?;
        image_rows.push(row);
        row += rows_spanned(image.height()) + 1;
    }

    out.save(&request.destination)
        .with_context(|| format!("failed to write {}", request.destination.display()))?;
    let summary = ExportSummary {
        destination: request.destination.clone(),
        sheet_name: pics_name,
        copied_sheets: sheet_names.len(),
        image_rows,
    };
    log::info!("{}", summary.message());
    Ok(summary)
}

/// Destination file next to the source workbook.
pub fn export_destination(source: &Path, file_name: &str) -> PathBuf {
    source
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Rows an image of `height_px` covers at the default row height.
pub fn rows_spanned(height_px: f64) -> u32 {
    (height_px / ROW_HEIGHT_PX).ceil().max(1.0) as u32
}

/// Non-empty cells of `range` with sheet coordinates instead of offsets.
fn absolute_cells<'a, T: CellType>(
    range: &'a Range<T>,
) -> impl Iterator<Item = (u32, u16, &'a T)> + 'a {
    let (r0, c0) = range.start().unwrap_or((0, 0));
    range
        .used_cells()
        .map(move |(r, c, cell)| (r0 + r as u32, (c0 + c as u32) as u16, cell))
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Data,
    formats: &DateFormats,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Data::Empty => {}
        Data::Int(v) => {
            sheet.write_number(row, col, *v as f64)?;
        }
        Data::Float(v) => {
            sheet.write_number(row, col, *v)?;
        }
        Data::Bool(v) => {
            sheet.write_boolean(row, col, *v)?;
        }
        Data::DateTime(dt) => {
            let value = dt.as_f64();
            let format = if dt.is_duration() {
                &formats.duration
            } else if value.fract() == 0.0 {
                &formats.date
            } else {
                &formats.datetime
            };
            sheet.write_number_with_format(row, col, value, format)?;
        }
        Data::String(text) => {
            sheet.write_string(row, col, text.as_str())?;
        }
        other => {
            sheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_name_gets_suffix_when_taken() {
        let existing = vec!["Run1".to_string(), "Pics".to_string(), "pics1".to_string()];
        assert_eq!(unique_sheet_name(&existing, "Pics"), "Pics2");
        assert_eq!(unique_sheet_name(&existing[..1], "Pics"), "Pics");
    }

    #[test]
    fn destination_sits_beside_source() {
        let dest = export_destination(Path::new("/data/thermal.xlsx"), "testreport_new.xlsx");
        assert_eq!(dest, PathBuf::from("/data/testreport_new.xlsx"));
    }

    #[test]
    fn images_stack_without_overlap() {
        assert_eq!(rows_spanned(960.0), 48);
        assert_eq!(rows_spanned(1.0), 1);
    }

    #[test]
    fn offset_ranges_map_to_sheet_cells() {
        let mut range: Range<String> = Range::new((2, 1), (3, 2));
        range.set_value((3, 2), "1+1".to_string());
        let cells: Vec<_> = absolute_cells(&range).collect();
        assert_eq!(cells, vec![(3, 2, &"1+1".to_string())]);
    }

    #[test]
    fn summary_message_names_sheet_and_count() {
        let summary = ExportSummary {
            destination: PathBuf::from("/r/testreport_new.xlsx"),
            sheet_name: "Pics1".into(),
            copied_sheets: 2,
            image_rows: vec![0, 4],
        };
        assert_eq!(
            summary.message(),
            "Exported 2 picture(s) to sheet 'Pics1' of /r/testreport_new.xlsx"
        );
    }
}

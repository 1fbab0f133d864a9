use crate::io::export::{export_destination, export_with_images, ExportRequest, ExportSummary};
use crate::io::workbook::{load_sheet, open_workbook, SheetTable, Workbook};
use crate::plot::pick::PickHit;
use crate::plot::png::{save_png, with_png_extension};
use crate::plot::{
    palette_color, Figure, LineSeries, Series, YAxis, SECONDARY_COLOR, THRESHOLD_COLOR,
};
use crate::signal::{constant_series, paired_points};
use crate::state::AppState;
use crate::{Error, Result};
use std::path::PathBuf;

pub const THRESHOLD_LABEL: &str = "Tprochot";

pub const ABOUT_TEXT: &str = "\
* Import an Excel workbook, pick a sheet and press Column to load its columns.
* Select a column, then Draw (left axis) or Draw (Right Y Scale).
* Type a Tprochot value and press Tprochot to add the threshold line.
* Show or hide the grid, or set the X min / X max bounds manually.
* Click on a plotted line to see the coordinates under the pointer.
* Save the plot or add saved pictures to a report from the File menu.";

/// A user action, or the result of an IO request feeding back in.
#[derive(Debug, Clone)]
pub enum Command {
    Import(PathBuf),
    WorkbookOpened(Workbook),
    SelectSheet(usize),
    LoadColumns,
    SheetLoaded(SheetTable),
    SelectColumn(usize),
    Draw,
    DrawSecondary,
    DrawThreshold,
    Clear,
    SetGrid(bool),
    Inspect(PickHit),
    SavePlot(PathBuf),
    PlotSaved(PathBuf),
    Export(Vec<PathBuf>),
    Exported(ExportSummary),
    About,
    Exit,
}

#[derive(Debug, Clone)]
pub enum IoRequest {
    OpenWorkbook(PathBuf),
    ReadSheet { path: PathBuf, sheet: String },
    RenderPng {
        path: PathBuf,
        figure: Box<Figure>,
        size: (u32, u32),
    },
    Export(ExportRequest),
}

impl IoRequest {
    /// Runs the request and answers with the command that records its result.
    pub fn perform(self) -> anyhow::Result<Command> {
        match self {
            IoRequest::OpenWorkbook(path) => {
                open_workbook(&path).map(Command::WorkbookOpened)
            }
            IoRequest::ReadSheet { path, sheet } => {
                load_sheet(&path, &sheet).map(Command::SheetLoaded)
            }
            IoRequest::RenderPng { path, figure, size } => {
                save_png(&path, &figure, size).map(|_| Command::PlotSaved(path))
            }
            IoRequest::Export(request) => export_with_images(&request).map(Command::Exported),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for a modal dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Effect {
    Io(IoRequest),
    Notify(Notice),
    Exit,
}

/// Apply one command to the state and return what should happen next.
///
/// Handlers never touch the filesystem; reads and writes are requested via
/// [`Effect::Io`].
pub fn dispatch(state: &mut AppState, command: Command) -> Result<Vec<Effect>> {
    log::debug!("dispatch {}", command_name(&command));
    match command {
        Command::Import(path) => Ok(vec![Effect::Io(IoRequest::OpenWorkbook(path))]),
        Command::WorkbookOpened(workbook) => {
            on_workbook_opened(state, workbook);
            Ok(Vec::new())
        }
        Command::SelectSheet(index) => select_sheet(state, index),
        Command::LoadColumns => load_columns(state),
        Command::SheetLoaded(table) => {
            on_sheet_loaded(state, table);
            Ok(Vec::new())
        }
        Command::SelectColumn(index) => select_column(state, index),
        Command::Draw => draw(state, YAxis::Primary),
        Command::DrawSecondary => draw(state, YAxis::Secondary),
        Command::DrawThreshold => draw_threshold(state),
        Command::Clear => {
            clear(state);
            Ok(Vec::new())
        }
        Command::SetGrid(show) => {
            state.grid = show;
            state.figure.grid = show;
            Ok(Vec::new())
        }
        Command::Inspect(hit) => Ok(vec![Effect::Notify(Notice::info("Click!", hit.message()))]),
        Command::SavePlot(path) => Ok(vec![Effect::Io(IoRequest::RenderPng {
            path: with_png_extension(&path),
            figure: Box::new(state.figure.clone()),
            size: state.config.png_size(),
        })]),
        Command::PlotSaved(path) => {
            state.set_status(format!("Saved plot to {}", path.display()));
            Ok(Vec::new())
        }
        Command::Export(images) => export(state, images),
        Command::Exported(summary) => {
            state.set_status(summary.message());
            Ok(Vec::new())
        }
        Command::About => Ok(vec![Effect::Notify(Notice::info("About", ABOUT_TEXT))]),
        Command::Exit => Ok(vec![Effect::Exit]),
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Import(_) => "import",
        Command::WorkbookOpened(_) => "workbook-opened",
        Command::SelectSheet(_) => "select-sheet",
        Command::LoadColumns => "load-columns",
        Command::SheetLoaded(_) => "sheet-loaded",
        Command::SelectColumn(_) => "select-column",
        Command::Draw => "draw",
        Command::DrawSecondary => "draw-secondary",
        Command::DrawThreshold => "draw-threshold",
        Command::Clear => "clear",
        Command::SetGrid(_) => "set-grid",
        Command::Inspect(_) => "inspect",
        Command::SavePlot(_) => "save-plot",
        Command::PlotSaved(_) => "plot-saved",
        Command::Export(_) => "export",
        Command::Exported(_) => "exported",
        Command::About => "about",
        Command::Exit => "exit",
    }
}

fn on_workbook_opened(state: &mut AppState, workbook: Workbook) {
    let count = workbook.sheet_names.len();
    let file = workbook.path.display().to_string();
    state.reset_columns();
    state.selected_sheet = None;
    state.workbook = Some(workbook);
    if count == 0 {
        log::warn!("{file} has no sheets");
    }
    state.set_status(format!("Imported {file} ({count} sheets)"));
}

fn select_sheet(state: &mut AppState, index: usize) -> Result<Vec<Effect>> {
    let count = state.workbook.as_ref().ok_or(Error::NoWorkbook)?.sheet_names.len();
    if index >= count {
        return Err(Error::SheetOutOfRange { index, count });
    }
    state.selected_sheet = Some(index);
    Ok(Vec::new())
}

fn load_columns(state: &mut AppState) -> Result<Vec<Effect>> {
    let path = state.workbook.as_ref().ok_or(Error::NoWorkbook)?.path.clone();
    let sheet = state
        .selected_sheet_name()
        .ok_or(Error::NoSheetSelected)?
        .to_string();
    state.reset_columns();
    Ok(vec![Effect::Io(IoRequest::ReadSheet { path, sheet })])
}

fn on_sheet_loaded(state: &mut AppState, table: SheetTable) {
    state.reset_columns();
    state.columns = table.headers();
    state.plot.time = table.time_values();
    if state.plot.time.is_empty() {
        log::warn!("sheet '{}' has no time values in column B", table.name);
    }
    state.set_status(format!(
        "Sheet '{}': {} columns, {} time points",
        table.name,
        state.columns.len(),
        state.plot.time.len()
    ));
    state.sheet = Some(table);
}

fn select_column(state: &mut AppState, index: usize) -> Result<Vec<Effect>> {
    let table = state.sheet.as_ref().ok_or(Error::SheetNotLoaded)?;
    let column = table.column(index).ok_or(Error::ColumnOutOfRange {
        index,
        count: state.columns.len(),
    })?;
    state.plot.data = column.values;
    state.plot.legend = Some(column.label);
    state.selected_column = Some(index);
    Ok(Vec::new())
}

fn draw(state: &mut AppState, axis: YAxis) -> Result<Vec<Effect>> {
    if axis == YAxis::Primary {
        state.figure.set_default_labels();
    }
    let Some(label) = state.plot.legend.clone() else {
        log::debug!("no column selected, nothing to draw");
        return Ok(Vec::new());
    };
    let points = paired_points(&state.plot.time, &state.plot.data);
    if points.is_empty() {
        state.set_status(format!("Nothing to plot for '{label}'"));
        return Ok(Vec::new());
    }
    let count = points.len();
    match axis {
        YAxis::Primary => {
            let (xmin, xmax) = state.x_bounds()?;
            let color = palette_color(state.figure.series.len());
            state
                .figure
                .add_series(Series::Line(LineSeries::translucent(label.as_str(), points, color)));
            state.figure.set_x_bounds(xmin, xmax);
        }
        YAxis::Secondary => {
            state.figure.add_secondary_series(Series::Line(LineSeries::translucent(
                label.as_str(),
                points,
                SECONDARY_COLOR,
            )));
        }
    }
    state.set_status(format!("Plotted '{label}' ({count} points)"));
    Ok(Vec::new())
}

fn draw_threshold(state: &mut AppState) -> Result<Vec<Effect>> {
    let text = state.threshold_text.trim();
    let value: f64 = text
        .parse()
        .map_err(|_| Error::InvalidThreshold(state.threshold_text.clone()))?;
    state.plot.threshold = constant_series(value, state.plot.time.len());
    let points = paired_points(&state.plot.time, &state.plot.threshold);
    if points.is_empty() {
        state.set_status("No time values loaded, nothing to plot");
        return Ok(Vec::new());
    }
    state.figure.add_series(Series::Line(LineSeries::translucent(
        THRESHOLD_LABEL,
        points,
        THRESHOLD_COLOR,
    )));
    state.set_status(format!("{THRESHOLD_LABEL} at {value}"));
    Ok(Vec::new())
}

/// Plotted Series is emptied; Time Series and Legend Label are kept.
fn clear(state: &mut AppState) {
    state.figure.clear();
    state.figure.set_default_labels();
    state.plot.data.clear();
    state.set_status("Cleared");
}

fn export(state: &mut AppState, images: Vec<PathBuf>) -> Result<Vec<Effect>> {
    let source = state.workbook.as_ref().ok_or(Error::NoWorkbook)?.path.clone();
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let destination = export_destination(&source, &state.config.export_file_name);
    if destination == source {
        return Err(Error::ExportWouldOverwrite(source));
    }
    Ok(vec![Effect::Io(IoRequest::Export(ExportRequest {
        source,
        images,
        destination,
        sheet_name: state.config.export_sheet_name.clone(),
    }))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::BoundMode;
    use crate::io::workbook::Cell;

    fn thermal_sheet() -> SheetTable {
        let text = |s: &str| Cell::Text(s.into());
        let mut rows = vec![vec![text("Index"), text("Time"), text("CPU_Temp"), text("GPU_Temp")]];
        let temps = [30.0, 45.0, 60.0, 55.0, 40.0];
        for (i, t) in temps.iter().enumerate() {
            rows.push(vec![
                Cell::Number(i as f64 + 1.0),
                Cell::Number(i as f64),
                Cell::Number(*t),
                Cell::Number(t + 10.0),
            ]);
        }
        SheetTable::from_rows("Run1", rows)
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        state.workbook = Some(Workbook {
            path: PathBuf::from("/data/thermal.xlsx"),
            sheet_names: vec!["Run1".into()],
        });
        dispatch(&mut state, Command::SelectSheet(0)).unwrap();
        dispatch(&mut state, Command::SheetLoaded(thermal_sheet())).unwrap();
        state
    }

    #[test]
    fn scenario_plots_five_points_with_auto_range() {
        let mut state = loaded_state();
        dispatch(&mut state, Command::SelectColumn(2)).unwrap();
        dispatch(&mut state, Command::Draw).unwrap();
        let fig = &state.figure;
        assert_eq!(fig.series.len(), 1);
        assert_eq!(fig.series[0].name(), "CPU_Temp");
        assert_eq!(
            fig.series[0].points(),
            &[[0.0, 30.0], [1.0, 45.0], [2.0, 60.0], [3.0, 55.0], [4.0, 40.0]]
        );
        assert_eq!(fig.x_bounds, Some((0.0, 4.0)));
    }

    #[test]
    fn selection_keeps_lengths_equal_and_replaces() {
        let mut state = loaded_state();
        dispatch(&mut state, Command::SelectColumn(2)).unwrap();
        assert_eq!(state.plot.time.len(), state.plot.data.len());
        dispatch(&mut state, Command::SelectColumn(3)).unwrap();
        assert_eq!(state.plot.legend.as_deref(), Some("GPU_Temp"));
        assert_eq!(state.plot.data, vec![40.0, 55.0, 70.0, 65.0, 50.0]);
        assert_eq!(state.plot.time.len(), state.plot.data.len());
    }

    #[test]
    fn nothing_plotted_before_column_selected() {
        let mut state = loaded_state();
        dispatch(&mut state, Command::Draw).unwrap();
        assert!(state.figure.is_empty());
        assert_eq!(state.figure.title.as_deref(), Some("Data Visualization"));
    }

    #[test]
    fn selecting_column_before_sheet_is_guarded() {
        let mut state = AppState::default();
        assert!(matches!(
            dispatch(&mut state, Command::SelectColumn(0)),
            Err(Error::SheetNotLoaded)
        ));
        let mut state = loaded_state();
        assert!(matches!(
            dispatch(&mut state, Command::SelectColumn(9)),
            Err(Error::ColumnOutOfRange { index: 9, count: 4 })
        ));
    }

    #[test]
    fn load_columns_requires_selection() {
        let mut state = AppState::default();
        assert!(matches!(dispatch(&mut state, Command::LoadColumns), Err(Error::NoWorkbook)));
        state.workbook = Some(Workbook {
            path: PathBuf::from("a.xlsx"),
            sheet_names: vec!["S".into()],
        });
        assert!(matches!(
            dispatch(&mut state, Command::LoadColumns),
            Err(Error::NoSheetSelected)
        ));
        dispatch(&mut state, Command::SelectSheet(0)).unwrap();
        let effects = dispatch(&mut state, Command::LoadColumns).unwrap();
        assert!(matches!(
            effects.as_slice(),
            [Effect::Io(IoRequest::ReadSheet { sheet, .. })] if sheet == "S"
        ));
    }

    #[test]
    fn invalid_manual_bound_leaves_figure_untouched() {
        let mut state = loaded_state();
        dispatch(&mut state, Command::SelectColumn(2)).unwrap();
        state.x_max.mode = BoundMode::Manual;
        state.x_max.manual_text = "four".into();
        assert!(matches!(
            dispatch(&mut state, Command::Draw),
            Err(Error::InvalidBound { .. })
        ));
        assert!(state.figure.is_empty());
        state.x_max.manual_text = "3".into();
        dispatch(&mut state, Command::Draw).unwrap();
        assert_eq!(state.figure.x_bounds, Some((0.0, 3.0)));
    }

    #[test]
    fn secondary_draw_uses_right_axis() {
        let mut state = loaded_state();
        dispatch(&mut state, Command::SelectColumn(2)).unwrap();
        dispatch(&mut state, Command::DrawSecondary).unwrap();
        assert!(state.figure.series.is_empty());
        assert_eq!(state.figure.secondary.len(), 1);
        assert_eq!(state.figure.legend_entries(YAxis::Secondary), vec![("CPU_Temp", SECONDARY_COLOR)]);
    }

    #[test]
    fn threshold_matches_time_length() {
        let mut state = loaded_state();
        state.threshold_text = "95".into();
        dispatch(&mut state, Command::DrawThreshold).unwrap();
        assert_eq!(state.plot.threshold.len(), state.plot.time.len());
        assert!(state.plot.threshold.iter().all(|v| *v == 95.0));
        assert_eq!(state.figure.series[0].name(), THRESHOLD_LABEL);
        state.threshold_text = "hot".into();
        assert!(matches!(
            dispatch(&mut state, Command::DrawThreshold),
            Err(Error::InvalidThreshold(_))
        ));
    }

    #[test]
    fn clear_keeps_time_and_legend() {
        let mut state = loaded_state();
        dispatch(&mut state, Command::SelectColumn(2)).unwrap();
        dispatch(&mut state, Command::Draw).unwrap();
        dispatch(&mut state, Command::DrawSecondary).unwrap();
        state.figure.title = Some("changed".into());
        dispatch(&mut state, Command::Clear).unwrap();
        assert!(state.plot.data.is_empty());
        assert!(state.figure.is_empty());
        assert_eq!(state.figure.title.as_deref(), Some("Data Visualization"));
        assert_eq!(state.plot.time.len(), 5);
        assert_eq!(state.plot.legend.as_deref(), Some("CPU_Temp"));
        dispatch(&mut state, Command::Draw).unwrap();
        assert!(state.figure.is_empty());
    }

    #[test]
    fn narrow_sheet_draws_nothing() {
        let mut state = AppState::default();
        let table = SheetTable::from_rows(
            "one",
            vec![vec![Cell::Text("Temp".into())], vec![Cell::Number(3.0)]],
        );
        dispatch(&mut state, Command::SheetLoaded(table)).unwrap();
        dispatch(&mut state, Command::SelectColumn(0)).unwrap();
        dispatch(&mut state, Command::Draw).unwrap();
        dispatch(&mut state, Command::DrawThreshold).unwrap();
        assert!(state.figure.is_empty());
        assert!(state.plot.threshold.is_empty());
    }

    #[test]
    fn export_without_import_fails_fast() {
        let mut state = AppState::default();
        assert!(matches!(
            dispatch(&mut state, Command::Export(vec![PathBuf::from("p.png")])),
            Err(Error::NoWorkbook)
        ));
    }

    #[test]
    fn export_refuses_to_overwrite_source() {
        let mut state = AppState::default();
        state.workbook = Some(Workbook {
            path: PathBuf::from("/r/testreport_new.xlsx"),
            sheet_names: vec!["S".into()],
        });
        assert!(matches!(
            dispatch(&mut state, Command::Export(vec![PathBuf::from("p.png")])),
            Err(Error::ExportWouldOverwrite(_))
        ));
        assert!(dispatch(&mut state, Command::Export(Vec::new())).unwrap().is_empty());
    }

    #[test]
    fn grid_and_inspect() {
        let mut state = AppState::default();
        dispatch(&mut state, Command::SetGrid(true)).unwrap();
        assert!(state.grid && state.figure.grid);
        let hit = PickHit {
            series: "CPU_Temp".into(),
            axis: YAxis::Primary,
            points: vec![[2.0, 60.0]],
        };
        let effects = dispatch(&mut state, Command::Inspect(hit)).unwrap();
        match effects.as_slice() {
            [Effect::Notify(notice)] => {
                assert_eq!(notice.title, "Click!");
                assert_eq!(notice.message, "Plot coords:\n ((2, 60))");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn save_plot_requests_png_at_configured_size() {
        let mut state = AppState::default();
        let effects = dispatch(&mut state, Command::SavePlot(PathBuf::from("out/plot"))).unwrap();
        match effects.as_slice() {
            [Effect::Io(IoRequest::RenderPng { path, size, .. })] => {
                assert_eq!(path, &PathBuf::from("out/plot.png"));
                assert_eq!(*size, (1200, 960));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn completed_io_is_reported_in_status() {
        let mut state = AppState::default();
        dispatch(&mut state, Command::PlotSaved(PathBuf::from("out/plot.png"))).unwrap();
        assert_eq!(state.status, "Saved plot to out/plot.png");
        let summary = ExportSummary {
            destination: PathBuf::from("/r/testreport_new.xlsx"),
            sheet_name: "Pics".into(),
            copied_sheets: 1,
            image_rows: vec![0],
        };
        dispatch(&mut state, Command::Exported(summary)).unwrap();
        assert!(state.status.contains("sheet 'Pics'"));
    }
}

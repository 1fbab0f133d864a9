use rfd::FileDialog;
use std::path::PathBuf;
use thermo_lib::io::workbook::WORKBOOK_EXTENSIONS;

fn dialog(title: &str) -> FileDialog {
    let dialog = FileDialog::new().set_title(title);
    match std::env::current_dir() {
        Ok(dir) => dialog.set_directory(dir),
        Err(_) => dialog,
    }
}

pub fn pick_workbook() -> Option<PathBuf> {
    dialog("Import workbook")
        .add_filter("Excel workbook", WORKBOOK_EXTENSIONS)
        .pick_file()
}

pub fn pick_plot_destination() -> Option<PathBuf> {
    dialog("Save plot as...")
        .add_filter("PNG", &["png"])
        .set_file_name("plot.png")
        .save_file()
}

pub fn pick_report_images() -> Option<Vec<PathBuf>> {
    dialog("Import pic to test report")
        .add_filter("PNG", &["png"])
        .pick_files()
}

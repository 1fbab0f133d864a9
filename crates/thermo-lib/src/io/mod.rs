pub mod export;
pub mod workbook;

pub mod records;
pub mod spreadsheet;

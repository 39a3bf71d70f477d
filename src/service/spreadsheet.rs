//! Tabular export to a styled single-sheet workbook.
//!
//! Row projection and name sanitizing are always compiled; the workbook writer itself
//! lives behind the `xlsx` feature. Without it `render` fails with
//! [`WorkshopError::ExportUnavailable`] instead of emitting a broken file.

use crate::config::ExportConfig;
use crate::error::WorkshopError;
use serde_json::Value;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Excel hard limits.
const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;
const MAX_SHEET_NAME_CHARS: usize = 31;
#[cfg(feature = "xlsx")]
const MAX_CELL_CHARS: usize = 32_767;

#[cfg(feature = "xlsx")]
const HEADER_FILL: u32 = 0xDCEAFE;
#[cfg(feature = "xlsx")]
const HEADER_FONT: u32 = 0x0F172A;
#[cfg(feature = "xlsx")]
const ZEBRA_FILL: u32 = 0xF8FAFC;
#[cfg(feature = "xlsx")]
const BORDER: u32 = 0xD1D5DB;

/// Everything needed to lay out one sheet. `rows` are already projected onto `headers`.
#[derive(Debug, Clone)]
pub struct SheetSpec {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub sheet_name: String,
    pub rtl: bool,
}

impl SheetSpec {
    /// Validate headers and project the caller's rows onto them.
    pub fn build(
        headers: Vec<String>,
        rows: Vec<Value>,
        sheet_name: String,
        rtl: bool,
    ) -> Result<Self, WorkshopError> {
        if headers.is_empty() {
            return Err(WorkshopError::InvalidRequest(
                "headers is required".to_string(),
            ));
        }
        if headers.len() > MAX_COLUMNS {
            return Err(WorkshopError::InvalidRequest(format!(
                "too many columns: {} (max {MAX_COLUMNS})",
                headers.len()
            )));
        }
        if rows.len() >= MAX_ROWS {
            return Err(WorkshopError::InvalidRequest(format!(
                "too many rows: {} (max {})",
                rows.len(),
                MAX_ROWS - 1
            )));
        }
        let rows = project_rows(&headers, rows)?;
        Ok(Self {
            headers,
            rows,
            sheet_name,
            rtl,
        })
    }
}

/// Map each row onto the header order.
///
/// Object rows are looked up by header name (missing -> null). Array rows are taken
/// positionally, padded with nulls or truncated to the header count.
pub fn project_rows(
    headers: &[String],
    rows: Vec<Value>,
) -> Result<Vec<Vec<Value>>, WorkshopError> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| match row {
            Value::Object(map) => Ok(headers
                .iter()
                .map(|h| map.get(h).cloned().unwrap_or(Value::Null))
                .collect()),
            Value::Array(mut values) => {
                values.resize(headers.len(), Value::Null);
                Ok(values)
            }
            _ => Err(WorkshopError::InvalidRequest(format!(
                "row {idx} must be an object or an array"
            ))),
        })
        .collect()
}

/// Replace characters forbidden in file names; empty names fall back to `default`.
pub fn sanitize_filename(name: &str, default: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Coerce a sheet name into something Excel accepts.
pub fn sanitize_sheet_name(name: &str, default: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("history") {
        default.to_string()
    } else {
        cleaned.to_string()
    }
}

/// RFC 5987 attachment header so non-ASCII names survive.
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

/// Styling knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct SheetStyle {
    pub column_width: f64,
    pub font_name: String,
}

impl From<&ExportConfig> for SheetStyle {
    fn from(cfg: &ExportConfig) -> Self {
        Self {
            column_width: cfg.column_width,
            font_name: cfg.font_name.clone(),
        }
    }
}

/// Fails when the crate was built without a workbook writer.
pub fn ensure_available() -> Result<(), WorkshopError> {
    if cfg!(feature = "xlsx") {
        Ok(())
    } else {
        Err(WorkshopError::ExportUnavailable)
    }
}

#[cfg(feature = "xlsx")]
pub fn render(spec: &SheetSpec, style: &SheetStyle) -> Result<Vec<u8>, WorkshopError> {
    use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook};

    let base = Format::new()
        .set_font_name(style.font_name.as_str())
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(BORDER))
        .set_align(FormatAlign::Right)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    let header = base
        .clone()
        .set_bold()
        .set_font_color(Color::RGB(HEADER_FONT))
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(HEADER_FILL));
    let zebra = base
        .clone()
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(ZEBRA_FILL));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(spec.sheet_name.as_str())?;
    if spec.rtl {
        worksheet.set_right_to_left(true);
    }

    for (col, title) in spec.headers.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, title.as_str(), &header)?;
        worksheet.set_column_width(col, style.column_width)?;
    }

    for (idx, values) in spec.rows.iter().enumerate() {
        let row = idx as u32 + 1;
        // Sheet rows 2, 4, 6... (1-based) carry the stripe.
        let format = if idx % 2 == 0 { &zebra } else { &base };
        for (col, value) in values.iter().enumerate() {
            write_cell(worksheet, row, col as u16, value, format)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

#[cfg(feature = "xlsx")]
fn write_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    format: &rust_xlsxwriter::Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match value {
        Value::Null => worksheet.write_blank(row, col, format)?,
        Value::Bool(b) => worksheet.write_boolean_with_format(row, col, *b, format)?,
        Value::Number(n) => match n.as_f64() {
            Some(f) => worksheet.write_number_with_format(row, col, f, format)?,
            None => worksheet.write_string_with_format(row, col, n.to_string(), format)?,
        },
        Value::String(s) => worksheet.write_string_with_format(row, col, clip_cell(s), format)?,
        nested => {
            let text = nested.to_string();
            worksheet.write_string_with_format(row, col, clip_cell(&text), format)?
        }
    };
    Ok(())
}

/// Cut text at Excel's per-cell character limit.
#[cfg(feature = "xlsx")]
fn clip_cell(s: &str) -> &str {
    match s.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

#[cfg(not(feature = "xlsx"))]
pub fn render(_spec: &SheetSpec, _style: &SheetStyle) -> Result<Vec<u8>, WorkshopError> {
    Err(WorkshopError::ExportUnavailable)
}

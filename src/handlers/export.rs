use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::service::spreadsheet::{
    self, SheetSpec, SheetStyle, XLSX_CONTENT_TYPE, content_disposition, sanitize_filename,
    sanitize_sheet_name,
};
use super::extract::ApiJson;
use crate::{WorkshopError, router::WorkshopState};

#[derive(Debug, Deserialize)]
pub struct ExportBody {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Value>,
    pub filename: Option<String>,
    pub sheet: Option<String>,
    pub rtl: Option<bool>,
}

/// POST /api/export/xlsx -> styled workbook streamed back as an attachment.
pub async fn export_xlsx(
    State(state): State<WorkshopState>,
    ApiJson(body): ApiJson<ExportBody>,
) -> Result<Response, WorkshopError> {
    spreadsheet::ensure_available()?;

    let export_cfg = &state.config.export;
    let sheet_name = sanitize_sheet_name(
        body.sheet.as_deref().unwrap_or_default(),
        &export_cfg.default_sheet,
    );
    let filename = sanitize_filename(
        body.filename.as_deref().unwrap_or_default(),
        &export_cfg.default_filename,
    );
    let spec = SheetSpec::build(body.headers, body.rows, sheet_name, body.rtl.unwrap_or(true))?;
    let style = SheetStyle::from(export_cfg);

    let rows = spec.rows.len();
    let bytes = tokio::task::spawn_blocking(move || spreadsheet::render(&spec, &style))
        .await
        .map_err(|e| WorkshopError::Internal(format!("export task failed: {e}")))??;

    info!(%filename, rows, size = bytes.len(), "spreadsheet exported");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        bytes,
    )
        .into_response())
}

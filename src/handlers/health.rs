use axum::{Json, extract::State};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{WorkshopError, router::WorkshopState};

pub const SERVICE_NAME: &str = "Alsami Workshop API";

#[derive(Serialize)]
pub struct PingResponse {
    ok: bool,
    service: &'static str,
    version: &'static str,
    db: String,
    time: String,
    counts: Map<String, Value>,
}

/// GET /api/ping -> liveness plus row counts per store.
pub async fn ping(State(state): State<WorkshopState>) -> Result<Json<PingResponse>, WorkshopError> {
    let counts = state.storage.counts().await?;
    Ok(Json(PingResponse {
        ok: true,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        db: state.config.database.url.clone(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        counts,
    }))
}

/// GET /api/debug/counts
pub async fn debug_counts(
    State(state): State<WorkshopState>,
) -> Result<Json<Map<String, Value>>, WorkshopError> {
    Ok(Json(state.storage.counts().await?))
}

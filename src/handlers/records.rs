use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::db::schema::Domain;
use crate::db::{RecentItems, SearchResult, SyncBatch};
use crate::service::records;
use super::extract::ApiJson;
use crate::{WorkshopError, router::WorkshopState};

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub ok: bool,
    pub count: usize,
}

/// POST /api/sync/batch -> replays client-side changes into their stores.
pub async fn sync_batch(
    State(state): State<WorkshopState>,
    ApiJson(batch): ApiJson<SyncBatch>,
) -> Result<Json<SyncResponse>, WorkshopError> {
    let count = records::sync_batch(&state.storage, batch.into_items()).await?;
    Ok(Json(SyncResponse { ok: true, count }))
}

/// GET /api/search/{key} -> every record whose serial, code or key equals `key`.
pub async fn search(
    State(state): State<WorkshopState>,
    Path(key): Path<String>,
) -> Result<Json<SearchResult>, WorkshopError> {
    Ok(Json(records::unified_search(&state.storage, &key).await?))
}

pub async fn last3_engines(
    State(state): State<WorkshopState>,
) -> Result<Json<RecentItems>, WorkshopError> {
    Ok(Json(
        records::latest_supplies(&state.storage, Domain::Engines).await?,
    ))
}

pub async fn last3_generators(
    State(state): State<WorkshopState>,
) -> Result<Json<RecentItems>, WorkshopError> {
    Ok(Json(
        records::latest_supplies(&state.storage, Domain::Generators).await?,
    ))
}

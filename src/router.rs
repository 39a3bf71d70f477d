use crate::config::Config;
use crate::db::RecordStorage;
use crate::handlers::{
    export::export_xlsx,
    health::{debug_counts, ping},
    records::{last3_engines, last3_generators, search, sync_batch},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::header,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared handles passed to every handler; the pool hands out per-request connections.
#[derive(Clone)]
pub struct WorkshopState {
    pub storage: RecordStorage,
    pub config: Arc<Config>,
}

impl WorkshopState {
    pub fn new(storage: RecordStorage, config: Config) -> Self {
        Self {
            storage,
            config: Arc::new(config),
        }
    }
}

pub fn workshop_router(state: WorkshopState) -> Router {
    let body_limit = state.config.basic.body_limit_mb.max(1) * 1024 * 1024;

    let api = Router::new()
        .route("/ping", get(ping))
        .route("/debug/counts", get(debug_counts))
        .route("/sync/batch", post(sync_batch))
        .route("/search/{key}", get(search))
        .route("/last3/engines", get(last3_engines))
        .route("/last3/generators", get(last3_generators))
        .route("/export/xlsx", post(export_xlsx));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// The browser client reads the download name from Content-Disposition.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION])
}

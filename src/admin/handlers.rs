use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub base_url: String,
    pub proxy_url: String,
    pub stage: String,
    pub cached_entries: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheSummary {
    pub entries: usize,
    pub paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateParams {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidateResult {
    pub removed: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let settings = state.adapter.settings();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        base_url: settings.base_url().to_string(),
        proxy_url: settings.proxy_url().to_string(),
        stage: state.stage.to_string(),
        cached_entries: state.adapter.cache().len(),
    })
}

pub async fn get_cache(State(state): State<AdminState>) -> Json<CacheSummary> {
    let paths = state.adapter.cache().paths();
    Json(CacheSummary {
        entries: paths.len(),
        paths,
    })
}

/// Invalidate one path, or everything when no path is given.
pub async fn delete_cache(
    State(state): State<AdminState>,
    Query(params): Query<InvalidateParams>,
) -> Json<InvalidateResult> {
    let cache = state.adapter.cache();
    let removed = match params.path {
        Some(path) => usize::from(cache.invalidate(&path)),
        None => cache.clear(),
    };
    tracing::info!(removed, "Cache invalidated via admin API");
    Json(InvalidateResult { removed })
}

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, catalog size, and the active reranker backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "assessment-recommender",
        "catalog_size": state.recommender.catalog().len(),
        "reranker": state.recommender.reranker_backend(),
    }))
}

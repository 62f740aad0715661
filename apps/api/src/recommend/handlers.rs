//! Axum route handlers for the Recommendation API.

use axum::{
    extract::{FromRequest, FromRequestParts, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::AssessmentRecord;
use crate::errors::AppError;
use crate::rerank::RankedResult;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub count: usize,
    pub assessments: Vec<AssessmentRecord>,
}

/// `Json` extractor whose rejections render as `{"error": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` extractor whose rejections render as `{"error": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommend
///
/// Body: `{"query": "<job description>"}`. Returns up to N ranked assessments.
pub async fn handle_recommend(
    State(state): State<AppState>,
    AppJson(request): AppJson<RecommendRequest>,
) -> Result<Json<RankedResult>, AppError> {
    let result = state.recommender.recommend(&request.query).await?;
    Ok(Json(result))
}

/// GET /api/v1/recommend?query=...
pub async fn handle_recommend_query(
    State(state): State<AppState>,
    AppQuery(request): AppQuery<RecommendRequest>,
) -> Result<Json<RankedResult>, AppError> {
    let result = state.recommender.recommend(&request.query).await?;
    Ok(Json(result))
}

/// GET /api/v1/catalog
///
/// Returns the loaded, normalized catalog.
pub async fn handle_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let catalog = state.recommender.catalog();
    Json(CatalogResponse {
        count: catalog.len(),
        assessments: catalog.records().to_vec(),
    })
}

pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommend::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/recommend",
            post(handlers::handle_recommend).get(handlers::handle_recommend_query),
        )
        .route("/api/v1/catalog", get(handlers::handle_catalog))
        .with_state(state)
}

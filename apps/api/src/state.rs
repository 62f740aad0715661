use std::sync::Arc;

use crate::recommend::Recommender;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything behind the `Arc` is built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
}

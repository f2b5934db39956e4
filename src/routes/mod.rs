pub mod frames;
pub mod index;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(index::routes())
        .merge(frames::routes())
}

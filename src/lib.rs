//! Exercise classification service.
//!
//! Decodes webcam frames, extracts MoveNet keypoints per frame and scores the
//! resulting sequence with a pretrained classifier. The `sequencer` binary
//! prepares training sequences from a labeled image dataset.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pose;
pub mod routes;
pub mod sequence;
pub mod services;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header, header::InvalidHeaderValue},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use config::Config;
use sequence::SequenceBuilder;

/// Shared, read-only state handed to every request
pub struct AppState {
    pub builder: SequenceBuilder,
}

impl AppState {
    pub fn new(builder: SequenceBuilder) -> Self {
        Self { builder }
    }
}

/// Router with CORS restricted to the configured origin and the body size limit applied.
///
/// Requests from any other origin get no `Access-Control-Allow-Origin` header.
pub fn build_app(state: AppState, config: &Config) -> Result<Router, InvalidHeaderValue> {
    let origin: HeaderValue = config.cors_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(routes::build_routes()
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors)
        .with_state(Arc::new(state)))
}

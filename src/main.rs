//! Exercise classification API server.
//!
//! ## Environment Variables
//! - `PORT` - port to listen on (default: `5000`)
//! - `BIND_ADDR` - interface to bind (default: `0.0.0.0`)
//! - `KEYPOINT_MODEL_PATH` - MoveNet ONNX file (default: `models/movenet_thunder.onnx`)
//! - `CLASSIFIER_MODEL_PATH` - classifier ONNX file (default: `models/exercise_classifier.onnx`)
//! - `CORS_ORIGIN` - the one origin allowed to call the API (default: `http://localhost:3000`)
//! - `MAX_BODY_BYTES` - request body limit (default: 64 MB)
//! - `RUST_LOG` - log filter (default: `info`)

use anyhow::Context;
use std::sync::Arc;

use exercise_api::config::Config;
use exercise_api::pose::{LstmClassifier, MoveNet};
use exercise_api::sequence::SequenceBuilder;
use exercise_api::{AppState, build_app, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env();

    // Models are loaded once and shared read-only by every request
    let extractor = MoveNet::load(&config.keypoint_model_path)?;
    let classifier = LstmClassifier::load(&config.classifier_model_path)?;
    let state = AppState::new(SequenceBuilder::new(
        Arc::new(extractor),
        Arc::new(classifier),
    ));

    let app = build_app(state, &config)
        .with_context(|| format!("Invalid CORS_ORIGIN {:?}", config.cors_origin))?;

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    log::info!("[server] Listening on http://{}", addr);
    log::info!("[server] CORS origin: {}", config.cors_origin);
    axum::serve(listener, app).await?;
    Ok(())
}

//! Frame classification endpoint (/process_frame)

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::constants::INSUFFICIENT_FRAMES_MESSAGE;
use crate::error::PipelineResult;
use crate::sequence::SequenceOutcome;
use crate::services::decode::decode_frames;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/process_frame", post(process_frame))
}

#[derive(Debug, Deserialize)]
pub struct ProcessFrameRequest {
    /// Data URLs, oldest frame first
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PredictionResponse {
    predictions: Vec<Vec<f32>>,
    keypoints: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Malformed or incomplete JSON is a 400; other rejections keep axum's status
/// (413 for an oversized body, 415 for a missing JSON content type).
fn rejection_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            ApiError::BadRequest(rejection.body_text())
        }
        other => ApiError::Rejected(other.status(), other.body_text()),
    }
}

/// POST /process_frame - Classify an ordered batch of frames
async fn process_frame(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProcessFrameRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload
        .map_err(rejection_error)
        .log_err("[process_frame] Rejected body")?;

    let frame_count = request.images.len();
    let builder = state.builder.clone();

    // Decoding and inference are CPU bound; keep them off the async workers
    let outcome = tokio::task::spawn_blocking(move || -> PipelineResult<SequenceOutcome> {
        let frames = decode_frames(&request.images)?;
        Ok(builder.run(&frames)?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Frame worker failed: {e}")))
    .log_err("[process_frame] Worker error")?
    .log_err("[process_frame] Error processing frames")?;

    match outcome {
        SequenceOutcome::Prediction { scores, keypoints } => {
            log::info!("[process_frame] Classified sequence of {} frames", frame_count);
            Ok(Json(PredictionResponse {
                predictions: scores,
                keypoints,
            })
            .into_response())
        }
        SequenceOutcome::Insufficient => Ok((
            StatusCode::ACCEPTED,
            Json(MessageResponse {
                message: INSUFFICIENT_FRAMES_MESSAGE,
            }),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::constants::FEATURES_PER_FRAME;
    use crate::pose::KeypointExtractor;
    use crate::pose::testing::{CountingClassifier, FailingExtractor, TaggingExtractor};
    use crate::sequence::SequenceBuilder;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;
    use tower::ServiceExt;

    fn app_with(
        extractor: Arc<dyn KeypointExtractor>,
        classifier: Arc<CountingClassifier>,
    ) -> Router {
        let state = AppState::new(SequenceBuilder::new(extractor, classifier));
        crate::build_app(state, &Config::default()).expect("build app")
    }

    fn jpeg_data_url(red: u8) -> String {
        let img = RgbImage::from_pixel(64, 48, Rgb([red, 120, 60]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .expect("encode jpeg");
        format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
    }

    fn post_json(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/process_frame")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn three_frames_yield_prediction_and_keypoints() {
        let classifier = Arc::new(CountingClassifier::default());
        let app = app_with(Arc::new(TaggingExtractor), classifier.clone());
        let body = serde_json::json!({
            "images": [jpeg_data_url(30), jpeg_data_url(130), jpeg_data_url(230)]
        });

        let (status, json) = send(app, post_json(body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        let predictions = json["predictions"].as_array().expect("predictions");
        assert!(!predictions.is_empty());
        assert!(!predictions[0].as_array().expect("scores").is_empty());
        let keypoints = json["keypoints"].as_array().expect("keypoints");
        assert_eq!(keypoints.len(), 3);
        assert!(keypoints.iter().all(|k| k.as_array().map(Vec::len) == Some(FEATURES_PER_FRAME)));
        assert_eq!(classifier.calls(), 1);
    }

    #[tokio::test]
    async fn empty_images_is_accepted_without_prediction() {
        let classifier = Arc::new(CountingClassifier::default());
        let app = app_with(Arc::new(TaggingExtractor), classifier.clone());

        let (status, json) = send(app, post_json(r#"{"images": []}"#.to_string())).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["message"], INSUFFICIENT_FRAMES_MESSAGE);
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn unparseable_base64_is_a_server_error() {
        let app = app_with(Arc::new(TaggingExtractor), Arc::new(CountingClassifier::default()));
        let body = serde_json::json!({ "images": ["data:image/jpeg;base64,@@@@not base64@@@@"] });

        let (status, json) = send(app, post_json(body.to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn extractor_failure_is_a_server_error() {
        let app = app_with(Arc::new(FailingExtractor), Arc::new(CountingClassifier::default()));
        let body = serde_json::json!({ "images": [jpeg_data_url(10)] });

        let (status, json) = send(app, post_json(body.to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Inference failed: extractor exploded");
    }

    #[tokio::test]
    async fn body_without_images_is_a_bad_request() {
        let app = app_with(Arc::new(TaggingExtractor), Arc::new(CountingClassifier::default()));

        let (status, json) = send(app, post_json(r#"{"frames": []}"#.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn truncated_json_is_a_bad_request() {
        let app = app_with(Arc::new(TaggingExtractor), Arc::new(CountingClassifier::default()));

        let (status, _) = send(app, post_json(r#"{"images": ["#.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let app = app_with(Arc::new(TaggingExtractor), Arc::new(CountingClassifier::default()));
        let mut request = post_json(r#"{"images": []}"#.to_string());
        request
            .headers_mut()
            .insert(header::ORIGIN, "http://localhost:3000".parse().expect("origin"));

        let response = app.oneshot(request).await.expect("response");

        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok());
        assert_eq!(allowed, Some("http://localhost:3000"));
    }

    #[tokio::test]
    async fn cors_ignores_other_origins() {
        let app = app_with(Arc::new(TaggingExtractor), Arc::new(CountingClassifier::default()));
        let mut request = post_json(r#"{"images": []}"#.to_string());
        request
            .headers_mut()
            .insert(header::ORIGIN, "http://evil.example".parse().expect("origin"));

        let response = app.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}

use std::path::Path;

use tract_onnx::prelude::*;

use super::{KeypointExtractor, PreparedFrame};
use crate::constants::{CHANNELS, TARGET_SIZE};
use crate::error::InferenceError;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Single-pose MoveNet exported to ONNX.
///
/// Expects an `int32` input of shape `[1, 256, 256, 3]` and produces
/// `[1, 1, 17, 3]` keypoints as `(y, x, confidence)`.
pub struct MoveNet {
    model: Plan,
}

impl MoveNet {
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let size = TARGET_SIZE as usize;
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.with_input_fact(0, i32::fact([1, size, size, CHANNELS]).into()))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| InferenceError::ModelLoad {
                path: path.to_path_buf(),
                message: format!("{e:#}"),
            })?;

        log::info!("[movenet] Loaded keypoint model from {}", path.display());
        Ok(Self { model })
    }
}

impl KeypointExtractor for MoveNet {
    fn extract(&self, frame: &PreparedFrame) -> Result<Vec<f32>, InferenceError> {
        let size = frame.size as usize;
        let input: Tensor =
            tract_ndarray::Array4::from_shape_vec((1, size, size, CHANNELS), frame.data.clone())
                .map_err(|e| InferenceError::Shape {
                    expected: format!("[1, {size}, {size}, {CHANNELS}]"),
                    got: e.to_string(),
                })?
                .into();

        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(InferenceError::runtime)?;

        let keypoints = outputs
            .first()
            .ok_or_else(|| {
                InferenceError::Runtime("keypoint model produced no output".to_string())
            })?
            .to_array_view::<f32>()
            .map_err(InferenceError::runtime)?;

        // Row-major flatten keeps the joint-major [y, x, confidence] layout
        Ok(keypoints.iter().copied().collect())
    }
}

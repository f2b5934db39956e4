use std::path::Path;

use tract_onnx::prelude::*;

use super::SequenceClassifier;
use crate::error::InferenceError;
use crate::sequence::Sequence;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Exercise classifier (Keras LSTM exported to ONNX).
///
/// Input `[batch, frames, features]` as `float32`, output `[batch, classes]`.
/// The frame axis is left symbolic so requests of any length can be scored.
pub struct LstmClassifier {
    model: Plan,
}

impl LstmClassifier {
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| InferenceError::ModelLoad {
                path: path.to_path_buf(),
                message: format!("{e:#}"),
            })?;

        log::info!("[classifier] Loaded sequence model from {}", path.display());
        Ok(Self { model })
    }
}

impl SequenceClassifier for LstmClassifier {
    fn predict(&self, sequence: &Sequence) -> Result<Vec<Vec<f32>>, InferenceError> {
        let shape = (1, sequence.frames(), sequence.features());
        let input: Tensor = tract_ndarray::Array3::from_shape_vec(shape, sequence.data().to_vec())
            .map_err(|e| InferenceError::Shape {
                expected: format!("{shape:?}"),
                got: e.to_string(),
            })?
            .into();

        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(InferenceError::runtime)?;

        let scores = outputs
            .first()
            .ok_or_else(|| InferenceError::Runtime("classifier produced no output".to_string()))?
            .to_array_view::<f32>()
            .map_err(InferenceError::runtime)?;

        let classes = scores.shape().last().copied().unwrap_or(0);
        if classes == 0 {
            return Err(InferenceError::Shape {
                expected: "[batch, classes]".to_string(),
                got: format!("{:?}", scores.shape()),
            });
        }

        let flat: Vec<f32> = scores.iter().copied().collect();
        Ok(flat.chunks(classes).map(<[f32]>::to_vec).collect())
    }
}

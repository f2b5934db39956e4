//! Frame-to-sequence buffering for the classifier.
//!
//! Frames are processed strictly in input order: the classifier reads the
//! frame axis as time, so reordering would change the prediction.

use std::sync::Arc;

use crate::error::InferenceError;
use crate::pose::{Frame, KeypointExtractor, SequenceClassifier, preprocess};

pub mod batch;

/// Ordered per-frame feature vectors stored row-major as (frames, features)
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    frames: usize,
    features: usize,
    data: Vec<f32>,
}

impl Sequence {
    /// Stack equally sized rows into one sequence.
    /// Every row must have the length of the first one.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, InferenceError> {
        let features = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * features);

        for (index, row) in rows.iter().enumerate() {
            if row.len() != features {
                return Err(InferenceError::Shape {
                    expected: format!("{features} features per frame"),
                    got: format!("{} features at frame {index}", row.len()),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            frames: rows.len(),
            features,
            data,
        })
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn features(&self) -> usize {
        self.features
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Shape of the batch-of-one tensor handed to the classifier
    pub fn batch_shape(&self) -> [usize; 3] {
        [1, self.frames, self.features]
    }
}

/// Result of running the builder on one request's frames
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceOutcome {
    /// Classifier output plus the keypoint vector used for each frame, in input order
    Prediction {
        scores: Vec<Vec<f32>>,
        keypoints: Vec<Vec<f32>>,
    },
    /// No frames, so the classifier was not consulted
    Insufficient,
}

/// Turns an ordered list of frames into one prediction.
///
/// Holds the shared, read-only models; cheap to clone into request handlers.
#[derive(Clone)]
pub struct SequenceBuilder {
    extractor: Arc<dyn KeypointExtractor>,
    classifier: Arc<dyn SequenceClassifier>,
}

impl SequenceBuilder {
    pub fn new(
        extractor: Arc<dyn KeypointExtractor>,
        classifier: Arc<dyn SequenceClassifier>,
    ) -> Self {
        Self {
            extractor,
            classifier,
        }
    }

    /// Flattened keypoints for each frame, in order
    pub fn keypoints(&self, frames: &[Frame]) -> Result<Vec<Vec<f32>>, InferenceError> {
        frames
            .iter()
            .map(|frame| self.extractor.extract(&preprocess(frame)))
            .collect()
    }

    pub fn run(&self, frames: &[Frame]) -> Result<SequenceOutcome, InferenceError> {
        let keypoints = self.keypoints(frames)?;
        if keypoints.is_empty() {
            return Ok(SequenceOutcome::Insufficient);
        }

        let sequence = Sequence::from_rows(&keypoints)?;
        log::debug!(
            "[sequence] Classifying batch of shape {:?}",
            sequence.batch_shape()
        );
        let scores = self.classifier.predict(&sequence)?;

        Ok(SequenceOutcome::Prediction { scores, keypoints })
    }
}

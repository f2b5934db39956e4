//! Pose models: frame preparation and the two pluggable inference seams.

use image::RgbImage;

use crate::error::{DecodeError, InferenceError};
use crate::sequence::Sequence;

mod classifier;
mod movenet;
mod preprocess;

pub use classifier::LstmClassifier;
pub use movenet::MoveNet;
pub use preprocess::{PreparedFrame, augment, preprocess};

/// Decoded RGB frame, height x width x 3
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Decode encoded image bytes (JPEG, PNG, ...) into an RGB frame
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let image = image::load_from_memory(bytes)?.to_rgb8();
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Pluggable keypoint extractor (MoveNet in production)
pub trait KeypointExtractor: Send + Sync {
    /// Run the model on one prepared frame and return its flattened keypoints.
    /// Layout is joint-major: `[y, x, confidence]` per joint.
    fn extract(&self, frame: &PreparedFrame) -> Result<Vec<f32>, InferenceError>;
}

/// Pluggable sequence classifier (exported LSTM in production)
pub trait SequenceClassifier: Send + Sync {
    /// Score a batch-of-one sequence, returns one row of class scores per batch item
    fn predict(&self, sequence: &Sequence) -> Result<Vec<Vec<f32>>, InferenceError>;
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decode_png_bytes() {
        let img = RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");

        let frame = Frame::decode(&bytes).expect("decode png");
        assert_eq!((frame.width(), frame.height()), (4, 3));
        assert_eq!(frame.image.get_pixel(2, 1).0, [10, 20, 30]);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = Frame::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DecodeError::Image(_)));
    }
}

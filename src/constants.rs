//! Application constants

/// Side length of the square MoveNet input (thunder variant)
pub const TARGET_SIZE: u32 = 256;

/// Color channels fed to the keypoint model
pub const CHANNELS: usize = 3;

/// Joints reported by single-pose MoveNet
pub const KEYPOINT_COUNT: usize = 17;

/// Values per joint: y, x, confidence
pub const VALUES_PER_KEYPOINT: usize = 3;

/// Flattened feature length of one frame
pub const FEATURES_PER_FRAME: usize = KEYPOINT_COUNT * VALUES_PER_KEYPOINT;

/// Body returned with 202 when a request carries no frames
pub const INSUFFICIENT_FRAMES_MESSAGE: &str = "Insufficient frames to make a prediction.";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Default origin allowed by CORS (the webcam frontend)
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Default request body limit (64 MB); a batch of data-URL frames is large
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub const DEFAULT_KEYPOINT_MODEL_PATH: &str = "models/movenet_thunder.onnx";

pub const DEFAULT_CLASSIFIER_MODEL_PATH: &str = "models/exercise_classifier.onnx";

/// Frames per training sequence
pub const DEFAULT_SEQUENCE_LENGTH: usize = 20;

/// Keep every n-th frame of a video when building training sequences
pub const DEFAULT_STRIDE: usize = 2;

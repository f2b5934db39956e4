//! Data-URL payload decoding for incoming frames

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::DecodeError;
use crate::pose::Frame;

/// Split a `data:image/...;base64,<payload>` string and return the raw bytes.
/// Everything after the first comma is the payload.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, DecodeError> {
    let (_, payload) = data_url
        .split_once(',')
        .ok_or(DecodeError::MissingPayload)?;

    Ok(STANDARD.decode(payload.trim())?)
}

/// Decode every data URL into a frame, preserving order.
/// Fails on the first unusable item.
pub fn decode_frames(images: &[String]) -> Result<Vec<Frame>, DecodeError> {
    images
        .iter()
        .map(|image| Frame::decode(&decode_data_url(image)?))
        .collect()
}

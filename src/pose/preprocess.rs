use image::imageops::{self, FilterType};
use rand::Rng;

use super::Frame;
use crate::constants::{CHANNELS, TARGET_SIZE};

const MAX_BRIGHTNESS_DELTA: f32 = 0.1;
const CONTRAST_LOWER: f32 = 0.9;
const CONTRAST_UPPER: f32 = 1.1;

/// Square HWC frame of `i32` pixel values, ready for the keypoint model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedFrame {
    pub size: u32,
    pub data: Vec<i32>,
}

impl PreparedFrame {
    fn blank(size: u32) -> Self {
        Self {
            size,
            data: vec![0; size as usize * size as usize * CHANNELS],
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.size as usize + x as usize) * CHANNELS
    }

    pub fn pixel(&self, x: u32, y: u32) -> [i32; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    fn flip_horizontal(&mut self) {
        let pixels = self.size as usize;
        for row in self.data.chunks_exact_mut(pixels * CHANNELS) {
            for x in 0..pixels / 2 {
                let mirror = pixels - 1 - x;
                for c in 0..CHANNELS {
                    row.swap(x * CHANNELS + c, mirror * CHANNELS + c);
                }
            }
        }
    }
}

/// Resize with padding to TARGET_SIZE x TARGET_SIZE and cast to i32.
///
/// The frame is scaled by `min(target / w, target / h)` with bilinear
/// filtering so the aspect ratio survives, then centered on a black canvas.
/// No randomness: the same frame always produces the same output.
pub fn preprocess(frame: &Frame) -> PreparedFrame {
    let mut prepared = PreparedFrame::blank(TARGET_SIZE);
    let (w, h) = (frame.width(), frame.height());
    if w == 0 || h == 0 {
        return prepared;
    }

    let target = TARGET_SIZE as f64;
    let scale = (target / w as f64).min(target / h as f64);
    let new_w = ((w as f64 * scale).floor() as u32).clamp(1, TARGET_SIZE);
    let new_h = ((h as f64 * scale).floor() as u32).clamp(1, TARGET_SIZE);

    let resized = if (new_w, new_h) == (w, h) {
        frame.image.clone()
    } else {
        imageops::resize(&frame.image, new_w, new_h, FilterType::Triangle)
    };

    let pad_x = (TARGET_SIZE - new_w) / 2;
    let pad_y = (TARGET_SIZE - new_h) / 2;

    for (x, y, pixel) in resized.enumerate_pixels() {
        let i = prepared.offset(x + pad_x, y + pad_y);
        for (c, value) in pixel.0.iter().enumerate() {
            prepared.data[i + c] = *value as i32;
        }
    }

    prepared
}

/// Training-time augmentation: random horizontal flip, brightness and contrast jitter.
/// Never used on the serving path.
pub fn augment<R: Rng + ?Sized>(mut frame: PreparedFrame, rng: &mut R) -> PreparedFrame {
    if rng.random_bool(0.5) {
        frame.flip_horizontal();
    }

    let delta = rng.random_range(-MAX_BRIGHTNESS_DELTA..=MAX_BRIGHTNESS_DELTA) * 255.0;
    let factor = rng.random_range(CONTRAST_LOWER..=CONTRAST_UPPER);

    let brightened: Vec<f32> = frame.data.iter().map(|v| *v as f32 + delta).collect();

    // Contrast is applied around each channel's mean
    let pixel_count = (brightened.len() / CHANNELS).max(1) as f32;
    let mut means = [0f32; CHANNELS];
    for pixel in brightened.chunks_exact(CHANNELS) {
        for (c, value) in pixel.iter().enumerate() {
            means[c] += value;
        }
    }
    for mean in means.iter_mut() {
        *mean /= pixel_count;
    }

    for (i, value) in brightened.iter().enumerate() {
        let mean = means[i % CHANNELS];
        let adjusted = (value - mean) * factor + mean;
        frame.data[i] = adjusted.round().clamp(0.0, 255.0) as i32;
    }

    frame
}

//! Hand landmark inference with an ONNX model.
//!
//! Expects the usual single-hand landmark network: one NHWC float input of
//! `INPUT_SIZE` x `INPUT_SIZE` RGB in [0, 1], a flat `[1, 63]` landmark output
//! in input pixels, and a `[1, 1]` hand presence score.

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use pinch_core::{sanitize_frame, HandLandmarks, LANDMARK_COUNT};

use crate::camera::{CameraFeed, RgbFrame};

pub const MODEL_PATH: &str = "hand_landmark.onnx";

const INPUT_SIZE: usize = 224;
const INPUT_NAME: &str = "input_1";
const LANDMARKS_OUTPUT: &str = "Identity";
const PRESENCE_OUTPUT: &str = "Identity_1";
const PRESENCE_THRESHOLD: f32 = 0.5;

/// Centered square crop of a frame, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crop {
    pub x0: u32,
    pub y0: u32,
    pub side: u32,
}

impl Crop {
    pub fn centered(width: u32, height: u32) -> Self {
        let side = width.min(height);
        Self {
            x0: (width - side) / 2,
            y0: (height - side) / 2,
            side,
        }
    }
}

/// Nearest-neighbour resize of the centered crop into a `[1, S, S, 3]` tensor.
pub fn preprocess(frame: &RgbFrame, crop: Crop, size: usize) -> Array4<f32> {
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
    if crop.side == 0 {
        return tensor;
    }
    let scale = crop.side as f32 / size as f32;
    for y in 0..size {
        let sy = crop.y0 + ((y as f32 + 0.5) * scale) as u32;
        let sy = sy.min(frame.height - 1);
        for x in 0..size {
            let sx = crop.x0 + ((x as f32 + 0.5) * scale) as u32;
            let sx = sx.min(frame.width - 1);
            for (c, v) in frame.pixel(sx, sy).into_iter().enumerate() {
                tensor[[0, y, x, c]] = v as f32 / 255.0;
            }
        }
    }
    tensor
}

/// Map raw model output to frame-normalized `[x, y, z]` points.
///
/// Returns `None` when the presence score is below threshold; malformed
/// output is left for [`sanitize_frame`] to reject.
pub fn decode_landmarks(
    raw: &[f32],
    presence: f32,
    crop: Crop,
    frame_w: u32,
    frame_h: u32,
    size: usize,
) -> Option<Vec<[f32; 3]>> {
    if presence < PRESENCE_THRESHOLD {
        return None;
    }
    let to_src = crop.side as f32 / size as f32;
    let points = raw
        .chunks_exact(3)
        .take(LANDMARK_COUNT)
        .map(|p| {
            let x = (crop.x0 as f32 + p[0] * to_src) / frame_w as f32;
            let y = (crop.y0 as f32 + p[1] * to_src) / frame_h as f32;
            let z = p[2] / size as f32;
            [x, y, z]
        })
        .collect();
    Some(points)
}

pub struct HandDetector {
    session: Session,
}

impl HandDetector {
    pub fn new(model_path: &Path) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load hand model {}", model_path.display()))?;
        log::info!("[detector] loaded {}", model_path.display());
        Ok(Self { session })
    }

    /// Run the model on one frame. `Ok(None)` means no hand is visible.
    pub fn detect(&mut self, frame: &RgbFrame) -> Result<Option<HandLandmarks>> {
        let crop = Crop::centered(frame.width, frame.height);
        let input = preprocess(frame, crop, INPUT_SIZE);
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![INPUT_NAME => input_tensor])
            .context("inference failed")?;
        let landmarks: ndarray::ArrayViewD<f32> = outputs[LANDMARKS_OUTPUT]
            .try_extract_array()
            .context("failed to extract landmarks")?;
        let presence: ndarray::ArrayViewD<f32> = outputs[PRESENCE_OUTPUT]
            .try_extract_array()
            .context("failed to extract presence")?;

        let score = presence.iter().copied().next().unwrap_or(0.0);
        let raw: Vec<f32> = landmarks.iter().copied().collect();
        let points = decode_landmarks(&raw, score, crop, frame.width, frame.height, INPUT_SIZE);
        Ok(sanitize_frame(points.as_deref()))
    }
}

/// Camera plus detector: one call per game frame.
pub struct HandTracker {
    camera: CameraFeed,
    detector: HandDetector,
}

impl HandTracker {
    pub fn open(model_path: &Path) -> Result<Self> {
        let detector = HandDetector::new(model_path)?;
        let camera = CameraFeed::open(0)?;
        Ok(Self { camera, detector })
    }

    /// `None` when the frame could not be captured or processed and should be
    /// skipped; `Some(None)` when the frame is fine but shows no hand.
    pub fn poll(&mut self) -> Option<Option<HandLandmarks>> {
        let frame = match self.camera.capture() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("[camera] frame skipped: {err:#}");
                return None;
            }
        };
        match self.detector.detect(&frame) {
            // shown as a mirror image, so flip to match what the player sees
            Ok(hand) => Some(hand.map(|h| h.mirrored())),
            Err(err) => {
                log::debug!("[detector] frame skipped: {err:#}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_is_centered_square() {
        assert_eq!(
            Crop::centered(640, 480),
            Crop {
                x0: 80,
                y0: 0,
                side: 480
            }
        );
    }

    #[test]
    fn preprocess_scales_to_unit_range() {
        let frame = RgbFrame {
            width: 4,
            height: 2,
            data: vec![255; 4 * 2 * 3],
        };
        let t = preprocess(&frame, Crop::centered(4, 2), 8);
        assert_eq!(t.shape(), &[1, 8, 8, 3]);
        assert!(t.iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn landmarks_map_back_to_frame_coordinates() {
        let crop = Crop::centered(640, 480);
        let mut raw = vec![0.0f32; LANDMARK_COUNT * 3];
        raw[0] = 112.0;
        raw[1] = 112.0;
        let pts = decode_landmarks(&raw, 0.9, crop, 640, 480, 224).unwrap();
        assert_eq!(pts.len(), LANDMARK_COUNT);
        assert!((pts[0][0] - 0.5).abs() < 1e-5);
        assert!((pts[0][1] - 0.5).abs() < 1e-5);
        assert!((pts[1][0] - 80.0 / 640.0).abs() < 1e-5);
    }

    #[test]
    fn low_presence_means_no_hand() {
        let raw = vec![0.5f32; LANDMARK_COUNT * 3];
        let crop = Crop::centered(10, 10);
        assert!(decode_landmarks(&raw, 0.1, crop, 10, 10, 224).is_none());
    }
}

//! Single-face BlazeFace detector running on ONNX Runtime via `ort`.
//!
//! The short-range model scores 896 fixed anchors per image; in single-face
//! mode only the best-scoring anchor is decoded.
use std::path::Path;

use crate::detection::domain::detection::{BoundingBox, Detection};
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::dimensions::Dimensions;
use crate::shared::frame::Frame;

use super::execution_provider::load_session;
use super::model_resolver::ModelLoadError;

/// BlazeFace model input resolution.
const INPUT_SIZE: usize = 128;

const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output: box (4) + 6 keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    min_confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceDetector {
    pub fn new(model_path: &Path, min_confidence: f64) -> Result<Self, ModelLoadError> {
        let session = load_session(model_path)?;
        log::info!(
            "Loaded face model {} (min confidence {min_confidence:.2})",
            model_path.display()
        );
        Ok(Self {
            session,
            min_confidence,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>, Box<dyn std::error::Error>> {
        let input = ort::value::Tensor::from_array(preprocess(frame))?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() < 2 {
            return Err(format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into());
        }

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let limit = self.anchors.len().min(score_data.len());
        let Some((i, score)) = best_anchor(&score_data[..limit], self.min_confidence) else {
            return Ok(None);
        };
        let offset = i * REGRESSOR_STRIDE;
        let Some(reg) = reg_data.get(offset..offset + 4) else {
            return Err(format!("regressor output too short for anchor {i}").into());
        };

        let bbox = decode_box(self.anchors[i], [reg[0], reg[1], reg[2], reg[3]], frame.dimensions());
        Ok(Some(Detection::new(bbox, score, frame.dimensions())))
    }
}

/// Nearest-neighbour resize to `INPUT_SIZE²` sampling pixel centres, NCHW.
///
/// Values are scaled to [-1, 1], the range of the MediaPipe short-range
/// graph. Exports normalised to [0, 1] score far lower and fail the
/// confidence threshold without any error.
fn preprocess(frame: &Frame) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let sample = |dst: usize, src_len: usize| {
        (((dst as f64 + 0.5) * src_len as f64 / INPUT_SIZE as f64) as usize)
            .min(src_len.saturating_sub(1))
    };

    ndarray::Array4::from_shape_fn((1, 3, INPUT_SIZE, INPUT_SIZE), |(_, c, y, x)| {
        src[[sample(y, src_h), sample(x, src_w), c]] as f32 / 127.5 - 1.0
    })
}

/// Anchor centres for the short-range model: a 16×16 grid with 2 anchors
/// per cell followed by an 8×8 grid with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);
    for (stride, per_cell) in [(8usize, 2usize), (16, 6)] {
        let grid = INPUT_SIZE / stride;
        for y in 0..grid {
            for x in 0..grid {
                let centre = [
                    (x as f32 + 0.5) / grid as f32,
                    (y as f32 + 0.5) / grid as f32,
                ];
                anchors.extend(std::iter::repeat(centre).take(per_cell));
            }
        }
    }
    anchors
}

/// Index and probability of the highest-scoring anchor at or above
/// `min_confidence`. Raw scores are logits.
fn best_anchor(logits: &[f32], min_confidence: f64) -> Option<(usize, f64)> {
    logits
        .iter()
        .enumerate()
        .map(|(i, &logit)| (i, sigmoid(logit) as f64))
        .filter(|&(_, score)| score >= min_confidence)
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Decode `[dx, dy, w, h]` (in input pixels) relative to an anchor centre
/// into a box in frame coordinates.
fn decode_box(anchor: [f32; 2], reg: [f32; 4], frame: Dimensions) -> BoundingBox {
    let size = INPUT_SIZE as f64;
    let cx = anchor[0] as f64 + reg[0] as f64 / size;
    let cy = anchor[1] as f64 + reg[1] as f64 / size;
    let w = reg[2] as f64 / size;
    let h = reg[3] as f64 / size;

    let fw = frame.width as f64;
    let fh = frame.height as f64;
    BoundingBox::from_corners(
        (cx - w / 2.0) * fw,
        (cy - h / 2.0) * fh,
        (cx + w / 2.0) * fw,
        (cy + h / 2.0) * fh,
        frame,
    )
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_preprocess_shape_and_range() {
        let frame = Frame::new(vec![255u8; 200 * 100 * 3], 200, 100, 0);
        let tensor = preprocess(&frame);
        assert_eq!(tensor.shape(), &[1, 3, 128, 128]);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 1.0);

        let dark = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 0);
        assert_relative_eq!(preprocess(&dark)[[0, 2, 127, 127]], -1.0);
    }

    #[test]
    fn test_preprocess_samples_matching_channel() {
        // 1x1 image, R=255 G=0 B=0
        let frame = Frame::new(vec![255, 0, 0], 1, 1, 0);
        let tensor = preprocess(&frame);
        assert_relative_eq!(tensor[[0, 0, 64, 64]], 1.0);
        assert_relative_eq!(tensor[[0, 1, 64, 64]], -1.0);
    }

    #[test]
    fn test_preprocess_samples_pixel_centres() {
        // 256 wide: output column 0 maps to source column 1 (centre of 0..2).
        let mut data = vec![0u8; 256 * 3];
        data[3] = 255;
        let frame = Frame::new(data, 256, 1, 0);
        let tensor = preprocess(&frame);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_relative_eq!(tensor[[0, 0, 0, 1]], -1.0);
    }

    #[test]
    fn test_anchor_count_and_range() {
        let anchors = generate_anchors();
        assert_eq!(anchors.len(), NUM_ANCHORS);
        assert!(anchors
            .iter()
            .all(|a| a[0] > 0.0 && a[0] < 1.0 && a[1] > 0.0 && a[1] < 1.0));
    }

    #[test]
    fn test_best_anchor_picks_highest_score() {
        let logits = [-5.0, 2.0, 4.0, 0.5];
        let (i, score) = best_anchor(&logits, 0.5).unwrap();
        assert_eq!(i, 2);
        assert_relative_eq!(score, sigmoid(4.0) as f64);
    }

    #[test]
    fn test_best_anchor_none_below_threshold() {
        // sigmoid(-0.1) < 0.5
        assert!(best_anchor(&[-3.0, -0.1], 0.5).is_none());
        assert!(best_anchor(&[], 0.5).is_none());
    }

    #[test]
    fn test_decode_box_centred_on_anchor() {
        // Zero offset, 64px square in input space = half the frame.
        let b = decode_box([0.5, 0.5], [0.0, 0.0, 64.0, 64.0], Dimensions::new(640, 480));
        assert_relative_eq!(b.x, 160.0);
        assert_relative_eq!(b.y, 120.0);
        assert_relative_eq!(b.width, 320.0);
        assert_relative_eq!(b.height, 240.0);
    }

    #[test]
    fn test_decode_box_clamped_at_edge() {
        let b = decode_box([0.0625, 0.5], [0.0, 0.0, 32.0, 32.0], Dimensions::new(640, 480));
        assert_relative_eq!(b.x, 0.0);
        assert!(b.width < 0.25 * 640.0);
    }

    #[test]
    fn test_sigmoid_midpoint() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
    }
}

use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for single-face detection.
///
/// Returns at most one face: the most confident one at or above the
/// detector's minimum confidence. `None` means no face, which is the normal
/// outcome for most frames and not an error.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>, Box<dyn std::error::Error>>;
}

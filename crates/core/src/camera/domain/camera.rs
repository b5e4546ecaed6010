use crate::camera::domain::camera_error::CameraError;
use crate::shared::constants::{CAMERA_HEIGHT, CAMERA_WIDTH};
use crate::shared::dimensions::Dimensions;
use crate::shared::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacingMode {
    /// Front-facing, toward the user.
    User,
    Environment,
}

/// What is asked of the capture device when access is requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraConstraints {
    pub audio: bool,
    pub width: u32,
    pub height: u32,
    pub facing: FacingMode,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            audio: false,
            width: CAMERA_WIDTH,
            height: CAMERA_HEIGHT,
            facing: FacingMode::User,
        }
    }
}

impl CameraConstraints {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Loaded metadata of an opened stream.
///
/// The device may not honour the requested size, so `dimensions` is the
/// native size frames will actually arrive at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    pub dimensions: Dimensions,
    pub device_name: String,
}

/// A live video source.
///
/// Not `Send`: native device handles stay on the thread that opened them.
///
/// `open` resolves once access is granted and the stream metadata is
/// known; `play` starts delivering frames.
pub trait Camera {
    fn open(&mut self, constraints: &CameraConstraints) -> Result<StreamInfo, CameraError>;

    fn play(&mut self) -> Result<(), CameraError>;

    /// Returns the most recent frame, blocking until one is available.
    fn frame(&mut self) -> Result<Frame, CameraError>;

    /// Releases the device. Safe to call more than once.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints_match_camera_request() {
        let c = CameraConstraints::default();
        assert!(!c.audio);
        assert_eq!(c.dimensions(), Dimensions::new(640, 480));
        assert_eq!(c.facing, FacingMode::User);
    }
}

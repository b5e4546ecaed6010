//! Webcam capture through `nokhwa` using the platform's native backend.
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};

use crate::camera::domain::camera::{Camera, CameraConstraints, FacingMode, StreamInfo};
use crate::camera::domain::camera_error::CameraError;
use crate::shared::dimensions::Dimensions;
use crate::shared::frame::Frame;

const REQUESTED_FPS: u32 = 30;

/// Native webcam opened by device index.
///
/// Native backends cannot tell which way a device faces; index 0 is the
/// built-in (front) camera on laptops, which is what `FacingMode::User`
/// resolves to unless another index is configured.
pub struct NokhwaCamera {
    index: u32,
    device: Option<nokhwa::Camera>,
    frames_read: usize,
}

impl NokhwaCamera {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            device: None,
            frames_read: 0,
        }
    }

    /// Names of the capture devices the native backend can see.
    pub fn list_devices() -> Result<Vec<(u32, String)>, CameraError> {
        let cameras = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| CameraError::not_allowed(e.to_string()))?;
        Ok(cameras
            .iter()
            .filter_map(|info| match info.index() {
                CameraIndex::Index(i) => Some((*i, info.human_name())),
                CameraIndex::String(_) => None,
            })
            .collect())
    }

    fn device_mut(&mut self) -> Result<&mut nokhwa::Camera, CameraError> {
        self.device.as_mut().ok_or(CameraError::NotOpen)
    }
}

impl Camera for NokhwaCamera {
    fn open(&mut self, constraints: &CameraConstraints) -> Result<StreamInfo, CameraError> {
        if constraints.facing == FacingMode::Environment {
            log::debug!("Facing mode is not selectable natively, using device {}", self.index);
        }

        let devices = Self::list_devices()?;
        if !devices.iter().any(|(i, _)| *i == self.index) {
            return Err(CameraError::not_found(format!(
                "no capture device at index {} ({} found)",
                self.index,
                devices.len()
            )));
        }

        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(constraints.width, constraints.height),
                FrameFormat::MJPEG,
                REQUESTED_FPS,
            ),
        ));
        let device = nokhwa::Camera::new(CameraIndex::Index(self.index), format)
            .map_err(|e| CameraError::not_allowed(e.to_string()))?;

        let resolution = device.resolution();
        let info = StreamInfo {
            dimensions: Dimensions::new(resolution.width(), resolution.height()),
            device_name: device.info().human_name(),
        };
        self.device = Some(device);
        self.frames_read = 0;
        Ok(info)
    }

    fn play(&mut self) -> Result<(), CameraError> {
        self.device_mut()?
            .open_stream()
            .map_err(|e| CameraError::not_allowed(e.to_string()))
    }

    fn frame(&mut self) -> Result<Frame, CameraError> {
        let index = self.frames_read;
        let buffer = self
            .device_mut()?
            .frame()
            .map_err(|e| CameraError::Capture(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Capture(e.to_string()))?;
        let (width, height) = decoded.dimensions();
        self.frames_read += 1;
        Ok(Frame::new(decoded.into_raw(), width, height, index))
    }

    fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.stop_stream() {
                log::warn!("Failed to stop camera stream: {e}");
            }
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_before_open_is_not_open() {
        let mut camera = NokhwaCamera::new(0);
        assert!(matches!(camera.frame(), Err(CameraError::NotOpen)));
    }

    #[test]
    fn test_play_before_open_is_not_open() {
        let mut camera = NokhwaCamera::new(0);
        assert!(matches!(camera.play(), Err(CameraError::NotOpen)));
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut camera = NokhwaCamera::new(3);
        camera.close();
        camera.close();
    }
}

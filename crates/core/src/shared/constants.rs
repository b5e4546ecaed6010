use std::time::Duration;

/// BlazeFace short-range model file, looked up in the asset directory and
/// the user cache.
pub const FACE_MODEL_NAME: &str = "blazeface_short_range.onnx";

/// Directory the model assets are served from, relative to the working
/// directory.
pub const DEFAULT_MODEL_DIR: &str = "models";

pub const CAMERA_WIDTH: u32 = 640;
pub const CAMERA_HEIGHT: u32 = 480;

/// Minimum detector score for a face to be accepted.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Wait between requesting the camera and the first detection attempt.
pub const DEFAULT_START_DELAY: Duration = Duration::from_millis(2000);

/// Display refresh rate the detection ticks are paced at.
pub const DEFAULT_REFRESH_HZ: u32 = 60;

pub mod camera;
pub mod camera_error;

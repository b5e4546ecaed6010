//! Webcam capture and single-face detection.
//!
//! The crate is split the same way in every area: `domain` holds the
//! interfaces and value types, `infrastructure` holds the implementations
//! backed by devices and model runtimes. `session` ties a camera and a
//! detector together into the capture/detect loop.

pub mod camera;
pub mod detection;
pub mod session;
pub mod shared;

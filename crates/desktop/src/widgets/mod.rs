pub mod face_overlay;
pub mod loader;
pub mod start_button;

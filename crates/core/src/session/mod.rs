pub mod capture_loop;
pub mod loop_config;
pub mod overlay_canvas;
pub mod refresh_clock;
pub mod session_logger;
pub mod view_state;

use crate::shared::constants::{CAMERA_HEIGHT, CAMERA_WIDTH};

/// Width/height pair of a video stream, frame or drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Size the video element and canvas are laid out at.
    pub const DISPLAY: Dimensions = Dimensions {
        width: CAMERA_WIDTH,
        height: CAMERA_HEIGHT,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Per-axis factors mapping coordinates in `self` onto `target`.
    ///
    /// An empty source maps everything to the origin rather than dividing by
    /// zero.
    pub fn scale_to(&self, target: Dimensions) -> (f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0);
        }
        (
            target.width as f64 / self.width as f64,
            target.height as f64 / self.height as f64,
        )
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

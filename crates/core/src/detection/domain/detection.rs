use crate::shared::dimensions::Dimensions;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from corner coordinates, clamped to `bounds`.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64, bounds: Dimensions) -> Self {
        let max_x = bounds.width as f64;
        let max_y = bounds.height as f64;
        let left = x1.clamp(0.0, max_x);
        let top = y1.clamp(0.0, max_y);
        let right = x2.clamp(0.0, max_x);
        let bottom = y2.clamp(0.0, max_y);
        Self::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0))
    }

    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A single detected face, valid for one frame.
///
/// `image` is the size of the picture the box coordinates refer to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub score: f64,
    pub image: Dimensions,
}

impl Detection {
    pub fn new(bbox: BoundingBox, score: f64, image: Dimensions) -> Self {
        Self { bbox, score, image }
    }

    pub fn passes(&self, min_confidence: f64) -> bool {
        self.score >= min_confidence
    }

    /// Re-expresses the box in the coordinate space of `target`.
    pub fn resized(&self, target: Dimensions) -> Detection {
        let (sx, sy) = self.image.scale_to(target);
        Detection {
            bbox: self.bbox.scaled(sx, sy),
            score: self.score,
            image: target,
        }
    }
}

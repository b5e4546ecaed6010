use image::{Rgba, RgbaImage};

use crate::detection::domain::detection::Detection;
use crate::shared::dimensions::Dimensions;

const BOX_COLOR: Rgba<u8> = Rgba([0x42, 0x86, 0xf4, 0xff]);
const BOX_LINE_WIDTH: u32 = 2;
const SCORE_BAR_HEIGHT: u32 = 4;

/// Drawing surface layered over the video.
///
/// Laid out at [`Dimensions::DISPLAY`] but resized internally to the
/// video's native size before each draw. Holds at most one box.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayCanvas {
    dimensions: Dimensions,
    drawn: Option<Detection>,
}

impl Default for OverlayCanvas {
    fn default() -> Self {
        Self::new(Dimensions::DISPLAY)
    }
}

impl OverlayCanvas {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            drawn: None,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn drawn(&self) -> Option<&Detection> {
        self.drawn.as_ref()
    }

    /// Resizing a canvas wipes its contents.
    pub fn resize(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
        self.drawn = None;
    }

    /// Replaces whatever was drawn with `detection`, which must already be in
    /// canvas coordinates.
    pub fn draw(&mut self, detection: Detection) {
        debug_assert_eq!(detection.image, self.dimensions);
        self.drawn = Some(detection);
    }

    pub fn clear(&mut self) {
        self.drawn = None;
    }
}

/// Sizes `canvas` to the video's native dimensions and returns `detection`
/// mapped into that space.
pub fn resize_canvas_and_result(
    video: Dimensions,
    canvas: &mut OverlayCanvas,
    detection: &Detection,
) -> Detection {
    canvas.resize(video);
    detection.resized(video)
}

/// Rasterizes the canvas: a transparent image with the box outline and a
/// bar along its top edge whose length is proportional to the score.
pub fn render_overlay(canvas: &OverlayCanvas) -> RgbaImage {
    let Dimensions { width, height } = canvas.dimensions();
    let mut img = RgbaImage::new(width, height);
    let Some(detection) = canvas.drawn() else {
        return img;
    };
    if width == 0 || height == 0 {
        return img;
    }

    // Corners are sorted so boxes with negative extents still rasterize.
    let b = detection.bbox;
    let to_px = |v: f64, limit: u32| (v.max(0.0) as u32).min(limit - 1);
    let x0 = to_px(b.x.min(b.right()), width);
    let y0 = to_px(b.y.min(b.bottom()), height);
    let x1 = to_px(b.x.max(b.right()), width);
    let y1 = to_px(b.y.max(b.bottom()), height);

    for t in 0..BOX_LINE_WIDTH {
        hline(&mut img, x0, x1, y0.saturating_add(t).min(y1));
        hline(&mut img, x0, x1, y1.saturating_sub(t).max(y0));
        vline(&mut img, x0.saturating_add(t).min(x1), y0, y1);
        vline(&mut img, x1.saturating_sub(t).max(x0), y0, y1);
    }

    let bar_len = (x1.saturating_sub(x0) as f64 * detection.score.clamp(0.0, 1.0)) as u32;
    let bar_top = y0.saturating_sub(SCORE_BAR_HEIGHT);
    for y in bar_top..y0 {
        hline(&mut img, x0, x0 + bar_len, y);
    }

    img
}

/// Blends the overlay on top of a video frame.
pub fn composite(frame: &image::RgbImage, overlay: &RgbaImage) -> RgbaImage {
    let mut out = image::DynamicImage::ImageRgb8(frame.clone()).into_rgba8();
    image::imageops::overlay(&mut out, overlay, 0, 0);
    out
}

fn hline(img: &mut RgbaImage, x0: u32, x1: u32, y: u32) {
    for x in x0..=x1.min(img.width() - 1) {
        img.put_pixel(x, y, BOX_COLOR);
    }
}

fn vline(img: &mut RgbaImage, x: u32, y0: u32, y1: u32) {
    for y in y0..=y1.min(img.height() - 1) {
        img.put_pixel(x, y, BOX_COLOR);
    }
}

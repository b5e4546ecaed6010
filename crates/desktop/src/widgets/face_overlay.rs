use iced::mouse;
use iced::widget::canvas::{self, Frame, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use facecam_core::detection::domain::detection::Detection;
use facecam_core::session::overlay_canvas::OverlayCanvas;
use facecam_core::shared::dimensions::Dimensions;

const LINE_WIDTH: f32 = 2.0;
const LABEL_SIZE: f32 = 14.0;
const LABEL_PADDING: f32 = 4.0;

/// Draws the overlay canvas's box on top of the video.
///
/// The canvas holds the box in native video coordinates; it is stretched to
/// whatever size the widget is laid out at.
pub struct FaceOverlay {
    detection: Option<Detection>,
}

impl FaceOverlay {
    pub fn new(canvas: &OverlayCanvas) -> Self {
        Self {
            detection: canvas.drawn().copied(),
        }
    }
}

impl<Message> canvas::Program<Message> for FaceOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let Some(detection) = self.detection else {
            return vec![frame.into_geometry()];
        };

        let shown = detection.resized(Dimensions::new(
            bounds.width.round() as u32,
            bounds.height.round() as u32,
        ));
        let color = theme.palette().primary;
        let top_left = Point::new(shown.bbox.x as f32, shown.bbox.y as f32);
        let size = Size::new(shown.bbox.width as f32, shown.bbox.height as f32);
        frame.stroke(
            &Path::rectangle(top_left, size),
            Stroke::default().with_color(color).with_width(LINE_WIDTH),
        );

        let label = format!("{:.2}", detection.score);
        let label_height = LABEL_SIZE + LABEL_PADDING * 2.0;
        let label_width = label.len() as f32 * LABEL_SIZE * 0.6 + LABEL_PADDING * 2.0;
        let label_origin = Point::new(top_left.x, (top_left.y - label_height).max(0.0));
        frame.fill_rectangle(label_origin, Size::new(label_width, label_height), color);
        frame.fill_text(canvas::Text {
            content: label,
            position: Point::new(
                label_origin.x + LABEL_PADDING,
                label_origin.y + LABEL_PADDING,
            ),
            color: Color::WHITE,
            size: LABEL_SIZE.into(),
            ..canvas::Text::default()
        });

        vec![frame.into_geometry()]
    }
}

use iced::widget::{canvas, center, column, container, image, stack, text, Space};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme};

use facecam_core::session::overlay_canvas::OverlayCanvas;
use facecam_core::session::view_state::ViewState;
use facecam_core::shared::dimensions::Dimensions;

use crate::app::Message;
use crate::widgets::face_overlay::FaceOverlay;
use crate::widgets::loader::loader;
use crate::widgets::start_button::start_button;

const START_LABEL: &str = "Detect face";

/// Everything the detection screen draws. Visibility of the button, the
/// loader and the blur comes from `state` alone.
pub struct Props<'a> {
    pub state: ViewState,
    pub video: Option<&'a image::Handle>,
    pub canvas: &'a OverlayCanvas,
    pub can_start: bool,
    pub start_hovered: bool,
    pub loader_tick: usize,
    pub status: Option<String>,
}

pub fn view(props: Props<'_>) -> Element<'_, Message> {
    let visibility = props.state.visibility();
    let width = Dimensions::DISPLAY.width as f32;
    let height = Dimensions::DISPLAY.height as f32;

    let video: Element<'_, Message> = match props.video {
        Some(handle) => image(handle.clone())
            .width(width)
            .height(height)
            .content_fit(ContentFit::Fill)
            .into(),
        None => container(Space::new())
            .width(width)
            .height(height)
            .style(|_theme: &Theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgb8(0x10, 0x10, 0x12))),
                ..container::Style::default()
            })
            .into(),
    };

    let overlay = canvas(FaceOverlay::new(props.canvas))
        .width(width)
        .height(height);

    let mut layers = stack![video, overlay].width(width).height(height);
    if visibility.loader {
        layers = layers.push(
            container(loader(props.loader_tick))
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(Alignment::Center)
                .align_y(Alignment::End)
                .padding(16),
        );
    }
    if visibility.start_button {
        let on_press = props.can_start.then_some(Message::StartDetect);
        layers = layers.push(center(start_button(
            START_LABEL,
            on_press,
            props.start_hovered,
            Message::StartHovered,
        )));
    }

    let mut content = column![layers].spacing(10).align_x(Alignment::Center);
    if let Some(status) = props.status {
        content = content.push(text(status).size(13));
    }

    center(content).padding(16).into()
}

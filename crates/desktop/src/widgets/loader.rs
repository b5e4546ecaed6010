use iced::border::Border;
use iced::widget::{container, text};
use iced::{Color, Element, Theme};

const MESSAGE: &str = "We are trying to detect your face";
const MAX_DOTS: usize = 3;

/// Status banner shown while the video is streaming but no face is known yet.
///
/// `tick` advances the trailing dots; callers bump it on every redraw.
pub fn loader<'a, Message: 'a>(tick: usize) -> Element<'a, Message> {
    container(text(label(tick)).size(15).color(Color::WHITE))
        .padding([10, 18])
        .style(|_theme: &Theme| container::Style {
            background: Some(iced::Background::Color(Color {
                a: 0.6,
                ..Color::BLACK
            })),
            border: Border {
                radius: 8.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

/// Message with 1..=3 dots; the padding keeps the width stable.
fn label(tick: usize) -> String {
    let dots = tick % MAX_DOTS + 1;
    format!("{MESSAGE}{}{}", ".".repeat(dots), " ".repeat(MAX_DOTS - dots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_cycles_dots() {
        assert_eq!(label(0), format!("{MESSAGE}.  "));
        assert_eq!(label(1), format!("{MESSAGE}.. "));
        assert_eq!(label(2), format!("{MESSAGE}..."));
        assert_eq!(label(3), label(0));
    }

    #[test]
    fn test_label_width_is_stable() {
        assert_eq!(label(0).len(), label(2).len());
    }
}

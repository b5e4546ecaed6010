use std::time::Duration;

use iced::border::Border;
use iced::widget::{button, container, mouse_area, row, text};
use iced::{Alignment, Color, Element, Padding, Shadow, Theme, Vector};
use iced_anim::transition::Easing;
use iced_anim::AnimationBuilder;

const LIFT: f32 = 2.0;
const CORNER_RADIUS: f32 = 6.0;
const HOVER_DARKEN: f32 = 0.06;
const SHADOW_BLUR: (f32, f32) = (8.0, 16.0);
const SHADOW_ALPHA: (f32, f32) = (0.20, 0.35);
const DISABLED_ALPHA: f32 = 0.45;
const ANIMATION_DURATION: Duration = Duration::from_millis(180);

/// Large positive "play" button that lifts on hover.
///
/// `on_press` is `None` while the button cannot be used yet (model still
/// loading or failed); it is then drawn faded and ignores clicks.
pub fn start_button<'a, Message: Clone + 'a>(
    label: &'a str,
    on_press: Option<Message>,
    hovered: bool,
    on_hover: impl Fn(bool) -> Message + 'a,
) -> Element<'a, Message> {
    let enabled = on_press.is_some();
    let target = if hovered && enabled { 1.0_f32 } else { 0.0 };

    let animated: Element<'a, Message> = AnimationBuilder::new(target, move |t: f32| {
        build(label, on_press.clone(), t.clamp(0.0, 1.0))
    })
    .animates_layout(true)
    .animation(Easing::EASE_OUT.with_duration(ANIMATION_DURATION))
    .into();

    mouse_area(animated)
        .on_enter(on_hover(true))
        .on_exit(on_hover(false))
        .into()
}

fn build<'a, Message: Clone + 'a>(
    label: &'a str,
    on_press: Option<Message>,
    hover: f32,
) -> Element<'a, Message> {
    let content = row![text("\u{25B6}").size(16), text(label).size(17)]
        .spacing(10)
        .align_y(Alignment::Center);

    let btn = button(content)
        .on_press_maybe(on_press)
        .padding([14, 28])
        .style(move |theme: &Theme, status: button::Status| {
            let base = theme.extended_palette().success.base.color;
            match status {
                button::Status::Disabled => faded(base),
                button::Status::Pressed => styled(base, 1.0),
                _ => styled(base, hover),
            }
        });

    let rise = hover * LIFT;
    container(btn)
        .padding(Padding {
            top: LIFT - rise,
            bottom: rise,
            ..Padding::ZERO
        })
        .into()
}

fn styled(base: Color, hover: f32) -> button::Style {
    let shift = HOVER_DARKEN * hover;
    button::Style {
        background: Some(
            Color {
                r: (base.r - shift).max(0.0),
                g: (base.g - shift).max(0.0),
                b: (base.b - shift).max(0.0),
                a: 1.0,
            }
            .into(),
        ),
        text_color: Color::WHITE,
        border: Border {
            radius: CORNER_RADIUS.into(),
            ..Border::default()
        },
        shadow: Shadow {
            color: Color {
                a: lerp(SHADOW_ALPHA, hover),
                ..base
            },
            offset: Vector::new(0.0, 2.0 + hover),
            blur_radius: lerp(SHADOW_BLUR, hover),
        },
        ..button::Style::default()
    }
}

fn faded(base: Color) -> button::Style {
    button::Style {
        background: Some(
            Color {
                a: DISABLED_ALPHA,
                ..base
            }
            .into(),
        ),
        text_color: Color {
            a: 0.8,
            ..Color::WHITE
        },
        border: Border {
            radius: CORNER_RADIUS.into(),
            ..Border::default()
        },
        ..button::Style::default()
    }
}

fn lerp((from, to): (f32, f32), t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp((2.0, 4.0), 0.0), 2.0);
        assert_eq!(lerp((2.0, 4.0), 1.0), 4.0);
        assert_eq!(lerp((2.0, 4.0), 0.5), 3.0);
    }

    #[test]
    fn test_hover_darkens_background() {
        let base = Color::from_rgb(0.5, 0.6, 0.7);
        let rest = styled(base, 0.0);
        let hovered = styled(base, 1.0);
        let (Some(iced::Background::Color(a)), Some(iced::Background::Color(b))) =
            (rest.background, hovered.background)
        else {
            panic!("expected solid backgrounds");
        };
        assert!(b.r < a.r && b.g < a.g && b.b < a.b);
    }

    #[test]
    fn test_disabled_is_translucent() {
        let style = faded(Color::from_rgb(0.2, 0.8, 0.3));
        let Some(iced::Background::Color(c)) = style.background else {
            panic!("expected solid background");
        };
        assert_eq!(c.a, DISABLED_ALPHA);
    }
}

use iced::color;
use iced::theme::Palette;
use iced::Theme;

use crate::settings::Appearance;

pub fn resolve_theme(appearance: Appearance) -> Theme {
    let dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => system_prefers_dark(),
    };
    let palette = if dark { dark_palette() } else { light_palette() };
    Theme::custom("FaceCam", palette)
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0x21, 0xba, 0x45),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf5, 0xf5, 0xf7),
        text: color!(0x1d, 0x1d, 0x1f),
        primary: color!(0x21, 0xba, 0x45),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xff, 0x3b, 0x30),
    }
}

#[cfg(target_os = "macos")]
fn system_prefers_dark() -> bool {
    std::process::Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim() == "Dark")
        .unwrap_or(true)
}

#[cfg(not(target_os = "macos"))]
fn system_prefers_dark() -> bool {
    true
}

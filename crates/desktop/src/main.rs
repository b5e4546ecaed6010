mod app;
mod settings;
mod theme;
mod views;
mod widgets;
mod workers;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("FaceCam")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(680.0, 580.0),
            resizable: false,
            ..Default::default()
        })
        .run()
}

use std::time::{Duration, Instant};

use iced::widget::image;
use iced::{Element, Subscription, Task, Theme};

use facecam_core::session::overlay_canvas::OverlayCanvas;
use facecam_core::session::view_state::ViewState;

use crate::settings::{Appearance, Settings};
use crate::theme;
use crate::views::detection_view::{self, Props};
use crate::workers::capture_worker::{self, CaptureEvent, CaptureParams, CaptureWorker, VideoFrame};

const MODEL_POLL: Duration = Duration::from_millis(150);
const LOADER_STEP: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    Loading,
    Downloading { downloaded: u64, total: u64 },
    Ready,
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum Message {
    StartDetect,
    StartHovered(bool),
    Poll(Instant),
    PollSystemTheme,
}

/// What the detection screen shows, fed by worker events.
struct Screen {
    view_state: ViewState,
    model: ModelStatus,
    video: Option<image::Handle>,
    canvas: OverlayCanvas,
    start_hovered: bool,
    /// Start was pressed and the worker has not answered yet.
    starting: bool,
    notice: Option<String>,
    loader_tick: usize,
    last_step: Option<Instant>,
}

impl Screen {
    fn new() -> Self {
        Self {
            view_state: ViewState::new(),
            model: ModelStatus::Loading,
            video: None,
            canvas: OverlayCanvas::default(),
            start_hovered: false,
            starting: false,
            notice: None,
            loader_tick: 0,
            last_step: None,
        }
    }

    /// Marks a start as pending. Returns `false` when starting is not
    /// allowed right now.
    fn request_start(&mut self) -> bool {
        if !self.can_start() {
            return false;
        }
        self.starting = true;
        self.notice = None;
        true
    }

    fn apply(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::ModelReady => self.model = ModelStatus::Ready,
            CaptureEvent::ModelFailed(e) => self.model = ModelStatus::Failed(e),
            CaptureEvent::DownloadProgress(downloaded, total) => {
                self.model = ModelStatus::Downloading { downloaded, total };
            }
            CaptureEvent::State(state) => {
                self.view_state = state;
                if state.streaming {
                    self.starting = false;
                }
            }
            CaptureEvent::Denied(message, state) => {
                self.view_state = state;
                self.starting = false;
                self.notice = Some(format!("Camera unavailable: {message}"));
            }
            CaptureEvent::Stopped(message) => {
                self.starting = false;
                self.notice = Some(message);
            }
        }
    }

    fn show_frame(&mut self, frame: VideoFrame) {
        self.video = Some(image::Handle::from_rgba(
            frame.width,
            frame.height,
            frame.rgba,
        ));
        self.canvas = frame.canvas;
    }

    fn step_loader(&mut self, now: Instant) {
        match self.last_step {
            Some(last) if now.duration_since(last) < LOADER_STEP => {}
            _ => {
                self.loader_tick = self.loader_tick.wrapping_add(1);
                self.last_step = Some(now);
            }
        }
    }

    fn can_start(&self) -> bool {
        self.model == ModelStatus::Ready && !self.starting && !self.view_state.streaming
    }

    fn model_pending(&self) -> bool {
        matches!(
            self.model,
            ModelStatus::Loading | ModelStatus::Downloading { .. }
        )
    }

    fn status(&self) -> Option<String> {
        match &self.model {
            ModelStatus::Loading => Some("Loading face model...".into()),
            ModelStatus::Downloading { downloaded, total } if *total > 0 => Some(format!(
                "Downloading face model... {}%",
                downloaded * 100 / total
            )),
            ModelStatus::Downloading { .. } => Some("Downloading face model...".into()),
            ModelStatus::Failed(e) => Some(format!("Face model unavailable: {e}")),
            ModelStatus::Ready if self.starting => Some("Waiting for camera...".into()),
            ModelStatus::Ready => self.notice.clone(),
        }
    }
}

pub struct App {
    settings: Settings,
    worker: CaptureWorker,
    screen: Screen,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        settings.save();
        let worker = capture_worker::spawn(CaptureParams {
            camera_index: settings.camera_index,
            model_source: settings.model_source(),
            config: settings.loop_config(),
        });
        (
            Self {
                settings,
                worker,
                screen: Screen::new(),
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::StartDetect => {
                if self.screen.request_start() {
                    self.worker.start();
                }
            }
            Message::StartHovered(hovered) => {
                self.screen.start_hovered = hovered;
            }
            Message::Poll(now) => {
                for event in self.worker.drain() {
                    self.screen.apply(event);
                }
                if let Some(frame) = self.worker.latest_frame() {
                    self.screen.show_frame(frame);
                }
                self.screen.step_loader(now);
            }
            Message::PollSystemTheme => {}
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let screen = &self.screen;
        detection_view::view(Props {
            state: screen.view_state,
            video: screen.video.as_ref(),
            canvas: &screen.canvas,
            can_start: screen.can_start(),
            start_hovered: screen.start_hovered,
            loader_tick: screen.loader_tick,
            status: screen.status(),
        })
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let poll = if self.screen.starting || self.screen.view_state.streaming {
            iced::window::frames().map(Message::Poll)
        } else if self.screen.model_pending() {
            iced::time::every(MODEL_POLL).map(Message::Poll)
        } else {
            Subscription::none()
        };

        let system_theme = if self.settings.appearance == Appearance::System {
            iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme)
        } else {
            Subscription::none()
        };

        Subscription::batch([poll, system_theme])
    }
}

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use thiserror::Error;

use crate::camera::domain::camera::{Camera, StreamInfo};
use crate::camera::domain::camera_error::CameraError;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::session::loop_config::LoopConfig;
use crate::session::overlay_canvas::{resize_canvas_and_result, OverlayCanvas};
use crate::session::refresh_clock::{sleep_until, RefreshClock};
use crate::session::session_logger::SessionLogger;
use crate::session::view_state::ViewState;
use crate::shared::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Acquiring,
    Streaming,
    Detecting,
}

#[derive(Error, Debug)]
pub enum LoopError {
    #[error("detection loop already started")]
    AlreadyStarted,
    #[error("camera stream is not ready")]
    NotStreaming,
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error("face detection failed: {0}")]
    Detection(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Accepted face, in canvas coordinates.
    Detected(Detection),
    NoFace,
}

/// Everything one detection attempt produced.
pub struct TickReport {
    pub frame: Frame,
    pub outcome: TickOutcome,
    /// Whether this tick changed the view state.
    pub state_changed: bool,
}

/// Capture/detect/render loop for one camera session.
///
/// `Idle → Acquiring → Streaming → Detecting`. The loop owns the
/// [`ViewState`] and the [`OverlayCanvas`]; hosts read them after each tick.
pub struct CaptureLoop {
    camera: Box<dyn Camera>,
    detector: Box<dyn FaceDetector>,
    logger: Box<dyn SessionLogger>,
    config: LoopConfig,
    phase: LoopPhase,
    view: ViewState,
    canvas: OverlayCanvas,
    requested_at: Option<Instant>,
}

impl CaptureLoop {
    pub fn new(
        camera: Box<dyn Camera>,
        detector: Box<dyn FaceDetector>,
        logger: Box<dyn SessionLogger>,
        config: LoopConfig,
    ) -> Self {
        Self {
            camera,
            detector,
            logger,
            config,
            phase: LoopPhase::Idle,
            view: ViewState::new(),
            canvas: OverlayCanvas::default(),
            requested_at: None,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn view_state(&self) -> ViewState {
        self.view
    }

    pub fn canvas(&self) -> &OverlayCanvas {
        &self.canvas
    }

    /// Requests the camera and starts playback.
    ///
    /// On refusal the error is logged, `fetching` stays set and the loop
    /// returns to `Idle`; there is no retry. The error is still returned so
    /// the host can tell the session never started.
    pub fn start(&mut self) -> Result<StreamInfo, LoopError> {
        if self.phase != LoopPhase::Idle {
            return Err(LoopError::AlreadyStarted);
        }
        self.phase = LoopPhase::Acquiring;
        self.requested_at = Some(Instant::now());

        let acquired = self
            .camera
            .open(&self.config.constraints)
            .and_then(|info| self.camera.play().map(|()| info));
        let info = match acquired {
            Ok(info) => info,
            Err(e) => {
                log::warn!("Camera access failed: {e}");
                self.camera.close();
                self.view.permission_denied();
                self.phase = LoopPhase::Idle;
                return Err(e.into());
            }
        };

        self.view.metadata_loaded();
        self.phase = LoopPhase::Streaming;
        self.logger.info(&format!(
            "Streaming from {} at {}",
            info.device_name, info.dimensions
        ));
        Ok(info)
    }

    /// Waits out what remains of the start delay, measured from the camera
    /// request. Returns `false` if cancelled first.
    pub fn wait_for_start(&mut self, cancelled: &AtomicBool) -> Result<bool, LoopError> {
        match self.phase {
            LoopPhase::Detecting => return Ok(true),
            LoopPhase::Streaming => {}
            _ => return Err(LoopError::NotStreaming),
        }
        let requested_at = self.requested_at.unwrap_or_else(Instant::now);
        if !sleep_until(requested_at + self.config.start_delay, cancelled) {
            return Ok(false);
        }
        self.phase = LoopPhase::Detecting;
        Ok(true)
    }

    /// One detection attempt against the current frame.
    pub fn tick(&mut self) -> Result<TickReport, LoopError> {
        if !matches!(self.phase, LoopPhase::Streaming | LoopPhase::Detecting) {
            return Err(LoopError::NotStreaming);
        }

        let started = Instant::now();
        let frame = self.camera.frame()?;
        let captured = Instant::now();
        self.logger.timing("capture", ms_between(started, captured));

        let result = self
            .detector
            .detect(&frame)
            .map_err(|e| LoopError::Detection(e.to_string()))?;
        self.logger.timing("detect", ms_between(captured, Instant::now()));

        let accepted = result.filter(|d| d.passes(self.config.min_confidence));
        let mut state_changed = false;
        let outcome = match accepted {
            Some(detection) => {
                let scaled =
                    resize_canvas_and_result(frame.dimensions(), &mut self.canvas, &detection);
                self.canvas.draw(scaled);
                if self.view.face_detected() {
                    state_changed = true;
                    self.logger.info(&format!(
                        "First face detected on frame {} (score {:.2})",
                        frame.index(),
                        scaled.score
                    ));
                }
                TickOutcome::Detected(scaled)
            }
            None => TickOutcome::NoFace,
        };

        let found = matches!(outcome, TickOutcome::Detected(_));
        self.logger.metric("face_found", if found { 1.0 } else { 0.0 });
        self.logger.tick();

        Ok(TickReport {
            frame,
            outcome,
            state_changed,
        })
    }

    /// Detects once per refresh tick until `cancelled` is set.
    ///
    /// Only returns `Ok` on cancellation. `on_tick` sees every report along
    /// with the state and canvas it produced.
    pub fn run(
        &mut self,
        cancelled: &AtomicBool,
        mut on_tick: impl FnMut(&TickReport, &ViewState, &OverlayCanvas),
    ) -> Result<(), LoopError> {
        if !self.wait_for_start(cancelled)? {
            return Ok(());
        }

        let mut clock = RefreshClock::new(self.config.tick_interval());
        let result = loop {
            if !clock.wait(cancelled) {
                break Ok(());
            }
            match self.tick() {
                Ok(report) => on_tick(&report, &self.view, &self.canvas),
                Err(e) => break Err(e),
            }
        };
        self.logger.summary();
        result
    }

    /// Releases the camera, wipes the overlay and returns to `Idle`.
    pub fn close(&mut self) {
        self.camera.close();
        self.canvas.clear();
        self.phase = LoopPhase::Idle;
        self.requested_at = None;
    }
}

fn ms_between(from: Instant, to: Instant) -> f64 {
    to.saturating_duration_since(from).as_secs_f64() * 1000.0
}

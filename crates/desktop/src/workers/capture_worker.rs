use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use image::imageops::{self, FilterType};
use image::RgbImage;

use facecam_core::camera::infrastructure::nokhwa_camera::NokhwaCamera;
use facecam_core::detection::infrastructure::model_resolver::{self, ModelSource};
use facecam_core::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use facecam_core::session::capture_loop::{CaptureLoop, LoopError};
use facecam_core::session::loop_config::LoopConfig;
use facecam_core::session::overlay_canvas::OverlayCanvas;
use facecam_core::session::session_logger::NullSessionLogger;
use facecam_core::session::view_state::ViewState;
use facecam_core::shared::constants::FACE_MODEL_NAME;

/// Downscale factor used to blur the video before a face is found.
const BLUR_FACTOR: u32 = 12;

pub enum Command {
    Start,
}

/// Status messages sent from the worker thread to the UI. Video frames
/// travel separately through a `FrameSlot`.
pub enum CaptureEvent {
    ModelReady,
    ModelFailed(String),
    DownloadProgress(u64, u64),
    State(ViewState),
    /// Camera refused; the state still says fetching.
    Denied(String, ViewState),
    Stopped(String),
}

pub struct VideoFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub canvas: OverlayCanvas,
}

pub struct CaptureParams {
    pub camera_index: u32,
    pub model_source: ModelSource,
    pub config: LoopConfig,
}

/// Handle to the worker thread that owns the camera session.
///
/// The worker lives as long as the window: dropping the handle cancels the
/// running loop and closes the command channel, which ends the thread.
pub struct CaptureWorker {
    commands: Sender<Command>,
    events: Receiver<CaptureEvent>,
    frames: Receiver<VideoFrame>,
    cancelled: Arc<AtomicBool>,
}

impl CaptureWorker {
    pub fn start(&self) {
        let _ = self.commands.send(Command::Start);
    }

    /// Everything the worker has sent since the last call.
    pub fn drain(&self) -> Vec<CaptureEvent> {
        let mut events = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// The newest frame not yet shown, if any.
    pub fn latest_frame(&self) -> Option<VideoFrame> {
        self.frames.try_iter().last()
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Single-slot mailbox for video frames.
///
/// Holds at most one frame. Offering a frame while the slot is full replaces
/// the unread one, so a UI that stops redrawing never builds a backlog.
struct FrameSlot {
    tx: Sender<VideoFrame>,
    rx: Receiver<VideoFrame>,
}

impl FrameSlot {
    fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        Self { tx, rx }
    }

    fn receiver(&self) -> Receiver<VideoFrame> {
        self.rx.clone()
    }

    fn offer(&self, frame: VideoFrame) {
        let mut frame = frame;
        loop {
            match self.tx.try_send(frame) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(rejected)) => {
                    let _ = self.rx.try_recv();
                    frame = rejected;
                }
            }
        }
    }
}

pub fn spawn(params: CaptureParams) -> CaptureWorker {
    let (command_tx, command_rx) = crossbeam_channel::unbounded::<Command>();
    let (event_tx, event_rx) = crossbeam_channel::unbounded::<CaptureEvent>();
    let slot = FrameSlot::new();
    let frames = slot.receiver();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || run_worker(&event_tx, &slot, &command_rx, &cancelled_clone, params));

    CaptureWorker {
        commands: command_tx,
        events: event_rx,
        frames,
        cancelled,
    }
}

fn run_worker(
    tx: &Sender<CaptureEvent>,
    slot: &FrameSlot,
    commands: &Receiver<Command>,
    cancelled: &AtomicBool,
    params: CaptureParams,
) {
    let detector = match load_detector(tx, &params) {
        Ok(detector) => detector,
        Err(e) => {
            log::error!("Face model failed to load: {e}");
            let _ = tx.send(CaptureEvent::ModelFailed(e.to_string()));
            return;
        }
    };
    let _ = tx.send(CaptureEvent::ModelReady);

    let mut capture = CaptureLoop::new(
        Box::new(NokhwaCamera::new(params.camera_index)),
        Box::new(detector),
        Box::new(NullSessionLogger),
        params.config,
    );

    while let Ok(Command::Start) = commands.recv() {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }
        match capture.start() {
            Ok(_) => {
                let _ = tx.send(CaptureEvent::State(capture.view_state()));
            }
            Err(LoopError::AlreadyStarted) => continue,
            Err(e) => {
                let _ = tx.send(CaptureEvent::Denied(e.to_string(), capture.view_state()));
                continue;
            }
        }

        let result = capture.run(cancelled, |report, view, canvas| {
            if report.state_changed {
                let _ = tx.send(CaptureEvent::State(*view));
            }
            slot.offer(present(report.frame.to_image(), view, canvas));
        });
        capture.close();
        if let Err(e) = result {
            log::error!("Detection loop stopped: {e}");
            let _ = tx.send(CaptureEvent::Stopped(e.to_string()));
        }
        break;
    }
}

fn load_detector(
    tx: &Sender<CaptureEvent>,
    params: &CaptureParams,
) -> Result<OnnxBlazefaceDetector, Box<dyn std::error::Error>> {
    let tx_dl = tx.clone();
    let model_path = model_resolver::resolve(
        FACE_MODEL_NAME,
        &params.model_source,
        Some(Box::new(move |downloaded, total| {
            let _ = tx_dl.send(CaptureEvent::DownloadProgress(downloaded, total));
        })),
    )?;
    Ok(OnnxBlazefaceDetector::new(
        &model_path,
        params.config.min_confidence,
    )?)
}

/// Turns a camera frame into what the video surface shows: blurred until a
/// face has been detected, sharp afterwards.
fn present(frame: RgbImage, view: &ViewState, canvas: &OverlayCanvas) -> VideoFrame {
    let (width, height) = frame.dimensions();
    let shown = if view.visibility().video_blurred {
        blur(&frame)
    } else {
        frame
    };
    let rgba = image::DynamicImage::ImageRgb8(shown).into_rgba8().into_raw();
    VideoFrame {
        rgba,
        width,
        height,
        canvas: canvas.clone(),
    }
}

fn blur(frame: &RgbImage) -> RgbImage {
    let (width, height) = frame.dimensions();
    let small = imageops::thumbnail(
        frame,
        (width / BLUR_FACTOR).max(1),
        (height / BLUR_FACTOR).max(1),
    );
    imageops::resize(&small, width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facecam_core::detection::domain::detection::{BoundingBox, Detection};
    use facecam_core::shared::dimensions::Dimensions;

    fn checkerboard(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn test_present_blurs_before_detection() {
        let frame = checkerboard(64, 48);
        let shown = present(frame.clone(), &ViewState::new(), &OverlayCanvas::default());
        assert_eq!((shown.width, shown.height), (64, 48));
        assert_eq!(shown.rgba.len(), 64 * 48 * 4);
        // A blurred checkerboard has no pure black or white pixels left.
        let first = &shown.rgba[..3];
        assert!(first.iter().all(|&c| c > 20 && c < 235));
    }

    #[test]
    fn test_present_is_sharp_after_detection() {
        let frame = checkerboard(8, 8);
        let mut view = ViewState::new();
        view.metadata_loaded();
        view.face_detected();
        let shown = present(frame, &view, &OverlayCanvas::default());
        assert_eq!(&shown.rgba[..4], &[255, 255, 255, 255]);
        assert_eq!(&shown.rgba[4..8], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_present_carries_canvas() {
        let mut canvas = OverlayCanvas::default();
        canvas.draw(Detection::new(
            BoundingBox::new(1.0, 2.0, 3.0, 4.0),
            0.9,
            Dimensions::DISPLAY,
        ));
        let shown = present(checkerboard(4, 4), &ViewState::new(), &canvas);
        assert_eq!(shown.canvas, canvas);
    }

    fn frame_of_width(width: u32) -> VideoFrame {
        VideoFrame {
            rgba: vec![0; (width * 4) as usize],
            width,
            height: 1,
            canvas: OverlayCanvas::default(),
        }
    }

    /// Worker handle wired to channels the test controls.
    fn test_worker() -> (CaptureWorker, Sender<CaptureEvent>, FrameSlot) {
        let (command_tx, _command_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let slot = FrameSlot::new();
        let worker = CaptureWorker {
            commands: command_tx,
            events: event_rx,
            frames: slot.receiver(),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        (worker, event_tx, slot)
    }

    #[test]
    fn test_frame_burst_leaves_one_pending() {
        let slot = FrameSlot::new();
        for width in 1..=50 {
            slot.offer(frame_of_width(width));
        }
        assert_eq!(slot.rx.len(), 1);
        assert_eq!(slot.rx.try_recv().unwrap().width, 50);
    }

    #[test]
    fn test_latest_frame_returns_newest_once() {
        let (worker, _events, slot) = test_worker();
        assert!(worker.latest_frame().is_none());
        slot.offer(frame_of_width(3));
        slot.offer(frame_of_width(7));
        assert_eq!(worker.latest_frame().map(|f| f.width), Some(7));
        assert!(worker.latest_frame().is_none());
    }

    #[test]
    fn test_frames_do_not_block_status_events() {
        let (worker, event_tx, slot) = test_worker();
        for width in 1..=10 {
            slot.offer(frame_of_width(width));
        }
        event_tx.send(CaptureEvent::ModelReady).unwrap();
        assert_eq!(worker.drain().len(), 1);
        assert_eq!(worker.latest_frame().map(|f| f.width), Some(10));
    }

    #[test]
    fn test_drain_collects_pending_events() {
        let (worker, event_tx, _slot) = test_worker();
        event_tx.send(CaptureEvent::ModelReady).unwrap();
        event_tx.send(CaptureEvent::State(ViewState::new())).unwrap();
        assert_eq!(worker.drain().len(), 2);
        assert!(worker.drain().is_empty());
    }

    #[test]
    fn test_drop_cancels_worker() {
        let (worker, _events, _slot) = test_worker();
        let cancelled = worker.cancelled.clone();
        drop(worker);
        assert!(cancelled.load(Ordering::Relaxed));
    }
}

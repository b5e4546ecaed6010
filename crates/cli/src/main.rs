use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use facecam_core::camera::infrastructure::nokhwa_camera::NokhwaCamera;
use facecam_core::detection::infrastructure::model_resolver::{self, ModelSource};
use facecam_core::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use facecam_core::session::capture_loop::{CaptureLoop, TickOutcome};
use facecam_core::session::loop_config::LoopConfig;
use facecam_core::session::overlay_canvas::{composite, render_overlay};
use facecam_core::session::session_logger::StdoutSessionLogger;
use facecam_core::shared::constants::{
    DEFAULT_MODEL_DIR, DEFAULT_REFRESH_HZ, DEFAULT_START_DELAY, FACE_MODEL_NAME,
};

/// Live webcam face detection.
#[derive(Parser)]
#[command(name = "facecam")]
struct Cli {
    /// Capture device index (0 is usually the built-in front camera).
    #[arg(long, default_value = "0")]
    camera: u32,

    /// List capture devices and exit.
    #[arg(long)]
    list_cameras: bool,

    /// Minimum face confidence (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    min_confidence: f64,

    /// Wait between requesting the camera and the first detection.
    #[arg(long, default_value_t = DEFAULT_START_DELAY.as_millis() as u64)]
    start_delay_ms: u64,

    /// Detection attempts per second.
    #[arg(long, default_value_t = DEFAULT_REFRESH_HZ)]
    refresh_hz: u32,

    /// Directory holding the face model.
    #[arg(long, default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,

    /// Download the model from here if it is not found locally.
    #[arg(long)]
    model_url: Option<String>,

    /// Stop after this many detection attempts.
    #[arg(long)]
    max_ticks: Option<usize>,

    /// Save the frame of the first detection, with its box, to this file.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl Cli {
    fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            min_confidence: self.min_confidence,
            start_delay: Duration::from_millis(self.start_delay_ms),
            refresh_hz: self.refresh_hz,
            ..LoopConfig::default()
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.list_cameras {
        for (index, name) in NokhwaCamera::list_devices()? {
            println!("{index:<5} {name}");
        }
        return Ok(());
    }

    let config = cli.loop_config();
    config.validate()?;

    let source = ModelSource {
        asset_dir: Some(cli.model_dir.clone()),
        download_url: cli.model_url.clone(),
    };
    let progress: model_resolver::ProgressFn = Box::new(|downloaded, total| {
        if total > 0 {
            eprint!("\rDownloading model: {}%", downloaded * 100 / total);
        }
    });
    let model_path = model_resolver::resolve(FACE_MODEL_NAME, &source, Some(progress))?;
    let detector = OnnxBlazefaceDetector::new(&model_path, config.min_confidence)?;

    let mut capture = CaptureLoop::new(
        Box::new(NokhwaCamera::new(cli.camera)),
        Box::new(detector),
        Box::new(StdoutSessionLogger::new()),
        config,
    );

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;

    if let Err(e) = capture.start() {
        log::info!("View state: {:?}", capture.view_state());
        return Err(e.into());
    }

    let mut ticks = 0usize;
    let mut snapshot = cli.snapshot;
    capture.run(&cancelled, |report, view, canvas| {
        ticks += 1;
        if report.state_changed {
            log::info!("View state: {view:?}");
        }
        if let TickOutcome::Detected(d) = &report.outcome {
            log::debug!(
                "Face at ({:.0}, {:.0}) {:.0}x{:.0} score {:.2}",
                d.bbox.x,
                d.bbox.y,
                d.bbox.width,
                d.bbox.height,
                d.score
            );
            if let Some(path) = snapshot.take() {
                let image = composite(&report.frame.to_image(), &render_overlay(canvas));
                match image.save(&path) {
                    Ok(()) => log::info!("Snapshot written to {}", path.display()),
                    Err(e) => log::warn!("Failed to write snapshot {}: {e}", path.display()),
                }
            }
        }
        if cli.max_ticks.is_some_and(|max| ticks >= max) {
            cancelled.store(true, Ordering::Relaxed);
        }
    })?;

    capture.close();
    Ok(())
}

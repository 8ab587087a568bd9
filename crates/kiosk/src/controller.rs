//! The timed multi-shot capture sequence.
//!
//! One session is a single cooperative sequence: an initial countdown, then
//! for each shot a flash and a grab, with an interval countdown between
//! shots. Every wait, including a send on a full progress channel and the
//! per-shot crop and encode on the blocking pool, races the session's
//! [`CancellationToken`], so a retake or inactivity reset stops the
//! sequence at once. The camera stream is released on every exit path.

use std::time::Duration;

use photobooth_core::geometry::AspectRatio;
use photobooth_pipeline::codec::encode_png;
use photobooth_pipeline::{crop_capture, offload, CaptureOutput};
use photobooth_store::models::Settings;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::CaptureError;
use crate::source::{Camera, VideoSource};

/// Shots per session.
pub const BURST_SIZE: usize = 3;

/// How long the flash shows before the frame is grabbed.
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct CapturePlan {
    /// Seconds of countdown before the first shot.
    pub countdown_secs: u32,
    /// Seconds of countdown between shots.
    pub interval_secs: u32,
    pub burst: usize,
    /// Aspect ratio of the selected frame.
    pub target_ratio: AspectRatio,
    pub output: CaptureOutput,
}

impl CapturePlan {
    pub fn from_settings(settings: &Settings, target_ratio: AspectRatio) -> Self {
        Self {
            countdown_secs: settings.countdown_duration_secs,
            interval_secs: settings.photo_interval_secs,
            burst: BURST_SIZE,
            target_ratio,
            output: CaptureOutput::default(),
        }
    }

    fn check(&self) -> Result<(), CaptureError> {
        if self.burst == 0 {
            return Err(CaptureError::InvalidPlan("burst must be at least 1".into()));
        }
        if self.output.width == 0 {
            return Err(CaptureError::InvalidPlan("output width must be positive".into()));
        }
        Ok(())
    }
}

/// Progress reported while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// `remaining` seconds before shot `shot` (0-based).
    CountdownTick { shot: usize, remaining: u32 },
    Flash { shot: usize },
    ShotCaptured { shot: usize, total: usize },
}

/// One encoded shot, cropped to the plan's ratio and output width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedShot {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CaptureController {
    flash: Option<Duration>,
}

impl CaptureController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the flash duration.
    pub fn with_flash(flash: Duration) -> Self {
        Self { flash: Some(flash) }
    }

    fn flash_duration(&self) -> Duration {
        self.flash.unwrap_or(FLASH_DURATION)
    }

    /// Run one burst. Returns every shot in order; choosing one is up to
    /// the caller.
    pub async fn run(
        &self,
        camera: &dyn Camera,
        plan: &CapturePlan,
        cancel: &CancellationToken,
        events: &mpsc::Sender<CaptureEvent>,
    ) -> Result<Vec<CapturedShot>, CaptureError> {
        plan.check()?;
        if cancel.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }

        let stream = tokio::select! {
            _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
            opened = camera.open() => opened?,
        };
        let mut stream = StreamGuard(stream);
        let (width, height) = stream.0.dimensions();
        if width == 0 || height == 0 {
            return Err(CaptureError::DeviceUnavailable(format!(
                "camera reported a {width}x{height} stream"
            )));
        }
        tracing::info!(
            width,
            height,
            burst = plan.burst,
            countdown_secs = plan.countdown_secs,
            interval_secs = plan.interval_secs,
            "Capture session started",
        );

        countdown(0, plan.countdown_secs, cancel, events).await?;

        let mut shots = Vec::with_capacity(plan.burst);
        for shot in 0..plan.burst {
            emit(events, CaptureEvent::Flash { shot }, cancel).await?;
            wait(self.flash_duration(), cancel).await?;

            let frame = tokio::select! {
                _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
                frame = stream.0.grab() => frame?,
            };
            let (ratio, output) = (plan.target_ratio, plan.output);
            let captured = tokio::select! {
                _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
                done = offload(move || {
                    let image = crop_capture(&frame, ratio, &output)?;
                    Ok(CapturedShot {
                        index: shot,
                        width: image.width(),
                        height: image.height(),
                        png: encode_png(&image)?,
                    })
                }) => done?,
            };
            shots.push(captured);
            emit(
                events,
                CaptureEvent::ShotCaptured {
                    shot,
                    total: plan.burst,
                },
                cancel,
            )
            .await?;

            if shot + 1 < plan.burst {
                countdown(shot + 1, plan.interval_secs, cancel, events).await?;
            }
        }

        tracing::info!(shots = shots.len(), "Capture session finished");
        Ok(shots)
    }
}

/// Releases the stream when dropped, whichever way `run` exits.
struct StreamGuard(Box<dyn VideoSource>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.release();
        tracing::debug!("Camera stream released");
    }
}

/// Tick down from `secs` to 1, one second per tick.
async fn countdown(
    shot: usize,
    secs: u32,
    cancel: &CancellationToken,
    events: &mpsc::Sender<CaptureEvent>,
) -> Result<(), CaptureError> {
    for remaining in (1..=secs).rev() {
        emit(events, CaptureEvent::CountdownTick { shot, remaining }, cancel).await?;
        wait(TICK, cancel).await?;
    }
    Ok(())
}

async fn wait(duration: Duration, cancel: &CancellationToken) -> Result<(), CaptureError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(CaptureError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// A closed channel is ignored: a UI that stopped listening does not stop
/// the session. A full one is waited on, but never past cancellation.
async fn emit(
    events: &mpsc::Sender<CaptureEvent>,
    event: CaptureEvent,
    cancel: &CancellationToken,
) -> Result<(), CaptureError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(CaptureError::Cancelled),
        _ = events.send(event) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use image::{DynamicImage, Rgba, RgbaImage};
    use tokio::time::Instant;

    use super::*;

    /// Records grab instants and whether the stream was released.
    #[derive(Default)]
    struct CameraLog {
        grabs: Mutex<Vec<Instant>>,
        opened: AtomicBool,
        released: AtomicBool,
    }

    struct FakeCamera {
        log: Arc<CameraLog>,
        deny: bool,
        fail_on_grab: Option<usize>,
        size: (u32, u32),
        cancel_on_grab: Option<CancellationToken>,
    }

    impl FakeCamera {
        fn new() -> (Self, Arc<CameraLog>) {
            let log = Arc::new(CameraLog::default());
            (
                Self {
                    log: log.clone(),
                    deny: false,
                    fail_on_grab: None,
                    size: (64, 36),
                    cancel_on_grab: None,
                },
                log,
            )
        }
    }

    #[async_trait]
    impl Camera for FakeCamera {
        async fn open(&self) -> Result<Box<dyn VideoSource>, CaptureError> {
            if self.deny {
                return Err(CaptureError::DeviceUnavailable("permission denied".into()));
            }
            self.log.opened.store(true, Ordering::SeqCst);
            Ok(Box::new(FakeSource {
                log: self.log.clone(),
                fail_on_grab: self.fail_on_grab,
                size: self.size,
                cancel_on_grab: self.cancel_on_grab.clone(),
            }))
        }
    }

    struct FakeSource {
        log: Arc<CameraLog>,
        fail_on_grab: Option<usize>,
        size: (u32, u32),
        cancel_on_grab: Option<CancellationToken>,
    }

    #[async_trait]
    impl VideoSource for FakeSource {
        fn dimensions(&self) -> (u32, u32) {
            self.size
        }

        async fn grab(&mut self) -> Result<DynamicImage, CaptureError> {
            let mut grabs = self.log.grabs.lock().unwrap();
            if self.fail_on_grab == Some(grabs.len()) {
                return Err(CaptureError::Stream("track ended".into()));
            }
            grabs.push(Instant::now());
            if let Some(cancel) = &self.cancel_on_grab {
                cancel.cancel();
            }
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                64,
                36,
                Rgba([200, 100, 50, 255]),
            )))
        }

        fn release(&mut self) {
            self.log.released.store(true, Ordering::SeqCst);
        }
    }

    fn plan(countdown: u32, interval: u32) -> CapturePlan {
        CapturePlan {
            countdown_secs: countdown,
            interval_secs: interval,
            burst: BURST_SIZE,
            target_ratio: AspectRatio::new(0.8).unwrap(),
            output: CaptureOutput {
                width: 40,
                mirror: true,
            },
        }
    }

    fn drain(rx: &mut mpsc::Receiver<CaptureEvent>) -> Vec<CaptureEvent> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    // ---- timing ----

    #[tokio::test(start_paused = true)]
    async fn burst_of_three_with_exact_waits() {
        let (camera, log) = FakeCamera::new();
        let (tx, mut rx) = mpsc::channel(64);
        let start = Instant::now();

        let shots = CaptureController::new()
            .run(&camera, &plan(3, 2), &CancellationToken::new(), &tx)
            .await
            .unwrap();
        let finished = Instant::now();

        assert_eq!(shots.len(), 3);
        assert_eq!(
            shots.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(shots.iter().all(|s| (s.width, s.height) == (40, 50)));

        let grabs = log.grabs.lock().unwrap().clone();
        assert_eq!(grabs.len(), 3);
        assert_eq!(grabs[0] - start, Duration::from_secs(3) + FLASH_DURATION);
        assert_eq!(grabs[1] - grabs[0], Duration::from_secs(2) + FLASH_DURATION);
        assert_eq!(grabs[2] - grabs[1], Duration::from_secs(2) + FLASH_DURATION);
        // No wait after the last shot.
        assert_eq!(finished, grabs[2]);
        assert!(log.released.load(Ordering::SeqCst));

        let events = drain(&mut rx);
        let ticks: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                CaptureEvent::CountdownTick { shot, remaining } => Some((*shot, *remaining)),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![(0, 3), (0, 2), (0, 1), (1, 2), (1, 1), (2, 2), (2, 1)]);
        assert_eq!(
            events.last(),
            Some(&CaptureEvent::ShotCaptured { shot: 2, total: 3 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_only_waits_for_flash() {
        let (camera, log) = FakeCamera::new();
        let (tx, _rx) = mpsc::channel(64);
        CaptureController::new()
            .run(&camera, &plan(1, 0), &CancellationToken::new(), &tx)
            .await
            .unwrap();

        let grabs = log.grabs.lock().unwrap().clone();
        assert_eq!(grabs[1] - grabs[0], FLASH_DURATION);
    }

    // ---- cancellation ----

    #[tokio::test(start_paused = true)]
    async fn cancel_during_countdown_stops_and_releases() {
        let (camera, log) = FakeCamera::new();
        let (tx, _rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                CaptureController::new()
                    .run(&camera, &plan(5, 2), &cancel, &tx)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let cancelled_at = Instant::now();
        cancel.cancel();

        let result = task.await.unwrap();
        assert_matches!(result, Err(CaptureError::Cancelled));
        assert_eq!(Instant::now(), cancelled_at);
        assert!(log.grabs.lock().unwrap().is_empty());
        assert!(log.released.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_between_shots_keeps_no_partial_result() {
        let (camera, log) = FakeCamera::new();
        let (tx, _rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                CaptureController::new()
                    .run(&camera, &plan(1, 3), &cancel, &tx)
                    .await
            })
        };

        // First shot lands at 1.2s; cancel during the following interval.
        tokio::time::sleep(Duration::from_secs(2)).await;
        cancel.cancel();

        assert_matches!(task.await.unwrap(), Err(CaptureError::Cancelled));
        assert_eq!(log.grabs.lock().unwrap().len(), 1);
        assert!(log.released.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_progress_channel_is_full() {
        let (camera, log) = FakeCamera::new();
        // Room for one event and nobody reading: the second tick blocks.
        let (tx, _rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                CaptureController::new()
                    .run(&camera, &plan(3, 2), &cancel, &tx)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let cancelled_at = Instant::now();
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(30), task)
            .await
            .expect("capture kept waiting on the full channel")
            .unwrap();
        assert_matches!(result, Err(CaptureError::Cancelled));
        assert_eq!(Instant::now(), cancelled_at);
        assert!(log.grabs.lock().unwrap().is_empty());
        assert!(log.released.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_shot_is_processed() {
        let (mut camera, log) = FakeCamera::new();
        let cancel = CancellationToken::new();
        camera.cancel_on_grab = Some(cancel.clone());
        let (tx, _rx) = mpsc::channel(64);

        let result = CaptureController::new()
            .run(&camera, &plan(1, 2), &cancel, &tx)
            .await;

        assert_matches!(result, Err(CaptureError::Cancelled));
        let grabs = log.grabs.lock().unwrap().clone();
        assert_eq!(grabs.len(), 1);
        assert_eq!(Instant::now(), grabs[0]);
        assert!(log.released.load(Ordering::SeqCst));
    }

    // ---- failures ----

    #[tokio::test(start_paused = true)]
    async fn empty_stream_aborts_before_countdown() {
        let (mut camera, log) = FakeCamera::new();
        camera.size = (0, 0);
        let (tx, mut rx) = mpsc::channel(64);
        let start = Instant::now();

        let result = CaptureController::new()
            .run(&camera, &plan(3, 2), &CancellationToken::new(), &tx)
            .await;

        assert_matches!(result, Err(CaptureError::DeviceUnavailable(_)));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(Instant::now(), start);
        assert!(log.released.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn denied_camera_aborts_before_countdown() {
        let (mut camera, log) = FakeCamera::new();
        camera.deny = true;
        let (tx, mut rx) = mpsc::channel(64);
        let start = Instant::now();

        let result = CaptureController::new()
            .run(&camera, &plan(3, 2), &CancellationToken::new(), &tx)
            .await;

        assert_matches!(result, Err(CaptureError::DeviceUnavailable(_)));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(Instant::now(), start);
        assert!(!log.opened.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn stream_failure_mid_burst_releases_camera() {
        let (mut camera, log) = FakeCamera::new();
        camera.fail_on_grab = Some(1);
        let (tx, _rx) = mpsc::channel(64);

        let result = CaptureController::new()
            .run(&camera, &plan(1, 1), &CancellationToken::new(), &tx)
            .await;

        assert_matches!(result, Err(CaptureError::Stream(_)));
        assert!(log.released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn empty_burst_rejected() {
        let (camera, _log) = FakeCamera::new();
        let (tx, _rx) = mpsc::channel(1);
        let mut p = plan(1, 1);
        p.burst = 0;
        assert_matches!(
            CaptureController::new()
                .run(&camera, &p, &CancellationToken::new(), &tx)
                .await,
            Err(CaptureError::InvalidPlan(_))
        );
    }

    #[test]
    fn plan_follows_settings() {
        let settings = Settings {
            countdown_duration_secs: 5,
            photo_interval_secs: 1,
            ..Settings::default()
        };
        let p = CapturePlan::from_settings(&settings, AspectRatio::default());
        assert_eq!(p.countdown_secs, 5);
        assert_eq!(p.interval_secs, 1);
        assert_eq!(p.burst, 3);
        assert_eq!(p.output.width, 1080);
        assert!(p.output.mirror);
    }
}

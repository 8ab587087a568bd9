//! Booth session state and the pure state machine that drives it.
//!
//! All per-session client state (selected frame, captured shots, finished
//! photo) lives in one [`BoothSession`] owned by the state machine. A reset
//! replaces the whole value. The machine never performs I/O itself: it
//! returns [`BoothCommand`]s for the driver to execute and is fed the
//! results back as [`BoothEvent`]s.

use photobooth_core::geometry::AspectRatio;
use photobooth_core::types::RecordId;
use photobooth_store::models::{FinishedPhoto, Frame};

use crate::controller::CapturedShot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoothPhase {
    /// Attract screen, no session.
    #[default]
    Idle,
    FrameSelected,
    /// Countdown and burst in progress.
    Capturing,
    /// Guest picks one of the captured shots.
    Selecting,
    /// Chosen shot is being composited by the service.
    Processing,
    /// Finished photo on screen with email and QR options.
    Output,
}

impl BoothPhase {
    /// Phases in which the guest is expected to interact, so idling there
    /// should eventually reset the booth.
    fn watches_inactivity(self) -> bool {
        matches!(self, Self::FrameSelected | Self::Selecting | Self::Output)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFrame {
    pub id: RecordId,
    pub name: String,
    pub asset_url: String,
    /// Natural width/height of the frame art.
    pub ratio: AspectRatio,
}

impl SelectedFrame {
    /// `size` is the frame image's natural size if known; otherwise the
    /// default portrait ratio is used.
    pub fn from_frame(frame: &Frame, size: Option<(u32, u32)>) -> Self {
        let ratio = size
            .and_then(|(w, h)| AspectRatio::from_dimensions(w, h).ok())
            .unwrap_or_default();
        Self {
            id: frame.id,
            name: frame.name.clone(),
            asset_url: frame.asset_url.clone(),
            ratio,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoothSession {
    pub phase: BoothPhase,
    pub frame: Option<SelectedFrame>,
    pub shots: Vec<CapturedShot>,
    pub chosen: Option<usize>,
    pub finished: Option<FinishedPhoto>,
    /// Current countdown value while capturing.
    pub countdown: Option<u32>,
    pub error: Option<String>,
    /// Last email outcome shown on the output screen.
    pub email_status: Option<String>,
}

#[derive(Debug, Clone)]
pub enum BoothEvent {
    // Guest input
    SelectFrame(SelectedFrame),
    StartCapture,
    ChooseShot(usize),
    ConfirmShot,
    Retake,
    SendEmail { to: String },
    Finish,
    /// Any touch or key press.
    UserActivity,

    // Results fed back by the driver
    CountdownTick(u32),
    CaptureFinished(Vec<CapturedShot>),
    CaptureFailed { error: String },
    PhotoReady(FinishedPhoto),
    UploadFailed { error: String },
    EmailSent { to: String },
    EmailFailed { error: String },
    InactivityExpired,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoothCommand {
    /// Open the camera and run a burst for this frame ratio.
    StartCapture { ratio: AspectRatio },
    /// Stop an in-flight burst.
    CancelCapture,
    /// Stop all camera tracks.
    ReleaseCamera,
    /// Upload the chosen shot for compositing.
    UploadShot { frame_id: RecordId, png: Vec<u8> },
    SendEmail { to: String, photo_id: RecordId },
    /// Fetch the QR code for the finished photo.
    ShowQr { photo_id: RecordId },
    RestartInactivityTimer,
    CancelInactivityTimer,
    UpdateUi,
}

#[derive(Debug, Default)]
pub struct BoothStateMachine {
    pub session: BoothSession,
}

impl BoothStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BoothPhase {
        self.session.phase
    }

    /// Apply one event and return the commands to execute, in order.
    pub fn process(&mut self, event: BoothEvent) -> Vec<BoothCommand> {
        let before = self.session.phase;
        let mut commands = Vec::new();

        match event {
            BoothEvent::SelectFrame(frame) => {
                if matches!(before, BoothPhase::Idle | BoothPhase::FrameSelected) {
                    self.session = BoothSession {
                        phase: BoothPhase::FrameSelected,
                        frame: Some(frame),
                        ..BoothSession::default()
                    };
                }
            }

            BoothEvent::StartCapture => {
                if before == BoothPhase::FrameSelected {
                    if let Some(frame) = &self.session.frame {
                        commands.push(BoothCommand::StartCapture { ratio: frame.ratio });
                        self.session.phase = BoothPhase::Capturing;
                        self.session.shots.clear();
                        self.session.chosen = None;
                        self.session.error = None;
                    }
                }
            }

            BoothEvent::CountdownTick(value) => {
                if before == BoothPhase::Capturing {
                    self.session.countdown = Some(value);
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::CaptureFinished(shots) => {
                if before == BoothPhase::Capturing {
                    self.session.phase = BoothPhase::Selecting;
                    self.session.countdown = None;
                    self.session.chosen = if shots.is_empty() { None } else { Some(0) };
                    self.session.shots = shots;
                    commands.push(BoothCommand::ReleaseCamera);
                }
            }

            BoothEvent::CaptureFailed { error } => {
                if before == BoothPhase::Capturing {
                    commands.push(BoothCommand::ReleaseCamera);
                    self.session = BoothSession {
                        error: Some(error),
                        ..BoothSession::default()
                    };
                }
            }

            BoothEvent::ChooseShot(index) => {
                if before == BoothPhase::Selecting && index < self.session.shots.len() {
                    self.session.chosen = Some(index);
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::ConfirmShot => {
                if before == BoothPhase::Selecting {
                    let upload = self
                        .session
                        .frame
                        .as_ref()
                        .zip(self.session.chosen.and_then(|i| self.session.shots.get(i)))
                        .map(|(frame, shot)| BoothCommand::UploadShot {
                            frame_id: frame.id,
                            png: shot.png.clone(),
                        });
                    if let Some(upload) = upload {
                        self.session.phase = BoothPhase::Processing;
                        self.session.error = None;
                        commands.push(upload);
                    }
                }
            }

            BoothEvent::Retake => {
                if matches!(before, BoothPhase::Capturing | BoothPhase::Selecting) {
                    if before == BoothPhase::Capturing {
                        commands.push(BoothCommand::CancelCapture);
                    }
                    commands.push(BoothCommand::ReleaseCamera);
                    self.session = BoothSession {
                        phase: BoothPhase::FrameSelected,
                        frame: self.session.frame.take(),
                        ..BoothSession::default()
                    };
                }
            }

            BoothEvent::PhotoReady(photo) => {
                if before == BoothPhase::Processing {
                    commands.push(BoothCommand::ShowQr { photo_id: photo.id });
                    self.session.phase = BoothPhase::Output;
                    // Unchosen shots are abandoned once a photo exists.
                    self.session.shots.clear();
                    self.session.chosen = None;
                    self.session.finished = Some(photo);
                }
            }

            BoothEvent::UploadFailed { error } => {
                if before == BoothPhase::Processing {
                    self.session.phase = BoothPhase::Selecting;
                    self.session.error = Some(error);
                }
            }

            BoothEvent::SendEmail { to } => {
                if before == BoothPhase::Output {
                    if let Some(photo) = &self.session.finished {
                        commands.push(BoothCommand::SendEmail {
                            to,
                            photo_id: photo.id,
                        });
                        self.session.email_status = Some("Sending...".into());
                    }
                }
            }

            BoothEvent::EmailSent { to } => {
                if before == BoothPhase::Output {
                    self.session.email_status = Some(format!("Sent to {to}"));
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::EmailFailed { error } => {
                if before == BoothPhase::Output {
                    self.session.email_status = Some(format!("Failed: {error}"));
                    commands.push(BoothCommand::UpdateUi);
                }
            }

            BoothEvent::Finish => {
                if before == BoothPhase::Output {
                    self.session = BoothSession::default();
                }
            }

            BoothEvent::UserActivity => {
                if before.watches_inactivity() {
                    commands.push(BoothCommand::RestartInactivityTimer);
                }
                return commands;
            }

            BoothEvent::InactivityExpired => {
                if before != BoothPhase::Idle {
                    if before == BoothPhase::Capturing {
                        commands.push(BoothCommand::CancelCapture);
                    }
                    commands.push(BoothCommand::ReleaseCamera);
                    self.session = BoothSession::default();
                }
            }
        }

        let after = self.session.phase;
        if after != before {
            tracing::debug!(from = ?before, to = ?after, "Booth phase changed");
            commands.push(if after.watches_inactivity() {
                BoothCommand::RestartInactivityTimer
            } else {
                BoothCommand::CancelInactivityTimer
            });
            commands.push(BoothCommand::UpdateUi);
        }
        commands
    }
}

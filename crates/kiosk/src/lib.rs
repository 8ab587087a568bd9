//! Client side of the photobooth: what runs on the kiosk itself.
//!
//! The UI layer (not part of this crate) feeds user input and results into
//! [`BoothStateMachine`] and executes the [`BoothCommand`]s it returns:
//! running a [`CaptureController`] burst, uploading the chosen shot through
//! [`ApiClient`], restarting the [`InactivityTimer`].

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod inactivity;
pub mod session;
pub mod source;

pub use client::ApiClient;
pub use config::KioskConfig;
pub use controller::{CaptureController, CaptureEvent, CapturePlan, CapturedShot};
pub use error::{CaptureError, ClientError};
pub use inactivity::{InactivityExpired, InactivityTimer};
pub use session::{BoothCommand, BoothEvent, BoothPhase, BoothSession, BoothStateMachine, SelectedFrame};
pub use source::{Camera, StillCamera, VideoSource};

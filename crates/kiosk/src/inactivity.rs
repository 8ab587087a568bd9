//! Idle timeout that sends the kiosk back to its attract screen.
//!
//! At most one timer is alive at a time: [`InactivityTimer::restart`]
//! cancels the armed timer before arming a new one. Each arming gets a
//! generation number so an expiry that raced a restart can be recognised
//! as stale and ignored.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Sent once when an armed timer runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityExpired {
    pub generation: u64,
}

pub struct InactivityTimer {
    timeout: Duration,
    notify: mpsc::Sender<InactivityExpired>,
    armed: Option<CancellationToken>,
    generation: u64,
}

impl InactivityTimer {
    pub fn new(timeout: Duration, notify: mpsc::Sender<InactivityExpired>) -> Self {
        Self {
            timeout,
            notify,
            armed: None,
            generation: 0,
        }
    }

    /// Takes effect on the next restart.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Cancel any armed timer and arm a fresh one.
    pub fn restart(&mut self) {
        self.cancel();
        self.generation += 1;

        let token = CancellationToken::new();
        let generation = self.generation;
        let timeout = self.timeout;
        let notify = self.notify.clone();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    tracing::debug!(generation, "Inactivity timeout reached");
                    let _ = notify.send(InactivityExpired { generation }).await;
                }
            }
        });
        self.armed = Some(token);
    }

    /// Disarm without re-arming.
    pub fn cancel(&mut self) {
        if let Some(token) = self.armed.take() {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Whether `expired` came from the timer armed most recently.
    pub fn is_current(&self, expired: &InactivityExpired) -> bool {
        self.armed.is_some() && expired.generation == self.generation
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

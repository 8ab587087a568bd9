//! Camera abstraction.
//!
//! A [`Camera`] hands out an exclusively owned [`VideoSource`] per session.
//! The source must be released (all tracks stopped) when the session ends
//! for any reason; [`CaptureController`](crate::CaptureController) takes
//! care of that.

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::CaptureError;

#[async_trait]
pub trait Camera: Send + Sync {
    /// Acquire the live stream. Fails with
    /// [`CaptureError::DeviceUnavailable`] when access is denied.
    async fn open(&self) -> Result<Box<dyn VideoSource>, CaptureError>;
}

#[async_trait]
pub trait VideoSource: Send {
    /// Natural size of the video frames.
    fn dimensions(&self) -> (u32, u32);

    /// Grab the current frame.
    async fn grab(&mut self) -> Result<DynamicImage, CaptureError>;

    /// Stop the stream. Must be idempotent.
    fn release(&mut self);
}

/// A camera that always shows the same picture. Useful for running the
/// kiosk headless or on machines without a webcam.
#[derive(Debug, Clone)]
pub struct StillCamera {
    image: DynamicImage,
}

impl StillCamera {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }
}

#[async_trait]
impl Camera for StillCamera {
    async fn open(&self) -> Result<Box<dyn VideoSource>, CaptureError> {
        Ok(Box::new(StillSource {
            image: Some(self.image.clone()),
        }))
    }
}

struct StillSource {
    image: Option<DynamicImage>,
}

#[async_trait]
impl VideoSource for StillSource {
    fn dimensions(&self) -> (u32, u32) {
        self.image
            .as_ref()
            .map(|i| (i.width(), i.height()))
            .unwrap_or((0, 0))
    }

    async fn grab(&mut self) -> Result<DynamicImage, CaptureError> {
        self.image
            .clone()
            .ok_or_else(|| CaptureError::Stream("stream released".into()))
    }

    fn release(&mut self) {
        self.image = None;
    }
}

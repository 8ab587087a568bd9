//! Per-shot crop, resample and mirror.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use photobooth_core::geometry::{center_crop, output_size, AspectRatio, DEFAULT_CAPTURE_WIDTH};

use crate::error::{PipelineError, PipelineResult};

/// Shape of every captured shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutput {
    /// Output width in pixels; height follows the target ratio.
    pub width: u32,
    /// Flip horizontally for a selfie-mirror look.
    pub mirror: bool,
}

impl Default for CaptureOutput {
    fn default() -> Self {
        Self {
            width: DEFAULT_CAPTURE_WIDTH,
            mirror: true,
        }
    }
}

/// Crop the centred `target`-ratio region of a video frame and resample it
/// into a `output.width` wide canvas.
pub fn crop_capture(
    frame: &DynamicImage,
    target: AspectRatio,
    output: &CaptureOutput,
) -> PipelineResult<RgbaImage> {
    if output.width == 0 {
        return Err(PipelineError::Empty("capture output"));
    }
    let rect = center_crop(frame.width(), frame.height(), target)?;
    let (out_w, out_h) = output_size(output.width, target);

    let cropped = frame.crop_imm(rect.x, rect.y, rect.width, rect.height).to_rgba8();
    let mut shot = imageops::resize(&cropped, out_w, out_h, FilterType::Triangle);
    if output.mirror {
        imageops::flip_horizontal_in_place(&mut shot);
    }
    Ok(shot)
}

//! Photo + frame compositing.
//!
//! Two fit policies are supported. [`FitPolicy::Cover`] scales the photo to
//! fill the canvas and crops the overflow. [`FitPolicy::BlurPad`] keeps the
//! whole photo visible, centred over a blurred, cover-fit copy of itself so
//! the padding reads as intentional. In both cases the frame is drawn last,
//! on top, and the result is one flattened RGBA raster.

use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use photobooth_core::error::CoreError;
use photobooth_core::geometry::{centered_offset, fit_contain, fit_cover};
use serde::{Deserialize, Serialize};

use crate::codec::{decode, encode_png};
use crate::error::{PipelineError, PipelineResult};

/// Canvas used when the frame's own size is not authoritative.
pub const FIXED_CANVAS: (u32, u32) = (1080, 1350);

/// Blur strength for the blur-pad background.
pub const DEFAULT_BLUR_SIGMA: f32 = 50.0;

/// The blur runs on a copy this many times smaller, then is scaled back up.
const BLUR_DOWNSCALE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitPolicy {
    #[default]
    Cover,
    BlurPad,
}

impl FitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::BlurPad => "blur-pad",
        }
    }
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cover" => Ok(Self::Cover),
            "blur-pad" | "blur_pad" | "blurpad" => Ok(Self::BlurPad),
            other => Err(CoreError::Validation(format!(
                "Unknown composite policy '{other}' (expected 'cover' or 'blur-pad')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasSize {
    /// Output takes the frame image's pixel dimensions.
    #[default]
    FrameNative,
    /// Output has a fixed size; the frame is contain-fit onto it.
    Fixed { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeOptions {
    pub policy: FitPolicy,
    pub canvas: CanvasSize,
    pub blur_sigma: f32,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            policy: FitPolicy::Cover,
            canvas: CanvasSize::FrameNative,
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }
}

impl CompositeOptions {
    pub fn with_policy(policy: FitPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }
}

/// Merge `photo` and `frame` into a single raster.
pub fn composite(
    photo: &DynamicImage,
    frame: &DynamicImage,
    options: &CompositeOptions,
) -> PipelineResult<RgbaImage> {
    let (width, height) = match options.canvas {
        CanvasSize::FrameNative => (frame.width(), frame.height()),
        CanvasSize::Fixed { width, height } => (width, height),
    };
    if width == 0 || height == 0 {
        return Err(PipelineError::Empty("canvas"));
    }
    if photo.width() == 0 || photo.height() == 0 {
        return Err(PipelineError::Empty("photo"));
    }

    let photo = photo.to_rgba8();
    let mut canvas = match options.policy {
        FitPolicy::Cover => cover_layer(&photo, (width, height)),
        FitPolicy::BlurPad => blur_pad_layer(&photo, (width, height), options.blur_sigma),
    };

    let frame = frame.to_rgba8();
    if frame.dimensions() == (width, height) {
        imageops::overlay(&mut canvas, &frame, 0, 0);
    } else {
        let (fw, fh) = fit_contain(frame.dimensions(), (width, height));
        let scaled = imageops::resize(&frame, fw, fh, FilterType::Triangle);
        let (x, y) = centered_offset((width, height), (fw, fh));
        imageops::overlay(&mut canvas, &scaled, x, y);
    }

    Ok(canvas)
}

/// Decode both inputs, composite and encode the result as PNG.
///
/// The frame is decoded first so a missing or corrupt frame always fails
/// the whole operation.
pub fn composite_png(
    photo: &[u8],
    frame: &[u8],
    options: &CompositeOptions,
) -> PipelineResult<Vec<u8>> {
    let frame = decode(frame, "frame")?;
    let photo = decode(photo, "photo")?;
    let out = composite(&photo, &frame, options)?;
    tracing::debug!(
        policy = %options.policy,
        width = out.width(),
        height = out.height(),
        "Composited photo",
    );
    encode_png(&out)
}

/// Photo scaled to cover `bounds`, centre-cropped to exactly `bounds`.
fn cover_layer(photo: &RgbaImage, bounds: (u32, u32)) -> RgbaImage {
    let (sw, sh) = fit_cover(photo.dimensions(), bounds);
    let scaled = imageops::resize(photo, sw, sh, FilterType::Triangle);
    let (dx, dy) = centered_offset(bounds, (sw, sh));
    imageops::crop_imm(&scaled, (-dx) as u32, (-dy) as u32, bounds.0, bounds.1).to_image()
}

fn blur_pad_layer(photo: &RgbaImage, bounds: (u32, u32), sigma: f32) -> RgbaImage {
    let mut background = soften(&cover_layer(photo, bounds), sigma);

    let (fw, fh) = fit_contain(photo.dimensions(), bounds);
    let contained = imageops::resize(photo, fw, fh, FilterType::Triangle);
    let (x, y) = centered_offset(bounds, (fw, fh));
    imageops::overlay(&mut background, &contained, x, y);
    background
}

/// Heavy Gaussian blur done at reduced resolution.
fn soften(image: &RgbaImage, sigma: f32) -> RgbaImage {
    let (w, h) = image.dimensions();
    let small = imageops::resize(
        image,
        (w / BLUR_DOWNSCALE).max(1),
        (h / BLUR_DOWNSCALE).max(1),
        FilterType::Triangle,
    );
    let blurred = imageops::blur(&small, (sigma / BLUR_DOWNSCALE as f32).max(0.5));
    imageops::resize(&blurred, w, h, FilterType::Triangle)
}

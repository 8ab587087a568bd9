//! Pixel geometry for the capture and composite pipeline.
//!
//! The capture side crops a live video frame to the selected frame's
//! aspect ratio ([`center_crop`]) and resamples it to a fixed output width
//! ([`output_size`]). The compositor sizes layers with [`fit_cover`] and
//! [`fit_contain`] and positions them with [`centered_offset`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Aspect ratio used when a frame's natural size is unknown (portrait 4:5).
pub const DEFAULT_FRAME_RATIO: f64 = 4.0 / 5.0;

/// Width in pixels of every captured shot after resampling.
pub const DEFAULT_CAPTURE_WIDTH: u32 = 1080;

/// A strictly positive, finite width/height ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AspectRatio(f64);

impl AspectRatio {
    /// Build a ratio from pixel dimensions.
    pub fn from_dimensions(width: u32, height: u32) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::Validation(format!(
                "Cannot derive an aspect ratio from {width}x{height}"
            )));
        }
        Ok(Self(f64::from(width) / f64::from(height)))
    }

    /// Build a ratio from a raw `width / height` value.
    pub fn new(ratio: f64) -> Result<Self, CoreError> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Aspect ratio must be a positive finite number (got {ratio})"
            )));
        }
        Ok(Self(ratio))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self(DEFAULT_FRAME_RATIO)
    }
}

impl TryFrom<f64> for AspectRatio {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AspectRatio> for f64 {
    fn from(ratio: AspectRatio) -> Self {
        ratio.0
    }
}

/// An axis-aligned source rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Whether the rectangle lies fully inside a `width` x `height` source.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// Compute the centred source rectangle of a `source_width` x `source_height`
/// frame that has the `target` aspect ratio.
///
/// When the source is relatively wider than the target the left and right
/// edges are cropped (full height kept); otherwise the top and bottom are.
///
/// ```
/// use photobooth_core::geometry::{center_crop, AspectRatio};
///
/// let rect = center_crop(1280, 720, AspectRatio::new(0.8).unwrap()).unwrap();
/// assert_eq!((rect.x, rect.y, rect.width, rect.height), (352, 0, 576, 720));
/// ```
pub fn center_crop(
    source_width: u32,
    source_height: u32,
    target: AspectRatio,
) -> Result<CropRect, CoreError> {
    let source = AspectRatio::from_dimensions(source_width, source_height)?;

    if source.value() > target.value() {
        let width = scaled(source_height, target.value()).clamp(1, source_width);
        Ok(CropRect {
            x: (source_width - width) / 2,
            y: 0,
            width,
            height: source_height,
        })
    } else {
        let height = scaled(source_width, 1.0 / target.value()).clamp(1, source_height);
        Ok(CropRect {
            x: 0,
            y: (source_height - height) / 2,
            width: source_width,
            height,
        })
    }
}

/// Output canvas size for a capture of fixed `width` at the `target` ratio.
pub fn output_size(width: u32, target: AspectRatio) -> (u32, u32) {
    (width, scaled(width, 1.0 / target.value()).max(1))
}

/// Size to which `source` must be scaled so it covers `bounds` completely
/// (one side matches, the other overflows and gets cropped).
pub fn fit_cover(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let scale = f64::max(
        f64::from(bounds.0) / f64::from(source.0.max(1)),
        f64::from(bounds.1) / f64::from(source.1.max(1)),
    );
    (
        scaled(source.0, scale).max(bounds.0),
        scaled(source.1, scale).max(bounds.1),
    )
}

/// Size to which `source` must be scaled to fit inside `bounds` without
/// cropping (one side matches, the other leaves padding).
pub fn fit_contain(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let scale = f64::min(
        f64::from(bounds.0) / f64::from(source.0.max(1)),
        f64::from(bounds.1) / f64::from(source.1.max(1)),
    );
    (
        scaled(source.0, scale).clamp(1, bounds.0.max(1)),
        scaled(source.1, scale).clamp(1, bounds.1.max(1)),
    )
}

/// Offset that centres an `inner` box inside an `outer` box. Negative when
/// the inner box overflows.
pub fn centered_offset(outer: (u32, u32), inner: (u32, u32)) -> (i64, i64) {
    (
        (i64::from(outer.0) - i64::from(inner.0)) / 2,
        (i64::from(outer.1) - i64::from(inner.1)) / 2,
    )
}

fn scaled(length: u32, factor: f64) -> u32 {
    (f64::from(length) * factor).round() as u32
}

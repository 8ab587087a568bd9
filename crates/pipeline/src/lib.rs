//! Image processing for the photobooth.
//!
//! - [`capture`]: crop a raw camera frame to the selected frame's aspect
//!   ratio, resample it to a fixed width, optionally mirror it.
//! - [`composite`]: merge one captured shot with a frame image under a fit
//!   policy.
//! - [`background`]: make a frame's background transparent, either by colour
//!   key or through a segmentation model.
//!
//! The synchronous functions are CPU-bound; callers on an async runtime
//! should wrap them in `spawn_blocking` (or [`codec::offload`]). The async
//! entry points already move their pixel work off the runtime.

pub mod background;
pub mod capture;
pub mod codec;
pub mod composite;
pub mod error;

pub use background::{
    apply_mask, parse_hex_color, remove_background, BorderFloodSegmenter, ColorKey, RemoteSegmenter,
    Segmenter,
};
pub use capture::{crop_capture, CaptureOutput};
pub use composite::{composite, composite_png, CanvasSize, CompositeOptions, FitPolicy};
pub use codec::offload;
pub use error::{PipelineError, PipelineResult};

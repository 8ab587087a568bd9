//! Decoding and PNG encoding.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{PipelineError, PipelineResult};

/// Decode any supported format, guessing it from the content.
pub fn decode(bytes: &[u8], what: &'static str) -> PipelineResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(PipelineError::Empty(what));
    }
    let image = image::load_from_memory(bytes)
        .map_err(|source| PipelineError::Decode { what, source })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::Empty(what));
    }
    Ok(image)
}

pub fn encode_png(image: &RgbaImage) -> PipelineResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(PipelineError::Encode)?;
    Ok(out.into_inner())
}

/// Run CPU-bound image work on the blocking pool.
pub async fn offload<T, F>(work: F) -> PipelineResult<T>
where
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))?
}

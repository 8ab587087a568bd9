//! Frame background removal.
//!
//! [`ColorKey`] clears pixels whose colour exactly matches one of a few
//! known background tones (the light checkerboard that image editors
//! export when transparency is flattened). A [`Segmenter`] produces a
//! foreground mask for art where colour keying is not enough; the mask
//! then becomes the image's alpha channel via [`apply_mask`].

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{GrayImage, Luma, Rgb, Rgba, RgbaImage};
use photobooth_core::error::CoreError;

use crate::codec::{decode, encode_png, offload};
use crate::error::{PipelineError, PipelineResult};

/// Replacement for keyed pixels: transparent black.
const CLEARED: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ---------------------------------------------------------------------------
// Colour key
// ---------------------------------------------------------------------------

/// Exact-match colour keying. Each pixel is judged on its own RGB value,
/// alpha ignored, with no regard for its neighbours or position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorKey {
    keys: Vec<Rgb<u8>>,
}

impl Default for ColorKey {
    /// White and silver, the two checkerboard tones.
    fn default() -> Self {
        Self {
            keys: vec![Rgb([0xFF, 0xFF, 0xFF]), Rgb([0xC0, 0xC0, 0xC0])],
        }
    }
}

impl ColorKey {
    pub fn new(keys: Vec<Rgb<u8>>) -> Result<Self, CoreError> {
        if keys.is_empty() {
            return Err(CoreError::Validation("At least one key colour is required".into()));
        }
        Ok(Self { keys })
    }

    /// Build from `#rrggbb` strings.
    pub fn from_hex<S: AsRef<str>>(keys: &[S]) -> Result<Self, CoreError> {
        let keys = keys
            .iter()
            .map(|k| parse_hex_color(k.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keys)
    }

    pub fn keys(&self) -> &[Rgb<u8>] {
        &self.keys
    }

    pub fn matches(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, _] = pixel.0;
        self.keys.iter().any(|k| k.0 == [r, g, b])
    }

    /// Clear every matching pixel in place. Returns how many changed.
    pub fn apply(&self, image: &mut RgbaImage) -> usize {
        let mut changed = 0;
        for pixel in image.pixels_mut() {
            if self.matches(pixel) && *pixel != CLEARED {
                *pixel = CLEARED;
                changed += 1;
            }
        }
        changed
    }

    /// Decode, key and re-encode as PNG.
    pub fn strip_png(&self, bytes: &[u8]) -> PipelineResult<Vec<u8>> {
        let mut image = decode(bytes, "frame")?.to_rgba8();
        let cleared = self.apply(&mut image);
        tracing::debug!(cleared, "Colour-key strip applied");
        encode_png(&image)
    }
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_hex_color(raw: &str) -> Result<Rgb<u8>, CoreError> {
    let hex = raw.trim().trim_start_matches('#');
    let invalid = || CoreError::Validation(format!("Invalid colour '{raw}', expected #rrggbb"));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

/// Classifies foreground and background across a whole image.
#[async_trait]
pub trait Segmenter: Send + Sync {
    fn name(&self) -> &'static str;

    /// A mask the size of `image`: 255 foreground, 0 background.
    async fn segment(&self, image: &RgbaImage) -> PipelineResult<GrayImage>;
}

/// Set each pixel's alpha to the lower of its alpha and the mask value.
pub fn apply_mask(image: &mut RgbaImage, mask: &GrayImage) -> PipelineResult<()> {
    if image.dimensions() != mask.dimensions() {
        return Err(PipelineError::Segmentation(format!(
            "Mask is {:?} but image is {:?}",
            mask.dimensions(),
            image.dimensions()
        )));
    }
    for (pixel, Luma([m])) in image.pixels_mut().zip(mask.pixels()) {
        pixel.0[3] = pixel.0[3].min(*m);
    }
    Ok(())
}

/// Decode, segment, mask and re-encode as PNG. Decoding and encoding run
/// on the blocking pool.
pub async fn remove_background(
    segmenter: &dyn Segmenter,
    bytes: Vec<u8>,
) -> PipelineResult<Vec<u8>> {
    let image = offload(move || Ok(decode(&bytes, "frame")?.to_rgba8())).await?;
    let mask = segmenter.segment(&image).await?;
    let png = offload(move || {
        let mut image = image;
        apply_mask(&mut image, &mask)?;
        encode_png(&image)
    })
    .await?;
    tracing::debug!(segmenter = segmenter.name(), "Background removed");
    Ok(png)
}

/// Built-in segmenter: flood fill from the border over pixels close in
/// colour to the border pixel that started the fill. Everything reached is
/// background. Works for flat or gently graded backgrounds.
#[derive(Debug, Clone, Copy)]
pub struct BorderFloodSegmenter {
    /// Max per-channel difference from the seed colour.
    pub tolerance: u8,
}

impl Default for BorderFloodSegmenter {
    fn default() -> Self {
        Self { tolerance: 24 }
    }
}

impl BorderFloodSegmenter {
    pub fn mask(&self, image: &RgbaImage) -> GrayImage {
        let (w, h) = image.dimensions();
        let mut mask = GrayImage::from_pixel(w, h, Luma([255]));
        if w == 0 || h == 0 {
            return mask;
        }

        let mut queue: VecDeque<(u32, u32, Rgba<u8>)> = VecDeque::new();
        let seed = |x: u32, y: u32, mask: &mut GrayImage, queue: &mut VecDeque<(u32, u32, Rgba<u8>)>| {
            if mask.get_pixel(x, y).0[0] != 0 {
                mask.put_pixel(x, y, Luma([0]));
                queue.push_back((x, y, *image.get_pixel(x, y)));
            }
        };
        for x in 0..w {
            seed(x, 0, &mut mask, &mut queue);
            seed(x, h - 1, &mut mask, &mut queue);
        }
        for y in 0..h {
            seed(0, y, &mut mask, &mut queue);
            seed(w - 1, y, &mut mask, &mut queue);
        }

        while let Some((x, y, origin)) = queue.pop_front() {
            let neighbours = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbours {
                if nx >= w || ny >= h || mask.get_pixel(nx, ny).0[0] == 0 {
                    continue;
                }
                let pixel = image.get_pixel(nx, ny);
                if pixel.0[3] == 0 || self.similar(pixel, &origin) {
                    mask.put_pixel(nx, ny, Luma([0]));
                    queue.push_back((nx, ny, origin));
                }
            }
        }
        mask
    }

    fn similar(&self, a: &Rgba<u8>, b: &Rgba<u8>) -> bool {
        a.0[..3]
            .iter()
            .zip(&b.0[..3])
            .all(|(x, y)| x.abs_diff(*y) <= self.tolerance)
    }
}

#[async_trait]
impl Segmenter for BorderFloodSegmenter {
    fn name(&self) -> &'static str {
        "border-flood"
    }

    async fn segment(&self, image: &RgbaImage) -> PipelineResult<GrayImage> {
        let this = *self;
        let image = image.clone();
        offload(move || Ok(this.mask(&image))).await
    }
}

/// Delegates to an HTTP segmentation service. The request body is the
/// image as PNG; the response is an image whose alpha channel is the mask
/// (a cut-out PNG, as most background-removal services return).
#[derive(Debug, Clone)]
pub struct RemoteSegmenter {
    client: reqwest::Client,
    url: String,
}

impl RemoteSegmenter {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Segmentation(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Segmenter for RemoteSegmenter {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn segment(&self, image: &RgbaImage) -> PipelineResult<GrayImage> {
        let source = image.clone();
        let size = image.dimensions();
        let body = offload(move || encode_png(&source)).await?;
        tracing::debug!(url = %self.url, bytes = body.len(), "Requesting segmentation");

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(body)
            .send()
            .await
            .map_err(|e| PipelineError::Segmentation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Segmentation(format!("{status}: {text}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Segmentation(e.to_string()))?;
        offload(move || {
            let cutout = decode(&bytes, "segmentation result")?.to_rgba8();
            Ok(alpha_as_mask(&cutout, size))
        })
        .await
    }
}

/// Extract the alpha channel, resized to `size` if the service changed it.
fn alpha_as_mask(cutout: &RgbaImage, size: (u32, u32)) -> GrayImage {
    let mask = GrayImage::from_fn(cutout.width(), cutout.height(), |x, y| {
        Luma([cutout.get_pixel(x, y).0[3]])
    });
    if mask.dimensions() == size {
        mask
    } else {
        image::imageops::resize(&mask, size.0, size.1, FilterType::Triangle)
    }
}

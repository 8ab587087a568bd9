//! QR codes for photo download links.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use qrcode::types::Color;
use qrcode::QrCode;

/// Pixels per QR module when the caller does not choose.
pub const DEFAULT_MODULE_PX: u32 = 8;

/// Quiet-zone width in modules, per the QR standard.
pub const DEFAULT_QUIET_ZONE: u32 = 4;

/// Upper bound on encoded data; longer payloads make unscannable codes.
const MAX_DATA_LEN: usize = 2048;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR payload must not be empty")]
    Empty,

    #[error("QR payload too long ({0} bytes, max {MAX_DATA_LEN})")]
    TooLong(usize),

    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("QR image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Link to the kiosk's download page for a photo.
///
/// ```
/// use photobooth_notify::download_link;
///
/// assert_eq!(
///     download_link("http://kiosk:3000/", "http://kiosk:3000/assets/photos/p.png"),
///     "http://kiosk:3000/download.html?photo=http%3A%2F%2Fkiosk%3A3000%2Fassets%2Fphotos%2Fp.png"
/// );
/// ```
pub fn download_link(public_base_url: &str, photo_url: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(photo_url.as_bytes()).collect();
    format!(
        "{}/download.html?photo={encoded}",
        public_base_url.trim_end_matches('/')
    )
}

/// Render `data` as a black-on-white PNG QR code.
pub fn render_qr_png(data: &str, module_px: u32, quiet_zone: u32) -> Result<Vec<u8>, QrError> {
    let image = render_qr(data, module_px, quiet_zone)?;
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn render_qr(data: &str, module_px: u32, quiet_zone: u32) -> Result<GrayImage, QrError> {
    if data.is_empty() {
        return Err(QrError::Empty);
    }
    if data.len() > MAX_DATA_LEN {
        return Err(QrError::TooLong(data.len()));
    }

    let code = QrCode::new(data.as_bytes())?;
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let scale = module_px.max(1);
    let side = (modules + 2 * quiet_zone) * scale;

    Ok(GrayImage::from_fn(side, side, |x, y| {
        let mx = (x / scale).checked_sub(quiet_zone);
        let my = (y / scale).checked_sub(quiet_zone);
        let dark = match (mx, my) {
            (Some(mx), Some(my)) if mx < modules && my < modules => {
                colors[(my * modules + mx) as usize] == Color::Dark
            }
            _ => false,
        };
        if dark {
            Luma([0])
        } else {
            Luma([255])
        }
    }))
}

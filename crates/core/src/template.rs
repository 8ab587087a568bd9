//! Email body templating.
//!
//! Templates are admin-authored HTML with a single substitution point,
//! [`PHOTO_URL_PLACEHOLDER`], replaced by the finished photo's public URL.

use crate::error::CoreError;

/// The placeholder substituted with the photo URL.
pub const PHOTO_URL_PLACEHOLDER: &str = "{{photoUrl}}";

/// Validate that a template carries the photo URL placeholder.
pub fn validate_template(template: &str) -> Result<(), CoreError> {
    if template.contains(PHOTO_URL_PLACEHOLDER) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Email template must contain the {PHOTO_URL_PLACEHOLDER} placeholder"
        )))
    }
}

/// Substitute the photo URL into the template, escaping it for use inside
/// an HTML attribute or text node.
pub fn render_photo_email(template: &str, photo_url: &str) -> String {
    template.replace(PHOTO_URL_PLACEHOLDER, &escape_html(photo_url))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

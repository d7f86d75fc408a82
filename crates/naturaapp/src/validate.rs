//! # Record Validation
//!
//! Pure checks deciding whether a creation is safe to keep. They run on every
//! write (reject) and on every read (filter), since earlier versions of the app
//! persisted records whose image was an HTML error page instead of a picture.
//!
//! An image reference is valid iff it is non-empty and either
//! - starts with `http://` or `https://`, or
//! - is an inline payload whose declared media type starts with `image/`.
//!
//! `data:text/html` payloads are called out separately so callers get a precise
//! error for the known failure mode.

use crate::error::ValidationError;
use crate::model::Creation;
use tracing::warn;

pub const INLINE_IMAGE_PREFIX: &str = "data:image/";
const INLINE_HTML_PREFIX: &str = "data:text/html";
const PREVIEW_CHARS: usize = 50;

pub fn is_remote_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

pub fn is_inline_image(value: &str) -> bool {
    value.starts_with(INLINE_IMAGE_PREFIX)
}

pub fn is_valid_image_reference(value: &str) -> bool {
    check_image_reference(value).is_ok()
}

/// Classify an image reference, returning the precise reason it is refused.
pub fn check_image_reference(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingImage);
    }
    if value.starts_with(INLINE_HTML_PREFIX) {
        return Err(ValidationError::HtmlImage);
    }
    if is_remote_url(value) || is_inline_image(value) {
        Ok(())
    } else {
        Err(ValidationError::UnrecognizedImage(preview(value)))
    }
}

/// Keep only records whose image reference passes validation. Order is
/// preserved. Dropped records are logged, never reported as errors.
pub fn filter_valid_creations(creations: Vec<Creation>) -> Vec<Creation> {
    creations
        .into_iter()
        .filter(|creation| match check_image_reference(&creation.image_uri) {
            Ok(()) => true,
            Err(reason) => {
                warn!(id = %creation.id, %reason, "dropping invalid creation");
                false
            }
        })
        .collect()
}

fn preview(value: &str) -> String {
    if value.chars().count() <= PREVIEW_CHARS {
        value.to_string()
    } else {
        let head: String = value.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", head)
    }
}

use crate::backup::{encode_inline_image, sniff_media_type};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NaturaError, Result};
use crate::model::NewCreation;
use crate::repository::CreationRepository;
use crate::store::CreationStore;
use crate::validate::is_valid_image_reference;
use std::fs;
use std::path::Path;

use super::helpers::indexed_creations;

pub fn run<S: CreationStore>(repo: &CreationRepository<S>, new: NewCreation) -> Result<CmdResult> {
    let saved = repo.save(new)?;

    let affected = indexed_creations(repo)?
        .into_iter()
        .filter(|d| d.creation.id == saved.id)
        .collect();

    let mut result = CmdResult::default().with_affected(affected);
    result.add_message(CmdMessage::success(format!(
        "Saved {} ({})",
        saved.common_name, saved.kind
    )));
    Ok(result)
}

/// Turn an `--image` argument into an image reference. URLs and inline images
/// pass through; anything else is read as a local image file and inlined.
pub fn image_reference(arg: &str) -> Result<String> {
    if is_valid_image_reference(arg) {
        return Ok(arg.to_string());
    }

    let path = Path::new(arg);
    if !path.is_file() {
        // Let the validator produce the precise complaint.
        return Ok(arg.to_string());
    }

    let bytes = fs::read(path)?;
    let media_type = sniff_media_type(&bytes).ok_or_else(|| {
        NaturaError::Api(format!("{} is not a PNG, JPEG, GIF or WEBP image", path.display()))
    })?;
    Ok(encode_inline_image(media_type, &bytes))
}

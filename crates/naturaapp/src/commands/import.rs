use crate::backup::import_document;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NaturaError, Result};
use crate::repository::CreationRepository;
use crate::store::CreationStore;
use std::fs;
use std::path::Path;

use super::helpers::indexed_creations;

/// Import a backup file. With `replace_existing`, the current collection is
/// cleared first.
pub fn run<S: CreationStore>(
    repo: &CreationRepository<S>,
    path: &Path,
    replace_existing: bool,
) -> Result<CmdResult> {
    let text = fs::read_to_string(path).map_err(NaturaError::Io)?;
    let outcome = import_document(repo, &text, replace_existing)?;

    let affected = indexed_creations(repo)?
        .into_iter()
        .filter(|d| outcome.imported.iter().any(|c| c.id == d.creation.id))
        .collect();

    let mut result = CmdResult::default().with_affected(affected);
    if outcome.removed > 0 {
        result.add_message(CmdMessage::info(format!(
            "Removed {} existing creation(s)",
            outcome.removed
        )));
    }
    if outcome.skipped > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {} invalid record(s)",
            outcome.skipped
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Imported {} creation(s) from {}",
        outcome.imported.len(),
        path.display()
    )));
    Ok(result)
}

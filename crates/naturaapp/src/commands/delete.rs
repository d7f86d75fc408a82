use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::CreationRepository;
use crate::store::CreationStore;

use super::helpers::{indexed_creations, resolve_selectors, Selector};

/// Delete the selected creations. Every selector is resolved before anything
/// is removed, so an unknown index deletes nothing.
pub fn run<S: CreationStore>(
    repo: &CreationRepository<S>,
    selectors: &[Selector],
) -> Result<CmdResult> {
    let indexed = indexed_creations(repo)?;
    let targets = resolve_selectors(&indexed, selectors)?;

    for target in &targets {
        repo.delete(&target.creation.id)?;
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Deleted {} creation(s)",
        targets.len()
    )));
    Ok(result.with_affected(targets))
}

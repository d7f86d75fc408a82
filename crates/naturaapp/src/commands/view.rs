use crate::commands::CmdResult;
use crate::error::Result;
use crate::repository::CreationRepository;
use crate::store::CreationStore;

use super::helpers::{indexed_creations, resolve_selectors, Selector};

pub fn run<S: CreationStore>(
    repo: &CreationRepository<S>,
    selectors: &[Selector],
) -> Result<CmdResult> {
    let indexed = indexed_creations(repo)?;
    let listed = resolve_selectors(&indexed, selectors)?;
    Ok(CmdResult::default().with_listed(listed))
}

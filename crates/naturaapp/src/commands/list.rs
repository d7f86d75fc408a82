use crate::commands::{CmdResult, DisplayCreation};
use crate::error::Result;
use crate::model::CreationKind;
use crate::repository::CreationRepository;
use crate::store::CreationStore;

use super::helpers::indexed_creations;

#[derive(Debug, Clone, Default)]
pub struct CreationFilter {
    pub kind: Option<CreationKind>,
}

impl CreationFilter {
    pub fn of_kind(kind: CreationKind) -> Self {
        Self { kind: Some(kind) }
    }

    fn matches(&self, display: &DisplayCreation) -> bool {
        self.kind.map_or(true, |kind| display.creation.kind == kind)
    }
}

pub fn run<S: CreationStore>(
    repo: &CreationRepository<S>,
    filter: &CreationFilter,
) -> Result<CmdResult> {
    let listed = indexed_creations(repo)?
        .into_iter()
        .filter(|d| filter.matches(d))
        .collect();
    Ok(CmdResult::default().with_listed(listed))
}

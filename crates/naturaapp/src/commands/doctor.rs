use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::CreationRepository;
use crate::store::CreationStore;

pub fn run<S: CreationStore>(repo: &CreationRepository<S>) -> Result<CmdResult> {
    let removed = repo.compact()?;
    let mut result = CmdResult::default();

    if let Some(report) = repo.migration_report() {
        if let Some(error) = &report.error {
            result.add_message(CmdMessage::error(format!(
                "Legacy migration failed and its data was discarded: {}",
                error
            )));
        } else if !report.is_noop() {
            result.add_message(CmdMessage::info(format!(
                "Migrated {} legacy creation(s), skipped {}",
                report.migrated, report.skipped
            )));
        }
    }

    if removed == 0 {
        result.add_message(CmdMessage::success("No invalid creations found."));
    } else {
        result.add_message(CmdMessage::warning(format!(
            "Removed {} creation(s) with an unusable image reference.",
            removed
        )));
    }

    Ok(result)
}

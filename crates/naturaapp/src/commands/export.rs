use crate::backup::{export_document, ImageFetcher};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NaturaError, Result};
use crate::repository::CreationRepository;
use crate::store::CreationStore;
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::info;

pub const BACKUP_FILE_PREFIX: &str = "natura-backup-";

/// Write a backup of every creation into `dir`.
pub fn run<S, F>(repo: &CreationRepository<S>, fetcher: &F, dir: &Path) -> Result<CmdResult>
where
    S: CreationStore,
    F: ImageFetcher + ?Sized,
{
    let outcome = export_document(repo, fetcher)?;
    let json = outcome.document.to_json()?;

    fs::create_dir_all(dir).map_err(NaturaError::Io)?;
    let filename = format!(
        "{}{}.json",
        BACKUP_FILE_PREFIX,
        Utc::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let path = dir.join(filename);
    fs::write(&path, json).map_err(NaturaError::Io)?;
    info!(path = %path.display(), count = outcome.document.count, "backup written");

    let mut result = CmdResult::default();
    for (creation, reason) in &outcome.skipped {
        result.add_message(CmdMessage::error(format!(
            "Left out {}: {}",
            creation.common_name, reason
        )));
    }
    if !outcome.skipped.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "This backup is missing {} creation(s); importing it with --replace would lose them.",
            outcome.skipped.len()
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Exported {} creation(s) to {}",
        outcome.document.count,
        path.display()
    )));
    Ok(result.with_paths(vec![path]))
}

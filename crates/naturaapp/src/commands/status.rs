use crate::commands::{CmdResult, NaturaPaths, StatusReport};
use crate::environment::Environment;
use crate::error::Result;
use crate::model::CreationKind;
use crate::repository::CreationRepository;
use crate::store::CreationStore;

pub fn run<S: CreationStore>(
    repo: &CreationRepository<S>,
    environment: Environment,
    paths: &NaturaPaths,
) -> Result<CmdResult> {
    let creations = repo.list()?;
    let by_kind = CreationKind::ALL
        .iter()
        .map(|kind| (*kind, creations.iter().filter(|c| c.kind == *kind).count()))
        .collect();

    let report = StatusReport {
        environment,
        backend: repo.store().kind(),
        data_dir: paths.data.clone(),
        total: creations.len(),
        by_kind,
        credential_set: repo.credential()?.is_some(),
        migration: repo.migration_report().cloned(),
    };

    Ok(CmdResult {
        status: Some(report),
        ..Default::default()
    })
}

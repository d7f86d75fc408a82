//! # Legacy Migration
//!
//! Before the Structured Store existed, the browser build kept everything in
//! flat key-value storage: the creations array under `natura_creations` and
//! the credential under `natura_api_key`. The [`MigrationController`] moves
//! that data into the Structured Store the first time the repository touches
//! it, then deletes the legacy keys.
//!
//! ## Protocol
//!
//! 1. Runs at most once per controller. The repository owns exactly one
//!    controller for the process, so this is once per process. Later calls
//!    return the recorded report immediately.
//! 2. Legacy creations are decoded leniently; each record whose image
//!    reference passes validation is inserted. A record that fails to insert
//!    is skipped, the batch goes on. The legacy blob is deleted afterwards
//!    whether or not it could be parsed.
//! 3. A legacy credential is written to the settings collection, then its key
//!    is deleted.
//! 4. Any other error is caught and recorded in the report, and both legacy
//!    keys are deleted regardless. Losing unreadable legacy data is accepted;
//!    keeping a large corrupt blob around exhausts the storage quota.
//!
//! Migration is not a sync: once it has run (or been abandoned), the legacy
//! keys are never consulted again.

use crate::error::Result;
use crate::store::backend::KeyValueBackend;
use crate::store::flat::decode_creations;
use crate::store::{CreationStore, CREATIONS_KEY, CREDENTIAL_KEY, CREDENTIAL_SETTING};
use crate::validate::check_image_reference;
use once_cell::unsync::OnceCell;
use tracing::{info, warn};

/// What the single migration run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// A legacy creations blob was present (parsable or not).
    pub found_legacy_creations: bool,
    pub migrated: usize,
    pub skipped: usize,
    pub credential_migrated: bool,
    /// Set when the run was abandoned on an unexpected error.
    pub error: Option<String>,
}

impl MigrationReport {
    /// True when there was no legacy data at all.
    pub fn is_noop(&self) -> bool {
        !self.found_legacy_creations && !self.credential_migrated && self.error.is_none()
    }
}

pub struct MigrationController {
    legacy: Box<dyn KeyValueBackend>,
    outcome: OnceCell<MigrationReport>,
}

impl MigrationController {
    pub fn new(legacy: impl KeyValueBackend + 'static) -> Self {
        Self {
            legacy: Box::new(legacy),
            outcome: OnceCell::new(),
        }
    }

    /// Run the migration into `target` unless it already ran.
    pub fn ensure_migrated<S: CreationStore + ?Sized>(&self, target: &S) -> &MigrationReport {
        self.outcome.get_or_init(|| self.migrate(target))
    }

    pub fn has_run(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// The report of the run, if it happened.
    pub fn report(&self) -> Option<&MigrationReport> {
        self.outcome.get()
    }

    fn migrate<S: CreationStore + ?Sized>(&self, target: &S) -> MigrationReport {
        let mut report = MigrationReport::default();

        if let Err(err) = self.transfer(target, &mut report) {
            warn!(%err, "legacy migration failed, discarding legacy data");
            report.error = Some(err.to_string());
            for key in [CREATIONS_KEY, CREDENTIAL_KEY] {
                if let Err(err) = self.legacy.remove_item(key) {
                    warn!(key, %err, "could not remove legacy key");
                }
            }
        }

        if !report.is_noop() {
            info!(
                migrated = report.migrated,
                skipped = report.skipped,
                credential = report.credential_migrated,
                "legacy migration finished"
            );
        }
        report
    }

    fn transfer<S: CreationStore + ?Sized>(
        &self,
        target: &S,
        report: &mut MigrationReport,
    ) -> Result<()> {
        if let Some(raw) = self.legacy.get_item(CREATIONS_KEY)? {
            report.found_legacy_creations = true;
            let records = decode_creations(&raw);
            info!(count = records.len(), "migrating legacy creations");

            for creation in records {
                if let Err(reason) = check_image_reference(&creation.image_uri) {
                    warn!(id = %creation.id, %reason, "not migrating invalid creation");
                    report.skipped += 1;
                    continue;
                }
                match target.insert(&creation) {
                    Ok(()) => report.migrated += 1,
                    Err(err) => {
                        warn!(id = %creation.id, %err, "could not migrate creation");
                        report.skipped += 1;
                    }
                }
            }

            self.legacy.remove_item(CREATIONS_KEY)?;
        }

        if let Some(credential) = self.legacy.get_item(CREDENTIAL_KEY)? {
            if !credential.is_empty() {
                target.put_setting(CREDENTIAL_SETTING, &credential)?;
                report.credential_migrated = true;
            }
            self.legacy.remove_item(CREDENTIAL_KEY)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for MigrationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationController")
            .field("outcome", &self.outcome.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::model::{Creation, CreationKind, NewCreation};
    use crate::store::mem_backend::MemBackend;
    use crate::store::structured::StructuredStore;
    use chrono::Utc;
    use std::rc::Rc;

    fn creation(id: &str, image_uri: &str) -> Creation {
        NewCreation::new(CreationKind::Plant, "Lavender", image_uri)
            .into_creation(id.into(), Utc::now())
    }

    fn seed(legacy: &MemBackend, creations: &[Creation]) {
        legacy
            .set_item(CREATIONS_KEY, &serde_json::to_string(creations).unwrap())
            .unwrap();
    }

    #[test]
    fn moves_valid_creations_and_credential() {
        let legacy = Rc::new(MemBackend::new());
        seed(
            &legacy,
            &[
                creation("1", "https://a/1.png"),
                creation("2", "data:text/html;base64,PGh0bWw+"),
                creation("3", "data:image/png;base64,iVBOR"),
            ],
        );
        legacy.set_item(CREDENTIAL_KEY, "sk-legacy").unwrap();

        let target = StructuredStore::in_memory(Environment::Browser);
        let controller = MigrationController::new(Rc::clone(&legacy));
        let report = controller.ensure_migrated(&target).clone();

        assert_eq!(report.migrated, 2);
        assert_eq!(report.skipped, 1);
        assert!(report.credential_migrated);
        assert_eq!(target.list().unwrap().len(), 2);
        assert_eq!(
            target.get_setting(CREDENTIAL_SETTING).unwrap(),
            Some("sk-legacy".to_string())
        );
        assert!(legacy.is_empty());
    }

    #[test]
    fn runs_at_most_once() {
        let legacy = Rc::new(MemBackend::new());
        seed(&legacy, &[creation("1", "https://a/1.png")]);

        let target = StructuredStore::in_memory(Environment::Browser);
        let controller = MigrationController::new(Rc::clone(&legacy));
        controller.ensure_migrated(&target);
        assert!(controller.has_run());

        // Data reappearing under the legacy key is not picked up again.
        seed(&legacy, &[creation("2", "https://a/2.png")]);
        let second = controller.ensure_migrated(&target);

        assert_eq!(second.migrated, 1);
        assert_eq!(target.list().unwrap().len(), 1);
        assert!(legacy.contains_key(CREATIONS_KEY));
    }

    #[test]
    fn unparsable_blob_is_deleted() {
        let legacy = Rc::new(MemBackend::new());
        legacy.set_item(CREATIONS_KEY, "[{truncated").unwrap();

        let target = StructuredStore::in_memory(Environment::Browser);
        let report = MigrationController::new(Rc::clone(&legacy))
            .ensure_migrated(&target)
            .clone();

        assert!(report.found_legacy_creations);
        assert_eq!(report.migrated, 0);
        assert!(report.error.is_none());
        assert!(!legacy.contains_key(CREATIONS_KEY));
    }

    #[test]
    fn nothing_to_migrate_is_a_noop() {
        let target = StructuredStore::in_memory(Environment::Browser);
        let controller = MigrationController::new(MemBackend::new());
        let report = controller.ensure_migrated(&target);
        assert!(report.is_noop());
    }

    #[test]
    fn unexpected_failure_still_clears_legacy_keys() {
        let legacy = Rc::new(MemBackend::new());
        seed(&legacy, &[creation("1", "https://a/1.png")]);
        legacy.set_item(CREDENTIAL_KEY, "sk-legacy").unwrap();

        // The target cannot open outside the browser environment.
        let target = StructuredStore::in_memory(Environment::Native);
        let report = MigrationController::new(Rc::clone(&legacy))
            .ensure_migrated(&target)
            .clone();

        assert_eq!(report.migrated, 0);
        assert_eq!(report.skipped, 1);
        assert!(report.error.is_some());
        assert!(legacy.is_empty());
    }
}

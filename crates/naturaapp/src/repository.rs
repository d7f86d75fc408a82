//! # Creation Repository
//!
//! The public face of the storage core. Every read or write of creations and
//! of the API credential goes through [`CreationRepository`], which:
//!
//! - runs the legacy migration once before the first operation, when a
//!   [`MigrationController`] is attached (browser environment only),
//! - validates creations on save and filters them on every read,
//! - delegates the actual I/O to the injected [`CreationStore`].
//!
//! Ordering of [`CreationRepository::list`] is unspecified; presentation code
//! sorts by `createdAt` itself.

use crate::error::{Result, ValidationError};
use crate::migration::{MigrationController, MigrationReport};
use crate::model::{Creation, NewCreation};
use crate::store::{CreationStore, CREDENTIAL_SETTING};
use crate::validate::{check_image_reference, filter_valid_creations, is_valid_image_reference};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct CreationRepository<S: CreationStore> {
    store: S,
    migration: Option<MigrationController>,
}

impl<S: CreationStore> CreationRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            migration: None,
        }
    }

    /// Repository that migrates legacy data into `store` on first use.
    pub fn with_migration(store: S, migration: MigrationController) -> Self {
        Self {
            store,
            migration: Some(migration),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Outcome of this process's migration, once it has run.
    pub fn migration_report(&self) -> Option<&MigrationReport> {
        self.migration.as_ref().and_then(|m| m.report())
    }

    fn ensure_migrated(&self) {
        if let Some(migration) = &self.migration {
            migration.ensure_migrated(&self.store);
        }
    }

    /// Validate, assign identity and timestamp, and persist.
    pub fn save(&self, new: NewCreation) -> Result<Creation> {
        check_image_reference(&new.image_uri)?;
        if new.common_name.trim().is_empty() {
            return Err(ValidationError::MissingCommonName.into());
        }

        self.ensure_migrated();
        let creation = new.into_creation(new_id(), Utc::now());
        self.store.insert(&creation)?;
        debug!(id = %creation.id, kind = %creation.kind, "creation saved");
        Ok(creation)
    }

    /// Every stored creation that passes validation.
    pub fn list(&self) -> Result<Vec<Creation>> {
        self.ensure_migrated();
        let stored = self.store.list()?;
        Ok(filter_valid_creations(stored))
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.ensure_migrated();
        self.store.delete(id)
    }

    /// The stored API credential. An empty stored value reads as absent.
    pub fn credential(&self) -> Result<Option<String>> {
        self.ensure_migrated();
        let value = self.store.get_setting(CREDENTIAL_SETTING)?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    pub fn save_credential(&self, value: &str) -> Result<()> {
        self.ensure_migrated();
        self.store.put_setting(CREDENTIAL_SETTING, value)
    }

    /// Delete every stored creation, valid or not, one at a time. Not atomic:
    /// a failure part-way leaves the remaining records in place.
    pub fn clear(&self) -> Result<usize> {
        self.ensure_migrated();
        let ids: Vec<String> = self.store.list()?.into_iter().map(|c| c.id).collect();
        for id in &ids {
            self.store.delete(id)?;
        }
        Ok(ids.len())
    }

    /// Remove persisted records that fail validation. Returns how many were
    /// removed; running it on a clean store removes nothing.
    pub fn compact(&self) -> Result<usize> {
        self.ensure_migrated();
        let invalid: Vec<String> = self
            .store
            .list()?
            .into_iter()
            .filter(|c| !is_valid_image_reference(&c.image_uri))
            .map(|c| c.id)
            .collect();

        for id in &invalid {
            self.store.delete(id)?;
        }
        if !invalid.is_empty() {
            info!(removed = invalid.len(), "compacted invalid creations");
        }
        Ok(invalid.len())
    }
}

/// Time-ordered unique id.
fn new_id() -> String {
    Uuid::now_v7().to_string()
}

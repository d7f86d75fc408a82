//! # Storage Layer
//!
//! This module defines the storage abstraction for Natura. The [`CreationStore`]
//! trait lets the repository work with either backend without knowing which
//! one is active.
//!
//! ## Backends
//!
//! - [`structured::StructuredStore`]: the primary backend in the browser
//!   environment. A SQLite database with a `creations` collection keyed by
//!   `id` (secondary index on `createdAt`) and a `settings` collection.
//! - [`flat::FlatStore`]: the native-mobile backend. The whole creations
//!   collection is one JSON array under a single key of a
//!   [`backend::KeyValueBackend`]; each setting is its own key.
//!
//! [`Backend`] is the closed pair of the two, chosen once at process start
//! from the [`Environment`] and injected into the repository.
//!
//! ## Key-Value Backends
//!
//! - [`fs_backend::FsBackend`]: one file per key, atomic writes.
//! - [`mem_backend::MemBackend`]: in-memory, for tests.
//!
//! ## Division of Labour
//!
//! Adapters return what is persisted, unfiltered. Validation and migration
//! happen one layer up, in the repository.
//!
//! ## Storage Layout
//!
//! ```text
//! <data>/
//! ├── NaturaDB.sqlite          # Structured Store (browser)
//! ├── local-storage/           # legacy browser keys, consulted once by the migration
//! │   ├── natura_creations
//! │   └── natura_api_key
//! └── async-storage/           # Flat Store (native)
//!     ├── natura_creations
//!     └── natura_api_key
//! ```

use crate::environment::Environment;
use crate::error::Result;
use crate::model::Creation;
use std::fmt;
use std::path::Path;

pub mod backend;
pub mod flat;
pub mod fs_backend;
pub mod mem_backend;
pub mod structured;

use flat::FlatStore;
use fs_backend::FsBackend;
use structured::StructuredStore;

/// Flat-store key holding the serialized creations array.
pub const CREATIONS_KEY: &str = "natura_creations";
/// Flat-store key holding the raw credential string.
pub const CREDENTIAL_KEY: &str = "natura_api_key";
/// Logical settings key of the API credential.
pub const CREDENTIAL_SETTING: &str = "apiKey";

pub const FLAT_DIR: &str = "async-storage";
pub const LEGACY_DIR: &str = "local-storage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Structured,
    Flat,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Structured => f.write_str("structured"),
            StoreKind::Flat => f.write_str("flat"),
        }
    }
}

/// Abstract interface for creation storage.
///
/// All methods take `&self`: backends manage their own connection or file
/// access. Every failure of the underlying engine is returned as an error;
/// adapters do not retry.
pub trait CreationStore {
    fn kind(&self) -> StoreKind;

    /// Persist a new creation. Ids are never reused by the repository.
    fn insert(&self, creation: &Creation) -> Result<()>;

    /// Every stored creation, in no particular order, unfiltered.
    fn list(&self) -> Result<Vec<Creation>>;

    /// Remove a creation. Removing an absent id succeeds: the post-condition
    /// "id is absent" already holds.
    fn delete(&self, id: &str) -> Result<()>;

    fn get_setting(&self, key: &str) -> Result<Option<String>>;

    /// Store a setting, overwriting any previous value.
    fn put_setting(&self, key: &str, value: &str) -> Result<()>;
}

/// The active backend for this process.
pub enum Backend {
    Structured(StructuredStore),
    Flat(FlatStore<FsBackend>),
}

impl Backend {
    /// Pick the backend for `environment`, rooted at `data_dir`.
    pub fn for_environment(environment: Environment, data_dir: &Path) -> Self {
        match environment {
            Environment::Browser => Backend::Structured(StructuredStore::new(data_dir, environment)),
            Environment::Native => {
                Backend::Flat(FlatStore::new(FsBackend::new(data_dir.join(FLAT_DIR))))
            }
        }
    }

    fn inner(&self) -> &dyn CreationStore {
        match self {
            Backend::Structured(store) => store,
            Backend::Flat(store) => store,
        }
    }
}

impl CreationStore for Backend {
    fn kind(&self) -> StoreKind {
        self.inner().kind()
    }

    fn insert(&self, creation: &Creation) -> Result<()> {
        self.inner().insert(creation)
    }

    fn list(&self) -> Result<Vec<Creation>> {
        self.inner().list()
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner().delete(id)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.inner().get_setting(key)
    }

    fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        self.inner().put_setting(key, value)
    }
}

//! # Process Start-Up
//!
//! [`initialize`] wires one process's storage stack, in this order:
//!
//! 1. **Data directory**: the explicit override, else `NATURA_DATA_DIR`, else
//!    the OS data directory from the `directories` crate.
//! 2. **Configuration**: [`NaturaConfig::load`] from the environment and
//!    `<data>/natura.toml`.
//! 3. **Environment**: the explicit override, else the configured setting,
//!    where `auto` follows the compilation target.
//! 4. **Backend**: Structured Store in the browser environment, with a
//!    migration controller over the legacy keys in `<data>/local-storage`;
//!    Flat Store over `<data>/async-storage` in the native environment.
//!
//! Nothing is opened or migrated here. The database connection and the
//! migration both wait for the first repository operation.

use crate::api::NaturaApi;
use crate::commands::NaturaPaths;
use crate::config::NaturaConfig;
use crate::environment::{Environment, EnvironmentSetting};
use crate::error::{NaturaError, Result};
use crate::migration::MigrationController;
use crate::repository::CreationRepository;
use crate::store::fs_backend::FsBackend;
use crate::store::{Backend, LEGACY_DIR};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DATA_DIR_ENV: &str = "NATURA_DATA_DIR";

pub struct NaturaContext {
    pub api: NaturaApi<Backend>,
    pub environment: Environment,
    pub config: NaturaConfig,
}

/// Where persisted state lives when no override is given.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "natura", "natura")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| NaturaError::Config("could not determine a data directory".to_string()))
}

/// Build the storage stack for this process.
///
/// `cwd` is the fallback export directory. `data_override` and
/// `environment_override` come from command-line flags and beat both the
/// environment variables and the config file.
pub fn initialize(
    cwd: &Path,
    data_override: Option<PathBuf>,
    environment_override: Option<EnvironmentSetting>,
) -> Result<NaturaContext> {
    let data_dir = match data_override {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    let config = NaturaConfig::load(&data_dir)?;
    let environment = environment_override
        .unwrap_or(config.environment)
        .resolve();
    debug!(data_dir = %data_dir.display(), %environment, "initializing storage");

    let backend = Backend::for_environment(environment, &data_dir);
    let repo = match environment {
        Environment::Browser => {
            let legacy = FsBackend::new(data_dir.join(LEGACY_DIR));
            CreationRepository::with_migration(backend, MigrationController::new(legacy))
        }
        Environment::Native => CreationRepository::new(backend),
    };

    let paths = NaturaPaths {
        export: config.export_dir_or(cwd),
        data: data_dir,
    };
    let api = NaturaApi::new(repo, environment, paths);

    Ok(NaturaContext {
        api,
        environment,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CreationStore, StoreKind};

    #[test]
    fn explicit_environment_selects_backend() {
        let dir = tempfile::tempdir().unwrap();

        let browser = initialize(
            dir.path(),
            Some(dir.path().to_path_buf()),
            Some(EnvironmentSetting::Browser),
        )
        .unwrap();
        assert_eq!(browser.environment, Environment::Browser);
        assert_eq!(
            browser.api.repository().store().kind(),
            StoreKind::Structured
        );

        let native = initialize(
            dir.path(),
            Some(dir.path().to_path_buf()),
            Some(EnvironmentSetting::Native),
        )
        .unwrap();
        assert_eq!(native.api.repository().store().kind(), StoreKind::Flat);
    }

    #[test]
    fn export_dir_defaults_to_cwd() {
        let data = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        let ctx = initialize(
            cwd.path(),
            Some(data.path().to_path_buf()),
            Some(EnvironmentSetting::Native),
        )
        .unwrap();
        assert_eq!(ctx.api.paths().export, cwd.path());
        assert_eq!(ctx.api.paths().data, data.path());
    }

    #[test]
    fn nothing_is_created_until_first_use() {
        let dir = tempfile::tempdir().unwrap();
        initialize(
            dir.path(),
            Some(dir.path().to_path_buf()),
            Some(EnvironmentSetting::Browser),
        )
        .unwrap();
        assert!(!dir.path().join("NaturaDB.sqlite").exists());
    }
}

//! # Configuration
//!
//! Natura configuration is loaded with [`confique`] from layered sources.
//!
//! ## Precedence
//!
//! 1. **Environment variables**: `NATURA_ENVIRONMENT`, `NATURA_EXPORT_DIR`.
//! 2. **Config file**: `natura.toml` in the data directory.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! Command-line flags are applied on top by the caller.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `environment` | `auto` | `auto`, `browser` or `native`; selects the storage backend |
//! | `export_dir` | current directory | Where `natura export` writes backup files |

use crate::environment::EnvironmentSetting;
use crate::error::{NaturaError, Result};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "natura.toml";

/// Configuration for natura, stored in `natura.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NaturaConfig {
    /// Host environment: "auto", "browser" or "native".
    #[config(env = "NATURA_ENVIRONMENT", default = "auto")]
    pub environment: EnvironmentSetting,

    /// Directory for backup files. When absent, the current directory.
    #[config(env = "NATURA_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,
}

impl Default for NaturaConfig {
    fn default() -> Self {
        Self {
            environment: EnvironmentSetting::Auto,
            export_dir: None,
        }
    }
}

impl NaturaConfig {
    /// Load from the environment and `<data_dir>/natura.toml`. A missing file
    /// is not an error; a malformed one is.
    pub fn load(data_dir: &Path) -> Result<Self> {
        NaturaConfig::builder()
            .env()
            .file(data_dir.join(CONFIG_FILE))
            .load()
            .map_err(|e| NaturaError::Config(e.to_string()))
    }

    /// Export directory, falling back to `cwd`.
    pub fn export_dir_or(&self, cwd: &Path) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| cwd.to_path_buf())
    }
}

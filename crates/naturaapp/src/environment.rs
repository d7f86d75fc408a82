//! # Runtime Environment
//!
//! The storage backend is chosen once per process from the host environment:
//!
//! - [`Environment::Browser`]: a host with the structured on-device database.
//!   Creations live in the Structured Store, and legacy key-value data is
//!   migrated into it on first use.
//! - [`Environment::Native`]: the native-mobile host, where only flat
//!   key-value persistence exists.
//!
//! The choice is re-derived at every start and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Browser,
    Native,
}

impl Environment {
    /// Environment implied by the compilation target.
    pub fn detect() -> Self {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            Environment::Native
        } else {
            Environment::Browser
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Browser => f.write_str("browser"),
            Environment::Native => f.write_str("native"),
        }
    }
}

/// Configured environment, where `auto` defers to [`Environment::detect`].
///
/// Deserialized through its string form so config files, environment
/// variables and CLI flags all accept the same case-insensitive spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum EnvironmentSetting {
    #[default]
    Auto,
    Browser,
    Native,
}

impl EnvironmentSetting {
    pub fn resolve(self) -> Environment {
        match self {
            EnvironmentSetting::Auto => Environment::detect(),
            EnvironmentSetting::Browser => Environment::Browser,
            EnvironmentSetting::Native => Environment::Native,
        }
    }
}

impl FromStr for EnvironmentSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(EnvironmentSetting::Auto),
            "browser" => Ok(EnvironmentSetting::Browser),
            "native" => Ok(EnvironmentSetting::Native),
            other => Err(format!(
                "unknown environment '{}' (expected auto, browser or native)",
                other
            )),
        }
    }
}

impl TryFrom<String> for EnvironmentSetting {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for EnvironmentSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentSetting::Auto => f.write_str("auto"),
            EnvironmentSetting::Browser => f.write_str("browser"),
            EnvironmentSetting::Native => f.write_str("native"),
        }
    }
}

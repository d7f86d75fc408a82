//! # Data Model
//!
//! A [`Creation`] is one persisted identify + illustrate result. Creations are
//! immutable once saved: the only mutations are save, delete, and bulk replace
//! through a backup import.
//!
//! The serialized form uses the camelCase field names shared by every backend
//! and by the backup document (`imageUri`, `commonName`, `createdAt`, ...).
//!
//! Text fields default to empty when absent so that historical records missing
//! a field still decode; the validator then decides whether they are kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of things Natura can illustrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreationKind {
    Plant,
    Animal,
    Insect,
}

impl CreationKind {
    pub const ALL: [CreationKind; 3] = [
        CreationKind::Plant,
        CreationKind::Animal,
        CreationKind::Insect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreationKind::Plant => "plant",
            CreationKind::Animal => "animal",
            CreationKind::Insect => "insect",
        }
    }
}

impl fmt::Display for CreationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plant" => Ok(CreationKind::Plant),
            "animal" => Ok(CreationKind::Animal),
            "insect" => Ok(CreationKind::Insect),
            other => Err(format!(
                "unknown creation type '{}' (expected plant, animal or insect)",
                other
            )),
        }
    }
}

/// A saved illustration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creation {
    pub id: String,
    #[serde(default)]
    pub image_uri: String,
    #[serde(default)]
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: CreationKind,
    pub created_at: DateTime<Utc>,
}

/// The caller-supplied part of a creation; `id` and `createdAt` are assigned
/// by the repository at save time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCreation {
    pub image_uri: String,
    pub common_name: String,
    pub scientific_name: String,
    pub description: String,
    pub kind: CreationKind,
}

impl NewCreation {
    pub fn new(
        kind: CreationKind,
        common_name: impl Into<String>,
        image_uri: impl Into<String>,
    ) -> Self {
        Self {
            image_uri: image_uri.into(),
            common_name: common_name.into(),
            scientific_name: String::new(),
            description: String::new(),
            kind,
        }
    }

    pub fn with_scientific_name(mut self, name: impl Into<String>) -> Self {
        self.scientific_name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Materialize into a full record.
    pub fn into_creation(self, id: String, created_at: DateTime<Utc>) -> Creation {
        Creation {
            id,
            image_uri: self.image_uri,
            common_name: self.common_name,
            scientific_name: self.scientific_name,
            description: self.description,
            kind: self.kind,
            created_at,
        }
    }
}

impl From<&Creation> for NewCreation {
    fn from(creation: &Creation) -> Self {
        Self {
            image_uri: creation.image_uri.clone(),
            common_name: creation.common_name.clone(),
            scientific_name: creation.scientific_name.clone(),
            description: creation.description.clone(),
            kind: creation.kind,
        }
    }
}

//! # Command Layer
//!
//! Each use case lives in its own submodule as plain functions over a
//! [`CreationRepository`](crate::repository::CreationRepository).
//!
//! Commands:
//! - Return a structured [`CmdResult`] with the creations they touched or
//!   listed, plus leveled messages.
//! - Never print, prompt or exit. The UI layer renders the result.
//!
//! ## Display Indexes
//!
//! Listings are sorted by `createdAt`, newest first, and numbered from 1.
//! [`DisplayCreation`] pairs a creation with that number so every client shows
//! the same index, and `view`/`delete` accept it in place of an id. Indexes
//! are always computed over the full collection, so a filtered listing keeps
//! the numbers of the unfiltered one.
//!
//! ## Command Modules
//!
//! - [`add`]: Save a new creation
//! - [`list`]: List creations, optionally by type
//! - [`view`]: Show selected creations
//! - [`delete`]: Remove creations
//! - [`export`]: Write a backup file
//! - [`import`]: Read a backup file
//! - [`doctor`]: Report the migration and compact invalid records
//! - [`credential`]: Read or store the API key
//! - [`status`]: Summarize the collection and the active backend
//! - [`helpers`]: Indexing and selector resolution

use crate::environment::Environment;
use crate::migration::MigrationReport;
use crate::model::{Creation, CreationKind};
use crate::store::StoreKind;
use std::path::PathBuf;

pub mod add;
pub mod credential;
pub mod delete;
pub mod doctor;
pub mod export;
pub mod helpers;
pub mod import;
pub mod list;
pub mod status;
pub mod view;

#[derive(Debug, Clone)]
pub struct NaturaPaths {
    /// Root of all persisted state.
    pub data: PathBuf,
    /// Where backup files are written.
    pub export: PathBuf,
}

/// A creation with its 1-based position in the newest-first listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCreation {
    pub index: usize,
    pub creation: Creation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Collection summary produced by `status`.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub environment: Environment,
    pub backend: StoreKind,
    pub data_dir: PathBuf,
    pub total: usize,
    pub by_kind: Vec<(CreationKind, usize)>,
    pub credential_set: bool,
    /// This process's migration, when one is attached.
    pub migration: Option<MigrationReport>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected: Vec<DisplayCreation>,
    pub listed: Vec<DisplayCreation>,
    pub paths: Vec<PathBuf>,
    pub status: Option<StatusReport>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected(mut self, creations: Vec<DisplayCreation>) -> Self {
        self.affected = creations;
        self
    }

    pub fn with_listed(mut self, creations: Vec<DisplayCreation>) -> Self {
        self.listed = creations;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }
}

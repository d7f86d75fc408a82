//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for UI
//! clients. It parses selectors, dispatches to `commands::*`, and returns
//! `Result<CmdResult>`. No business logic and no I/O happen here.
//!
//! `NaturaApi<S: CreationStore>` is generic over the storage backend:
//! - Production: `NaturaApi<Backend>`
//! - Testing: `NaturaApi<FlatStore<MemBackend>>` or an in-memory structured store

use crate::backup::ImageFetcher;
use crate::commands;
use crate::environment::Environment;
use crate::error::Result;
use crate::model::NewCreation;
use crate::repository::CreationRepository;
use crate::service::{self, AnalysisInput, Illustrator, SpeciesAnalyzer};
use crate::store::CreationStore;
use std::path::Path;

pub struct NaturaApi<S: CreationStore> {
    repo: CreationRepository<S>,
    environment: Environment,
    paths: commands::NaturaPaths,
}

impl<S: CreationStore> NaturaApi<S> {
    pub fn new(
        repo: CreationRepository<S>,
        environment: Environment,
        paths: commands::NaturaPaths,
    ) -> Self {
        Self {
            repo,
            environment,
            paths,
        }
    }

    pub fn add_creation(&self, new: NewCreation) -> Result<commands::CmdResult> {
        commands::add::run(&self.repo, new)
    }

    /// Identify and illustrate through external collaborators, then save.
    pub fn identify_creation<A, I>(
        &self,
        analyzer: &A,
        illustrator: &I,
        input: &AnalysisInput,
    ) -> Result<commands::CmdResult>
    where
        A: SpeciesAnalyzer + ?Sized,
        I: Illustrator + ?Sized,
    {
        let created = service::create_creation(&self.repo, analyzer, illustrator, input)?;
        let affected = commands::helpers::indexed_creations(&self.repo)?
            .into_iter()
            .filter(|d| d.creation.id == created.id)
            .collect();
        Ok(commands::CmdResult::default().with_affected(affected))
    }

    pub fn list_creations(&self, filter: &CreationFilter) -> Result<commands::CmdResult> {
        commands::list::run(&self.repo, filter)
    }

    pub fn view_creations<I: AsRef<str>>(&self, selectors: &[I]) -> Result<commands::CmdResult> {
        let selectors = commands::helpers::parse_selectors(selectors)?;
        commands::view::run(&self.repo, &selectors)
    }

    pub fn delete_creations<I: AsRef<str>>(
        &self,
        selectors: &[I],
    ) -> Result<commands::CmdResult> {
        let selectors = commands::helpers::parse_selectors(selectors)?;
        commands::delete::run(&self.repo, &selectors)
    }

    /// Write a backup into the configured export directory.
    pub fn export_backup<F: ImageFetcher + ?Sized>(
        &self,
        fetcher: &F,
    ) -> Result<commands::CmdResult> {
        commands::export::run(&self.repo, fetcher, &self.paths.export)
    }

    pub fn import_backup(&self, path: &Path, replace_existing: bool) -> Result<commands::CmdResult> {
        commands::import::run(&self.repo, path, replace_existing)
    }

    pub fn doctor(&self) -> Result<commands::CmdResult> {
        commands::doctor::run(&self.repo)
    }

    pub fn get_credential(&self, reveal: bool) -> Result<commands::CmdResult> {
        commands::credential::get(&self.repo, reveal)
    }

    pub fn set_credential(&self, value: &str) -> Result<commands::CmdResult> {
        commands::credential::set(&self.repo, value)
    }

    pub fn status(&self) -> Result<commands::CmdResult> {
        commands::status::run(&self.repo, self.environment, &self.paths)
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn paths(&self) -> &commands::NaturaPaths {
        &self.paths
    }

    pub fn repository(&self) -> &CreationRepository<S> {
        &self.repo
    }
}

pub use commands::list::CreationFilter;
pub use commands::{CmdMessage, CmdResult, DisplayCreation, MessageLevel, NaturaPaths, StatusReport};

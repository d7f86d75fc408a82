//! # Natura Storage Core
//!
//! Natura keeps a personal collection of species illustrations ("creations")
//! on the device. This crate is the UI-agnostic core behind it: local
//! persistence, validation of what gets persisted, a one-time migration off
//! the legacy key-value storage, and a portable JSON backup format.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, parses selectors              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Use cases returning structured CmdResult values          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (repository.rs) + Backup Codec (backup.rs)      │
//! │  - Validate on save, filter on read, migrate on first use   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - CreationStore trait: Structured (SQLite) or Flat (KV)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions
//!
//! Nothing in this crate writes to stdout/stderr or exits the process.
//! Diagnostics go through `tracing`; installing a subscriber is up to the
//! client.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`commands`]: One module per use case
//! - [`repository`]: Validation, migration trigger, store delegation
//! - [`backup`]: Export/import of the JSON backup document
//! - [`migration`]: One-time move off the legacy browser storage
//! - [`store`]: Backend adapters and key-value backends
//! - [`validate`]: Image reference rules
//! - [`service`]: Identification/illustration collaborator seams
//! - [`init`]: Start-up wiring
//! - [`config`], [`environment`], [`model`], [`error`]

pub mod api;
pub mod backup;
pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod init;
pub mod migration;
pub mod model;
pub mod repository;
pub mod service;
pub mod store;
pub mod validate;

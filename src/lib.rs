//! cdeploy - content deployment between live stores
//!
//! This crate provides the core functionality for the `cdeploy` CLI tool:
//! exporting live records as dependency-aware YAML dumps, importing them
//! into another store in dependency order, and diffing the two sides.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Live-side data types (Entity, EntityHandle, type and field definitions)
//! - [`storage`] - Live store traits and the SQLite implementation
//! - [`dump`] - Dumps, dependency names, dump files and blobs
//! - [`deploy`] - Export, import, diff and sync status
//! - [`config`] - Settings file and path resolution
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod deploy;
pub mod dump;
pub mod error;
pub mod model;
pub mod storage;

pub use error::{Error, Result};

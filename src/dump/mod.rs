//! Dumps: portable, dependency-aware snapshots of live records.
//!
//! # Overview
//!
//! A [`Dump`] captures one record's identity, its serialized field values,
//! the dependency names it references and, for binary-carrying records, a
//! [`Blob`]. Dumps live in a [`DumpStorage`] directory as one YAML file per
//! dependency name.
//!
//! # Flow
//!
//! - [`Dumper`] turns a live record into a dump
//! - [`DumpStorage`] writes and reads dump files and blob copies
//! - [`DumpRestorer`] turns a dump's fields back into importable values

pub mod blob;
pub mod builder;
pub mod dumper;
pub mod file;
pub mod hash;
pub mod model;
pub mod name;
pub mod restorer;
pub mod storage;

pub use blob::Blob;
pub use builder::DumpBuilder;
pub use dumper::Dumper;
pub use model::{Dependencies, Dump, DumpDocument, FieldValues};
pub use name::Dependency;
pub use restorer::{DependencyResolver, DumpRestorer};
pub use storage::DumpStorage;

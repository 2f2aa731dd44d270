//! Data models for the live store.
//!
//! This module contains the live-side domain models:
//! - Entity and EntityHandle
//! - EntityTypeDefinition
//! - FieldDefinition
//! - FieldTypeDefinition

pub mod entity;
pub mod schema;

pub use entity::{Entity, EntityHandle, FieldItem, FieldItems};
pub use schema::{
    EntityGroup, EntityKeys, EntityTypeDefinition, FieldDefinition, FieldTypeDefinition,
};

//! Dependency names.
//!
//! A dependency name is the address of a unit of content that can be
//! referenced across stores:
//!
//! - content records: `entity_type:bundle:uuid` (e.g. `node:article:5f0c…`)
//! - configuration objects: `config:config_name` (e.g. `config:taxonomy.vocabulary.tags`)
//!
//! On disk the `:` separator is swapped for `.` so names are safe to use as
//! file basenames.

use std::fmt;

/// Entity type component used for configuration dependencies.
pub const CONFIG_TYPE: &str = "config";

/// Dependency key for content records.
pub const CONTENT_KEY: &str = "content";

/// Dependency key for configuration objects.
pub const CONFIG_KEY: &str = "config";

/// Separator between components of a dependency name.
const SEPARATOR: char = ':';

/// Separator used in file basenames.
const FILE_SEPARATOR: char = '.';

/// Components of a parsed dependency name.
///
/// Trailing components that are missing from the name are `None` rather than
/// an error, so coarse names such as `node` or `node:article` (used by export
/// settings) parse as well as fully qualified ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency<'a> {
    /// Entity type ID, or [`CONFIG_TYPE`].
    pub entity_type: &'a str,
    /// Bundle, or the config name for config dependencies.
    pub bundle: Option<&'a str>,
    /// UUID of a content record.
    pub uuid: Option<&'a str>,
}

impl<'a> Dependency<'a> {
    /// Parse a dependency name into its components.
    ///
    /// Splits on at most two separators, so the last component keeps any
    /// further `:` characters and [`fmt::Display`] reproduces the input.
    #[must_use]
    pub fn parse(name: &'a str) -> Self {
        let mut tokens = name.splitn(3, SEPARATOR);
        Self {
            entity_type: tokens.next().unwrap_or_default(),
            bundle: tokens.next(),
            uuid: tokens.next(),
        }
    }

    /// Whether this names a configuration object.
    #[must_use]
    pub fn is_config(&self) -> bool {
        self.entity_type == CONFIG_TYPE
    }

    /// The config name, if this is a configuration dependency.
    #[must_use]
    pub fn config_name(&self) -> Option<&'a str> {
        if self.is_config() { self.bundle } else { None }
    }
}

impl fmt::Display for Dependency<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity_type)?;
        if let Some(bundle) = self.bundle {
            write!(f, "{SEPARATOR}{bundle}")?;
            if let Some(uuid) = self.uuid {
                write!(f, "{SEPARATOR}{uuid}")?;
            }
        }
        Ok(())
    }
}

/// Format a content dependency name.
#[must_use]
pub fn format(entity_type: &str, bundle: &str, uuid: &str) -> String {
    format!("{entity_type}{SEPARATOR}{bundle}{SEPARATOR}{uuid}")
}

/// Format a configuration dependency name.
#[must_use]
pub fn format_config(config_name: &str) -> String {
    format!("{CONFIG_TYPE}{SEPARATOR}{config_name}")
}

/// File basename for a dependency name.
///
/// Reversed by [`from_basename`] as long as the entity type, bundle and uuid
/// of a content name hold no `.`. Config names keep the dots of their config
/// name.
#[must_use]
pub fn to_basename(name: &str) -> String {
    name.replace(SEPARATOR, &FILE_SEPARATOR.to_string())
}

/// Dependency name for a file basename.
#[must_use]
pub fn from_basename(basename: &str) -> String {
    let config_prefix = format!("{CONFIG_TYPE}{FILE_SEPARATOR}");
    match basename.strip_prefix(&config_prefix) {
        Some(config_name) => format_config(config_name),
        None => basename.replace(FILE_SEPARATOR, &SEPARATOR.to_string()),
    }
}

//! Binary attachments carried by dumps.

use serde::{Deserialize, Serialize};

/// A binary attachment associated with a dump.
///
/// The `hash` is the content hash of the file at `uri` when the dump was
/// produced. The `extension` (including the leading dot) is kept so the
/// staged copy gets a recognizable file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    uri: String,
    hash: String,
    extension: Option<String>,
}

impl Blob {
    /// Create a blob from its raw parts, as read back from a dump.
    #[must_use]
    pub fn new(uri: String, hash: String, extension: Option<String>) -> Self {
        Self {
            uri,
            hash,
            extension,
        }
    }

    /// Create a blob from a uri and hash, deriving the extension from the uri.
    #[must_use]
    pub fn from_uri(uri: impl Into<String>, hash: impl Into<String>) -> Self {
        let uri = uri.into();
        let extension = extension_of(&uri).map(str::to_string);
        Self {
            uri,
            hash: hash.into(),
            extension,
        }
    }

    /// Source location of the binary.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Content hash of the binary.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Extension with leading dot, if the uri has one.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

/// Extension (with leading dot) of the uri's trailing path segment.
///
/// Returns `None` when the segment has no dot or ends with one.
#[must_use]
pub fn extension_of(uri: &str) -> Option<&str> {
    let segment = uri.rsplit('/').next().unwrap_or(uri);
    let dot = segment.rfind('.')?;
    if dot + 1 == segment.len() {
        return None;
    }
    Some(&segment[dot..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("public://images/photo.png"), Some(".png"));
        assert_eq!(extension_of("files/archive.tar.gz"), Some(".gz"));
        assert_eq!(extension_of("files/README"), None);
        assert_eq!(extension_of("files/trailing."), None);
        assert_eq!(extension_of("dir.d/noext"), None);
    }

    #[test]
    fn test_from_uri_derives_extension() {
        let blob = Blob::from_uri("files/logo.svg", "abc");
        assert_eq!(blob.uri(), "files/logo.svg");
        assert_eq!(blob.hash(), "abc");
        assert_eq!(blob.extension(), Some(".svg"));
    }

    #[test]
    fn test_serialized_keys() {
        let blob = Blob::from_uri("files/data", "abc");
        let yaml = serde_yaml::to_string(&blob).unwrap();
        assert!(yaml.contains("uri: files/data"));
        assert!(yaml.contains("hash: abc"));
        assert!(yaml.contains("extension: null"));
    }
}

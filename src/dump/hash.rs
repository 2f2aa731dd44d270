//! Content hashing for blobs.
//!
//! Blobs are identified by a SHA256 hash of the file they were copied from.
//! The hash lets a staged blob be checked against the live file without
//! comparing bytes.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::deploy::{DeployError, DeployResult};

/// Compute the SHA256 hash of a byte slice as lowercase hex.
#[must_use]
pub fn bytes_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA256 hash of a file's contents.
///
/// The whole file is read into memory.
///
/// # Errors
///
/// Returns [`DeployError::FileSystem`] if the file cannot be read.
pub fn file_hash(path: &Path) -> DeployResult<String> {
    let bytes = fs::read(path).map_err(|e| {
        DeployError::file_system(format!("Cannot hash file {}", path.display()), e)
    })?;
    Ok(bytes_hash(&bytes))
}

/// Check if content has changed relative to a recorded hash.
///
/// Returns `true` if there is no recorded hash or the hashes differ.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bytes_hash_deterministic() {
        let hash1 = bytes_hash(b"hello");
        let hash2 = bytes_hash(b"hello");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA256 produces 64 hex chars
        assert_ne!(hash1, bytes_hash(b"hello!"));
    }

    #[test]
    fn test_file_hash_matches_bytes_hash() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logo.png");
        fs::write(&path, b"PNG").unwrap();

        assert_eq!(file_hash(&path).unwrap(), bytes_hash(b"PNG"));
    }

    #[test]
    fn test_file_hash_missing_file() {
        let result = file_hash(Path::new("/nonexistent/logo.png"));
        assert!(matches!(result, Err(DeployError::FileSystem { .. })));
    }

    #[test]
    fn test_has_changed() {
        assert!(has_changed("abc123", None));
        assert!(has_changed("abc123", Some("xyz789")));
        assert!(!has_changed("abc123", Some("abc123")));
    }
}

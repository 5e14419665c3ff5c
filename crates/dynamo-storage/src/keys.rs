//! Shared key generation for storage backends.
//!
//! Key format: `{prefix}/{10 random alphanumerics}`, e.g. `raw/a8Kz01QmPx`.

use crate::{StorageError, StorageResult};
use rand::distr::{Alphanumeric, SampleString};

const KEY_SUFFIX_LEN: usize = 10;

/// Generate a fresh storage key under `prefix`.
///
/// Keys are random, not derived from the uploaded filename, so two uploads
/// of the same file never collide in practice.
pub fn generate_storage_key(prefix: &str) -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::rng(), KEY_SUFFIX_LEN);
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        suffix
    } else {
        format!("{}/{}", prefix, suffix)
    }
}

/// Reject keys that could escape the bucket root or are otherwise unusable.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key is empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "key must not start with '/': {}",
            key
        )));
    }
    if key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
        return Err(StorageError::InvalidKey(format!(
            "key contains an empty or '..' segment: {}",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_shape() {
        let key = generate_storage_key("raw");
        let suffix = key.strip_prefix("raw/").expect("raw prefix");
        assert_eq!(suffix.len(), 10);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(generate_storage_key("raw"), generate_storage_key("raw"));
    }

    #[test]
    fn test_prefix_slashes_are_trimmed() {
        assert!(generate_storage_key("/raw/").starts_with("raw/"));
        assert_eq!(generate_storage_key("").len(), 10);
    }

    #[test]
    fn test_malformed_keys_are_rejected() {
        for key in ["", "/raw/abc", "raw/../etc", "raw//abc", "raw/"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }
}

//! Upload domain models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const BYTES_PER_MB: u64 = 1024 * 1024;
pub const DEFAULT_TYPE_PREFIX: &str = "video/";

/// Metadata describing one upload, built before any bytes are persisted.
///
/// Serialized field names are the public response contract of `POST /video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
    #[serde(rename = "file_type")]
    pub content_type: String,
    #[serde(rename = "file_size")]
    pub size_bytes: u64,
    #[serde(rename = "file_name")]
    pub storage_key: String,
    #[serde(rename = "file_url")]
    pub public_url: String,
}

/// Size and type rules every upload must satisfy.
///
/// Built once at startup and shared read-only by all requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePolicy {
    max_size_bytes: u64,
    max_size_mb: u64,
    allowed_types: BTreeSet<String>,
    allowed_types_display: String,
    type_prefix: String,
}

impl StoragePolicy {
    pub fn new<I, S>(max_size_bytes: u64, allowed_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed_types: BTreeSet<String> = allowed_types
            .into_iter()
            .map(|t| t.into().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let allowed_types_display = allowed_types
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");

        Self {
            max_size_bytes,
            max_size_mb: max_size_bytes / BYTES_PER_MB,
            allowed_types,
            allowed_types_display,
            type_prefix: DEFAULT_TYPE_PREFIX.to_string(),
        }
    }

    /// Policy whose limit is expressed in whole megabytes, as configured.
    pub fn from_mb<I, S>(max_size_mb: u64, allowed_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut policy = Self::new(max_size_mb.saturating_mul(BYTES_PER_MB), allowed_types);
        policy.max_size_mb = max_size_mb;
        policy
    }

    /// Override the media-category prefix stripped from content types.
    pub fn with_type_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.type_prefix = prefix.into().to_lowercase();
        self
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn max_size_mb(&self) -> u64 {
        self.max_size_mb
    }

    pub fn type_prefix(&self) -> &str {
        &self.type_prefix
    }

    pub fn allows(&self, media_type: &str) -> bool {
        self.allowed_types.contains(media_type)
    }

    pub fn allowed_types(&self) -> &BTreeSet<String> {
        &self.allowed_types
    }

    /// Comma-separated allowed types, sorted, for client-facing messages.
    pub fn allowed_types_display(&self) -> &str {
        &self.allowed_types_display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_normalizes_allowed_types() {
        let policy = StoragePolicy::new(10, [" MP4", "webm", ""]);
        assert!(policy.allows("mp4"));
        assert!(policy.allows("webm"));
        assert_eq!(policy.allowed_types().len(), 2);
        assert_eq!(policy.allowed_types_display(), "mp4,webm");
    }

    #[test]
    fn test_policy_from_mb_keeps_configured_megabytes() {
        let policy = StoragePolicy::from_mb(100, ["mp4"]);
        assert_eq!(policy.max_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(policy.max_size_mb(), 100);
    }

    #[test]
    fn test_policy_from_mb_saturates_instead_of_wrapping() {
        let policy = StoragePolicy::from_mb(u64::MAX, ["mp4"]);
        assert_eq!(policy.max_size_bytes(), u64::MAX);
        assert_eq!(policy.max_size_mb(), u64::MAX);
    }

    #[test]
    fn test_descriptor_serializes_response_field_names() {
        let descriptor = UploadDescriptor {
            content_type: "video/mp4".to_string(),
            size_bytes: 42,
            storage_key: "raw/abc".to_string(),
            public_url: "https://cdn.example.com/raw/abc".to_string(),
        };
        let json = serde_json::to_value(&descriptor).expect("serialize");
        assert_eq!(json["file_type"], "video/mp4");
        assert_eq!(json["file_size"], 42);
        assert_eq!(json["file_name"], "raw/abc");
        assert_eq!(json["file_url"], "https://cdn.example.com/raw/abc");
    }
}

//! Upload policy validation.
//!
//! Runs before any bytes reach a storage backend. Storage backends never
//! re-check policy, so every write path goes through [`validate`] first.

use crate::models::{StoragePolicy, UploadDescriptor};

/// Reasons an upload is rejected. Display text is the client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please upload file size less than {max_mb}MB")]
    FileTooLarge { size: u64, max: u64, max_mb: u64 },

    #[error("Please upload these file types: {allowed}")]
    UnsupportedType {
        content_type: String,
        allowed: String,
    },
}

/// Normalize MIME type by stripping parameters (e.g. "video/mp4; codecs=avc1" -> "video/mp4").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Media type left after removing the policy's category prefix.
///
/// Content types without the prefix are looked up as-is, so `image/png`
/// never matches an allowed `png` under a `video/` policy.
pub fn media_type<'a>(normalized: &'a str, policy: &StoragePolicy) -> &'a str {
    normalized
        .strip_prefix(policy.type_prefix())
        .unwrap_or(normalized)
}

/// Check a descriptor against the policy. Size is checked before type.
pub fn validate(
    descriptor: &UploadDescriptor,
    policy: &StoragePolicy,
) -> Result<(), ValidationError> {
    tracing::debug!(
        content_type = %descriptor.content_type,
        size_bytes = descriptor.size_bytes,
        key = %descriptor.storage_key,
        "Validating upload"
    );

    if descriptor.size_bytes > policy.max_size_bytes() {
        return Err(ValidationError::FileTooLarge {
            size: descriptor.size_bytes,
            max: policy.max_size_bytes(),
            max_mb: policy.max_size_mb(),
        });
    }

    let normalized = normalize_mime_type(&descriptor.content_type);
    if !policy.allows(media_type(&normalized, policy)) {
        return Err(ValidationError::UnsupportedType {
            content_type: descriptor.content_type.clone(),
            allowed: policy.allowed_types_display().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> StoragePolicy {
        StoragePolicy::new(10_000_000, ["mp4", "webm"])
    }

    fn descriptor(content_type: &str, size_bytes: u64) -> UploadDescriptor {
        UploadDescriptor {
            content_type: content_type.to_string(),
            size_bytes,
            storage_key: "raw/test".to_string(),
            public_url: "https://cdn.example.com/raw/test".to_string(),
        }
    }

    #[test]
    fn test_accepts_allowed_type_within_limit() {
        assert_eq!(validate(&descriptor("video/mp4", 5_000_000), &policy()), Ok(()));
        assert_eq!(validate(&descriptor("video/webm", 10_000_000), &policy()), Ok(()));
    }

    #[test]
    fn test_rejects_oversized_upload_regardless_of_type() {
        for content_type in ["video/mp4", "video/avi", "application/pdf"] {
            let result = validate(&descriptor(content_type, 20_000_000), &policy());
            assert!(
                matches!(result, Err(ValidationError::FileTooLarge { size: 20_000_000, .. })),
                "{content_type} should be rejected for size"
            );
        }
    }

    #[test]
    fn test_rejects_unsupported_type_within_limit() {
        let result = validate(&descriptor("video/avi", 1000), &policy());
        assert_eq!(
            result,
            Err(ValidationError::UnsupportedType {
                content_type: "video/avi".to_string(),
                allowed: "mp4,webm".to_string(),
            })
        );
    }

    #[test]
    fn test_type_without_category_prefix_is_not_stripped() {
        let result = validate(&descriptor("image/mp4", 1000), &policy());
        assert!(matches!(result, Err(ValidationError::UnsupportedType { .. })));
    }

    #[test]
    fn test_mime_parameters_and_case_are_ignored() {
        assert_eq!(
            validate(&descriptor("Video/MP4; codecs=\"avc1.42E01E\"", 1000), &policy()),
            Ok(())
        );
    }

    #[test]
    fn test_custom_type_prefix() {
        let policy = StoragePolicy::new(100, ["mpeg"]).with_type_prefix("audio/");
        assert_eq!(validate(&descriptor("audio/mpeg", 10), &policy), Ok(()));
        assert!(validate(&descriptor("video/mpeg", 10), &policy).is_err());
    }

    #[test]
    fn test_error_messages_match_client_contract() {
        let policy = StoragePolicy::from_mb(100, ["webm", "mp4"]);
        let too_large = validate(&descriptor("video/mp4", 200 * 1024 * 1024), &policy)
            .expect_err("too large");
        assert_eq!(too_large.to_string(), "Please upload file size less than 100MB");

        let bad_type = validate(&descriptor("video/avi", 1), &policy).expect_err("bad type");
        assert_eq!(bad_type.to_string(), "Please upload these file types: mp4,webm");
    }
}

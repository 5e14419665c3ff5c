use std::fmt::{Display, Formatter, Result as FmtResult};

/// Storage backend types
///
/// Defined in core because configuration, logging and the storage crate all
/// need to name a backend without depending on its implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Gcs,
    S3,
    Local,
    Null,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Gcs => write!(f, "gcs"),
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Null => write!(f, "null"),
        }
    }
}

/// Object store provider behind a cloud blob backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobProvider {
    Gcs {
        service_account_path: Option<String>,
    },
    S3 {
        region: Option<String>,
        /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, ...)
        endpoint: Option<String>,
    },
    /// Object store rooted at a local directory; `bucket` is the directory.
    Local,
}

impl BlobProvider {
    pub fn backend_type(&self) -> StorageBackend {
        match self {
            BlobProvider::Gcs { .. } => StorageBackend::Gcs,
            BlobProvider::S3 { .. } => StorageBackend::S3,
            BlobProvider::Local => StorageBackend::Local,
        }
    }
}

/// The single storage backend selected for the process.
///
/// Built from the `gcs`/`s3`/`local` toggles by `TryFrom<&Settings>`, which is
/// the only place the mutual-exclusion rules are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    CloudBlob {
        provider: BlobProvider,
        bucket: String,
    },
    NullStore,
}

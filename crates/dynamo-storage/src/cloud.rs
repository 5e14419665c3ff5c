use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult, UploadReader};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use dynamo_core::BlobProvider;
use http::{HeaderMap, HeaderValue};
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ClientOptions, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncReadExt;

pub const PUBLIC_CACHE_CONTROL: &str = "public, max-age=31536000";
pub const PRIVATE_CACHE_CONTROL: &str = "private, no-store";

/// Canned ACL granting anonymous read access.
pub const PUBLIC_READ_ACL: &str = "public-read";

/// Headers sent with every put made through the public-write client.
///
/// `None` for providers without object ACLs. On GCS buckets with uniform
/// bucket-level access the ACL header is rejected; grant read access on the
/// bucket instead and leave `make_public` uploads to the bucket policy.
pub fn public_read_headers(provider: &BlobProvider) -> Option<HeaderMap> {
    let name = match provider {
        BlobProvider::Gcs { .. } => "x-goog-acl",
        BlobProvider::S3 { .. } => "x-amz-acl",
        BlobProvider::Local => return None,
    };
    let mut headers = HeaderMap::new();
    headers.insert(name, HeaderValue::from_static(PUBLIC_READ_ACL));
    Some(headers)
}

fn init_failed(e: ObjectStoreError) -> StorageError {
    StorageError::InitFailed(e.to_string())
}

/// Object storage backend over any `object_store` provider (GCS, S3, local directory).
///
/// Cloud providers get two clients for the same bucket: `store` for reads,
/// deletes and private writes, and `public_store`, which adds the
/// public-read ACL header to each put.
#[derive(Clone)]
pub struct CloudBlobBackend {
    store: Arc<dyn ObjectStore>,
    public_store: Option<Arc<dyn ObjectStore>>,
    bucket: String,
    backend: StorageBackend,
    /// Local filesystem stores cannot record object attributes.
    attributes_supported: bool,
}

impl std::fmt::Debug for CloudBlobBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudBlobBackend")
            .field("bucket", &self.bucket)
            .field("backend", &self.backend)
            .field("public_acl", &self.public_store.is_some())
            .finish()
    }
}

impl CloudBlobBackend {
    /// Build the provider clients for `bucket`.
    ///
    /// For `BlobProvider::Local` the bucket is a directory, created if missing.
    /// Credentials for GCS and S3 come from the usual provider environment
    /// variables (`GOOGLE_*`, `AWS_*`).
    pub async fn new(provider: &BlobProvider, bucket: &str) -> StorageResult<Self> {
        if matches!(provider, BlobProvider::Local) {
            tokio::fs::create_dir_all(bucket).await.map_err(|e| {
                StorageError::InitFailed(format!("cannot create {}: {}", bucket, e))
            })?;
        }

        let store = Self::build_store(provider, bucket, None)?;
        let public_store = public_read_headers(provider)
            .map(|headers| Self::build_store(provider, bucket, Some(headers)))
            .transpose()?;

        tracing::info!(
            backend = %provider.backend_type(),
            bucket = %bucket,
            public_acl = public_store.is_some(),
            "Cloud blob storage initialized"
        );

        let mut backend = Self::from_store(store, bucket, provider.backend_type());
        backend.attributes_supported = !matches!(provider, BlobProvider::Local);
        if let Some(public_store) = public_store {
            backend = backend.with_public_store(public_store);
        }
        Ok(backend)
    }

    fn build_store(
        provider: &BlobProvider,
        bucket: &str,
        default_headers: Option<HeaderMap>,
    ) -> StorageResult<Arc<dyn ObjectStore>> {
        let options =
            default_headers.map(|headers| ClientOptions::new().with_default_headers(headers));

        match provider {
            BlobProvider::Gcs {
                service_account_path,
            } => {
                let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket);
                if let Some(options) = options {
                    builder = builder.with_client_options(options);
                }
                if let Some(path) = service_account_path {
                    builder = builder.with_service_account_path(path);
                }
                Ok(Arc::new(builder.build().map_err(init_failed)?))
            }
            BlobProvider::S3 { region, endpoint } => {
                let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
                // Client options first: `with_allow_http` below writes into them.
                if let Some(options) = options {
                    builder = builder.with_client_options(options);
                }
                if let Some(region) = region {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = endpoint {
                    let allow_http = endpoint.starts_with("http://");
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(allow_http);
                }
                Ok(Arc::new(builder.build().map_err(init_failed)?))
            }
            BlobProvider::Local => Ok(Arc::new(
                LocalFileSystem::new_with_prefix(bucket).map_err(init_failed)?,
            )),
        }
    }

    /// Wrap an existing object store, e.g. `InMemory` in tests.
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        backend: StorageBackend,
    ) -> Self {
        Self {
            store,
            public_store: None,
            bucket: bucket.into(),
            backend,
            attributes_supported: true,
        }
    }

    /// Route `make_public` writes through `store`.
    pub fn with_public_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.public_store = Some(store);
        self
    }

    fn writer(&self, make_public: bool) -> &Arc<dyn ObjectStore> {
        match (&self.public_store, make_public) {
            (Some(public_store), true) => public_store,
            _ => &self.store,
        }
    }

    fn put_options(&self, make_public: bool) -> PutOptions {
        let mut attributes = Attributes::new();
        if self.attributes_supported {
            let cache_control = if make_public {
                PUBLIC_CACHE_CONTROL
            } else {
                PRIVATE_CACHE_CONTROL
            };
            attributes.insert(Attribute::CacheControl, cache_control.into());
        }
        PutOptions {
            attributes,
            ..Default::default()
        }
    }

    fn map_read_error(key: &str, e: ObjectStoreError) -> StorageError {
        match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl Storage for CloudBlobBackend {
    async fn write(
        &self,
        mut reader: UploadReader,
        key: &str,
        make_public: bool,
    ) -> StorageResult<u64> {
        validate_key(key)?;
        let start = Instant::now();

        // The whole body is buffered so a failing reader never leaves a
        // partial object behind; the put below is a single request.
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await.map_err(|e| {
            tracing::warn!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "Upload stream failed before completion"
            );
            StorageError::UploadFailed(format!("Failed to read from stream: {}", e))
        })?;

        let size = buffer.len() as u64;
        let location = Path::from(key.to_string());
        let payload = PutPayload::from(Bytes::from(buffer));

        let result: ObjectResult<_> = self
            .writer(make_public)
            .put_opts(&location, payload, self.put_options(make_public))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = %self.backend,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            backend = %self.backend,
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            public = make_public,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(size)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let start = Instant::now();

        // Most providers treat deleting a missing object as success.
        if !self.exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let location = Path::from(key.to_string());
        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object delete failed"
                );
                StorageError::DeleteFailed(other.to_string())
            }
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object delete successful"
        );

        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        // object_store clients hold no resources that need explicit release.
        tracing::debug!(bucket = %self.bucket, "Cloud blob storage closed");
        Ok(())
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        let start = Instant::now();
        let location = Path::from(key.to_string());

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| Self::map_read_error(key, e))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object read successful"
        );

        Ok(bytes.to_vec())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}

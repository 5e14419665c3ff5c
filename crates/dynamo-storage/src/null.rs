use crate::keys::validate_key;
use crate::traits::{Storage, StorageResult, UploadReader};
use crate::StorageBackend;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Backend that accepts everything and stores nothing.
///
/// Selected when no real backend is enabled. Writes drain the reader so byte
/// counts are accurate; counters make dry runs visible in logs and tests.
#[derive(Debug, Default)]
pub struct NullBackend {
    writes: AtomicU64,
    deletes: AtomicU64,
    closes: AtomicU64,
    bytes_written: AtomicU64,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn delete_count(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    pub fn close_count(&self) -> u64 {
        self.closes.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Storage for NullBackend {
    async fn write(
        &self,
        mut reader: UploadReader,
        key: &str,
        make_public: bool,
    ) -> StorageResult<u64> {
        validate_key(key)?;
        let size = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;

        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(size, Ordering::Relaxed);

        tracing::info!(
            key = %key,
            size_bytes = size,
            public = make_public,
            writes = self.write_count(),
            "Null storage discarded upload"
        );

        Ok(size)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.deletes.fetch_add(1, Ordering::Relaxed);
        tracing::info!(key = %key, deletes = self.delete_count(), "Null storage delete");
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        self.closes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            writes = self.write_count(),
            deletes = self.delete_count(),
            "Null storage closed"
        );
        Ok(())
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        Ok(Vec::new())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        Ok(false)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_drains_reader_and_counts() {
        let backend = NullBackend::new();
        let size = backend
            .write(Box::pin(&b"0123456789"[..]), "raw/nullKey001", true)
            .await
            .unwrap();
        assert_eq!(size, 10);
        assert_eq!(backend.write_count(), 1);
        assert_eq!(backend.bytes_written(), 10);
    }

    #[tokio::test]
    async fn test_reads_and_deletes_are_deterministic() {
        let backend = NullBackend::new();
        backend.delete("raw/anything").await.unwrap();
        assert_eq!(backend.delete_count(), 1);
        assert!(backend.read("raw/anything").await.unwrap().is_empty());
        assert!(!backend.exists("raw/anything").await.unwrap());
        assert_eq!(backend.backend_type(), StorageBackend::Null);
    }
}

//! Upload of classified files to object storage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use psort_models::{MediaFile, StorageKey};
use psort_storage::ObjectStore;

use crate::error::{WorkerError, WorkerResult};
use crate::retry::RetryPolicy;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Stores one local file under a label-prefixed key.
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    async fn upload(&self, key: &StorageKey, file: &MediaFile) -> WorkerResult<()>;
}

/// [`ObjectUploader`] writing through an [`ObjectStore`] with retries.
pub struct StorageUploader {
    store: Arc<dyn ObjectStore>,
    retry: RetryPolicy,
}

impl StorageUploader {
    pub fn new(store: Arc<dyn ObjectStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }
}

#[async_trait]
impl ObjectUploader for StorageUploader {
    async fn upload(&self, key: &StorageKey, file: &MediaFile) -> WorkerResult<()> {
        let data = tokio::fs::read(file.path()).await.map_err(|e| {
            WorkerError::upload(format!("failed to read {}: {}", file.path().display(), e))
        })?;

        let key_str = key.as_key();
        let content_type = file
            .declared_mime_type
            .as_deref()
            .unwrap_or(FALLBACK_CONTENT_TYPE);
        let size = data.len();

        let store = &self.store;
        let object_key = key_str.as_str();
        let data = &data;

        self.retry
            .execute("object_upload", move || {
                store.put_object(object_key, data.clone(), content_type)
            })
            .await
            .map_err(WorkerError::upload)?;

        info!(
            bucket = %self.store.bucket(),
            key = %key_str,
            bytes = size,
            "Stored classified file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use psort_models::ClassificationLabel;
    use psort_storage::{StorageError, StorageResult};
    use tempfile::TempDir;

    use super::*;
    use crate::retry::testing::instant_policy;

    #[derive(Default)]
    struct FlakyStore {
        failures_left: Mutex<u32>,
        puts: Mutex<Vec<(String, Vec<u8>, String)>>,
    }

    impl FlakyStore {
        fn failing(times: u32) -> Self {
            Self {
                failures_left: Mutex::new(times),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
        fn bucket(&self) -> &str {
            "test-bucket"
        }

        async fn put_object(
            &self,
            key: &str,
            data: Vec<u8>,
            content_type: &str,
        ) -> StorageResult<()> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(StorageError::upload_failed("connection reset"));
            }
            self.puts
                .lock()
                .unwrap()
                .push((key.to_string(), data, content_type.to_string()));
            Ok(())
        }
    }

    fn media_file(dir: &TempDir, name: &str, mime: &str) -> MediaFile {
        let path = dir.path().join(name);
        std::fs::write(&path, b"image-bytes").unwrap();
        MediaFile::new(path, Some(mime.to_string()))
    }

    #[tokio::test]
    async fn test_upload_writes_label_prefixed_key() {
        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, "1.jpg", "image/jpeg");
        let store = Arc::new(FlakyStore::default());
        let uploader = StorageUploader::new(store.clone(), instant_policy(6));

        uploader
            .upload(&StorageKey::new(ClassificationLabel::Cars, "1.jpg"), &file)
            .await
            .unwrap();

        let puts = store.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, "cars/1.jpg");
        assert_eq!(puts[0].1, b"image-bytes");
        assert_eq!(puts[0].2, "image/jpeg");
    }

    #[tokio::test]
    async fn test_upload_retries_then_succeeds() {
        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, "2.png", "image/png");
        let store = Arc::new(FlakyStore::failing(2));
        let uploader = StorageUploader::new(store.clone(), instant_policy(6));

        uploader
            .upload(&StorageKey::new(ClassificationLabel::Misc, "2.png"), &file)
            .await
            .unwrap();

        assert_eq!(store.puts.lock().unwrap()[0].0, "misc/2.png");
    }

    #[tokio::test]
    async fn test_upload_gives_up_after_max_attempts() {
        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, "3.png", "image/png");
        let store = Arc::new(FlakyStore::failing(10));
        let uploader = StorageUploader::new(store.clone(), instant_policy(3));

        let err = uploader
            .upload(&StorageKey::new(ClassificationLabel::Arts, "3.png"), &file)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerError::Upload(_)));
        assert_eq!(*store.failures_left.lock().unwrap(), 7);
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_upload_error() {
        let dir = TempDir::new().unwrap();
        let file = MediaFile::new(dir.path().join("gone.jpg"), Some("image/jpeg".to_string()));
        let uploader = StorageUploader::new(Arc::new(FlakyStore::default()), instant_policy(1));

        let err = uploader
            .upload(&StorageKey::new(ClassificationLabel::Cars, "gone.jpg"), &file)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerError::Upload(_)));
    }
}

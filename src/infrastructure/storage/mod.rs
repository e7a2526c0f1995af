//! Shared storage area on the local filesystem

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::application::errors::StorageError;
use crate::domain::traits::{FileStore, StoredFile};

/// Prefix of files still being written; hidden from listings
const PARTIAL_PREFIX: &str = ".partial-";

/// Directory-backed store
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Make sure the directory exists and is a directory
    pub async fn init(&self) -> Result<(), StorageError> {
        let meta = tokio::fs::metadata(&self.base_path).await?;
        if !meta.is_dir() {
            return Err(StorageError::NotADirectory(self.base_path.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for LocalStorage {
    fn root(&self) -> &Path {
        &self.base_path
    }

    async fn copy_in(&self, src: &Path, name: &str) -> Result<PathBuf, StorageError> {
        let dst = self.path_of(name);
        let partial = self
            .base_path
            .join(format!("{}{}", PARTIAL_PREFIX, uuid::Uuid::new_v4()));

        if let Err(e) = tokio::fs::copy(src, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&partial, &dst).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        Ok(dst)
    }

    async fn list(&self) -> Result<Vec<StoredFile>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.base_path).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(PARTIAL_PREFIX) {
                continue;
            }
            let size = entry.metadata().await?.len();
            files.push(StoredFile { name, size });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn exists(&self, name: &str) -> bool {
        tokio::fs::metadata(self.path_of(name))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scratch() -> (LocalStorage, PathBuf) {
        let root = std::env::temp_dir().join(format!("assistant-storage-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&root).await.unwrap();
        (LocalStorage::new(&root), root)
    }

    #[tokio::test]
    async fn copy_in_overwrites_existing_file() {
        let (storage, root) = scratch().await;
        let src = root.join("incoming.bin");
        tokio::fs::write(root.join("a.txt"), b"old contents").await.unwrap();
        tokio::fs::write(&src, b"new").await.unwrap();

        let dst = storage.copy_in(&src, "a.txt").await.unwrap();

        assert_eq!(dst, root.join("a.txt"));
        assert_eq!(tokio::fs::read(&dst).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn failed_copy_leaves_no_partial_file() {
        let (storage, root) = scratch().await;

        let err = storage.copy_in(&root.join("missing"), "a.txt").await;
        assert!(matches!(err, Err(StorageError::Io(_))));

        let files = storage.list().await.unwrap();
        assert!(files.is_empty(), "unexpected files: {:?}", files);
    }

    #[tokio::test]
    async fn list_reports_sizes_sorted_and_hides_partials() {
        let (storage, root) = scratch().await;
        tokio::fs::write(root.join("b.txt"), b"12345").await.unwrap();
        tokio::fs::write(root.join("a.txt"), b"1").await.unwrap();
        tokio::fs::write(root.join(".partial-inflight"), b"xx").await.unwrap();

        let files = storage.list().await.unwrap();
        assert_eq!(
            files,
            vec![
                StoredFile { name: "a.txt".to_string(), size: 1 },
                StoredFile { name: "b.txt".to_string(), size: 5 },
            ]
        );
        assert!(storage.exists("a.txt").await);
        assert!(!storage.exists("c.txt").await);
    }

    #[tokio::test]
    async fn directories_do_not_count_as_stored_files() {
        let (storage, root) = scratch().await;
        tokio::fs::create_dir(root.join("sub")).await.unwrap();

        assert!(!storage.exists("sub").await);
    }

    #[tokio::test]
    async fn init_rejects_plain_files() {
        let (_, root) = scratch().await;
        let file = root.join("not-a-dir");
        tokio::fs::write(&file, b"").await.unwrap();

        let storage = LocalStorage::new(&file);
        assert!(matches!(storage.init().await, Err(StorageError::NotADirectory(_))));
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::errors::StorageError;

/// One entry of the shared storage area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

/// FileStore trait - abstraction over the shared storage directory
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Root of the storage area
    fn root(&self) -> &Path;

    /// Full path a stored name resolves to
    fn path_of(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Copy `src` into the storage area as `name`, replacing any existing file.
    /// The new file becomes visible only once it is complete.
    async fn copy_in(&self, src: &Path, name: &str) -> Result<PathBuf, StorageError>;

    async fn list(&self) -> Result<Vec<StoredFile>, StorageError>;

    /// True only for a regular file
    async fn exists(&self, name: &str) -> bool;
}

//! File-store interface supplied by the host.
//!
//! The pipeline never touches the filesystem directly. It reads the source
//! PDF and writes the Markdown through a [`FileStore`], addressed by logical
//! `/`-separated paths. An editor integration supplies its own store; the CLI
//! uses [`FsFileStore`], which maps logical paths onto a root directory.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Binary read, existence check, create and modify-in-place by path.
pub trait FileStore: Send + Sync {
    /// Read the whole entry at `path`.
    fn read_binary(&self, path: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Whether an entry exists at `path`.
    fn exists(&self, path: &str) -> impl Future<Output = bool> + Send;

    /// Create a new entry. Fails if one already exists.
    fn create(&self, path: &str, contents: &str) -> impl Future<Output = io::Result<()>> + Send;

    /// Replace the contents of an existing entry.
    fn modify(&self, path: &str, contents: &str) -> impl Future<Output = io::Result<()>> + Send;
}

/// [`FileStore`] over a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute paths are used as-is; relative ones are joined onto the root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl FileStore for FsFileStore {
    async fn read_binary(&self, path: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(path)).await
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path))
            .await
            .unwrap_or(false)
    }

    async fn create(&self, path: &str, contents: &str) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.resolve(path))
            .await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await
    }

    async fn modify(&self, path: &str, contents: &str) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.resolve(path))
            .await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await
    }
}

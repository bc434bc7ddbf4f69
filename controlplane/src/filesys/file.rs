//! File operations

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::ServerError;

/// A file wrapper with path
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
}

impl File {
    /// Create a new file reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Read file contents as string
    pub async fn read_string(&self) -> io::Result<String> {
        fs::read_to_string(&self.path).await
    }

    /// Read file contents as bytes
    pub async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path).await
    }

    /// Read file as JSON
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<T, ServerError> {
        let contents = self.read_string().await?;
        let value = serde_json::from_str(&contents)?;
        Ok(value)
    }

    /// Write bytes to file, creating parent directories as needed
    pub async fn write_bytes(&self, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&self.path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Delete the file
    pub async fn delete(&self) -> io::Result<()> {
        if self.exists().await {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesys::dir::Dir;

    #[tokio::test]
    async fn test_write_bytes_creates_parents() {
        let dir = Dir::create_temp_dir("riser-file").await.unwrap();
        let file = dir.file("a/b/c.yaml");

        file.write_bytes(b"hello").await.unwrap();

        assert_eq!(file.read_bytes().await.unwrap(), b"hello");
        file.delete().await.unwrap();
        assert!(!file.exists().await);
        dir.delete().await.unwrap();
    }
}

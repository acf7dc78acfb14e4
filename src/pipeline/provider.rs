//! File provider module
//!
//! The seam between the pipeline and the file system. Callers can supply
//! their own provider (in-memory fixtures, an embedded bundle) instead of
//! reading from disk.

use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use super::FileUnit;
use crate::logger;

/// Yields one file unit per path, or nothing if the path does not exist.
#[async_trait]
pub trait FileProvider: Send + Sync {
    async fn fetch(&self, path: &Path) -> Option<FileUnit>;
}

/// Default provider reading files from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProvider;

#[async_trait]
impl FileProvider for DiskProvider {
    async fn fetch(&self, path: &Path) -> Option<FileUnit> {
        match fs::read(path).await {
            Ok(contents) => Some(FileUnit {
                path: path.to_path_buf(),
                contents: Bytes::from(contents),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_disk_provider_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"hello").unwrap();

        let unit = DiskProvider.fetch(&path).await.unwrap();
        assert_eq!(unit.contents, Bytes::from_static(b"hello"));
        assert_eq!(unit.path, path);
    }

    #[tokio::test]
    async fn test_disk_provider_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let unit = DiskProvider.fetch(&dir.path().join("missing.txt")).await;
        assert!(unit.is_none());
    }
}

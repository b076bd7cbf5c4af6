//! Media store implementation.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// A file persisted by the media store.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    /// Generated storage key (timestamp-qualified filename).
    pub key: String,
    /// Absolute path of the file on disk.
    pub path: PathBuf,
    /// Byte length.
    pub size: i64,
}

/// Media store backed by a single directory on local disk.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open a media store rooted at `root`, creating the directory if
    /// it does not exist.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::init_error(format!("{}: {e}", root.display())))?;
        info!("Media store at {}", root.display());
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist uploaded bytes under a fresh timestamp-qualified key.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> StorageResult<StoredMedia> {
        let key = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_filename(original_name)
        );
        let path = self.root.join(&key);

        let mut file = File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(StoredMedia {
            key,
            path,
            size: bytes.len() as i64,
        })
    }

    /// Byte length of a stored file.
    pub async fn len(&self, key: &str) -> StorageResult<u64> {
        let path = self.resolve(key)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|_| StorageError::not_found(key))?;
        Ok(meta.len())
    }

    /// Read the inclusive byte range `start..=end` of a stored file.
    pub async fn read_range(&self, key: &str, start: u64, end: u64) -> StorageResult<Vec<u8>> {
        let path = self.resolve(key)?;
        let size = self.len(key).await?;
        if start > end || end >= size {
            return Err(StorageError::InvalidRange { start, end, size });
        }

        let mut file = File::open(&path)
            .await
            .map_err(|_| StorageError::not_found(key))?;
        file.seek(SeekFrom::Start(start)).await?;

        let len = (end - start + 1) as usize;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf).await?;
        Ok(buf)
    }

    /// Open a stored file for streaming reads.
    pub async fn reader(&self, key: &str) -> StorageResult<File> {
        let path = self.resolve(key)?;
        File::open(&path)
            .await
            .map_err(|_| StorageError::not_found(key))
    }

    /// Delete every stored file. Maintenance operation backing the
    /// library reset; returns the number of files removed.
    pub async fn clear_all(&self) -> StorageResult<usize> {
        let mut removed = 0usize;
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        info!("Cleared media store: removed {removed} files");
        Ok(removed)
    }

    /// Resolve a key to a path under the root, rejecting traversal.
    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.contains('/') || key.contains('\\') {
            return Err(StorageError::invalid_key(key));
        }
        Ok(self.root.join(key))
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` so keys stay safe as plain
/// filenames.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

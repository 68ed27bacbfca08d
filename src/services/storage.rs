use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid file key")]
    InvalidKey,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, extension: &str) -> Result<StoredFile, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// The key behind `url` when this store served it, `None` for foreign URLs.
    fn key_of<'a>(&self, url: &'a str) -> Option<&'a str>;
}

/// Maps an accepted image content type to the extension it is stored under.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        && !key.starts_with('.')
}

/// Stores uploads on local disk and serves them under `{base_url}/files/{key}`.
pub struct LocalFileStore {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, bytes: Vec<u8>, extension: &str) -> Result<StoredFile, StorageError> {
        let key = format!("{}.{}", Uuid::new_v4(), extension);
        if !is_valid_key(&key) {
            return Err(StorageError::InvalidKey);
        }

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&key), bytes).await?;

        Ok(StoredFile {
            url: format!("{}/files/{}", self.base_url, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey);
        }

        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn key_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.base_url.as_str())?
            .strip_prefix("/files/")
            .filter(|key| is_valid_key(key))
    }
}

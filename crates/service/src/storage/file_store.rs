use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name, used only for its extension.
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self { file_name, content_type: None, bytes: bytes.into() }
    }

    /// Lowercased extension of the original file name, if it looks sane.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let ext = Path::new(name).extension()?.to_str()?;
        if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// File store holding product images.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist `upload` under a generated name and return its path
    /// relative to the store root.
    async fn save(&self, upload: Upload) -> Result<String, ServiceError>;

    /// Delete the file at the relative `path`; a missing file is not an error.
    async fn remove(&self, path: &str) -> Result<(), ServiceError>;
}

/// Filesystem-backed store writing to `<root>/<subdir>/<uuid>.<ext>`.
///
/// Stored paths are `<subdir>/<uuid>.<ext>`, which is also the URL path
/// under `/uploads`; the root never leaves the server.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    subdir: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, subdir: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), subdir: subdir.into() }
    }

    pub fn dir(&self) -> PathBuf { self.root.join(&self.subdir) }

    /// Absolute location of a stored path, or `None` when it would escape the root.
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        let rel = Path::new(stored);
        let plain = rel.components().all(|c| matches!(c, Component::Normal(_)));
        (plain && !stored.is_empty()).then(|| self.root.join(rel))
    }

    fn relative(&self, file_name: &str) -> String {
        let mut out: Vec<String> = self
            .subdir
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        out.push(file_name.to_string());
        out.join("/")
    }
}

fn storage_err(action: &str, path: &Path, e: std::io::Error) -> ServiceError {
    ServiceError::Storage(format!("{action} {}: {e}", path.display()))
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, upload: Upload) -> Result<String, ServiceError> {
        let dir = self.dir();
        fs::create_dir_all(&dir).await.map_err(|e| storage_err("create", &dir, e))?;

        let id = Uuid::new_v4();
        let file_name = match upload.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        };
        let target = dir.join(&file_name);
        // Write beside the target, then rename so readers never see a partial file.
        let tmp = dir.join(format!(".{file_name}.part"));
        fs::write(&tmp, &upload.bytes).await.map_err(|e| storage_err("write", &tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(storage_err("rename", &target, e));
        }

        let stored = self.relative(&file_name);
        debug!(path = %stored, bytes = upload.bytes.len(), "image stored");
        Ok(stored)
    }

    async fn remove(&self, path: &str) -> Result<(), ServiceError> {
        let Some(p) = self.resolve(path) else {
            warn!(%path, "refusing to remove file outside upload root");
            return Err(ServiceError::Storage(format!("{path} is outside the upload root")));
        };
        match fs::remove_file(&p).await {
            Ok(()) => {
                debug!(%path, "image removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err("remove", &p, e)),
        }
    }
}

//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Create the upload directory tree if it is missing.
///
/// Fails when the path exists but is not a directory, or cannot be created.
pub async fn ensure_upload_dir(dir: impl AsRef<Path>) -> anyhow::Result<()> {
    let dir = dir.as_ref();
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{} exists but is not a directory", dir.display())),
        Err(_) => {
            warn!(dir = %dir.display(), "upload directory missing; creating it");
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
            info!(dir = %dir.display(), "upload directory created");
            Ok(())
        }
    }
}

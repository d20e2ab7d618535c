//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can prepare the
//! upload tree through `service::runtime` without depending on `common`.

use std::path::Path;

/// Make sure the directory product images are written to exists.
pub async fn ensure_upload_dir(dir: impl AsRef<Path>) -> anyhow::Result<()> {
    common::env::ensure_upload_dir(dir).await
}

use crate::services::storage::StorageService;
use crate::utils::format::human_size;
use crate::utils::validation::{key_for_path, validate_key};
use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Uploads `file_path` under `key`, or under the file's base name.
///
/// The local file is checked before the storage service is touched.
pub async fn run<W: Write>(
    storage: &dyn StorageService,
    file_path: &Path,
    key: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let metadata = match std::fs::metadata(file_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!("file does not exist: {}", file_path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("unable to read {}", file_path.display()));
        }
    };
    if !metadata.is_file() {
        bail!("not a regular file: {}", file_path.display());
    }

    let key = match key {
        Some(key) => key.to_string(),
        None => key_for_path(file_path).with_context(|| {
            format!("cannot derive an object key from {}", file_path.display())
        })?,
    };
    validate_key(&key)?;

    writeln!(out, "Uploading {}...", key)?;

    storage
        .put(file_path, &key)
        .await
        .context("failed to upload file")?;

    info!(
        "Uploaded {} as s3://{}/{}",
        file_path.display(),
        storage.bucket(),
        key
    );
    writeln!(
        out,
        "Successfully uploaded {} ({})",
        key,
        human_size(metadata.len() as i64)
    )?;
    Ok(())
}

use super::Prompt;
use crate::services::storage::StorageService;
use crate::utils::validation::{local_name_for_key, validate_key};
use anyhow::{Context, Result};
use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Downloads `key` to `output`, or to the key's last path segment in the
/// working directory.
///
/// The object is staged in a temporary file next to the destination and
/// only moved into place once the transfer finished, so a failed download
/// never clobbers an existing file.
pub async fn run<W: Write, P: Prompt>(
    storage: &dyn StorageService,
    key: &str,
    output: Option<&Path>,
    out: &mut W,
    prompt: &mut P,
) -> Result<()> {
    validate_key(key)?;

    let destination = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(
            local_name_for_key(key)
                .with_context(|| format!("cannot derive a local file name from {:?}", key))?,
        ),
    };

    if destination.exists()
        && !prompt.confirm(&format!(
            "File {} already exists. Overwrite?",
            destination.display()
        ))?
    {
        writeln!(out, "Download cancelled")?;
        return Ok(());
    }

    writeln!(out, "Downloading {}...", key)?;

    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let staging = tempfile::Builder::new()
        .prefix(".tincan_download_")
        .tempfile_in(parent)
        .with_context(|| format!("unable to create temporary file in {}", parent.display()))?;

    storage
        .get(key, staging.path())
        .await
        .context("failed to download file")?;

    apply_destination_mode(staging.as_file(), &destination)
        .with_context(|| format!("unable to set permissions for {}", destination.display()))?;
    staging
        .persist(&destination)
        .with_context(|| format!("unable to write {}", destination.display()))?;

    info!(
        "Downloaded s3://{}/{} to {}",
        storage.bucket(),
        key,
        destination.display()
    );
    writeln!(out, "Successfully downloaded {}", key)?;
    Ok(())
}

/// Staging files are created owner-only. The finished file takes the mode of
/// the file it replaces, or that of a newly created file.
fn apply_destination_mode(staged: &File, destination: &Path) -> io::Result<()> {
    let permissions = match fs::metadata(destination) {
        Ok(existing) => existing.permissions(),
        Err(_) => new_file_permissions(staged)?,
    };
    staged.set_permissions(permissions)
}

#[cfg(unix)]
fn new_file_permissions(_staged: &File) -> io::Result<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions(staged: &File) -> io::Result<Permissions> {
    Ok(staged.metadata()?.permissions())
}

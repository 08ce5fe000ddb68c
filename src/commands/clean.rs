use super::Prompt;
use crate::services::storage::StorageService;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

/// Removes every object from the bucket after showing the list and asking
/// for confirmation. Stops at the first failed delete.
pub async fn run<W: Write, P: Prompt>(
    storage: &dyn StorageService,
    out: &mut W,
    prompt: &mut P,
) -> Result<()> {
    let files = storage.list_all().await.context("failed to list files")?;

    if files.is_empty() {
        writeln!(out, "No files to clean")?;
        return Ok(());
    }

    writeln!(out, "The following {} files will be deleted:", files.len())?;
    for file in &files {
        writeln!(out, "  - {}", file.name)?;
    }
    writeln!(out)?;
    out.flush()?;

    if !prompt.confirm("Are you sure you want to delete these files?")? {
        writeln!(out, "Clean cancelled")?;
        return Ok(());
    }

    for file in &files {
        storage
            .delete(&file.name)
            .await
            .with_context(|| format!("failed to delete {}", file.name))?;
        writeln!(out, "Deleted {}", file.name)?;
    }

    info!("Removed {} objects from {}", files.len(), storage.bucket());
    writeln!(out, "Clean completed")?;
    Ok(())
}

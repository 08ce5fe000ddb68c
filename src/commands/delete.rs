use super::Prompt;
use crate::services::storage::StorageService;
use crate::utils::validation::validate_key;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

pub async fn run<W: Write, P: Prompt>(
    storage: &dyn StorageService,
    key: &str,
    out: &mut W,
    prompt: &mut P,
) -> Result<()> {
    validate_key(key)?;

    if !prompt.confirm(&format!("Delete {} from {}?", key, storage.bucket()))? {
        writeln!(out, "Delete cancelled")?;
        return Ok(());
    }

    storage
        .delete(key)
        .await
        .with_context(|| format!("failed to delete {}", key))?;

    info!("Deleted s3://{}/{}", storage.bucket(), key);
    writeln!(out, "Deleted {}", key)?;
    Ok(())
}

use crate::services::storage::StorageService;
use crate::utils::format::{human_size, timestamp};
use anyhow::{Context, Result};
use std::io::Write;

pub async fn run<W: Write>(storage: &dyn StorageService, out: &mut W) -> Result<()> {
    let files = storage.list_all().await.context("failed to list files")?;

    if files.is_empty() {
        writeln!(out, "No files found in bucket")?;
        return Ok(());
    }

    let name_width = files.iter().map(|f| f.name.chars().count()).max().unwrap_or(0);

    writeln!(out, "Files in bucket {}:", storage.bucket())?;
    for file in &files {
        writeln!(
            out,
            "  {:<width$}  {:>10}  {}",
            file.name,
            human_size(file.size),
            timestamp(file.last_modified),
            width = name_width
        )?;
    }
    writeln!(out, "{} file(s)", files.len())?;

    Ok(())
}

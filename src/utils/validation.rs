use anyhow::{Result, bail};
use std::path::Path;

/// Maximum object key length accepted by S3, in bytes.
pub const MAX_KEY_LENGTH: usize = 1024;

/// Default object key for a local file: its base name.
pub fn key_for_path(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

/// Last path segment of an object key, used as the local file name.
///
/// Keys like `reports/2024/q1.pdf` land as `q1.pdf`.
pub fn local_name_for_key(key: &str) -> Option<&str> {
    key.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Checks a key supplied by a user before it is sent to the bucket.
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        bail!("object key must not be empty");
    }
    if key.len() > MAX_KEY_LENGTH {
        bail!("object key exceeds {} bytes", MAX_KEY_LENGTH);
    }
    if key.chars().any(|c| c.is_control()) {
        bail!("object key contains control characters");
    }
    Ok(())
}

/// Turns a browser-supplied file name into an object key.
///
/// Browsers may send a full client path; only the last segment is kept.
pub fn sanitize_upload_name(filename: &str) -> Result<String> {
    let name = local_name_for_key(filename.trim())
        .ok_or_else(|| anyhow::anyhow!("invalid file name: {:?}", filename))?;
    validate_key(name)?;
    Ok(name.to_string())
}

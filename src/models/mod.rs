use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One object in the bucket, as reported by the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Object key
    pub name: String,
    /// Size in bytes
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}


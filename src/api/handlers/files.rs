use crate::AppState;
use crate::api::error::AppError;
use crate::models::FileEntry;
use crate::utils::validation::{local_name_for_key, sanitize_upload_name, validate_key};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::Response,
};
use futures::{StreamExt, TryStreamExt};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio_util::io::{ReaderStream, StreamReader};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    pub success: bool,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    pub success: bool,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileEntry>,
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct KeyQuery {
    /// Object key
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing key parameter"))]
    pub key: String,
}

impl KeyQuery {
    fn checked(&self) -> Result<&str, AppError> {
        self.validate()
            .map_err(|_| AppError::BadRequest("Missing key parameter".to_string()))?;
        validate_key(&self.key).map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(&self.key)
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = Multipart, description = "Multipart form with a `file` field"),
    responses(
        (status = 200, description = "File uploaded", body = ActionResponse),
        (status = 400, description = "No file in the request"),
        (status = 500, description = "Upload failed")
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ActionResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Missing file name".to_string()))?;
        let key = sanitize_upload_name(&original_name)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        // Removed when `staging` drops, on every path out of this handler.
        let staging = tempfile::Builder::new()
            .prefix("tincan_upload_")
            .tempfile_in(&state.config.temp_dir)
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;

        let mut writer = tokio::fs::File::create(staging.path())
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;
        let body_with_io_error = field.map_err(std::io::Error::other);
        let mut reader = StreamReader::new(body_with_io_error);

        let size = tokio::io::copy(&mut reader, &mut writer)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to save file: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to save file: {}", e)))?;
        drop(writer);

        state
            .storage
            .put(staging.path(), &key)
            .await
            .map_err(|e| AppError::Storage(e.context("Upload failed")))?;

        tracing::info!("📤 Uploaded {} ({} bytes) via web", key, size);
        return Ok(ActionResponse::ok(format!("File {} uploaded successfully", key)));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}

#[utoipa::path(
    get,
    path = "/download",
    params(KeyQuery),
    responses(
        (status = 200, description = "File content as an attachment"),
        (status = 400, description = "Missing key parameter"),
        (status = 500, description = "Download failed")
    ),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, AppError> {
    let key = query.checked()?;

    let staging = tempfile::Builder::new()
        .prefix("tincan_download_")
        .tempfile_in(&state.config.temp_dir)
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;

    state
        .storage
        .get(key, staging.path())
        .await
        .map_err(|e| AppError::Storage(e.context("Download failed")))?;

    let file = tokio::fs::File::open(staging.path()).await?;
    let length = file.metadata().await?.len();

    // The staging file is owned by the body stream and removed when the
    // response finishes or the client goes away.
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _staging = &staging;
        chunk
    });

    let filename = local_name_for_key(key).unwrap_or("download");
    tracing::info!("📥 Serving {} ({} bytes)", key, length);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(filename).as_ref())
        .header(header::CONTENT_LENGTH, length)
        .header(header::CONTENT_DISPOSITION, content_disposition(filename))
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/validate",
    params(KeyQuery),
    responses(
        (status = 200, description = "Whether the key exists in the bucket", body = ValidateResponse),
        (status = 400, description = "Missing key parameter")
    ),
    tag = "files"
)]
pub async fn validate_file(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<ValidateResponse>, AppError> {
    let key = query.checked()?;

    let files = state
        .storage
        .list_all()
        .await
        .map_err(|e| AppError::Storage(e.context("Failed to list files")))?;
    let file = files.into_iter().find(|f| f.name == key);

    Ok(Json(ValidateResponse {
        success: true,
        exists: file.is_some(),
        file,
    }))
}

#[utoipa::path(
    get,
    path = "/list",
    responses(
        (status = 200, description = "Every object in the bucket", body = ListResponse),
        (status = 500, description = "Listing failed")
    ),
    tag = "files"
)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<ListResponse>, AppError> {
    let files = state
        .storage
        .list_all()
        .await
        .map_err(|e| AppError::Storage(e.context("Failed to list files")))?;

    Ok(Json(ListResponse {
        success: true,
        files,
    }))
}

#[utoipa::path(
    post,
    path = "/clean",
    responses(
        (status = 200, description = "Bucket emptied", body = ActionResponse),
        (status = 500, description = "A delete failed; later objects were left in place")
    ),
    tag = "files"
)]
pub async fn clean_bucket(State(state): State<AppState>) -> Result<Json<ActionResponse>, AppError> {
    let files = state
        .storage
        .list_all()
        .await
        .map_err(|e| AppError::Storage(e.context("Failed to list files")))?;

    for file in &files {
        state
            .storage
            .delete(&file.name)
            .await
            .map_err(|e| AppError::Storage(e.context(format!("Failed to delete {}", file.name))))?;
    }

    tracing::info!("🧹 Removed {} objects via web", files.len());
    Ok(ActionResponse::ok(format!("Deleted {} files", files.len())))
}

#[utoipa::path(
    delete,
    path = "/delete",
    params(KeyQuery),
    responses(
        (status = 200, description = "Object removed (or was already absent)", body = ActionResponse),
        (status = 400, description = "Missing key parameter"),
        (status = 500, description = "Delete failed")
    ),
    tag = "files"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<ActionResponse>, AppError> {
    let key = query.checked()?;

    state
        .storage
        .delete(key)
        .await
        .map_err(|e| AppError::Storage(e.context(format!("Failed to delete {}", key))))?;

    tracing::info!("🗑️  Deleted {} via web", key);
    Ok(ActionResponse::ok(format!("Deleted {}", key)))
}

pub(crate) fn content_type_for(filename: &str) -> mime::Mime {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "log" | "md" => mime::TEXT_PLAIN_UTF_8,
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS,
        "csv" => mime::TEXT_CSV,
        "xml" => mime::TEXT_XML,
        "js" => mime::APPLICATION_JAVASCRIPT,
        "json" => mime::APPLICATION_JSON,
        "pdf" => mime::APPLICATION_PDF,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`.
pub(crate) fn content_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "download"
    } else {
        &ascii_filename
    };

    let encoded_filename = utf8_percent_encode(filename, NON_ALPHANUMERIC).to_string();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback_filename, encoded_filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report%2Epdf"
        );
    }

    #[test]
    fn test_content_disposition_strips_quotes_and_non_ascii() {
        let value = content_disposition("naïve \"quote\".txt");
        assert!(value.starts_with("attachment; filename=\"nave quote.txt\""));
        assert!(value.contains("filename*=UTF-8''na%C3%AFve"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.PNG"), mime::IMAGE_PNG);
        assert_eq!(content_type_for("notes.txt"), mime::TEXT_PLAIN_UTF_8);
        assert_eq!(content_type_for("archive.tar.gz"), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(content_type_for("Makefile"), mime::APPLICATION_OCTET_STREAM);
    }
}

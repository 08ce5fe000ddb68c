mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::MockStorageService;
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tincan::config::WebConfig;
use tincan::{AppState, create_app};
use tower::ServiceExt;

const BOUNDARY: &str = "----TinCanTestBoundary";

fn app_with(storage: Arc<MockStorageService>) -> Router {
    create_app(AppState {
        storage,
        config: WebConfig::default(),
    })
}

fn app_staging_in(storage: Arc<MockStorageService>, temp_dir: &Path) -> Router {
    create_app(AppState {
        storage,
        config: WebConfig {
            temp_dir: temp_dir.to_path_buf(),
            ..WebConfig::default()
        },
    })
}

fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_index_page_shows_bucket() {
    let app = app_with(Arc::new(MockStorageService::new()));

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("test-bucket"));
    assert!(!html.contains("{{bucket}}"));
}

#[tokio::test]
async fn test_health() {
    let app = app_with(Arc::new(MockStorageService::new()));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["bucket"], "test-bucket");
}

#[tokio::test]
async fn test_upload_then_list() {
    let storage = Arc::new(MockStorageService::new());
    let app = app_with(storage.clone());

    let response = app
        .clone()
        .oneshot(upload_request(multipart_body(
            "file",
            "notes.txt",
            b"remember the milk",
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "File notes.txt uploaded successfully");
    assert_eq!(storage.content("notes.txt").unwrap(), b"remember the milk");

    let response = app.oneshot(get("/list")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "notes.txt");
    assert_eq!(files[0]["size"], 17);
    assert!(files[0]["lastModified"].is_string());
}

#[tokio::test]
async fn test_upload_strips_client_directories() {
    let storage = Arc::new(MockStorageService::new());
    let app = app_with(storage.clone());

    let response = app
        .oneshot(upload_request(multipart_body(
            "file",
            "client/dir/report.pdf",
            b"%PDF",
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(storage.contains("report.pdf"));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let storage = Arc::new(MockStorageService::new());
    let app = app_with(storage.clone());

    let response = app
        .oneshot(upload_request(multipart_body("other", "a.txt", b"x")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No file provided");
    assert_eq!(storage.call_count(), 0);
}

#[tokio::test]
async fn test_download_streams_file() {
    let storage = Arc::new(MockStorageService::with_files(&[(
        "docs/report.pdf",
        b"%PDF-1.7 body",
    )]));
    let app = app_with(storage);

    let response = app
        .oneshot(get("/download?key=docs/report.pdf"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(headers[header::CONTENT_LENGTH], "13");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"report.pdf\""));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"%PDF-1.7 body");
}

#[tokio::test]
async fn test_download_missing_object() {
    let app = app_with(Arc::new(MockStorageService::new()));

    let response = app.oneshot(get("/download?key=nope.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Download failed"));
}

#[tokio::test]
async fn test_missing_key_parameter() {
    let storage = Arc::new(MockStorageService::new());
    let app = app_with(storage.clone());

    for uri in ["/download", "/validate", "/validate?key="] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Missing key parameter");
    }

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/delete")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(storage.call_count(), 0);
}

#[tokio::test]
async fn test_validate_existing_and_missing() {
    let storage = Arc::new(MockStorageService::with_files(&[("here.txt", b"12345")]));
    let app = app_with(storage);

    let response = app
        .clone()
        .oneshot(get("/validate?key=here.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["exists"], true);
    assert_eq!(json["file"]["name"], "here.txt");
    assert_eq!(json["file"]["size"], 5);

    let response = app.oneshot(get("/validate?key=gone.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["exists"], false);
    assert!(json.get("file").is_none());
}

#[tokio::test]
async fn test_delete_single_file() {
    let storage = Arc::new(MockStorageService::with_files(&[
        ("a b.txt", b"1"),
        ("keep.txt", b"2"),
    ]));
    let app = app_with(storage.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/delete?key=a%20b.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Deleted a b.txt");
    assert!(!storage.contains("a b.txt"));
    assert!(storage.contains("keep.txt"));
}

#[tokio::test]
async fn test_clean_empties_bucket() {
    let storage = Arc::new(MockStorageService::with_files(&[
        ("one", b"1"),
        ("two", b"2"),
        ("three", b"3"),
    ]));
    let app = app_with(storage.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clean")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["message"], "Deleted 3 files");
    assert_eq!(storage.len(), 0);
}

#[tokio::test]
async fn test_clean_reports_first_failure() {
    let storage = Arc::new(MockStorageService::with_files(&[
        ("a", b"1"),
        ("b", b"2"),
        ("c", b"3"),
    ]));
    storage.fail_delete_of("b");
    let app = app_with(storage.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clean")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("Failed to delete b"));
    assert!(!storage.contains("a"));
    assert!(storage.contains("c"));
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let storage = Arc::new(MockStorageService::with_files(&[("x", b"1")]));
    let app = app_with(storage.clone());

    let response = app.clone().oneshot(get("/clean")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app.oneshot(get("/upload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    assert!(storage.contains("x"));
    assert_eq!(storage.call_count(), 0);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = app_with(Arc::new(MockStorageService::new()));

    let response = app.oneshot(get("/api-docs/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    for path in ["/upload", "/download", "/validate", "/list", "/clean", "/delete"] {
        assert!(json["paths"].get(path).is_some(), "{}", path);
    }
}

#[tokio::test]
async fn test_staging_files_do_not_outlive_requests() {
    let staging = tempfile::tempdir().unwrap();
    let storage = Arc::new(MockStorageService::new());
    let app = app_staging_in(storage.clone(), staging.path());

    let response = app
        .clone()
        .oneshot(upload_request(multipart_body("file", "big.bin", &[7u8; 4096])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(entries_in(staging.path()), 0);

    let response = app
        .clone()
        .oneshot(get("/download?key=big.bin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // Held by the response body until it has been sent.
    assert_eq!(entries_in(staging.path()), 1);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.len(), 4096);
    assert_eq!(entries_in(staging.path()), 0);

    let response = app.oneshot(get("/download?key=absent.bin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(entries_in(staging.path()), 0);
}

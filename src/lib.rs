pub mod api;
pub mod commands;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::WebConfig;
use crate::services::storage::StorageService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::files::upload_file,
        api::handlers::files::download_file,
        api::handlers::files::validate_file,
        api::handlers::files::list_files,
        api::handlers::files::clean_bucket,
        api::handlers::files::delete_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::FileEntry,
            api::handlers::files::ActionResponse,
            api::handlers::files::ListResponse,
            api::handlers::files::ValidateResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "files", description = "Bucket file operations"),
        (name = "system", description = "Server status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub config: WebConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::home::index))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::files::upload_file))
        .route("/download", get(api::handlers::files::download_file))
        .route("/validate", get(api::handlers::files::validate_file))
        .route("/list", get(api::handlers::files::list_files))
        .route("/clean", post(api::handlers::files::clean_bucket))
        .route("/delete", delete(api::handlers::files::delete_file))
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .with_state(state)
}

use crate::config::Settings;
use crate::services::storage::S3StorageService;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::info;

const DEFAULT_REGION: &str = "us-east-1";

pub async fn setup_storage(settings: &Settings) -> Arc<S3StorageService> {
    let region = RegionProviderChain::first_try(settings.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(Region::new(DEFAULT_REGION));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

    if let Some(creds) = &settings.credentials {
        loader = loader.credentials_provider(Credentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            None,
            None,
            "tincan",
        ));
    }

    if let Some(endpoint_url) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    let aws_config = loader.load().await;

    // Custom endpoints are usually MinIO-style servers without virtual hosts.
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(settings.endpoint_url.is_some())
        .build();

    info!(
        "☁️  S3 Storage: bucket={} region={} credentials={:?}",
        settings.bucket_name,
        aws_config
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        settings.source
    );

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    Arc::new(S3StorageService::new(s3_client, settings.bucket_name.clone()))
}

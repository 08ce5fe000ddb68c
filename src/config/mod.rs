pub mod embedded;

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub use embedded::EmbeddedCredentials;

/// File name looked up in the working directory, `~/.config` and `~`.
pub const CONFIG_FILE_NAME: &str = "tincan.yaml";

/// Upper bound for a single PUT request accepted by S3 (5 GiB).
pub const S3_MAX_PUT_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// [`S3_MAX_PUT_SIZE`], clamped to the address space of the target.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = if S3_MAX_PUT_SIZE > usize::MAX as u64 {
    usize::MAX
} else {
    S3_MAX_PUT_SIZE as usize
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "bucket_name is required (set TINCAN_BUCKET environment variable or add bucket_name to tincan.yaml)"
    )]
    MissingBucket,

    #[error("error reading config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to decode config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Contents of `tincan.yaml`. Every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub bucket_name: Option<String>,
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        // An empty file deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the explicit path if given, otherwise the first existing file
    /// from [`search_paths`]. A missing file is not an error unless it was
    /// named explicitly.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path).map(|cfg| Some((path.to_path_buf(), cfg)));
        }

        for path in search_paths() {
            if path.is_file() {
                let cfg = Self::load(&path)?;
                return Ok(Some((path, cfg)));
            }
        }

        Ok(None)
    }
}

pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join(CONFIG_FILE_NAME));
        paths.push(home.join(CONFIG_FILE_NAME));
    }
    paths
}

/// Where the credentials in a [`Settings`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Compiled into the binary.
    Embedded,
    /// Key pair from the config file or `TINCAN_AWS_*` variables.
    Static,
    /// Left to the SDK default chain (AWS_* variables, profiles, IMDS).
    DefaultChain,
}

#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Bucket reference resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bucket_name: String,
    /// `None` defers to the SDK region chain.
    pub region: Option<String>,
    /// Custom S3-compatible endpoint (MinIO, R2, ...).
    pub endpoint_url: Option<String>,
    pub credentials: Option<StaticCredentials>,
    pub source: CredentialSource,
}

impl Settings {
    /// Resolves settings from the build, the process environment and the
    /// config file, in that order of precedence.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let embedded = EmbeddedCredentials::compiled();
        if let Some(embedded) = embedded {
            debug!("Using credentials embedded at build time");
            return Ok(Self::from_embedded(embedded));
        }

        let file = match FileConfig::discover(config_path)? {
            Some((path, cfg)) => {
                debug!("Loaded config file {}", path.display());
                cfg
            }
            None => FileConfig::default(),
        };

        Self::resolve(None, |key| env::var(key).ok(), file)
    }

    /// Applies the precedence chain: embedded > environment > file.
    /// Environment values override file values field by field.
    pub fn resolve<F>(
        embedded: Option<EmbeddedCredentials>,
        env: F,
        file: FileConfig,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(embedded) = embedded {
            return Ok(Self::from_embedded(embedded));
        }

        let non_empty = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        let bucket_name = first_var(&env, &["TINCAN_BUCKET", "TINCAN_BUCKET_NAME"])
            .or_else(|| non_empty(file.bucket_name))
            .ok_or(ConfigError::MissingBucket)?;

        let region = first_var(&env, &["TINCAN_REGION", "TINCAN_AWS_REGION"])
            .or_else(|| non_empty(file.aws_region));
        let endpoint_url = first_var(&env, &["TINCAN_ENDPOINT_URL"])
            .or_else(|| non_empty(file.endpoint_url));

        let env_key_pair = first_var(&env, &["TINCAN_AWS_ACCESS_KEY_ID"])
            .zip(first_var(&env, &["TINCAN_AWS_SECRET_ACCESS_KEY"]));
        // Standard AWS variables belong to the default chain and outrank the file.
        let ambient_keys = first_var(&env, &["AWS_ACCESS_KEY_ID"]).is_some();
        let file_key_pair = if ambient_keys {
            None
        } else {
            non_empty(file.aws_access_key_id).zip(non_empty(file.aws_secret_access_key))
        };

        let credentials = env_key_pair
            .or(file_key_pair)
            .map(|(access_key_id, secret_access_key)| StaticCredentials {
                access_key_id,
                secret_access_key,
            });
        let source = if credentials.is_some() {
            CredentialSource::Static
        } else {
            CredentialSource::DefaultChain
        };

        Ok(Self {
            bucket_name,
            region,
            endpoint_url,
            credentials,
            source,
        })
    }

    fn from_embedded(embedded: EmbeddedCredentials) -> Self {
        Self {
            bucket_name: embedded.bucket_name,
            region: Some(embedded.region),
            endpoint_url: None,
            credentials: Some(StaticCredentials {
                access_key_id: embedded.access_key,
                secret_access_key: embedded.secret_key,
            }),
            source: CredentialSource::Embedded,
        }
    }
}

/// First non-blank value among `names`.
fn first_var<F>(env: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .copied()
        .filter_map(env)
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Web server settings.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Maximum accepted request body in bytes (default: 5 GiB)
    pub max_upload_size: usize,
    /// Directory for request-scoped staging files (default: system temp dir)
    pub temp_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            temp_dir: env::temp_dir(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_upload_size: env::var("TINCAN_MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),
            temp_dir: env::var_os("TINCAN_TEMP_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.temp_dir),
        }
    }
}

/// Credentials compiled into the binary.
///
/// Set `TINCAN_EMBED_ACCESS_KEY`, `TINCAN_EMBED_SECRET_KEY`, `TINCAN_EMBED_REGION`
/// and `TINCAN_EMBED_BUCKET` in the environment of `cargo build` to produce a
/// binary that needs no runtime configuration. All four must be present.
#[derive(Clone, PartialEq, Eq)]
pub struct EmbeddedCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket_name: String,
}

impl EmbeddedCredentials {
    /// Returns the values captured at build time, if any.
    pub fn compiled() -> Option<Self> {
        Self::from_parts(
            option_env!("TINCAN_EMBED_ACCESS_KEY"),
            option_env!("TINCAN_EMBED_SECRET_KEY"),
            option_env!("TINCAN_EMBED_REGION"),
            option_env!("TINCAN_EMBED_BUCKET"),
        )
    }

    pub fn from_parts(
        access_key: Option<&str>,
        secret_key: Option<&str>,
        region: Option<&str>,
        bucket_name: Option<&str>,
    ) -> Option<Self> {
        let present = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            access_key: present(access_key)?,
            secret_key: present(secret_key)?,
            region: present(region)?,
            bucket_name: present(bucket_name)?,
        })
    }
}

impl std::fmt::Debug for EmbeddedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket_name", &self.bucket_name)
            .finish()
    }
}

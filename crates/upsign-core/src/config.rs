//! Upsign service configuration.
//!
//! Provides [`UpsignConfig`], loaded once at process start from environment
//! variables. The signing secret is never serialized.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::credentials::SecretKey;
use crate::error::{ConfigError, ConfigResult};

/// Upsign service configuration.
///
/// # Examples
///
/// ```
/// use upsign_core::UpsignConfig;
///
/// let config = UpsignConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:8000");
/// assert!(config.secret_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct UpsignConfig {
    /// Bind address (e.g. `"0.0.0.0:8000"`).
    #[builder(default = String::from("0.0.0.0:8000"))]
    pub gateway_listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Public access key identifier paired with the secret.
    #[builder(default)]
    pub access_key_id: String,

    /// Secret key used to sign policies and REST requests.
    #[serde(skip)]
    #[builder(default)]
    pub secret_key: Option<SecretKey>,

    /// Access key id the server itself uses against the object store.
    ///
    /// When unset, the signing pair is used for the object store too.
    #[builder(default)]
    pub server_access_key_id: Option<String>,

    /// Secret key the server itself uses against the object store.
    #[serde(skip)]
    #[builder(default)]
    pub server_secret_key: Option<SecretKey>,

    /// Bucket every signed upload must target, if enforced.
    #[builder(default)]
    pub expected_bucket: Option<String>,

    /// Minimum upload size the policy must declare, if enforced.
    #[builder(default)]
    pub expected_min_size: Option<u64>,

    /// Maximum upload size the policy must declare, if enforced.
    #[builder(default)]
    pub expected_max_size: Option<u64>,

    /// Region used by the object-store client.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,

    /// Custom object-store endpoint, if not using the provider default.
    #[builder(default)]
    pub s3_endpoint_url: Option<String>,

    /// Whether `DELETE` requests are served.
    #[builder(default = true)]
    pub enable_delete: bool,
}

impl Default for UpsignConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl UpsignConfig {
    /// Load configuration from the process environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:8000` |
    /// | `LOG_LEVEL` | `info` |
    /// | `AWS_SECRET_KEY` / `CLIENT_SECRET_KEY` | *(unset)* |
    /// | `AWS_PUBLIC_KEY` | *(empty)* |
    /// | `SERVER_PUBLIC_KEY` / `SERVER_SECRET_KEY` | *(unset)* |
    /// | `EXPECTED_BUCKET` | *(unset)* |
    /// | `EXPECTED_MIN_SIZE` | *(unset)* |
    /// | `EXPECTED_MAX_SIZE` | *(unset)* |
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `S3_ENDPOINT_URL` | *(unset)* |
    /// | `ENABLE_DELETE` | `true` |
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("AWS_SECRET_KEY").or_else(|| lookup("CLIENT_SECRET_KEY")) {
            config.secret_key = Some(SecretKey::new(v));
        }
        if let Some(v) = lookup("AWS_PUBLIC_KEY") {
            config.access_key_id = v;
        }
        if let Some(v) = lookup("SERVER_PUBLIC_KEY").filter(|v| !v.is_empty()) {
            config.server_access_key_id = Some(v);
        }
        if let Some(v) = lookup("SERVER_SECRET_KEY").filter(|v| !v.is_empty()) {
            config.server_secret_key = Some(SecretKey::new(v));
        }
        if let Some(v) = lookup("EXPECTED_BUCKET").filter(|v| !v.is_empty()) {
            config.expected_bucket = Some(v);
        }
        if let Some(v) = lookup("EXPECTED_MIN_SIZE") {
            config.expected_min_size = Some(parse_u64("EXPECTED_MIN_SIZE", &v)?);
        }
        if let Some(v) = lookup("EXPECTED_MAX_SIZE") {
            config.expected_max_size = Some(parse_u64("EXPECTED_MAX_SIZE", &v)?);
        }
        if let Some(v) = lookup("DEFAULT_REGION") {
            config.default_region = v;
        }
        if let Some(v) = lookup("S3_ENDPOINT_URL").filter(|v| !v.is_empty()) {
            config.s3_endpoint_url = Some(v);
        }
        if let Some(v) = lookup("ENABLE_DELETE") {
            config.enable_delete = parse_bool(&v);
        }

        if config.expected_min_size.is_some() != config.expected_max_size.is_some() {
            return Err(ConfigError::IncompleteSizeRange);
        }
        if config.server_access_key_id.is_some() != config.server_secret_key.is_some() {
            return Err(ConfigError::IncompleteServerCredentials);
        }

        Ok(config)
    }

    /// The `(min, max)` upload size range the policy must declare, if enforced.
    #[must_use]
    pub fn expected_size_range(&self) -> Option<(u64, u64)> {
        self.expected_min_size.zip(self.expected_max_size)
    }
}

fn parse_u64(name: &'static str, value: &str) -> ConfigResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_owned(),
        })
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

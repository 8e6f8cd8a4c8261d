//! Signing credentials.
//!
//! The secret key is wrapped in [`SecretKey`] so it cannot end up in logs or
//! serialized output by accident: its `Debug` output is redacted and it
//! implements neither `Display` nor `Serialize`.

use std::fmt;
use std::sync::Arc;

use crate::config::UpsignConfig;
use crate::error::{ConfigError, ConfigResult};

/// A long-lived secret access key.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Arc<str>);

impl SecretKey {
    /// Wrap a raw secret.
    #[must_use]
    pub fn new(secret: impl AsRef<str>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }

    /// Expose the raw secret for keying an HMAC.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// The access key identifier and secret used to sign upload requests.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct SigningCredentials {
    access_key_id: String,
    secret_key: SecretKey,
}

impl SigningCredentials {
    /// Create credentials from an access key id and secret.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_key: SecretKey) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_key,
        }
    }

    /// Extract credentials from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecretKey`] if no (or an empty) secret
    /// is configured.
    pub fn from_config(config: &UpsignConfig) -> ConfigResult<Self> {
        let secret_key = config
            .secret_key
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecretKey)?;

        Ok(Self::new(config.access_key_id.clone(), secret_key))
    }

    /// Credentials the server itself uses against the object store.
    ///
    /// The `SERVER_PUBLIC_KEY`/`SERVER_SECRET_KEY` pair when configured,
    /// otherwise the signing pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecretKey`] if neither pair carries a
    /// secret.
    pub fn object_store_from_config(config: &UpsignConfig) -> ConfigResult<Self> {
        match (&config.server_access_key_id, &config.server_secret_key) {
            (Some(access_key_id), Some(secret_key)) if !secret_key.is_empty() => {
                Ok(Self::new(access_key_id.clone(), secret_key.clone()))
            }
            _ => Self::from_config(config),
        }
    }

    /// The public access key identifier.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret key.
    #[must_use]
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

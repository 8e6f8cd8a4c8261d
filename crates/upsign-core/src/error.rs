//! Error types for Upsign configuration.

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No signing secret was configured.
    #[error("signing secret key is not configured (set AWS_SECRET_KEY)")]
    MissingSecretKey,

    /// A numeric setting could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidNumber {
        /// Environment variable name.
        name: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// Only one bound of the expected size range was configured.
    #[error("EXPECTED_MIN_SIZE and EXPECTED_MAX_SIZE must be set together")]
    IncompleteSizeRange,

    /// Only one half of the object-store key pair was configured.
    #[error("SERVER_PUBLIC_KEY and SERVER_SECRET_KEY must be set together")]
    IncompleteServerCredentials,
}

/// Convenience result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

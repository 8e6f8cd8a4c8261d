//! Error types for upload signing.
//!
//! Every failure is represented by [`SigningError`]. The `Display` text is
//! meant for server-side logs; callers must not forward it to clients, since
//! differentiated messages would turn the endpoint into a signing oracle.

/// Errors that can occur while signing an upload request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// The payload does not have the shape of a policy or REST signing request,
    /// or a credential scope does not match the expected grammar.
    #[error("malformed signing request: {0}")]
    MalformedRequest(String),

    /// The policy or REST request is well formed but violates the configured
    /// upload rules (wrong bucket, unexpected size range).
    #[error("upload policy rejected: {0}")]
    PolicyRejected(String),

    /// An HMAC or digest primitive could not be initialised.
    #[error("cryptographic fault: {0}")]
    CryptoFault(String),

    /// Input bytes could not be interpreted as UTF-8 text or re-encoded.
    #[error("encoding fault: {0}")]
    EncodingFault(String),
}

impl SigningError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest(reason.into())
    }

    pub(crate) fn rejected(reason: impl Into<String>) -> Self {
        Self::PolicyRejected(reason.into())
    }
}

/// Convenience result type for signing operations.
pub type SignerResult<T> = Result<T, SigningError>;

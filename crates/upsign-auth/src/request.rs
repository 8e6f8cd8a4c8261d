//! Signing request classification.
//!
//! The uploader posts one of two JSON shapes:
//!
//! - `{"headers": "<string to sign>"}` for REST (multipart/chunked) requests;
//! - the policy document itself (`{"expiration": ..., "conditions": [...]}`),
//!   or a wrapper `{"policy": {...}}`, for simple uploads.

use serde_json::Value;

use crate::error::{SigningError, SignerResult};
use crate::policy::PolicyDocument;

/// A decoded signing request.
#[derive(Debug, Clone, PartialEq)]
pub enum SigningRequest {
    /// A policy document for a simple upload.
    Policy(PolicyDocument),
    /// A REST string to sign for a multipart upload step.
    Headers(String),
}

impl SigningRequest {
    /// Decode a request from raw body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::EncodingFault`] if the body is not UTF-8 and
    /// [`SigningError::MalformedRequest`] if it is not a recognizable request.
    pub fn from_slice(body: &[u8]) -> SignerResult<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|e| SigningError::EncodingFault(format!("request body: {e}")))?;
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SigningError::malformed(format!("request body is not JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Classify a decoded JSON body.
    pub fn from_value(value: Value) -> SignerResult<Self> {
        let Value::Object(mut body) = value else {
            return Err(SigningError::malformed("request body must be a JSON object"));
        };

        if let Some(headers) = body.remove("headers") {
            return match headers {
                Value::String(headers) => Ok(Self::Headers(headers)),
                _ => Err(SigningError::malformed("headers must be a string")),
            };
        }

        if let Some(policy) = body.remove("policy") {
            return PolicyDocument::from_value(policy).map(Self::Policy);
        }

        Ok(Self::Policy(PolicyDocument::new(body)))
    }

    /// Short label for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Policy(_) => "policy",
            Self::Headers(_) => "headers",
        }
    }
}

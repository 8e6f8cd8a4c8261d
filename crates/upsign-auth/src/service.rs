//! The signing façade.
//!
//! [`SigningService`] owns the process-wide credentials and upload rules and
//! turns a classified [`SigningRequest`] into a [`SigningResult`]:
//!
//! ```text
//! request ──► version (V2 | V4) ──► rules check ──► extract ──► sign ──► result
//! ```
//!
//! Each call is independent and touches no shared mutable state, so one
//! service can be shared across any number of concurrent requests.

use std::fmt;

use serde::Serialize;
use tracing::debug;
use upsign_core::SigningCredentials;

use crate::error::SignerResult;
use crate::request::SigningRequest;
use crate::validation::UploadPolicyRules;
use crate::{sigv2, sigv4};

/// The signature scheme the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureVersion {
    /// HMAC-SHA1, base64 output.
    #[default]
    V2,
    /// Scope-derived HMAC-SHA256, hex output.
    V4,
}

impl SignatureVersion {
    /// Map the transport's `v4=true` flag.
    #[must_use]
    pub fn from_v4_flag(use_v4: bool) -> Self {
        if use_v4 { Self::V4 } else { Self::V2 }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => f.write_str("v2"),
            Self::V4 => f.write_str("v4"),
        }
    }
}

/// A successful signing outcome, serialized as the response body.
///
/// `policy` is present if and only if the request was a policy request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningResult {
    /// The signature (base64 for V2, hex for V4).
    pub signature: String,
    /// The base64 policy the client must upload alongside the signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

impl SigningResult {
    pub(crate) fn for_policy(signature: String, canonical_policy: String) -> Self {
        Self {
            signature,
            policy: Some(canonical_policy),
        }
    }

    pub(crate) fn for_headers(signature: String) -> Self {
        Self {
            signature,
            policy: None,
        }
    }
}

/// Signs upload requests with a fixed set of credentials.
#[derive(Debug, Clone)]
pub struct SigningService {
    credentials: SigningCredentials,
    rules: UploadPolicyRules,
}

impl SigningService {
    /// Create a service that signs every well-formed request.
    #[must_use]
    pub fn new(credentials: SigningCredentials) -> Self {
        Self {
            credentials,
            rules: UploadPolicyRules::permissive(),
        }
    }

    /// Enforce the given upload rules before signing.
    #[must_use]
    pub fn with_rules(mut self, rules: UploadPolicyRules) -> Self {
        self.rules = rules;
        self
    }

    /// The public access key id this service signs for.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        self.credentials.access_key_id()
    }

    /// Sign a request under the requested scheme.
    ///
    /// # Errors
    ///
    /// Returns a [`SigningError`](crate::SigningError) if the request is
    /// malformed, violates the upload rules, or a primitive fails. The error
    /// detail is for logs only.
    pub fn sign(
        &self,
        request: &SigningRequest,
        version: SignatureVersion,
    ) -> SignerResult<SigningResult> {
        debug!(version = %version, kind = request.kind(), "signing upload request");

        let secret = self.credentials.secret_key();

        let result = match request {
            SigningRequest::Policy(policy) => {
                self.rules.check_policy(policy)?;
                match version {
                    SignatureVersion::V2 => sigv2::sign_policy(secret, policy),
                    SignatureVersion::V4 => sigv4::sign_policy(secret, policy),
                }
            }
            SigningRequest::Headers(headers) => {
                self.rules.check_headers(headers, version)?;
                match version {
                    SignatureVersion::V2 => sigv2::sign_headers(secret, headers),
                    SignatureVersion::V4 => sigv4::sign_headers(secret, headers),
                }
            }
        };

        if let Err(err) = &result {
            debug!(version = %version, error = %err, "signing failed");
        }

        result
    }
}

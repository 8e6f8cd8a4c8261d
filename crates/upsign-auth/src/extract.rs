//! Extraction of signing inputs from client payloads.
//!
//! Two textual protocols carry a credential scope:
//!
//! - a policy document, whose `x-amz-credential` condition holds
//!   `<access-key>/<scope>`;
//! - a REST string to sign, laid out as
//!
//! ```text
//! <algorithm>\n
//! <timestamp>\n
//! <date>/<region>/s3/aws4_request\n
//! <canonical request ...>
//! ```
//!
//! Both delegate to [`CredentialScope`] for the scope grammar.

use crate::error::{SigningError, SignerResult};
use crate::hasher::sha256_hex;
use crate::policy::PolicyDocument;
use crate::scope::CredentialScope;

/// Extract the credential scope from a policy's `x-amz-credential` condition.
pub fn policy_scope(policy: &PolicyDocument) -> SignerResult<CredentialScope> {
    CredentialScope::parse_credential(policy.credential_condition()?)
}

/// A REST string to sign, split around its credential scope line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderScope<'a> {
    /// The scope from the third line.
    pub scope: CredentialScope,
    /// Everything up to and including the scope line's newline.
    preamble: &'a str,
    /// Everything after the scope line, verbatim.
    canonical_request: &'a str,
}

impl<'a> HeaderScope<'a> {
    /// Split a REST string to sign into preamble, scope, and canonical request.
    ///
    /// # Examples
    ///
    /// ```
    /// use upsign_auth::extract::HeaderScope;
    ///
    /// let headers = "AWS4-HMAC-SHA256\n20130524T000000Z\n20130524/us-east-1/s3/aws4_request\nPUT\n/key";
    /// let parsed = HeaderScope::parse(headers).unwrap();
    /// assert_eq!(parsed.scope.region, "us-east-1");
    /// assert_eq!(parsed.canonical_request(), "PUT\n/key");
    /// ```
    pub fn parse(headers: &'a str) -> SignerResult<Self> {
        let mut lines = headers.splitn(4, '\n');

        let algorithm = lines.next().unwrap_or_default();
        let timestamp = lines
            .next()
            .ok_or_else(|| SigningError::malformed("string to sign has no timestamp line"))?;
        let scope_line = lines
            .next()
            .ok_or_else(|| SigningError::malformed("string to sign has no scope line"))?;
        let canonical_request = lines
            .next()
            .filter(|body| !body.is_empty())
            .ok_or_else(|| SigningError::malformed("string to sign has no canonical request"))?;

        if algorithm.is_empty() || timestamp.is_empty() {
            return Err(SigningError::malformed(
                "string to sign has an empty algorithm or timestamp line",
            ));
        }

        let scope = CredentialScope::parse(scope_line)?;
        let preamble_len = headers.len() - canonical_request.len();

        Ok(Self {
            scope,
            preamble: &headers[..preamble_len],
            canonical_request,
        })
    }

    /// The canonical request body following the scope line.
    #[must_use]
    pub fn canonical_request(&self) -> &'a str {
        self.canonical_request
    }

    /// The preamble with the canonical request replaced by its SHA-256 hex digest.
    #[must_use]
    pub fn string_to_sign(&self) -> String {
        format!("{}{}", self.preamble, sha256_hex(self.canonical_request))
    }
}

//! Credential scope grammar.
//!
//! Both extraction paths (the policy's `x-amz-credential` condition and the
//! third line of a REST string to sign) accept exactly the same scope:
//!
//! ```text
//! <date:8 digits>/<region>/s3/aws4_request
//! ```
//!
//! [`CredentialScope::parse`] is the single validator for that grammar.

use std::fmt;

use crate::error::{SigningError, SignerResult};
use crate::hasher::{SCOPE_TERMINATOR, SERVICE};

/// The date and region a SigV4 signature is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialScope {
    /// The signing date (`YYYYMMDD`).
    pub date: String,
    /// The region, e.g. `us-east-1`.
    pub region: String,
}

impl CredentialScope {
    /// Parse a bare scope: `<date>/<region>/s3/aws4_request`.
    ///
    /// # Examples
    ///
    /// ```
    /// use upsign_auth::scope::CredentialScope;
    ///
    /// let scope = CredentialScope::parse("20130524/us-east-1/s3/aws4_request").unwrap();
    /// assert_eq!(scope.date, "20130524");
    /// assert_eq!(scope.region, "us-east-1");
    /// ```
    pub fn parse(scope: &str) -> SignerResult<Self> {
        let parts: Vec<&str> = scope.split('/').collect();
        let [date, region, service, terminator] = parts.as_slice() else {
            return Err(SigningError::malformed("credential scope must have four components"));
        };

        if *service != SERVICE || *terminator != SCOPE_TERMINATOR {
            return Err(SigningError::malformed(
                "credential scope must end with /s3/aws4_request",
            ));
        }
        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SigningError::malformed("credential scope date must be YYYYMMDD"));
        }
        if region.is_empty() {
            return Err(SigningError::malformed("credential scope region is empty"));
        }

        Ok(Self {
            date: (*date).to_owned(),
            region: (*region).to_owned(),
        })
    }

    /// Parse a full credential: `<access-key>/<date>/<region>/s3/aws4_request`.
    ///
    /// The access key is validated as non-empty and then discarded.
    pub fn parse_credential(credential: &str) -> SignerResult<Self> {
        let (access_key, scope) = credential
            .split_once('/')
            .ok_or_else(|| SigningError::malformed("credential has no scope"))?;

        if access_key.is_empty() {
            return Err(SigningError::malformed("credential access key is empty"));
        }

        Self::parse(scope)
    }
}

impl fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{SERVICE}/{SCOPE_TERMINATOR}",
            self.date, self.region
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_credential_condition_value() {
        let scope =
            CredentialScope::parse_credential("AKIDEXAMPLE/20130524/us-east-1/s3/aws4_request")
                .unwrap();
        assert_eq!(scope.date, "20130524");
        assert_eq!(scope.region, "us-east-1");
    }

    #[test]
    fn test_should_reject_credential_without_service_suffix() {
        let result = CredentialScope::parse_credential("AKIDEXAMPLE/20130524/us-east-1");
        assert!(matches!(result, Err(SigningError::MalformedRequest(_))));
    }

    #[test]
    fn test_should_reject_wrong_service() {
        let result =
            CredentialScope::parse_credential("AKIDEXAMPLE/20130524/us-east-1/iam/aws4_request");
        assert!(matches!(result, Err(SigningError::MalformedRequest(_))));
    }

    #[test]
    fn test_should_reject_non_numeric_or_short_date() {
        for scope in [
            "2013052/us-east-1/s3/aws4_request",
            "201305245/us-east-1/s3/aws4_request",
            "2013O524/us-east-1/s3/aws4_request",
        ] {
            assert!(
                CredentialScope::parse(scope).is_err(),
                "should reject {scope}"
            );
        }
    }

    #[test]
    fn test_should_reject_empty_region_or_access_key() {
        assert!(CredentialScope::parse("20130524//s3/aws4_request").is_err());
        assert!(CredentialScope::parse_credential("/20130524/us-east-1/s3/aws4_request").is_err());
    }

    #[test]
    fn test_should_reject_region_containing_slash() {
        let result = CredentialScope::parse("20130524/us/east/s3/aws4_request");
        assert!(result.is_err());
    }

    #[test]
    fn test_should_accept_same_scope_on_both_paths() {
        let bare = CredentialScope::parse("20130524/eu-west-1/s3/aws4_request").unwrap();
        let full =
            CredentialScope::parse_credential("AKID/20130524/eu-west-1/s3/aws4_request").unwrap();
        assert_eq!(bare, full);
    }

    #[test]
    fn test_should_render_scope() {
        let scope = CredentialScope::parse("20130524/us-east-1/s3/aws4_request").unwrap();
        assert_eq!(scope.to_string(), "20130524/us-east-1/s3/aws4_request");
    }
}

//! Upload rule enforcement.
//!
//! A signed policy is a bearer credential for an upload, so the signer can
//! refuse to sign policies that target an unexpected bucket or declare an
//! unexpected size range. With no rules configured every well-formed request
//! is signed.

use serde_json::Value;
use tracing::warn;

use crate::error::{SigningError, SignerResult};
use crate::extract::HeaderScope;
use crate::policy::PolicyDocument;
use crate::service::SignatureVersion;

/// Rules a policy or REST request must satisfy before it is signed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPolicyRules {
    /// The bucket every upload must target.
    pub expected_bucket: Option<String>,
    /// The exact `content-length-range` (min, max) a policy must declare.
    pub size_range: Option<(u64, u64)>,
}

impl UploadPolicyRules {
    /// Rules that accept everything.
    #[must_use]
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Build rules from the service configuration.
    #[must_use]
    pub fn from_config(config: &upsign_core::UpsignConfig) -> Self {
        Self {
            expected_bucket: config.expected_bucket.clone(),
            size_range: config.expected_size_range(),
        }
    }

    /// Whether any rule is configured.
    #[must_use]
    pub fn is_enforcing(&self) -> bool {
        self.expected_bucket.is_some() || self.size_range.is_some()
    }

    /// Check a policy document's bucket and size range conditions.
    pub fn check_policy(&self, policy: &PolicyDocument) -> SignerResult<()> {
        if !self.is_enforcing() {
            return Ok(());
        }

        let conditions = policy.conditions()?;

        if let Some(expected) = &self.expected_bucket {
            let bucket = conditions.iter().find_map(bucket_condition);
            if bucket != Some(expected.as_str()) {
                warn!(expected = %expected, actual = ?bucket, "policy targets unexpected bucket");
                return Err(SigningError::rejected("policy bucket does not match"));
            }
        }

        if let Some(expected) = self.size_range {
            let range = conditions.iter().find_map(content_length_range);
            if range != Some(expected) {
                warn!(expected = ?expected, actual = ?range, "policy declares unexpected size range");
                return Err(SigningError::rejected("policy size range does not match"));
            }
        }

        Ok(())
    }

    /// Check that a REST string to sign targets the expected bucket.
    ///
    /// Only the lines that decide where the request goes are inspected, never
    /// client-chosen header values:
    ///
    /// - V2: the last line, the canonicalized resource `/<bucket>/<key>`;
    /// - V4: the canonical URI (path style) or the `host:` canonical header
    ///   (virtual-host style).
    pub fn check_headers(&self, headers: &str, version: SignatureVersion) -> SignerResult<()> {
        let Some(bucket) = &self.expected_bucket else {
            return Ok(());
        };

        let targets_bucket = match version {
            SignatureVersion::V2 => {
                let resource = headers.rsplit('\n').next().unwrap_or_default();
                is_bucket_path(resource, bucket)
            }
            SignatureVersion::V4 => {
                let parsed = HeaderScope::parse(headers)?;
                targets_bucket_v4(parsed.canonical_request(), bucket)
            }
        };

        if targets_bucket {
            Ok(())
        } else {
            warn!(expected = %bucket, version = %version, "REST request targets unexpected bucket");
            Err(SigningError::rejected("request bucket does not match"))
        }
    }
}

/// `/<bucket>/` followed by at least one key character.
fn is_bucket_path(path: &str, bucket: &str) -> bool {
    path.strip_prefix('/')
        .and_then(|rest| rest.strip_prefix(bucket))
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|key| !key.is_empty())
}

/// A canonical request is `method`, `uri`, `query`, then one header per line
/// up to a blank line. A request naming more than one host is refused.
fn targets_bucket_v4(canonical_request: &str, bucket: &str) -> bool {
    let mut lines = canonical_request.split('\n');
    let _method = lines.next();
    let uri = lines.next().unwrap_or_default();
    let _query = lines.next();

    let hosts: Vec<&str> = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.strip_prefix("host:"))
        .collect();

    match hosts.as_slice() {
        [] => is_bucket_path(uri, bucket),
        [host] => {
            let host = host.trim();
            if host.strip_prefix(bucket).is_some_and(|rest| rest.starts_with('.')) {
                true
            } else {
                !names_bucket(host) && is_bucket_path(uri, bucket)
            }
        }
        _ => false,
    }
}

/// Whether a host is virtual-host style, i.e. `<bucket>.s3.<...>` or
/// `<bucket>.s3-<region>.<...>`.
fn names_bucket(host: &str) -> bool {
    host.contains(".s3.") || host.contains(".s3-")
}

/// `{"bucket": "<name>"}` or `["eq", "$bucket", "<name>"]`.
fn bucket_condition(condition: &Value) -> Option<&str> {
    match condition {
        Value::Object(map) => map.get("bucket").and_then(Value::as_str),
        Value::Array(items) => match items.as_slice() {
            [op, field, value] if op.as_str() == Some("eq") && field.as_str() == Some("$bucket") => {
                value.as_str()
            }
            _ => None,
        },
        _ => None,
    }
}

/// `["content-length-range", <min>, <max>]` with string or numeric bounds.
fn content_length_range(condition: &Value) -> Option<(u64, u64)> {
    let [name, min, max] = condition.as_array()?.as_slice() else {
        return None;
    };
    if name.as_str() != Some("content-length-range") {
        return None;
    }
    Some((as_size(min)?, as_size(max)?))
}

fn as_size(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

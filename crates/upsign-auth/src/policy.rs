//! Policy document handling.
//!
//! A policy document is the JSON object a browser uploader sends for simple
//! (non-chunked) uploads. The exact bytes that get signed are the base64 of
//! its compact JSON text, with object keys kept in the order they arrived
//! and number literals kept exactly as written.
//! That same base64 string is returned to the client, which must attach it
//! verbatim to the upload form.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value};

use crate::error::{SigningError, SignerResult};

/// The condition key that carries the SigV4 credential.
pub const CREDENTIAL_CONDITION: &str = "x-amz-credential";

/// A client-submitted upload policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDocument {
    document: Map<String, Value>,
}

impl PolicyDocument {
    /// Wrap a decoded JSON object.
    #[must_use]
    pub fn new(document: Map<String, Value>) -> Self {
        Self { document }
    }

    /// Wrap a decoded JSON value, which must be an object.
    pub fn from_value(value: Value) -> SignerResult<Self> {
        match value {
            Value::Object(document) => Ok(Self::new(document)),
            _ => Err(SigningError::malformed("policy document must be a JSON object")),
        }
    }

    /// The `conditions` list.
    pub fn conditions(&self) -> SignerResult<&[Value]> {
        self.document
            .get("conditions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| SigningError::malformed("policy has no conditions list"))
    }

    /// The value of the single `x-amz-credential` condition.
    ///
    /// Array-form conditions are skipped. A policy carrying the condition
    /// twice is rejected, since the signer could not tell which scope the
    /// storage service will honour.
    pub fn credential_condition(&self) -> SignerResult<&str> {
        let mut found = None;

        for condition in self.conditions()? {
            let Some(value) = condition.get(CREDENTIAL_CONDITION) else {
                continue;
            };
            if found.is_some() {
                return Err(SigningError::malformed(
                    "policy has more than one x-amz-credential condition",
                ));
            }
            let value = value
                .as_str()
                .ok_or_else(|| SigningError::malformed("x-amz-credential must be a string"))?;
            found = Some(value);
        }

        found.ok_or_else(|| SigningError::malformed("policy has no x-amz-credential condition"))
    }

    /// Serialize to compact JSON and base64-encode it.
    ///
    /// # Examples
    ///
    /// ```
    /// use upsign_auth::policy::PolicyDocument;
    ///
    /// let policy = PolicyDocument::from_value(serde_json::json!({"b": 1, "a": 2})).unwrap();
    /// // {"b":1,"a":2}
    /// assert_eq!(policy.canonicalize().unwrap(), "eyJiIjoxLCJhIjoyfQ==");
    /// ```
    pub fn canonicalize(&self) -> SignerResult<String> {
        let text = serde_json::to_string(&self.document)
            .map_err(|e| SigningError::EncodingFault(format!("policy serialization: {e}")))?;
        Ok(BASE64.encode(text.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn policy_from_text(text: &str) -> PolicyDocument {
        PolicyDocument::from_value(serde_json::from_str(text).unwrap()).unwrap()
    }

    #[test]
    fn test_should_keep_field_order_from_input() {
        let text = r#"{"expiration":"2026-10-20T12:00:00.000Z","conditions":[{"acl":"private"},{"bucket":"b"}]}"#;
        let policy = policy_from_text(text);
        let decoded = BASE64.decode(policy.canonicalize().unwrap()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), text);
    }

    #[test]
    fn test_should_compact_whitespace() {
        let policy = policy_from_text("{ \"z\" : 1,\n  \"a\" : [ 1, 2 ] }");
        let decoded = BASE64.decode(policy.canonicalize().unwrap()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), r#"{"z":1,"a":[1,2]}"#);
    }

    #[test]
    fn test_should_keep_number_literals_as_sent() {
        let text = r#"{"conditions":[["content-length-range",0,1e7],{"x":1.50},{"y":-0.0}]}"#;
        let policy = policy_from_text(text);
        let decoded = BASE64.decode(policy.canonicalize().unwrap()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), text);
    }

    #[test]
    fn test_should_reject_non_object_document() {
        let result = PolicyDocument::from_value(json!(["not", "an", "object"]));
        assert!(matches!(result, Err(SigningError::MalformedRequest(_))));
    }

    #[test]
    fn test_should_find_credential_condition_among_mixed_conditions() {
        let policy = PolicyDocument::from_value(json!({
            "conditions": [
                ["content-length-range", "0", "100"],
                {"bucket": "b"},
                {"x-amz-credential": "AKID/20130524/us-east-1/s3/aws4_request"}
            ]
        }))
        .unwrap();

        assert_eq!(
            policy.credential_condition().unwrap(),
            "AKID/20130524/us-east-1/s3/aws4_request"
        );
    }

    #[test]
    fn test_should_fail_without_credential_condition() {
        let policy = PolicyDocument::from_value(json!({"conditions": [{"bucket": "b"}]})).unwrap();
        assert!(matches!(
            policy.credential_condition(),
            Err(SigningError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_should_fail_without_conditions_list() {
        let policy = PolicyDocument::from_value(json!({"expiration": "x"})).unwrap();
        assert!(policy.conditions().is_err());
        assert!(policy.credential_condition().is_err());
    }

    #[test]
    fn test_should_reject_duplicate_or_non_string_credential() {
        let duplicated = PolicyDocument::from_value(json!({
            "conditions": [
                {"x-amz-credential": "A/20130524/us-east-1/s3/aws4_request"},
                {"x-amz-credential": "A/20130524/eu-west-1/s3/aws4_request"}
            ]
        }))
        .unwrap();
        assert!(duplicated.credential_condition().is_err());

        let numeric =
            PolicyDocument::from_value(json!({"conditions": [{"x-amz-credential": 42}]})).unwrap();
        assert!(numeric.credential_condition().is_err());
    }
}

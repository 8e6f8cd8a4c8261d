//! Response construction.
//!
//! Signing failures are deliberately uninformative: a rejected policy gets
//! `400 {"invalid":true}`, everything else an empty `500`. The error detail
//! only reaches the server log.

use serde::Serialize;
use upsign_auth::SigningError;

use crate::body::UpsignResponseBody;

/// Content type for JSON responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Build a JSON response with the given status.
///
/// Falls back to an empty `500` if the value cannot be serialized.
#[must_use]
pub fn json_response<T: Serialize>(
    status: http::StatusCode,
    value: &T,
) -> http::Response<UpsignResponseBody> {
    let Ok(json) = serde_json::to_vec(value) else {
        return empty_response(http::StatusCode::INTERNAL_SERVER_ERROR);
    };

    http::Response::builder()
        .status(status)
        .header("content-type", CONTENT_TYPE)
        .body(UpsignResponseBody::from_bytes(json))
        .expect("valid JSON response")
}

/// Build a response with no body.
#[must_use]
pub fn empty_response(status: http::StatusCode) -> http::Response<UpsignResponseBody> {
    http::Response::builder()
        .status(status)
        .body(UpsignResponseBody::empty())
        .expect("valid empty response")
}

/// Map a signing failure to its client-facing response.
#[must_use]
pub fn signing_error_response(error: &SigningError) -> http::Response<UpsignResponseBody> {
    match error {
        SigningError::PolicyRejected(_) => json_response(
            http::StatusCode::BAD_REQUEST,
            &serde_json::json!({ "invalid": true }),
        ),
        SigningError::MalformedRequest(_)
        | SigningError::CryptoFault(_)
        | SigningError::EncodingFault(_) => {
            empty_response(http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Build a `{"error": "..."}` response.
#[must_use]
pub fn error_message_response(
    status: http::StatusCode,
    message: &str,
) -> http::Response<UpsignResponseBody> {
    json_response(status, &serde_json::json!({ "error": message }))
}

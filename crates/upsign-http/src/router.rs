//! Upsign request router.
//!
//! Paths are matched by suffix so the endpoint can sit behind any prefix:
//!
//! ```text
//! POST    .../s3/signature[?v4=true]   sign a policy or REST request
//! POST    .../s3/success               upload completion notification
//! DELETE  .../s3/...?bucket=&key=      delete an uploaded object
//! GET     /health                      liveness
//! OPTIONS *                            CORS preflight
//! ```

use std::borrow::Cow;

/// A resolved endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Sign a policy document or REST string to sign.
    Signature,
    /// The uploader reports a finished upload.
    UploadSuccess,
    /// Delete an uploaded object.
    DeleteObject,
    /// Liveness check.
    Health,
    /// CORS preflight.
    Preflight,
}

/// Resolve the route for a method and path, or `None` if nothing matches.
#[must_use]
pub fn resolve_route(method: &http::Method, path: &str) -> Option<Route> {
    let path = path.trim_end_matches('/');

    if method == http::Method::OPTIONS {
        Some(Route::Preflight)
    } else if method == http::Method::POST && path.ends_with("/s3/signature") {
        Some(Route::Signature)
    } else if method == http::Method::POST && path.ends_with("/s3/success") {
        Some(Route::UploadSuccess)
    } else if method == http::Method::DELETE && (path.ends_with("/s3") || path.contains("/s3/")) {
        Some(Route::DeleteObject)
    } else if method == http::Method::GET && path == "/health" {
        Some(Route::Health)
    } else {
        None
    }
}

/// Look up a parameter in an urlencoded string (query or form body).
#[must_use]
pub fn form_param<'a>(encoded: &'a [u8], name: &str) -> Option<Cow<'a, str>> {
    form_urlencoded::parse(encoded)
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

/// Whether the query string asks for SigV4 (`v4=true`).
#[must_use]
pub fn wants_v4(query: Option<&str>) -> bool {
    query
        .and_then(|q| form_param(q.as_bytes(), "v4"))
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

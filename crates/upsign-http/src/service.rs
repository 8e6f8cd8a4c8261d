//! Upsign HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use tracing::debug;

use crate::body::UpsignResponseBody;
use crate::handler::UpsignHandler;
use crate::response::empty_response;

/// Hyper `Service` implementation for the upload signing endpoint.
///
/// Cloning is cheap; all clones share one [`UpsignHandler`].
#[derive(Debug, Clone)]
pub struct UpsignHttpService {
    handler: Arc<UpsignHandler>,
}

impl UpsignHttpService {
    /// Create a new `UpsignHttpService`.
    #[must_use]
    pub fn new(handler: UpsignHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl hyper::service::Service<http::Request<Incoming>> for UpsignHttpService {
    type Response = http::Response<UpsignResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let (parts, incoming) = req.into_parts();
            debug!(
                request_id = %request_id,
                method = %parts.method,
                path = parts.uri.path(),
                "handling request"
            );

            let response = match collect_body(incoming, handler.config().max_body_bytes).await {
                Ok(body) => handler.handle(&parts, body).await,
                Err(status) => empty_response(status),
            };

            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Collect the incoming body, refusing anything over `limit` bytes.
async fn collect_body(incoming: Incoming, limit: usize) -> Result<Bytes, http::StatusCode> {
    Limited::new(incoming, limit)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                http::StatusCode::PAYLOAD_TOO_LARGE
            } else {
                debug!(error = %e, "failed to read request body");
                http::StatusCode::BAD_REQUEST
            }
        })
}

/// Add common response headers to every response.
pub fn add_common_headers(
    mut response: http::Response<UpsignResponseBody>,
    request_id: &str,
) -> http::Response<UpsignResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-request-id").or_insert(hv);
    }

    headers.insert("server", http::HeaderValue::from_static("Upsign"));

    // CORS headers.
    headers.insert(
        "access-control-allow-origin",
        http::HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-methods",
        http::HeaderValue::from_static("POST, DELETE, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        http::HeaderValue::from_static("Content-Type, Cache-Control, X-Requested-With"),
    );

    response
}

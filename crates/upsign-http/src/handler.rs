//! Endpoint handlers.
//!
//! [`UpsignHandler`] owns the signing service and the optional object store
//! and turns a routed request into a response. It works on already-collected
//! request parts and body bytes, so it is independent of the connection layer.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info, warn};
use upsign_auth::{SignatureVersion, SigningRequest, SigningService};

use crate::body::UpsignResponseBody;
use crate::response::{
    empty_response, error_message_response, json_response, signing_error_response,
};
use crate::router::{Route, form_param, resolve_route, wants_v4};
use crate::store::ObjectStore;

/// Server version reported by the health endpoint.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Endpoint behaviour switches.
#[derive(Debug, Clone)]
pub struct UpsignHttpConfig {
    /// Whether `DELETE` requests are served.
    pub enable_delete: bool,
    /// Uploads larger than this are deleted when the uploader reports success.
    pub max_upload_size: Option<u64>,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for UpsignHttpConfig {
    fn default() -> Self {
        Self {
            enable_delete: true,
            max_upload_size: None,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Request handler for every Upsign endpoint.
pub struct UpsignHandler {
    signer: SigningService,
    store: Option<Arc<dyn ObjectStore>>,
    config: UpsignHttpConfig,
}

impl std::fmt::Debug for UpsignHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpsignHandler")
            .field("signer", &self.signer)
            .field("store", &self.store.as_ref().map(|_| "..."))
            .field("config", &self.config)
            .finish()
    }
}

impl UpsignHandler {
    /// Create a handler without an object store.
    #[must_use]
    pub fn new(signer: SigningService, config: UpsignHttpConfig) -> Self {
        Self {
            signer,
            store: None,
            config,
        }
    }

    /// Attach the object store used for deletes and size checks.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &UpsignHttpConfig {
        &self.config
    }

    /// Route and handle one request.
    pub async fn handle(
        &self,
        parts: &http::request::Parts,
        body: Bytes,
    ) -> http::Response<UpsignResponseBody> {
        let Some(route) = resolve_route(&parts.method, parts.uri.path()) else {
            return empty_response(http::StatusCode::NOT_FOUND);
        };

        match route {
            Route::Signature => self.sign(parts.uri.query(), &body),
            Route::UploadSuccess => self.upload_success(parts.uri.query(), &body).await,
            Route::DeleteObject => self.delete_object(parts.uri.query()).await,
            Route::Health => json_response(
                http::StatusCode::OK,
                &serde_json::json!({ "status": "running", "version": VERSION }),
            ),
            Route::Preflight => empty_response(http::StatusCode::OK),
        }
    }

    fn sign(&self, query: Option<&str>, body: &[u8]) -> http::Response<UpsignResponseBody> {
        let version = SignatureVersion::from_v4_flag(wants_v4(query));

        let outcome =
            SigningRequest::from_slice(body).and_then(|request| self.signer.sign(&request, version));

        match outcome {
            Ok(result) => json_response(http::StatusCode::OK, &result),
            Err(err) => {
                warn!(version = %version, error = %err, "refusing to sign request");
                signing_error_response(&err)
            }
        }
    }

    async fn upload_success(
        &self,
        query: Option<&str>,
        body: &[u8],
    ) -> http::Response<UpsignResponseBody> {
        let query = query.unwrap_or_default().as_bytes();
        let param = |name: &str| {
            form_param(body, name)
                .or_else(|| form_param(query, name))
                .map(|v| v.into_owned())
        };

        let bucket = param("bucket");
        let key = param("key");

        info!(
            bucket = bucket.as_deref().unwrap_or_default(),
            key = key.as_deref().unwrap_or_default(),
            uuid = param("uuid").as_deref().unwrap_or_default(),
            name = param("name").as_deref().unwrap_or_default(),
            "upload successfully sent to S3"
        );

        let (Some(max_size), Some(store)) = (self.config.max_upload_size, &self.store) else {
            return empty_response(http::StatusCode::OK);
        };
        let (Some(bucket), Some(key)) = (bucket, key) else {
            return error_message_response(http::StatusCode::BAD_REQUEST, "Missing bucket or key");
        };

        match store.object_size(&bucket, &key).await {
            Ok(size) if size > max_size => {
                warn!(bucket = %bucket, key = %key, size, max_size, "uploaded object too big, deleting");
                if let Err(err) = store.delete_object(&bucket, &key).await {
                    error!(bucket = %bucket, key = %key, error = %err, "could not delete oversized object");
                }
                error_message_response(http::StatusCode::BAD_REQUEST, "Too big!")
            }
            Ok(_) => empty_response(http::StatusCode::OK),
            Err(err) => {
                error!(bucket = %bucket, key = %key, error = %err, "problem querying object store");
                error_message_response(
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Problem querying S3!",
                )
            }
        }
    }

    async fn delete_object(&self, query: Option<&str>) -> http::Response<UpsignResponseBody> {
        if !self.config.enable_delete {
            return empty_response(http::StatusCode::METHOD_NOT_ALLOWED);
        }

        let query = query.unwrap_or_default().as_bytes();
        let (Some(bucket), Some(key)) = (form_param(query, "bucket"), form_param(query, "key"))
        else {
            return empty_response(http::StatusCode::BAD_REQUEST);
        };

        let Some(store) = &self.store else {
            error!("delete requested but no object store is configured");
            return empty_response(http::StatusCode::INTERNAL_SERVER_ERROR);
        };

        match store.delete_object(&bucket, &key).await {
            Ok(()) => {
                info!(bucket = %bucket, key = %key, "deleted object");
                empty_response(http::StatusCode::OK)
            }
            Err(err) => {
                error!(bucket = %bucket, key = %key, error = %err, "problem deleting object");
                empty_response(http::StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use upsign_auth::UploadPolicyRules;
    use upsign_core::{SecretKey, SigningCredentials};

    use super::*;
    use crate::store::MemoryObjectStore;

    const TEST_SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";

    const POLICY_TEXT: &str = r#"{"expiration":"2026-10-20T12:00:00.000Z","conditions":[{"acl":"private"},{"bucket":"fineuploadertest"},{"x-amz-credential":"AKIDEXAMPLE/20130524/us-east-1/s3/aws4_request"},{"x-amz-algorithm":"AWS4-HMAC-SHA256"},["content-length-range","0","15000000"]]}"#;

    const POLICY_BASE64: &str = "eyJleHBpcmF0aW9uIjoiMjAyNi0xMC0yMFQxMjowMDowMC4wMDBaIiwiY29uZGl0aW9ucyI6W3siYWNsIjoicHJpdmF0ZSJ9LHsiYnVja2V0IjoiZmluZXVwbG9hZGVydGVzdCJ9LHsieC1hbXotY3JlZGVudGlhbCI6IkFLSURFWEFNUExFLzIwMTMwNTI0L3VzLWVhc3QtMS9zMy9hd3M0X3JlcXVlc3QifSx7IngtYW16LWFsZ29yaXRobSI6IkFXUzQtSE1BQy1TSEEyNTYifSxbImNvbnRlbnQtbGVuZ3RoLXJhbmdlIiwiMCIsIjE1MDAwMDAwIl1dfQ==";

    fn signer() -> SigningService {
        SigningService::new(SigningCredentials::new(
            "AKIDEXAMPLE",
            SecretKey::new(TEST_SECRET_KEY),
        ))
    }

    fn handler() -> UpsignHandler {
        UpsignHandler::new(signer(), UpsignHttpConfig::default())
    }

    fn parts(method: http::Method, uri: &str) -> http::request::Parts {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    async fn body_json(resp: http::Response<UpsignResponseBody>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_should_sign_v2_policy() {
        let resp = handler()
            .handle(
                &parts(http::Method::POST, "/s3/signature"),
                Bytes::from_static(POLICY_TEXT.as_bytes()),
            )
            .await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["policy"], POLICY_BASE64);
        assert_eq!(json["signature"], "sn3xTZ6p2Fjzfs6Sbn1gU+9yymI=");
    }

    #[tokio::test]
    async fn test_should_sign_v4_policy_when_flag_set() {
        let resp = handler()
            .handle(
                &parts(http::Method::POST, "/s3/signature?v4=true"),
                Bytes::from_static(POLICY_TEXT.as_bytes()),
            )
            .await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["policy"], POLICY_BASE64);
        assert_eq!(
            json["signature"],
            "1338703c83ac6b25f831407f258be8ae000d15c7c28c1948745194bf17a0adc1"
        );
    }

    #[tokio::test]
    async fn test_should_sign_headers_without_policy_field() {
        let body = serde_json::to_vec(&serde_json::json!({
            "headers": "POST\n\n\n\nx-amz-date:Tue, 20 Oct 2026 10:00:00 GMT\n/fineuploadertest/uploads/photo.jpg?uploads"
        }))
        .unwrap();

        let resp = handler()
            .handle(&parts(http::Method::POST, "/s3/signature"), Bytes::from(body))
            .await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({"signature": "6X8bO0PC3TwBCUo9lAVxknSsICw="}));
    }

    #[tokio::test]
    async fn test_should_fail_with_empty_500_on_malformed_request() {
        let resp = handler()
            .handle(
                &parts(http::Method::POST, "/s3/signature?v4=true"),
                Bytes::from_static(b"{\"expiration\":\"2026-10-20\"}"),
            )
            .await;

        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_should_flag_policy_for_wrong_bucket_as_invalid() {
        let signer = signer().with_rules(UploadPolicyRules {
            expected_bucket: Some("another-bucket".to_owned()),
            size_range: None,
        });
        let handler = UpsignHandler::new(signer, UpsignHttpConfig::default());

        let resp = handler
            .handle(
                &parts(http::Method::POST, "/s3/signature"),
                Bytes::from_static(POLICY_TEXT.as_bytes()),
            )
            .await;

        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, serde_json::json!({"invalid": true}));
    }

    #[tokio::test]
    async fn test_should_delete_object_from_store() {
        let store = Arc::new(MemoryObjectStore::new());
        store.insert("fineuploadertest", "uploads/photo.jpg", 10);
        let handler = handler().with_store(store.clone());

        let resp = handler
            .handle(
                &parts(
                    http::Method::DELETE,
                    "/s3/uuid-1?bucket=fineuploadertest&key=uploads%2Fphoto.jpg",
                ),
                Bytes::new(),
            )
            .await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert!(!store.contains("fineuploadertest", "uploads/photo.jpg"));
    }

    #[tokio::test]
    async fn test_should_fail_delete_of_missing_object() {
        let handler = handler().with_store(Arc::new(MemoryObjectStore::new()));
        let resp = handler
            .handle(&parts(http::Method::DELETE, "/s3/x?bucket=b&key=k"), Bytes::new())
            .await;
        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_should_reject_delete_without_params_or_when_disabled() {
        let handler = handler().with_store(Arc::new(MemoryObjectStore::new()));
        let resp = handler
            .handle(&parts(http::Method::DELETE, "/s3/x?bucket=b"), Bytes::new())
            .await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);

        let disabled = UpsignHandler::new(
            signer(),
            UpsignHttpConfig {
                enable_delete: false,
                ..UpsignHttpConfig::default()
            },
        );
        let resp = disabled
            .handle(&parts(http::Method::DELETE, "/s3/x?bucket=b&key=k"), Bytes::new())
            .await;
        assert_eq!(resp.status(), http::StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_should_accept_success_notification() {
        let resp = handler()
            .handle(
                &parts(http::Method::POST, "/s3/success"),
                Bytes::from_static(b"key=k&uuid=u&bucket=b&name=photo.jpg"),
            )
            .await;
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_delete_oversized_upload_on_success() {
        let store = Arc::new(MemoryObjectStore::new());
        store.insert("b", "big", 2_000);
        store.insert("b", "small", 10);
        let handler = UpsignHandler::new(
            signer(),
            UpsignHttpConfig {
                max_upload_size: Some(1_000),
                ..UpsignHttpConfig::default()
            },
        )
        .with_store(store.clone());

        let resp = handler
            .handle(
                &parts(http::Method::POST, "/s3/success"),
                Bytes::from_static(b"key=big&bucket=b"),
            )
            .await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, serde_json::json!({"error": "Too big!"}));
        assert!(!store.contains("b", "big"));

        let resp = handler
            .handle(
                &parts(http::Method::POST, "/s3/success?key=small&bucket=b"),
                Bytes::new(),
            )
            .await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert!(store.contains("b", "small"));
    }

    #[tokio::test]
    async fn test_should_report_store_failure_on_success_check() {
        let handler = UpsignHandler::new(
            signer(),
            UpsignHttpConfig {
                max_upload_size: Some(1_000),
                ..UpsignHttpConfig::default()
            },
        )
        .with_store(Arc::new(MemoryObjectStore::new()));

        let resp = handler
            .handle(
                &parts(http::Method::POST, "/s3/success"),
                Bytes::from_static(b"key=missing&bucket=b"),
            )
            .await;
        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"error": "Problem querying S3!"})
        );
    }

    #[tokio::test]
    async fn test_should_answer_health_and_unknown_routes() {
        let resp = handler()
            .handle(&parts(http::Method::GET, "/health"), Bytes::new())
            .await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "running");

        let resp = handler()
            .handle(&parts(http::Method::GET, "/nope"), Bytes::new())
            .await;
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
    }
}

//! S3-backed [`ObjectStore`].

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use upsign_core::{SigningCredentials, UpsignConfig};
use upsign_http::{ObjectStore, StoreError, StoreFuture};

/// Deletes and inspects uploaded objects through the S3 API.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Build a client from the server's own key pair and the configured
    /// region and endpoint.
    #[must_use]
    pub fn new(config: &UpsignConfig, credentials: &SigningCredentials) -> Self {
        let creds = Credentials::new(
            credentials.access_key_id(),
            credentials.secret_key().expose(),
            None,
            None,
            "upsign",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.default_region.clone()))
            .credentials_provider(creds);

        if let Some(endpoint) = &config.s3_endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        }
    }
}

impl ObjectStore for S3ObjectStore {
    fn delete_object<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| StoreError::Backend(DisplayErrorContext(&e).to_string()))
        })
    }

    fn object_size<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            let output = self
                .client
                .head_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                        StoreError::NotFound {
                            bucket: bucket.to_owned(),
                            key: key.to_owned(),
                        }
                    } else {
                        StoreError::Backend(DisplayErrorContext(&e).to_string())
                    }
                })?;

            let length = output.content_length().unwrap_or_default();
            u64::try_from(length)
                .map_err(|_| StoreError::Backend(format!("negative content length: {length}")))
        })
    }
}

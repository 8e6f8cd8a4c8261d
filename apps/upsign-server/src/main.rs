//! Upsign Server - signing endpoint for browser-direct uploads.
//!
//! Signs upload policies and multipart REST requests so a browser can send
//! files straight to S3-compatible storage without ever seeing the secret
//! key. Also serves delete and upload-success callbacks.
//!
//! # Usage
//!
//! ```text
//! AWS_SECRET_KEY=... AWS_PUBLIC_KEY=AKIA... upsign-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:8000` | Bind address |
//! | `AWS_SECRET_KEY` | *(required)* | Signing secret (`CLIENT_SECRET_KEY` also accepted) |
//! | `AWS_PUBLIC_KEY` | *(empty)* | Access key id paired with the signing secret |
//! | `SERVER_PUBLIC_KEY` / `SERVER_SECRET_KEY` | *(signing pair)* | Key pair for deletes and size checks |
//! | `EXPECTED_BUCKET` | *(unset)* | Only sign uploads to this bucket |
//! | `EXPECTED_MIN_SIZE` / `EXPECTED_MAX_SIZE` | *(unset)* | Required `content-length-range` |
//! | `DEFAULT_REGION` | `us-east-1` | Region for deletes and size checks |
//! | `S3_ENDPOINT_URL` | *(unset)* | Custom S3 endpoint |
//! | `ENABLE_DELETE` | `true` | Serve `DELETE` requests |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use upsign_auth::{SigningService, UploadPolicyRules};
use upsign_core::{SigningCredentials, UpsignConfig};
use upsign_http::{UpsignHandler, UpsignHttpConfig, UpsignHttpService};

use crate::store::S3ObjectStore;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the [`UpsignHttpConfig`] from the application [`UpsignConfig`].
fn build_http_config(config: &UpsignConfig) -> UpsignHttpConfig {
    UpsignHttpConfig {
        enable_delete: config.enable_delete,
        max_upload_size: config.expected_max_size,
        ..UpsignHttpConfig::default()
    }
}

/// Assemble the request handler: signer, upload rules, and object store.
fn build_handler(config: &UpsignConfig) -> Result<UpsignHandler> {
    let credentials =
        SigningCredentials::from_config(config).context("cannot load signing credentials")?;

    let rules = UploadPolicyRules::from_config(config);
    if !rules.is_enforcing() {
        warn!("no EXPECTED_BUCKET or size range configured, signing any well-formed policy");
    }

    let store_credentials = SigningCredentials::object_store_from_config(config)
        .context("cannot load object store credentials")?;
    let store = S3ObjectStore::new(config, &store_credentials);
    let signer = SigningService::new(credentials).with_rules(rules);

    info!(
        access_key_id = signer.access_key_id(),
        store_access_key_id = store_credentials.access_key_id(),
        "signing service ready"
    );

    Ok(UpsignHandler::new(signer, build_http_config(config)).with_store(Arc::new(store)))
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: UpsignHttpService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by connecting to the server and requesting `/health`.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = UpsignConfig::from_env().context("invalid configuration")?;

    // Handle --health-check flag for container HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        expected_bucket = ?config.expected_bucket,
        expected_size_range = ?config.expected_size_range(),
        enable_delete = config.enable_delete,
        version = VERSION,
        "starting Upsign server",
    );

    let service = UpsignHttpService::new(build_handler(&config)?);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}

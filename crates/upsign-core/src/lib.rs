//! Configuration and signing credentials for Upsign.
//!
//! This crate holds the process-wide, read-once settings shared by the
//! signing core and the HTTP layer: the listen address, the signing secret,
//! the optional upload-policy expectations, and the object-store settings
//! used for deletes.

mod config;
mod credentials;
mod error;

pub use config::UpsignConfig;
pub use credentials::{SecretKey, SigningCredentials};
pub use error::{ConfigError, ConfigResult};

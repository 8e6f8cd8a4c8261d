//! Cryptographic primitives used by both signature schemes.
//!
//! - [`hmac_sha1_base64`]: the legacy SigV2 signature.
//! - [`sha256_hex`]: lowercase hex SHA-256, used to hash canonical requests.
//! - [`derive_signing_key`] / [`derive_v4_signature`]: the SigV4 key chain.
//!
//! ```text
//! DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
//! DateRegionKey        = HMAC-SHA256(DateKey, region)
//! DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
//! SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
//! Signature            = hex(HMAC-SHA256(SigningKey, string_to_sign))
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{SigningError, SignerResult};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// The only service name the upload signer issues signatures for.
pub const SERVICE: &str = "s3";

/// Terminator of every SigV4 credential scope.
pub const SCOPE_TERMINATOR: &str = "aws4_request";

/// Compute `Base64(HMAC-SHA1(secret, message))`.
///
/// The standard engine never wraps lines, so the output is a single line.
///
/// # Examples
///
/// ```
/// use upsign_auth::hasher::hmac_sha1_base64;
///
/// let sig = hmac_sha1_base64("key", "The quick brown fox jumps over the lazy dog").unwrap();
/// assert_eq!(sig, "3nybhbi3iqa8ino29wqQcBydtNk=");
/// ```
pub fn hmac_sha1_base64(secret: &str, message: &str) -> SignerResult<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|_| SigningError::CryptoFault("HMAC-SHA1 key rejected".to_owned()))?;
    mac.update(message.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Compute the SHA-256 digest of `message` as lowercase hex.
///
/// # Examples
///
/// ```
/// use upsign_auth::hasher::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn sha256_hex(message: &str) -> String {
    hex::encode(Sha256::digest(message.as_bytes()))
}

/// Derive the SigV4 signing key for a date, region, and service.
pub fn derive_signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> SignerResult<Vec<u8>> {
    let date_key = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let date_region_key = hmac_sha256(&date_key, region.as_bytes())?;
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes())?;
    hmac_sha256(&date_region_service_key, SCOPE_TERMINATOR.as_bytes())
}

/// Sign `string_to_sign` with the SigV4 key derived from the scope.
///
/// Returns the hex-encoded signature.
pub fn derive_v4_signature(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
    string_to_sign: &str,
) -> SignerResult<String> {
    let signing_key = derive_signing_key(secret, date, region, service)?;
    let signature = hmac_sha256(&signing_key, string_to_sign.as_bytes())?;
    Ok(hex::encode(signature))
}

/// Compute HMAC-SHA256 and return the raw bytes.
fn hmac_sha256(key: &[u8], data: &[u8]) -> SignerResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| SigningError::CryptoFault("HMAC-SHA256 key rejected".to_owned()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

//! Legacy Signature Version 2 signing.
//!
//! ```text
//! Signature = Base64(HMAC-SHA1(SecretKey, StringToSign))
//! ```
//!
//! For a policy, the string to sign is the base64 policy itself. For a REST
//! request it is the client-built header string, signed as-is: SigV2 has no
//! credential scope, so nothing is extracted.

use upsign_core::SecretKey;

use crate::error::SignerResult;
use crate::hasher::hmac_sha1_base64;
use crate::policy::PolicyDocument;
use crate::service::SigningResult;

/// Sign a policy document.
pub fn sign_policy(secret: &SecretKey, policy: &PolicyDocument) -> SignerResult<SigningResult> {
    let canonical_policy = policy.canonicalize()?;
    let signature = hmac_sha1_base64(secret.expose(), &canonical_policy)?;
    Ok(SigningResult::for_policy(signature, canonical_policy))
}

/// Sign a REST string to sign.
pub fn sign_headers(secret: &SecretKey, headers: &str) -> SignerResult<SigningResult> {
    let signature = hmac_sha1_base64(secret.expose(), headers)?;
    Ok(SigningResult::for_headers(signature))
}

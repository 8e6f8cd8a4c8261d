//! Signature Version 4 signing.
//!
//! The signature is bound to the date and region named in the request's own
//! credential scope:
//!
//! - policy: scope from the `x-amz-credential` condition, and the base64
//!   policy is signed directly (not its hash);
//! - REST: scope from the third line, and the signed string is the header
//!   string with its canonical request replaced by that request's SHA-256.

use tracing::debug;
use upsign_core::SecretKey;

use crate::error::SignerResult;
use crate::extract::{HeaderScope, policy_scope};
use crate::hasher::{SERVICE, derive_v4_signature};
use crate::policy::PolicyDocument;
use crate::service::SigningResult;

/// Sign a policy document.
pub fn sign_policy(secret: &SecretKey, policy: &PolicyDocument) -> SignerResult<SigningResult> {
    let scope = policy_scope(policy)?;
    let canonical_policy = policy.canonicalize()?;

    debug!(scope = %scope, "signing SigV4 policy");

    let signature = derive_v4_signature(
        secret.expose(),
        &scope.date,
        &scope.region,
        SERVICE,
        &canonical_policy,
    )?;
    Ok(SigningResult::for_policy(signature, canonical_policy))
}

/// Sign a REST string to sign.
pub fn sign_headers(secret: &SecretKey, headers: &str) -> SignerResult<SigningResult> {
    let parsed = HeaderScope::parse(headers)?;
    let string_to_sign = parsed.string_to_sign();

    debug!(scope = %parsed.scope, "signing SigV4 REST request");

    let signature = derive_v4_signature(
        secret.expose(),
        &parsed.scope.date,
        &parsed.scope.region,
        SERVICE,
        &string_to_sign,
    )?;
    Ok(SigningResult::for_headers(signature))
}

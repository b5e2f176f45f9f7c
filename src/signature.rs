//! GitHub webhook signature verification
//!
//! See <https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries>

use hex::decode as hex_decode;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::error::{HookError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const SIGNATURE_PREFIX: &str = "sha256=";

fn new_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length")
}

/// Verify the `X-Hub-Signature-256` header value against the raw body.
///
/// Fails closed: a missing header, a missing `sha256=` prefix, a value that
/// is not hex, or a digest of the wrong length are all rejected. The digest
/// comparison is constant-time.
pub fn verify_github_signature(secret: &str, payload: &[u8], header: Option<&str>) -> Result<()> {
    let header = header.ok_or(HookError::MissingSignature)?;

    let provided = header.strip_prefix(SIGNATURE_PREFIX).ok_or_else(|| {
        HookError::InvalidSignature(format!("header lacks '{}' prefix", SIGNATURE_PREFIX))
    })?;

    let provided_bytes = hex_decode(provided).map_err(|e| {
        debug!("Couldn't decode {} header as hex: {}", SIGNATURE_HEADER, e);
        HookError::InvalidSignature(format!("not hex: {}", e))
    })?;

    let mut mac = new_mac(secret);
    mac.update(payload);
    mac.verify_slice(&provided_bytes)
        .map_err(|_| HookError::InvalidSignature("digest mismatch".to_string()))
}

/// Produce the header value GitHub would send for `payload`.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac = new_mac(secret);
    mac.update(payload);
    format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    )
}

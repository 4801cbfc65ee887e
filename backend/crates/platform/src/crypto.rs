//! Cryptographic Utilities
//!
//! Random secrets, HMAC-SHA256 token signing, and constant-time comparison.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate a random 32-byte secret
pub fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

fn mac(secret: &[u8; 32], payload: &str) -> HmacSha256 {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    mac
}

/// Sign a payload as `<payload>.<base64url(HMAC-SHA256)>`
///
/// The payload must not contain `.`.
pub fn sign(secret: &[u8; 32], payload: &str) -> String {
    let signature = mac(secret, payload).finalize().into_bytes();
    format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature))
}

/// Verify a token produced by [`sign`] and return its payload
///
/// The signature is checked in constant time.
pub fn verify_signed<'a>(secret: &[u8; 32], token: &'a str) -> Option<&'a str> {
    let (payload, signature_b64) = token.split_once('.')?;
    if signature_b64.contains('.') {
        return None;
    }

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    mac(secret, payload).verify_slice(&signature).ok()?;

    Some(payload)
}

/// Constant-time comparison to prevent timing attacks
///
/// Only the length is allowed to leak.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a random 32-byte secret
pub fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Produce `"<payload>.<base64url(HMAC-SHA256(key, payload))>"`
pub fn sign_token(key: &[u8], payload: &str) -> String {
    let signature = hmac_sha256(key, payload.as_bytes());
    format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature))
}

/// Verify a token produced by [`sign_token`] and return its payload
///
/// 署名は定数時間で比較する。
///
/// ## Arguments
/// * `key` - HMAC key the token was signed with
/// * `token` - `"<payload>.<signature>"` as read from the cookie
///
/// ## Returns
/// * `Some(payload)` - signature matches
/// * `None` - malformed token or bad signature (not distinguished)
///
/// ## Examples
/// ```rust
/// use platform::crypto::{sign_token, verify_token};
///
/// let token = sign_token(b"cookie-key", "7f1c2a90");
/// assert_eq!(verify_token(b"cookie-key", &token), Some("7f1c2a90"));
/// assert_eq!(verify_token(b"other-key", &token), None);
/// ```
pub fn verify_token<'a>(key: &[u8], token: &'a str) -> Option<&'a str> {
    let (payload, signature_b64) = token.split_once('.')?;
    if signature_b64.contains('.') {
        return None;
    }

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).ok()?;
    mac.update(payload.as_bytes());
    // verify_slice compares in constant time
    mac.verify_slice(&signature).ok()?;

    Some(payload)
}

/// Refresh Token Codec
///
/// Opaque refresh values are 48 cryptographically random bytes, URL-safe
/// base64 encoded. Only their SHA-256 digest is ever stored; the digest is
/// the lookup key. SHA-256 without salt is fine here because the input is
/// already high-entropy random, unlike a password.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_ENTROPY_BYTES: usize = 48;

/// Generate a new opaque refresh token value.
///
/// The plaintext value goes to the client (cookie); the server keeps only
/// the digest.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Digest an opaque refresh value for storage and lookup.
pub fn digest_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

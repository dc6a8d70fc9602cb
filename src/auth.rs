//! Doctor credential hashing and session tokens.
//!
//! Passwords are stored as `salt$digest` (both base64) using salted
//! PBKDF2-HMAC-SHA256; verification is constant-time. Session tokens are
//! random 32-byte values handed to the client at login — the server keeps
//! only their SHA-256 hash, mapped to the doctor id.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
const DIGEST_LENGTH: usize = 32;
const SALT_LENGTH: usize = 32;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = derive(password, &salt);
    format!("{}${}", STANDARD.encode(salt), STANDARD.encode(digest))
}

/// Verify a password against a stored `salt$digest` value.
/// Malformed stored values verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, digest_b64)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = STANDARD.decode(salt_b64) else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(digest_b64) else {
        return false;
    };
    if expected.len() != DIGEST_LENGTH {
        return false;
    }

    let digest = derive(password, &salt);
    digest.ct_eq(&expected[..]).into()
}

fn derive(password: &str, salt: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut out = [0u8; DIGEST_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

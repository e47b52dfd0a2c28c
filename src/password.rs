//! Password hashing for stored accounts.
//!
//! Hashes are PBKDF2-HMAC-SHA256 with a random per-password salt.
//! Stored format: base64([16-byte salt][32-byte digest]).

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

const ITERATIONS: NonZeroU32 = NonZeroU32::new(100_000).unwrap();
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

pub fn hash(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| anyhow::anyhow!("Failed to generate salt"))?;

    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut digest,
    );

    let mut stored = Vec::with_capacity(SALT_LEN + DIGEST_LEN);
    stored.extend_from_slice(&salt);
    stored.extend_from_slice(&digest);
    Ok(STANDARD.encode(stored))
}

/// Check an attempt against a stored hash. A malformed hash never matches.
pub fn verify(attempt: &str, stored_hash: &str) -> bool {
    let Ok(bytes) = STANDARD.decode(stored_hash) else {
        tracing::warn!("Stored password hash is not valid base64");
        return false;
    };
    if bytes.len() != SALT_LEN + DIGEST_LEN {
        tracing::warn!("Stored password hash has unexpected length {}", bytes.len());
        return false;
    }

    let (salt, digest) = bytes.split_at(SALT_LEN);
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        ITERATIONS,
        salt,
        attempt.as_bytes(),
        digest,
    )
    .is_ok()
}

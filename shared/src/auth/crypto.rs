//! # Crypto Primitives
//!
//! Low-level building blocks for password storage and verification codes:
//! random byte generation, salted hashing, constant-time comparison, and the
//! numeric/opaque token generators used by the verification engine.
//!
//! ## Storage shape
//!
//! Every credential is stored as a `(salt, salted_hash)` pair rather than a
//! self-describing PHC string. This keeps the storage shape stable across
//! hash backends: swapping [`Sha256Hasher`] for [`Argon2Hasher`] only changes
//! how `salted_hash` is computed, never the schema.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::auth::crypto::{new_salt, PasswordHasher, Argon2Hasher};
//!
//! let hasher = Argon2Hasher::default();
//! let salt = new_salt();
//! let digest = hasher.hash("hunter2", &salt)?;
//! assert!(hasher.verify("hunter2", &salt, &digest));
//! assert!(!hasher.verify("wrong", &salt, &digest));
//! ```

use argon2::{Argon2, Params, Version};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::ApiError;

/// Fixed digest width produced by every [`PasswordHasher`] implementation.
pub const DIGEST_LEN: usize = 32;

/// Fills `buf` with cryptographically secure random bytes.
///
/// Uses the OS CSPRNG via `rand::rngs::OsRng`; never falls back to a
/// non-secure generator. Returns `ApiError::Internal` if the underlying
/// source cannot be read (practically unreachable on supported platforms,
/// but surfaced rather than silently degraded).
pub fn random_bytes(n: usize) -> Result<Vec<u8>, ApiError> {
    let mut buf = vec![0u8; n];
    rand::rngs::OsRng.try_fill_bytes(&mut buf).map_err(|e| {
        ApiError::Internal(format!("entropy source exhausted: {e}"))
    })?;
    Ok(buf)
}

/// Generates a fresh 16-byte salt, rendered as 32 lowercase hex characters.
pub fn new_salt() -> Result<String, ApiError> {
    Ok(hex::encode(random_bytes(16)?))
}

/// Generates a 32-byte opaque token, rendered as 64 lowercase hex characters.
///
/// Used for email verification tokens.
pub fn new_opaque_token() -> Result<String, ApiError> {
    Ok(hex::encode(random_bytes(32)?))
}

/// Generates a zero-padded 6-digit numeric code in `[0, 1_000_000)`.
///
/// Used for phone verification codes. Uses rejection sampling over a 32-bit
/// random value to avoid modulo bias.
pub fn new_numeric_code() -> Result<String, ApiError> {
    const BOUND: u32 = 1_000_000;
    const ZONE: u32 = u32::MAX - (u32::MAX % BOUND);
    loop {
        let bytes = random_bytes(4)?;
        let candidate = u32::from_be_bytes(bytes.try_into().unwrap());
        if candidate < ZONE {
            return Ok(format!("{:06}", candidate % BOUND));
        }
    }
}

/// Constant-time comparison of two equal-length strings (hex digests, codes).
///
/// Returns `false` immediately on length mismatch; this branch is on public
/// metadata (length), not secret content, so it does not reintroduce a
/// timing side channel.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Pluggable password-hashing backend.
///
/// Both implementations produce a fixed-size digest so the two-field
/// `(salt, salted_hash)` storage shape never changes when the backend is
/// swapped.
pub trait PasswordHasher: Send + Sync {
    /// Hashes `password` salted with `salt`, returning a fixed-length digest.
    fn hash(&self, password: &str, salt: &str) -> Result<Vec<u8>, ApiError>;

    /// Recomputes the digest and compares against `stored` in constant time.
    fn verify(&self, password: &str, salt: &str, stored: &[u8]) -> bool {
        match self.hash(password, salt) {
            Ok(computed) => {
                computed.len() == stored.len() && computed.ct_eq(stored).into()
            }
            Err(_) => false,
        }
    }
}

/// SHA-256(password ∥ salt) hasher. Fast, not memory-hard — offered for
/// parity with sources that predate Argon2id and for cheap test fixtures.
#[derive(Default)]
pub struct Sha256Hasher;

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str, salt: &str) -> Result<Vec<u8>, ApiError> {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(salt.as_bytes());
        Ok(hasher.finalize().to_vec())
    }
}

/// Argon2id hasher with OWASP-recommended parameters, truncated to a raw
/// fixed-width digest (no embedded PHC string) so it fits the `(salt, hash)`
/// storage shape shared with [`Sha256Hasher`].
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// `m_cost` in KiB, `t_cost` iterations, `p_cost` parallelism lanes.
    pub fn new(m_cost_kib: u32, t_cost: u32, p_cost: u32) -> Result<Self, ApiError> {
        let params = Params::new(m_cost_kib, t_cost, p_cost, Some(DIGEST_LEN))
            .map_err(|e| ApiError::Internal(format!("invalid argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        // 19 MiB / 2 iterations / 1 lane: OWASP's minimum Argon2id profile.
        Self::new(19 * 1024, 2, 1).expect("default argon2 params are valid")
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str, salt: &str) -> Result<Vec<u8>, ApiError> {
        let mut out = vec![0u8; DIGEST_LEN];
        self.argon2
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut out)
            .map_err(|e| ApiError::Internal(format!("argon2 hashing failed: {e}")))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_salt_is_32_hex_chars() {
        let salt = new_salt().unwrap();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn new_opaque_token_is_64_hex_chars() {
        let token = new_opaque_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn new_numeric_code_is_six_digits() {
        for _ in 0..50 {
            let code = new_numeric_code().unwrap();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn constant_time_eq_rejects_length_mismatch_and_content_mismatch() {
        assert!(constant_time_eq("abcdef", "abcdef"));
        assert!(!constant_time_eq("abcdef", "abcdeg"));
        assert!(!constant_time_eq("abc", "abcdef"));
    }

    #[test]
    fn sha256_hasher_round_trips_and_rejects_wrong_password() {
        let hasher = Sha256Hasher;
        let salt = new_salt().unwrap();
        let digest = hasher.hash("correct horse", &salt).unwrap();
        assert!(hasher.verify("correct horse", &salt, &digest));
        assert!(!hasher.verify("wrong", &salt, &digest));
    }

    #[test]
    fn argon2_hasher_round_trips_and_rejects_wrong_password() {
        let hasher = Argon2Hasher::default();
        let salt = new_salt().unwrap();
        let digest = hasher.hash("correct horse", &salt).unwrap();
        assert_eq!(digest.len(), DIGEST_LEN);
        assert!(hasher.verify("correct horse", &salt, &digest));
        assert!(!hasher.verify("wrong", &salt, &digest));
    }

    #[test]
    fn same_password_different_salts_yield_different_digests() {
        let hasher = Sha256Hasher;
        let salt_a = new_salt().unwrap();
        let salt_b = new_salt().unwrap();
        assert_ne!(
            hasher.hash("same-password", &salt_a).unwrap(),
            hasher.hash("same-password", &salt_b).unwrap()
        );
    }
}

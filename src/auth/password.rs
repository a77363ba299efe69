use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::error;

/// Credential scheme, detected from the stored value's shape. Legacy rows
/// hold a bare hex SHA-256 digest; everything newer is an Argon2 PHC string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    LegacyDigest,
    Argon2,
}

pub fn detect_scheme(stored: &str) -> HashScheme {
    if stored.len() == 64 && stored.chars().all(|c| c.is_ascii_hexdigit()) {
        HashScheme::LegacyDigest
    } else {
        HashScheme::Argon2
    }
}

/// One implementation per hash scheme; login picks by stored-value shape so
/// legacy users keep working until their next password change.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, plain: &str, stored: &str) -> anyhow::Result<bool>;
}

struct LegacyDigestVerifier;

impl PasswordVerifier for LegacyDigestVerifier {
    fn verify(&self, plain: &str, stored: &str) -> anyhow::Result<bool> {
        let digest = hex::encode(Sha256::digest(plain.as_bytes()));
        Ok(digest.eq_ignore_ascii_case(stored))
    }
}

struct Argon2Verifier;

impl PasswordVerifier for Argon2Verifier {
    fn verify(&self, plain: &str, stored: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(stored).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

fn verifier_for(stored: &str) -> &'static dyn PasswordVerifier {
    match detect_scheme(stored) {
        HashScheme::LegacyDigest => &LegacyDigestVerifier,
        HashScheme::Argon2 => &Argon2Verifier,
    }
}

/// Check a plaintext password against whatever scheme the stored value uses.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    verifier_for(stored).verify(plain, stored)
}

/// New hashes are always Argon2 with a fresh salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    // SHA-256("password")
    const LEGACY_DIGEST: &str =
        "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn legacy_digest_verifies() {
        assert!(verify_password("password", LEGACY_DIGEST).expect("verify should succeed"));
        assert!(!verify_password("not-the-password", LEGACY_DIGEST).expect("verify should succeed"));
    }

    #[test]
    fn scheme_detection_by_shape() {
        assert_eq!(detect_scheme(LEGACY_DIGEST), HashScheme::LegacyDigest);
        let hash = hash_password("anything").expect("hashing should succeed");
        assert_eq!(detect_scheme(&hash), HashScheme::Argon2);
        // 64 chars but not hex: not a legacy digest
        let not_hex = "z".repeat(64);
        assert_eq!(detect_scheme(&not_hex), HashScheme::Argon2);
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}

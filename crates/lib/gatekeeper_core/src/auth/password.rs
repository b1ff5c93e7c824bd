//! Password hashing via bcrypt.
//!
//! Stateless: the salt lives inside the digest, so verification needs no
//! stored state beyond the digest itself.

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 12;

/// Hash a plaintext password into a salted, one-way bcrypt digest.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a plaintext password against a stored bcrypt digest.
///
/// Returns `Ok(false)` on a mismatch against any well-formed digest; an error
/// is only possible when the digest itself is malformed.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, digest)
        .map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let digest = hash_password("secret123!").unwrap();
        assert_ne!(digest, "secret123!");
        assert!(verify_password("secret123!", &digest).unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let digest = hash_password("secret123!").unwrap();
        assert!(!verify_password("wrong-pass", &digest).unwrap());
        assert!(!verify_password("", &digest).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        // Each digest carries its own salt.
        let a = hash_password("secret123!").unwrap();
        let b = hash_password("secret123!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert!(verify_password("secret123!", "not-a-bcrypt-digest").is_err());
    }
}

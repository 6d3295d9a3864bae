//! Secret-scoped cache key derivation.

use sha2::{Digest, Sha256};

/// Derive the internal map key for a caller-supplied cache key.
///
/// Two deployments with different secrets never produce the same key.
pub fn scoped_key(secret: &str, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b"\n");
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_key_stability() {
        assert_eq!(scoped_key(SECRET, "risks:ri-1.md"), scoped_key(SECRET, "risks:ri-1.md"));
    }

    #[test]
    fn test_key_different_secret() {
        let other = "fedcba9876543210fedcba9876543210";
        assert_ne!(scoped_key(SECRET, "risks:ri-1.md"), scoped_key(other, "risks:ri-1.md"));
    }

    #[test]
    fn test_key_no_concatenation_collision() {
        assert_ne!(scoped_key("ab", "c"), scoped_key("a", "bc"));
    }

    #[test]
    fn test_key_format() {
        let key = scoped_key(SECRET, "frameworks:iso-42001.md");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

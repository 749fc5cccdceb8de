//! SHA-256 content hashing for journal exchanges.
//!
//! Implements the `ContentHasher` trait from `ironlog-core` using the
//! `sha2` crate (RustCrypto ecosystem).

use sha2::{Digest, Sha256};

use ironlog_core::service::hash::ContentHasher;

/// SHA-256 implementation of `ContentHasher`.
///
/// Computes lowercase hex-encoded SHA-256 digests. The digests are persisted
/// in index state files, so the encoding must never change.
pub struct Sha256ContentHasher;

impl Sha256ContentHasher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sha256ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher for Sha256ContentHasher {
    fn compute_hash(&self, content: &str) -> String {
        let digest = Sha256::digest(content.as_bytes());
        format!("{:x}", digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hash_known_value() {
        let hasher = Sha256ContentHasher::new();
        assert_eq!(
            hasher.compute_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_exchange_hash_is_stable_and_content_sensitive() {
        let hasher = Sha256ContentHasher::new();
        let exchange = "<player>\nI search the ruins.\n</player>\n\nYou find a seal.";
        assert_eq!(hasher.compute_hash(exchange), hasher.compute_hash(exchange));
        assert_ne!(
            hasher.compute_hash(exchange),
            hasher.compute_hash("<player>\nI search the ruins.\n</player>\n\nYou find nothing.")
        );
    }

    #[test]
    fn test_sha256_hash_is_lowercase_hex() {
        let hash = Sha256ContentHasher::new().compute_hash("test");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

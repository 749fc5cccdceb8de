//! ContentHasher trait for computing stable content hashes.
//!
//! Defined in ironlog-core so the indexer can fingerprint exchanges without
//! coupling to a specific hashing algorithm. The `Sha256ContentHasher`
//! adapter lives in ironlog-infra.

/// Abstraction over content hashing.
///
/// Used by the memory indexer to detect which journal exchanges changed
/// since the last pass. Implementations must be deterministic across runs,
/// since hashes are persisted to disk.
pub trait ContentHasher: Send + Sync {
    /// Compute a hex-encoded hash of the given content.
    fn compute_hash(&self, content: &str) -> String;
}

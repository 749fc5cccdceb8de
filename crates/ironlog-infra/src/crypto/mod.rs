//! Cryptographic operations for ironlog.
//!
//! - `hash`: SHA-256 content hashing for journal exchange fingerprints

pub mod hash;

//! Infrastructure layer for ironlog.
//!
//! Contains implementations of the port traits defined in `ironlog-core`:
//! the local filesystem adapter, SHA-256 content hashing, the LanceDB journal
//! memory store, the fastembed embedder, and the `config.toml` loader.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod vector;

//! Business logic and port definitions for ironlog.
//!
//! This crate defines the "ports" (filesystem, hashing, embedding, vector
//! store traits) that the infrastructure layer implements, plus the services
//! built on them: the journal block parser, the per-campaign journal store,
//! and the incremental story memory indexer. It depends only on
//! `ironlog-types` -- never on `ironlog-infra` or any database/IO crate.

pub mod journal;
pub mod memory;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

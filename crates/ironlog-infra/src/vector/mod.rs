//! Vector database infrastructure for journal memory.
//!
//! Provides LanceDB connection management, the `journal_memory` table
//! store, and fastembed-based local embedding generation.

pub mod embedder;
pub mod lance;
pub mod memory;
pub mod schema;

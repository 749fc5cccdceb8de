//! Story memory for campaign journals.
//!
//! Journal exchanges are embedded into a vector store by the
//! `IncrementalIndexer`, which the `IndexScheduler` runs in the background
//! after journal mutations. `MemoryRetrievalService` searches the store to
//! recall older story beats.

pub mod embedder;
pub mod indexer;
pub mod retrieval;
pub mod scheduler;
pub mod trigger;
pub mod vector;

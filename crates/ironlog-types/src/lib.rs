//! Shared domain types for ironlog.
//!
//! This crate contains the core domain types used across the workspace:
//! campaigns, character sheets, journal blocks and exchanges, memory index
//! state, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod campaign;
pub mod character;
pub mod config;
pub mod error;
pub mod journal;
pub mod memory;

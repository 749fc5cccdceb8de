//! Observability setup for the ironlog binary.

pub mod tracing_setup;

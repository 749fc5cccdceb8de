//! Infrastructure ports used by the services.
//!
//! Services depend on these traits -- never on concrete infrastructure
//! implementations.

pub mod fs;
pub mod hash;

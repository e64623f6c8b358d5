//! Shared infrastructure for the Hardgate compliance engine.
//!
//! Configuration, the error taxonomy, cooperative cancellation, collection
//! aliases, and tracing setup. The analysis crate depends on this one; nothing
//! here knows about gates or evidence.

pub mod config;
pub mod errors;
pub mod telemetry;
pub mod traits;
pub mod types;

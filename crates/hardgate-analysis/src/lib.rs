//! Hard-gate compliance evaluation.
//!
//! Pipeline: snapshot → technology detection → applicable gates → parallel
//! pattern evaluation → external evidence aggregation → scoring →
//! recommendations → `ComplianceReport`.
//!
//! `engine::evaluate` is the single-call entry point over an already acquired
//! snapshot and evidence set. `engine::Engine` adds snapshot acquisition,
//! concurrent evidence collection, a dedicated worker pool, registry hot
//! reload, and compute-once report caching.

pub mod detection;
pub mod engine;
pub mod evaluator;
pub mod evidence;
pub mod gates;
pub mod report;
pub mod scanner;
pub mod scoring;

pub use engine::{evaluate, Engine, RunContext, RunRequest};
pub use gates::GateRegistry;
pub use report::ComplianceReport;

//! Evaluation entry points.

pub mod evaluate;
pub mod runner;

pub use evaluate::{evaluate, RunContext};
pub use runner::{Engine, RunRequest};

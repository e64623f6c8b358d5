//! Shared type aliases and small value types.

pub mod collections;
pub mod selection;

pub use selection::Selection;

//! Scanner subsystem: file inventory, content hashing, language detection.
//!
//! The inventory is what every later stage reads. It is built once per run by
//! a `SnapshotProvider` and is immutable afterwards, so gate evaluations can
//! share it across threads without locking.

pub mod hasher;
pub mod language_detect;
pub mod types;
pub mod walker;

pub use language_detect::Language;
pub use types::{ContentSource, FileRecord, InMemoryContent, Snapshot, SnapshotProvider};
pub use walker::DirectorySnapshotProvider;

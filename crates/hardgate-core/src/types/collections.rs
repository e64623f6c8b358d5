//! Fast non-cryptographic hash collections.
//!
//! Only used where iteration order never reaches output; anything that is
//! serialized into a report goes through a `Vec` or `BTreeMap` instead.

pub use rustc_hash::{FxHashMap, FxHashSet};

//! Technology detection. Infers languages, frameworks, and platforms from a
//! file inventory. Pure: no content reads, no I/O.

pub mod detector;
pub mod tables;
pub mod types;

pub use detector::TechnologyDetector;
pub use types::{LabelKind, Technology, TechnologyProfile};

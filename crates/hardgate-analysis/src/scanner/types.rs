//! Inventory types: file records, content access, and the snapshot they form.

use std::fmt;
use std::io;
use std::sync::Arc;

use hardgate_core::config::ScanDepth;
use hardgate_core::errors::AcquisitionError;
use hardgate_core::types::collections::FxHashMap;
use serde::{Deserialize, Serialize};

use super::hasher::{hash_content, inventory_digest, to_hex};
use super::language_detect::Language;

/// Bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8000;

/// One file in a snapshot. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Forward-slash path relative to the snapshot root.
    pub path: String,
    pub language: Option<Language>,
    pub size: u64,
    /// xxh3-64 of the raw bytes, hex.
    pub fingerprint: String,
    pub line_count: usize,
    pub binary: bool,
}

impl FileRecord {
    /// Build a record from raw file bytes.
    pub fn from_bytes(path: impl Into<String>, bytes: &[u8]) -> Self {
        let path = normalize_path(&path.into());
        let binary = is_binary(bytes);
        let line_count = if binary { 0 } else { count_lines(bytes) };
        Self {
            language: Language::from_path(&path),
            size: bytes.len() as u64,
            fingerprint: to_hex(hash_content(bytes)),
            line_count,
            binary,
            path,
        }
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Whether pattern evaluation at `depth` reads this file. Binary files are
    /// never read.
    pub fn within_depth(&self, depth: ScanDepth) -> bool {
        if self.binary {
            return false;
        }
        match depth {
            ScanDepth::Basic => self.language.is_some_and(|l| l.is_programming()),
            ScanDepth::Comprehensive => self.language.is_some(),
            ScanDepth::Deep => true,
        }
    }
}

/// Read access to file bodies, keyed by `FileRecord::path`.
///
/// Implementations must be safe to share across gate-evaluation threads.
pub trait ContentSource: Send + Sync {
    fn read(&self, path: &str) -> io::Result<Arc<str>>;
}

/// Content held entirely in memory. Binary files are stored empty.
#[derive(Debug, Default, Clone)]
pub struct InMemoryContent {
    bodies: FxHashMap<String, Arc<str>>,
}

impl InMemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, body: impl Into<Arc<str>>) {
        self.bodies.insert(normalize_path(&path.into()), body.into());
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl ContentSource for InMemoryContent {
    fn read(&self, path: &str) -> io::Result<Arc<str>> {
        self.bodies.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no content for {path}"))
        })
    }
}

/// A materialized codebase: ordered file records plus content access.
///
/// Records are sorted by path and unique. The fingerprint is computed once at
/// construction and identifies the inventory for caching and reports.
#[derive(Clone)]
pub struct Snapshot {
    files: Vec<FileRecord>,
    content: Arc<dyn ContentSource>,
    fingerprint: String,
}

impl Snapshot {
    /// Assemble a snapshot, rejecting duplicate paths.
    pub fn new(
        mut files: Vec<FileRecord>,
        content: Arc<dyn ContentSource>,
    ) -> Result<Self, AcquisitionError> {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        if let Some(dup) = files.windows(2).find(|w| w[0].path == w[1].path) {
            return Err(AcquisitionError::DuplicatePath {
                path: dup[0].path.clone(),
            });
        }
        let fingerprint = to_hex(inventory_digest(
            files
                .iter()
                .map(|f| (f.path.as_str(), f.fingerprint.as_str())),
        ));
        Ok(Self {
            files,
            content,
            fingerprint,
        })
    }

    /// Build an in-memory snapshot from `(path, body)` pairs.
    pub fn from_sources<I, P, B>(sources: I) -> Result<Self, AcquisitionError>
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<String>,
        B: AsRef<[u8]>,
    {
        let mut content = InMemoryContent::new();
        let mut files = Vec::new();
        for (path, body) in sources {
            let record = FileRecord::from_bytes(path, body.as_ref());
            let text: Arc<str> = if record.binary {
                Arc::from("")
            } else {
                Arc::from(String::from_utf8_lossy(body.as_ref()).as_ref())
            };
            content.insert(record.path.clone(), text);
            files.push(record);
        }
        Self::new(files, Arc::new(content))
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn read(&self, path: &str) -> io::Result<Arc<str>> {
        self.content.read(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("files", &self.files.len())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Collaborator that materializes a snapshot for a reference (a path, a
/// checked-out revision, ...). Transport and authentication live behind it.
pub trait SnapshotProvider: Send + Sync {
    fn get_snapshot(&self, reference: &str) -> Result<Snapshot, AcquisitionError>;
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").to_string()
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

fn count_lines(bytes: &[u8]) -> usize {
    if bytes.is_empty() {
        return 0;
    }
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    if bytes.last() == Some(&b'\n') {
        newlines
    } else {
        newlines + 1
    }
}

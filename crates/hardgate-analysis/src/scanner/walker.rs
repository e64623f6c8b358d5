//! Local-directory snapshot provider using `ignore`.

use std::path::Path;
use std::sync::Arc;

use hardgate_core::config::ScanConfig;
use hardgate_core::errors::AcquisitionError;
use ignore::WalkBuilder;
use tracing::{debug, info};

use super::types::{FileRecord, InMemoryContent, Snapshot, SnapshotProvider};

/// Builds a snapshot by walking a directory on disk.
///
/// The reference passed to `get_snapshot` is the directory path. Files are
/// read eagerly; oversized files and ignored directories are left out.
pub struct DirectorySnapshotProvider {
    config: ScanConfig,
}

impl DirectorySnapshotProvider {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    fn walk(&self, root: &Path) -> Result<Snapshot, AcquisitionError> {
        let max_size = self.config.effective_max_file_size();
        let respect_gitignore = self.config.effective_respect_gitignore();
        let skip = self.config.clone();

        let walker = WalkBuilder::new(root)
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_global(false)
            .git_ignore(respect_gitignore)
            .git_exclude(respect_gitignore)
            .require_git(false)
            .follow_links(self.config.effective_follow_symlinks())
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir && skip.is_ignored_dir(&entry.file_name().to_string_lossy()))
            })
            .build();

        let mut files = Vec::new();
        let mut content = InMemoryContent::new();
        let mut skipped_large = 0usize;

        for entry in walker {
            let entry = entry.map_err(|e| AcquisitionError::Io {
                path: root.display().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            let rel = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if len > max_size {
                skipped_large += 1;
                debug!(path = %rel, size = len, "skipping oversized file");
                continue;
            }

            let bytes = std::fs::read(path).map_err(|e| AcquisitionError::Io {
                path: rel.clone(),
                message: e.to_string(),
            })?;
            let record = FileRecord::from_bytes(rel, &bytes);
            let body = if record.binary {
                String::new()
            } else {
                String::from_utf8_lossy(&bytes).into_owned()
            };
            content.insert(record.path.clone(), body);
            files.push(record);
        }

        let snapshot = Snapshot::new(files, Arc::new(content))?;
        info!(
            root = %root.display(),
            files = snapshot.len(),
            skipped_large,
            fingerprint = %snapshot.fingerprint(),
            "snapshot acquired"
        );
        Ok(snapshot)
    }
}

impl SnapshotProvider for DirectorySnapshotProvider {
    fn get_snapshot(&self, reference: &str) -> Result<Snapshot, AcquisitionError> {
        let root = Path::new(reference);
        if !root.is_dir() {
            return Err(AcquisitionError::RootNotFound {
                path: reference.to_string(),
            });
        }
        self.walk(root)
    }
}

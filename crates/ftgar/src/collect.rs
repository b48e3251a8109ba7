use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use walkdir::WalkDir;

use crate::{entry::ArchiveEntry, error::Failure, orchestrator::Progress, path::canonicalize_relative};

/// Entries read from disk plus everything that couldn't be read.
#[derive(Debug, Default)]
pub struct Collection {
    pub entries: Vec<ArchiveEntry>,
    pub failures: Vec<Failure>,
}

impl Collection {
    fn fail(&mut self, failure: Failure, progress: &dyn Progress) {
        debug!("{failure}");
        progress.failed(&failure);
        self.failures.push(failure);
    }
}

/// Reads every regular file below each root, in walk order, naming each one
/// relative to `base_dir`. Roots are visited in the order given. A file or
/// folder that can't be read is recorded and skipped.
pub fn collect(base_dir: &Path, roots: &[PathBuf], progress: &dyn Progress) -> Collection {
    let mut collection = Collection::default();
    for root in roots {
        progress.walking(root);
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let path = source
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.clone());
                    collection.fail(Failure::Walk { path, source }, progress);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(relative_path) = canonicalize_relative(base_dir, path) else {
                collection.fail(
                    Failure::UnsupportedName {
                        path: path.to_path_buf(),
                    },
                    progress,
                );
                continue;
            };
            progress.reading(path);
            match fs::read(path) {
                Ok(payload) => {
                    let entry = ArchiveEntry::new(relative_path, payload);
                    debug!("packed {} ({} bytes)", entry.relative_path, entry.len());
                    progress.packed(&entry);
                    collection.entries.push(entry);
                }
                Err(source) => collection.fail(
                    Failure::Read {
                        path: path.to_path_buf(),
                        source,
                    },
                    progress,
                ),
            }
        }
    }
    collection
}

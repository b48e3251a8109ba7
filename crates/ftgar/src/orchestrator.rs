use std::{
    fmt, fs,
    path::{Component, Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    archive::Codec,
    collect::{collect, Collection},
    entry::ArchiveEntry,
    error::{Failure, InputError},
    naming::{archive_layout, avoid_collision, extraction_output_folder, has_archive_extension},
    MAX_REPORTED_FAILURES,
};

/// Observer for per-item progress. Every method defaults to doing nothing.
pub trait Progress {
    fn walking(&self, _root: &Path) {}
    /// Called right before a file is read from disk.
    fn reading(&self, _path: &Path) {}
    fn packed(&self, _entry: &ArchiveEntry) {}
    fn extracted(&self, _path: &Path, _len: u64) {}
    fn failed(&self, _failure: &Failure) {}
}

impl Progress for () {}

/// Result of one create or extract operation. Read-only once returned.
#[derive(Debug)]
pub struct Outcome {
    summary: String,
    failures: Vec<Failure>,
    output: Option<PathBuf>,
    entries: usize,
}

impl Outcome {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
    pub fn summary(&self) -> &str {
        &self.summary
    }
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }
    /// The archive written, or the folder extracted into.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
    /// Entries packed or written.
    pub fn entries(&self) -> usize {
        self.entries
    }
    pub fn errors(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)?;
        for failure in self.failures.iter().take(MAX_REPORTED_FAILURES) {
            write!(f, "\n  {failure}")?;
        }
        if self.failures.len() > MAX_REPORTED_FAILURES {
            write!(f, "\n  +{} more", self.failures.len() - MAX_REPORTED_FAILURES)?;
        }
        Ok(())
    }
}

/// Every root must be an existing folder; the first one that isn't is
/// returned.
pub fn validate_roots(roots: &[PathBuf]) -> Result<(), InputError> {
    if roots.is_empty() {
        return Err(InputError::NoRoots);
    }
    for root in roots {
        if !root.exists() {
            return Err(InputError::MissingFolder(root.clone()));
        }
        if !root.is_dir() {
            return Err(InputError::NotAFolder(root.clone()));
        }
    }
    Ok(())
}

pub fn validate_archive(path: &Path) -> Result<(), InputError> {
    if !path.exists() {
        return Err(InputError::MissingArchive(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(InputError::NotAFile(path.to_path_buf()));
    }
    if !has_archive_extension(path) {
        return Err(InputError::UnsupportedExtension(path.to_path_buf()));
    }
    Ok(())
}

/// Packs every file below `roots` into one archive.
///
/// The archive is written even when some files couldn't be read; those show
/// up as failures. Nothing is written when no file could be collected.
/// Errors are reserved for problems that stop the whole operation, such as
/// the codec failing.
pub fn create<C: Codec + ?Sized>(
    codec: &C,
    roots: &[PathBuf],
    progress: &dyn Progress,
) -> Result<Outcome> {
    let layout = archive_layout(roots).context("Couldn't resolve input folders")?;
    info!(
        "packing {} folder(s) relative to {}",
        layout.roots.len(),
        layout.base.display()
    );

    let Collection {
        entries,
        mut failures,
    } = collect(&layout.base, &layout.roots, progress);
    if entries.is_empty() {
        let failure = Failure::NoFiles {
            path: layout.base.clone(),
        };
        warn!("{failure}");
        progress.failed(&failure);
        failures.push(failure);
        return Ok(Outcome {
            summary: "No files found, archive not written".to_string(),
            failures,
            output: None,
            entries: 0,
        });
    }

    let archive = avoid_collision(&layout.archive);
    codec.encode(&archive, &entries)?;

    let mut summary = format!("Created {} with {} file(s)", archive.display(), entries.len());
    if !failures.is_empty() {
        summary.push_str(&format!(", {} file(s) failed", failures.len()));
    }
    info!("{summary}");
    Ok(Outcome {
        summary,
        failures,
        output: Some(archive),
        entries: entries.len(),
    })
}

/// Unpacks `archive` into a folder named after it, next to it.
///
/// Entries that can't be written are recorded and skipped. Nothing is
/// created when the archive holds no entries.
pub fn extract<C: Codec + ?Sized>(
    codec: &C,
    archive: &Path,
    progress: &dyn Progress,
) -> Result<Outcome> {
    let entries = codec.decode(archive)?;
    if entries.is_empty() {
        let failure = Failure::EmptyArchive {
            path: archive.to_path_buf(),
        };
        warn!("{failure}");
        progress.failed(&failure);
        return Ok(Outcome {
            summary: "No files found in archive".to_string(),
            failures: vec![failure],
            output: None,
            entries: 0,
        });
    }

    let folder = extraction_output_folder(archive);
    fs::create_dir_all(&folder)
        .with_context(|| format!("Couldn't create directory {}", folder.display()))?;
    info!(
        "extracting {} entries from {} into {}",
        entries.len(),
        archive.display(),
        folder.display()
    );

    let mut failures = Vec::new();
    let mut written = 0;
    for entry in entries.iter() {
        let result = match entry_destination(&folder, &entry.relative_path) {
            Some(dest) => write_entry(&dest, &entry.payload).map(|()| dest),
            None => Err(Failure::UnsafePath {
                entry: entry.relative_path.clone(),
            }),
        };
        match result {
            Ok(dest) => {
                debug!("extracted {} ({} bytes)", dest.display(), entry.len());
                progress.extracted(&dest, entry.len());
                written += 1;
            }
            Err(failure) => {
                debug!("{failure}");
                progress.failed(&failure);
                failures.push(failure);
            }
        }
    }

    let mut summary = format!(
        "Extracted {written} of {} file(s) to {}",
        entries.len(),
        folder.display()
    );
    if !failures.is_empty() {
        summary.push_str(&format!(", {} file(s) failed", failures.len()));
    }
    info!("{summary}");
    Ok(Outcome {
        summary,
        failures,
        output: Some(folder),
        entries: written,
    })
}

/// Host path for an archive-relative path, or `None` if it would escape
/// `folder` or names nothing.
fn entry_destination(folder: &Path, relative_path: &str) -> Option<PathBuf> {
    let normalized = relative_path.replace(['\\', '/'], MAIN_SEPARATOR_STR);
    let relative = Path::new(normalized.trim_start_matches(MAIN_SEPARATOR));
    let mut named = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            _ => return None,
        }
    }
    named.then(|| folder.join(relative))
}

fn write_entry(dest: &Path, payload: &[u8]) -> Result<(), Failure> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| Failure::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(dest, payload).map_err(|source| Failure::Write {
        path: dest.to_path_buf(),
        source,
    })
}

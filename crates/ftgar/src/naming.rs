use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use crate::{
    path::{absolutize, common_ancestor},
    EXTENSION, FALLBACK_NAME,
};

/// Where a create operation reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Directory that archive-relative paths are computed against.
    pub base: PathBuf,
    /// Candidate archive path, before collision avoidance.
    pub archive: PathBuf,
    /// The roots, absolute, in the order they were given.
    pub roots: Vec<PathBuf>,
}

/// A single root is its own base and is archived next to itself as
/// `<root>.ftg`. Several roots are based at their common ancestor, which is
/// archived next to itself as `<ancestor>.ftg`.
pub fn archive_layout(roots: &[PathBuf]) -> io::Result<Layout> {
    let roots = roots
        .iter()
        .map(|root| absolutize(root))
        .collect::<io::Result<Vec<_>>>()?;
    let base = match roots.as_slice() {
        [root] => root.clone(),
        _ => common_ancestor(&roots)?,
    };
    let dir = base.parent().unwrap_or(&base);
    let name = base
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from(FALLBACK_NAME));
    let archive = dir.join(with_extension(name));
    Ok(Layout {
        base,
        archive,
        roots,
    })
}

pub fn archive_output_path(roots: &[PathBuf]) -> io::Result<PathBuf> {
    Ok(archive_layout(roots)?.archive)
}

/// Returns `candidate` if nothing exists there, otherwise the first free
/// `name_N.ext` counting up from 1.
///
/// Anything at the path counts as taken, dangling symlinks included. Only an
/// existence check: a file created between this call and the write is not
/// detected.
pub fn avoid_collision(candidate: &Path) -> PathBuf {
    if !taken(candidate) {
        return candidate.to_path_buf();
    }
    let dir = candidate.parent().unwrap_or(Path::new(""));
    let stem = candidate
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    let ext = candidate
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let mut n: u64 = 1;
    loop {
        let path = dir.join(format!("{stem}_{n}{ext}"));
        if !taken(&path) {
            return path;
        }
        n += 1;
    }
}

/// `dir/data.ftg` extracts into `dir/data`. An existing folder is reused.
pub fn extraction_output_folder(archive: &Path) -> PathBuf {
    let dir = archive.parent().unwrap_or(Path::new(""));
    match archive.file_stem() {
        Some(stem) => dir.join(stem),
        None => dir.join(FALLBACK_NAME),
    }
}

pub fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(EXTENSION))
}

fn taken(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

fn with_extension(mut name: OsString) -> OsString {
    name.push(".");
    name.push(EXTENSION);
    name
}

use std::{io, path::PathBuf};

/// A single item that could not be packed or unpacked.
///
/// Failures never abort an operation; they are collected into the
/// [`Outcome`](crate::Outcome) of the operation that hit them.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("couldn't walk '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("couldn't read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("couldn't write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("'{}' has a name that can't be stored in an archive", path.display())]
    UnsupportedName { path: PathBuf },

    #[error("entry '{entry}' doesn't resolve to a path inside the output folder")]
    UnsafePath { entry: String },

    #[error("no files found in '{}'", path.display())]
    NoFiles { path: PathBuf },

    #[error("no files found in archive '{}'", path.display())]
    EmptyArchive { path: PathBuf },
}

/// Rejected command input, detected before any work starts.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("no folders given")]
    NoRoots,

    #[error("folder '{}' doesn't exist", .0.display())]
    MissingFolder(PathBuf),

    #[error("'{}' is not a folder", .0.display())]
    NotAFolder(PathBuf),

    #[error("archive '{}' doesn't exist", .0.display())]
    MissingArchive(PathBuf),

    #[error("'{}' is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("'{}' is not a .ftg archive", .0.display())]
    UnsupportedExtension(PathBuf),
}

pub mod archive;
pub mod collect;
pub mod entry;
pub mod error;
pub mod naming;
pub mod orchestrator;
pub mod path;

pub use archive::{Archive, Codec, FtgCodec};
pub use entry::ArchiveEntry;
pub use error::{Failure, InputError};
pub use orchestrator::{create, extract, Outcome, Progress};

const MAGIC_NUMBER: u64 = 0x0066746761726300;

/// Extension of the container format, matched case-insensitively.
pub const EXTENSION: &str = "ftg";
/// Separator used inside archive-relative paths on every host.
pub const SEPARATOR: char = '\\';
/// Basename used when the inputs share no named ancestor.
pub const FALLBACK_NAME: &str = "archive";
/// Number of failures spelled out in an outcome summary.
pub const MAX_REPORTED_FAILURES: usize = 5;

use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct DirectoryFileEntry {
    pub name: String,
    pub offset: u64,
    pub len: u64,
    /// CRC-32 Checksum of the payload
    pub checksum: u32,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct Directory {
    pub file_entries: Vec<DirectoryFileEntry>,
}

impl Directory {
    pub fn total_len(&self) -> u64 {
        self.file_entries.iter().map(|e| e.len).sum()
    }
}

use std::fmt;

/// One logical file inside an archive.
///
/// `relative_path` is rooted with [`crate::SEPARATOR`] and uses it for every
/// component boundary, whatever the host platform.
#[derive(Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub relative_path: String,
    pub payload: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(relative_path: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            payload: payload.into(),
        }
    }
    pub fn len(&self) -> u64 {
        self.payload.len() as u64
    }
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("relative_path", &self.relative_path)
            .field("len", &self.payload.len())
            .finish()
    }
}

use std::fs::FileType;

/// Kind of a filesystem entry, as reported by a single metadata query.
///
/// Symbolic links are followed, so a link reports the kind of its target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Sockets, pipes, devices.
    Other,
}

impl EntryKind {
    pub fn is_file(&self) -> bool {
        *self == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        *self == EntryKind::Directory
    }
}

impl From<FileType> for EntryKind {
    fn from(ft: FileType) -> Self {
        if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

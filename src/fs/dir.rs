use std::path::Path;

use crate::core::Result;
use crate::sys::RawDir;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    /// Opened, nothing read yet.
    Pending,
    Positioned,
    /// Terminal.
    Exhausted,
}

/// Cursor over the entries of one directory.
///
/// Created by [`Fs::open_dir`](crate::Fs::open_dir). Entries come out in the order the
/// platform produces them, unsorted and unfiltered: the `.` and `..` pseudo-entries are
/// returned whenever the platform returns them.
///
/// The current name borrows storage owned by the platform stream, so it cannot be kept
/// across the next [`DirCursor::read`] or past [`DirCursor::close`].
///
/// ### Example:
/// ```no_run
/// use portable_fs::Fs;
///
/// let fs = Fs::new();
/// let mut cursor = fs.open_dir("/tmp").unwrap();
/// while let Some(entry) = cursor.read() {
///     println!("{}", String::from_utf8_lossy(entry.name()));
/// }
/// cursor.close();
/// ```
pub struct DirCursor {
    raw: RawDir,
    state: State,
}

impl DirCursor {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            raw: RawDir::open(path)?,
            state: State::Pending,
        })
    }

    /// Advances to the next entry.
    ///
    /// Returns `None` once the directory is exhausted. Every later call returns `None` again
    /// without touching the platform stream.
    pub fn read(&mut self) -> Option<&Self> {
        if self.state == State::Exhausted {
            return None;
        }
        if self.raw.advance() {
            self.state = State::Positioned;
            Some(&*self)
        } else {
            self.state = State::Exhausted;
            None
        }
    }

    /// Name of the current entry; empty before the first read and after exhaustion.
    pub fn name(&self) -> &[u8] {
        match self.state {
            State::Positioned => self.raw.name(),
            State::Pending | State::Exhausted => &[],
        }
    }

    /// Current name as UTF-8, if it is valid UTF-8.
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name()).ok()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    /// Releases the platform stream. Dropping the cursor does the same.
    pub fn close(self) {}
}

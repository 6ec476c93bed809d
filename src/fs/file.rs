use std::fs::File;
use std::io::{ErrorKind, Read};
use std::iter::FusedIterator;
use std::path::Path;

use anyhow::anyhow;

use crate::core::Result;
use crate::hooks::{Buffer, Hooks};
use crate::sys;

/// Size of the read-ahead block a cursor takes from the allocate hook.
const READ_AHEAD: usize = 8 * 1024;

/// Forward-only, byte-at-a-time reader over an open file.
///
/// Created by [`Fs::iter_file`](crate::Fs::iter_file). Not seekable and not rewindable.
/// Once end-of-file (or a read error) has been reported the cursor stays finished.
///
/// Reads go through a read-ahead block allocated from the context's [`Hooks`] when the
/// cursor is opened and released through them when it is closed.
pub struct FileCursor {
    file: File,
    chunk: Buffer,
    pos: usize,
    filled: usize,
    finished: bool,
}

impl FileCursor {
    pub(crate) fn open(path: &Path, hooks: &Hooks) -> Result<Self> {
        let file = sys::open_read(path)?;
        let chunk = hooks.buffer(READ_AHEAD).ok_or_else(|| {
            anyhow!(
                "cannot allocate {} bytes to read {}",
                READ_AHEAD + 1,
                path.display()
            )
        })?;
        Ok(Self {
            file,
            chunk,
            pos: 0,
            filled: 0,
            finished: false,
        })
    }

    /// Reads the next byte. Returns `None` at end-of-file.
    pub fn next_char(&mut self) -> Option<u8> {
        if self.finished {
            return None;
        }
        if self.pos == self.filled && !self.refill() {
            self.finished = true;
            return None;
        }
        let byte = self.chunk.as_bytes()[self.pos];
        self.pos += 1;
        Some(byte)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Closes the underlying file. Dropping the cursor does the same.
    pub fn close(self) {}

    /// Loads the next block. Returns `false` at end-of-file or on error.
    fn refill(&mut self) -> bool {
        let len = self.chunk.len();
        loop {
            match self.file.read(&mut self.chunk.storage_mut()[..len]) {
                Ok(0) => return false,
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return true;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    log::debug!("file cursor read failed: {err}");
                    return false;
                }
            }
        }
    }
}

impl Iterator for FileCursor {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.next_char()
    }
}

impl FusedIterator for FileCursor {}

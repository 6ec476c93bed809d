//! Platform capability set.
//!
//! Everything that talks to the operating system lives here: metadata queries, directory
//! enumeration, file open/create, path canonicalization and directory create/remove. One
//! implementation per platform family is selected at compile time; the rest of the crate
//! only sees the functions and the opaque [`RawDir`] exported from this module.
//!
//! All functions return `anyhow` errors carrying the offending path. The underlying
//! `std::io::Error` stays reachable through `downcast_ref`.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::EntryKind;
use crate::core::Result;

#[cfg(not(any(unix, windows)))]
compile_error!("portable-fs supports unix and windows targets only");

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as imp;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as imp;

/// An open platform directory stream.
///
/// The stream starts before its first entry; [`RawDir::advance`] must be called before
/// [`RawDir::name`] returns anything. The name borrows platform-owned storage and is
/// invalidated by the next `advance`.
pub(crate) enum RawDir {
    #[cfg(unix)]
    Posix(unix::PosixDir),
    #[cfg(windows)]
    Windows(windows::FindDir),
}

impl RawDir {
    pub fn open(path: &Path) -> Result<Self> {
        imp::open_dir(path)
    }

    /// Moves to the next entry. Returns `false` at the end of the stream.
    pub fn advance(&mut self) -> bool {
        match self {
            #[cfg(unix)]
            RawDir::Posix(dir) => dir.advance(),
            #[cfg(windows)]
            RawDir::Windows(dir) => dir.advance(),
        }
    }

    pub fn name(&self) -> &[u8] {
        match self {
            #[cfg(unix)]
            RawDir::Posix(dir) => dir.name(),
            #[cfg(windows)]
            RawDir::Windows(dir) => dir.name(),
        }
    }
}

/// Kind of the entry `path` resolves to, following symlinks.
pub(crate) fn kind(path: &Path) -> Result<EntryKind> {
    let meta = std::fs::metadata(path).with_context(|| format!("cannot stat {}", path.display()))?;
    Ok(meta.file_type().into())
}

/// Whether `path` itself is a symbolic link. Always `false` on Windows.
pub(crate) fn is_symlink(path: &Path) -> Result<bool> {
    imp::is_symlink(path)
}

pub(crate) fn open_read(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("cannot open {}", path.display()))
}

/// Opens `path` for writing, creating it or truncating existing content.
pub(crate) fn create_write(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("cannot open {} for writing", path.display()))
}

pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    imp::absolute(path)
}

pub(crate) fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("cannot read the current directory")
}

pub(crate) fn temp_dir() -> Result<PathBuf> {
    imp::temp_dir()
}

/// Creates a single directory level.
/// * `mode` is applied on unix only.
pub(crate) fn make_dir(path: &Path, mode: u32) -> Result<()> {
    imp::make_dir(path, mode).with_context(|| format!("cannot create directory {}", path.display()))
}

pub(crate) fn remove_dir(path: &Path) -> Result<()> {
    std::fs::remove_dir(path).with_context(|| format!("cannot remove directory {}", path.display()))
}

pub(crate) fn remove_file(path: &Path) -> Result<()> {
    std::fs::remove_file(path).with_context(|| format!("cannot remove {}", path.display()))
}

/// Copies the content of `from` into `to`, creating or truncating `to`.
/// Returns the number of bytes copied.
pub(crate) fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    imp::copy_file(from, to)
}

/// Platform-neutral form of a path for the byte-oriented API.
pub(crate) fn path_bytes(path: &Path) -> &[u8] {
    path.as_os_str().as_encoded_bytes()
}

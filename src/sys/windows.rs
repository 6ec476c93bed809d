use std::io;
use std::mem;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{
    FindClose, FindFirstFileA, FindNextFileA, WIN32_FIND_DATAA,
};

use super::RawDir;
use crate::core::Result;

/// `FindFirstFileA`/`FindNextFileA` enumeration.
///
/// `FindFirstFileA` already fills in the first entry when the handle is opened. That entry is
/// held back and handed out by the first `advance`, so callers see the same lazy protocol as
/// on POSIX.
pub(crate) struct FindDir {
    handle: HANDLE,
    data: WIN32_FIND_DATAA,
    pending_first: bool,
    positioned: bool,
}

// SAFETY: the find handle is owned exclusively by this value and only driven through
// `&mut self`.
unsafe impl Send for FindDir {}

impl FindDir {
    fn open(path: &Path) -> Result<Self> {
        let raw = path.as_os_str().as_encoded_bytes();
        if raw.contains(&0) {
            return Err(anyhow!("{} contains a NUL byte", path.display()));
        }
        let mut pattern = Vec::with_capacity(raw.len() + 3);
        pattern.extend_from_slice(raw);
        pattern.extend_from_slice(b"\\*\0");

        // SAFETY: WIN32_FIND_DATAA is plain old data; all-zero is a valid value.
        let mut data: WIN32_FIND_DATAA = unsafe { mem::zeroed() };
        // SAFETY: `pattern` is NUL-terminated and `data` is a valid out-pointer.
        let handle = unsafe { FindFirstFileA(pattern.as_ptr(), &mut data) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error())
                .with_context(|| format!("cannot open directory {}", path.display()));
        }

        Ok(Self {
            handle,
            data,
            pending_first: true,
            positioned: false,
        })
    }

    pub(crate) fn advance(&mut self) -> bool {
        if self.pending_first {
            self.pending_first = false;
            self.positioned = true;
            return true;
        }
        // SAFETY: `handle` is a live find handle owned by `self`.
        self.positioned = unsafe { FindNextFileA(self.handle, &mut self.data) } != 0;
        self.positioned
    }

    pub(crate) fn name(&self) -> &[u8] {
        if !self.positioned {
            return &[];
        }
        let raw = &self.data.cFileName;
        // SAFETY: `cFileName` is a byte array; reinterpreting its elements as `u8` is sound
        // whichever 8-bit char type the bindings use.
        let bytes = unsafe { std::slice::from_raw_parts(raw.as_ptr().cast::<u8>(), raw.len()) };
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        &bytes[..end]
    }
}

impl Drop for FindDir {
    fn drop(&mut self) {
        // SAFETY: `handle` came from `FindFirstFileA` and is closed exactly once.
        unsafe {
            FindClose(self.handle);
        }
    }
}

pub(super) fn open_dir(path: &Path) -> Result<RawDir> {
    FindDir::open(path).map(RawDir::Windows)
}

/// Symbolic links are not reported on Windows.
pub(super) fn is_symlink(_path: &Path) -> Result<bool> {
    Ok(false)
}

/// `GetFullPathName`: resolves against the current directory without touching the disk.
pub(super) fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("cannot resolve {}", path.display()))
}

pub(super) fn temp_dir() -> Result<PathBuf> {
    Ok(std::env::temp_dir())
}

pub(super) fn make_dir(path: &Path, _mode: u32) -> io::Result<()> {
    std::fs::create_dir(path)
}

/// `CopyFile` through `std::fs::copy`.
pub(super) fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    std::fs::copy(from, to)
        .with_context(|| format!("cannot copy {} to {}", from.display(), to.display()))
}

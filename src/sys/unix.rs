use std::ffi::{CStr, CString};
use std::fs::File;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

use anyhow::{Context, anyhow};

use super::RawDir;
use crate::core::Result;

/// `opendir`/`readdir` stream.
///
/// `readdir` is lazy: nothing is read on open, so the first `advance` yields the first entry.
pub(crate) struct PosixDir {
    dir: NonNull<libc::DIR>,
    ent: *const libc::dirent,
}

// SAFETY: the stream is owned exclusively by this value and only driven through `&mut self`;
// moving it to another thread does not alias it.
unsafe impl Send for PosixDir {}

impl PosixDir {
    fn open(path: &Path) -> Result<Self> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .with_context(|| format!("{} contains a NUL byte", path.display()))?;
        // SAFETY: `c_path` is NUL-terminated and outlives the call.
        let dir = unsafe { libc::opendir(c_path.as_ptr()) };
        let dir = NonNull::new(dir)
            .ok_or_else(io::Error::last_os_error)
            .with_context(|| format!("cannot open directory {}", path.display()))?;
        Ok(Self {
            dir,
            ent: ptr::null(),
        })
    }

    pub(crate) fn advance(&mut self) -> bool {
        // SAFETY: `dir` is a live stream owned by `self`.
        self.ent = unsafe { libc::readdir(self.dir.as_ptr()) }.cast_const();
        !self.ent.is_null()
    }

    pub(crate) fn name(&self) -> &[u8] {
        if self.ent.is_null() {
            return &[];
        }
        // SAFETY: `ent` points into the stream's buffer, which stays valid until the next
        // `readdir` or `closedir`. Both need `&mut self`, so the borrow cannot outlive it.
        unsafe { CStr::from_ptr((*self.ent).d_name.as_ptr()) }.to_bytes()
    }
}

impl Drop for PosixDir {
    fn drop(&mut self) {
        // SAFETY: `dir` came from `opendir` and is closed exactly once.
        unsafe {
            libc::closedir(self.dir.as_ptr());
        }
    }
}

pub(super) fn open_dir(path: &Path) -> Result<RawDir> {
    PosixDir::open(path).map(RawDir::Posix)
}

pub(super) fn is_symlink(path: &Path) -> Result<bool> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("cannot lstat {}", path.display()))?;
    Ok(meta.file_type().is_symlink())
}

/// `realpath(3)`: every component must exist.
pub(super) fn absolute(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).with_context(|| format!("cannot resolve {}", path.display()))
}

pub(super) fn temp_dir() -> Result<PathBuf> {
    std::env::var_os("TMPDIR")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("TMPDIR is not set"))
}

pub(super) fn make_dir(path: &Path, mode: u32) -> io::Result<()> {
    std::fs::DirBuilder::new().mode(mode).create(path)
}

pub(super) fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    use std::os::unix::fs::MetadataExt;

    let mut src = super::open_read(from)?;
    let meta = src
        .metadata()
        .with_context(|| format!("cannot stat {}", from.display()))?;
    // Opening the destination truncates it, which would empty a source reached by both paths.
    if let Ok(existing) = std::fs::metadata(to) {
        if existing.dev() == meta.dev() && existing.ino() == meta.ino() {
            return Err(anyhow!(
                "{} and {} are the same file",
                from.display(),
                to.display()
            ));
        }
    }
    let mut dst = super::create_write(to)?;
    let len = meta.len();

    // Pseudo files report a zero length but still have content.
    if len > 0 {
        if let Some(copied) = transfer(&src, &dst, len)
            .with_context(|| format!("cannot copy {} to {}", from.display(), to.display()))?
        {
            return Ok(copied);
        }
    }

    io::copy(&mut src, &mut dst)
        .with_context(|| format!("cannot copy {} to {}", from.display(), to.display()))
}

/// In-kernel transfer with `sendfile(2)`.
/// Returns `None` when the pair of files does not support it and nothing was sent.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn transfer(src: &File, dst: &File, len: u64) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    const MAX_CHUNK: u64 = 0x7fff_f000;

    let mut copied = 0u64;
    while copied < len {
        let chunk = (len - copied).min(MAX_CHUNK) as usize;
        // SAFETY: both descriptors are open for the duration of the call; a null offset
        // makes the kernel use and advance the source file position.
        let sent =
            unsafe { libc::sendfile(dst.as_raw_fd(), src.as_raw_fd(), ptr::null_mut(), chunk) };
        if sent < 0 {
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINVAL) | Some(libc::ENOSYS) if copied == 0 => return Ok(None),
                _ if err.kind() == io::ErrorKind::Interrupted => continue,
                _ => return Err(err),
            }
        }
        if sent == 0 {
            break;
        }
        copied += sent as u64;
    }
    Ok(Some(copied))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn transfer(_src: &File, _dst: &File, _len: u64) -> io::Result<Option<u64>> {
    Ok(None)
}

//! The [`Fs`] context and the operations performed through it.
//!
//! ### Error reporting
//! Operations report failure with `false` or `None` only. "Does not exist", "wrong kind" and
//! "permission denied" are not told apart. The underlying platform error is emitted through
//! the `log` facade at `debug` level for hosts that install a logger.
//!
//! ### Idempotence
//! [`Fs::make_dir`] succeeds when the directory already exists; [`Fs::delete_dir`] and
//! [`Fs::delete_file`] succeed when the target is already gone.
//!
//! ### Races
//! Every call issues fresh system calls; nothing is cached and nothing is locked. A check
//! followed by an action (`exists` then `read_file`, say) can observe a filesystem changed by
//! someone else in between. Callers that care must tolerate that.

mod dir;
mod file;

use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use anyhow::{Context, anyhow};

use crate::core::{Result, Written, utils};
use crate::hooks::{Buffer, Hooks};
use crate::{EntryKind, sys};

pub use dir::DirCursor;
pub use file::FileCursor;

/// Permission bits `make_dir` uses on unix unless configured otherwise.
pub const DEFAULT_DIR_MODE: u32 = 0o700;

/// Settings of an [`Fs`] context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FsOptions {
    /// Mode for directories created by [`Fs::make_dir`]. Ignored on Windows.
    pub dir_mode: u32,
}

impl Default for FsOptions {
    fn default() -> Self {
        Self {
            dir_mode: DEFAULT_DIR_MODE,
        }
    }
}

/// Filesystem context.
///
/// Holds the allocation [`Hooks`] used for every [`Buffer`] it returns and the
/// [`FsOptions`]. Contexts are independent of each other, so different parts of a program
/// (or different tests) can account for their buffers separately.
///
/// ### Example:
/// ```no_run
/// use portable_fs::Fs;
///
/// let fs = Fs::new();
/// if fs.make_dir("/tmp/demo") {
///     fs.write_file("/tmp/demo/note.txt", b"Hello");
///     let content = fs.read_file("/tmp/demo/note.txt").unwrap();
///     assert_eq!(&*content, b"Hello");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Fs {
    hooks: Hooks,
    options: FsOptions,
}

/// Builder for [`Fs`].
#[derive(Debug, Default)]
pub struct FsBuilder {
    hooks: Hooks,
    options: FsOptions,
}

impl FsBuilder {
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn dir_mode(mut self, mode: u32) -> Self {
        self.options.dir_mode = mode;
        self
    }

    pub fn options(mut self, options: FsOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Fs {
        Fs {
            hooks: self.hooks,
            options: self.options,
        }
    }
}

impl Fs {
    /// Creates a context with the default hooks and options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> FsBuilder {
        FsBuilder::default()
    }

    /// Replaces the allocation hooks; the last registration wins.
    ///
    /// Buffers allocated before the call keep releasing through the hooks that allocated them.
    pub fn register_hooks(&mut self, hooks: Hooks) {
        self.hooks = hooks;
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn options(&self) -> &FsOptions {
        &self.options
    }

    // ---- paths ----

    /// Writes `left/right` into `buf`. See [`path::join`](crate::path::join).
    pub fn join_path<L, R>(&self, buf: &mut [u8], left: &L, right: &R) -> Written
    where
        L: AsRef<[u8]> + ?Sized,
        R: AsRef<[u8]> + ?Sized,
    {
        crate::path::join(buf, left, right)
    }

    /// Writes the canonical absolute form of `path` into `buf`.
    ///
    /// On unix every component must exist (`realpath`). On Windows the path is resolved
    /// against the current directory without checking the disk (`GetFullPathName`).
    pub fn absolute<P: AsRef<Path>>(&self, path: P, buf: &mut [u8]) -> Option<Written> {
        let path = path.as_ref();
        settle("absolute", sys::absolute(path))
            .map(|abs| utils::write_truncated(buf, &[sys::path_bytes(&abs)]))
    }

    /// Writes the current working directory into `buf`.
    pub fn current_dir(&self, buf: &mut [u8]) -> Option<Written> {
        settle("current_dir", sys::current_dir())
            .map(|cwd| utils::write_truncated(buf, &[sys::path_bytes(&cwd)]))
    }

    /// Writes the temporary directory into `buf`.
    /// On unix this is `TMPDIR`; `None` is returned when it is not set.
    pub fn temp_dir(&self, buf: &mut [u8]) -> Option<Written> {
        settle("temp_dir", sys::temp_dir())
            .map(|tmp| utils::write_truncated(buf, &[sys::path_bytes(&tmp)]))
    }

    /// [`path::dirname`](crate::path::dirname) copied into a hook-allocated buffer.
    pub fn dirname<P: AsRef<[u8]> + ?Sized>(&self, path: &P) -> Option<Buffer> {
        self.hooks.buffer_from(crate::path::dirname(path))
    }

    /// [`path::basename`](crate::path::basename) copied into a hook-allocated buffer.
    pub fn basename<P: AsRef<[u8]> + ?Sized>(&self, path: &P) -> Option<Buffer> {
        self.hooks.buffer_from(crate::path::basename(path))
    }

    // ---- queries ----

    /// Kind of the entry at `path`, following symlinks.
    pub fn kind<P: AsRef<Path>>(&self, path: P) -> Option<EntryKind> {
        settle("kind", sys::kind(path.as_ref()))
    }

    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.kind(path).is_some()
    }

    pub fn is_directory<P: AsRef<Path>>(&self, path: P) -> bool {
        self.kind(path).is_some_and(|k| k.is_dir())
    }

    pub fn is_file<P: AsRef<Path>>(&self, path: P) -> bool {
        self.kind(path).is_some_and(|k| k.is_file())
    }

    /// Whether `path` itself is a symbolic link. Always `false` on Windows.
    pub fn is_symlink<P: AsRef<Path>>(&self, path: P) -> bool {
        settle("is_symlink", sys::is_symlink(path.as_ref())).unwrap_or(false)
    }

    /// Size in bytes of the file at `path`, `None` if it cannot be opened or queried.
    pub fn file_size<P: AsRef<Path>>(&self, path: P) -> Option<u64> {
        let path = path.as_ref();
        settle("file_size", file_len(path))
    }

    // ---- file content ----

    /// Reads the whole file into a buffer from the registered allocate hook.
    ///
    /// The buffer is NUL-terminated; the terminator is not counted in its length.
    /// Ownership passes to the caller, and dropping the buffer hands it to the release hook.
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Option<Buffer> {
        settle("read_file", self.load(path.as_ref()))
    }

    /// Reads the file into a caller-owned buffer without allocating.
    ///
    /// At most `buf.len() - 1` bytes are read and followed by a NUL terminator. The returned
    /// value is the *true* file size, so `size >= buf.len()` means the content was truncated.
    pub fn read_file_buffer<P: AsRef<Path>>(&self, path: P, buf: &mut [u8]) -> Option<u64> {
        settle("read_file_buffer", load_into(path.as_ref(), buf))
    }

    /// Creates or truncates `path` and writes `content` to it.
    ///
    /// Returns `false` only if the file cannot be opened for writing. Failures after that
    /// point are logged but still reported as success.
    pub fn write_file<P: AsRef<Path>>(&self, path: P, content: &[u8]) -> bool {
        let path = path.as_ref();
        let Some(mut file) = settle("write_file", sys::create_write(path)) else {
            return false;
        };
        if let Err(err) = file.write_all(content).and_then(|()| file.flush()) {
            log::debug!("write_file: short write to {}: {err}", path.display());
        }
        true
    }

    /// Same as [`Fs::copy_file`].
    pub fn copy<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> bool {
        self.copy_file(from, to)
    }

    /// Duplicates `from` into `to` byte for byte, creating or truncating `to`.
    ///
    /// On Linux the kernel `sendfile` transfer is used when the files allow it; otherwise
    /// the content goes through a read/write loop. Windows uses `CopyFile`.
    ///
    /// On unix, copying a file onto itself (the same path, or a hard or symbolic link to
    /// it) fails and leaves the file untouched.
    pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> bool {
        settle("copy_file", sys::copy_file(from.as_ref(), to.as_ref())).is_some()
    }

    /// Opens `path` for byte-at-a-time reading.
    ///
    /// The cursor's read-ahead block comes from the registered allocate hook.
    pub fn iter_file<P: AsRef<Path>>(&self, path: P) -> Option<FileCursor> {
        settle("iter_file", FileCursor::open(path.as_ref(), &self.hooks))
    }

    // ---- directories ----

    /// Opens a cursor over the entries of the directory at `path`.
    pub fn open_dir<P: AsRef<Path>>(&self, path: P) -> Option<DirCursor> {
        settle("open_dir", DirCursor::open(path.as_ref()))
    }

    /// Creates one directory level; the parent must exist.
    /// Returns `true` if the directory was created or already existed.
    pub fn make_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        match sys::make_dir(path, self.options.dir_mode) {
            Ok(()) => true,
            Err(err)
                if utils::io_kind(&err) == Some(ErrorKind::AlreadyExists)
                    && self.is_directory(path) =>
            {
                log::trace!("make_dir: {} already exists", path.display());
                true
            }
            Err(err) => {
                log::debug!("make_dir failed: {err:#}");
                false
            }
        }
    }

    /// Removes an empty directory. Returns `true` if it was removed or did not exist.
    pub fn delete_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        absent_ok("delete_dir", path.as_ref(), sys::remove_dir(path.as_ref()))
    }

    /// Removes a file. Returns `true` if it was removed or did not exist.
    pub fn delete_file<P: AsRef<Path>>(&self, path: P) -> bool {
        absent_ok("delete_file", path.as_ref(), sys::remove_file(path.as_ref()))
    }

    fn load(&self, path: &Path) -> Result<Buffer> {
        let mut file = sys::open_read(path)?;
        let size = file
            .metadata()
            .with_context(|| format!("cannot stat {}", path.display()))?
            .len();
        let size = usize::try_from(size)
            .with_context(|| format!("{} does not fit in memory", path.display()))?;

        let mut buffer = self
            .hooks
            .buffer(size)
            .ok_or_else(|| anyhow!(
                "cannot allocate {} bytes for {}",
                size.saturating_add(1),
                path.display()
            ))?;
        let read = read_up_to(&mut file, &mut buffer.storage_mut()[..size])
            .with_context(|| format!("cannot read {}", path.display()))?;
        buffer.truncate(read);

        Ok(buffer)
    }
}

fn file_len(path: &Path) -> Result<u64> {
    let file = sys::open_read(path)?;
    let meta = file
        .metadata()
        .with_context(|| format!("cannot stat {}", path.display()))?;
    Ok(meta.len())
}

fn load_into(path: &Path, buf: &mut [u8]) -> Result<u64> {
    let mut file = sys::open_read(path)?;
    let size = file
        .metadata()
        .with_context(|| format!("cannot stat {}", path.display()))?
        .len();

    if let Some(room) = buf.len().checked_sub(1) {
        let want = usize::try_from(size).map_or(room, |size| size.min(room));
        let read = read_up_to(&mut file, &mut buf[..want])
            .with_context(|| format!("cannot read {}", path.display()))?;
        buf[read] = 0;
    }

    Ok(size)
}

/// Fills `dst` from `reader` until it is full or the reader is exhausted.
fn read_up_to<R: Read>(reader: &mut R, dst: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < dst.len() {
        match reader.read(&mut dst[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Collapses a platform result into the sentinel surface, logging the error.
fn settle<T>(op: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("{op} failed: {err:#}");
            None
        }
    }
}

/// Treats "not found" as success for removals.
fn absent_ok(op: &str, path: &Path, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) if utils::io_kind(&err) == Some(ErrorKind::NotFound) => {
            log::trace!("{op}: {} already absent", path.display());
            true
        }
        Err(err) => {
            log::debug!("{op} failed: {err:#}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::tests::{Counters, dirty_hooks};
    use tempdir::TempDir;

    mod creations {
        use super::*;

        #[test]
        fn test_new_uses_defaults() {
            let fs = Fs::new();
            assert_eq!(fs.options().dir_mode, DEFAULT_DIR_MODE);
        }

        #[test]
        fn test_builder_sets_options() {
            let fs = Fs::builder().dir_mode(0o755).build();
            assert_eq!(fs.options().dir_mode, 0o755);

            let fs = Fs::builder()
                .options(FsOptions { dir_mode: 0o711 })
                .build();
            assert_eq!(fs.options().dir_mode, 0o711);
        }

        #[test]
        fn test_builder_hooks_are_used() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("f");
            std::fs::write(&file, b"abc").unwrap();

            let counters = Counters::default();
            let fs = Fs::builder().hooks(counters.hooks()).build();

            let content = fs.read_file(&file).unwrap();
            assert_eq!(counters.allocated(), 1);
            drop(content);
            assert_eq!(counters.released(), 1);
        }

        #[test]
        fn test_register_hooks_last_write_wins() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("f");
            std::fs::write(&file, b"abc").unwrap();

            let first = Counters::default();
            let second = Counters::default();
            let mut fs = Fs::new();
            fs.register_hooks(first.hooks());
            fs.register_hooks(second.hooks());

            drop(fs.read_file(&file).unwrap());
            assert_eq!(first.allocated(), 0);
            assert_eq!(second.allocated(), 1);
            assert_eq!(second.released(), 1);
        }

        #[test]
        fn test_buffer_released_through_allocating_hooks() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("f");
            std::fs::write(&file, b"abc").unwrap();

            let first = Counters::default();
            let second = Counters::default();
            let mut fs = Fs::builder().hooks(first.hooks()).build();

            let content = fs.read_file(&file).unwrap();
            fs.register_hooks(second.hooks());
            drop(content);

            assert_eq!(first.released(), 1);
            assert_eq!(second.released(), 0);
        }

        #[test]
        fn test_contexts_are_independent() {
            let a = Counters::default();
            let b = Counters::default();
            let fs_a = Fs::builder().hooks(a.hooks()).build();
            let fs_b = Fs::builder().hooks(b.hooks()).build();

            let _dir = fs_a.dirname("x/y").unwrap();
            let _base = fs_b.basename("x/y").unwrap();
            let _again = fs_b.basename("x/z").unwrap();

            assert_eq!(a.allocated(), 1);
            assert_eq!(b.allocated(), 2);
        }
    }

    mod paths {
        use super::*;

        #[test]
        fn test_join_path() {
            let fs = Fs::new();
            let mut buf = [0u8; 32];
            let written = fs.join_path(&mut buf, "tests", "data");
            assert_eq!(written.of(&buf), b"tests/data");
        }

        #[cfg(unix)]
        #[test]
        fn test_absolute_existing() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let mut buf = [0u8; 4096];

            let written = fs.absolute(temp_dir.path(), &mut buf).unwrap();
            let expected = std::fs::canonicalize(temp_dir.path()).unwrap();
            assert_eq!(written.of(&buf), sys::path_bytes(&expected));
            assert!(!written.is_truncated());
        }

        #[cfg(unix)]
        #[test]
        fn test_absolute_missing_fails() {
            let temp_dir = setup_test_env();
            let mut buf = [0u8; 4096];
            assert!(
                Fs::new()
                    .absolute(temp_dir.path().join("missing"), &mut buf)
                    .is_none()
            );
        }

        #[test]
        fn test_absolute_truncates() {
            let temp_dir = setup_test_env();
            let mut buf = [0u8; 4];
            let written = Fs::new().absolute(temp_dir.path(), &mut buf).unwrap();
            assert!(written.is_truncated());
            assert_eq!(written.len(), 3);
            assert_eq!(buf[3], 0);
        }

        #[test]
        fn test_current_dir() {
            let mut buf = [0u8; 4096];
            let written = Fs::new().current_dir(&mut buf).unwrap();
            let expected = std::env::current_dir().unwrap();
            assert_eq!(written.of(&buf), sys::path_bytes(&expected));
        }

        /// Pins `TMPDIR` to the directory it already resolves to, so tests running in
        /// parallel keep creating their temp dirs in the same place.
        #[cfg(unix)]
        fn pin_tmpdir() -> std::path::PathBuf {
            let tmp = std::env::temp_dir();
            // SAFETY: the value written is the one every reader already observes.
            unsafe { std::env::set_var("TMPDIR", &tmp) };
            tmp
        }

        #[cfg(unix)]
        #[test]
        fn test_temp_dir_reads_tmpdir() {
            let tmp = pin_tmpdir();
            let mut buf = [0u8; 4096];

            let written = Fs::new().temp_dir(&mut buf).unwrap();
            assert_eq!(written.of(&buf), sys::path_bytes(&tmp));
            assert!(!written.is_truncated());
            assert_eq!(buf[written.len()], 0);
        }

        #[cfg(unix)]
        #[test]
        fn test_temp_dir_truncates() {
            let tmp = pin_tmpdir();
            let expected = sys::path_bytes(&tmp);
            let mut buf = [0u8; 3];

            let written = Fs::new().temp_dir(&mut buf).unwrap();
            assert!(written.is_truncated());
            assert_eq!(written.required(), expected.len());
            assert_eq!(written.of(&buf), &expected[..2]);
            assert_eq!(buf[2], 0);
        }

        #[cfg(windows)]
        #[test]
        fn test_temp_dir() {
            let mut buf = [0u8; 4096];
            let written = Fs::new().temp_dir(&mut buf).unwrap();
            assert_eq!(written.of(&buf), sys::path_bytes(&std::env::temp_dir()));
        }

        #[test]
        fn test_dirname_basename_buffers() {
            let fs = Fs::new();

            let dir = fs.dirname("/foo/bar/").unwrap();
            assert_eq!(dir.as_bytes_with_nul(), b"/foo/bar\0");

            let base = fs.basename("/foo/bar.txt").unwrap();
            assert_eq!(&*base, b"bar.txt");

            let dot = fs.basename(".").unwrap();
            assert_eq!(&*dot, b".");
            assert!(fs.dirname(".").unwrap().is_empty());
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn test_exists() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("file");
            std::fs::write(&file, b"").unwrap();

            assert!(fs.exists(temp_dir.path()));
            assert!(fs.exists(&file));
            assert!(!fs.exists(temp_dir.path().join("unknown")));
        }

        #[test]
        fn test_is_directory() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            assert!(fs.is_directory(temp_dir.path()));
            assert!(!fs.is_directory(&file));
            assert!(!fs.is_directory(temp_dir.path().join("unknown")));
        }

        #[test]
        fn test_is_file() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            assert!(!fs.is_file(temp_dir.path()));
            assert!(fs.is_file(&file));
            assert!(!fs.is_file(temp_dir.path().join("unknown")));
        }

        #[test]
        fn test_kind() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            assert_eq!(fs.kind(temp_dir.path()), Some(EntryKind::Directory));
            assert_eq!(fs.kind(&file), Some(EntryKind::File));
            assert_eq!(fs.kind(temp_dir.path().join("unknown")), None);
        }

        #[cfg(unix)]
        #[test]
        fn test_is_symlink() {
            use std::os::unix::fs::symlink;

            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let target = temp_dir.path().join("real.txt");
            let link = temp_dir.path().join("link.txt");
            std::fs::write(&target, b"content").unwrap();
            symlink(&target, &link).unwrap();

            assert!(fs.is_symlink(&link));
            assert!(!fs.is_symlink(&target));
            assert!(!fs.is_symlink(temp_dir.path().join("unknown")));
            // kind follows the link
            assert!(fs.is_file(&link));
            assert_eq!(fs.kind(&link), Some(EntryKind::File));
        }

        #[cfg(unix)]
        #[test]
        fn test_kind_of_directory_link() {
            use std::os::unix::fs::symlink;

            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let target = temp_dir.path().join("real");
            let link = temp_dir.path().join("link");
            std::fs::create_dir(&target).unwrap();
            symlink(&target, &link).unwrap();

            assert_eq!(fs.kind(&link), Some(EntryKind::Directory));
            assert!(fs.is_directory(&link));
            assert!(fs.is_symlink(&link));
        }

        #[cfg(unix)]
        #[test]
        fn test_dangling_symlink() {
            use std::os::unix::fs::symlink;

            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let link = temp_dir.path().join("dangling");
            symlink(temp_dir.path().join("nowhere"), &link).unwrap();

            assert!(fs.is_symlink(&link));
            assert!(!fs.exists(&link));
        }

        #[cfg(windows)]
        #[test]
        fn test_is_symlink_always_false() {
            let temp_dir = setup_test_env();
            assert!(!Fs::new().is_symlink(temp_dir.path()));
        }

        #[test]
        fn test_file_size() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            assert_eq!(fs.file_size(&file), Some(5));
            assert_eq!(fs.file_size(temp_dir.path().join("unknown")), None);
        }
    }

    mod read_file {
        use super::*;

        #[test]
        fn test_read_file_content_and_terminator() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            let content = Fs::new().read_file(&file).unwrap();
            assert_eq!(content.len(), 5);
            assert_eq!(&*content, b"hello");
            assert_eq!(content.as_bytes_with_nul()[5], 0);
        }

        #[test]
        fn test_read_empty_file() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("empty");
            std::fs::write(&file, b"").unwrap();

            let content = Fs::new().read_file(&file).unwrap();
            assert!(content.is_empty());
            assert_eq!(content.as_bytes_with_nul(), b"\0");
        }

        #[test]
        fn test_read_file_terminated_with_dirty_hooks() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("hello.txt");
            std::fs::write(&file, b"hello").unwrap();

            let fs = Fs::builder().hooks(dirty_hooks()).build();
            let content = fs.read_file(&file).unwrap();
            assert_eq!(content.as_bytes_with_nul(), b"hello\0");

            let base = fs.basename("dir/abc").unwrap();
            assert_eq!(base.as_bytes_with_nul(), b"abc\0");
        }

        #[test]
        fn test_read_unknown_file() {
            let temp_dir = setup_test_env();
            assert!(Fs::new().read_file(temp_dir.path().join("unknown")).is_none());
        }

        #[test]
        fn test_read_file_allocates_size_plus_one() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("data");
            std::fs::write(&file, vec![7u8; 1000]).unwrap();

            let counters = Counters::default();
            let fs = Fs::builder().hooks(counters.hooks()).build();
            let content = fs.read_file(&file).unwrap();

            assert_eq!(content.len(), 1000);
            assert_eq!(
                counters.bytes.load(std::sync::atomic::Ordering::SeqCst),
                1001
            );
        }

        #[test]
        fn test_read_file_failing_hook() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("data");
            std::fs::write(&file, b"data").unwrap();

            let fs = Fs::builder()
                .hooks(Hooks::new(|_| None, drop::<Box<[u8]>>))
                .build();
            assert!(fs.read_file(&file).is_none());
        }

        #[test]
        fn test_read_file_buffer_fits() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            let mut buf = [0xffu8; 16];
            assert_eq!(Fs::new().read_file_buffer(&file, &mut buf), Some(5));
            assert_eq!(&buf[..6], b"hello\0");
        }

        #[test]
        fn test_read_file_buffer_truncates_and_reports_true_size() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            let mut buf = [0xffu8; 3];
            assert_eq!(Fs::new().read_file_buffer(&file, &mut buf), Some(5));
            assert_eq!(buf, *b"he\0");
        }

        #[test]
        fn test_read_file_buffer_exact_fit() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            let mut buf = [0xffu8; 6];
            assert_eq!(Fs::new().read_file_buffer(&file, &mut buf), Some(5));
            assert_eq!(buf, *b"hello\0");
        }

        #[test]
        fn test_read_file_buffer_empty_buffer() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            let mut buf: [u8; 0] = [];
            assert_eq!(Fs::new().read_file_buffer(&file, &mut buf), Some(5));
        }

        #[test]
        fn test_read_file_buffer_never_allocates_through_hooks() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("hello");
            std::fs::write(&file, b"hello").unwrap();

            let counters = Counters::default();
            let fs = Fs::builder().hooks(counters.hooks()).build();
            let mut buf = [0u8; 8];
            fs.read_file_buffer(&file, &mut buf).unwrap();

            assert_eq!(counters.allocated(), 0);
        }

        #[test]
        fn test_read_file_buffer_unknown_file() {
            let temp_dir = setup_test_env();
            let mut buf = [0u8; 8];
            assert_eq!(
                Fs::new().read_file_buffer(temp_dir.path().join("unknown"), &mut buf),
                None
            );
        }
    }

    mod write_copy {
        use super::*;

        #[cfg(unix)]
        #[test]
        fn test_copy_onto_itself_keeps_content() {
            use std::os::unix::fs::symlink;

            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("same");
            let link = temp_dir.path().join("alias");
            std::fs::write(&file, b"keep me").unwrap();
            symlink(&file, &link).unwrap();

            assert!(!fs.copy_file(&file, &file));
            assert!(!fs.copy_file(&file, &link));
            assert_eq!(std::fs::read(&file).unwrap(), b"keep me");
        }

        #[test]
        fn test_write_file_creates_and_truncates() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("out");

            assert!(fs.write_file(&file, b"first version"));
            assert!(fs.write_file(&file, b"second"));
            assert_eq!(std::fs::read(&file).unwrap(), b"second");
        }

        #[test]
        fn test_write_file_missing_parent() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("no/such/dir/out");
            assert!(!Fs::new().write_file(&file, b"data"));
        }

        #[test]
        fn test_copy_file() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let from = temp_dir.path().join("from");
            let to = temp_dir.path().join("to");
            let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
            std::fs::write(&from, &content).unwrap();

            assert!(fs.copy_file(&from, &to));
            assert_eq!(std::fs::read(&to).unwrap(), content);
        }

        #[test]
        fn test_copy_overwrites_destination() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let from = temp_dir.path().join("from");
            let to = temp_dir.path().join("to");
            std::fs::write(&from, b"new").unwrap();
            std::fs::write(&to, b"much longer old content").unwrap();

            assert!(fs.copy(&from, &to));
            assert_eq!(std::fs::read(&to).unwrap(), b"new");
        }

        #[test]
        fn test_copy_empty_file() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let from = temp_dir.path().join("from");
            let to = temp_dir.path().join("to");
            std::fs::write(&from, b"").unwrap();

            assert!(fs.copy_file(&from, &to));
            assert!(fs.is_file(&to));
            assert_eq!(fs.file_size(&to), Some(0));
        }

        #[test]
        fn test_copy_missing_source() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let to = temp_dir.path().join("to");

            assert!(!fs.copy_file(temp_dir.path().join("missing"), &to));
        }
    }

    mod make_delete {
        use super::*;

        #[test]
        fn test_make_dir_idempotent() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let dir = temp_dir.path().join("data");

            assert!(fs.make_dir(&dir));
            assert!(fs.make_dir(&dir));
            assert!(fs.is_directory(&dir));

            let count = std::fs::read_dir(temp_dir.path()).unwrap().count();
            assert_eq!(count, 1);
        }

        #[test]
        fn test_make_dir_is_not_recursive() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            assert!(!fs.make_dir(temp_dir.path().join("a/b")));
            assert!(!fs.exists(temp_dir.path().join("a")));
        }

        #[test]
        fn test_make_dir_over_file_fails() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("file");
            std::fs::write(&file, b"").unwrap();

            assert!(!fs.make_dir(&file));
            assert!(fs.is_file(&file));
        }

        #[cfg(unix)]
        #[test]
        fn test_make_dir_applies_mode() {
            use std::os::unix::fs::PermissionsExt;

            let temp_dir = setup_test_env();
            let fs = Fs::builder().dir_mode(0o700).build();
            let dir = temp_dir.path().join("private");

            assert!(fs.make_dir(&dir));
            let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0);
        }

        #[test]
        fn test_delete_dir() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let dir = temp_dir.path().join("data");
            std::fs::create_dir(&dir).unwrap();

            assert!(fs.delete_dir(&dir));
            assert!(!fs.exists(&dir));
            assert!(fs.delete_dir(&dir));
        }

        #[test]
        fn test_delete_dir_not_empty_fails() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let dir = temp_dir.path().join("data");
            std::fs::create_dir(&dir).unwrap();
            std::fs::write(dir.join("inner"), b"").unwrap();

            assert!(!fs.delete_dir(&dir));
            assert!(fs.is_directory(&dir));
        }

        #[test]
        fn test_delete_file() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            let file = temp_dir.path().join("file");
            std::fs::write(&file, b"x").unwrap();

            assert!(fs.delete_file(&file));
            assert!(!fs.exists(&file));
            assert!(fs.delete_file(&file));
        }

        #[test]
        fn test_delete_nonexistent() {
            let temp_dir = setup_test_env();
            let fs = Fs::new();
            assert!(fs.delete_file(temp_dir.path().join("nope")));
            assert!(fs.delete_dir(temp_dir.path().join("nope")));
        }
    }

    // Helper function: Creates a temporary directory for tests
    fn setup_test_env() -> TempDir {
        TempDir::new("fs_test").unwrap()
    }
}

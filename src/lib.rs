//! Minimal cross-platform filesystem primitives for Rust.
//! One set of operations implemented once for POSIX and once for Windows: existence and kind
//! queries, path joining and splitting, whole-file and incremental reads, directory
//! enumeration, file and directory creation and deletion.
//!
//! ### Overview
//!
//! `portable-fs` is built around the [`Fs`] context. It carries the allocation [`Hooks`] used
//! for every buffer handed back to the caller, so a host application can route those buffers
//! through its own memory accounting.
//!
//! **Key ideas**:
//! - **Sentinels, not error types**: failures come back as `false` or `None`.
//! - **Caller buffers**: path-producing calls write into `&mut [u8]` with truncation and report
//!   the size they needed through [`Written`].
//! - **One cursor protocol**: [`DirCursor`] behaves the same on top of `readdir` and
//!   `FindFirstFile`; the current entry name is borrowed from the platform stream.
//! - **Idempotent create/delete**: creating what exists or deleting what is gone succeeds.
//!
//! ### Example
//! ```no_run
//! use portable_fs::{Fs, path};
//!
//! let fs = Fs::new();
//! let mut buf = [0u8; 256];
//! let written = fs.join_path(&mut buf, "data", "hello.txt");
//! let file = std::str::from_utf8(written.of(&buf)).unwrap();
//!
//! assert_eq!(fs.file_size(file), Some(5));
//! let content = fs.read_file(file).unwrap();
//! assert_eq!(&*content, b"hello");
//! assert_eq!(path::basename(file), b"hello.txt");
//! ```

mod core;
mod entry;
mod fs;
mod hooks;
pub mod path;
mod sys;

pub use crate::core::Written;
pub use entry::EntryKind;
pub use fs::{DEFAULT_DIR_MODE, DirCursor, FileCursor, Fs, FsBuilder, FsOptions};
pub use hooks::{Buffer, Hooks};

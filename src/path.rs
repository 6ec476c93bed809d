//! Separator-aware splitting and joining of byte-string paths.
//!
//! These functions never touch the filesystem and never allocate. Both `/` and `\` are
//! treated as separators on every platform, so paths built on one system can be split on
//! another. When a path mixes them, the rightmost separator of either kind wins.
//!
//! No normalization is performed: `.` and `..` components, repeated separators and
//! trailing separators are kept as they are.

use crate::core::{Written, utils};

/// Separator written by [`join`].
pub const SEPARATOR: u8 = b'/';

#[inline]
fn is_separator(b: u8) -> bool {
    b == b'/' || b == b'\\'
}

fn last_separator(path: &[u8]) -> Option<usize> {
    path.iter().rposition(|&b| is_separator(b))
}

/// Writes `left/right` into `buf`.
///
/// The output is truncated to the buffer and NUL-terminated (see [`Written`]). The returned
/// `required()` is the length of the untruncated result.
///
/// ```
/// let mut buf = [0u8; 16];
/// let written = portable_fs::path::join(&mut buf, "tests", "data");
/// assert_eq!(written.of(&buf), b"tests/data");
/// ```
pub fn join<L, R>(buf: &mut [u8], left: &L, right: &R) -> Written
where
    L: AsRef<[u8]> + ?Sized,
    R: AsRef<[u8]> + ?Sized,
{
    utils::write_truncated(buf, &[left.as_ref(), &[SEPARATOR], right.as_ref()])
}

/// Returns the tail of `path` starting at its last separator, separator included.
///
/// Returns `None` for a bare name. The separator character is returned as found.
///
/// ```
/// use portable_fs::path::rsplit;
///
/// assert_eq!(rsplit("a/b\\c"), Some(&b"\\c"[..]));
/// assert_eq!(rsplit("name.txt"), None);
/// ```
pub fn rsplit<P: AsRef<[u8]> + ?Sized>(path: &P) -> Option<&[u8]> {
    let path = path.as_ref();
    last_separator(path).map(|i| &path[i..])
}

/// Returns everything before the last separator.
///
/// A bare name (including `"."`) has an empty dirname. A trailing separator counts as the
/// last separator, so only that one separator is dropped: `"/foo/bar/"` gives `"/foo/bar"`.
pub fn dirname<P: AsRef<[u8]> + ?Sized>(path: &P) -> &[u8] {
    let path = path.as_ref();
    match last_separator(path) {
        Some(i) => &path[..i],
        None => &[],
    }
}

/// Returns everything after the last separator.
///
/// A bare name is returned unchanged. A path ending in a separator has an empty basename.
pub fn basename<P: AsRef<[u8]> + ?Sized>(path: &P) -> &[u8] {
    let path = path.as_ref();
    match last_separator(path) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

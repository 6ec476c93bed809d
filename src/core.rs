pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Outcome of writing into a caller-supplied `(buffer, capacity)` pair.
///
/// Writers never exceed the buffer. When the buffer is not empty the written bytes are
/// followed by a NUL terminator, so at most `capacity - 1` content bytes fit.
/// `required` is the number of content bytes that *would* have been written; compare it
/// with `len` (or call [`Written::is_truncated`]) to detect truncation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Written {
    len: usize,
    required: usize,
}

impl Written {
    /// Bytes actually written, excluding the terminator.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes the full output needs, excluding the terminator.
    pub fn required(&self) -> usize {
        self.required
    }

    pub fn is_truncated(&self) -> bool {
        self.len < self.required
    }

    /// Returns the written part of `buf`.
    /// * `buf` must be the buffer this result was produced for.
    pub fn of<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[..self.len.min(buf.len())]
    }
}

pub(crate) mod utils {
    use std::io::ErrorKind;

    use super::Written;

    /// Concatenates `parts` into `dst`, truncating to `dst.len() - 1` bytes and
    /// terminating with NUL. An empty `dst` receives nothing.
    pub fn write_truncated(dst: &mut [u8], parts: &[&[u8]]) -> Written {
        let required = parts.iter().map(|p| p.len()).sum();
        let Some(room) = dst.len().checked_sub(1) else {
            return Written { len: 0, required };
        };

        let mut len = 0;
        for part in parts {
            let take = part.len().min(room - len);
            dst[len..len + take].copy_from_slice(&part[..take]);
            len += take;
            if len == room {
                break;
            }
        }
        dst[len] = 0;

        Written { len, required }
    }

    /// Returns the `io::ErrorKind` underneath an error produced by the platform layer.
    pub fn io_kind(err: &anyhow::Error) -> Option<ErrorKind> {
        err.downcast_ref::<std::io::Error>().map(|e| e.kind())
    }

}

//! Pluggable allocation for the buffers this crate hands back to callers.
//!
//! Every [`Buffer`] is obtained from the allocate hook of the [`Hooks`] registered on the
//! [`Fs`](crate::Fs) at the time of the call, and goes back to the release hook of that same
//! `Hooks` value when the buffer is dropped. Re-registering hooks later does not change where
//! already-allocated buffers are released.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

type AllocateFn = dyn Fn(usize) -> Option<Box<[u8]>> + Send + Sync;
type ReleaseFn = dyn Fn(Box<[u8]>) + Send + Sync;

/// An allocate/release pair.
///
/// The allocate hook must return a block of exactly the requested size, or `None` when it
/// cannot. The block need not be zeroed: every byte a [`Buffer`] exposes, terminator
/// included, is written before it is handed out. The release hook receives every block the
/// allocate hook produced, once, when the owning [`Buffer`] is dropped.
#[derive(Clone)]
pub struct Hooks {
    allocate: Arc<AllocateFn>,
    release: Arc<ReleaseFn>,
}

impl Hooks {
    pub fn new<A, R>(allocate: A, release: R) -> Self
    where
        A: Fn(usize) -> Option<Box<[u8]>> + Send + Sync + 'static,
        R: Fn(Box<[u8]>) + Send + Sync + 'static,
    {
        Self {
            allocate: Arc::new(allocate),
            release: Arc::new(release),
        }
    }

    /// Allocates a buffer holding `content` followed by a NUL terminator.
    /// Returns `None` if the allocate hook fails or hands back a block of the wrong size.
    pub(crate) fn buffer_from(&self, content: &[u8]) -> Option<Buffer> {
        let mut buffer = self.buffer(content.len())?;
        buffer.storage_mut()[..content.len()].copy_from_slice(content);
        Some(buffer)
    }

    /// Allocates a buffer for `len` content bytes plus the terminator.
    ///
    /// Only the terminator is written; the content bytes are whatever the allocate hook left
    /// there and must be filled by the caller.
    pub(crate) fn buffer(&self, len: usize) -> Option<Buffer> {
        let size = len.checked_add(1)?;
        let mut block = (self.allocate)(size)?;
        if block.len() != size {
            log::debug!(
                "allocate hook returned {} bytes, {} requested",
                block.len(),
                size
            );
            (self.release)(block);
            return None;
        }
        block[len] = 0;
        Some(Buffer {
            block: Some(block),
            len,
            hooks: self.clone(),
        })
    }
}

impl Default for Hooks {
    /// Hooks backed by the global Rust allocator.
    fn default() -> Self {
        Self::new(|size| Some(vec![0u8; size].into_boxed_slice()), drop::<Box<[u8]>>)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

/// A NUL-terminated byte buffer allocated through [`Hooks`].
///
/// Derefs to the content bytes; the terminator is not part of [`Buffer::len`].
pub struct Buffer {
    block: Option<Box<[u8]>>,
    len: usize,
    hooks: Hooks,
}

impl Buffer {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.storage()[..self.len]
    }

    /// Content bytes followed by the terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.storage()[..=self.len]
    }

    /// Shrinks the content to `len` bytes and moves the terminator accordingly.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
            self.storage_mut()[len] = 0;
        }
    }

    /// Whole block, content and terminator.
    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        self.block.as_deref_mut().unwrap_or_default()
    }

    fn storage(&self) -> &[u8] {
        self.block.as_deref().unwrap_or_default()
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("content", &String::from_utf8_lossy(self.as_bytes()))
            .field("len", &self.len)
            .finish()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            (self.hooks.release)(block);
        }
    }
}

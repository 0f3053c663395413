//! Byte Buffer
//!
//! Binary-safe payload carrier exchanged between serializers and the raw
//! connection.
//!
//! ## Properties
//! - Immutable once built; clones share the same allocation
//! - Equality, ordering and hashing are defined on content only, so buffers
//!   of different origin with the same bytes are interchangeable map keys

use std::borrow::Borrow;
use std::fmt;

use bytes::Bytes;

use crate::error::{KvError, Result};

/// An immutable, length-aware sequence of raw bytes
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteBuffer {
    inner: Bytes,
}

impl ByteBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self { inner: Bytes::new() }
    }

    /// Copy `data` into a new buffer
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            inner: Bytes::copy_from_slice(data),
        }
    }

    /// Take ownership of `data` without copying
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { inner: Bytes::from(data) }
    }

    /// Number of bytes in the buffer
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Byte at `index`, or `OutOfBounds` when `index >= len()`
    pub fn at(&self, index: usize) -> Result<u8> {
        self.inner.get(index).copied().ok_or(KvError::OutOfBounds {
            index,
            length: self.inner.len(),
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.inner.to_vec()
    }

    /// Iterate over the bytes
    pub fn iter(&self) -> std::slice::Iter<'_, u8> {
        self.inner.iter()
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bytes renders as an escaped b"..." literal
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl Borrow<[u8]> for ByteBuffer {
    fn borrow(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(data: &[u8]) -> Self {
        Self::copy_from_slice(data)
    }
}

impl<const N: usize> From<&[u8; N]> for ByteBuffer {
    fn from(data: &[u8; N]) -> Self {
        Self::copy_from_slice(data)
    }
}

impl From<String> for ByteBuffer {
    fn from(text: String) -> Self {
        Self::from_vec(text.into_bytes())
    }
}

impl From<&str> for ByteBuffer {
    fn from(text: &str) -> Self {
        Self::copy_from_slice(text.as_bytes())
    }
}

impl From<Bytes> for ByteBuffer {
    fn from(inner: Bytes) -> Self {
        Self { inner }
    }
}

impl From<ByteBuffer> for Vec<u8> {
    fn from(buffer: ByteBuffer) -> Self {
        buffer.inner.into()
    }
}

impl From<ByteBuffer> for Bytes {
    fn from(buffer: ByteBuffer) -> Self {
        buffer.inner
    }
}

impl<'a> IntoIterator for &'a ByteBuffer {
    type Item = &'a u8;
    type IntoIter = std::slice::Iter<'a, u8>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

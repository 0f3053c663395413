//! Memory Module
//!
//! In-process implementation of the raw connection contract.
//!
//! ## Responsibilities
//! - Mirror the store's command semantics byte-for-byte at the contract
//!   level (counts, sentinels, range normalization, `WRONGTYPE`)
//! - Expire keys lazily on access using monotonic time
//! - Remove a key as soon as its collection becomes empty
//!
//! ## Data Structure Choice
//! A single `HashMap` keyspace behind a `parking_lot::Mutex`: every call
//! holds the lock for its whole duration, so a shared handle behaves like
//! one serialized session.

mod store;

pub use store::MemoryConnection;

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use crate::buffer::ByteBuffer;
use crate::error::{KvError, Result};

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

/// Value stored under one key
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Str(ByteBuffer),
    Hash(HashMap<ByteBuffer, ByteBuffer>),
    List(VecDeque<ByteBuffer>),
    Set(HashSet<ByteBuffer>),
    ZSet(HashMap<ByteBuffer, f64>),
}

/// A value plus its optional deadline
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) value: Value,
    pub(crate) expires_at: Option<Instant>,
}

impl Entry {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |deadline| deadline <= now)
    }

    /// True for collections that hold no elements
    pub(crate) fn is_hollow(&self) -> bool {
        match &self.value {
            Value::Str(_) => false,
            Value::Hash(h) => h.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Set(s) => s.is_empty(),
            Value::ZSet(z) => z.is_empty(),
        }
    }
}

fn wrong_type() -> KvError {
    KvError::Server(WRONG_TYPE.to_string())
}

impl Value {
    pub(crate) fn string(&self) -> Result<&ByteBuffer> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(wrong_type()),
        }
    }

    pub(crate) fn hash(&self) -> Result<&HashMap<ByteBuffer, ByteBuffer>> {
        match self {
            Value::Hash(h) => Ok(h),
            _ => Err(wrong_type()),
        }
    }

    pub(crate) fn hash_mut(&mut self) -> Result<&mut HashMap<ByteBuffer, ByteBuffer>> {
        match self {
            Value::Hash(h) => Ok(h),
            _ => Err(wrong_type()),
        }
    }

    pub(crate) fn list(&self) -> Result<&VecDeque<ByteBuffer>> {
        match self {
            Value::List(l) => Ok(l),
            _ => Err(wrong_type()),
        }
    }

    pub(crate) fn list_mut(&mut self) -> Result<&mut VecDeque<ByteBuffer>> {
        match self {
            Value::List(l) => Ok(l),
            _ => Err(wrong_type()),
        }
    }

    pub(crate) fn set(&self) -> Result<&HashSet<ByteBuffer>> {
        match self {
            Value::Set(s) => Ok(s),
            _ => Err(wrong_type()),
        }
    }

    pub(crate) fn set_mut(&mut self) -> Result<&mut HashSet<ByteBuffer>> {
        match self {
            Value::Set(s) => Ok(s),
            _ => Err(wrong_type()),
        }
    }

    pub(crate) fn zset(&self) -> Result<&HashMap<ByteBuffer, f64>> {
        match self {
            Value::ZSet(z) => Ok(z),
            _ => Err(wrong_type()),
        }
    }

    pub(crate) fn zset_mut(&mut self) -> Result<&mut HashMap<ByteBuffer, f64>> {
        match self {
            Value::ZSet(z) => Ok(z),
            _ => Err(wrong_type()),
        }
    }
}

/// Resolve an inclusive, possibly negative `start..=stop` range against a
/// sequence of `len` elements. `None` when the range selects nothing.
pub(crate) fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let start = if start < 0 { start.saturating_add(len).max(0) } else { start };
    let stop = if stop < 0 { stop.saturating_add(len) } else { stop };

    if start > stop || start >= len {
        return None;
    }
    let stop = stop.min(len - 1);
    Some((start as usize, stop as usize))
}

/// Resolve a single possibly negative index
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let index = if index < 0 { index.saturating_add(len) } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

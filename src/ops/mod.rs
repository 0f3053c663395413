//! Operations Module
//!
//! Typed views over one data-structure family each.
//!
//! ## Per-call Algorithm
//! 1. Serialize every domain-typed argument with the bound serializer(s)
//! 2. Issue exactly one raw-connection call
//! 3. Deserialize the reply into domain types
//!
//! Views hold no state of their own beyond shared handles to the connection
//! and serializers: nothing is cached, nothing is retried, and errors from
//! the connection propagate unchanged.
//!
//! ## Families
//! | Trait | Default adapter | Store type |
//! |-------|-----------------|------------|
//! | [`KeyOperations`] | [`DefaultKeyOperations`] | any key |
//! | [`ValueOperations`] | [`DefaultValueOperations`] | string |
//! | [`HashOperations`] | [`DefaultHashOperations`] | hash |
//! | [`ListOperations`] | [`DefaultListOperations`] | list |
//! | [`SetOperations`] | [`DefaultSetOperations`] | set |
//! | [`ZSetOperations`] | [`DefaultZSetOperations`] | sorted set |

mod hash;
mod key;
mod list;
mod set;
mod value;
mod zset;

use std::time::Duration;

use crate::buffer::ByteBuffer;
use crate::connection::SharedConnection;
use crate::error::Result;
use crate::serializer::SharedSerializer;

pub use hash::{DefaultHashOperations, HashOperations};
pub use key::{DefaultKeyOperations, KeyOperations};
pub use list::{DefaultListOperations, ListOperations};
pub use set::{DefaultSetOperations, SetOperations};
pub use value::{DefaultValueOperations, ValueOperations};
pub use zset::{DefaultZSetOperations, ZSetOperations};

/// Connection plus key/value serializers shared by a view
pub(crate) struct Bindings<K, V> {
    pub(crate) connection: SharedConnection,
    key_serializer: SharedSerializer<K>,
    value_serializer: SharedSerializer<V>,
}

impl<K, V> Bindings<K, V> {
    pub(crate) fn new(
        connection: SharedConnection,
        key_serializer: SharedSerializer<K>,
        value_serializer: SharedSerializer<V>,
    ) -> Self {
        Self {
            connection,
            key_serializer,
            value_serializer,
        }
    }

    pub(crate) fn key(&self, key: &K) -> Result<ByteBuffer> {
        self.key_serializer.serialize(key)
    }

    pub(crate) fn keys(&self, keys: &[K]) -> Result<Vec<ByteBuffer>> {
        encode_all(&self.key_serializer, keys)
    }

    pub(crate) fn value(&self, value: &V) -> Result<ByteBuffer> {
        self.value_serializer.serialize(value)
    }

    pub(crate) fn values(&self, values: &[V]) -> Result<Vec<ByteBuffer>> {
        encode_all(&self.value_serializer, values)
    }

    pub(crate) fn decode(&self, data: &ByteBuffer) -> Result<V> {
        self.value_serializer.deserialize(data)
    }

    pub(crate) fn decode_opt(&self, data: Option<ByteBuffer>) -> Result<Option<V>> {
        data.map(|d| self.decode(&d)).transpose()
    }

    /// Decode every buffer into any collection of `V`
    pub(crate) fn decode_all<C>(&self, data: Vec<ByteBuffer>) -> Result<C>
    where
        C: FromIterator<V>,
    {
        data.iter().map(|d| self.decode(d)).collect()
    }
}

pub(crate) fn encode_all<T>(serializer: &SharedSerializer<T>, items: &[T]) -> Result<Vec<ByteBuffer>> {
    items.iter().map(|item| serializer.serialize(item)).collect()
}

/// Whole seconds of `ttl`, clamped to the wire integer range
pub(crate) fn whole_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

/// Milliseconds of `ttl`, clamped to the wire integer range
///
/// A positive duration under one millisecond becomes 1, never 0.
pub(crate) fn whole_millis(ttl: Duration) -> i64 {
    let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    if millis == 0 && !ttl.is_zero() {
        1
    } else {
        millis
    }
}

/// `EXPIRE` when `ttl` is whole seconds, `PEXPIRE` otherwise
pub(crate) fn expire_after(
    connection: &SharedConnection,
    key: &ByteBuffer,
    ttl: Duration,
) -> Result<bool> {
    if ttl.subsec_nanos() == 0 {
        connection.expire(key, whole_seconds(ttl))
    } else {
        connection.pexpire(key, whole_millis(ttl))
    }
}

//! String (value) operations

use std::time::Duration;

use crate::connection::SharedConnection;
use crate::error::Result;
use crate::serializer::SharedSerializer;

use super::{whole_millis, Bindings};

/// Operations on string-typed keys
pub trait ValueOperations<K, V> {
    fn set(&self, key: &K, value: &V) -> Result<()>;

    /// Store only if the key is absent; true when the value was stored
    fn set_if_absent(&self, key: &K, value: &V) -> Result<bool>;

    /// Store with an expiry. Whole-second durations are sent in seconds,
    /// anything finer in milliseconds.
    fn set_with_expire(&self, key: &K, value: &V, ttl: Duration) -> Result<()>;

    fn get(&self, key: &K) -> Result<Option<V>>;

    /// Store `value` and return the previous one
    fn get_and_set(&self, key: &K, value: &V) -> Result<Option<V>>;

    /// Add `delta` to the integer stored at `key` (0 when absent)
    fn increment_by(&self, key: &K, delta: i64) -> Result<i64>;

    fn decrement_by(&self, key: &K, delta: i64) -> Result<i64>;

    /// Append to the stored value; returns its new length in bytes
    fn append(&self, key: &K, value: &V) -> Result<u64>;

    /// One slot per key, in request order
    fn multi_get(&self, keys: &[K]) -> Result<Vec<Option<V>>>;
}

/// [`ValueOperations`] bound to a raw connection
pub struct DefaultValueOperations<K, V> {
    bindings: Bindings<K, V>,
}

impl<K, V> DefaultValueOperations<K, V> {
    pub fn new(
        connection: SharedConnection,
        key_serializer: SharedSerializer<K>,
        value_serializer: SharedSerializer<V>,
    ) -> Self {
        Self {
            bindings: Bindings::new(connection, key_serializer, value_serializer),
        }
    }
}

impl<K, V> ValueOperations<K, V> for DefaultValueOperations<K, V> {
    fn set(&self, key: &K, value: &V) -> Result<()> {
        let key = self.bindings.key(key)?;
        let value = self.bindings.value(value)?;
        self.bindings.connection.set(&key, &value)
    }

    fn set_if_absent(&self, key: &K, value: &V) -> Result<bool> {
        let key = self.bindings.key(key)?;
        let value = self.bindings.value(value)?;
        self.bindings.connection.set_nx(&key, &value)
    }

    fn set_with_expire(&self, key: &K, value: &V, ttl: Duration) -> Result<()> {
        let key = self.bindings.key(key)?;
        let value = self.bindings.value(value)?;
        if ttl.subsec_nanos() == 0 {
            self.bindings.connection.set_ex(&key, &value, ttl.as_secs())
        } else {
            let millis = whole_millis(ttl).unsigned_abs();
            self.bindings.connection.set_px(&key, &value, millis)
        }
    }

    fn get(&self, key: &K) -> Result<Option<V>> {
        let key = self.bindings.key(key)?;
        let reply = self.bindings.connection.get(&key)?;
        self.bindings.decode_opt(reply)
    }

    fn get_and_set(&self, key: &K, value: &V) -> Result<Option<V>> {
        let key = self.bindings.key(key)?;
        let value = self.bindings.value(value)?;
        let previous = self.bindings.connection.getset(&key, &value)?;
        self.bindings.decode_opt(previous)
    }

    fn increment_by(&self, key: &K, delta: i64) -> Result<i64> {
        let key = self.bindings.key(key)?;
        self.bindings.connection.incrby(&key, delta)
    }

    fn decrement_by(&self, key: &K, delta: i64) -> Result<i64> {
        let key = self.bindings.key(key)?;
        self.bindings.connection.decrby(&key, delta)
    }

    fn append(&self, key: &K, value: &V) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let value = self.bindings.value(value)?;
        self.bindings.connection.append(&key, &value)
    }

    fn multi_get(&self, keys: &[K]) -> Result<Vec<Option<V>>> {
        let keys = self.bindings.keys(keys)?;
        self.bindings
            .connection
            .mget(&keys)?
            .into_iter()
            .map(|slot| self.bindings.decode_opt(slot))
            .collect()
    }
}

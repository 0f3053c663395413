//! List operations

use crate::connection::SharedConnection;
use crate::error::Result;
use crate::serializer::SharedSerializer;

use super::Bindings;

/// Operations on list-typed keys.
///
/// Indices are zero-based; negative indices count from the tail with `-1`
/// as the last element. Ranges include both ends.
pub trait ListOperations<K, V> {
    /// Push one value at the head; returns the new length
    fn lpush(&self, key: &K, value: &V) -> Result<u64>;

    /// Push values at the head in order, so the last one ends up first
    fn lpush_all(&self, key: &K, values: &[V]) -> Result<u64>;

    fn rpush(&self, key: &K, value: &V) -> Result<u64>;

    fn rpush_all(&self, key: &K, values: &[V]) -> Result<u64>;

    fn lpop(&self, key: &K) -> Result<Option<V>>;

    fn rpop(&self, key: &K) -> Result<Option<V>>;

    /// Elements `start..=stop` in head-to-tail order; empty when the key is
    /// absent or the range selects nothing
    fn lrange(&self, key: &K, start: i64, stop: i64) -> Result<Vec<V>>;

    /// Length of the list, 0 when absent
    fn llen(&self, key: &K) -> Result<u64>;

    fn lindex(&self, key: &K, index: i64) -> Result<Option<V>>;

    /// Remove occurrences of `value`: the first `count` from the head when
    /// positive, from the tail when negative, all of them when zero
    fn lrem(&self, key: &K, count: i64, value: &V) -> Result<u64>;
}

/// [`ListOperations`] bound to a raw connection
pub struct DefaultListOperations<K, V> {
    bindings: Bindings<K, V>,
}

impl<K, V> DefaultListOperations<K, V> {
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

impl<K, V> ListOperations<K, V> for DefaultListOperations<K, V> {
    fn lpush(&self, key: &K, value: &V) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let value = self.bindings.value(value)?;
        self.bindings.connection.lpush(&key, &value)
    }

    fn lpush_all(&self, key: &K, values: &[V]) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let values = self.bindings.values(values)?;
        self.bindings.connection.lpush_many(&key, &values)
    }

    fn rpush(&self, key: &K, value: &V) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let value = self.bindings.value(value)?;
        self.bindings.connection.rpush(&key, &value)
    }

    fn rpush_all(&self, key: &K, values: &[V]) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let values = self.bindings.values(values)?;
        self.bindings.connection.rpush_many(&key, &values)
    }

    fn lpop(&self, key: &K) -> Result<Option<V>> {
        let key = self.bindings.key(key)?;
        let popped = self.bindings.connection.lpop(&key)?;
        self.bindings.decode_opt(popped)
    }

    fn rpop(&self, key: &K) -> Result<Option<V>> {
        let key = self.bindings.key(key)?;
        let popped = self.bindings.connection.rpop(&key)?;
        self.bindings.decode_opt(popped)
    }

    fn lrange(&self, key: &K, start: i64, stop: i64) -> Result<Vec<V>> {
        let key = self.bindings.key(key)?;
        let items = self.bindings.connection.lrange(&key, start, stop)?;
        self.bindings.decode_all(items)
    }

    fn llen(&self, key: &K) -> Result<u64> {
        let key = self.bindings.key(key)?;
        self.bindings.connection.llen(&key)
    }

    fn lindex(&self, key: &K, index: i64) -> Result<Option<V>> {
        let key = self.bindings.key(key)?;
        let item = self.bindings.connection.lindex(&key, index)?;
        self.bindings.decode_opt(item)
    }

    fn lrem(&self, key: &K, count: i64, value: &V) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let value = self.bindings.value(value)?;
        self.bindings.connection.lrem(&key, count, &value)
    }
}

//! Sorted set operations

use std::collections::HashMap;
use std::hash::Hash;

use crate::buffer::ByteBuffer;
use crate::connection::SharedConnection;
use crate::error::Result;
use crate::serializer::SharedSerializer;

use super::Bindings;

/// Operations on sorted-set keys. Members are ordered by ascending score,
/// ties broken by member bytes.
pub trait ZSetOperations<K, V>
where
    V: Eq + Hash,
{
    /// Add or update members; returns only the number newly created
    fn zadd(&self, key: &K, members: &HashMap<V, f64>) -> Result<u64>;

    /// Add or update one member; true when it was newly created
    fn zadd_one(&self, key: &K, member: &V, score: f64) -> Result<bool>;

    fn zrem(&self, key: &K, members: &[V]) -> Result<u64>;

    /// Add `delta` to the member's score (creating it at `delta`)
    fn zincrby(&self, key: &K, delta: f64, member: &V) -> Result<f64>;

    fn zscore(&self, key: &K, member: &V) -> Result<Option<f64>>;

    /// Members at ranks `start..=stop`, lowest score first
    fn zrange(&self, key: &K, start: i64, stop: i64) -> Result<Vec<V>>;

    /// Members at ranks `start..=stop`, highest score first
    fn zrevrange(&self, key: &K, start: i64, stop: i64) -> Result<Vec<V>>;

    fn zrange_withscores(&self, key: &K, start: i64, stop: i64) -> Result<Vec<(V, f64)>>;

    fn zrevrange_withscores(&self, key: &K, start: i64, stop: i64) -> Result<Vec<(V, f64)>>;

    /// Members with `min <= score <= max`, lowest score first
    fn zrangebyscore(&self, key: &K, min: f64, max: f64) -> Result<Vec<V>>;

    fn zrank(&self, key: &K, member: &V) -> Result<Option<u64>>;

    fn zrevrank(&self, key: &K, member: &V) -> Result<Option<u64>>;
}

/// [`ZSetOperations`] bound to a raw connection
pub struct DefaultZSetOperations<K, V> {
    bindings: Bindings<K, V>,
}

impl<K, V> DefaultZSetOperations<K, V> {
    pub fn new(
        connection: SharedConnection,
        key_serializer: SharedSerializer<K>,
        value_serializer: SharedSerializer<V>,
    ) -> Self {
        Self {
            bindings: Bindings::new(connection, key_serializer, value_serializer),
        }
    }

    fn decode_scored(&self, pairs: Vec<(ByteBuffer, f64)>) -> Result<Vec<(V, f64)>> {
        pairs
            .iter()
            .map(|(member, score)| Ok((self.bindings.decode(member)?, *score)))
            .collect()
    }
}

impl<K, V> ZSetOperations<K, V> for DefaultZSetOperations<K, V>
where
    V: Eq + Hash,
{
    fn zadd(&self, key: &K, members: &HashMap<V, f64>) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let members = members
            .iter()
            .map(|(member, score)| Ok((self.bindings.value(member)?, *score)))
            .collect::<Result<Vec<_>>>()?;
        self.bindings.connection.zadd(&key, &members)
    }

    fn zadd_one(&self, key: &K, member: &V, score: f64) -> Result<bool> {
        let key = self.bindings.key(key)?;
        let member = self.bindings.value(member)?;
        Ok(self.bindings.connection.zadd(&key, &[(member, score)])? == 1)
    }

    fn zrem(&self, key: &K, members: &[V]) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let members = self.bindings.values(members)?;
        self.bindings.connection.zrem(&key, &members)
    }

    fn zincrby(&self, key: &K, delta: f64, member: &V) -> Result<f64> {
        let key = self.bindings.key(key)?;
        let member = self.bindings.value(member)?;
        self.bindings.connection.zincrby(&key, delta, &member)
    }

    fn zscore(&self, key: &K, member: &V) -> Result<Option<f64>> {
        let key = self.bindings.key(key)?;
        let member = self.bindings.value(member)?;
        self.bindings.connection.zscore(&key, &member)
    }

    fn zrange(&self, key: &K, start: i64, stop: i64) -> Result<Vec<V>> {
        let key = self.bindings.key(key)?;
        let members = self.bindings.connection.zrange(&key, start, stop)?;
        self.bindings.decode_all(members)
    }

    fn zrevrange(&self, key: &K, start: i64, stop: i64) -> Result<Vec<V>> {
        let key = self.bindings.key(key)?;
        let members = self.bindings.connection.zrevrange(&key, start, stop)?;
        self.bindings.decode_all(members)
    }

    fn zrange_withscores(&self, key: &K, start: i64, stop: i64) -> Result<Vec<(V, f64)>> {
        let key = self.bindings.key(key)?;
        let pairs = self.bindings.connection.zrange_withscores(&key, start, stop)?;
        self.decode_scored(pairs)
    }

    fn zrevrange_withscores(&self, key: &K, start: i64, stop: i64) -> Result<Vec<(V, f64)>> {
        let key = self.bindings.key(key)?;
        let pairs = self.bindings.connection.zrevrange_withscores(&key, start, stop)?;
        self.decode_scored(pairs)
    }

    fn zrangebyscore(&self, key: &K, min: f64, max: f64) -> Result<Vec<V>> {
        let key = self.bindings.key(key)?;
        let members = self.bindings.connection.zrangebyscore(&key, min, max)?;
        self.bindings.decode_all(members)
    }

    fn zrank(&self, key: &K, member: &V) -> Result<Option<u64>> {
        let key = self.bindings.key(key)?;
        let member = self.bindings.value(member)?;
        self.bindings.connection.zrank(&key, &member)
    }

    fn zrevrank(&self, key: &K, member: &V) -> Result<Option<u64>> {
        let key = self.bindings.key(key)?;
        let member = self.bindings.value(member)?;
        self.bindings.connection.zrevrank(&key, &member)
    }
}

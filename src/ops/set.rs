//! Set operations

use std::collections::HashSet;
use std::hash::Hash;

use crate::connection::SharedConnection;
use crate::error::Result;
use crate::serializer::SharedSerializer;

use super::Bindings;

/// Operations on set-typed keys
pub trait SetOperations<K, V>
where
    V: Eq + Hash,
{
    /// Returns how many members were not already present; duplicates in
    /// `members` count once
    fn sadd(&self, key: &K, members: &[V]) -> Result<u64>;

    /// Returns how many of `members` existed and were removed
    fn srem(&self, key: &K, members: &[V]) -> Result<u64>;

    fn smembers(&self, key: &K) -> Result<HashSet<V>>;

    fn scard(&self, key: &K) -> Result<u64>;

    fn sismember(&self, key: &K, member: &V) -> Result<bool>;

    /// Remove and return an arbitrary member
    fn spop(&self, key: &K) -> Result<Option<V>>;

    /// Members present in every set; an absent key counts as empty
    fn sinter(&self, keys: &[K]) -> Result<HashSet<V>>;

    fn sunion(&self, keys: &[K]) -> Result<HashSet<V>>;
}

/// [`SetOperations`] bound to a raw connection
pub struct DefaultSetOperations<K, V> {
    bindings: Bindings<K, V>,
}

impl<K, V> DefaultSetOperations<K, V> {
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

impl<K, V> SetOperations<K, V> for DefaultSetOperations<K, V>
where
    V: Eq + Hash,
{
    fn sadd(&self, key: &K, members: &[V]) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let members = self.bindings.values(members)?;
        self.bindings.connection.sadd(&key, &members)
    }

    fn srem(&self, key: &K, members: &[V]) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let members = self.bindings.values(members)?;
        self.bindings.connection.srem(&key, &members)
    }

    fn smembers(&self, key: &K) -> Result<HashSet<V>> {
        let key = self.bindings.key(key)?;
        let members = self.bindings.connection.smembers(&key)?;
        self.bindings.decode_all(members)
    }

    fn scard(&self, key: &K) -> Result<u64> {
        let key = self.bindings.key(key)?;
        self.bindings.connection.scard(&key)
    }

    fn sismember(&self, key: &K, member: &V) -> Result<bool> {
        let key = self.bindings.key(key)?;
        let member = self.bindings.value(member)?;
        self.bindings.connection.sismember(&key, &member)
    }

    fn spop(&self, key: &K) -> Result<Option<V>> {
        let key = self.bindings.key(key)?;
        let popped = self.bindings.connection.spop(&key)?;
        self.bindings.decode_opt(popped)
    }

    fn sinter(&self, keys: &[K]) -> Result<HashSet<V>> {
        let keys = self.bindings.keys(keys)?;
        let members = self.bindings.connection.sinter(&keys)?;
        self.bindings.decode_all(members)
    }

    fn sunion(&self, keys: &[K]) -> Result<HashSet<V>> {
        let keys = self.bindings.keys(keys)?;
        let members = self.bindings.connection.sunion(&keys)?;
        self.bindings.decode_all(members)
    }
}

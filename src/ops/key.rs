//! Generic key operations

use std::time::Duration;

use crate::connection::SharedConnection;
use crate::error::Result;
use crate::serializer::SharedSerializer;

use super::{encode_all, expire_after, whole_millis};

/// Commands that apply to a key regardless of its store type
pub trait KeyOperations<K> {
    fn exists(&self, key: &K) -> Result<bool>;

    /// Returns the number of keys removed (0 or 1)
    fn delete(&self, key: &K) -> Result<u64>;

    fn delete_many(&self, keys: &[K]) -> Result<u64>;

    /// Expire after `ttl`; sub-second durations go out as milliseconds
    fn expire(&self, key: &K, ttl: Duration) -> Result<bool>;

    /// Expire after `ttl` in whole milliseconds, at least 1 when positive
    fn pexpire(&self, key: &K, ttl: Duration) -> Result<bool>;

    /// Remaining seconds, `-1` if the key has no expiry, `-2` if it is absent
    fn ttl(&self, key: &K) -> Result<i64>;

    /// Remaining milliseconds, with the same sentinels as [`ttl`](Self::ttl)
    fn pttl(&self, key: &K) -> Result<i64>;
}

/// [`KeyOperations`] bound to a raw connection
pub struct DefaultKeyOperations<K> {
    connection: SharedConnection,
    key_serializer: SharedSerializer<K>,
}

impl<K> DefaultKeyOperations<K> {
    pub fn new(connection: SharedConnection, key_serializer: SharedSerializer<K>) -> Self {
        Self {
            connection,
            key_serializer,
        }
    }
}

impl<K> KeyOperations<K> for DefaultKeyOperations<K> {
    fn exists(&self, key: &K) -> Result<bool> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.exists(&key)
    }

    fn delete(&self, key: &K) -> Result<u64> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.del(&key)
    }

    fn delete_many(&self, keys: &[K]) -> Result<u64> {
        let keys = encode_all(&self.key_serializer, keys)?;
        self.connection.del_many(&keys)
    }

    fn expire(&self, key: &K, ttl: Duration) -> Result<bool> {
        let key = self.key_serializer.serialize(key)?;
        expire_after(&self.connection, &key, ttl)
    }

    fn pexpire(&self, key: &K, ttl: Duration) -> Result<bool> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.pexpire(&key, whole_millis(ttl))
    }

    fn ttl(&self, key: &K) -> Result<i64> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.ttl(&key)
    }

    fn pttl(&self, key: &K) -> Result<i64> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.pttl(&key)
    }
}

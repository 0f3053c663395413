//! Template Module
//!
//! The single entry point an application holds for one store target.
//!
//! ## Ownership
//! - The template exclusively owns one instance of each operation view
//! - The raw connection and the serializers are shared (`Arc`) between the
//!   template and all of its views, and may be shared with other templates
//! - No state about the remote store is cached here

use std::hash::Hash;
use std::time::Duration;

use crate::connection::SharedConnection;
use crate::error::{KvError, Result};
use crate::ops::{
    expire_after, whole_millis, DefaultHashOperations, DefaultKeyOperations,
    DefaultListOperations, DefaultSetOperations, DefaultValueOperations, DefaultZSetOperations,
    HashOperations, KeyOperations, ListOperations, SetOperations, ValueOperations, ZSetOperations,
};
use crate::serializer::{self, SharedSerializer};

/// Typed facade over a raw connection.
///
/// `K` is the key type and `V` the value type used by string, list, set and
/// sorted-set views. Hash views use `HK` for field keys and `HV` for field
/// values; both default to the outer types.
pub struct KvTemplate<K, V, HK = K, HV = V> {
    connection: SharedConnection,
    key_serializer: SharedSerializer<K>,

    key_ops: DefaultKeyOperations<K>,
    value_ops: DefaultValueOperations<K, V>,
    hash_ops: DefaultHashOperations<K, HK, HV>,
    list_ops: DefaultListOperations<K, V>,
    set_ops: DefaultSetOperations<K, V>,
    zset_ops: DefaultZSetOperations<K, V>,
}

/// Template with `String` keys, values, hash fields and hash values
pub type StringTemplate = KvTemplate<String, String>;

impl<K, V> KvTemplate<K, V> {
    /// Build a template whose hash views reuse the key and value serializers
    pub fn new(
        connection: SharedConnection,
        key_serializer: SharedSerializer<K>,
        value_serializer: SharedSerializer<V>,
    ) -> Self {
        Self::with_hash_serializers(
            connection,
            key_serializer.clone(),
            value_serializer.clone(),
            key_serializer,
            value_serializer,
        )
    }
}

impl KvTemplate<String, String> {
    /// String template sharing one default text serializer in every slot
    pub fn strings(connection: SharedConnection) -> Self {
        let shared = serializer::text::<String>();
        Self::new(connection, shared.clone(), shared)
    }
}

impl<K, V, HK, HV> KvTemplate<K, V, HK, HV> {
    /// Build a template with distinct serializers for hash fields and values
    pub fn with_hash_serializers(
        connection: SharedConnection,
        key_serializer: SharedSerializer<K>,
        value_serializer: SharedSerializer<V>,
        hash_key_serializer: SharedSerializer<HK>,
        hash_value_serializer: SharedSerializer<HV>,
    ) -> Self {
        tracing::debug!(
            key = std::any::type_name::<K>(),
            value = std::any::type_name::<V>(),
            "Creating template"
        );

        Self {
            key_ops: DefaultKeyOperations::new(connection.clone(), key_serializer.clone()),
            value_ops: DefaultValueOperations::new(
                connection.clone(),
                key_serializer.clone(),
                value_serializer.clone(),
            ),
            hash_ops: DefaultHashOperations::new(
                connection.clone(),
                key_serializer.clone(),
                hash_key_serializer,
                hash_value_serializer,
            ),
            list_ops: DefaultListOperations::new(
                connection.clone(),
                key_serializer.clone(),
                value_serializer.clone(),
            ),
            set_ops: DefaultSetOperations::new(
                connection.clone(),
                key_serializer.clone(),
                value_serializer.clone(),
            ),
            zset_ops: DefaultZSetOperations::new(
                connection.clone(),
                key_serializer.clone(),
                value_serializer,
            ),
            connection,
            key_serializer,
        }
    }

    /// Create a builder that checks every collaborator is present
    pub fn builder() -> TemplateBuilder<K, V, HK, HV> {
        TemplateBuilder::default()
    }

    /// The shared raw connection
    pub fn connection(&self) -> &SharedConnection {
        &self.connection
    }

    // =========================================================================
    // Cross-cutting Key Commands
    // =========================================================================

    pub fn exists(&self, key: &K) -> Result<bool> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.exists(&key)
    }

    pub fn delete(&self, key: &K) -> Result<u64> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.del(&key)
    }

    pub fn delete_many(&self, keys: &[K]) -> Result<u64> {
        let keys = keys
            .iter()
            .map(|key| self.key_serializer.serialize(key))
            .collect::<Result<Vec<_>>>()?;
        self.connection.del_many(&keys)
    }

    /// Expire after `ttl`; sub-second durations go out as milliseconds
    pub fn expire(&self, key: &K, ttl: Duration) -> Result<bool> {
        let key = self.key_serializer.serialize(key)?;
        expire_after(&self.connection, &key, ttl)
    }

    /// Expire after `ttl` in whole milliseconds, at least 1 when positive
    pub fn pexpire(&self, key: &K, ttl: Duration) -> Result<bool> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.pexpire(&key, whole_millis(ttl))
    }

    /// Remaining seconds, `-1` without expiry, `-2` when absent
    pub fn ttl(&self, key: &K) -> Result<i64> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.ttl(&key)
    }

    /// Remaining milliseconds, `-1` without expiry, `-2` when absent
    pub fn pttl(&self, key: &K) -> Result<i64> {
        let key = self.key_serializer.serialize(key)?;
        self.connection.pttl(&key)
    }

    // =========================================================================
    // Operation Views
    // =========================================================================

    pub fn ops_for_key(&self) -> &dyn KeyOperations<K> {
        &self.key_ops
    }

    pub fn ops_for_value(&self) -> &dyn ValueOperations<K, V> {
        &self.value_ops
    }

    pub fn ops_for_list(&self) -> &dyn ListOperations<K, V> {
        &self.list_ops
    }
}

impl<K, V, HK, HV> KvTemplate<K, V, HK, HV>
where
    HK: Eq + Hash,
{
    pub fn ops_for_hash(&self) -> &dyn HashOperations<K, HK, HV> {
        &self.hash_ops
    }
}

impl<K, V, HK, HV> KvTemplate<K, V, HK, HV>
where
    V: Eq + Hash,
{
    pub fn ops_for_set(&self) -> &dyn SetOperations<K, V> {
        &self.set_ops
    }

    pub fn ops_for_zset(&self) -> &dyn ZSetOperations<K, V> {
        &self.zset_ops
    }
}

/// Builder for KvTemplate.
///
/// `build` fails with [`KvError::Precondition`] before any I/O when a
/// collaborator is missing.
pub struct TemplateBuilder<K, V, HK = K, HV = V> {
    connection: Option<SharedConnection>,
    key_serializer: Option<SharedSerializer<K>>,
    value_serializer: Option<SharedSerializer<V>>,
    hash_key_serializer: Option<SharedSerializer<HK>>,
    hash_value_serializer: Option<SharedSerializer<HV>>,
}

impl<K, V, HK, HV> Default for TemplateBuilder<K, V, HK, HV> {
    fn default() -> Self {
        Self {
            connection: None,
            key_serializer: None,
            value_serializer: None,
            hash_key_serializer: None,
            hash_value_serializer: None,
        }
    }
}

impl<K, V, HK, HV> TemplateBuilder<K, V, HK, HV> {
    /// Set the raw connection
    pub fn connection(mut self, connection: SharedConnection) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Set the key serializer
    pub fn key_serializer(mut self, serializer: SharedSerializer<K>) -> Self {
        self.key_serializer = Some(serializer);
        self
    }

    /// Set the value serializer
    pub fn value_serializer(mut self, serializer: SharedSerializer<V>) -> Self {
        self.value_serializer = Some(serializer);
        self
    }

    /// Set the hash field serializer
    pub fn hash_key_serializer(mut self, serializer: SharedSerializer<HK>) -> Self {
        self.hash_key_serializer = Some(serializer);
        self
    }

    /// Set the hash value serializer
    pub fn hash_value_serializer(mut self, serializer: SharedSerializer<HV>) -> Self {
        self.hash_value_serializer = Some(serializer);
        self
    }

    pub fn build(self) -> Result<KvTemplate<K, V, HK, HV>> {
        let connection = require(self.connection, "connection")?;
        let key_serializer = require(self.key_serializer, "key serializer")?;
        let value_serializer = require(self.value_serializer, "value serializer")?;
        let hash_key_serializer = require(self.hash_key_serializer, "hash key serializer")?;
        let hash_value_serializer = require(self.hash_value_serializer, "hash value serializer")?;

        Ok(KvTemplate::with_hash_serializers(
            connection,
            key_serializer,
            value_serializer,
            hash_key_serializer,
            hash_value_serializer,
        ))
    }
}

impl<K, V> TemplateBuilder<K, V, K, V> {
    /// Reuse whatever key and value serializers are set for hash fields and
    /// hash values
    pub fn hash_serializers_from_key_value(mut self) -> Self {
        self.hash_key_serializer = self.key_serializer.clone();
        self.hash_value_serializer = self.value_serializer.clone();
        self
    }
}

fn require<T>(slot: Option<T>, what: &str) -> Result<T> {
    slot.ok_or_else(|| KvError::Precondition(format!("template requires a {}", what)))
}

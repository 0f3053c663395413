//! Hash operations
//!
//! Field keys and field values have their own serializers, independent of
//! the outer key serializer.

use std::collections::HashMap;
use std::hash::Hash;

use crate::buffer::ByteBuffer;
use crate::connection::SharedConnection;
use crate::error::Result;
use crate::serializer::SharedSerializer;

use super::{encode_all, Bindings};

/// Operations on hash-typed keys with field type `HK` and value type `HV`
pub trait HashOperations<K, HK, HV>
where
    HK: Eq + Hash,
{
    /// Set one field; true when the field was newly created
    fn hset(&self, key: &K, field: &HK, value: &HV) -> Result<bool>;

    /// Set many fields in one call; returns the number of fields created
    fn hset_all(&self, key: &K, entries: &HashMap<HK, HV>) -> Result<u64>;

    fn hget(&self, key: &K, field: &HK) -> Result<Option<HV>>;

    /// Fill every slot of `fields` with the stored value in one round trip.
    ///
    /// The map keeps its size: fields missing from the store stay in the
    /// map with `None`.
    fn hget_batch(&self, key: &K, fields: &mut HashMap<HK, Option<HV>>) -> Result<()>;

    fn hgetall(&self, key: &K) -> Result<HashMap<HK, HV>>;

    fn hkeys(&self, key: &K) -> Result<Vec<HK>>;

    fn hvals(&self, key: &K) -> Result<Vec<HV>>;

    /// Returns the number of fields removed
    fn hdel(&self, key: &K, field: &HK) -> Result<u64>;

    fn hdel_many(&self, key: &K, fields: &[HK]) -> Result<u64>;
}

/// [`HashOperations`] bound to a raw connection
pub struct DefaultHashOperations<K, HK, HV> {
    bindings: Bindings<K, HV>,
    field_serializer: SharedSerializer<HK>,
}

impl<K, HK, HV> DefaultHashOperations<K, HK, HV> {
    pub fn new(
        connection: SharedConnection,
        key_serializer: SharedSerializer<K>,
        field_serializer: SharedSerializer<HK>,
        value_serializer: SharedSerializer<HV>,
    ) -> Self {
        Self {
            bindings: Bindings::new(connection, key_serializer, value_serializer),
            field_serializer,
        }
    }

    fn field(&self, field: &HK) -> Result<ByteBuffer> {
        self.field_serializer.serialize(field)
    }

    fn decode_field(&self, data: &ByteBuffer) -> Result<HK> {
        self.field_serializer.deserialize(data)
    }
}

impl<K, HK, HV> HashOperations<K, HK, HV> for DefaultHashOperations<K, HK, HV>
where
    HK: Eq + Hash,
{
    fn hset(&self, key: &K, field: &HK, value: &HV) -> Result<bool> {
        let key = self.bindings.key(key)?;
        let field = self.field(field)?;
        let value = self.bindings.value(value)?;
        self.bindings.connection.hset(&key, &field, &value)
    }

    fn hset_all(&self, key: &K, entries: &HashMap<HK, HV>) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let entries = entries
            .iter()
            .map(|(field, value)| Ok((self.field(field)?, self.bindings.value(value)?)))
            .collect::<Result<Vec<_>>>()?;
        self.bindings.connection.hset_many(&key, &entries)
    }

    fn hget(&self, key: &K, field: &HK) -> Result<Option<HV>> {
        let key = self.bindings.key(key)?;
        let field = self.field(field)?;
        let reply = self.bindings.connection.hget(&key, &field)?;
        self.bindings.decode_opt(reply)
    }

    fn hget_batch(&self, key: &K, fields: &mut HashMap<HK, Option<HV>>) -> Result<()> {
        let key = self.bindings.key(key)?;

        // Keep a handle on each caller slot next to its encoded field
        let slots = fields
            .iter_mut()
            .map(|(field, slot)| Ok((self.field(field)?, slot)))
            .collect::<Result<Vec<_>>>()?;

        let mut raw: HashMap<ByteBuffer, Option<ByteBuffer>> =
            slots.iter().map(|(field, _)| (field.clone(), None)).collect();
        self.bindings.connection.hmget(&key, &mut raw)?;

        // Decode everything before touching the caller's map
        let decoded = slots
            .iter()
            .map(|(field, _)| match raw.get(field) {
                Some(Some(value)) => self.bindings.decode(value).map(Some),
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;

        for ((_, slot), value) in slots.into_iter().zip(decoded) {
            *slot = value;
        }
        Ok(())
    }

    fn hgetall(&self, key: &K) -> Result<HashMap<HK, HV>> {
        let key = self.bindings.key(key)?;
        self.bindings
            .connection
            .hgetall(&key)?
            .iter()
            .map(|(field, value)| Ok((self.decode_field(field)?, self.bindings.decode(value)?)))
            .collect()
    }

    fn hkeys(&self, key: &K) -> Result<Vec<HK>> {
        let key = self.bindings.key(key)?;
        self.bindings
            .connection
            .hkeys(&key)?
            .iter()
            .map(|field| self.decode_field(field))
            .collect()
    }

    fn hvals(&self, key: &K) -> Result<Vec<HV>> {
        let key = self.bindings.key(key)?;
        let values = self.bindings.connection.hvals(&key)?;
        self.bindings.decode_all(values)
    }

    fn hdel(&self, key: &K, field: &HK) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let field = self.field(field)?;
        self.bindings.connection.hdel(&key, &field)
    }

    fn hdel_many(&self, key: &K, fields: &[HK]) -> Result<u64> {
        let key = self.bindings.key(key)?;
        let fields = encode_all(&self.field_serializer, fields)?;
        self.bindings.connection.hdel_many(&key, &fields)
    }
}

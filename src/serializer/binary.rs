//! Binary serializers

use std::marker::PhantomData;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::buffer::ByteBuffer;
use crate::error::Result;

use super::Serializer;

/// Identity serializer for values that already are raw bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBytes;

impl Serializer<ByteBuffer> for RawBytes {
    fn serialize(&self, value: &ByteBuffer) -> Result<ByteBuffer> {
        Ok(value.clone())
    }

    fn deserialize(&self, data: &ByteBuffer) -> Result<ByteBuffer> {
        Ok(data.clone())
    }
}

impl Serializer<Vec<u8>> for RawBytes {
    fn serialize(&self, value: &Vec<u8>) -> Result<ByteBuffer> {
        Ok(ByteBuffer::copy_from_slice(value))
    }

    fn deserialize(&self, data: &ByteBuffer) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Serde-backed binary serializer (fixed-width integers, trailing bytes
/// rejected)
pub struct BincodeSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeSerializer<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for BincodeSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

impl<T> Serializer<T> for BincodeSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<ByteBuffer> {
        Ok(ByteBuffer::from_vec(options().serialize(value)?))
    }

    fn deserialize(&self, data: &ByteBuffer) -> Result<T> {
        Ok(options().deserialize(data.as_slice())?)
    }
}

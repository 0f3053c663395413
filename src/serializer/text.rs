//! Text serializers and the text -> bytes adapter

use std::any::type_name;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use crate::buffer::ByteBuffer;
use crate::error::{KvError, Result};

use super::{Serializer, SharedSerializer};

/// Converts `T` to and from text
pub trait TextSerializer<T>: Send + Sync {
    fn to_text(&self, value: &T) -> String;

    fn from_text(&self, text: &str) -> Result<T>;
}

/// Default text format: `Display` to write, `FromStr` to read.
///
/// Parsing must consume the whole text. `"1020 "` or `"10x"` are rejected
/// for integer types instead of yielding the parsed prefix.
pub struct DisplayFromStr<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> DisplayFromStr<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for DisplayFromStr<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for DisplayFromStr<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> TextSerializer<T> for DisplayFromStr<T>
where
    T: Display + FromStr,
    T::Err: Display,
{
    fn to_text(&self, value: &T) -> String {
        value.to_string()
    }

    fn from_text(&self, text: &str) -> Result<T> {
        text.parse::<T>().map_err(|e| {
            KvError::Format(format!(
                "cannot parse {:?} as {}: {}",
                text,
                type_name::<T>(),
                e
            ))
        })
    }
}

/// Exposes a [`TextSerializer`] through the byte-level [`Serializer`]
/// contract. Text is carried as UTF-8; non-UTF-8 input is a format error.
pub struct TextAdapter<T, S = DisplayFromStr<T>> {
    text: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> TextAdapter<T, S>
where
    S: TextSerializer<T>,
{
    pub fn new(text: S) -> Self {
        Self {
            text,
            _marker: PhantomData,
        }
    }
}

impl<T> TextAdapter<T, DisplayFromStr<T>>
where
    T: Display + FromStr,
    T::Err: Display,
{
    /// Adapter over the default `Display` / `FromStr` format
    pub fn standard() -> Self {
        Self::new(DisplayFromStr::new())
    }
}

impl<T> Default for TextAdapter<T, DisplayFromStr<T>>
where
    T: Display + FromStr,
    T::Err: Display,
{
    fn default() -> Self {
        Self::standard()
    }
}

impl<T, S> Serializer<T> for TextAdapter<T, S>
where
    S: TextSerializer<T>,
{
    fn serialize(&self, value: &T) -> Result<ByteBuffer> {
        Ok(ByteBuffer::from(self.text.to_text(value)))
    }

    fn deserialize(&self, data: &ByteBuffer) -> Result<T> {
        let text = std::str::from_utf8(data.as_slice())
            .map_err(|e| KvError::Format(format!("payload is not valid UTF-8: {}", e)))?;
        self.text.from_text(text)
    }
}

/// Shared default text serializer for `T`.
///
/// Build it once per type and hand clones of the `Arc` to every template.
pub fn text<T>() -> SharedSerializer<T>
where
    T: Display + FromStr + 'static,
    T::Err: Display,
{
    Arc::new(TextAdapter::<T>::standard())
}

//! Serializer Module
//!
//! Bidirectional conversion between domain types and [`ByteBuffer`]s.
//!
//! ## Layering
//! - [`Serializer<T>`]: `T <-> ByteBuffer`, used directly by operation views
//! - [`TextSerializer<T>`]: `T <-> String`, reused through [`TextAdapter`]
//!   so textual formats never have to re-implement the binary contract
//!
//! ## Provided Implementations
//! - [`DisplayFromStr<T>`]: default text format via `Display` / `FromStr`
//! - [`TextAdapter<T, S>`]: exposes any text serializer as a byte serializer
//! - [`RawBytes`]: identity for `ByteBuffer` / `Vec<u8>`
//! - [`BincodeSerializer<T>`]: serde types in compact binary form
//!
//! Serializers are stateless; share one instance per type through
//! [`SharedSerializer`].

mod binary;
mod text;

use std::sync::Arc;

use crate::buffer::ByteBuffer;
use crate::error::Result;

pub use binary::{BincodeSerializer, RawBytes};
pub use text::{text, DisplayFromStr, TextAdapter, TextSerializer};

/// Converts `T` to and from its wire representation.
///
/// `deserialize` must invert `serialize` for every buffer `serialize`
/// produced, and must fail with [`KvError::Format`](crate::KvError::Format)
/// on malformed input rather than fall back to a default value.
pub trait Serializer<T>: Send + Sync {
    /// Encode `value` into a byte buffer.
    ///
    /// The text and raw-byte serializers never fail; encoders driven by a
    /// user `Serialize` impl report its failure as a format error.
    fn serialize(&self, value: &T) -> Result<ByteBuffer>;

    /// Decode a byte buffer into `T`.
    fn deserialize(&self, data: &ByteBuffer) -> Result<T>;
}

/// Reference-counted serializer handle shared by every view of a template
pub type SharedSerializer<T> = Arc<dyn Serializer<T>>;

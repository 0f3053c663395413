//! # typedkv
//!
//! Typed, serializer-driven operations over a Redis-compatible key-value
//! store:
//! - A byte-buffer value type carried across the wire boundary
//! - Pluggable serializers (text, raw bytes, bincode)
//! - One raw connection contract with an in-memory and a RESP2 implementation
//! - Six operation views (key, value, hash, list, set, sorted set)
//! - A template facade owning the views for one store target
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  KvTemplate<K, V, HK, HV>                    │
//! │          (key commands + ops_for_* view accessors)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │     Key / Value / Hash / List / Set / ZSet Operations        │
//! │       (serialize args → one raw call → deserialize)          │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │   Serializer<T> │                │  RawConnection  │
//!   │ (T ⇄ ByteBuffer)│                │ (bytes in/out)  │
//!   └─────────────────┘                └────────┬────────┘
//!                                               │
//!                              ┌────────────────┴────────────┐
//!                              ▼                             ▼
//!                     ┌─────────────────┐          ┌─────────────────┐
//!                     │MemoryConnection │          │ RespConnection  │
//!                     │   (in-process)  │          │  (TCP, RESP2)   │
//!                     └─────────────────┘          └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use typedkv::prelude::*;
//! use typedkv::{MemoryConnection, StringTemplate};
//!
//! let template = StringTemplate::strings(Arc::new(MemoryConnection::new()));
//! template.ops_for_value().set(&"greeting".to_string(), &"hello".to_string())?;
//! assert_eq!(
//!     template.ops_for_value().get(&"greeting".to_string())?,
//!     Some("hello".to_string())
//! );
//! # Ok::<(), typedkv::KvError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod buffer;
pub mod serializer;
pub mod connection;
pub mod memory;
pub mod protocol;
pub mod network;
pub mod ops;
pub mod template;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use buffer::ByteBuffer;
pub use serializer::{Serializer, SharedSerializer};
pub use connection::{RawConnection, SharedConnection};
pub use memory::MemoryConnection;
pub use network::RespConnection;
pub use template::{KvTemplate, StringTemplate, TemplateBuilder};

/// Operation-view traits, needed in scope to call view methods
pub mod prelude {
    pub use crate::ops::{
        HashOperations, KeyOperations, ListOperations, SetOperations, ValueOperations,
        ZSetOperations,
    };
}

// =============================================================================
// Version Info
// =============================================================================

/// Current version of typedkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

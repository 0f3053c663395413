//! Operation View Tests
//!
//! Each view is driven against a MemoryConnection with text serializers.

mod hash_tests;
mod key_tests;
mod zset_tests;

use std::sync::Arc;

use typedkv::serializer::text;
use typedkv::{MemoryConnection, SharedConnection, SharedSerializer};

/// Fresh store plus the raw handle for inspecting what the view wrote
pub fn store() -> (SharedConnection, Arc<MemoryConnection>) {
    let memory = Arc::new(MemoryConnection::new());
    let shared: SharedConnection = memory.clone();
    (shared, memory)
}

pub fn keys() -> SharedSerializer<String> {
    text::<String>()
}

pub fn k(s: &str) -> String {
    s.to_string()
}

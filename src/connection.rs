//! Raw Connection Contract
//!
//! The only boundary between typed operations and the actual store. Every
//! method speaks in [`ByteBuffer`]s, booleans and numbers; no domain type
//! ever crosses this trait.
//!
//! ## Conformance
//! - TTL sentinels: `-2` = key does not exist, `-1` = key has no expiry
//! - Counts returned by add/remove commands count only members or fields
//!   that were actually created or removed
//! - Range indices are zero-based and inclusive; negative indices count
//!   from the tail (`-1` = last element)
//! - Reads of absent keys return `None` or an empty collection, never an
//!   error
//! - A reply of the wrong kind is [`KvError::Protocol`](crate::KvError::Protocol)
//!
//! ## Thread Safety
//! Implementations are one logical session. The trait requires `Send + Sync`
//! so a handle can be shared, but interleaving calls is only sound if the
//! implementation serializes them itself (both shipped implementations
//! hold a mutex for the duration of each call).

use std::collections::HashMap;
use std::sync::Arc;

use crate::buffer::ByteBuffer;
use crate::error::Result;

/// Reference-counted raw connection handle shared by every view
pub type SharedConnection = Arc<dyn RawConnection>;

/// Low-level store primitives in byte-buffer terms
pub trait RawConnection: Send + Sync {
    // =========================================================================
    // Generic Key
    // =========================================================================

    /// `EXISTS key`
    fn exists(&self, key: &ByteBuffer) -> Result<bool>;

    /// `DEL key`, returns number of keys removed
    fn del(&self, key: &ByteBuffer) -> Result<u64>;

    /// `DEL key [key ...]`
    fn del_many(&self, keys: &[ByteBuffer]) -> Result<u64>;

    /// `EXPIRE key seconds`, true when the timeout was set
    fn expire(&self, key: &ByteBuffer, seconds: i64) -> Result<bool>;

    /// `PEXPIRE key milliseconds`
    fn pexpire(&self, key: &ByteBuffer, millis: i64) -> Result<bool>;

    /// `TTL key`: remaining seconds, `-1` or `-2`
    fn ttl(&self, key: &ByteBuffer) -> Result<i64>;

    /// `PTTL key`: remaining milliseconds, `-1` or `-2`
    fn pttl(&self, key: &ByteBuffer) -> Result<i64>;

    // =========================================================================
    // String
    // =========================================================================

    /// `SET key value`
    fn set(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<()>;

    /// `SET key value NX`, true when the value was stored
    fn set_nx(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<bool>;

    /// `SET key value EX seconds`
    fn set_ex(&self, key: &ByteBuffer, value: &ByteBuffer, seconds: u64) -> Result<()>;

    /// `SET key value PX milliseconds`
    fn set_px(&self, key: &ByteBuffer, value: &ByteBuffer, millis: u64) -> Result<()>;

    /// `GET key`
    fn get(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>>;

    /// `GETSET key value`, returns the previous value
    fn getset(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<Option<ByteBuffer>>;

    /// `INCRBY key delta`, returns the new value
    fn incrby(&self, key: &ByteBuffer, delta: i64) -> Result<i64>;

    /// `DECRBY key delta`, returns the new value
    fn decrby(&self, key: &ByteBuffer, delta: i64) -> Result<i64>;

    /// `APPEND key value`, returns the new byte length of the value
    fn append(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64>;

    /// `MGET key [key ...]`, one slot per requested key
    fn mget(&self, keys: &[ByteBuffer]) -> Result<Vec<Option<ByteBuffer>>>;

    // =========================================================================
    // Hash
    // =========================================================================

    /// `HSET key field value`, true when the field was newly created
    fn hset(&self, key: &ByteBuffer, field: &ByteBuffer, value: &ByteBuffer) -> Result<bool>;

    /// `HSET key field value [field value ...]`, returns fields created
    fn hset_many(&self, key: &ByteBuffer, entries: &[(ByteBuffer, ByteBuffer)]) -> Result<u64>;

    /// `HGET key field`
    fn hget(&self, key: &ByteBuffer, field: &ByteBuffer) -> Result<Option<ByteBuffer>>;

    /// `HMGET key field [field ...]`
    ///
    /// Fills every slot of `fields` in place; absent fields are set to
    /// `None` and stay in the map.
    fn hmget(
        &self,
        key: &ByteBuffer,
        fields: &mut HashMap<ByteBuffer, Option<ByteBuffer>>,
    ) -> Result<()>;

    /// `HGETALL key`
    fn hgetall(&self, key: &ByteBuffer) -> Result<HashMap<ByteBuffer, ByteBuffer>>;

    /// `HKEYS key`
    fn hkeys(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>>;

    /// `HVALS key`
    fn hvals(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>>;

    /// `HDEL key field`, returns fields removed
    fn hdel(&self, key: &ByteBuffer, field: &ByteBuffer) -> Result<u64>;

    /// `HDEL key field [field ...]`
    fn hdel_many(&self, key: &ByteBuffer, fields: &[ByteBuffer]) -> Result<u64>;

    // =========================================================================
    // List
    // =========================================================================

    /// `LPUSH key value`, returns the new list length
    fn lpush(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64>;

    /// `LPUSH key value [value ...]`
    fn lpush_many(&self, key: &ByteBuffer, values: &[ByteBuffer]) -> Result<u64>;

    /// `RPUSH key value`
    fn rpush(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64>;

    /// `RPUSH key value [value ...]`
    fn rpush_many(&self, key: &ByteBuffer, values: &[ByteBuffer]) -> Result<u64>;

    /// `LPOP key`
    fn lpop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>>;

    /// `RPOP key`
    fn rpop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>>;

    /// `LRANGE key start stop`, head-to-tail order
    fn lrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>>;

    /// `LLEN key`, 0 when absent
    fn llen(&self, key: &ByteBuffer) -> Result<u64>;

    /// `LINDEX key index`
    fn lindex(&self, key: &ByteBuffer, index: i64) -> Result<Option<ByteBuffer>>;

    /// `LREM key count value`, returns elements removed
    fn lrem(&self, key: &ByteBuffer, count: i64, value: &ByteBuffer) -> Result<u64>;

    // =========================================================================
    // Set
    // =========================================================================

    /// `SADD key member [member ...]`, returns members newly added
    fn sadd(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64>;

    /// `SREM key member [member ...]`, returns members removed
    fn srem(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64>;

    /// `SMEMBERS key`, unordered
    fn smembers(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>>;

    /// `SCARD key`
    fn scard(&self, key: &ByteBuffer) -> Result<u64>;

    /// `SISMEMBER key member`
    fn sismember(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<bool>;

    /// `SPOP key`
    fn spop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>>;

    /// `SINTER key [key ...]`
    fn sinter(&self, keys: &[ByteBuffer]) -> Result<Vec<ByteBuffer>>;

    /// `SUNION key [key ...]`
    fn sunion(&self, keys: &[ByteBuffer]) -> Result<Vec<ByteBuffer>>;

    // =========================================================================
    // Sorted Set
    // =========================================================================

    /// `ZADD key score member [score member ...]`
    ///
    /// Returns only members newly created; score updates are not counted.
    fn zadd(&self, key: &ByteBuffer, members: &[(ByteBuffer, f64)]) -> Result<u64>;

    /// `ZREM key member [member ...]`
    fn zrem(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64>;

    /// `ZINCRBY key delta member`, returns the new score
    fn zincrby(&self, key: &ByteBuffer, delta: f64, member: &ByteBuffer) -> Result<f64>;

    /// `ZSCORE key member`
    fn zscore(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<f64>>;

    /// `ZRANGE key start stop`, ascending score
    fn zrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>>;

    /// `ZREVRANGE key start stop`, descending score
    fn zrevrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>>;

    /// `ZRANGE key start stop WITHSCORES`
    fn zrange_withscores(
        &self,
        key: &ByteBuffer,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(ByteBuffer, f64)>>;

    /// `ZREVRANGE key start stop WITHSCORES`
    fn zrevrange_withscores(
        &self,
        key: &ByteBuffer,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(ByteBuffer, f64)>>;

    /// `ZRANGEBYSCORE key min max`, both bounds inclusive
    fn zrangebyscore(&self, key: &ByteBuffer, min: f64, max: f64) -> Result<Vec<ByteBuffer>>;

    /// `ZRANK key member`
    fn zrank(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<u64>>;

    /// `ZREVRANK key member`
    fn zrevrank(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<u64>>;
}

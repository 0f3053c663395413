//! MemoryConnection implementation
//!
//! HashMap keyspace behind a mutex, implementing every raw primitive.

use std::collections::{HashMap, HashSet, VecDeque};
use std::slice;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::buffer::ByteBuffer;
use crate::connection::RawConnection;
use crate::error::{KvError, Result};

use super::{normalize_index, normalize_range, Entry, Value};

/// In-memory store speaking the raw connection contract
pub struct MemoryConnection {
    keyspace: Mutex<Keyspace>,
}

#[derive(Default)]
struct Keyspace {
    entries: HashMap<ByteBuffer, Entry>,
}

impl Keyspace {
    /// Evict `key` if its deadline has passed
    fn purge(&mut self, key: &ByteBuffer, now: Instant) {
        if self.entries.get(key).map_or(false, |e| e.is_expired(now)) {
            tracing::trace!(key = ?key, "Evicting expired key");
            self.entries.remove(key);
        }
    }

    fn peek(&mut self, key: &ByteBuffer) -> Option<&Entry> {
        self.purge(key, Instant::now());
        self.entries.get(key)
    }

    fn peek_mut(&mut self, key: &ByteBuffer) -> Option<&mut Entry> {
        self.purge(key, Instant::now());
        self.entries.get_mut(key)
    }

    /// Live entry for `key`, created from `empty` when absent
    fn entry_or(&mut self, key: &ByteBuffer, empty: impl FnOnce() -> Value) -> &mut Entry {
        self.purge(key, Instant::now());
        self.entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(empty()))
    }

    /// Remove `key` once its collection has no elements left
    fn drop_if_hollow(&mut self, key: &ByteBuffer) {
        if self.entries.get(key).map_or(false, Entry::is_hollow) {
            self.entries.remove(key);
        }
    }

    fn put_string(&mut self, key: &ByteBuffer, value: &ByteBuffer, expires_at: Option<Instant>) {
        self.entries.insert(
            key.clone(),
            Entry {
                value: Value::Str(value.clone()),
                expires_at,
            },
        );
    }

    /// Milliseconds left on `key`, or the `-1` / `-2` sentinels
    fn remaining_millis(&mut self, key: &ByteBuffer) -> i64 {
        match self.peek(key) {
            None => -2,
            Some(Entry { expires_at: None, .. }) => -1,
            Some(Entry {
                expires_at: Some(deadline),
                ..
            }) => {
                let left = deadline.saturating_duration_since(Instant::now());
                i64::try_from(left.as_millis()).unwrap_or(i64::MAX)
            }
        }
    }
}

impl MemoryConnection {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            keyspace: Mutex::new(Keyspace::default()),
        }
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let mut ks = self.keyspace.lock();
        let now = Instant::now();
        ks.entries.retain(|_, e| !e.is_expired(now));
        ks.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every key
    pub fn clear(&self) {
        self.keyspace.lock().entries.clear();
    }

    fn set_deadline(&self, key: &ByteBuffer, millis: Option<i64>, command: &str) -> Result<bool> {
        let millis = millis.ok_or_else(|| invalid_expire(command))?;

        let mut ks = self.keyspace.lock();
        let now = Instant::now();
        ks.purge(key, now);

        if !ks.entries.contains_key(key) {
            return Ok(false);
        }
        if millis <= 0 {
            ks.entries.remove(key);
            return Ok(true);
        }

        let deadline = now
            .checked_add(Duration::from_millis(millis as u64))
            .ok_or_else(|| invalid_expire(command))?;
        if let Some(entry) = ks.entries.get_mut(key) {
            entry.expires_at = Some(deadline);
        }
        Ok(true)
    }

    fn set_with_ttl(&self, key: &ByteBuffer, value: &ByteBuffer, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(invalid_expire("set"));
        }
        let deadline = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| invalid_expire("set"))?;
        self.keyspace.lock().put_string(key, value, Some(deadline));
        Ok(())
    }

    fn push(&self, key: &ByteBuffer, values: &[ByteBuffer], front: bool) -> Result<u64> {
        let mut ks = self.keyspace.lock();
        if values.is_empty() {
            return Ok(match ks.peek(key) {
                Some(entry) => entry.value.list()?.len() as u64,
                None => 0,
            });
        }

        let list = ks
            .entry_or(key, || Value::List(VecDeque::new()))
            .value
            .list_mut()?;
        for value in values {
            if front {
                list.push_front(value.clone());
            } else {
                list.push_back(value.clone());
            }
        }
        Ok(list.len() as u64)
    }

    fn pop(&self, key: &ByteBuffer, front: bool) -> Result<Option<ByteBuffer>> {
        let mut ks = self.keyspace.lock();
        let popped = match ks.peek_mut(key) {
            Some(entry) => {
                let list = entry.value.list_mut()?;
                if front {
                    list.pop_front()
                } else {
                    list.pop_back()
                }
            }
            None => None,
        };
        ks.drop_if_hollow(key);
        Ok(popped)
    }

    fn zset_range(
        &self,
        key: &ByteBuffer,
        start: i64,
        stop: i64,
        reverse: bool,
    ) -> Result<Vec<(ByteBuffer, f64)>> {
        let mut ks = self.keyspace.lock();
        let Some(entry) = ks.peek(key) else {
            return Ok(Vec::new());
        };

        let mut ranked = ranked(entry.value.zset()?);
        if reverse {
            ranked.reverse();
        }
        Ok(match normalize_range(start, stop, ranked.len()) {
            Some((first, last)) => ranked[first..=last]
                .iter()
                .map(|(member, score)| ((*member).clone(), *score))
                .collect(),
            None => Vec::new(),
        })
    }

    fn zset_rank(&self, key: &ByteBuffer, member: &ByteBuffer, reverse: bool) -> Result<Option<u64>> {
        let mut ks = self.keyspace.lock();
        let Some(entry) = ks.peek(key) else {
            return Ok(None);
        };

        let ranked = ranked(entry.value.zset()?);
        let Some(pos) = ranked.iter().position(|(m, _)| *m == member) else {
            return Ok(None);
        };
        let rank = if reverse { ranked.len() - 1 - pos } else { pos };
        Ok(Some(rank as u64))
    }

    /// Resolve every key to its set (absent keys as `None`), type-checking
    /// all of them before any result is computed
    fn with_sets<R>(
        &self,
        keys: &[ByteBuffer],
        f: impl FnOnce(Vec<Option<&HashSet<ByteBuffer>>>) -> R,
    ) -> Result<R> {
        let mut ks = self.keyspace.lock();
        let now = Instant::now();
        for key in keys {
            ks.purge(key, now);
        }
        let sets = keys
            .iter()
            .map(|key| ks.entries.get(key).map(|e| e.value.set()).transpose())
            .collect::<Result<Vec<_>>>()?;
        Ok(f(sets))
    }
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_expire(command: &str) -> KvError {
    KvError::Server(format!("ERR invalid expire time in '{}' command", command))
}

fn not_an_integer() -> KvError {
    KvError::Server("ERR value is not an integer or out of range".to_string())
}

fn overflow() -> KvError {
    KvError::Server("ERR increment or decrement would overflow".to_string())
}

fn not_a_float() -> KvError {
    KvError::Server("ERR value is not a valid float".to_string())
}

fn parse_integer(data: &ByteBuffer) -> Result<i64> {
    std::str::from_utf8(data.as_slice())
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(not_an_integer)
}

/// Members ordered by ascending score, ties broken by member bytes
fn ranked(zset: &HashMap<ByteBuffer, f64>) -> Vec<(&ByteBuffer, f64)> {
    let mut ranked: Vec<_> = zset.iter().map(|(member, score)| (member, *score)).collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

impl RawConnection for MemoryConnection {
    // =========================================================================
    // Generic Key
    // =========================================================================

    fn exists(&self, key: &ByteBuffer) -> Result<bool> {
        Ok(self.keyspace.lock().peek(key).is_some())
    }

    fn del(&self, key: &ByteBuffer) -> Result<u64> {
        self.del_many(slice::from_ref(key))
    }

    fn del_many(&self, keys: &[ByteBuffer]) -> Result<u64> {
        let mut ks = self.keyspace.lock();
        let now = Instant::now();
        let mut removed = 0;
        for key in keys {
            ks.purge(key, now);
            if ks.entries.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn expire(&self, key: &ByteBuffer, seconds: i64) -> Result<bool> {
        self.set_deadline(key, seconds.checked_mul(1000), "expire")
    }

    fn pexpire(&self, key: &ByteBuffer, millis: i64) -> Result<bool> {
        self.set_deadline(key, Some(millis), "pexpire")
    }

    fn ttl(&self, key: &ByteBuffer) -> Result<i64> {
        let millis = self.keyspace.lock().remaining_millis(key);
        if millis < 0 {
            return Ok(millis);
        }
        // Round to the nearest second, as the store does
        Ok(millis.saturating_add(500) / 1000)
    }

    fn pttl(&self, key: &ByteBuffer) -> Result<i64> {
        Ok(self.keyspace.lock().remaining_millis(key))
    }

    // =========================================================================
    // String
    // =========================================================================

    fn set(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<()> {
        self.keyspace.lock().put_string(key, value, None);
        Ok(())
    }

    fn set_nx(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<bool> {
        let mut ks = self.keyspace.lock();
        if ks.peek(key).is_some() {
            return Ok(false);
        }
        ks.put_string(key, value, None);
        Ok(true)
    }

    fn set_ex(&self, key: &ByteBuffer, value: &ByteBuffer, seconds: u64) -> Result<()> {
        self.set_with_ttl(key, value, Duration::from_secs(seconds))
    }

    fn set_px(&self, key: &ByteBuffer, value: &ByteBuffer, millis: u64) -> Result<()> {
        self.set_with_ttl(key, value, Duration::from_millis(millis))
    }

    fn get(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(Some(entry.value.string()?.clone())),
            None => Ok(None),
        }
    }

    fn getset(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        let mut ks = self.keyspace.lock();
        let previous = match ks.peek(key) {
            Some(entry) => Some(entry.value.string()?.clone()),
            None => None,
        };
        ks.put_string(key, value, None);
        Ok(previous)
    }

    fn incrby(&self, key: &ByteBuffer, delta: i64) -> Result<i64> {
        let mut ks = self.keyspace.lock();
        let entry = ks.entry_or(key, || Value::Str(ByteBuffer::from("0")));
        let current = parse_integer(entry.value.string()?)?;
        let next = current.checked_add(delta).ok_or_else(overflow)?;
        // Keeps any existing deadline
        entry.value = Value::Str(ByteBuffer::from(next.to_string()));
        Ok(next)
    }

    fn decrby(&self, key: &ByteBuffer, delta: i64) -> Result<i64> {
        let negated = delta.checked_neg().ok_or_else(overflow)?;
        self.incrby(key, negated)
    }

    fn append(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64> {
        let mut ks = self.keyspace.lock();
        let entry = ks.entry_or(key, || Value::Str(ByteBuffer::new()));
        let mut joined = entry.value.string()?.to_vec();
        joined.extend_from_slice(value.as_slice());
        let length = joined.len() as u64;
        entry.value = Value::Str(ByteBuffer::from_vec(joined));
        Ok(length)
    }

    fn mget(&self, keys: &[ByteBuffer]) -> Result<Vec<Option<ByteBuffer>>> {
        let mut ks = self.keyspace.lock();
        Ok(keys
            .iter()
            .map(|key| match ks.peek(key) {
                Some(Entry {
                    value: Value::Str(s),
                    ..
                }) => Some(s.clone()),
                _ => None,
            })
            .collect())
    }

    // =========================================================================
    // Hash
    // =========================================================================

    fn hset(&self, key: &ByteBuffer, field: &ByteBuffer, value: &ByteBuffer) -> Result<bool> {
        let created = self.hset_many(key, &[(field.clone(), value.clone())])?;
        Ok(created == 1)
    }

    fn hset_many(&self, key: &ByteBuffer, entries: &[(ByteBuffer, ByteBuffer)]) -> Result<u64> {
        if entries.is_empty() {
            return Ok(0);
        }
        let mut ks = self.keyspace.lock();
        let hash = ks
            .entry_or(key, || Value::Hash(HashMap::new()))
            .value
            .hash_mut()?;
        let mut created = 0;
        for (field, value) in entries {
            if hash.insert(field.clone(), value.clone()).is_none() {
                created += 1;
            }
        }
        Ok(created)
    }

    fn hget(&self, key: &ByteBuffer, field: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.hash()?.get(field).cloned()),
            None => Ok(None),
        }
    }

    fn hmget(
        &self,
        key: &ByteBuffer,
        fields: &mut HashMap<ByteBuffer, Option<ByteBuffer>>,
    ) -> Result<()> {
        let mut ks = self.keyspace.lock();
        let hash = match ks.peek(key) {
            Some(entry) => Some(entry.value.hash()?),
            None => None,
        };
        for (field, slot) in fields.iter_mut() {
            *slot = hash.and_then(|h| h.get(field).cloned());
        }
        Ok(())
    }

    fn hgetall(&self, key: &ByteBuffer) -> Result<HashMap<ByteBuffer, ByteBuffer>> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.hash()?.clone()),
            None => Ok(HashMap::new()),
        }
    }

    fn hkeys(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.hash()?.keys().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }

    fn hvals(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.hash()?.values().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }

    fn hdel(&self, key: &ByteBuffer, field: &ByteBuffer) -> Result<u64> {
        self.hdel_many(key, slice::from_ref(field))
    }

    fn hdel_many(&self, key: &ByteBuffer, fields: &[ByteBuffer]) -> Result<u64> {
        let mut ks = self.keyspace.lock();
        let removed = match ks.peek_mut(key) {
            Some(entry) => {
                let hash = entry.value.hash_mut()?;
                fields.iter().filter(|f| hash.remove(*f).is_some()).count() as u64
            }
            None => 0,
        };
        ks.drop_if_hollow(key);
        Ok(removed)
    }

    // =========================================================================
    // List
    // =========================================================================

    fn lpush(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64> {
        self.push(key, slice::from_ref(value), true)
    }

    fn lpush_many(&self, key: &ByteBuffer, values: &[ByteBuffer]) -> Result<u64> {
        self.push(key, values, true)
    }

    fn rpush(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64> {
        self.push(key, slice::from_ref(value), false)
    }

    fn rpush_many(&self, key: &ByteBuffer, values: &[ByteBuffer]) -> Result<u64> {
        self.push(key, values, false)
    }

    fn lpop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        self.pop(key, true)
    }

    fn rpop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        self.pop(key, false)
    }

    fn lrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>> {
        let mut ks = self.keyspace.lock();
        let Some(entry) = ks.peek(key) else {
            return Ok(Vec::new());
        };
        let list = entry.value.list()?;
        Ok(match normalize_range(start, stop, list.len()) {
            Some((first, last)) => list.range(first..=last).cloned().collect(),
            None => Vec::new(),
        })
    }

    fn llen(&self, key: &ByteBuffer) -> Result<u64> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.list()?.len() as u64),
            None => Ok(0),
        }
    }

    fn lindex(&self, key: &ByteBuffer, index: i64) -> Result<Option<ByteBuffer>> {
        let mut ks = self.keyspace.lock();
        let Some(entry) = ks.peek(key) else {
            return Ok(None);
        };
        let list = entry.value.list()?;
        Ok(normalize_index(index, list.len()).and_then(|i| list.get(i).cloned()))
    }

    fn lrem(&self, key: &ByteBuffer, count: i64, value: &ByteBuffer) -> Result<u64> {
        let mut ks = self.keyspace.lock();
        let Some(entry) = ks.peek_mut(key) else {
            return Ok(0);
        };
        let list = entry.value.list_mut()?;

        let limit = if count == 0 {
            usize::MAX
        } else {
            usize::try_from(count.unsigned_abs()).unwrap_or(usize::MAX)
        };

        let mut removed = 0;
        if count >= 0 {
            let mut i = 0;
            while i < list.len() && removed < limit {
                if list[i] == *value {
                    list.remove(i);
                    removed += 1;
                } else {
                    i += 1;
                }
            }
        } else {
            let mut i = list.len();
            while i > 0 && removed < limit {
                i -= 1;
                if list[i] == *value {
                    list.remove(i);
                    removed += 1;
                }
            }
        }

        ks.drop_if_hollow(key);
        Ok(removed as u64)
    }

    // =========================================================================
    // Set
    // =========================================================================

    fn sadd(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut ks = self.keyspace.lock();
        let set = ks
            .entry_or(key, || Value::Set(HashSet::new()))
            .value
            .set_mut()?;
        Ok(members.iter().filter(|m| set.insert((*m).clone())).count() as u64)
    }

    fn srem(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64> {
        let mut ks = self.keyspace.lock();
        let removed = match ks.peek_mut(key) {
            Some(entry) => {
                let set = entry.value.set_mut()?;
                members.iter().filter(|m| set.remove(*m)).count() as u64
            }
            None => 0,
        };
        ks.drop_if_hollow(key);
        Ok(removed)
    }

    fn smembers(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.set()?.iter().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }

    fn scard(&self, key: &ByteBuffer) -> Result<u64> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.set()?.len() as u64),
            None => Ok(0),
        }
    }

    fn sismember(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<bool> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.set()?.contains(member)),
            None => Ok(false),
        }
    }

    fn spop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        let mut ks = self.keyspace.lock();
        let popped = match ks.peek_mut(key) {
            Some(entry) => {
                let set = entry.value.set_mut()?;
                let member = set.iter().next().cloned();
                if let Some(member) = &member {
                    set.remove(member);
                }
                member
            }
            None => None,
        };
        ks.drop_if_hollow(key);
        Ok(popped)
    }

    fn sinter(&self, keys: &[ByteBuffer]) -> Result<Vec<ByteBuffer>> {
        self.with_sets(keys, |sets| {
            // An absent key is an empty set, which empties the intersection
            let Some(sets) = sets.into_iter().collect::<Option<Vec<_>>>() else {
                return Vec::new();
            };
            match sets.split_first() {
                Some((first, rest)) => first
                    .iter()
                    .filter(|m| rest.iter().all(|s| s.contains(*m)))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        })
    }

    fn sunion(&self, keys: &[ByteBuffer]) -> Result<Vec<ByteBuffer>> {
        self.with_sets(keys, |sets| {
            let union: HashSet<&ByteBuffer> = sets.into_iter().flatten().flatten().collect();
            union.into_iter().cloned().collect()
        })
    }

    // =========================================================================
    // Sorted Set
    // =========================================================================

    fn zadd(&self, key: &ByteBuffer, members: &[(ByteBuffer, f64)]) -> Result<u64> {
        if members.iter().any(|(_, score)| score.is_nan()) {
            return Err(not_a_float());
        }
        if members.is_empty() {
            return Ok(0);
        }
        let mut ks = self.keyspace.lock();
        let zset = ks
            .entry_or(key, || Value::ZSet(HashMap::new()))
            .value
            .zset_mut()?;
        let mut created = 0;
        for (member, score) in members {
            if zset.insert(member.clone(), *score).is_none() {
                created += 1;
            }
        }
        Ok(created)
    }

    fn zrem(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64> {
        let mut ks = self.keyspace.lock();
        let removed = match ks.peek_mut(key) {
            Some(entry) => {
                let zset = entry.value.zset_mut()?;
                members.iter().filter(|m| zset.remove(*m).is_some()).count() as u64
            }
            None => 0,
        };
        ks.drop_if_hollow(key);
        Ok(removed)
    }

    fn zincrby(&self, key: &ByteBuffer, delta: f64, member: &ByteBuffer) -> Result<f64> {
        if delta.is_nan() {
            return Err(not_a_float());
        }
        let mut ks = self.keyspace.lock();
        let zset = ks
            .entry_or(key, || Value::ZSet(HashMap::new()))
            .value
            .zset_mut()?;
        let next = zset.get(member).copied().unwrap_or(0.0) + delta;
        if next.is_nan() {
            ks.drop_if_hollow(key);
            return Err(KvError::Server(
                "ERR resulting score is not a number (NaN)".to_string(),
            ));
        }
        zset.insert(member.clone(), next);
        Ok(next)
    }

    fn zscore(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<f64>> {
        match self.keyspace.lock().peek(key) {
            Some(entry) => Ok(entry.value.zset()?.get(member).copied()),
            None => Ok(None),
        }
    }

    fn zrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>> {
        let scored = self.zset_range(key, start, stop, false)?;
        Ok(scored.into_iter().map(|(member, _)| member).collect())
    }

    fn zrevrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>> {
        let scored = self.zset_range(key, start, stop, true)?;
        Ok(scored.into_iter().map(|(member, _)| member).collect())
    }

    fn zrange_withscores(
        &self,
        key: &ByteBuffer,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(ByteBuffer, f64)>> {
        self.zset_range(key, start, stop, false)
    }

    fn zrevrange_withscores(
        &self,
        key: &ByteBuffer,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(ByteBuffer, f64)>> {
        self.zset_range(key, start, stop, true)
    }

    fn zrangebyscore(&self, key: &ByteBuffer, min: f64, max: f64) -> Result<Vec<ByteBuffer>> {
        if min.is_nan() || max.is_nan() {
            return Err(KvError::Server("ERR min or max is not a float".to_string()));
        }
        let mut ks = self.keyspace.lock();
        let Some(entry) = ks.peek(key) else {
            return Ok(Vec::new());
        };
        Ok(ranked(entry.value.zset()?)
            .into_iter()
            .filter(|(_, score)| *score >= min && *score <= max)
            .map(|(member, _)| member.clone())
            .collect())
    }

    fn zrank(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<u64>> {
        self.zset_rank(key, member, false)
    }

    fn zrevrank(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<u64>> {
        self.zset_rank(key, member, true)
    }
}

//! RESP Connection
//!
//! Raw connection to a live store over one TCP session.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use parking_lot::Mutex;

use crate::buffer::ByteBuffer;
use crate::config::Config;
use crate::connection::RawConnection;
use crate::error::{KvError, Result};
use crate::protocol::{read_reply, write_command, Command, Reply};

/// Buffered halves of the TCP stream
struct Session {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Set once an exchange fails partway; the stream may still hold a
    /// stale reply, so nothing is read from it again
    broken: bool,
}

impl Session {
    /// Write one command and read its reply, breaking the session on failure
    fn exchange(&mut self, command: &Command) -> Result<Reply> {
        let result = write_command(&mut self.writer, command)
            .and_then(|()| read_reply(&mut self.reader));
        if result.is_err() {
            self.broken = true;
        }
        result
    }
}

/// A blocking RESP2 session implementing [`RawConnection`]
///
/// Every call locks the session, writes one command and reads exactly one
/// reply, so a shared handle never interleaves requests.
pub struct RespConnection {
    session: Mutex<Session>,

    /// Peer address for logging
    peer_addr: String,
}

impl RespConnection {
    /// Connect to the node described by `config`
    ///
    /// Disables Nagle's algorithm and applies the configured timeouts.
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = config.addr();
        tracing::debug!("Connecting to {}", addr);

        let stream = open_stream(&addr, config)
            .map_err(|e| KvError::Connection(format!("{}: {}", addr, e)))?;

        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        let connection = Self::from_stream(stream)?;
        tracing::debug!("Connected to {}", connection.peer_addr);
        Ok(connection)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            session: Mutex::new(Session {
                reader: BufReader::new(read_stream),
                writer: BufWriter::new(write_stream),
                broken: false,
            }),
            peer_addr,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// `PING`, expecting `+PONG`
    pub fn ping(&self) -> Result<()> {
        match self.execute(Command::new("PING"))? {
            Reply::Status(ref s) if s == "PONG" => Ok(()),
            other => Err(KvError::unexpected_reply("PING", other.kind())),
        }
    }

    /// Send any command and return its reply
    ///
    /// Error replies become [`KvError::Server`]. After an I/O or framing
    /// failure the session is unusable and every later call returns
    /// [`KvError::Connection`].
    pub fn execute(&self, command: Command) -> Result<Reply> {
        tracing::trace!("Sending {} to {}", command.name(), self.peer_addr);

        let reply = {
            let mut session = self.session.lock();
            if session.broken {
                return Err(KvError::Connection(format!(
                    "{}: session closed after an earlier failure",
                    self.peer_addr
                )));
            }
            session.exchange(&command).map_err(|e| {
                tracing::warn!(
                    "{} to {} failed, closing session: {}",
                    command.name(),
                    self.peer_addr,
                    e
                );
                e
            })?
        };

        match reply {
            Reply::Error(message) => {
                tracing::warn!("{} failed on {}: {}", command.name(), self.peer_addr, message);
                Err(KvError::Server(message))
            }
            reply => Ok(reply),
        }
    }

    fn keyed(&self, name: &'static str, key: &ByteBuffer) -> Command {
        Command::new(name).arg(key)
    }
}

fn open_stream(addr: &str, config: &Config) -> std::io::Result<TcpStream> {
    let Some(timeout) = config.connect_timeout() else {
        return TcpStream::connect(addr);
    };

    let mut last_error = None;
    for socket_addr in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&socket_addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "address resolved to nothing",
        )
    }))
}

impl RawConnection for RespConnection {
    // =========================================================================
    // Generic Key
    // =========================================================================

    fn exists(&self, key: &ByteBuffer) -> Result<bool> {
        Ok(self.execute(self.keyed("EXISTS", key))?.into_count("EXISTS")? > 0)
    }

    fn del(&self, key: &ByteBuffer) -> Result<u64> {
        self.execute(self.keyed("DEL", key))?.into_count("DEL")
    }

    fn del_many(&self, keys: &[ByteBuffer]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.execute(Command::new("DEL").args(keys))?.into_count("DEL")
    }

    fn expire(&self, key: &ByteBuffer, seconds: i64) -> Result<bool> {
        let cmd = self.keyed("EXPIRE", key).arg_int(seconds);
        self.execute(cmd)?.into_flag("EXPIRE")
    }

    fn pexpire(&self, key: &ByteBuffer, millis: i64) -> Result<bool> {
        let cmd = self.keyed("PEXPIRE", key).arg_int(millis);
        self.execute(cmd)?.into_flag("PEXPIRE")
    }

    fn ttl(&self, key: &ByteBuffer) -> Result<i64> {
        self.execute(self.keyed("TTL", key))?.into_integer("TTL")
    }

    fn pttl(&self, key: &ByteBuffer) -> Result<i64> {
        self.execute(self.keyed("PTTL", key))?.into_integer("PTTL")
    }

    // =========================================================================
    // String
    // =========================================================================

    fn set(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<()> {
        self.execute(self.keyed("SET", key).arg(value))?.into_ok("SET")
    }

    fn set_nx(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<bool> {
        match self.execute(self.keyed("SET", key).arg(value).arg("NX"))? {
            Reply::Status(ref s) if s == "OK" => Ok(true),
            Reply::Bulk(None) => Ok(false),
            other => Err(KvError::unexpected_reply("SET", other.kind())),
        }
    }

    fn set_ex(&self, key: &ByteBuffer, value: &ByteBuffer, seconds: u64) -> Result<()> {
        let cmd = self
            .keyed("SET", key)
            .arg(value)
            .arg("EX")
            .arg(seconds.to_string());
        self.execute(cmd)?.into_ok("SET")
    }

    fn set_px(&self, key: &ByteBuffer, value: &ByteBuffer, millis: u64) -> Result<()> {
        let cmd = self
            .keyed("SET", key)
            .arg(value)
            .arg("PX")
            .arg(millis.to_string());
        self.execute(cmd)?.into_ok("SET")
    }

    fn get(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        self.execute(self.keyed("GET", key))?.into_bulk("GET")
    }

    fn getset(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        self.execute(self.keyed("GETSET", key).arg(value))?
            .into_bulk("GETSET")
    }

    fn incrby(&self, key: &ByteBuffer, delta: i64) -> Result<i64> {
        self.execute(self.keyed("INCRBY", key).arg_int(delta))?
            .into_integer("INCRBY")
    }

    fn decrby(&self, key: &ByteBuffer, delta: i64) -> Result<i64> {
        self.execute(self.keyed("DECRBY", key).arg_int(delta))?
            .into_integer("DECRBY")
    }

    fn append(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64> {
        self.execute(self.keyed("APPEND", key).arg(value))?
            .into_count("APPEND")
    }

    fn mget(&self, keys: &[ByteBuffer]) -> Result<Vec<Option<ByteBuffer>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let values = self
            .execute(Command::new("MGET").args(keys))?
            .into_optional_bulks("MGET")?;
        if values.len() != keys.len() {
            return Err(KvError::Protocol(format!(
                "MGET: asked for {} keys, got {} values",
                keys.len(),
                values.len()
            )));
        }
        Ok(values)
    }

    // =========================================================================
    // Hash
    // =========================================================================

    fn hset(&self, key: &ByteBuffer, field: &ByteBuffer, value: &ByteBuffer) -> Result<bool> {
        self.execute(self.keyed("HSET", key).arg(field).arg(value))?
            .into_flag("HSET")
    }

    fn hset_many(&self, key: &ByteBuffer, entries: &[(ByteBuffer, ByteBuffer)]) -> Result<u64> {
        if entries.is_empty() {
            return Ok(0);
        }
        let cmd = entries
            .iter()
            .fold(self.keyed("HSET", key), |cmd, (field, value)| {
                cmd.arg(field).arg(value)
            });
        self.execute(cmd)?.into_count("HSET")
    }

    fn hget(&self, key: &ByteBuffer, field: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        self.execute(self.keyed("HGET", key).arg(field))?
            .into_bulk("HGET")
    }

    fn hmget(
        &self,
        key: &ByteBuffer,
        fields: &mut HashMap<ByteBuffer, Option<ByteBuffer>>,
    ) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }

        // Reply order follows request order
        let order: Vec<ByteBuffer> = fields.keys().cloned().collect();
        let values = self
            .execute(self.keyed("HMGET", key).args(&order))?
            .into_optional_bulks("HMGET")?;
        if values.len() != order.len() {
            return Err(KvError::Protocol(format!(
                "HMGET: asked for {} fields, got {} values",
                order.len(),
                values.len()
            )));
        }

        for (field, value) in order.into_iter().zip(values) {
            fields.insert(field, value);
        }
        Ok(())
    }

    fn hgetall(&self, key: &ByteBuffer) -> Result<HashMap<ByteBuffer, ByteBuffer>> {
        let pairs = self
            .execute(self.keyed("HGETALL", key))?
            .into_pairs("HGETALL")?;
        Ok(pairs.into_iter().collect())
    }

    fn hkeys(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>> {
        self.execute(self.keyed("HKEYS", key))?.into_bulks("HKEYS")
    }

    fn hvals(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>> {
        self.execute(self.keyed("HVALS", key))?.into_bulks("HVALS")
    }

    fn hdel(&self, key: &ByteBuffer, field: &ByteBuffer) -> Result<u64> {
        self.execute(self.keyed("HDEL", key).arg(field))?
            .into_count("HDEL")
    }

    fn hdel_many(&self, key: &ByteBuffer, fields: &[ByteBuffer]) -> Result<u64> {
        if fields.is_empty() {
            return Ok(0);
        }
        self.execute(self.keyed("HDEL", key).args(fields))?
            .into_count("HDEL")
    }

    // =========================================================================
    // List
    // =========================================================================

    fn lpush(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64> {
        self.execute(self.keyed("LPUSH", key).arg(value))?
            .into_count("LPUSH")
    }

    fn lpush_many(&self, key: &ByteBuffer, values: &[ByteBuffer]) -> Result<u64> {
        if values.is_empty() {
            return self.llen(key);
        }
        self.execute(self.keyed("LPUSH", key).args(values))?
            .into_count("LPUSH")
    }

    fn rpush(&self, key: &ByteBuffer, value: &ByteBuffer) -> Result<u64> {
        self.execute(self.keyed("RPUSH", key).arg(value))?
            .into_count("RPUSH")
    }

    fn rpush_many(&self, key: &ByteBuffer, values: &[ByteBuffer]) -> Result<u64> {
        if values.is_empty() {
            return self.llen(key);
        }
        self.execute(self.keyed("RPUSH", key).args(values))?
            .into_count("RPUSH")
    }

    fn lpop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        self.execute(self.keyed("LPOP", key))?.into_bulk("LPOP")
    }

    fn rpop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        self.execute(self.keyed("RPOP", key))?.into_bulk("RPOP")
    }

    fn lrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>> {
        let cmd = self.keyed("LRANGE", key).arg_int(start).arg_int(stop);
        self.execute(cmd)?.into_bulks("LRANGE")
    }

    fn llen(&self, key: &ByteBuffer) -> Result<u64> {
        self.execute(self.keyed("LLEN", key))?.into_count("LLEN")
    }

    fn lindex(&self, key: &ByteBuffer, index: i64) -> Result<Option<ByteBuffer>> {
        self.execute(self.keyed("LINDEX", key).arg_int(index))?
            .into_bulk("LINDEX")
    }

    fn lrem(&self, key: &ByteBuffer, count: i64, value: &ByteBuffer) -> Result<u64> {
        let cmd = self.keyed("LREM", key).arg_int(count).arg(value);
        self.execute(cmd)?.into_count("LREM")
    }

    // =========================================================================
    // Set
    // =========================================================================

    fn sadd(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        self.execute(self.keyed("SADD", key).args(members))?
            .into_count("SADD")
    }

    fn srem(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        self.execute(self.keyed("SREM", key).args(members))?
            .into_count("SREM")
    }

    fn smembers(&self, key: &ByteBuffer) -> Result<Vec<ByteBuffer>> {
        self.execute(self.keyed("SMEMBERS", key))?
            .into_bulks("SMEMBERS")
    }

    fn scard(&self, key: &ByteBuffer) -> Result<u64> {
        self.execute(self.keyed("SCARD", key))?.into_count("SCARD")
    }

    fn sismember(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<bool> {
        self.execute(self.keyed("SISMEMBER", key).arg(member))?
            .into_flag("SISMEMBER")
    }

    fn spop(&self, key: &ByteBuffer) -> Result<Option<ByteBuffer>> {
        self.execute(self.keyed("SPOP", key))?.into_bulk("SPOP")
    }

    fn sinter(&self, keys: &[ByteBuffer]) -> Result<Vec<ByteBuffer>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.execute(Command::new("SINTER").args(keys))?
            .into_bulks("SINTER")
    }

    fn sunion(&self, keys: &[ByteBuffer]) -> Result<Vec<ByteBuffer>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.execute(Command::new("SUNION").args(keys))?
            .into_bulks("SUNION")
    }

    // =========================================================================
    // Sorted Set
    // =========================================================================

    fn zadd(&self, key: &ByteBuffer, members: &[(ByteBuffer, f64)]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let cmd = members
            .iter()
            .fold(self.keyed("ZADD", key), |cmd, (member, score)| {
                cmd.arg_float(*score).arg(member)
            });
        self.execute(cmd)?.into_count("ZADD")
    }

    fn zrem(&self, key: &ByteBuffer, members: &[ByteBuffer]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        self.execute(self.keyed("ZREM", key).args(members))?
            .into_count("ZREM")
    }

    fn zincrby(&self, key: &ByteBuffer, delta: f64, member: &ByteBuffer) -> Result<f64> {
        let cmd = self.keyed("ZINCRBY", key).arg_float(delta).arg(member);
        self.execute(cmd)?
            .into_score("ZINCRBY")?
            .ok_or_else(|| KvError::unexpected_reply("ZINCRBY", "nil"))
    }

    fn zscore(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<f64>> {
        self.execute(self.keyed("ZSCORE", key).arg(member))?
            .into_score("ZSCORE")
    }

    fn zrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>> {
        let cmd = self.keyed("ZRANGE", key).arg_int(start).arg_int(stop);
        self.execute(cmd)?.into_bulks("ZRANGE")
    }

    fn zrevrange(&self, key: &ByteBuffer, start: i64, stop: i64) -> Result<Vec<ByteBuffer>> {
        let cmd = self.keyed("ZREVRANGE", key).arg_int(start).arg_int(stop);
        self.execute(cmd)?.into_bulks("ZREVRANGE")
    }

    fn zrange_withscores(
        &self,
        key: &ByteBuffer,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(ByteBuffer, f64)>> {
        let cmd = self
            .keyed("ZRANGE", key)
            .arg_int(start)
            .arg_int(stop)
            .arg("WITHSCORES");
        self.execute(cmd)?.into_scored("ZRANGE")
    }

    fn zrevrange_withscores(
        &self,
        key: &ByteBuffer,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(ByteBuffer, f64)>> {
        let cmd = self
            .keyed("ZREVRANGE", key)
            .arg_int(start)
            .arg_int(stop)
            .arg("WITHSCORES");
        self.execute(cmd)?.into_scored("ZREVRANGE")
    }

    fn zrangebyscore(&self, key: &ByteBuffer, min: f64, max: f64) -> Result<Vec<ByteBuffer>> {
        let cmd = self.keyed("ZRANGEBYSCORE", key).arg_float(min).arg_float(max);
        self.execute(cmd)?.into_bulks("ZRANGEBYSCORE")
    }

    fn zrank(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<u64>> {
        rank_reply(self.execute(self.keyed("ZRANK", key).arg(member))?, "ZRANK")
    }

    fn zrevrank(&self, key: &ByteBuffer, member: &ByteBuffer) -> Result<Option<u64>> {
        rank_reply(self.execute(self.keyed("ZREVRANK", key).arg(member))?, "ZREVRANK")
    }
}

/// `:n` for a member, nil when absent
fn rank_reply(reply: Reply, command: &str) -> Result<Option<u64>> {
    match reply {
        Reply::Bulk(None) => Ok(None),
        other => other.into_count(command).map(Some),
    }
}

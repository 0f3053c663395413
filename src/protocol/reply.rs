//! Reply definitions
//!
//! Represents replies from the store, plus the shape checks each command
//! applies to its reply.

use crate::buffer::ByteBuffer;
use crate::error::{KvError, Result};

/// A decoded RESP2 reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `+OK`
    Status(String),

    /// `-ERR ...`
    Error(String),

    /// `:42`
    Integer(i64),

    /// `$5\r\nhello`, `None` for the null bulk string
    Bulk(Option<ByteBuffer>),

    /// `*2\r\n...`, `None` for the null array
    Array(Option<Vec<Reply>>),
}

impl Reply {
    /// Short name of the reply kind, used in protocol errors
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Status(_) => "status",
            Reply::Error(_) => "error",
            Reply::Integer(_) => "integer",
            Reply::Bulk(Some(_)) => "bulk",
            Reply::Bulk(None) => "nil",
            Reply::Array(Some(_)) => "array",
            Reply::Array(None) => "nil array",
        }
    }

    /// Error replies surface as server errors, anything else is a
    /// protocol error naming the command
    fn unexpected(self, command: &str) -> KvError {
        match self {
            Reply::Error(message) => KvError::Server(message),
            other => KvError::unexpected_reply(command, other.kind()),
        }
    }

    // =========================================================================
    // Shape Conversions
    // =========================================================================

    /// Expect `+OK`
    pub fn into_ok(self, command: &str) -> Result<()> {
        match self {
            Reply::Status(ref s) if s == "OK" => Ok(()),
            other => Err(other.unexpected(command)),
        }
    }

    pub fn into_integer(self, command: &str) -> Result<i64> {
        match self {
            Reply::Integer(n) => Ok(n),
            other => Err(other.unexpected(command)),
        }
    }

    /// Expect a non-negative integer
    pub fn into_count(self, command: &str) -> Result<u64> {
        let n = self.into_integer(command)?;
        u64::try_from(n)
            .map_err(|_| KvError::Protocol(format!("{}: negative count {}", command, n)))
    }

    /// Expect `:0` or `:1`
    pub fn into_flag(self, command: &str) -> Result<bool> {
        match self.into_integer(command)? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(KvError::Protocol(format!("{}: expected 0 or 1, got {}", command, n))),
        }
    }

    pub fn into_bulk(self, command: &str) -> Result<Option<ByteBuffer>> {
        match self {
            Reply::Bulk(data) => Ok(data),
            other => Err(other.unexpected(command)),
        }
    }

    /// Expect a bulk string holding a float, `None` for nil
    pub fn into_score(self, command: &str) -> Result<Option<f64>> {
        self.into_bulk(command)?
            .map(|data| parse_score(&data, command))
            .transpose()
    }

    /// Expect an array; the null array reads as empty
    pub fn into_array(self, command: &str) -> Result<Vec<Reply>> {
        match self {
            Reply::Array(items) => Ok(items.unwrap_or_default()),
            other => Err(other.unexpected(command)),
        }
    }

    /// Expect an array of bulk strings, nils allowed
    pub fn into_optional_bulks(self, command: &str) -> Result<Vec<Option<ByteBuffer>>> {
        self.into_array(command)?
            .into_iter()
            .map(|item| item.into_bulk(command))
            .collect()
    }

    /// Expect an array of non-nil bulk strings
    pub fn into_bulks(self, command: &str) -> Result<Vec<ByteBuffer>> {
        self.into_array(command)?
            .into_iter()
            .map(|item| {
                item.into_bulk(command)?
                    .ok_or_else(|| KvError::unexpected_reply(command, "nil"))
            })
            .collect()
    }

    /// Expect a flat `[a1, b1, a2, b2, ...]` array of bulk strings
    pub fn into_pairs(self, command: &str) -> Result<Vec<(ByteBuffer, ByteBuffer)>> {
        let items = self.into_bulks(command)?;
        if items.len() % 2 != 0 {
            return Err(KvError::Protocol(format!(
                "{}: odd number of elements ({}) in pair array",
                command,
                items.len()
            )));
        }

        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(a), Some(b)) = (iter.next(), iter.next()) {
            pairs.push((a, b));
        }
        Ok(pairs)
    }

    /// Expect a flat `[member, score, ...]` array
    pub fn into_scored(self, command: &str) -> Result<Vec<(ByteBuffer, f64)>> {
        self.into_pairs(command)?
            .into_iter()
            .map(|(member, score)| Ok((member, parse_score(&score, command)?)))
            .collect()
    }
}

fn parse_score(data: &ByteBuffer, command: &str) -> Result<f64> {
    std::str::from_utf8(data.as_slice())
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or_else(|| KvError::Protocol(format!("{}: invalid score {:?}", command, data)))
}

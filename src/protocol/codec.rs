//! Protocol codec
//!
//! Encoding of commands and decoding of replies for RESP2.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<verb>\r\n
//! $<len>\r\n<arg 1>\r\n
//! ...
//! ```
//!
//! ### Reply Format (first byte selects the kind)
//! - `+` status line
//! - `-` error line
//! - `:` signed integer
//! - `$` bulk string, `$-1` = nil
//! - `*` array of replies, `*-1` = nil

use std::io::{BufRead, Cursor, ErrorKind, Write};

use crate::buffer::ByteBuffer;
use crate::error::{KvError, Result};
use super::{Command, Reply};

/// Largest bulk string accepted (512 MB, the store's own limit)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Largest array accepted
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command as a RESP2 array of bulk strings
pub fn encode_command(command: &Command) -> Vec<u8> {
    let args = command.arguments();
    let payload: usize = args.iter().map(|a| a.len() + 16).sum();

    let mut message = Vec::with_capacity(32 + command.name().len() + payload);
    message.extend_from_slice(format!("*{}\r\n", args.len() + 1).as_bytes());
    push_bulk(&mut message, command.name().as_bytes());
    for arg in args {
        push_bulk(&mut message, arg.as_slice());
    }

    message
}

fn push_bulk(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(format!("${}\r\n", data.len()).as_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Reply Decoding
// =============================================================================

/// Read one complete reply from a stream
///
/// Blocks until the reply (including nested array elements) is received.
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let mut line = Vec::new();
    read_reply_with(reader, &mut line)
}

/// Decode exactly one reply from `bytes`
///
/// Truncated input and trailing bytes are both protocol errors.
pub fn decode_reply(bytes: &[u8]) -> Result<Reply> {
    let mut cursor = Cursor::new(bytes);
    let reply = read_reply(&mut cursor).map_err(|e| match e {
        KvError::Io(ref io) if io.kind() == ErrorKind::UnexpectedEof => {
            KvError::Protocol(format!("Incomplete reply: {} bytes", bytes.len()))
        }
        other => other,
    })?;

    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(KvError::Protocol(format!(
            "Trailing bytes after reply: consumed {}, got {}",
            consumed,
            bytes.len()
        )));
    }
    Ok(reply)
}

fn read_reply_with<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> Result<Reply> {
    read_line(reader, line)?;

    let (&marker, rest) = line
        .split_first()
        .ok_or_else(|| KvError::Protocol("Empty reply line".to_string()))?;

    match marker {
        b'+' => Ok(Reply::Status(line_text(rest)?)),
        b'-' => Ok(Reply::Error(line_text(rest)?)),
        b':' => Ok(Reply::Integer(parse_i64(rest)?)),
        b'$' => {
            let len = parse_i64(rest)?;
            read_bulk(reader, len)
        }
        b'*' => {
            let len = parse_i64(rest)?;
            read_array(reader, len, line)
        }
        _ => Err(KvError::Protocol(format!(
            "Unknown reply type: 0x{:02x}",
            marker
        ))),
    }
}

fn read_bulk<R: BufRead>(reader: &mut R, len: i64) -> Result<Reply> {
    if len == -1 {
        return Ok(Reply::Bulk(None));
    }
    let len = checked_len(len, MAX_BULK_LEN, "Bulk")?;

    // Payload plus trailing CRLF
    let mut data = vec![0u8; len + 2];
    reader.read_exact(&mut data)?;
    if !data.ends_with(b"\r\n") {
        return Err(KvError::Protocol(
            "Bulk string not terminated by CRLF".to_string(),
        ));
    }
    data.truncate(len);

    Ok(Reply::Bulk(Some(ByteBuffer::from_vec(data))))
}

fn read_array<R: BufRead>(reader: &mut R, len: i64, line: &mut Vec<u8>) -> Result<Reply> {
    if len == -1 {
        return Ok(Reply::Array(None));
    }
    let len = checked_len(len, MAX_ARRAY_LEN, "Array")?;

    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(read_reply_with(reader, line)?);
    }
    Ok(Reply::Array(Some(items)))
}

fn checked_len(len: i64, max: usize, what: &str) -> Result<usize> {
    let len = usize::try_from(len)
        .map_err(|_| KvError::Protocol(format!("{} length invalid: {}", what, len)))?;
    if len > max {
        return Err(KvError::Protocol(format!(
            "{} too large: {} (max {})",
            what, len, max
        )));
    }
    Ok(len)
}

/// Read one CRLF-terminated line into `line`, without the terminator
fn read_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> Result<()> {
    line.clear();
    let read = reader.read_until(b'\n', line)?;
    if read == 0 {
        return Err(KvError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "connection closed before reply",
        )));
    }
    if !line.ends_with(b"\r\n") {
        if line.ends_with(b"\n") {
            return Err(KvError::Protocol("Reply line not terminated by CRLF".to_string()));
        }
        return Err(KvError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "reply line truncated",
        )));
    }
    line.truncate(line.len() - 2);
    Ok(())
}

fn line_text(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|_| KvError::Protocol("Reply line is not valid UTF-8".to_string()))
}

fn parse_i64(data: &[u8]) -> Result<i64> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| {
            KvError::Protocol(format!(
                "Invalid integer in reply: {:?}",
                String::from_utf8_lossy(data)
            ))
        })
}

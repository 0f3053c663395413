//! Protocol Module
//!
//! RESP2, the store's client protocol, as used by [`RespConnection`].
//!
//! ## Request Format
//! Every command is an array of bulk strings; the verb is the first element.
//! ```text
//! *3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n
//! ```
//!
//! ## Reply Kinds
//! | Marker | Kind | Example |
//! |--------|------|---------|
//! | `+` | status | `+OK` |
//! | `-` | error | `-WRONGTYPE ...` |
//! | `:` | integer | `:3` |
//! | `$` | bulk string | `$5\r\nhello` / `$-1` |
//! | `*` | array | `*2\r\n...` / `*-1` |
//!
//! [`RespConnection`]: crate::network::RespConnection

mod codec;
mod command;
mod reply;

pub use codec::{decode_reply, encode_command, read_reply, write_command, MAX_ARRAY_LEN, MAX_BULK_LEN};
pub use command::Command;
pub use reply::Reply;

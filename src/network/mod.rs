//! Network Module
//!
//! TCP client side of the raw connection contract.
//!
//! ## Architecture
//! - One blocking `TcpStream` per connection, buffered in both directions
//! - A mutex around the session so each call is one request/reply exchange
//! - Commands and replies encoded by [`crate::protocol`]

mod connection;

pub use connection::RespConnection;

//! Command definitions
//!
//! A command is a verb followed by positional, binary-safe arguments.

use crate::buffer::ByteBuffer;

/// A request to send to the store
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Verb, e.g. `HSET`
    name: &'static str,

    /// Arguments after the verb
    args: Vec<ByteBuffer>,
}

impl Command {
    /// Start a command with no arguments
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Append a binary argument
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.args.push(ByteBuffer::copy_from_slice(arg.as_ref()));
        self
    }

    /// Append an integer argument in decimal form
    pub fn arg_int(self, value: i64) -> Self {
        self.arg(value.to_string())
    }

    /// Append a float argument, infinities spelled `+inf` / `-inf`
    pub fn arg_float(self, value: f64) -> Self {
        let text = if value == f64::INFINITY {
            "+inf".to_string()
        } else if value == f64::NEG_INFINITY {
            "-inf".to_string()
        } else {
            value.to_string()
        };
        self.arg(text)
    }

    /// Append every argument from `args`
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        self.args
            .extend(args.into_iter().map(|a| ByteBuffer::copy_from_slice(a.as_ref())));
        self
    }

    /// Get the verb
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the arguments after the verb
    pub fn arguments(&self) -> &[ByteBuffer] {
        &self.args
    }
}

//! Configuration for typedkv
//!
//! Connection settings for the RESP-backed raw connection, with sensible
//! defaults and an environment override used by the CLI and live tests.

use std::env;
use std::time::Duration;

use crate::error::{KvError, Result};

/// Environment variable holding the store host
pub const ENV_HOST: &str = "TYPEDKV_HOST";

/// Environment variable holding the store port
pub const ENV_PORT: &str = "TYPEDKV_PORT";

/// Environment variable holding the socket timeout in milliseconds
pub const ENV_TIMEOUT_MS: &str = "TYPEDKV_TIMEOUT_MS";

/// Connection configuration for a single store node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Store host name or IP
    pub host: String,

    /// Store TCP port
    pub port: u16,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` string suitable for socket address resolution
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Defaults overridden by `TYPEDKV_HOST`, `TYPEDKV_PORT` and
    /// `TYPEDKV_TIMEOUT_MS` when they are set.
    pub fn from_env() -> Result<Self> {
        let mut builder = Config::builder();

        if let Ok(host) = env::var(ENV_HOST) {
            if host.trim().is_empty() {
                return Err(KvError::Config(format!("{} is empty", ENV_HOST)));
            }
            builder = builder.host(host.trim());
        }

        if let Ok(port) = env::var(ENV_PORT) {
            let port = port
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| KvError::Config(format!("{} is not a valid port: {:?}", ENV_PORT, port)))?;
            builder = builder.port(port);
        }

        if let Ok(timeout) = env::var(ENV_TIMEOUT_MS) {
            let ms = timeout.trim().parse::<u64>().map_err(|_| {
                KvError::Config(format!("{} is not a number: {:?}", ENV_TIMEOUT_MS, timeout))
            })?;
            builder = builder.timeout_ms(ms);
        }

        Ok(builder.build())
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.connect_timeout_ms)
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.read_timeout_ms)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.write_timeout_ms)
    }
}

fn non_zero_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the store port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set connect, read and write timeouts at once
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.connect_timeout_ms(ms).read_timeout_ms(ms).write_timeout_ms(ms)
    }

    pub fn build(self) -> Config {
        self.config
    }
}

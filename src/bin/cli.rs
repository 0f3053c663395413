//! typedkv CLI Client
//!
//! Command-line interface issuing typed string operations against a
//! Redis-compatible store.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use typedkv::prelude::*;
use typedkv::{Config, RespConnection, StringTemplate};

/// typedkv CLI
#[derive(Parser, Debug)]
#[command(name = "typedkv-cli")]
#[command(about = "Typed client for Redis-compatible key-value stores")]
#[command(version)]
struct Args {
    /// Store host (default: $TYPEDKV_HOST or 127.0.0.1)
    #[arg(long)]
    host: Option<String>,

    /// Store port (default: $TYPEDKV_PORT or 6379)
    #[arg(short, long)]
    port: Option<u16>,

    /// Connect/read/write timeout in milliseconds, 0 disables
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get { key: String },

    /// Set a key-value pair
    Set {
        key: String,
        value: String,

        /// Expire after this many seconds
        #[arg(long)]
        ex: Option<u64>,
    },

    /// Delete one or more keys
    Del {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Check whether a key exists
    Exists { key: String },

    /// Set a key's time to live in seconds
    Expire { key: String, seconds: u64 },

    /// Remaining time to live in seconds (-1 no expiry, -2 absent)
    Ttl { key: String },

    /// Increment the integer at key
    Incr {
        key: String,

        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        by: i64,
    },

    /// Push values onto the head of a list
    Lpush {
        key: String,

        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print list elements in an index range
    Lrange {
        key: String,

        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        start: i64,

        #[arg(default_value_t = -1, allow_negative_numbers = true)]
        stop: i64,
    },

    /// Add members to a set
    Sadd {
        key: String,

        #[arg(required = true)]
        members: Vec<String>,
    },

    /// Print all members of a set
    Smembers { key: String },

    /// Set a hash field
    Hset {
        key: String,
        field: String,
        value: String,
    },

    /// Print every field of a hash
    Hgetall { key: String },

    /// Add or update a sorted-set member
    Zadd {
        key: String,

        #[arg(allow_negative_numbers = true)]
        score: f64,

        member: String,
    },

    /// Print sorted-set members in a rank range
    Zrange {
        key: String,

        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        start: i64,

        #[arg(default_value_t = -1, allow_negative_numbers = true)]
        stop: i64,

        /// Print scores next to members
        #[arg(long)]
        withscores: bool,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,typedkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> typedkv::Result<()> {
    // Flags override the environment
    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ms) = args.timeout_ms {
        config.connect_timeout_ms = ms;
        config.read_timeout_ms = ms;
        config.write_timeout_ms = ms;
    }

    let connection = RespConnection::connect(&config)?;
    let template = StringTemplate::strings(Arc::new(connection));

    match args.command {
        Commands::Get { key } => match template.ops_for_value().get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Set { key, value, ex } => {
            let values = template.ops_for_value();
            match ex {
                Some(seconds) => values.set_with_expire(&key, &value, Duration::from_secs(seconds))?,
                None => values.set(&key, &value)?,
            }
            println!("OK");
        }
        Commands::Del { keys } => println!("{}", template.delete_many(&keys)?),
        Commands::Exists { key } => println!("{}", template.exists(&key)?),
        Commands::Expire { key, seconds } => {
            println!("{}", template.expire(&key, Duration::from_secs(seconds))?)
        }
        Commands::Ttl { key } => println!("{}", template.ttl(&key)?),
        Commands::Incr { key, by } => println!("{}", template.ops_for_value().increment_by(&key, by)?),
        Commands::Lpush { key, values } => {
            println!("{}", template.ops_for_list().lpush_all(&key, &values)?)
        }
        Commands::Lrange { key, start, stop } => {
            for (i, value) in template.ops_for_list().lrange(&key, start, stop)?.iter().enumerate() {
                println!("{}) {}", i + 1, value);
            }
        }
        Commands::Sadd { key, members } => {
            println!("{}", template.ops_for_set().sadd(&key, &members)?)
        }
        Commands::Smembers { key } => {
            let mut members: Vec<String> = template.ops_for_set().smembers(&key)?.into_iter().collect();
            members.sort();
            for member in members {
                println!("{}", member);
            }
        }
        Commands::Hset { key, field, value } => {
            println!("{}", template.ops_for_hash().hset(&key, &field, &value)?)
        }
        Commands::Hgetall { key } => {
            let entries: HashMap<String, String> = template.ops_for_hash().hgetall(&key)?;
            let mut entries: Vec<_> = entries.into_iter().collect();
            entries.sort();
            for (field, value) in entries {
                println!("{} => {}", field, value);
            }
        }
        Commands::Zadd { key, score, member } => {
            println!("{}", template.ops_for_zset().zadd_one(&key, &member, score)?)
        }
        Commands::Zrange {
            key,
            start,
            stop,
            withscores,
        } => {
            let zset = template.ops_for_zset();
            if withscores {
                for (member, score) in zset.zrange_withscores(&key, start, stop)? {
                    println!("{} {}", member, score);
                }
            } else {
                for member in zset.zrange(&key, start, stop)? {
                    println!("{}", member);
                }
            }
        }
    }

    Ok(())
}

//! RespConnection Tests
//!
//! Drives the RESP2 connection against a scripted fake server. The server
//! reports every command it receives over a channel so tests can assert on
//! the exact wire arguments.

use std::collections::HashMap;
use std::io::{BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver};
use typedkv::prelude::*;
use typedkv::protocol::{read_reply, Reply};
use typedkv::{ByteBuffer, Config, KvError, RawConnection, RespConnection, StringTemplate};

// =============================================================================
// Fake Server
// =============================================================================

/// Builds the raw reply bytes for one received command
type Handler = fn(&[Vec<u8>]) -> Vec<u8>;

/// Accept one client, answer `commands` requests, forward each request's
/// arguments over the returned channel
fn spawn_server(commands: usize, handler: Handler) -> (Config, Receiver<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let (tx, rx) = unbounded();

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut writer = stream;

        for _ in 0..commands {
            // Commands are arrays of bulk strings, so the reply decoder reads them
            let args = match read_reply(&mut reader) {
                Ok(request) => command_args(request),
                Err(_) => return,
            };
            let reply = handler(&args);
            let _ = tx.send(args);
            let _ = writer.write_all(&reply);
            let _ = writer.flush();
        }
    });

    let config = Config::builder()
        .host("127.0.0.1")
        .port(port)
        .timeout_ms(2000)
        .build();
    (config, rx)
}

fn command_args(request: Reply) -> Vec<Vec<u8>> {
    match request {
        Reply::Array(Some(items)) => items
            .into_iter()
            .map(|item| match item {
                Reply::Bulk(Some(data)) => data.to_vec(),
                other => panic!("command argument was {:?}", other),
            })
            .collect(),
        other => panic!("command was {:?}", other),
    }
}

fn next(rx: &Receiver<Vec<Vec<u8>>>) -> Vec<String> {
    rx.recv_timeout(Duration::from_secs(2))
        .expect("server saw a command")
        .into_iter()
        .map(|arg| String::from_utf8_lossy(&arg).into_owned())
        .collect()
}

fn connect(config: &Config) -> RespConnection {
    RespConnection::connect(config).expect("connect")
}

fn b(s: &str) -> ByteBuffer {
    ByteBuffer::from(s)
}

// =============================================================================
// Connection Tests
// =============================================================================

#[test]
fn test_connect_refused_is_connection_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let config = Config::builder().host("127.0.0.1").port(port).build();

    match RespConnection::connect(&config) {
        Err(KvError::Connection(message)) => assert!(message.contains(&port.to_string())),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("connected to a closed port"),
    }
}

#[test]
fn test_ping() {
    let (config, rx) = spawn_server(1, |_| b"+PONG\r\n".to_vec());
    let conn = connect(&config);

    conn.ping().unwrap();
    assert_eq!(next(&rx), vec!["PING"]);
}

#[test]
fn test_set_then_get() {
    let (config, rx) = spawn_server(2, |args| match args[0].as_slice() {
        b"SET" => b"+OK\r\n".to_vec(),
        _ => b"$5\r\nvalue\r\n".to_vec(),
    });
    let conn = connect(&config);

    conn.set(&b("key"), &b("value")).unwrap();
    assert_eq!(next(&rx), vec!["SET", "key", "value"]);

    assert_eq!(conn.get(&b("key")).unwrap(), Some(b("value")));
    assert_eq!(next(&rx), vec!["GET", "key"]);
}

#[test]
fn test_set_variants_on_the_wire() {
    let (config, rx) = spawn_server(3, |args| match args.len() {
        4 => b"$-1\r\n".to_vec(),
        _ => b"+OK\r\n".to_vec(),
    });
    let conn = connect(&config);

    assert!(!conn.set_nx(&b("k"), &b("v")).unwrap());
    assert_eq!(next(&rx), vec!["SET", "k", "v", "NX"]);

    conn.set_ex(&b("k"), &b("v"), 30).unwrap();
    assert_eq!(next(&rx), vec!["SET", "k", "v", "EX", "30"]);

    conn.set_px(&b("k"), &b("v"), 1500).unwrap();
    assert_eq!(next(&rx), vec!["SET", "k", "v", "PX", "1500"]);
}

#[test]
fn test_binary_safe_values() {
    let (config, rx) = spawn_server(1, |_| b"$4\r\n\x00\r\n\xff\r\n".to_vec());
    let conn = connect(&config);

    let value = conn.getset(&b("k"), &ByteBuffer::from(&[0u8, 13, 10, 255][..])).unwrap();
    assert_eq!(value, Some(ByteBuffer::from(&[0u8, 13, 10, 255][..])));

    let args = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(args[2], vec![0u8, 13, 10, 255]);
}

// =============================================================================
// Reply Mapping Tests
// =============================================================================

#[test]
fn test_error_reply_is_server_error() {
    let (config, _rx) = spawn_server(1, |_| {
        b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec()
    });
    let conn = connect(&config);

    match conn.llen(&b("k")) {
        Err(KvError::Server(message)) => assert!(message.starts_with("WRONGTYPE")),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_wrong_reply_kind_is_protocol_error() {
    let (config, _rx) = spawn_server(1, |_| b"+OK\r\n".to_vec());
    let conn = connect(&config);

    match conn.incrby(&b("k"), 1) {
        Err(KvError::Protocol(message)) => assert!(message.contains("INCRBY")),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_ttl_sentinels_pass_through() {
    let (config, rx) = spawn_server(2, |args| match args[0].as_slice() {
        b"TTL" => b":-2\r\n".to_vec(),
        _ => b":-1\r\n".to_vec(),
    });
    let conn = connect(&config);

    assert_eq!(conn.ttl(&b("missing")).unwrap(), -2);
    assert_eq!(conn.pttl(&b("forever")).unwrap(), -1);
    assert_eq!(next(&rx), vec!["TTL", "missing"]);
    assert_eq!(next(&rx), vec!["PTTL", "forever"]);
}

#[test]
fn test_hmget_fills_slots_in_request_order() {
    let (config, rx) = spawn_server(1, |args| {
        let mut reply = format!("*{}\r\n", args.len() - 2).into_bytes();
        for field in &args[2..] {
            if field.as_slice() == b"present" {
                reply.extend_from_slice(b"$3\r\nyes\r\n");
            } else {
                reply.extend_from_slice(b"$-1\r\n");
            }
        }
        reply
    });
    let conn = connect(&config);

    let mut fields = HashMap::new();
    fields.insert(b("present"), None);
    fields.insert(b("absent"), Some(b("stale")));
    fields.insert(b("other"), None);
    conn.hmget(&b("h"), &mut fields).unwrap();

    assert_eq!(fields.len(), 3);
    assert_eq!(fields[&b("present")], Some(b("yes")));
    assert_eq!(fields[&b("absent")], None);
    assert_eq!(fields[&b("other")], None);

    let args = next(&rx);
    assert_eq!(&args[..2], &["HMGET".to_string(), "h".to_string()]);
    assert_eq!(args.len(), 5);
}

#[test]
fn test_hgetall_pairs() {
    let (config, _rx) = spawn_server(1, |_| {
        b"*4\r\n$1\r\na\r\n$1\r\n1\r\n$1\r\nb\r\n$1\r\n2\r\n".to_vec()
    });
    let conn = connect(&config);

    let all = conn.hgetall(&b("h")).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[&b("a")], b("1"));
    assert_eq!(all[&b("b")], b("2"));
}

#[test]
fn test_zset_replies() {
    let (config, rx) = spawn_server(4, |args| match args[0].as_slice() {
        b"ZADD" => b":1\r\n".to_vec(),
        b"ZRANGE" => b"*4\r\n$1\r\na\r\n$3\r\n1.5\r\n$1\r\nb\r\n$3\r\ninf\r\n".to_vec(),
        b"ZINCRBY" => b"$2\r\n-2\r\n".to_vec(),
        _ => b"$-1\r\n".to_vec(),
    });
    let conn = connect(&config);

    assert_eq!(conn.zadd(&b("z"), &[(b("a"), 1.5)]).unwrap(), 1);
    assert_eq!(next(&rx), vec!["ZADD", "z", "1.5", "a"]);

    let scored = conn.zrange_withscores(&b("z"), 0, -1).unwrap();
    assert_eq!(scored, vec![(b("a"), 1.5), (b("b"), f64::INFINITY)]);
    assert_eq!(next(&rx), vec!["ZRANGE", "z", "0", "-1", "WITHSCORES"]);

    assert_eq!(conn.zincrby(&b("z"), -3.5, &b("a")).unwrap(), -2.0);
    assert_eq!(next(&rx), vec!["ZINCRBY", "z", "-3.5", "a"]);

    assert_eq!(conn.zrank(&b("z"), &b("nobody")).unwrap(), None);
    assert_eq!(next(&rx), vec!["ZRANK", "z", "nobody"]);
}

// =============================================================================
// Broken Session Tests
// =============================================================================

#[test]
fn test_timed_out_reply_is_never_handed_to_the_next_call() {
    let (config, rx) = spawn_server(2, |args| {
        if args[1].as_slice() == b"a" {
            thread::sleep(Duration::from_millis(400));
            b"$1\r\nA\r\n".to_vec()
        } else {
            b"$1\r\nB\r\n".to_vec()
        }
    });
    let config = Config::builder()
        .host("127.0.0.1")
        .port(config.port)
        .read_timeout_ms(150)
        .build();
    let conn = connect(&config);

    assert!(matches!(conn.get(&b("a")), Err(KvError::Io(_))));
    assert_eq!(next(&rx), vec!["GET", "a"]);

    // Let the late reply land in the socket
    thread::sleep(Duration::from_millis(400));
    assert!(matches!(conn.get(&b("b")), Err(KvError::Connection(_))));
    assert!(matches!(conn.ping(), Err(KvError::Connection(_))));
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn test_malformed_reply_closes_the_session() {
    let (config, rx) = spawn_server(2, |args| match args[0].as_slice() {
        // Array header promises two items, the second is not a valid frame
        b"LRANGE" => b"*2\r\n$1\r\na\r\n?oops\r\n".to_vec(),
        _ => b"+PONG\r\n".to_vec(),
    });
    let conn = connect(&config);

    assert!(matches!(conn.lrange(&b("l"), 0, -1), Err(KvError::Protocol(_))));
    assert_eq!(next(&rx), vec!["LRANGE", "l", "0", "-1"]);

    assert!(matches!(conn.ping(), Err(KvError::Connection(_))));
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn test_server_error_keeps_the_session() {
    let (config, _rx) = spawn_server(2, |args| match args[0].as_slice() {
        b"INCRBY" => b"-ERR value is not an integer or out of range\r\n".to_vec(),
        _ => b"+PONG\r\n".to_vec(),
    });
    let conn = connect(&config);

    assert!(matches!(conn.incrby(&b("k"), 1), Err(KvError::Server(_))));
    conn.ping().unwrap();
}

// =============================================================================
// Empty Batch Tests
// =============================================================================

#[test]
fn test_empty_batches_skip_the_wire() {
    let (config, rx) = spawn_server(2, |args| match args[0].as_slice() {
        b"LLEN" => b":4\r\n".to_vec(),
        _ => b"+PONG\r\n".to_vec(),
    });
    let conn = connect(&config);

    assert_eq!(conn.del_many(&[]).unwrap(), 0);
    assert_eq!(conn.sadd(&b("s"), &[]).unwrap(), 0);
    assert_eq!(conn.srem(&b("s"), &[]).unwrap(), 0);
    assert_eq!(conn.hdel_many(&b("h"), &[]).unwrap(), 0);
    assert_eq!(conn.hset_many(&b("h"), &[]).unwrap(), 0);
    assert_eq!(conn.zadd(&b("z"), &[]).unwrap(), 0);
    assert_eq!(conn.zrem(&b("z"), &[]).unwrap(), 0);
    assert!(conn.mget(&[]).unwrap().is_empty());
    assert!(conn.sinter(&[]).unwrap().is_empty());
    assert!(conn.sunion(&[]).unwrap().is_empty());

    let mut fields = HashMap::new();
    conn.hmget(&b("h"), &mut fields).unwrap();

    // Pushing nothing still reports the current length
    assert_eq!(conn.rpush_many(&b("l"), &[]).unwrap(), 4);
    assert_eq!(next(&rx), vec!["LLEN", "l"]);

    conn.ping().unwrap();
    assert_eq!(next(&rx), vec!["PING"]);
}

// =============================================================================
// Template Over RESP Tests
// =============================================================================

#[test]
fn test_template_over_resp() {
    let (config, rx) = spawn_server(2, |args| match args[0].as_slice() {
        b"SADD" => b":3\r\n".to_vec(),
        _ => b"*2\r\n$1\r\na\r\n$1\r\nb\r\n".to_vec(),
    });
    let template = StringTemplate::strings(Arc::new(connect(&config)));

    let added = template
        .ops_for_set()
        .sadd(&"s".to_string(), &["a".to_string(), "b".to_string()])
        .unwrap();
    assert_eq!(added, 3);
    assert_eq!(next(&rx), vec!["SADD", "s", "a", "b"]);

    let list = template.ops_for_list().lrange(&"l".to_string(), 0, -1).unwrap();
    assert_eq!(list, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(next(&rx), vec!["LRANGE", "l", "0", "-1"]);
}

//! KeyOperations tests

use std::thread;
use std::time::Duration;

use typedkv::ops::{DefaultKeyOperations, KeyOperations};
use typedkv::{ByteBuffer, RawConnection};

use crate::{k, keys, store};

#[test]
fn test_exists_and_delete() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    assert!(ops.exists(&k("a")).unwrap());
    assert_eq!(ops.delete(&k("a")).unwrap(), 1);
    assert_eq!(ops.delete(&k("a")).unwrap(), 0);
    assert!(!ops.exists(&k("a")).unwrap());
}

#[test]
fn test_delete_many_counts_existing() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    raw.set(&ByteBuffer::from("b"), &ByteBuffer::from("1")).unwrap();
    assert_eq!(ops.delete_many(&[k("a"), k("b"), k("c")]).unwrap(), 2);
    assert_eq!(ops.delete_many(&[]).unwrap(), 0);
}

#[test]
fn test_expire_whole_seconds() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    assert!(ops.expire(&k("a"), Duration::from_secs(5)).unwrap());

    let ttl = ops.ttl(&k("a")).unwrap();
    assert!(ttl > 0 && ttl <= 5, "ttl was {}", ttl);
}

#[test]
fn test_expire_keeps_sub_second_precision() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    assert!(ops.expire(&k("a"), Duration::from_millis(5900)).unwrap());

    let pttl = ops.pttl(&k("a")).unwrap();
    assert!(pttl > 5000 && pttl <= 5900, "pttl was {}", pttl);
}

#[test]
fn test_expire_under_a_second_keeps_key() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    assert!(ops.expire(&k("a"), Duration::from_millis(500)).unwrap());

    assert!(ops.exists(&k("a")).unwrap());
    assert!(ops.ttl(&k("a")).unwrap() > 0);
    let pttl = ops.pttl(&k("a")).unwrap();
    assert!(pttl > 0 && pttl <= 500, "pttl was {}", pttl);
}

#[test]
fn test_pexpire_under_a_millisecond_keeps_key() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    assert!(ops.pexpire(&k("a"), Duration::from_micros(500)).unwrap());

    // Rounded up to 1ms rather than sent as a deleting zero
    let pttl = ops.pttl(&k("a")).unwrap();
    assert!(pttl == -2 || (0..=1).contains(&pttl), "pttl was {}", pttl);
}

#[test]
fn test_pttl_never_increases() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    assert!(ops.expire(&k("a"), Duration::from_secs(10)).unwrap());

    let first = ops.pttl(&k("a")).unwrap();
    thread::sleep(Duration::from_millis(20));
    let second = ops.pttl(&k("a")).unwrap();
    assert!(second > 0 && second <= first, "{} then {}", first, second);
    assert!(first - second >= 15, "{} then {}", first, second);

    let ttl = ops.ttl(&k("a")).unwrap();
    assert!(ttl > 0 && ttl <= 10, "ttl was {}", ttl);
}

#[test]
fn test_pexpire_and_pttl() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    assert!(ops.pexpire(&k("a"), Duration::from_millis(1500)).unwrap());

    let pttl = ops.pttl(&k("a")).unwrap();
    assert!(pttl > 0 && pttl <= 1500, "pttl was {}", pttl);
}

#[test]
fn test_sentinels_pass_through() {
    let (conn, raw) = store();
    let ops = DefaultKeyOperations::new(conn, keys());

    assert_eq!(ops.ttl(&k("missing")).unwrap(), -2);
    raw.set(&ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    assert_eq!(ops.ttl(&k("a")).unwrap(), -1);
    assert!(!ops.expire(&k("missing"), Duration::from_secs(5)).unwrap());
}

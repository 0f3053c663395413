//! HashOperations tests

use std::collections::HashMap;

use typedkv::ops::{DefaultHashOperations, HashOperations};
use typedkv::serializer::text;
use typedkv::{ByteBuffer, KvError, RawConnection};

use crate::{k, keys, store};

#[test]
fn test_field_and_value_serializers_are_independent() {
    let (conn, raw) = store();
    let ops = DefaultHashOperations::new(conn, keys(), text::<u32>(), text::<f64>());

    assert!(ops.hset(&k("prices"), &7, &2.5).unwrap());
    assert_eq!(
        raw.hget(&ByteBuffer::from("prices"), &ByteBuffer::from("7")).unwrap(),
        Some(ByteBuffer::from("2.5"))
    );
    assert_eq!(ops.hget(&k("prices"), &7).unwrap(), Some(2.5));
}

#[test]
fn test_hset_reports_creation() {
    let (conn, _raw) = store();
    let ops = DefaultHashOperations::new(conn, keys(), keys(), text::<i64>());

    assert!(ops.hset(&k("h"), &k("f"), &1).unwrap());
    assert!(!ops.hset(&k("h"), &k("f"), &2).unwrap());
    assert_eq!(ops.hget(&k("h"), &k("f")).unwrap(), Some(2));
}

#[test]
fn test_hset_all_and_hgetall() {
    let (conn, _raw) = store();
    let ops = DefaultHashOperations::new(conn, keys(), keys(), text::<i64>());

    let entries: HashMap<String, i64> = [(k("a"), 1), (k("b"), 2)].into_iter().collect();
    assert_eq!(ops.hset_all(&k("h"), &entries).unwrap(), 2);
    assert_eq!(ops.hset_all(&k("h"), &HashMap::new()).unwrap(), 0);
    assert_eq!(ops.hgetall(&k("h")).unwrap(), entries);

    let mut fields = ops.hkeys(&k("h")).unwrap();
    fields.sort();
    assert_eq!(fields, vec![k("a"), k("b")]);

    let mut values = ops.hvals(&k("h")).unwrap();
    values.sort();
    assert_eq!(values, vec![1, 2]);
}

#[test]
fn test_hget_batch_keeps_requested_fields() {
    let (conn, _raw) = store();
    let ops = DefaultHashOperations::new(conn, keys(), keys(), text::<i64>());
    ops.hset(&k("h"), &k("a"), &1).unwrap();
    ops.hset(&k("h"), &k("c"), &3).unwrap();

    let mut batch: HashMap<String, Option<i64>> =
        [(k("a"), None), (k("b"), Some(99)), (k("c"), None)].into_iter().collect();
    ops.hget_batch(&k("h"), &mut batch).unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch[&k("a")], Some(1));
    assert_eq!(batch[&k("b")], None);
    assert_eq!(batch[&k("c")], Some(3));
}

#[test]
fn test_hget_batch_on_missing_key() {
    let (conn, _raw) = store();
    let ops = DefaultHashOperations::new(conn, keys(), keys(), text::<i64>());

    let mut batch: HashMap<String, Option<i64>> = [(k("a"), Some(1))].into_iter().collect();
    ops.hget_batch(&k("missing"), &mut batch).unwrap();
    assert_eq!(batch[&k("a")], None);
}

#[test]
fn test_hdel_counts() {
    let (conn, raw) = store();
    let ops = DefaultHashOperations::new(conn, keys(), keys(), text::<i64>());
    ops.hset(&k("h"), &k("a"), &1).unwrap();
    ops.hset(&k("h"), &k("b"), &2).unwrap();

    assert_eq!(ops.hdel(&k("h"), &k("zz")).unwrap(), 0);
    assert_eq!(ops.hdel_many(&k("h"), &[k("a"), k("b")]).unwrap(), 2);
    assert!(!raw.exists(&ByteBuffer::from("h")).unwrap());
}

#[test]
fn test_malformed_field_value() {
    let (conn, raw) = store();
    let ops = DefaultHashOperations::new(conn, keys(), keys(), text::<i64>());

    raw.hset(&ByteBuffer::from("h"), &ByteBuffer::from("a"), &ByteBuffer::from("x"))
        .unwrap();
    assert!(matches!(ops.hgetall(&k("h")), Err(KvError::Format(_))));
}

#[test]
fn test_hget_batch_leaves_map_untouched_on_format_error() {
    let (conn, raw) = store();
    let ops = DefaultHashOperations::new(conn, keys(), keys(), text::<i64>());

    let key = ByteBuffer::from("h");
    raw.hset(&key, &ByteBuffer::from("a"), &ByteBuffer::from("1")).unwrap();
    raw.hset(&key, &ByteBuffer::from("b"), &ByteBuffer::from("2")).unwrap();
    raw.hset(&key, &ByteBuffer::from("c"), &ByteBuffer::from("oops")).unwrap();

    let mut fields: HashMap<String, Option<i64>> =
        [(k("a"), Some(10)), (k("b"), None), (k("c"), Some(30))]
            .into_iter()
            .collect();
    let before = fields.clone();

    let err = ops.hget_batch(&k("h"), &mut fields).unwrap_err();
    assert!(matches!(err, KvError::Format(_)));
    assert_eq!(fields, before);
}

//! ZSetOperations tests

use std::collections::HashMap;

use typedkv::ops::{DefaultZSetOperations, ZSetOperations};

use crate::{k, keys, store};

fn board() -> HashMap<String, f64> {
    [(k("alice"), 30.0), (k("bob"), 10.0), (k("carol"), 20.0)]
        .into_iter()
        .collect()
}

#[test]
fn test_zadd_counts_new_members_only() {
    let (conn, _raw) = store();
    let ops = DefaultZSetOperations::new(conn, keys(), keys());

    assert_eq!(ops.zadd(&k("z"), &board()).unwrap(), 3);

    let update: HashMap<String, f64> = [(k("bob"), 50.0), (k("dave"), 5.0)].into_iter().collect();
    assert_eq!(ops.zadd(&k("z"), &update).unwrap(), 1);
    assert_eq!(ops.zscore(&k("z"), &k("bob")).unwrap(), Some(50.0));
    assert_eq!(ops.zadd(&k("z"), &HashMap::new()).unwrap(), 0);
}

#[test]
fn test_zadd_one() {
    let (conn, _raw) = store();
    let ops = DefaultZSetOperations::new(conn, keys(), keys());

    assert!(ops.zadd_one(&k("z"), &k("m"), 1.0).unwrap());
    assert!(!ops.zadd_one(&k("z"), &k("m"), 2.0).unwrap());
    assert_eq!(ops.zscore(&k("z"), &k("m")).unwrap(), Some(2.0));
}

#[test]
fn test_rank_ordering() {
    let (conn, _raw) = store();
    let ops = DefaultZSetOperations::new(conn, keys(), keys());
    ops.zadd(&k("z"), &board()).unwrap();

    assert_eq!(ops.zrange(&k("z"), 0, -1).unwrap(), vec![k("bob"), k("carol"), k("alice")]);
    assert_eq!(ops.zrevrange(&k("z"), 0, 0).unwrap(), vec![k("alice")]);
    assert_eq!(
        ops.zrange_withscores(&k("z"), 0, 1).unwrap(),
        vec![(k("bob"), 10.0), (k("carol"), 20.0)]
    );
    assert_eq!(
        ops.zrevrange_withscores(&k("z"), -1, -1).unwrap(),
        vec![(k("bob"), 10.0)]
    );
    assert_eq!(ops.zrank(&k("z"), &k("carol")).unwrap(), Some(1));
    assert_eq!(ops.zrevrank(&k("z"), &k("carol")).unwrap(), Some(1));
    assert_eq!(ops.zrank(&k("z"), &k("nobody")).unwrap(), None);
}

#[test]
fn test_range_by_score_inclusive() {
    let (conn, _raw) = store();
    let ops = DefaultZSetOperations::new(conn, keys(), keys());
    ops.zadd(&k("z"), &board()).unwrap();

    assert_eq!(ops.zrangebyscore(&k("z"), 10.0, 20.0).unwrap(), vec![k("bob"), k("carol")]);
    assert_eq!(
        ops.zrangebyscore(&k("z"), f64::NEG_INFINITY, f64::INFINITY).unwrap().len(),
        3
    );
}

#[test]
fn test_zincrby_and_zrem() {
    let (conn, _raw) = store();
    let ops = DefaultZSetOperations::new(conn, keys(), keys());
    ops.zadd(&k("z"), &board()).unwrap();

    assert_eq!(ops.zincrby(&k("z"), 25.0, &k("bob")).unwrap(), 35.0);
    assert_eq!(ops.zrevrange(&k("z"), 0, 0).unwrap(), vec![k("bob")]);
    assert_eq!(ops.zrem(&k("z"), &[k("bob"), k("nobody")]).unwrap(), 1);
    assert_eq!(ops.zscore(&k("z"), &k("bob")).unwrap(), None);
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use savingsdesk::cache::TtlCache;
use std::cell::Cell;
use std::time::Duration;

#[test]
fn loader_runs_once_while_fresh() {
    let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
    let calls = Cell::new(0);
    for _ in 0..3 {
        let v = cache
            .get_or_try_insert("k", || {
                calls.set(calls.get() + 1);
                Ok::<_, String>(7)
            })
            .unwrap();
        assert_eq!(v, 7);
    }
    assert_eq!(calls.get(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn failed_loads_are_not_cached() {
    let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
    let r = cache.get_or_try_insert("k", || Err("down".to_string()));
    assert!(r.is_err());
    assert!(cache.is_empty());
}

#[test]
fn zero_ttl_expires_immediately() {
    let cache: TtlCache<&str, u32> = TtlCache::new(Duration::ZERO);
    cache.insert("k", 1);
    assert_eq!(cache.get(&"k"), None);
    assert!(cache.is_empty());
}

#[test]
fn invalidate_and_clear() {
    let cache: TtlCache<u8, &str> = TtlCache::new(Duration::from_secs(60));
    cache.insert(1, "a");
    cache.insert(2, "b");
    cache.invalidate(&1);
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.get(&2), Some("b"));
    cache.clear();
    assert!(cache.is_empty());
}

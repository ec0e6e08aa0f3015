// Copyright 2026 gcache Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Behavior of the cache as seen by an embedding application.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
    time::Duration,
};

use anyhow::anyhow;
use gcache::prelude::*;
use parking_lot::Mutex;

/// A getter backed by a slow database that counts its loads per key.
#[derive(Clone, Default)]
struct SlowDb {
    delay: Duration,
    loads: Arc<Mutex<HashMap<String, usize>>>,
}

impl SlowDb {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    fn loads(&self, key: &str) -> usize {
        self.loads.lock().get(key).copied().unwrap_or_default()
    }

    fn total_loads(&self) -> usize {
        self.loads.lock().values().sum()
    }
}

impl Getter for SlowDb {
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        *self.loads.lock().entry(key.to_string()).or_default() += 1;
        thread::sleep(self.delay);
        match key {
            "Tom" => Ok(b"630".to_vec()),
            "Jack" => Ok(b"589".to_vec()),
            "Sam" => Ok(b"567".to_vec()),
            _ => Err(anyhow!("{key} not exist")),
        }
    }
}

/// A remote peer that can be taken offline.
#[derive(Default)]
struct FakePeer {
    delay: Duration,
    offline: AtomicBool,
    fetches: AtomicUsize,
}

impl FakePeer {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }
}

impl PeerGetter for FakePeer {
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        if self.offline.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        Ok(format!("remote:{key}").into_bytes())
    }
}

/// Picks the same peer for every key.
struct AlwaysPick(Arc<FakePeer>);

impl PeerPicker for AlwaysPick {
    fn pick_peer(&self, _: &str) -> Option<Arc<dyn PeerGetter>> {
        Some(self.0.clone())
    }
}

#[test_log::test]
fn test_get_and_hit() {
    let db = SlowDb::default();
    let cache = Cache::new(0, db.clone());

    for _ in 0..3 {
        assert_eq!(cache.get("Tom").unwrap().to_string(), "630");
        assert_eq!(cache.get("Jack").unwrap().to_string(), "589");
    }
    assert_eq!(db.loads("Tom"), 1);
    assert_eq!(db.loads("Jack"), 1);

    let metrics = cache.metrics();
    assert_eq!(metrics.gets, 6);
    assert_eq!(metrics.hits, 4);
    assert_eq!(metrics.fills, 2);
}

#[test_log::test]
fn test_getter_error_is_propagated_and_not_cached() {
    let db = SlowDb::default();
    let cache = Cache::builder(0).with_name("scores").with_getter(db.clone()).build().unwrap();

    let err = cache.get("unknown").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::External);
    assert_eq!(
        err.to_string(),
        "External error, context: { name: scores, key: unknown } => getter failed, source: unknown not exist"
    );

    // A retry is a new fill.
    assert!(cache.get("unknown").is_err());
    assert_eq!(db.loads("unknown"), 2);
    assert!(cache.is_empty());
    assert_eq!(cache.metrics().local_errors, 2);
}

#[test_log::test]
fn test_concurrent_misses_are_coalesced() {
    const CALLERS: usize = 50;

    let db = SlowDb::with_delay(Duration::from_millis(200));
    let cache = Cache::new(0, db.clone());
    let barrier = Barrier::new(CALLERS);

    let values = thread::scope(|s| {
        let handles = (0..CALLERS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache.get("Tom")
                })
            })
            .collect::<Vec<_>>();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    assert_eq!(db.loads("Tom"), 1);
    assert_eq!(values.len(), CALLERS);
    for value in values {
        assert_eq!(value.unwrap().as_slice(), b"630");
    }
    let metrics = cache.metrics();
    assert_eq!(metrics.fills, 1);
    assert_eq!(metrics.hits + metrics.misses, metrics.gets);
}

#[test_log::test]
fn test_concurrent_remote_misses_are_coalesced() {
    const CALLERS: usize = 20;

    let db = SlowDb::default();
    let cache = Cache::new(0, db.clone());
    let peer = Arc::new(FakePeer::with_delay(Duration::from_millis(200)));
    cache.register_peers(AlwaysPick(peer.clone())).unwrap();
    let barrier = Barrier::new(CALLERS);

    let values = thread::scope(|s| {
        let handles = (0..CALLERS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache.get("Jack")
                })
            })
            .collect::<Vec<_>>();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    assert_eq!(peer.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(values.len(), CALLERS);
    for value in values {
        assert_eq!(value.unwrap().to_string(), "remote:Jack");
    }
    assert_eq!(db.total_loads(), 0);
    assert!(cache.is_empty());
    assert_eq!(cache.metrics().peer_loads, 1);
}

#[test_log::test]
fn test_concurrent_errors_are_shared() {
    const CALLERS: usize = 16;

    let db = SlowDb::with_delay(Duration::from_millis(200));
    let cache = Cache::new(0, db.clone());
    let barrier = Barrier::new(CALLERS);

    let errors = thread::scope(|s| {
        let handles = (0..CALLERS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache.get("nobody")
                })
            })
            .collect::<Vec<_>>();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    // Late callers may start a second fill once the first failure has been delivered, but never one per caller.
    assert!(db.loads("nobody") < CALLERS);
    for err in errors {
        assert_eq!(err.unwrap_err().kind(), ErrorKind::External);
    }
}

#[test_log::test]
fn test_concurrent_misses_on_different_keys() {
    let db = SlowDb::with_delay(Duration::from_millis(50));
    let cache = Cache::new(0, db.clone());

    thread::scope(|s| {
        for key in ["Tom", "Jack", "Sam"] {
            for _ in 0..4 {
                let cache = &cache;
                s.spawn(move || cache.get(key).unwrap());
            }
        }
    });

    assert_eq!(db.total_loads(), 3);
    assert_eq!(cache.len(), 3);
}

#[test_log::test]
fn test_empty_key_is_rejected() {
    let db = SlowDb::default();
    let cache = Cache::new(0, db.clone());

    let err = cache.get("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(db.total_loads(), 0);
    assert!(cache.is_empty());
    assert_eq!(cache.metrics().loads, 0);
}

#[test_log::test]
fn test_eviction() {
    let evicted = Arc::new(Mutex::new(vec![]));
    let cache = {
        let evicted = evicted.clone();
        // "Tom" + "630" weighs 6 bytes, "Jack" + "589" weighs 7 bytes, any two of them fit.
        CacheBuilder::new(13)
            .with_getter(SlowDb::default())
            .with_event_listener(move |key: &String, value: &ByteView| {
                evicted.lock().push((key.clone(), value.to_string()))
            })
            .build()
            .unwrap()
    };

    cache.get("Tom").unwrap();
    cache.get("Sam").unwrap();
    cache.get("Tom").unwrap();
    assert_eq!(cache.usage(), 12);

    // Sam is the least recently used one.
    cache.get("Jack").unwrap();
    assert_eq!(*evicted.lock(), vec![("Sam".to_string(), "567".to_string())]);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.usage(), 13);
    assert_eq!(cache.metrics().evictions, 1);

    // Removal does not notify the listener.
    assert!(cache.remove("Tom"));
    assert_eq!(evicted.lock().len(), 1);
}

#[test_log::test]
fn test_register_peers_twice() {
    let cache = Cache::new(0, SlowDb::default());
    let peer = Arc::new(FakePeer::default());

    cache.register_peers(AlwaysPick(peer.clone())).unwrap();
    let err = cache.register_peers(AlwaysPick(peer)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test_log::test]
fn test_peer_failure_falls_back_to_getter() {
    let db = SlowDb::default();
    let cache = Cache::new(0, db.clone());
    let peer = Arc::new(FakePeer::default());
    peer.offline.store(true, Ordering::SeqCst);
    cache.register_peers(AlwaysPick(peer.clone())).unwrap();

    assert_eq!(cache.get("Tom").unwrap().to_string(), "630");
    assert_eq!(peer.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(db.loads("Tom"), 1);

    let metrics = cache.metrics();
    assert_eq!(metrics.peer_errors, 1);
    assert_eq!(metrics.local_loads, 1);

    // The locally loaded value is cached.
    assert_eq!(cache.get("Tom").unwrap().to_string(), "630");
    assert_eq!(peer.fetches.load(Ordering::SeqCst), 1);
}

#[test_log::test]
fn test_peer_value_is_not_cached_locally() {
    let db = SlowDb::default();
    let cache = Cache::new(0, db.clone());
    let peer = Arc::new(FakePeer::default());
    cache.register_peers(AlwaysPick(peer.clone())).unwrap();

    assert_eq!(cache.get("Tom").unwrap().to_string(), "remote:Tom");
    assert_eq!(db.loads("Tom"), 0);
    assert!(cache.is_empty());

    // The peer goes away, the next get asks it again and then falls back.
    peer.offline.store(true, Ordering::SeqCst);
    assert_eq!(cache.get("Tom").unwrap().to_string(), "630");
    assert_eq!(peer.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(db.loads("Tom"), 1);
    assert_eq!(cache.metrics().peer_loads, 1);
}

#[test_log::test]
fn test_picker_without_peer_loads_locally() {
    let db = SlowDb::default();
    let peer = Arc::new(FakePeer::default());
    let remote = peer.clone();
    let cache = CacheBuilder::new(0)
        .with_getter(db.clone())
        .with_peers(move |key: &str| -> Option<Arc<dyn PeerGetter>> {
            // This node owns the keys starting with 'T'.
            if key.starts_with('T') {
                None
            } else {
                Some(remote.clone())
            }
        })
        .build()
        .unwrap();

    assert_eq!(cache.get("Tom").unwrap().to_string(), "630");
    assert_eq!(cache.get("Jack").unwrap().to_string(), "remote:Jack");
    assert_eq!(peer.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(db.loads("Tom"), 1);
    assert_eq!(db.loads("Jack"), 0);
}

#[test_log::test]
fn test_clones_share_state() {
    let db = SlowDb::default();
    let cache = Cache::new(0, db.clone());
    let other = cache.clone();

    cache.get("Sam").unwrap();
    assert_eq!(other.get("Sam").unwrap().to_string(), "567");
    assert_eq!(db.loads("Sam"), 1);
}

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

use std::{
    hash::Hash,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use equivalent::Equivalent;
use gcache_common::error::{Error, ErrorKind, Result};
use hashbrown::HashMap;
use parking_lot::{Condvar, Mutex};

type InflightMap<K, T> = Mutex<HashMap<K, Arc<Record<T>>>>;

/// Deduplicates concurrent fills of the same key.
///
/// The first caller of [`InflightGroup::run`] for a key becomes the leader and executes the fill function. Callers
/// that arrive for the same key before the leader completes join its record and block until the leader publishes
/// its result, value or error. Once the leader completes, the key is forgotten and the next caller starts a fresh
/// fill.
///
/// The map lock only guards the registration, fills of different keys never wait for each other.
pub struct InflightGroup<K, T> {
    inflights: InflightMap<K, T>,
}

impl<K, T> Default for InflightGroup<K, T> {
    fn default() -> Self {
        Self {
            inflights: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, T> std::fmt::Debug for InflightGroup<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflightGroup")
            .field("inflights", &self.inflights.lock().len())
            .finish()
    }
}

impl<K, T> InflightGroup<K, T>
where
    K: Hash + Eq + Clone,
    T: Clone,
{
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` for `key`, unless a fill for the same key is already in flight, in which case wait for its result.
    ///
    /// Every caller that overlaps with the leader receives the leader's result unmodified. If the leader panics, the
    /// waiters receive an [`ErrorKind::ChannelClosed`] error and the panic keeps unwinding in the leader.
    ///
    /// Waiting parks the calling thread. Inside an async runtime the wait occupies the worker thread of the task
    /// until the leader completes.
    pub fn run<Q, F>(&self, key: &Q, f: F) -> Result<T>
    where
        Q: Hash + Equivalent<K> + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> Result<T>,
    {
        let (record, leader) = {
            let mut inflights = self.inflights.lock();
            match inflights.get(key) {
                Some(record) => {
                    record.waiters.fetch_add(1, Ordering::Relaxed);
                    (record.clone(), false)
                }
                None => {
                    let record = Arc::new(Record::default());
                    inflights.insert(key.to_owned(), record.clone());
                    (record, true)
                }
            }
        };

        if !leader {
            tracing::debug!("[inflight]: wait for the inflight fill");
            return record.wait();
        }

        let leader = Leader {
            inflights: &self.inflights,
            key: Some(key.to_owned()),
            record,
        };
        let res = f();
        leader.complete(&res);
        res
    }

    /// Count of keys with a fill in flight.
    pub fn inflight(&self) -> usize {
        self.inflights.lock().len()
    }
}

/// Completion signal of one fill, shared by the leader and its waiters.
///
/// `None` until the leader publishes. An abandoned fill publishes a [`ErrorKind::ChannelClosed`] error.
struct Record<T> {
    result: Mutex<Option<Result<T>>>,
    completed: Condvar,
    waiters: AtomicUsize,
}

impl<T> Default for Record<T> {
    fn default() -> Self {
        Self {
            result: Mutex::new(None),
            completed: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }
}

impl<T> Record<T>
where
    T: Clone,
{
    fn publish(&self, res: Result<T>) {
        *self.result.lock() = Some(res);
        self.completed.notify_all();
    }

    fn wait(&self) -> Result<T> {
        let mut result = self.result.lock();
        loop {
            if let Some(res) = result.as_ref() {
                return res.clone();
            }
            self.completed.wait(&mut result);
        }
    }
}

/// Owns the inflight record of a key while the leader fills it.
///
/// Dropping the leader without completing it (the fill panicked) forgets the record and wakes every waiter with a
/// [`ErrorKind::ChannelClosed`] error.
struct Leader<'a, K, T>
where
    K: Hash + Eq,
{
    inflights: &'a InflightMap<K, T>,
    key: Option<K>,
    record: Arc<Record<T>>,
}

impl<K, T> Leader<'_, K, T>
where
    K: Hash + Eq,
{
    /// Forget the record, so callers arriving from now on start a fresh fill.
    fn forget(&mut self) -> bool {
        match self.key.take() {
            Some(key) => {
                self.inflights.lock().remove(&key);
                true
            }
            None => false,
        }
    }
}

impl<K, T> Leader<'_, K, T>
where
    K: Hash + Eq,
    T: Clone,
{
    fn complete(mut self, res: &Result<T>) {
        self.forget();
        tracing::debug!(
            waiters = self.record.waiters.load(Ordering::Relaxed),
            "[inflight]: notify waiters"
        );
        self.record.publish(res.clone());
    }
}

impl<K, T> Drop for Leader<'_, K, T>
where
    K: Hash + Eq,
{
    fn drop(&mut self) {
        if self.forget() {
            *self.record.result.lock() = Some(Err(Error::new(
                ErrorKind::ChannelClosed,
                "inflight fill abandoned before completion",
            )));
            self.record.completed.notify_all();
        }
    }
}

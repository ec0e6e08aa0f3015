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

use std::{fmt::Debug, hash::Hash, sync::Arc};

use equivalent::Equivalent;
use gcache_common::{
    code::{Key, Value},
    event::EvictionListener,
};
use parking_lot::Mutex;

use crate::lru::Lru;

/// A [`Lru`] guarded by a single mutex, shareable across threads.
///
/// The inner cache is built lazily on the first insertion. Until then every lookup misses.
///
/// Each operation holds the lock for its whole duration, which is O(1) plus the entries evicted by an insertion.
pub struct SharedLru<K, V>
where
    K: Key,
    V: Value,
{
    capacity: usize,
    listener: Option<Arc<dyn EvictionListener<K, V>>>,
    inner: Mutex<Option<Lru<K, V>>>,
}

impl<K, V> Debug for SharedLru<K, V>
where
    K: Key,
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLru")
            .field("capacity", &self.capacity)
            .field("inner", &*self.inner.lock())
            .finish()
    }
}

/// An unbounded wrapper.
impl<K, V> Default for SharedLru<K, V>
where
    K: Key,
    V: Value,
{
    fn default() -> Self {
        Self::new(0)
    }
}

impl<K, V> SharedLru<K, V>
where
    K: Key,
    V: Value,
{
    /// Create a wrapper whose cache will hold at most `capacity` bytes. `0` means unbounded.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            listener: None,
            inner: Mutex::new(None),
        }
    }

    /// Set the listener handed to the inner cache.
    ///
    /// The listener runs with the lock held and must not call back into this wrapper.
    pub fn with_listener(mut self, listener: Arc<dyn EvictionListener<K, V>>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Insert or replace an entry, see [`Lru::insert`].
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut inner = self.inner.lock();
        let lru = inner.get_or_insert_with(|| {
            tracing::trace!(capacity = self.capacity, "[shared lru]: build inner lru");
            let lru = Lru::new(self.capacity);
            match self.listener.clone() {
                Some(listener) => lru.with_listener(listener),
                None => lru,
            }
        });
        lru.insert(key, value)
    }

    /// Look up an entry, promote it and return a clone of its value.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
        V: Clone,
    {
        self.inner.lock().as_mut()?.get(key).cloned()
    }

    /// Remove an entry without notifying the listener, see [`Lru::remove`].
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.lock().as_mut().is_some_and(|lru| lru.remove(key))
    }

    /// Count of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().as_ref().map(Lru::len).unwrap_or_default()
    }

    /// Returns `true` if the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently charged.
    pub fn usage(&self) -> usize {
        self.inner.lock().as_ref().map(Lru::usage).unwrap_or_default()
    }

    /// Capacity in bytes, `0` means unbounded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

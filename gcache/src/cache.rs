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

use std::sync::Arc;

use gcache_common::{
    error::{Error, Result},
    metrics::{Metrics, MetricsSnapshot},
};
use gcache_memory::{ByteView, InflightGroup, SharedLru};
use parking_lot::RwLock;

use crate::{
    builder::CacheBuilder,
    getter::Getter,
    peers::{PeerGetter, PeerPicker},
};

pub(crate) struct CacheInner {
    pub(crate) name: String,
    pub(crate) getter: Arc<dyn Getter>,
    pub(crate) main: SharedLru<String, ByteView>,
    pub(crate) peers: RwLock<Option<Arc<dyn PeerPicker>>>,
    pub(crate) loader: InflightGroup<String, ByteView>,
    pub(crate) metrics: Arc<Metrics>,
}

/// A memory-bounded cache that fills misses through a getter, optionally asking remote peers first.
///
/// Concurrent misses on the same key are coalesced: only one fill runs, every caller receives its result.
///
/// Values loaded by the local getter are cached locally. Values fetched from a peer are not, the peer that owns the
/// key is responsible for caching it.
///
/// The cache is a cheap handle, clones share the same state.
#[derive(Clone)]
pub struct Cache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.inner.name)
            .field("main", &self.inner.main)
            .field("peers", &self.inner.peers.read().is_some())
            .field("loader", &self.inner.loader)
            .finish()
    }
}

impl Cache {
    /// Create a cache that holds at most `capacity` bytes (`0` means unbounded) and loads misses with `getter`.
    pub fn new(capacity: usize, getter: impl Getter) -> Self {
        CacheBuilder::new(capacity).assemble(Arc::new(getter))
    }

    /// Create a builder for a cache that holds at most `capacity` bytes.
    pub fn builder(capacity: usize) -> CacheBuilder {
        CacheBuilder::new(capacity)
    }

    pub(crate) fn from_inner(inner: CacheInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// Name of the cache, used in logs and error context.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get the value of `key`.
    ///
    /// On a local miss the value is fetched from the peer that owns the key, if any, falling back to the local getter
    /// when there is no such peer or the remote fetch fails.
    ///
    /// An empty key is rejected without touching the cache.
    ///
    /// A caller that joins a fill started by another caller blocks until the fill completes. Inside an async runtime
    /// this occupies the worker thread of the calling task for the duration of the fill.
    pub fn get(&self, key: &str) -> Result<ByteView> {
        Metrics::incr(&self.inner.metrics.gets);

        if key.is_empty() {
            return Err(Error::empty_key().with_context("name", &self.inner.name));
        }

        if let Some(value) = self.inner.main.get(key) {
            Metrics::incr(&self.inner.metrics.hits);
            tracing::trace!(name = %self.inner.name, key, "[gcache]: hit");
            return Ok(value);
        }
        Metrics::incr(&self.inner.metrics.misses);

        self.load(key)
    }

    /// Register the peer picker consulted on local misses.
    ///
    /// Peers can be registered only once, a second registration is a configuration error.
    pub fn register_peers(&self, peers: impl PeerPicker) -> Result<()> {
        let mut guard = self.inner.peers.write();
        if guard.is_some() {
            return Err(Error::config("peers registered more than once").with_context("name", &self.inner.name));
        }
        *guard = Some(Arc::new(peers));
        Ok(())
    }

    /// Drop the locally cached value of `key`, without notifying the eviction listener.
    ///
    /// Returns `true` if the key was cached.
    pub fn remove(&self, key: &str) -> bool {
        self.inner.main.remove(key)
    }

    /// Bytes charged in the local cache.
    pub fn usage(&self) -> usize {
        self.inner.main.usage()
    }

    /// Count of locally cached entries.
    pub fn len(&self) -> usize {
        self.inner.main.len()
    }

    /// Returns `true` if nothing is cached locally.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity of the local cache in bytes, `0` means unbounded.
    pub fn capacity(&self) -> usize {
        self.inner.main.capacity()
    }

    /// Snapshot of the cache counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    fn load(&self, key: &str) -> Result<ByteView> {
        Metrics::incr(&self.inner.metrics.loads);

        self.inner.loader.run(key, || {
            // Callers that missed right before a previous fill of the key populated the cache reach the loader after
            // that fill has been forgotten.
            // Already counted as a miss by `get`.
            if let Some(value) = self.inner.main.get(key) {
                tracing::trace!(name = %self.inner.name, key, "[gcache]: filled by a previous load");
                return Ok(value);
            }

            Metrics::incr(&self.inner.metrics.fills);
            tracing::debug!(name = %self.inner.name, key, "[gcache]: fill");

            let res = self.fill(key);
            tracing::debug!(name = %self.inner.name, key, ok = res.is_ok(), "[gcache]: fill done");
            res
        })
    }

    fn fill(&self, key: &str) -> Result<ByteView> {
        if let Some(peer) = self.pick_peer(key) {
            match self.get_from_peer(peer.as_ref(), key) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(name = %self.inner.name, key, error = %e, "[gcache]: peer fetch failed, falling back to local getter");
                }
            }
        }

        self.get_locally(key)
    }

    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.inner.peers.read().clone()?;
        peers.pick_peer(key)
    }

    fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        match peer.get(key) {
            Ok(bytes) => {
                Metrics::incr(&self.inner.metrics.peer_loads);
                Ok(ByteView::from(bytes))
            }
            Err(e) => {
                Metrics::incr(&self.inner.metrics.peer_errors);
                Err(Error::peer(e).with_context("key", key))
            }
        }
    }

    fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = match self.inner.getter.get(key) {
            Ok(bytes) => bytes,
            Err(e) => {
                Metrics::incr(&self.inner.metrics.local_errors);
                return Err(Error::external(e)
                    .with_context("name", &self.inner.name)
                    .with_context("key", key));
            }
        };
        Metrics::incr(&self.inner.metrics.local_loads);

        // The getter hands the bytes over, adopting them cannot alias memory the application still owns.
        let value = ByteView::from(bytes);
        self.inner.main.insert(key.to_string(), value.clone());
        Ok(value)
    }
}

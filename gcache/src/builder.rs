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
    event::EvictionListener,
    metrics::Metrics,
};
use gcache_memory::{ByteView, InflightGroup, SharedLru};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    cache::{Cache, CacheInner},
    getter::Getter,
    peers::PeerPicker,
};

/// Serializable part of the cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Name of the cache, used in logs and error context.
    ///
    /// Default: `"gcache"`.
    pub name: String,
    /// Capacity of the local cache in bytes. Each entry is charged the length of its key plus the length of its value.
    ///
    /// Default: `0`, which means unbounded.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "gcache".to_string(),
            capacity: 0,
        }
    }
}

/// Builder for [`Cache`].
pub struct CacheBuilder {
    name: String,
    capacity: usize,
    getter: Option<Arc<dyn Getter>>,
    event_listener: Option<Arc<dyn EvictionListener<String, ByteView>>>,
    peers: Option<Arc<dyn PeerPicker>>,
}

impl CacheBuilder {
    /// Create a builder for a cache that holds at most `capacity` bytes. `0` means unbounded.
    pub fn new(capacity: usize) -> Self {
        Self::from_config(CacheConfig {
            capacity,
            ..Default::default()
        })
    }

    /// Create a builder from a deserialized configuration.
    pub fn from_config(config: CacheConfig) -> Self {
        Self {
            name: config.name,
            capacity: config.capacity,
            getter: None,
            event_listener: None,
            peers: None,
        }
    }

    /// Set the name of the cache.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the getter that loads values on local misses. Required.
    pub fn with_getter(mut self, getter: impl Getter) -> Self {
        self.getter = Some(Arc::new(getter));
        self
    }

    /// Set a closure as the getter that loads values on local misses.
    ///
    /// Same as [`CacheBuilder::with_getter`], with closure signature inference.
    pub fn with_getter_fn<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.with_getter(f)
    }

    /// Set the listener notified for every entry evicted from the local cache.
    ///
    /// The listener runs while the local cache is locked and must not call back into the cache.
    pub fn with_event_listener(mut self, event_listener: impl EvictionListener<String, ByteView>) -> Self {
        self.event_listener = Some(Arc::new(event_listener));
        self
    }

    /// Register the peer picker at build time, see [`Cache::register_peers`].
    pub fn with_peers(mut self, peers: impl PeerPicker) -> Self {
        self.peers = Some(Arc::new(peers));
        self
    }

    /// Build the cache.
    ///
    /// Fails with a config error if no getter has been set.
    pub fn build(mut self) -> Result<Cache> {
        let getter = self
            .getter
            .take()
            .ok_or_else(|| Error::config("getter is required").with_context("name", &self.name))?;
        Ok(self.assemble(getter))
    }

    pub(crate) fn assemble(self, getter: Arc<dyn Getter>) -> Cache {
        let metrics = Arc::new(Metrics::default());

        let event_listener: Arc<dyn EvictionListener<String, ByteView>> = {
            let metrics = metrics.clone();
            let user = self.event_listener;
            Arc::new(move |key: &String, value: &ByteView| {
                Metrics::incr(&metrics.evictions);
                if let Some(user) = user.as_ref() {
                    user.on_evict(key, value);
                }
            })
        };

        tracing::debug!(name = %self.name, capacity = self.capacity, "[gcache]: build cache");

        Cache::from_inner(CacheInner {
            name: self.name,
            getter,
            main: SharedLru::new(self.capacity).with_listener(event_listener),
            peers: RwLock::new(self.peers),
            loader: InflightGroup::new(),
            metrics,
        })
    }
}

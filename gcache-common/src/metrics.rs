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

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters of a cache instance.
///
/// All counters are updated with relaxed ordering, a snapshot is not a consistent cut.
#[derive(Debug, Default)]
pub struct Metrics {
    /// calls to `get`, including rejected ones
    pub gets: AtomicU64,
    /// gets served from the local cache
    pub hits: AtomicU64,
    /// gets that missed the local cache
    pub misses: AtomicU64,
    /// callers that entered the loader after a miss
    pub loads: AtomicU64,
    /// fills actually executed, callers that joined an inflight fill are not counted
    pub fills: AtomicU64,
    /// successful remote fetches
    pub peer_loads: AtomicU64,
    /// failed remote fetches
    pub peer_errors: AtomicU64,
    /// successful local getter calls
    pub local_loads: AtomicU64,
    /// failed local getter calls
    pub local_errors: AtomicU64,
    /// entries evicted from the local cache
    pub evictions: AtomicU64,
}

/// A point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// See [`Metrics::gets`].
    pub gets: u64,
    /// See [`Metrics::hits`].
    pub hits: u64,
    /// See [`Metrics::misses`].
    pub misses: u64,
    /// See [`Metrics::loads`].
    pub loads: u64,
    /// See [`Metrics::fills`].
    pub fills: u64,
    /// See [`Metrics::peer_loads`].
    pub peer_loads: u64,
    /// See [`Metrics::peer_errors`].
    pub peer_errors: u64,
    /// See [`Metrics::local_loads`].
    pub local_loads: u64,
    /// See [`Metrics::local_errors`].
    pub local_errors: u64,
    /// See [`Metrics::evictions`].
    pub evictions: u64,
}

impl Metrics {
    /// Increase a counter by one.
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        MetricsSnapshot {
            gets: load(&self.gets),
            hits: load(&self.hits),
            misses: load(&self.misses),
            loads: load(&self.loads),
            fills: load(&self.fills),
            peer_loads: load(&self.peer_loads),
            peer_errors: load(&self.peer_errors),
            local_loads: load(&self.local_loads),
            local_errors: load(&self.local_errors),
            evictions: load(&self.evictions),
        }
    }
}

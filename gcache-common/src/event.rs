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

use crate::code::{Key, Value};

/// Trait for the customized eviction listener.
///
/// Closures of type `Fn(&K, &V)` implement the trait as well.
pub trait EvictionListener<K, V>: Send + Sync + 'static
where
    K: Key,
    V: Value,
{
    /// Called when an entry is evicted to make room for others.
    ///
    /// The entry has already been unlinked from the cache and its weight released when the listener is called.
    ///
    /// The listener is called while the cache is borrowed mutably. If the cache is shared, the lock that guards it is
    /// still held, so the listener must not call back into the same cache.
    fn on_evict(&self, key: &K, value: &V);
}

impl<K, V, F> EvictionListener<K, V> for F
where
    K: Key,
    V: Value,
    F: Fn(&K, &V) + Send + Sync + 'static,
{
    fn on_evict(&self, key: &K, value: &V) {
        self(key, value)
    }
}

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

/// Fetches the value of a key from the remote peer that owns it.
///
/// Transport, serialization, timeouts and retries are up to the implementation.
pub trait PeerGetter: Send + Sync + 'static {
    /// Fetch the value of `key` from the peer.
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> PeerGetter for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}

/// Decides which remote peer owns a key.
pub trait PeerPicker: Send + Sync + 'static {
    /// Pick the peer that owns `key`.
    ///
    /// Returns `None` if the key should be loaded locally, e.g. when the current node owns it.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

impl<F> PeerPicker for F
where
    F: Fn(&str) -> Option<Arc<dyn PeerGetter>> + Send + Sync + 'static,
{
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        self(key)
    }
}

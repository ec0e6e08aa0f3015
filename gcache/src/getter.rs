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

/// Loads the value of a key on a local cache miss.
///
/// Implemented by the embedding application. Closures of type `Fn(&str) -> anyhow::Result<Vec<u8>>` implement the
/// trait as well, see also [`CacheBuilder::with_getter_fn`](crate::CacheBuilder::with_getter_fn).
pub trait Getter: Send + Sync + 'static {
    /// Produce the value of `key`.
    ///
    /// The returned bytes are owned by the cache afterwards.
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> Getter for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}

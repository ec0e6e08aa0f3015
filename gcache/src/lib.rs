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

//! gcache: a memory-bounded cache with request coalescing and an optional peer lookup.
//!
//! On a miss, [`Cache::get`] asks the registered [`PeerPicker`] for the peer that owns the key and fetches the value
//! from it, falling back to the local [`Getter`]. Concurrent misses on the same key share a single fill.
//!
//! ```rust
//! use gcache::prelude::*;
//!
//! let cache = CacheBuilder::new(64 << 20)
//!     .with_name("scores")
//!     .with_getter_fn(|key| match key {
//!         "Tom" => Ok(b"630".to_vec()),
//!         _ => Err(anyhow::anyhow!("{key} not exist")),
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(cache.get("Tom").unwrap().to_string(), "630");
//! assert!(cache.get("Jack").is_err());
//! ```

mod builder;
mod cache;
mod getter;
mod peers;

/// Re-exported building blocks.
pub mod common {
    pub use gcache_common::*;
}

/// Re-exported in-memory components.
pub mod memory {
    pub use gcache_memory::*;
}

/// Commonly used types.
pub mod prelude;

pub use crate::{
    builder::{CacheBuilder, CacheConfig},
    cache::Cache,
    getter::Getter,
    peers::{PeerGetter, PeerPicker},
};

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

//! In-memory building blocks of gcache: the immutable byte view, the weighted LRU, its locked wrapper and the
//! request-coalescing loader.

mod inflight;
mod lru;
mod shared;
mod view;

pub use crate::{
    inflight::InflightGroup,
    lru::{Iter, Lru},
    shared::SharedLru,
    view::ByteView,
};

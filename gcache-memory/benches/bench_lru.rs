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

//! Micro benchmark of the weighted LRU and its locked wrapper.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gcache_memory::{ByteView, Lru, SharedLru};
use rand::{rngs::SmallRng, Rng, SeedableRng};

const KEYS: usize = 10_000;
const VALUE_SIZE: usize = 64;
// Roughly half of the key space fits.
const CAPACITY: usize = KEYS / 2 * (VALUE_SIZE + 8);

fn keys() -> Vec<String> {
    (0..KEYS).map(|i| format!("key-{i:04}")).collect()
}

fn bench_lru(c: &mut Criterion) {
    let keys = keys();
    let value = ByteView::from(vec![0u8; VALUE_SIZE]);
    let mut rng = SmallRng::seed_from_u64(42);

    let mut lru = Lru::new(CAPACITY);
    c.bench_function("lru insert", |b| {
        b.iter(|| {
            let key = &keys[rng.random_range(0..KEYS)];
            lru.insert(key.clone(), value.clone());
        })
    });
    c.bench_function("lru get", |b| {
        b.iter(|| {
            let key = &keys[rng.random_range(0..KEYS)];
            black_box(lru.get(key.as_str()).is_some());
        })
    });

    let shared = SharedLru::new(CAPACITY);
    c.bench_function("shared lru insert + get", |b| {
        b.iter(|| {
            let key = &keys[rng.random_range(0..KEYS)];
            if shared.get(key.as_str()).is_none() {
                shared.insert(key.clone(), value.clone());
            }
        })
    });
}

criterion_group!(benches, bench_lru);
criterion_main!(benches);

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

use std::{fmt::Debug, hash::Hash};

use bytes::Bytes;

/// Key of a cache entry.
///
/// The weight of a key is charged to the cache capacity together with the weight of its value.
pub trait Key: Send + Sync + 'static + Hash + Eq + Clone + Debug {
    /// Bytes charged for holding the key.
    fn weight(&self) -> usize;
}

/// Value of a cache entry.
///
/// The cache is agnostic to the payload shape, it only needs to know how many bytes to charge.
pub trait Value: Send + Sync + 'static {
    /// Bytes charged for holding the value.
    fn weight(&self) -> usize;
}

impl Key for String {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Key for Vec<u8> {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Key for Bytes {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Value for String {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Value for Vec<u8> {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Value for Bytes {
    fn weight(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_is_byte_length() {
        assert_eq!(Key::weight(&"hello".to_string()), 5);
        assert_eq!(Value::weight(&vec![0u8; 16]), 16);
        assert_eq!(Value::weight(&Bytes::from_static(b"abc")), 3);
        assert_eq!(Key::weight(&String::new()), 0);
    }
}

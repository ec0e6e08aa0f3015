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

use std::{borrow::Cow, fmt::Display, ops::RangeBounds};

use bytes::Bytes;
use gcache_common::code::Value;

/// A read-only view over a cached payload.
///
/// Cloning a view is cheap and never copies the payload. No operation exposes the payload mutably, so a view handed
/// to a caller can never corrupt the entry that stays in the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Create a view over a private copy of the given bytes. Later changes to `data` are not visible through the view.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Length of the payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the payload.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy the payload into an independent vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Decode the payload as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// A view over a sub range of the payload, sharing the same memory.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        Self {
            bytes: self.bytes.slice(range),
        }
    }
}

/// Adopt the vector as the payload without copying it.
impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self { bytes: data.into() }
    }
}

impl From<Bytes> for ByteView {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Display for ByteView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

impl Value for ByteView {
    fn weight(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_does_not_alias() {
        let mut source = b"630".to_vec();
        let view = ByteView::copy_from_slice(&source);

        source[0] = b'9';

        assert_eq!(view.as_slice(), b"630");
        assert_eq!(view.to_string(), "630");
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_to_vec_is_independent() {
        let view = ByteView::from(b"hello".to_vec());

        let mut copied = view.to_vec();
        copied.clear();

        assert_eq!(view.as_ref(), b"hello");
        assert_eq!(view.weight(), 5);
    }

    #[test]
    fn test_slice_and_lossy() {
        let view = ByteView::from(Bytes::from_static(b"gcache\xff"));

        assert_eq!(view.slice(..6).to_string_lossy(), "gcache");
        assert_eq!(view.to_string_lossy(), "gcache\u{fffd}");
        assert!(ByteView::default().is_empty());
    }
}

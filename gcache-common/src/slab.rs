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

use std::num::NonZeroUsize;

/// Stable handle of a value inside a [`Slab`].
///
/// The token stays valid until the value is removed. A removed slot may be reused, so a stale token may address a
/// different value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(NonZeroUsize);

impl Token {
    const MASK: usize = 1 << (usize::BITS - 1);

    fn new(index: usize) -> Self {
        debug_assert_eq!(index & Self::MASK, 0);
        // The mask bit is always set, so the value is never zero.
        Self(NonZeroUsize::MIN.saturating_add((index | Self::MASK) - 1))
    }

    /// Index of the slot addressed by the token.
    pub fn index(&self) -> usize {
        self.0.get() & !Self::MASK
    }
}

/// An arena that stores values in a vector and recycles vacant slots through a free list.
///
/// `Option<Token>` has the same size as `Token`, which keeps intrusive links compact.
#[derive(Debug)]
pub struct Slab<T> {
    entries: Vec<Entry<T>>,
    len: usize,
    next: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slab<T> {
    /// Create an empty slab.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: 0,
            len: 0,
        }
    }

    /// Create an empty slab with preallocated slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next: 0,
            len: 0,
        }
    }

    /// Insert a value and return its token.
    pub fn insert(&mut self, val: T) -> Token {
        let index = self.next;
        self.insert_at(index, val);
        Token::new(index)
    }

    /// Remove the value addressed by the token, if any.
    pub fn remove(&mut self, token: Token) -> Option<T> {
        self.remove_at(token.index())
    }

    /// Get the value addressed by the token.
    pub fn get(&self, token: Token) -> Option<&T> {
        match self.entries.get(token.index()) {
            Some(Entry::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    /// Get the value addressed by the token mutably.
    pub fn get_mut(&mut self, token: Token) -> Option<&mut T> {
        match self.entries.get_mut(token.index()) {
            Some(Entry::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    /// Count of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all values and release the slots.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
        self.next = 0;
    }

    fn insert_at(&mut self, index: usize, val: T) {
        self.len += 1;

        if index == self.entries.len() {
            self.entries.push(Entry::Occupied(val));
            self.next = index + 1;
        } else {
            self.next = match self.entries.get(index) {
                Some(&Entry::Vacant(next)) => next,
                _ => unreachable!("free list points to an occupied slot"),
            };
            self.entries[index] = Entry::Occupied(val);
        }
    }

    fn remove_at(&mut self, index: usize) -> Option<T> {
        let entry = self.entries.get_mut(index)?;

        if matches!(entry, Entry::Vacant(_)) {
            return None;
        }

        match std::mem::replace(entry, Entry::Vacant(self.next)) {
            Entry::Vacant(_) => unreachable!(),
            Entry::Occupied(val) => {
                self.len -= 1;
                self.next = index;
                Some(val)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Vacant(usize),
    Occupied(T),
}

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

use std::{fmt::Debug, hash::Hash, sync::Arc};

use equivalent::Equivalent;
use gcache_common::{
    code::{Key, Value},
    event::EvictionListener,
    slab::{Slab, Token},
    strict_assert, strict_assert_eq,
};
use hashbrown::HashMap;

struct Node<K, V> {
    key: K,
    value: V,
    /// key weight + value weight, charged when the node was linked
    weight: usize,

    prev: Option<Token>,
    next: Option<Token>,
}

/// A weighted LRU cache.
///
/// Entries are kept in a doubly-linked list threaded through a [`Slab`], from the most recently used (head) to the
/// least recently used (tail), and indexed by key for O(1) lookup, promotion and eviction.
///
/// Each entry is charged `key.weight() + value.weight()`. After every insertion, entries are evicted from the tail
/// until the usage fits the capacity again. A capacity of `0` means unbounded.
///
/// The cache is not thread-safe, see [`SharedLru`](crate::SharedLru) for a locked wrapper.
pub struct Lru<K, V>
where
    K: Key,
    V: Value,
{
    nodes: Slab<Node<K, V>>,
    index: HashMap<K, Token>,

    head: Option<Token>,
    tail: Option<Token>,

    capacity: usize,
    usage: usize,

    listener: Option<Arc<dyn EvictionListener<K, V>>>,
}

impl<K, V> Debug for Lru<K, V>
where
    K: Key,
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lru")
            .field("len", &self.len())
            .field("usage", &self.usage)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<K, V> Lru<K, V>
where
    K: Key,
    V: Value,
{
    /// Create an empty cache that holds at most `capacity` bytes. `0` means unbounded.
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Slab::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            capacity,
            usage: 0,
            listener: None,
        }
    }

    /// Set the listener that is notified for every evicted entry.
    pub fn with_listener(mut self, listener: Arc<dyn EvictionListener<K, V>>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Insert or replace an entry and mark it as the most recently used one.
    ///
    /// Returns the replaced value, if any. Entries may be evicted afterwards to respect the capacity, including the
    /// inserted one if it alone outweighs the capacity.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let weight = key.weight() + value.weight();

        let old = match self.index.get(&key).copied() {
            Some(token) => {
                self.promote(token);
                let node = self.node_mut(token);
                let old_weight = std::mem::replace(&mut node.weight, weight);
                let old = std::mem::replace(&mut node.value, value);
                self.usage = self.usage - old_weight + weight;
                Some(old)
            }
            None => {
                let token = self.nodes.insert(Node {
                    key: key.clone(),
                    value,
                    weight,
                    prev: None,
                    next: None,
                });
                self.index.insert(key, token);
                self.push_front(token);
                self.usage += weight;
                None
            }
        };

        while self.capacity != 0 && self.usage > self.capacity {
            if self.pop_lru().is_none() {
                break;
            }
        }

        strict_assert!(self.capacity == 0 || self.usage <= self.capacity);
        strict_assert_eq!(self.nodes.len(), self.index.len());

        old
    }

    /// Look up an entry and mark it as the most recently used one.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let token = *self.index.get(key)?;
        self.promote(token);
        Some(&self.node(token).value)
    }

    /// Look up an entry without touching the recency order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let token = *self.index.get(key)?;
        Some(&self.node(token).value)
    }

    /// Evict the least recently used entry.
    ///
    /// The listener, if any, is called after the entry has been unlinked and its weight released.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let token = self.tail?;
        self.unlink(token);

        let node = self.take(token);
        self.index.remove(&node.key);
        self.usage -= node.weight;

        if let Some(listener) = self.listener.as_ref() {
            listener.on_evict(&node.key, &node.value);
        }

        Some((node.key, node.value))
    }

    /// Remove an entry without notifying the listener.
    ///
    /// Returns `true` if the entry existed.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let Some(token) = self.index.remove(key) else {
            return false;
        };
        self.unlink(token);
        let node = self.take(token);
        self.usage -= node.weight;
        true
    }

    /// Drop all entries without notifying the listener.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.usage = 0;
    }

    /// Count of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently charged.
    pub fn usage(&self) -> usize {
        self.usage
    }

    /// Capacity in bytes, `0` means unbounded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate entries from the most recently used to the least recently used one.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            lru: self,
            cursor: self.head,
        }
    }

    fn node(&self, token: Token) -> &Node<K, V> {
        match self.nodes.get(token) {
            Some(node) => node,
            None => unreachable!("dangling lru token: {token:?}"),
        }
    }

    fn node_mut(&mut self, token: Token) -> &mut Node<K, V> {
        match self.nodes.get_mut(token) {
            Some(node) => node,
            None => unreachable!("dangling lru token: {token:?}"),
        }
    }

    fn take(&mut self, token: Token) -> Node<K, V> {
        match self.nodes.remove(token) {
            Some(node) => node,
            None => unreachable!("dangling lru token: {token:?}"),
        }
    }

    fn promote(&mut self, token: Token) {
        if self.head == Some(token) {
            return;
        }
        self.unlink(token);
        self.push_front(token);
    }

    fn push_front(&mut self, token: Token) {
        let head = self.head;

        let node = self.node_mut(token);
        strict_assert!(node.prev.is_none() && node.next.is_none());
        node.next = head;

        match head {
            Some(head) => self.node_mut(head).prev = Some(token),
            None => self.tail = Some(token),
        }
        self.head = Some(token);
    }

    fn unlink(&mut self, token: Token) {
        let node = self.node_mut(token);
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }
}

/// Iterator over the entries of a [`Lru`], from the most recently used to the least recently used one.
pub struct Iter<'a, K, V>
where
    K: Key,
    V: Value,
{
    lru: &'a Lru<K, V>,
    cursor: Option<Token>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Key,
    V: Value,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.lru.node(self.cursor?);
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}

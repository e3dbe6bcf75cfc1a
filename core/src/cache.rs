//! Small bounded maps used on the query path.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Bounded map that evicts the oldest inserted key once full.
///
/// Lookups do not refresh an entry's position: this is insertion-order
/// eviction, not LRU.
#[derive(Debug)]
pub struct FifoCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V: Clone> FifoCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, map: HashMap::new(), order: VecDeque::new() }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).cloned()
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(slot) = self.map.get_mut(&key) {
            *slot = value;
            return;
        }
        if self.map.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
    }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// Bounded map that drops everything when an insert would overflow it.
#[derive(Debug)]
pub struct ClearingCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
}

impl<K: Eq + Hash, V: Clone> ClearingCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, map: HashMap::new() }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).cloned()
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if !self.map.contains_key(&key) && self.map.len() >= self.capacity {
            tracing::debug!(capacity = self.capacity, "cache full, clearing");
            self.map.clear();
        }
        self.map.insert(key, value);
    }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn clear(&mut self) { self.map.clear(); }
}

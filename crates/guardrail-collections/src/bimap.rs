//! Bijective map with an eagerly maintained dual index.
//!
//! Both directions are plain `BTreeMap`s kept as exact mirrors: every (k, v)
//! in the forward index has (v, k) in the backward index and nothing else.
//! Plain `insert` refuses to silently steal a value already bound to another
//! key; `force_insert` evicts the colliding pair instead.

use std::collections::BTreeMap;

use thiserror::Error;

const ERROR_VALUE_BOUND: &str = "GR-BIMAP-1101";
const ERROR_KEY_BOUND: &str = "GR-BIMAP-1102";

/// Rejected insertion that would break the bijection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BiMapError {
    #[error("value is already bound to a different key")]
    ValueAlreadyBound,
    #[error("key is already bound to a different value")]
    KeyAlreadyBound,
}

impl BiMapError {
    #[must_use]
    pub fn stable_code(&self) -> &'static str {
        match self {
            Self::ValueAlreadyBound => ERROR_VALUE_BOUND,
            Self::KeyAlreadyBound => ERROR_KEY_BOUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiMap<K, V> {
    forward: BTreeMap<K, V>,
    backward: BTreeMap<V, K>,
}

impl<K, V> BiMap<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            forward: BTreeMap::new(),
            backward: BTreeMap::new(),
        }
    }
}

impl<K, V> Default for BiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Ord + Clone> BiMap<K, V> {
    /// Binds `value` under `key`, replacing the key's previous binding.
    ///
    /// Fails with [`BiMapError::ValueAlreadyBound`] when `value` is bound to
    /// a different key; use [`force_insert`](Self::force_insert) to evict.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, BiMapError> {
        if let Some(bound) = self.backward.get(&value) {
            if *bound != key {
                return Err(BiMapError::ValueAlreadyBound);
            }
        }
        Ok(self.write_pair(key, value))
    }

    /// Binds `value` under `key`, evicting any pair that holds `value`.
    pub fn force_insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(other_key) = self.backward.get(&value).cloned() {
            if other_key != key {
                self.forward.remove(&other_key);
                self.backward.remove(&value);
            }
        }
        self.write_pair(key, value)
    }

    /// Inverse-orientation insert: binds `key` under `value`, replacing the
    /// value's previous binding. Fails when `key` is bound to a different
    /// value.
    pub fn insert_inverse(&mut self, value: V, key: K) -> Result<Option<K>, BiMapError> {
        if let Some(bound) = self.forward.get(&key) {
            if *bound != value {
                return Err(BiMapError::KeyAlreadyBound);
            }
        }
        Ok(self.write_pair_inverse(value, key))
    }

    /// Inverse-orientation force insert: evicts any pair that holds `key`.
    pub fn force_insert_inverse(&mut self, value: V, key: K) -> Option<K> {
        if let Some(other_value) = self.forward.get(&key).cloned() {
            if other_value != value {
                self.forward.remove(&key);
                self.backward.remove(&other_value);
            }
        }
        self.write_pair_inverse(value, key)
    }

    fn write_pair(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.forward.insert(key.clone(), value.clone());
        if let Some(previous_value) = &previous {
            self.backward.remove(previous_value);
        }
        self.backward.insert(value, key);
        previous
    }

    fn write_pair_inverse(&mut self, value: V, key: K) -> Option<K> {
        let previous = self.backward.insert(value.clone(), key.clone());
        if let Some(previous_key) = &previous {
            self.forward.remove(previous_key);
        }
        self.forward.insert(key, value);
        previous
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.forward.get(key)
    }

    #[must_use]
    pub fn get_by_value(&self, value: &V) -> Option<&K> {
        self.backward.get(value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.forward.remove(key)?;
        self.backward.remove(&value);
        Some(value)
    }

    pub fn remove_by_value(&mut self, value: &V) -> Option<K> {
        let key = self.backward.remove(value)?;
        self.forward.remove(&key);
        Some(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.backward.contains_key(value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pairs in key-sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.forward.keys()
    }

    /// Values in value-sorted order (backward-index iteration).
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.backward.keys()
    }

    /// Consumes the bimap, swapping orientation. O(1): the two indexes trade
    /// places.
    #[must_use]
    pub fn into_inverse(self) -> BiMap<V, K> {
        BiMap {
            forward: self.backward,
            backward: self.forward,
        }
    }
}

//! Key to value-collection map over deterministic backing storage.
//!
//! One generic [`Multimap`] replaces the list/set/sorted-set multimap family:
//! the per-key collection is abstracted behind [`ValueStore`], whose
//! implementations carry their capability as associated consts (`DISTINCT`
//! for set semantics, `SORTED` for ordered iteration). [`ListMultimap`] keeps
//! insertion order and duplicates; [`SetMultimap`] deduplicates and iterates
//! values in sorted order.
//!
//! Invariant: no key is ever mapped to an empty value store.

use std::collections::btree_set;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::ops::RangeBounds;
use std::slice;

/// Per-key value collection used by [`Multimap`].
pub trait ValueStore<V>: Default {
    /// Set semantics: inserting a value already present is a no-op.
    const DISTINCT: bool;
    /// Iteration yields values in sorted order.
    const SORTED: bool;

    type Iter<'a>: Iterator<Item = &'a V>
    where
        Self: 'a,
        V: 'a;

    /// Returns true when the store changed.
    fn insert(&mut self, value: V) -> bool;
    /// Removes one occurrence of `value`; returns true when found.
    fn remove_value(&mut self, value: &V) -> bool;
    fn contains(&self, value: &V) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn iter(&self) -> Self::Iter<'_>;
}

impl<V: PartialEq> ValueStore<V> for Vec<V> {
    const DISTINCT: bool = false;
    const SORTED: bool = false;

    type Iter<'a>
        = slice::Iter<'a, V>
    where
        Self: 'a,
        V: 'a;

    fn insert(&mut self, value: V) -> bool {
        self.push(value);
        true
    }

    fn remove_value(&mut self, value: &V) -> bool {
        match self.iter().position(|candidate| candidate == value) {
            Some(index) => {
                self.remove(index);
                true
            }
            None => false,
        }
    }

    fn contains(&self, value: &V) -> bool {
        self.iter().any(|candidate| candidate == value)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter()
    }
}

impl<V: Ord> ValueStore<V> for BTreeSet<V> {
    const DISTINCT: bool = true;
    const SORTED: bool = true;

    type Iter<'a>
        = btree_set::Iter<'a, V>
    where
        Self: 'a,
        V: 'a;

    fn insert(&mut self, value: V) -> bool {
        BTreeSet::insert(self, value)
    }

    fn remove_value(&mut self, value: &V) -> bool {
        BTreeSet::remove(self, value)
    }

    fn contains(&self, value: &V) -> bool {
        BTreeSet::contains(self, value)
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        BTreeSet::iter(self)
    }
}

/// Key to value-collection map. Keys iterate in sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multimap<K, V, S> {
    inner: BTreeMap<K, S>,
    _values: PhantomData<V>,
}

/// Multimap with list-valued entries: duplicates allowed, insertion order kept.
pub type ListMultimap<K, V> = Multimap<K, V, Vec<V>>;

/// Multimap with sorted-set-valued entries: distinct values, sorted iteration.
pub type SetMultimap<K, V> = Multimap<K, V, BTreeSet<V>>;

impl<K, V, S> Multimap<K, V, S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
            _values: PhantomData,
        }
    }
}

impl<K, V, S> Default for Multimap<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V, S: ValueStore<V>> Multimap<K, V, S> {
    /// Adds the pair. Returns false when set semantics suppressed a duplicate.
    pub fn put(&mut self, key: K, value: V) -> bool {
        self.inner.entry(key).or_default().insert(value)
    }

    /// Adds every value under `key`. Returns true when anything changed.
    pub fn put_all(&mut self, key: K, values: impl IntoIterator<Item = V>) -> bool {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return false;
        }
        let store = self.inner.entry(key).or_default();
        let mut changed = false;
        for value in values {
            changed |= store.insert(value);
        }
        changed
    }

    /// Replaces the values under `key`, returning the displaced store.
    pub fn replace_values(&mut self, key: K, values: Vec<V>) -> Option<S> {
        let displaced = self.inner.remove(&key);
        if !values.is_empty() {
            self.put_all(key, values);
        }
        displaced
    }

    /// Removes one occurrence of the pair; prunes the key when emptied.
    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        let Some(store) = self.inner.get_mut(key) else {
            return false;
        };
        let removed = store.remove_value(value);
        if store.is_empty() {
            self.inner.remove(key);
        }
        removed
    }

    /// Removes and returns every value under `key`.
    pub fn remove_all(&mut self, key: &K) -> Option<S> {
        self.inner.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&S> {
        self.inner.get(key)
    }

    /// Values under `key`, empty when absent.
    pub fn values_of(&self, key: &K) -> impl Iterator<Item = &V> {
        self.inner.get(key).into_iter().flat_map(ValueStore::iter)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    #[must_use]
    pub fn contains_entry(&self, key: &K, value: &V) -> bool {
        self.inner
            .get(key)
            .is_some_and(|store| store.contains(value))
    }

    /// Total number of (key, value) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.values().map(ValueStore::len).sum()
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    /// Every pair, keys in sorted order, values in store order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner
            .iter()
            .flat_map(|(key, store)| store.iter().map(move |value| (key, value)))
    }

    /// Grouped read view: key to value store, keys sorted.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<K, S> {
        &self.inner
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub(crate) fn stores_mut(&mut self) -> &mut BTreeMap<K, S> {
        &mut self.inner
    }

    pub(crate) fn prune_empty(&mut self) {
        self.inner.retain(|_, store| !store.is_empty());
    }
}

impl<K: Ord, V: Ord> SetMultimap<K, V> {
    /// Smallest value under `key`.
    #[must_use]
    pub fn first_value(&self, key: &K) -> Option<&V> {
        self.inner.get(key).and_then(BTreeSet::first)
    }

    /// Largest value under `key`.
    #[must_use]
    pub fn last_value(&self, key: &K) -> Option<&V> {
        self.inner.get(key).and_then(BTreeSet::last)
    }

    /// Values under `key` within `range`, ascending. Empty when the key is
    /// absent.
    pub fn values_range<R: RangeBounds<V>>(&self, key: &K, range: R) -> impl Iterator<Item = &V> {
        self.inner
            .get(key)
            .map(|store| store.range(range))
            .into_iter()
            .flatten()
    }
}

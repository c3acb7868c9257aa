//! Constraint-validated view over a `BTreeMap`.
//!
//! Every operation introducing a new (key, value) pair runs the constraint
//! first; reads and removals forward unchanged. Bulk insertion validates every
//! pair before applying any of them, so a rejected batch leaves the backing
//! map untouched. Entries handed out by [`ConstrainedMap::entries_mut`] are
//! live: writing through an [`EntryGuard`] re-validates against the entry's
//! key and then mutates the backing map in place.

use std::collections::BTreeMap;
use std::mem;

use crate::constraint::{ConstraintViolation, MapConstraint};

#[derive(Debug, Clone)]
pub struct ConstrainedMap<K, V, C> {
    inner: BTreeMap<K, V>,
    constraint: C,
}

impl<K: Ord, V, C: MapConstraint<K, V>> ConstrainedMap<K, V, C> {
    /// Wraps an existing map. Entries already present are not re-validated.
    #[must_use]
    pub fn wrap(inner: BTreeMap<K, V>, constraint: C) -> Self {
        Self { inner, constraint }
    }

    /// Wraps an existing map, eagerly validating every pre-existing entry.
    pub fn wrap_checked(
        inner: BTreeMap<K, V>,
        constraint: C,
    ) -> Result<Self, ConstraintViolation> {
        for (key, value) in &inner {
            constraint.check(key, value)?;
        }
        Ok(Self { inner, constraint })
    }

    /// Empty constrained map.
    #[must_use]
    pub fn new(constraint: C) -> Self {
        Self::wrap(BTreeMap::new(), constraint)
    }

    /// Validates the pair, then inserts. On rejection the backing map is
    /// unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, ConstraintViolation> {
        self.constraint.check(&key, &value)?;
        Ok(self.inner.insert(key, value))
    }

    /// Validates every pair before applying any of them.
    pub fn insert_all(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), ConstraintViolation> {
        let pairs: Vec<(K, V)> = pairs.into_iter().collect();
        for (key, value) in &pairs {
            self.constraint.check(key, value)?;
        }
        for (key, value) in pairs {
            self.inner.insert(key, value);
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Live guards over every entry; writes re-validate against the key.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = EntryGuard<'_, K, V, C>> {
        let constraint = &self.constraint;
        self.inner.iter_mut().map(move |(key, value)| EntryGuard {
            key,
            value,
            constraint,
        })
    }

    /// Live guard for a single entry, when present.
    pub fn entry_mut(&mut self, key: &K) -> Option<EntryGuard<'_, K, V, C>> {
        let constraint = &self.constraint;
        self.inner
            .range_mut(key..=key)
            .next()
            .map(|(key, value)| EntryGuard {
                key,
                value,
                constraint,
            })
    }

    #[must_use]
    pub fn constraint(&self) -> &C {
        &self.constraint
    }

    /// Releases the backing map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<K, V> {
        self.inner
    }
}

/// Live handle to one backing-map entry. `set_value` is the only mutator and
/// it consults the constraint before writing through.
#[derive(Debug)]
pub struct EntryGuard<'a, K, V, C> {
    key: &'a K,
    value: &'a mut V,
    constraint: &'a C,
}

impl<K, V, C: MapConstraint<K, V>> EntryGuard<'_, K, V, C> {
    #[must_use]
    pub fn key(&self) -> &K {
        self.key
    }

    #[must_use]
    pub fn value(&self) -> &V {
        self.value
    }

    /// Validates `(key, value)` and writes through, returning the displaced
    /// value.
    pub fn set_value(&mut self, value: V) -> Result<V, ConstraintViolation> {
        self.constraint.check(self.key, &value)?;
        Ok(mem::replace(self.value, value))
    }
}

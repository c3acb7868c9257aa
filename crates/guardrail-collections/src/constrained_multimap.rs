//! Constraint-validated view over a [`Multimap`].
//!
//! A single generic wrapper covers the list/set/sorted-set multimap variants;
//! the [`ValueStore`] capability consts decide duplicate handling and value
//! ordering. Per-key value views ([`ConstrainedValues`]) and grouped entry
//! views ([`AsMapEntry`]) are live and re-validate every inserted value
//! against the key they belong to. Values returned by `remove_all` and
//! `replace_values` are plain stores, no longer constrained.

use std::marker::PhantomData;

use crate::constraint::{ConstraintViolation, MapConstraint};
use crate::multimap::{Multimap, ValueStore};

#[derive(Debug, Clone)]
pub struct ConstrainedMultimap<K, V, S, C> {
    inner: Multimap<K, V, S>,
    constraint: C,
}

impl<K, V, S, C> ConstrainedMultimap<K, V, S, C>
where
    K: Ord + Clone,
    S: ValueStore<V>,
    C: MapConstraint<K, V>,
{
    /// Wraps an existing multimap. Entries already present are not
    /// re-validated.
    #[must_use]
    pub fn wrap(inner: Multimap<K, V, S>, constraint: C) -> Self {
        Self { inner, constraint }
    }

    /// Empty constrained multimap.
    #[must_use]
    pub fn new(constraint: C) -> Self {
        Self::wrap(Multimap::new(), constraint)
    }

    /// Validates the pair, then adds it. On rejection the backing multimap is
    /// unchanged.
    pub fn put(&mut self, key: K, value: V) -> Result<bool, ConstraintViolation> {
        self.constraint.check(&key, &value)?;
        Ok(self.inner.put(key, value))
    }

    /// Validates every value against `key` before applying any of them.
    pub fn put_all(&mut self, key: K, values: Vec<V>) -> Result<bool, ConstraintViolation> {
        for value in &values {
            self.constraint.check(&key, value)?;
        }
        Ok(self.inner.put_all(key, values))
    }

    /// Validates every pair before applying any of them.
    pub fn put_all_pairs(
        &mut self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<bool, ConstraintViolation> {
        let pairs: Vec<(K, V)> = pairs.into_iter().collect();
        for (key, value) in &pairs {
            self.constraint.check(key, value)?;
        }
        let mut changed = false;
        for (key, value) in pairs {
            changed |= self.inner.put(key, value);
        }
        Ok(changed)
    }

    /// Validates the incoming values, then swaps them in. Returns the
    /// displaced store, which is not constrained.
    pub fn replace_values(
        &mut self,
        key: K,
        values: Vec<V>,
    ) -> Result<Option<S>, ConstraintViolation> {
        for value in &values {
            self.constraint.check(&key, value)?;
        }
        Ok(self.inner.replace_values(key, values))
    }

    /// Removal forwards unchanged; the constraint is not consulted.
    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        self.inner.remove(key, value)
    }

    /// Removes every value under `key`. The returned store is not
    /// constrained.
    pub fn remove_all(&mut self, key: &K) -> Option<S> {
        self.inner.remove_all(key)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&S> {
        self.inner.get(key)
    }

    pub fn values_of(&self, key: &K) -> impl Iterator<Item = &V> {
        self.inner.values_of(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    #[must_use]
    pub fn contains_entry(&self, key: &K, value: &V) -> bool {
        self.inner.contains_entry(key, value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.inner.key_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.entries()
    }

    /// Live per-key value view. Inserts through the view validate against
    /// `key`; an absent key materializes only once a value is admitted.
    pub fn get_mut(&mut self, key: K) -> ConstrainedValues<'_, K, V, S, C> {
        ConstrainedValues {
            map: &mut self.inner,
            key,
            constraint: &self.constraint,
        }
    }

    /// Visits every (key, value store) entry through live guards whose
    /// mutators re-validate against the entry's key. Keys emptied during the
    /// visit are pruned afterwards.
    pub fn visit_as_map_entries<F>(&mut self, mut visit: F)
    where
        F: FnMut(AsMapEntry<'_, K, V, S, C>),
    {
        let constraint = &self.constraint;
        for (key, store) in self.inner.stores_mut() {
            visit(AsMapEntry {
                key,
                store,
                constraint,
                _values: PhantomData,
            });
        }
        self.inner.prune_empty();
    }

    #[must_use]
    pub fn constraint(&self) -> &C {
        &self.constraint
    }

    /// Releases the backing multimap.
    #[must_use]
    pub fn into_inner(self) -> Multimap<K, V, S> {
        self.inner
    }
}

/// Live view of the values under one key. Writes go straight through to the
/// backing multimap and are validated against the borrowed key.
#[derive(Debug)]
pub struct ConstrainedValues<'a, K, V, S, C> {
    map: &'a mut Multimap<K, V, S>,
    key: K,
    constraint: &'a C,
}

impl<K, V, S, C> ConstrainedValues<'_, K, V, S, C>
where
    K: Ord + Clone,
    S: ValueStore<V>,
    C: MapConstraint<K, V>,
{
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Validates `(key, value)` and inserts through to the backing multimap.
    pub fn insert(&mut self, value: V) -> Result<bool, ConstraintViolation> {
        self.constraint.check(&self.key, &value)?;
        Ok(self.map.put(self.key.clone(), value))
    }

    pub fn remove(&mut self, value: &V) -> bool {
        self.map.remove(&self.key, value)
    }

    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        self.map.contains_entry(&self.key, value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.map.values_of(&self.key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.get(&self.key).map_or(0, ValueStore::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Live guard over one (key, value store) entry of the grouped view.
#[derive(Debug)]
pub struct AsMapEntry<'a, K, V, S, C> {
    key: &'a K,
    store: &'a mut S,
    constraint: &'a C,
    _values: PhantomData<V>,
}

impl<K, V, S, C> AsMapEntry<'_, K, V, S, C>
where
    S: ValueStore<V>,
    C: MapConstraint<K, V>,
{
    #[must_use]
    pub fn key(&self) -> &K {
        self.key
    }

    /// Validates against this entry's key, then inserts into its store.
    pub fn insert(&mut self, value: V) -> Result<bool, ConstraintViolation> {
        self.constraint.check(self.key, &value)?;
        Ok(self.store.insert(value))
    }

    pub fn remove(&mut self, value: &V) -> bool {
        self.store.remove_value(value)
    }

    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        self.store.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.store.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::constraint::{FnConstraint, constraint_fn};

    type Guarded = ConstrainedMultimap<
        String,
        u32,
        BTreeSet<u32>,
        FnConstraint<fn(&String, &u32) -> Result<(), ConstraintViolation>>,
    >;

    fn value_under_hundred(_key: &String, value: &u32) -> Result<(), ConstraintViolation> {
        if *value >= 100 {
            return Err(ConstraintViolation::invalid_value("value out of range"));
        }
        Ok(())
    }

    fn guarded() -> Guarded {
        ConstrainedMultimap::new(constraint_fn(value_under_hundred as fn(&String, &u32) -> Result<(), ConstraintViolation>))
    }

    #[test]
    fn put_succeeds_iff_constraint_holds() {
        let mut multimap = guarded();
        assert!(multimap.put("k".into(), 7).unwrap());
        assert!(multimap.put("k".into(), 100).is_err());
        assert_eq!(multimap.len(), 1);
        assert!(multimap.contains_entry(&"k".into(), &7));
    }

    #[test]
    fn put_all_rejects_whole_batch() {
        let mut multimap = guarded();
        assert!(multimap.put_all("k".into(), vec![1, 100, 3]).is_err());
        assert!(multimap.is_empty());
        assert!(multimap.put_all("k".into(), vec![1, 3]).unwrap());
        assert_eq!(multimap.len(), 2);
    }

    #[test]
    fn put_all_pairs_validates_every_pair_first() {
        let mut multimap = guarded();
        multimap.put("seed".into(), 1).unwrap();
        let batch = vec![("a".to_string(), 2), ("b".to_string(), 200)];
        assert!(multimap.put_all_pairs(batch).is_err());
        assert_eq!(multimap.len(), 1);
        assert!(!multimap.contains_key(&"a".into()));
    }

    #[test]
    fn replace_values_returns_unconstrained_store() {
        let mut multimap = guarded();
        multimap.put_all("k".into(), vec![1, 2]).unwrap();
        let displaced = multimap.replace_values("k".into(), vec![9]).unwrap();
        assert_eq!(
            displaced.unwrap().into_iter().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(multimap.contains_entry(&"k".into(), &9));

        assert!(multimap.replace_values("k".into(), vec![500]).is_err());
        assert!(multimap.contains_entry(&"k".into(), &9));
    }

    #[test]
    fn value_view_revalidates_inserts() {
        let mut multimap = guarded();
        {
            let mut view = multimap.get_mut("k".to_string());
            assert!(view.insert(5).unwrap());
            assert!(view.insert(500).is_err());
            assert!(view.contains(&5));
            assert_eq!(view.len(), 1);
        }
        assert!(multimap.contains_entry(&"k".into(), &5));
        assert_eq!(multimap.len(), 1);
    }

    #[test]
    fn value_view_on_absent_key_reads_empty() {
        let mut multimap = guarded();
        {
            let view = multimap.get_mut("ghost".to_string());
            assert!(view.is_empty());
            assert_eq!(view.iter().count(), 0);
        }
        // Reading through the view must not materialize the key.
        assert!(!multimap.contains_key(&"ghost".into()));
    }

    #[test]
    fn value_view_removal_prunes_key() {
        let mut multimap = guarded();
        multimap.put("k".into(), 5).unwrap();
        {
            let mut view = multimap.get_mut("k".to_string());
            assert!(view.remove(&5));
        }
        assert!(!multimap.contains_key(&"k".into()));
    }

    #[test]
    fn as_map_entry_guard_revalidates_against_its_key() {
        let mut multimap = guarded();
        multimap.put("a".into(), 1).unwrap();
        multimap.put("b".into(), 2).unwrap();

        let mut rejected = 0;
        multimap.visit_as_map_entries(|mut entry| {
            if entry.insert(150).is_err() {
                rejected += 1;
            }
            entry.insert(10).unwrap();
        });
        assert_eq!(rejected, 2);
        assert!(multimap.contains_entry(&"a".into(), &10));
        assert!(multimap.contains_entry(&"b".into(), &10));
        assert_eq!(multimap.len(), 4);
    }

    #[test]
    fn as_map_visit_prunes_emptied_keys() {
        let mut multimap = guarded();
        multimap.put("a".into(), 1).unwrap();
        multimap.put("b".into(), 2).unwrap();
        multimap.visit_as_map_entries(|mut entry| {
            if entry.key() == "a" {
                assert!(entry.remove(&1));
            }
        });
        assert!(!multimap.contains_key(&"a".into()));
        assert!(multimap.contains_key(&"b".into()));
    }

    #[test]
    fn removals_bypass_the_constraint() {
        let mut multimap = guarded();
        multimap.put_all("k".into(), vec![1, 2, 3]).unwrap();
        assert!(multimap.remove(&"k".into(), &2));
        let drained = multimap.remove_all(&"k".into()).unwrap();
        assert_eq!(drained.into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert!(multimap.is_empty());
    }

    #[test]
    fn list_variant_preserves_duplicates_through_wrapper() {
        let mut multimap: ConstrainedMultimap<
            String,
            u32,
            Vec<u32>,
            FnConstraint<fn(&String, &u32) -> Result<(), ConstraintViolation>>,
        > = ConstrainedMultimap::new(constraint_fn(value_under_hundred as fn(&String, &u32) -> Result<(), ConstraintViolation>));
        multimap.put("k".into(), 1).unwrap();
        multimap.put("k".into(), 1).unwrap();
        assert_eq!(multimap.len(), 2);
    }
}

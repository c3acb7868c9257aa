//! Constraint-validated view over a [`BiMap`].
//!
//! The inverse is a live borrowed view, not a second collection: it reads and
//! writes the same backing bimap with orientation swapped, and inserts
//! through it apply the forward constraint with key and value swapped back.
//! [`InverseBiMap::inverse`] returns the original wrapper, so
//! `w.inverse().inverse()` is reference-identical to `w`.

use crate::bimap::{BiMap, BiMapError};
use crate::constraint::{ConstraintViolation, InverseConstraint, MapConstraint};

/// Rejection from a constrained bimap: either the constraint refused the
/// pair, or admitting it would break the bijection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstrainedBiMapError {
    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
    #[error(transparent)]
    Bijection(#[from] BiMapError),
}

impl ConstrainedBiMapError {
    #[must_use]
    pub fn stable_code(&self) -> &'static str {
        match self {
            Self::Constraint(violation) => violation.stable_code(),
            Self::Bijection(error) => error.stable_code(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConstrainedBiMap<K, V, C> {
    inner: BiMap<K, V>,
    constraint: C,
}

impl<K, V, C> ConstrainedBiMap<K, V, C>
where
    K: Ord + Clone,
    V: Ord + Clone,
    C: MapConstraint<K, V>,
{
    /// Wraps an existing bimap. Entries already present are not re-validated.
    #[must_use]
    pub fn wrap(inner: BiMap<K, V>, constraint: C) -> Self {
        Self { inner, constraint }
    }

    /// Empty constrained bimap.
    #[must_use]
    pub fn new(constraint: C) -> Self {
        Self::wrap(BiMap::new(), constraint)
    }

    /// Validates the pair, then inserts. Refuses to steal a bound value.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, ConstrainedBiMapError> {
        self.constraint.check(&key, &value)?;
        Ok(self.inner.insert(key, value)?)
    }

    /// Validates the pair, then inserts, evicting any pair holding `value`.
    pub fn force_insert(&mut self, key: K, value: V) -> Result<Option<V>, ConstrainedBiMapError> {
        self.constraint.check(&key, &value)?;
        Ok(self.inner.force_insert(key, value))
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    #[must_use]
    pub fn get_by_value(&self, value: &V) -> Option<&K> {
        self.inner.get_by_value(value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    pub fn remove_by_value(&mut self, value: &V) -> Option<K> {
        self.inner.remove_by_value(value)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.inner.contains_value(value)
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

    /// Live inverse view over the same backing bimap.
    pub fn inverse(&mut self) -> InverseBiMap<'_, K, V, C> {
        InverseBiMap { owner: self }
    }

    /// Consumes the wrapper, producing the opposite orientation as an owned
    /// constrained bimap. The constraint is wrapped in
    /// [`InverseConstraint`], so validation order stays that of the original.
    #[must_use]
    pub fn into_inverse(self) -> ConstrainedBiMap<V, K, InverseConstraint<C>> {
        ConstrainedBiMap {
            inner: self.inner.into_inverse(),
            constraint: InverseConstraint::new(self.constraint),
        }
    }

    #[must_use]
    pub fn constraint(&self) -> &C {
        &self.constraint
    }

    /// Releases the backing bimap.
    #[must_use]
    pub fn into_inner(self) -> BiMap<K, V> {
        self.inner
    }
}

/// Borrowed inverse view of a [`ConstrainedBiMap`]. Keys here are the
/// owner's values and vice versa; mutation writes through to the owner.
#[derive(Debug)]
pub struct InverseBiMap<'a, K, V, C> {
    owner: &'a mut ConstrainedBiMap<K, V, C>,
}

impl<'a, K, V, C> InverseBiMap<'a, K, V, C>
where
    K: Ord + Clone,
    V: Ord + Clone,
    C: MapConstraint<K, V>,
{
    /// Validates with key and value swapped back to the forward orientation,
    /// then inserts. Refuses to steal a key bound to a different value.
    pub fn insert(&mut self, key: V, value: K) -> Result<Option<K>, ConstrainedBiMapError> {
        self.owner.constraint.check(&value, &key)?;
        Ok(self.owner.inner.insert_inverse(key, value)?)
    }

    /// Validates, then inserts, evicting any pair holding `value`.
    pub fn force_insert(&mut self, key: V, value: K) -> Result<Option<K>, ConstrainedBiMapError> {
        self.owner.constraint.check(&value, &key)?;
        Ok(self.owner.inner.force_insert_inverse(key, value))
    }

    #[must_use]
    pub fn get(&self, key: &V) -> Option<&K> {
        self.owner.inner.get_by_value(key)
    }

    pub fn remove(&mut self, key: &V) -> Option<K> {
        self.owner.inner.remove_by_value(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &V) -> bool {
        self.owner.inner.contains_value(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.owner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }

    /// The inverse of the inverse is the original wrapper itself.
    #[must_use]
    pub fn inverse(self) -> &'a mut ConstrainedBiMap<K, V, C> {
        self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{FnConstraint, constraint_fn};

    type Guarded =
        ConstrainedBiMap<u32, String, FnConstraint<fn(&u32, &String) -> Result<(), ConstraintViolation>>>;

    fn key_nonzero_value_nonempty(key: &u32, value: &String) -> Result<(), ConstraintViolation> {
        if *key == 0 {
            return Err(ConstraintViolation::invalid_key("zero key"));
        }
        if value.is_empty() {
            return Err(ConstraintViolation::invalid_value("empty value"));
        }
        Ok(())
    }

    fn guarded() -> Guarded {
        ConstrainedBiMap::new(constraint_fn(key_nonzero_value_nonempty as fn(&u32, &String) -> Result<(), ConstraintViolation>))
    }

    #[test]
    fn insert_succeeds_iff_constraint_holds() {
        let mut bimap = guarded();
        assert!(bimap.insert(1, "one".into()).is_ok());
        assert!(bimap.insert(0, "zero".into()).is_err());
        assert!(bimap.insert(2, String::new()).is_err());
        assert_eq!(bimap.len(), 1);
        assert_eq!(bimap.get(&1).map(String::as_str), Some("one"));
        assert_eq!(bimap.get_by_value(&"one".into()), Some(&1));
    }

    #[test]
    fn bijection_errors_surface_with_stable_codes() {
        let mut bimap = guarded();
        bimap.insert(1, "one".into()).unwrap();
        let stolen = bimap.insert(2, "one".into()).unwrap_err();
        assert_eq!(stolen.stable_code(), "GR-BIMAP-1101");
        let rejected = bimap.insert(0, "zero".into()).unwrap_err();
        assert_eq!(rejected.stable_code(), "GR-CON-1001");
    }

    #[test]
    fn force_insert_validates_before_evicting() {
        let mut bimap = guarded();
        bimap.insert(1, "one".into()).unwrap();
        assert!(bimap.force_insert(0, "one".into()).is_err());
        // The rejected force insert must not have evicted anything.
        assert_eq!(bimap.get(&1).map(String::as_str), Some("one"));

        bimap.force_insert(2, "one".into()).unwrap();
        assert!(!bimap.contains_key(&1));
        assert_eq!(bimap.get_by_value(&"one".into()), Some(&2));
    }

    #[test]
    fn inverse_applies_constraint_swapped() {
        let mut bimap = guarded();
        {
            let mut inverse = bimap.inverse();
            assert!(inverse.insert("one".into(), 1).is_ok());
            // Key slot carries the value; the forward constraint still sees
            // (0, "zero") and rejects the zero key.
            assert!(inverse.insert("zero".into(), 0).is_err());
            assert!(inverse.insert(String::new(), 2).is_err());
            assert_eq!(inverse.len(), 1);
            assert_eq!(inverse.get(&"one".into()), Some(&1));
        }
        assert_eq!(bimap.get(&1).map(String::as_str), Some("one"));
    }

    #[test]
    fn inverse_of_inverse_is_the_original() {
        let mut bimap = guarded();
        bimap.insert(1, "one".into()).unwrap();
        let round_trip = bimap.inverse().inverse() as *const Guarded;
        assert!(std::ptr::eq(round_trip, std::ptr::addr_of!(bimap)));
    }

    #[test]
    fn mutation_through_inverse_is_visible_forward() {
        let mut bimap = guarded();
        bimap.insert(1, "one".into()).unwrap();
        {
            let mut inverse = bimap.inverse();
            assert_eq!(inverse.remove(&"one".into()), Some(1));
            inverse.insert("two".into(), 2).unwrap();
        }
        assert!(!bimap.contains_key(&1));
        assert_eq!(bimap.get(&2).map(String::as_str), Some("two"));
    }

    #[test]
    fn into_inverse_preserves_validation_order() {
        let mut bimap = guarded();
        bimap.insert(1, "one".into()).unwrap();
        let mut inverse = bimap.into_inverse();
        assert_eq!(inverse.get(&"one".into()), Some(&1));
        // Still the forward rule: zero keys are rejected even when they
        // arrive through the value slot of the inverted map.
        assert!(inverse.insert("zero".into(), 0).is_err());
        assert!(inverse.insert("two".into(), 2).is_ok());
    }

    #[test]
    fn wrap_skips_existing_entries() {
        let mut backing = BiMap::new();
        backing.insert(0, "grandfathered".to_string()).unwrap();
        let mut bimap = ConstrainedBiMap::wrap(
            backing,
            constraint_fn(key_nonzero_value_nonempty as fn(&u32, &String) -> Result<(), ConstraintViolation>),
        );
        assert!(bimap.contains_key(&0));
        assert!(bimap.insert(0, "again".into()).is_err());
    }
}

//! Pluggable (key, value) validation applied by the constrained wrappers.
//!
//! A constraint is a pure predicate over a candidate pair. Wrappers invoke it
//! before any operation that would introduce the pair into the backing
//! collection; operations that only read or remove never consult it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ERROR_INVALID_KEY: &str = "GR-CON-1001";
const ERROR_INVALID_VALUE: &str = "GR-CON-1002";
const ERROR_INVALID_PAIR: &str = "GR-CON-1003";

/// Rejection raised by a [`MapConstraint`]. The backing collection is left
/// unmodified for the call that produced the violation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintViolation {
    #[error("invalid key: {detail}")]
    InvalidKey { detail: String },
    #[error("invalid value: {detail}")]
    InvalidValue { detail: String },
    #[error("invalid pair: {detail}")]
    InvalidPair { detail: String },
}

impl ConstraintViolation {
    #[must_use]
    pub fn invalid_key(detail: impl Into<String>) -> Self {
        Self::InvalidKey {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn invalid_value(detail: impl Into<String>) -> Self {
        Self::InvalidValue {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn invalid_pair(detail: impl Into<String>) -> Self {
        Self::InvalidPair {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn stable_code(&self) -> &'static str {
        match self {
            Self::InvalidKey { .. } => ERROR_INVALID_KEY,
            Self::InvalidValue { .. } => ERROR_INVALID_VALUE,
            Self::InvalidPair { .. } => ERROR_INVALID_PAIR,
        }
    }
}

/// Validation hook consulted before a (key, value) pair is admitted.
///
/// Implementations must be pure: same inputs, same verdict, no side effects
/// on the collection under validation.
pub trait MapConstraint<K, V> {
    fn check(&self, key: &K, value: &V) -> Result<(), ConstraintViolation>;
}

/// Constraint that admits every pair. Useful as a default and in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptAll;

impl<K, V> MapConstraint<K, V> for AcceptAll {
    fn check(&self, _key: &K, _value: &V) -> Result<(), ConstraintViolation> {
        Ok(())
    }
}

/// Adapter lifting a closure or fn pointer into a [`MapConstraint`].
#[derive(Debug, Clone, Copy)]
pub struct FnConstraint<F> {
    check: F,
}

impl<F> FnConstraint<F> {
    #[must_use]
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<K, V, F> MapConstraint<K, V> for FnConstraint<F>
where
    F: Fn(&K, &V) -> Result<(), ConstraintViolation>,
{
    fn check(&self, key: &K, value: &V) -> Result<(), ConstraintViolation> {
        (self.check)(key, value)
    }
}

/// Lift a closure into a constraint.
pub fn constraint_fn<K, V, F>(check: F) -> FnConstraint<F>
where
    F: Fn(&K, &V) -> Result<(), ConstraintViolation>,
{
    FnConstraint::new(check)
}

/// Applies an inner constraint with key and value swapped.
///
/// This is the validation rule seen through a bimap inverse view: inserting
/// (v, k) into the inverse must satisfy the forward constraint on (k, v).
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseConstraint<C> {
    inner: C,
}

impl<C> InverseConstraint<C> {
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<K, V, C> MapConstraint<K, V> for InverseConstraint<C>
where
    C: MapConstraint<V, K>,
{
    fn check(&self, key: &K, value: &V) -> Result<(), ConstraintViolation> {
        self.inner.check(value, key)
    }
}

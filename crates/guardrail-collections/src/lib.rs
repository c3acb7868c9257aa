//! Constraint-validated collection wrappers.
//!
//! Provides lean deterministic support collections (a key to value-collection
//! multimap and a bijective map) plus a decorator layer that routes every
//! operation introducing a new (key, value) pair through a pluggable
//! [`MapConstraint`](constraint::MapConstraint) before it reaches the backing
//! store. Views handed out by the wrappers stay live: mutation through a view
//! writes through to the backing collection and is re-validated by the same
//! constraint.
//!
//! Pre-existing entries are never retroactively checked when a collection is
//! wrapped; see [`ConstrainedMap::wrap_checked`](constrained_map::ConstrainedMap::wrap_checked)
//! for the eager opt-in.

#![forbid(unsafe_code)]

pub mod bimap;
pub mod constrained_bimap;
pub mod constrained_map;
pub mod constrained_multimap;
pub mod constraint;
pub mod multimap;

pub use bimap::{BiMap, BiMapError};
pub use constrained_bimap::{ConstrainedBiMap, ConstrainedBiMapError, InverseBiMap};
pub use constrained_map::{ConstrainedMap, EntryGuard};
pub use constrained_multimap::{AsMapEntry, ConstrainedMultimap, ConstrainedValues};
pub use constraint::{
    AcceptAll, ConstraintViolation, FnConstraint, InverseConstraint, MapConstraint, constraint_fn,
};
pub use multimap::{ListMultimap, Multimap, SetMultimap, ValueStore};

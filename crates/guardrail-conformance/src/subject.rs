//! Subjects under test and the deterministic sample fixtures that seed them.
//!
//! Elements are `u64` samples drawn from a fixed pool, so every fixture of a
//! given size is identical across runs. [`MinimalSubject`] is deliberately
//! unhelpful: it supports only the bare reads and refuses every mutation,
//! mirroring the strictest collection an implementation may hand out.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use guardrail_collections::{
    ConstrainedMultimap, ConstraintViolation, FnConstraint, constraint_fn,
};

use crate::features::{CollectionFeature, CollectionSize, SubjectProfile};

const ERROR_NO_SUCH_ELEMENT: &str = "GR-SUBJ-3001";
const ERROR_UNSUPPORTED: &str = "GR-SUBJ-3002";
const ERROR_REJECTED: &str = "GR-SUBJ-3003";

/// Fixed sample pool; `sample_elements` takes a prefix of it.
pub const SAMPLE_POOL: [u64; 3] = [101, 202, 303];

/// Sample elements for a fixture of the given size, in seeding order.
#[must_use]
pub fn sample_elements(size: CollectionSize) -> Vec<u64> {
    SAMPLE_POOL[..size.element_count()].to_vec()
}

/// Per-element hash; splitmix64 finalizer over the raw element.
#[must_use]
pub fn element_hash(element: u64) -> u64 {
    let mut x = element.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Order-sensitive sequence hash: `((1*31+h(a))*31+h(b))*31+h(c)`, wrapping.
#[must_use]
pub fn sequence_hash(elements: &[u64]) -> u64 {
    let mut acc: u64 = 1;
    for element in elements {
        acc = acc.wrapping_mul(31).wrapping_add(element_hash(*element));
    }
    acc
}

/// Failure reported by a subject operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectError {
    /// Lookup on an empty subject.
    #[error("no such element")]
    NoSuchElement,
    /// The subject does not implement this operation at all.
    #[error("operation `{operation}` is not supported by this subject")]
    Unsupported { operation: String },
    /// A validation layer refused the element.
    #[error("element rejected: {detail}")]
    Rejected { detail: String },
}

impl SubjectError {
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    #[must_use]
    pub fn stable_code(&self) -> &'static str {
        match self {
            Self::NoSuchElement => ERROR_NO_SUCH_ELEMENT,
            Self::Unsupported { .. } => ERROR_UNSUPPORTED,
            Self::Rejected { .. } => ERROR_REJECTED,
        }
    }
}

// ---------------------------------------------------------------------------
// Subject traits
// ---------------------------------------------------------------------------

/// Minimal surface every tester can rely on.
pub trait CollectionSubject {
    fn subject_id(&self) -> &str;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Elements in iteration order.
    fn snapshot(&self) -> Vec<u64>;
    fn features(&self) -> BTreeSet<CollectionFeature>;
    fn try_insert(&mut self, element: u64) -> Result<bool, SubjectError>;
    fn try_remove(&mut self, element: u64) -> Result<bool, SubjectError>;

    fn profile(&self) -> SubjectProfile {
        SubjectProfile {
            subject_id: self.subject_id().to_string(),
            size: CollectionSize::classify(self.len()),
            features: self.features(),
        }
    }
}

/// Queue contract: `element` reads the head without removing it.
pub trait QueueSubject: CollectionSubject {
    fn element(&self) -> Result<u64, SubjectError>;
}

/// List contract: content hash folded from per-element hashes.
pub trait ListSubject: CollectionSubject {
    fn hash_code(&self) -> u64;
}

/// Builds a fresh subject seeded with the samples for `size`.
pub trait SubjectFactory {
    type Subject: CollectionSubject;

    fn create(&self, size: CollectionSize) -> Self::Subject;
}

// ---------------------------------------------------------------------------
// Queue subject
// ---------------------------------------------------------------------------

/// FIFO queue over a `VecDeque`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecQueue {
    items: VecDeque<u64>,
}

impl VecQueue {
    #[must_use]
    pub fn of(elements: &[u64]) -> Self {
        Self {
            items: elements.iter().copied().collect(),
        }
    }
}

impl CollectionSubject for VecQueue {
    fn subject_id(&self) -> &str {
        "vec_queue"
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn snapshot(&self) -> Vec<u64> {
        self.items.iter().copied().collect()
    }

    fn features(&self) -> BTreeSet<CollectionFeature> {
        [
            CollectionFeature::KnownOrder,
            CollectionFeature::SupportsInsert,
            CollectionFeature::SupportsRemove,
        ]
        .into_iter()
        .collect()
    }

    fn try_insert(&mut self, element: u64) -> Result<bool, SubjectError> {
        self.items.push_back(element);
        Ok(true)
    }

    fn try_remove(&mut self, element: u64) -> Result<bool, SubjectError> {
        match self.items.iter().position(|&item| item == element) {
            Some(index) => {
                self.items.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl QueueSubject for VecQueue {
    fn element(&self) -> Result<u64, SubjectError> {
        self.items.front().copied().ok_or(SubjectError::NoSuchElement)
    }
}

/// Factory for [`VecQueue`] fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct VecQueueFactory;

impl SubjectFactory for VecQueueFactory {
    type Subject = VecQueue;

    fn create(&self, size: CollectionSize) -> VecQueue {
        VecQueue::of(&sample_elements(size))
    }
}

// ---------------------------------------------------------------------------
// List subject
// ---------------------------------------------------------------------------

/// Growable list over a `Vec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecList {
    items: Vec<u64>,
}

impl VecList {
    #[must_use]
    pub fn of(elements: &[u64]) -> Self {
        Self {
            items: elements.to_vec(),
        }
    }
}

impl CollectionSubject for VecList {
    fn subject_id(&self) -> &str {
        "vec_list"
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn snapshot(&self) -> Vec<u64> {
        self.items.clone()
    }

    fn features(&self) -> BTreeSet<CollectionFeature> {
        [
            CollectionFeature::KnownOrder,
            CollectionFeature::SupportsInsert,
            CollectionFeature::SupportsRemove,
        ]
        .into_iter()
        .collect()
    }

    fn try_insert(&mut self, element: u64) -> Result<bool, SubjectError> {
        self.items.push(element);
        Ok(true)
    }

    fn try_remove(&mut self, element: u64) -> Result<bool, SubjectError> {
        match self.items.iter().position(|&item| item == element) {
            Some(index) => {
                self.items.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl ListSubject for VecList {
    fn hash_code(&self) -> u64 {
        let mut acc: u64 = 1;
        for element in &self.items {
            acc = acc.wrapping_mul(31).wrapping_add(element_hash(*element));
        }
        acc
    }
}

/// Factory for [`VecList`] fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct VecListFactory;

impl SubjectFactory for VecListFactory {
    type Subject = VecList;

    fn create(&self, size: CollectionSize) -> VecList {
        VecList::of(&sample_elements(size))
    }
}

// ---------------------------------------------------------------------------
// Minimal subject
// ---------------------------------------------------------------------------

/// The bare minimum a collection may provide: reads work, every mutation is
/// refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalSubject {
    items: Vec<u64>,
}

impl MinimalSubject {
    #[must_use]
    pub fn of(elements: &[u64]) -> Self {
        Self {
            items: elements.to_vec(),
        }
    }
}

impl CollectionSubject for MinimalSubject {
    fn subject_id(&self) -> &str {
        "minimal"
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn snapshot(&self) -> Vec<u64> {
        self.items.clone()
    }

    fn features(&self) -> BTreeSet<CollectionFeature> {
        [
            CollectionFeature::KnownOrder,
            CollectionFeature::RejectsMutation,
        ]
        .into_iter()
        .collect()
    }

    fn try_insert(&mut self, _element: u64) -> Result<bool, SubjectError> {
        Err(SubjectError::unsupported("insert"))
    }

    fn try_remove(&mut self, _element: u64) -> Result<bool, SubjectError> {
        Err(SubjectError::unsupported("remove"))
    }
}

impl ListSubject for MinimalSubject {
    fn hash_code(&self) -> u64 {
        sequence_hash(&self.items)
    }
}

/// Factory for [`MinimalSubject`] fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalFactory;

impl SubjectFactory for MinimalFactory {
    type Subject = MinimalSubject;

    fn create(&self, size: CollectionSize) -> MinimalSubject {
        MinimalSubject::of(&sample_elements(size))
    }
}

// ---------------------------------------------------------------------------
// Constrained bridge subject
// ---------------------------------------------------------------------------

/// Elements at or above this cap are refused by the bridge constraint.
pub const VALUE_CAP: u64 = 1_000_000;

fn value_below_cap(_bucket: &String, value: &u64) -> Result<(), ConstraintViolation> {
    if *value >= VALUE_CAP {
        return Err(ConstraintViolation::invalid_value(format!(
            "{value} is at or above the cap {VALUE_CAP}"
        )));
    }
    Ok(())
}

type CapConstraint = FnConstraint<fn(&String, &u64) -> Result<(), ConstraintViolation>>;

/// Sorted-set subject backed by a constrained multimap; insertions pass
/// through the cap constraint, so the testers can observe rejection
/// semantics end to end.
#[derive(Debug)]
pub struct ConstrainedSetSubject {
    multimap: ConstrainedMultimap<String, u64, BTreeSet<u64>, CapConstraint>,
    bucket: String,
}

impl ConstrainedSetSubject {
    #[must_use]
    pub fn of(elements: &[u64]) -> Self {
        let mut subject = Self {
            multimap: ConstrainedMultimap::new(constraint_fn(value_below_cap as fn(&String, &u64) -> Result<(), ConstraintViolation>)),
            bucket: "subject".to_string(),
        };
        for element in elements {
            // Seeding elements are inside the cap; a rejected seed is a
            // fixture bug and simply stays out of the subject.
            let _ = subject.multimap.put(subject.bucket.clone(), *element);
        }
        subject
    }
}

impl CollectionSubject for ConstrainedSetSubject {
    fn subject_id(&self) -> &str {
        "constrained_set"
    }

    fn len(&self) -> usize {
        self.multimap.len()
    }

    fn snapshot(&self) -> Vec<u64> {
        self.multimap.values_of(&self.bucket).copied().collect()
    }

    fn features(&self) -> BTreeSet<CollectionFeature> {
        [
            CollectionFeature::KnownOrder,
            CollectionFeature::SortedValues,
            CollectionFeature::RejectsDuplicates,
            CollectionFeature::SupportsInsert,
            CollectionFeature::SupportsRemove,
        ]
        .into_iter()
        .collect()
    }

    fn try_insert(&mut self, element: u64) -> Result<bool, SubjectError> {
        let mut view = self.multimap.get_mut(self.bucket.clone());
        view.insert(element)
            .map_err(|violation| SubjectError::Rejected {
                detail: violation.to_string(),
            })
    }

    fn try_remove(&mut self, element: u64) -> Result<bool, SubjectError> {
        Ok(self.multimap.remove(&self.bucket, &element))
    }
}

/// Factory for [`ConstrainedSetSubject`] fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedSetFactory;

impl SubjectFactory for ConstrainedSetFactory {
    type Subject = ConstrainedSetSubject;

    fn create(&self, size: CollectionSize) -> ConstrainedSetSubject {
        ConstrainedSetSubject::of(&sample_elements(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- fixtures --

    #[test]
    fn sample_elements_are_a_pool_prefix() {
        assert!(sample_elements(CollectionSize::Zero).is_empty());
        assert_eq!(sample_elements(CollectionSize::One), vec![SAMPLE_POOL[0]]);
        assert_eq!(sample_elements(CollectionSize::Several), SAMPLE_POOL.to_vec());
    }

    #[test]
    fn sequence_hash_matches_explicit_fold() {
        let [a, b, c] = SAMPLE_POOL;
        let expected = ((1u64
            .wrapping_mul(31)
            .wrapping_add(element_hash(a)))
        .wrapping_mul(31)
        .wrapping_add(element_hash(b)))
        .wrapping_mul(31)
        .wrapping_add(element_hash(c));
        assert_eq!(sequence_hash(&SAMPLE_POOL), expected);
    }

    #[test]
    fn sequence_hash_is_order_sensitive() {
        assert_ne!(sequence_hash(&[1, 2]), sequence_hash(&[2, 1]));
        assert_eq!(sequence_hash(&[]), 1);
    }

    // -- VecQueue --

    #[test]
    fn queue_element_reads_head_without_removal() {
        let queue = VecQueue::of(&[7, 8]);
        assert_eq!(queue.element(), Ok(7));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn empty_queue_element_is_no_such_element() {
        let queue = VecQueue::of(&[]);
        assert_eq!(queue.element(), Err(SubjectError::NoSuchElement));
    }

    #[test]
    fn queue_profile_reflects_size() {
        let factory = VecQueueFactory;
        for size in CollectionSize::ALL {
            let subject = factory.create(*size);
            assert_eq!(subject.profile().size, *size);
        }
    }

    // -- MinimalSubject --

    #[test]
    fn minimal_subject_refuses_mutation() {
        let mut subject = MinimalSubject::of(&[1]);
        assert_eq!(
            subject.try_insert(2),
            Err(SubjectError::unsupported("insert"))
        );
        assert_eq!(
            subject.try_remove(1),
            Err(SubjectError::unsupported("remove"))
        );
        assert_eq!(subject.snapshot(), vec![1]);
    }

    // -- ConstrainedSetSubject --

    #[test]
    fn constrained_subject_rejects_capped_values() {
        let mut subject = ConstrainedSetSubject::of(&sample_elements(CollectionSize::One));
        let error = subject.try_insert(VALUE_CAP + 1).unwrap_err();
        assert_eq!(error.stable_code(), ERROR_REJECTED);
        assert_eq!(subject.snapshot(), vec![SAMPLE_POOL[0]]);

        assert_eq!(subject.try_insert(5), Ok(true));
        assert_eq!(subject.snapshot(), vec![5, SAMPLE_POOL[0]]);
    }

    #[test]
    fn constrained_subject_deduplicates() {
        let mut subject = ConstrainedSetSubject::of(&[9]);
        assert_eq!(subject.try_insert(9), Ok(false));
        assert_eq!(subject.len(), 1);
    }

    #[test]
    fn subject_error_codes_are_distinct() {
        let mut codes = vec![
            SubjectError::NoSuchElement.stable_code(),
            SubjectError::unsupported("x").stable_code(),
            SubjectError::Rejected {
                detail: "d".to_string(),
            }
            .stable_code(),
        ];
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 3);
    }
}

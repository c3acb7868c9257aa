//! Feature-gated test units.
//!
//! Each tester performs one behavioral assertion and then, unless the
//! operation under test is documented to mutate, verifies the subject was
//! left unchanged. A tester expecting a specific error treats any other
//! outcome as a failure.

use serde::{Deserialize, Serialize};

use crate::features::{CollectionFeature, CollectionSize, FeatureRequirement};
use crate::subject::{CollectionSubject, ListSubject, QueueSubject, SubjectError, element_hash};

/// Result of one tester execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TesterOutcome {
    Pass,
    Fail { detail: String },
}

impl TesterOutcome {
    #[must_use]
    pub fn fail(detail: impl Into<String>) -> Self {
        Self::Fail {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// One conformance test unit over subjects of type `S`.
pub trait Tester<S: ?Sized> {
    /// Stable identifier, unique within a catalog.
    fn id(&self) -> &'static str;
    /// Sizes and capabilities under which this tester is meaningful.
    fn requirement(&self) -> FeatureRequirement;
    fn run(&self, subject: &mut S) -> TesterOutcome;
}

fn expect_unchanged<S: CollectionSubject + ?Sized>(before: &[u64], subject: &S) -> TesterOutcome {
    let after = subject.snapshot();
    if after == before {
        TesterOutcome::Pass
    } else {
        TesterOutcome::fail(format!(
            "subject mutated by a read-only operation: {before:?} -> {after:?}"
        ))
    }
}

// ---------------------------------------------------------------------------
// Queue testers
// ---------------------------------------------------------------------------

/// `element()` on an empty queue must signal not-found and leave the queue
/// untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueElementEmptyTester;

impl<S: QueueSubject> Tester<S> for QueueElementEmptyTester {
    fn id(&self) -> &'static str {
        "queue.element.empty"
    }

    fn requirement(&self) -> FeatureRequirement {
        FeatureRequirement::any().with_size(CollectionSize::Zero)
    }

    fn run(&self, subject: &mut S) -> TesterOutcome {
        let before = subject.snapshot();
        match subject.element() {
            Err(SubjectError::NoSuchElement) => {}
            Ok(value) => {
                return TesterOutcome::fail(format!(
                    "element() on an empty queue returned {value}"
                ));
            }
            Err(other) => {
                return TesterOutcome::fail(format!(
                    "element() reported `{other}` instead of no-such-element"
                ));
            }
        }
        expect_unchanged(&before, subject)
    }
}

/// `element()` on a one-element queue returns that element.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueElementOneTester;

impl<S: QueueSubject> Tester<S> for QueueElementOneTester {
    fn id(&self) -> &'static str {
        "queue.element.one"
    }

    fn requirement(&self) -> FeatureRequirement {
        FeatureRequirement::any().with_size(CollectionSize::One)
    }

    fn run(&self, subject: &mut S) -> TesterOutcome {
        let before = subject.snapshot();
        let Some(&head) = before.first() else {
            return TesterOutcome::fail("tester requires a non-empty subject".to_string());
        };
        match subject.element() {
            Ok(value) if value == head => {}
            Ok(value) => {
                return TesterOutcome::fail(format!(
                    "element() returned {value}, expected {head}"
                ));
            }
            Err(error) => {
                return TesterOutcome::fail(format!("element() failed with `{error}`"));
            }
        }
        expect_unchanged(&before, subject)
    }
}

/// `element()` on a larger queue with a defined order returns the head.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueElementManyTester;

impl<S: QueueSubject> Tester<S> for QueueElementManyTester {
    fn id(&self) -> &'static str {
        "queue.element.many"
    }

    fn requirement(&self) -> FeatureRequirement {
        FeatureRequirement::any()
            .with_size(CollectionSize::Several)
            .with_feature(CollectionFeature::KnownOrder)
    }

    fn run(&self, subject: &mut S) -> TesterOutcome {
        let before = subject.snapshot();
        let Some(&head) = before.first() else {
            return TesterOutcome::fail("tester requires a non-empty subject".to_string());
        };
        match subject.element() {
            Ok(value) if value == head => {}
            Ok(value) => {
                return TesterOutcome::fail(format!(
                    "element() returned {value}, expected head {head}"
                ));
            }
            Err(error) => {
                return TesterOutcome::fail(format!("element() failed with `{error}`"));
            }
        }
        expect_unchanged(&before, subject)
    }
}

// ---------------------------------------------------------------------------
// List testers
// ---------------------------------------------------------------------------

/// A list's hash code is folded from its element hashes:
/// `((1*31+h(a))*31+h(b))*31+h(c)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListHashCodeTester;

impl<S: ListSubject> Tester<S> for ListHashCodeTester {
    fn id(&self) -> &'static str {
        "list.hash_code"
    }

    fn requirement(&self) -> FeatureRequirement {
        FeatureRequirement::any()
    }

    fn run(&self, subject: &mut S) -> TesterOutcome {
        let before = subject.snapshot();
        let mut expected: u64 = 1;
        for element in &before {
            expected = expected.wrapping_mul(31).wrapping_add(element_hash(*element));
        }
        let actual = subject.hash_code();
        if actual != expected {
            return TesterOutcome::fail(format!(
                "hash_code() returned {actual}, expected fold {expected}"
            ));
        }
        expect_unchanged(&before, subject)
    }
}

// ---------------------------------------------------------------------------
// Mutation-refusal tester
// ---------------------------------------------------------------------------

/// Subjects declaring `RejectsMutation` must refuse insert and remove
/// outright, without touching their contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationRefusalTester;

impl<S: CollectionSubject> Tester<S> for MutationRefusalTester {
    fn id(&self) -> &'static str {
        "collection.mutation.refused"
    }

    fn requirement(&self) -> FeatureRequirement {
        FeatureRequirement::any().with_feature(CollectionFeature::RejectsMutation)
    }

    fn run(&self, subject: &mut S) -> TesterOutcome {
        let before = subject.snapshot();
        match subject.try_insert(7) {
            Err(SubjectError::Unsupported { .. }) => {}
            other => {
                return TesterOutcome::fail(format!(
                    "insert was not refused as unsupported: {other:?}"
                ));
            }
        }
        let target = before.first().copied().unwrap_or(7);
        match subject.try_remove(target) {
            Err(SubjectError::Unsupported { .. }) => {}
            other => {
                return TesterOutcome::fail(format!(
                    "remove was not refused as unsupported: {other:?}"
                ));
            }
        }
        expect_unchanged(&before, subject)
    }
}

// ---------------------------------------------------------------------------
// Constraint-gate tester
// ---------------------------------------------------------------------------

/// Insertion through a validated subject succeeds iff the constraint holds;
/// a rejected insert must leave the backing collection unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintGateTester {
    /// Element the subject's constraint admits.
    pub accepted: u64,
    /// Element the subject's constraint refuses.
    pub rejected: u64,
}

impl<S: CollectionSubject> Tester<S> for ConstraintGateTester {
    fn id(&self) -> &'static str {
        "constraint.gate.insert"
    }

    fn requirement(&self) -> FeatureRequirement {
        FeatureRequirement::any().with_feature(CollectionFeature::SupportsInsert)
    }

    fn run(&self, subject: &mut S) -> TesterOutcome {
        let before = subject.snapshot();
        match subject.try_insert(self.rejected) {
            Err(SubjectError::Rejected { .. }) => {}
            other => {
                return TesterOutcome::fail(format!(
                    "inserting {} was not rejected: {other:?}",
                    self.rejected
                ));
            }
        }
        if subject.snapshot() != before {
            return TesterOutcome::fail("backing collection changed on a rejected insert".to_string());
        }
        match subject.try_insert(self.accepted) {
            Ok(true) => {}
            other => {
                return TesterOutcome::fail(format!(
                    "inserting {} did not succeed: {other:?}",
                    self.accepted
                ));
            }
        }
        if !subject.snapshot().contains(&self.accepted) {
            return TesterOutcome::fail(format!(
                "{} is missing after a successful insert",
                self.accepted
            ));
        }
        TesterOutcome::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::{
        ConstrainedSetSubject, MinimalSubject, SAMPLE_POOL, VALUE_CAP, VecList, VecQueue,
        sample_elements, sequence_hash,
    };

    // -- queue testers --

    #[test]
    fn empty_tester_passes_on_empty_queue() {
        let mut queue = VecQueue::of(&[]);
        assert!(QueueElementEmptyTester.run(&mut queue).is_pass());
    }

    #[test]
    fn empty_tester_fails_when_element_succeeds() {
        let mut queue = VecQueue::of(&[1]);
        let outcome = QueueElementEmptyTester.run(&mut queue);
        assert!(!outcome.is_pass());
    }

    #[test]
    fn one_tester_checks_the_sole_element() {
        let mut queue = VecQueue::of(&sample_elements(CollectionSize::One));
        assert!(QueueElementOneTester.run(&mut queue).is_pass());
    }

    #[test]
    fn many_tester_checks_the_head() {
        let mut queue = VecQueue::of(&SAMPLE_POOL);
        assert!(QueueElementManyTester.run(&mut queue).is_pass());
        assert_eq!(queue.snapshot(), SAMPLE_POOL.to_vec());
    }

    // -- list tester --

    #[test]
    fn hash_tester_accepts_conforming_list() {
        let mut list = VecList::of(&SAMPLE_POOL);
        assert!(ListHashCodeTester.run(&mut list).is_pass());
    }

    #[test]
    fn hash_tester_matches_sequence_hash_helper() {
        let list = VecList::of(&[5, 6]);
        assert_eq!(list.hash_code(), sequence_hash(&[5, 6]));
    }

    // -- mutation refusal --

    #[test]
    fn refusal_tester_passes_on_minimal_subject() {
        let mut subject = MinimalSubject::of(&[1, 2]);
        assert!(MutationRefusalTester.run(&mut subject).is_pass());
    }

    #[test]
    fn refusal_tester_fails_on_mutable_subject() {
        let mut queue = VecQueue::of(&[]);
        let outcome = MutationRefusalTester.run(&mut queue);
        assert!(!outcome.is_pass());
    }

    // -- constraint gate --

    #[test]
    fn gate_tester_observes_rejection_and_admission() {
        let mut subject = ConstrainedSetSubject::of(&sample_elements(CollectionSize::One));
        let tester = ConstraintGateTester {
            accepted: 555_555,
            rejected: VALUE_CAP + 7,
        };
        assert!(tester.run(&mut subject).is_pass());
        assert!(subject.snapshot().contains(&555_555));
    }

    #[test]
    fn gate_tester_fails_when_nothing_is_rejected() {
        // A plain queue accepts everything, so the gate tester must fail.
        let mut queue = VecQueue::of(&[]);
        let tester = ConstraintGateTester {
            accepted: 1,
            rejected: 2,
        };
        assert!(!tester.run(&mut queue).is_pass());
    }

    #[test]
    fn outcome_serde_roundtrip() {
        let outcome = TesterOutcome::fail("detail");
        let json = serde_json::to_string(&outcome).unwrap();
        let back: TesterOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, back);
    }
}

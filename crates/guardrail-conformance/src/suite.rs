//! Suite planning and execution.
//!
//! Planning is a pure filter over the catalog: a tester is included iff its
//! declared requirement is satisfied by the subject profile, and every
//! exclusion records why. Execution runs each planned tester against a fresh
//! fixture and folds the outcomes into a [`SuiteReport`], whose canonical
//! JSON encoding is hashed so identical configurations yield identical
//! digests.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::features::{CollectionFeature, CollectionSize, SubjectProfile};
use crate::subject::{CollectionSubject, SubjectFactory};
use crate::testers::{Tester, TesterOutcome};

pub const SUITE_SCHEMA_VERSION: &str = "guardrail.conformance-suite.v1";

const ERROR_DUPLICATE_TESTER: &str = "GR-SUITE-2001";
const ERROR_EMPTY_CATALOG: &str = "GR-SUITE-2002";
const ERROR_FACTORY_SIZE: &str = "GR-SUITE-2003";
const ERROR_SERIALIZATION: &str = "GR-SUITE-2004";

/// Suite construction or execution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuiteError {
    #[error("tester id `{0}` is already registered")]
    DuplicateTesterId(String),
    #[error("the tester catalog is empty")]
    EmptyCatalog,
    #[error("factory produced a {actual} subject for a {requested} request")]
    FactorySizeMismatch {
        requested: CollectionSize,
        actual: CollectionSize,
    },
    #[error("report serialization failed: {0}")]
    Serialization(String),
}

impl SuiteError {
    #[must_use]
    pub fn stable_code(&self) -> &'static str {
        match self {
            Self::DuplicateTesterId(_) => ERROR_DUPLICATE_TESTER,
            Self::EmptyCatalog => ERROR_EMPTY_CATALOG,
            Self::FactorySizeMismatch { .. } => ERROR_FACTORY_SIZE,
            Self::Serialization(_) => ERROR_SERIALIZATION,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Registry of testers applicable to subjects of type `S`. Registration
/// order is the planning and execution order.
pub struct TesterCatalog<S> {
    testers: Vec<Box<dyn Tester<S>>>,
}

impl<S> TesterCatalog<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            testers: Vec::new(),
        }
    }

    /// Registers a tester; ids must be unique within the catalog.
    pub fn register(&mut self, tester: Box<dyn Tester<S>>) -> Result<(), SuiteError> {
        if self.testers.iter().any(|known| known.id() == tester.id()) {
            return Err(SuiteError::DuplicateTesterId(tester.id().to_string()));
        }
        self.testers.push(tester);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.testers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.testers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.testers.iter().map(|tester| tester.id())
    }
}

impl<S> Default for TesterCatalog<S> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Why a tester was left out of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The profile's size is outside the tester's declared sizes.
    SizeNotApplicable { allowed: BTreeSet<CollectionSize> },
    /// The profile lacks required capabilities.
    MissingFeatures { missing: BTreeSet<CollectionFeature> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedExclusion {
    pub tester_id: String,
    pub reason: ExclusionReason,
}

/// Static selection outcome for one subject profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuitePlan {
    pub schema: String,
    pub profile: SubjectProfile,
    pub included: Vec<String>,
    pub excluded: Vec<PlannedExclusion>,
}

impl SuitePlan {
    /// SHA-256 over the canonical JSON encoding.
    pub fn digest(&self) -> Result<String, SuiteError> {
        digest_json(self)
    }
}

/// Evaluates the catalog against a profile. Pure: same inputs, same plan.
#[must_use]
pub fn plan_suite<S>(catalog: &TesterCatalog<S>, profile: &SubjectProfile) -> SuitePlan {
    let mut included = Vec::new();
    let mut excluded = Vec::new();
    for tester in &catalog.testers {
        let requirement = tester.requirement();
        if requirement.is_satisfied_by(profile) {
            included.push(tester.id().to_string());
            continue;
        }
        let reason = if !requirement.sizes.is_empty() && !requirement.sizes.contains(&profile.size)
        {
            ExclusionReason::SizeNotApplicable {
                allowed: requirement.sizes.clone(),
            }
        } else {
            ExclusionReason::MissingFeatures {
                missing: requirement.missing_features(profile),
            }
        };
        excluded.push(PlannedExclusion {
            tester_id: tester.id().to_string(),
            reason,
        });
    }
    SuitePlan {
        schema: SUITE_SCHEMA_VERSION.to_string(),
        profile: profile.clone(),
        included,
        excluded,
    }
}

// ---------------------------------------------------------------------------
// Execution and report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub tester_id: String,
    pub outcome: TesterOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub planned: u64,
    pub passed: u64,
    pub failed: u64,
    pub excluded: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub schema: String,
    pub plan: SuitePlan,
    pub records: Vec<CaseRecord>,
    pub summary: SuiteSummary,
}

impl SuiteReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }

    /// SHA-256 over the canonical JSON encoding.
    pub fn digest(&self) -> Result<String, SuiteError> {
        digest_json(self)
    }
}

/// Plans against a probe fixture of `size`, then runs every included tester
/// on its own fresh fixture.
pub fn run_suite<F>(
    catalog: &TesterCatalog<F::Subject>,
    factory: &F,
    size: CollectionSize,
) -> Result<SuiteReport, SuiteError>
where
    F: SubjectFactory,
{
    if catalog.is_empty() {
        return Err(SuiteError::EmptyCatalog);
    }
    let probe = factory.create(size);
    let profile = probe.profile();
    if profile.size != size {
        return Err(SuiteError::FactorySizeMismatch {
            requested: size,
            actual: profile.size,
        });
    }

    let plan = plan_suite(catalog, &profile);
    let mut records = Vec::with_capacity(plan.included.len());
    let mut summary = SuiteSummary {
        planned: plan.included.len() as u64,
        excluded: plan.excluded.len() as u64,
        ..SuiteSummary::default()
    };
    for tester in &catalog.testers {
        if !plan.included.iter().any(|id| id == tester.id()) {
            continue;
        }
        let mut subject = factory.create(size);
        let outcome = tester.run(&mut subject);
        match &outcome {
            TesterOutcome::Pass => summary.passed += 1,
            TesterOutcome::Fail { .. } => summary.failed += 1,
        }
        records.push(CaseRecord {
            tester_id: tester.id().to_string(),
            outcome,
        });
    }

    Ok(SuiteReport {
        schema: SUITE_SCHEMA_VERSION.to_string(),
        plan,
        records,
        summary,
    })
}

fn digest_json<T: Serialize>(value: &T) -> Result<String, SuiteError> {
    let bytes =
        serde_json::to_vec(value).map_err(|error| SuiteError::Serialization(error.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::{VecQueue, VecQueueFactory};
    use crate::testers::{
        QueueElementEmptyTester, QueueElementManyTester, QueueElementOneTester,
    };

    fn queue_catalog() -> TesterCatalog<VecQueue> {
        let mut catalog = TesterCatalog::new();
        catalog.register(Box::new(QueueElementEmptyTester)).unwrap();
        catalog.register(Box::new(QueueElementOneTester)).unwrap();
        catalog.register(Box::new(QueueElementManyTester)).unwrap();
        catalog
    }

    fn profile_of(size: CollectionSize) -> SubjectProfile {
        VecQueueFactory.create(size).profile()
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut catalog = queue_catalog();
        let error = catalog
            .register(Box::new(QueueElementEmptyTester))
            .unwrap_err();
        assert_eq!(error.stable_code(), ERROR_DUPLICATE_TESTER);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn plan_filters_by_size() {
        let catalog = queue_catalog();
        let plan = plan_suite(&catalog, &profile_of(CollectionSize::One));
        assert_eq!(plan.included, vec!["queue.element.one".to_string()]);
        assert_eq!(plan.excluded.len(), 2);
        for exclusion in &plan.excluded {
            assert!(matches!(
                exclusion.reason,
                ExclusionReason::SizeNotApplicable { .. }
            ));
        }
    }

    #[test]
    fn plan_reports_missing_features() {
        let catalog = queue_catalog();
        let mut profile = profile_of(CollectionSize::Several);
        profile.features.remove(&CollectionFeature::KnownOrder);
        let plan = plan_suite(&catalog, &profile);
        assert!(plan.included.is_empty());
        let many = plan
            .excluded
            .iter()
            .find(|exclusion| exclusion.tester_id == "queue.element.many")
            .unwrap();
        assert_eq!(
            many.reason,
            ExclusionReason::MissingFeatures {
                missing: [CollectionFeature::KnownOrder].into_iter().collect(),
            }
        );
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let catalog: TesterCatalog<VecQueue> = TesterCatalog::new();
        let error = run_suite(&catalog, &VecQueueFactory, CollectionSize::Zero).unwrap_err();
        assert_eq!(error.stable_code(), ERROR_EMPTY_CATALOG);
    }

    #[test]
    fn run_executes_only_planned_testers() {
        let catalog = queue_catalog();
        let report = run_suite(&catalog, &VecQueueFactory, CollectionSize::Zero).unwrap();
        assert_eq!(report.summary.planned, 1);
        assert_eq!(report.summary.passed, 1);
        assert_eq!(report.summary.failed, 0);
        assert_eq!(report.summary.excluded, 2);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].tester_id, "queue.element.empty");
        assert!(report.all_passed());
    }

    #[test]
    fn report_digest_is_stable_across_runs() {
        let catalog = queue_catalog();
        let first = run_suite(&catalog, &VecQueueFactory, CollectionSize::Several).unwrap();
        let second = run_suite(&catalog, &VecQueueFactory, CollectionSize::Several).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    }

    #[test]
    fn plan_digest_differs_across_sizes() {
        let catalog = queue_catalog();
        let zero = plan_suite(&catalog, &profile_of(CollectionSize::Zero));
        let one = plan_suite(&catalog, &profile_of(CollectionSize::One));
        assert_ne!(zero.digest().unwrap(), one.digest().unwrap());
    }

    #[test]
    fn report_serde_roundtrip() {
        let catalog = queue_catalog();
        let report = run_suite(&catalog, &VecQueueFactory, CollectionSize::One).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: SuiteReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}

//! Feature-gated conformance testing for collection implementations.
//!
//! A [`TesterCatalog`](suite::TesterCatalog) holds small test units, each
//! declaring the collection sizes and capabilities under which it is
//! meaningful. Suite construction is a pure filter: a tester is planned for a
//! concrete subject configuration iff its declared requirements are a subset
//! of what the configuration provides. Execution produces a deterministic,
//! digestable [`SuiteReport`](suite::SuiteReport).

#![forbid(unsafe_code)]

pub mod features;
pub mod subject;
pub mod suite;
pub mod testers;

pub use features::{CollectionFeature, CollectionSize, FeatureRequirement, SubjectProfile};
pub use subject::{
    CollectionSubject, ListSubject, MinimalSubject, QueueSubject, SubjectError, SubjectFactory,
};
pub use suite::{SuiteError, SuitePlan, SuiteReport, TesterCatalog, plan_suite, run_suite};
pub use testers::{Tester, TesterOutcome};

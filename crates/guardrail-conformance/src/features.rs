//! Static feature matrix used to gate tester applicability.
//!
//! Feature tags are metadata, evaluated once at suite-construction time; no
//! tag is ever consulted during test execution.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Collection size
// ---------------------------------------------------------------------------

/// Canonical subject sizes a tester can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionSize {
    Zero,
    One,
    Several,
}

impl CollectionSize {
    pub const ALL: &'static [CollectionSize] = &[
        CollectionSize::Zero,
        CollectionSize::One,
        CollectionSize::Several,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Several => "several",
        }
    }

    /// Number of sample elements a fixture of this size is seeded with.
    #[must_use]
    pub const fn element_count(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Several => 3,
        }
    }

    /// Size class of a concrete element count.
    #[must_use]
    pub const fn classify(len: usize) -> Self {
        match len {
            0 => Self::Zero,
            1 => Self::One,
            _ => Self::Several,
        }
    }
}

impl fmt::Display for CollectionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Capability features
// ---------------------------------------------------------------------------

/// Capabilities a subject configuration can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionFeature {
    /// Iteration order is defined and stable.
    KnownOrder,
    /// Elements can be added.
    SupportsInsert,
    /// Elements can be removed.
    SupportsRemove,
    /// Inserting a present element is a no-op.
    RejectsDuplicates,
    /// Values iterate in sorted order.
    SortedValues,
    /// Every mutation attempt is refused outright.
    RejectsMutation,
}

impl CollectionFeature {
    pub const ALL: &'static [CollectionFeature] = &[
        CollectionFeature::KnownOrder,
        CollectionFeature::SupportsInsert,
        CollectionFeature::SupportsRemove,
        CollectionFeature::RejectsDuplicates,
        CollectionFeature::SortedValues,
        CollectionFeature::RejectsMutation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KnownOrder => "known_order",
            Self::SupportsInsert => "supports_insert",
            Self::SupportsRemove => "supports_remove",
            Self::RejectsDuplicates => "rejects_duplicates",
            Self::SortedValues => "sorted_values",
            Self::RejectsMutation => "rejects_mutation",
        }
    }
}

impl fmt::Display for CollectionFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Subject profile and requirements
// ---------------------------------------------------------------------------

/// Concrete configuration under test: what one subject actually provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub subject_id: String,
    pub size: CollectionSize,
    pub features: BTreeSet<CollectionFeature>,
}

impl SubjectProfile {
    #[must_use]
    pub fn provides(&self, feature: CollectionFeature) -> bool {
        self.features.contains(&feature)
    }
}

/// Minimal requirements a tester declares. Empty `sizes` means any size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRequirement {
    pub sizes: BTreeSet<CollectionSize>,
    pub features: BTreeSet<CollectionFeature>,
}

impl FeatureRequirement {
    /// Requirement satisfied by every configuration.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_size(mut self, size: CollectionSize) -> Self {
        self.sizes.insert(size);
        self
    }

    #[must_use]
    pub fn with_feature(mut self, feature: CollectionFeature) -> Self {
        self.features.insert(feature);
        self
    }

    /// Subset filter: the declared sizes admit the profile's size, and the
    /// declared features are all provided.
    #[must_use]
    pub fn is_satisfied_by(&self, profile: &SubjectProfile) -> bool {
        (self.sizes.is_empty() || self.sizes.contains(&profile.size))
            && self.features.is_subset(&profile.features)
    }

    /// Features the profile is missing, empty when all are provided.
    #[must_use]
    pub fn missing_features(&self, profile: &SubjectProfile) -> BTreeSet<CollectionFeature> {
        self.features
            .difference(&profile.features)
            .copied()
            .collect()
    }
}

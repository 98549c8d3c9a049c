//! Patch descriptors.
//!
//! A descriptor is a self-contained, stateless unit of transformation: an
//! id, a predicate testing applicability, a transform, and a verifier. The
//! engine only talks to the [`Patch`] trait, so new descriptor kinds can be
//! registered without touching the engine. [`Descriptor`] is the declarative
//! implementation built from a [`Strategy`].

use crate::matching::Strategy;

/// A unit of transformation run by the engine.
///
/// Implementations must be pure: identical input produces identical output
/// on every call. Applying a patch twice to its own output is not assumed
/// to be safe.
pub trait Patch: Send + Sync {
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    /// Failure of a required patch aborts the whole run.
    fn required(&self) -> bool;

    /// Does the target pattern exist in `source`?
    fn can_apply(&self, source: &str) -> bool;

    /// Transform `source`. May return the input unchanged when a narrower
    /// sub-pattern is missing; [`verify`](Self::verify) catches that.
    fn apply(&self, source: &str) -> String;

    /// Did `apply` make a real change?
    fn verify(&self, before: &str, after: &str) -> bool {
        before != after
    }
}

/// Verification policy for a [`Descriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verification {
    /// The text changed.
    #[default]
    Changed,
    /// The text changed and now contains the marker.
    Contains(String),
}

impl Verification {
    pub fn check(&self, before: &str, after: &str) -> bool {
        match self {
            Verification::Changed => before != after,
            Verification::Contains(marker) => before != after && after.contains(marker.as_str()),
        }
    }
}

/// Declarative descriptor: metadata plus a matching strategy.
#[derive(Debug)]
pub struct Descriptor {
    id: String,
    description: String,
    required: bool,
    strategy: Strategy,
    verification: Verification,
}

impl Descriptor {
    /// Optional by default, verified by structural inequality.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        strategy: impl Into<Strategy>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            required: false,
            strategy: strategy.into(),
            verification: Verification::Changed,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn verified_by(mut self, verification: Verification) -> Self {
        self.verification = verification;
        self
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn verification(&self) -> &Verification {
        &self.verification
    }
}

impl Patch for Descriptor {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn required(&self) -> bool {
        self.required
    }

    fn can_apply(&self, source: &str) -> bool {
        self.strategy.can_apply(source)
    }

    fn apply(&self, source: &str) -> String {
        self.strategy.apply(source)
    }

    fn verify(&self, before: &str, after: &str) -> bool {
        self.verification.check(before, after)
    }
}

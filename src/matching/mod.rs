//! Matching strategies used by patch descriptors.
//!
//! Three techniques are available, each independently usable and testable:
//!
//! - [`LiteralStrategy`]: exact substring, single precise splice
//! - [`PatternStrategy`]: ordered regex rules, global or single replacement
//! - [`AnchorStrategy`]: stable marker, derived short identifiers, template
//!   synthesis, and a known-anchor fallback
//!
//! [`Strategy`] is the small interpreter a descriptor selects from. The
//! [`CustomStrategy`] variant covers transforms that are easier to write as
//! a pair of closures.

pub mod anchor;
pub mod literal;
pub mod pattern;

pub use anchor::{AnchorStrategy, KnownAnchor, Role, Window};
pub use literal::{Guard, LiteralEdit, LiteralStrategy};
pub use pattern::{PatternRule, PatternStrategy, Scope};

use std::fmt;

type Predicate = dyn Fn(&str) -> bool + Send + Sync;
type Transform = dyn Fn(&str) -> String + Send + Sync;

/// Matching technique selected by a descriptor.
#[derive(Debug)]
pub enum Strategy {
    Literal(LiteralStrategy),
    Pattern(PatternStrategy),
    Anchor(AnchorStrategy),
    Custom(CustomStrategy),
}

impl Strategy {
    /// Does the target exist in `source`? Never mutates.
    pub fn can_apply(&self, source: &str) -> bool {
        match self {
            Strategy::Literal(s) => s.can_apply(source),
            Strategy::Pattern(s) => s.can_apply(source),
            Strategy::Anchor(s) => s.can_apply(source),
            Strategy::Custom(s) => (s.can_apply)(source),
        }
    }

    /// Transform `source`. Returns the input unchanged when the narrower
    /// sub-pattern a strategy needs is missing.
    pub fn apply(&self, source: &str) -> String {
        match self {
            Strategy::Literal(s) => s.apply(source),
            Strategy::Pattern(s) => s.apply(source),
            Strategy::Anchor(s) => s.apply(source),
            Strategy::Custom(s) => (s.apply)(source),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Literal(_) => "literal",
            Strategy::Pattern(_) => "pattern",
            Strategy::Anchor(_) => "anchor",
            Strategy::Custom(_) => "custom",
        }
    }
}

impl From<LiteralStrategy> for Strategy {
    fn from(s: LiteralStrategy) -> Self {
        Strategy::Literal(s)
    }
}

impl From<PatternStrategy> for Strategy {
    fn from(s: PatternStrategy) -> Self {
        Strategy::Pattern(s)
    }
}

impl From<AnchorStrategy> for Strategy {
    fn from(s: AnchorStrategy) -> Self {
        Strategy::Anchor(s)
    }
}

impl From<CustomStrategy> for Strategy {
    fn from(s: CustomStrategy) -> Self {
        Strategy::Custom(s)
    }
}

/// Predicate and transform supplied as closures.
pub struct CustomStrategy {
    can_apply: Box<Predicate>,
    apply: Box<Transform>,
}

impl CustomStrategy {
    pub fn new(
        can_apply: impl Fn(&str) -> bool + Send + Sync + 'static,
        apply: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            can_apply: Box::new(can_apply),
            apply: Box::new(apply),
        }
    }
}

impl fmt::Debug for CustomStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomStrategy").finish_non_exhaustive()
    }
}

/// Largest char boundary `<= idx`.
pub(crate) fn floor_char_boundary(s: &str, idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    let mut i = idx;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= idx`.
pub(crate) fn ceil_char_boundary(s: &str, idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    let mut i = idx;
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Replace `[start, end)` of `source` with `insert`.
pub(crate) fn splice(source: &str, start: usize, end: usize, insert: &str) -> String {
    let mut out = String::with_capacity(source.len() - (end - start) + insert.len());
    out.push_str(&source[..start]);
    out.push_str(insert);
    out.push_str(&source[end..]);
    out
}

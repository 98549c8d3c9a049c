//! Exact-literal matching.
//!
//! Only one occurrence is ever edited. When the literal could also appear in
//! unrelated string or comment content, a [`Guard`] narrows the choice to the
//! first occurrence preceded by a structural prefix; without a guarded hit the
//! first occurrence is used.

use super::{floor_char_boundary, splice};

/// What to do at the located occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralEdit {
    Replace(String),
    InsertBefore(String),
    InsertAfter(String),
}

/// Structural prefix expected shortly before the literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub prefix: String,
    /// Max bytes allowed between the end of `prefix` and the literal.
    pub max_gap: usize,
}

impl Guard {
    fn precedes(&self, source: &str, idx: usize) -> bool {
        let lookback = self.prefix.len() + self.max_gap;
        let start = floor_char_boundary(source, idx.saturating_sub(lookback));
        source[start..idx].contains(self.prefix.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralStrategy {
    needle: String,
    edit: LiteralEdit,
    guard: Option<Guard>,
}

impl LiteralStrategy {
    pub fn new(needle: impl Into<String>, edit: LiteralEdit) -> Self {
        Self {
            needle: needle.into(),
            edit,
            guard: None,
        }
    }

    pub fn replace(needle: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new(needle, LiteralEdit::Replace(replacement.into()))
    }

    pub fn insert_before(needle: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(needle, LiteralEdit::InsertBefore(text.into()))
    }

    pub fn insert_after(needle: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(needle, LiteralEdit::InsertAfter(text.into()))
    }

    pub fn guarded_by(mut self, prefix: impl Into<String>, max_gap: usize) -> Self {
        self.guard = Some(Guard {
            prefix: prefix.into(),
            max_gap,
        });
        self
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn can_apply(&self, source: &str) -> bool {
        source.contains(self.needle.as_str())
    }

    /// Byte offset of the occurrence that [`apply`](Self::apply) would edit.
    pub fn locate(&self, source: &str) -> Option<usize> {
        let mut first = None;
        for (idx, _) in source.match_indices(self.needle.as_str()) {
            let guard = match &self.guard {
                None => return Some(idx),
                Some(guard) => guard,
            };
            if guard.precedes(source, idx) {
                return Some(idx);
            }
            first.get_or_insert(idx);
        }
        first
    }

    pub fn apply(&self, source: &str) -> String {
        let Some(start) = self.locate(source) else {
            return source.to_string();
        };
        let end = start + self.needle.len();

        match &self.edit {
            LiteralEdit::Replace(text) => splice(source, start, end, text),
            LiteralEdit::InsertBefore(text) => splice(source, start, start, text),
            LiteralEdit::InsertAfter(text) => splice(source, end, end, text),
        }
    }
}

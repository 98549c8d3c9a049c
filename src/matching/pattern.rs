//! Regular-expression matching.
//!
//! A [`PatternStrategy`] holds ordered [`PatternRule`]s. Capture groups in a
//! rule tolerate superficial variation (short identifier names around a
//! stable call or property shape) and may be referenced from the replacement
//! with `$1` / `${name}`.

use regex::Regex;
use std::borrow::Cow;

/// How many occurrences a rule rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Every occurrence; for constructs known to be uniform across the text.
    #[default]
    All,
    /// The first occurrence only; for context-sensitive targets.
    First,
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
    replacement: String,
    scope: Scope,
}

impl PatternRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            replacement: replacement.into(),
            scope: Scope::All,
        })
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn first(self) -> Self {
        self.with_scope(Scope::First)
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_match(&self, source: &str) -> bool {
        self.regex.is_match(source)
    }

    pub fn replace<'a>(&self, source: &'a str) -> Cow<'a, str> {
        match self.scope {
            Scope::All => self.regex.replace_all(source, self.replacement.as_str()),
            Scope::First => self.regex.replace(source, self.replacement.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternStrategy {
    rules: Vec<PatternRule>,
}

impl PatternStrategy {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// True when any rule matches.
    pub fn can_apply(&self, source: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(source))
    }

    /// Rules run in order; each sees the previous rule's output.
    pub fn apply(&self, source: &str) -> String {
        let mut text = source.to_string();
        for rule in &self.rules {
            text = rule.replace(&text).into_owned();
        }
        text
    }
}

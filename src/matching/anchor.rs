//! Semantic-anchor extraction with a known-anchor fallback.
//!
//! Minified builds reassign short identifiers on every release, so an
//! insertion that must call into surrounding code cannot be hard-coded.
//! Instead:
//!
//! 1. Find a stable marker (a domain literal that is never renamed).
//! 2. Take a window around it, narrower after the marker than before.
//! 3. Resolve each [`Role`]: a short generated identifier captured by a
//!    loose shape pattern inside the window.
//! 4. Render the template with the resolved identifiers and insert it after
//!    the known anchor, or after the statement boundary preceding the marker.
//! 5. If any role is unresolved or no insertion site exists, splice the
//!    hard-coded snippet recorded from a known-good build after the known
//!    anchor.
//! 6. Otherwise leave the input untouched.

use super::{ceil_char_boundary, floor_char_boundary, splice};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Byte radius searched around the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub before: usize,
    pub after: usize,
}

impl Window {
    pub const fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    /// Byte range around `at`, clamped to `source` and to char boundaries.
    pub fn range(&self, source: &str, at: usize) -> (usize, usize) {
        let start = floor_char_boundary(source, at.saturating_sub(self.before));
        let end = ceil_char_boundary(source, at.saturating_add(self.after));
        (start, end)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(2000, 500)
    }
}

/// A transient identifier with a structural role near the marker.
#[derive(Debug, Clone)]
pub struct Role {
    name: String,
    regex: Regex,
    reach: Option<usize>,
}

impl Role {
    /// `pattern` must contain at least one capture group; group 1 is the
    /// identifier.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
            reach: None,
        })
    }

    /// Search further past the marker than the strategy's window allows.
    pub fn reaching(mut self, after: usize) -> Self {
        self.reach = Some(after);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, source: &str, marker_at: usize, window: Window) -> Option<String> {
        let window = Window::new(window.before, self.reach.unwrap_or(window.after));
        let (start, end) = window.range(source, marker_at);
        self.regex
            .captures(&source[start..end])
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Exact snippet from a previously observed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownAnchor {
    pub anchor: String,
    /// Hard-coded insertion used when role extraction fails.
    pub fallback: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnchorStrategy {
    marker: String,
    window: Window,
    roles: Vec<Role>,
    template: String,
    known: Option<KnownAnchor>,
}

impl AnchorStrategy {
    pub fn new(marker: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            window: Window::default(),
            roles: Vec::new(),
            template: template.into(),
            known: None,
        }
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn known_anchor(mut self, anchor: impl Into<String>, fallback: Option<String>) -> Self {
        self.known = Some(KnownAnchor {
            anchor: anchor.into(),
            fallback,
        });
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn can_apply(&self, source: &str) -> bool {
        source.contains(self.marker.as_str()) || self.fallback_site(source).is_some()
    }

    pub fn apply(&self, source: &str) -> String {
        if let Some(patched) = self.try_semantic(source) {
            debug!(marker = %self.marker, "applied via semantic anchor");
            return patched;
        }
        if let Some(patched) = self.try_fallback(source) {
            debug!(marker = %self.marker, "applied via known anchor fallback");
            return patched;
        }
        warn!(marker = %self.marker, "no anchor strategy matched, leaving source unchanged");
        source.to_string()
    }

    /// Resolve every role around the first marker occurrence.
    ///
    /// Returns `None` if the marker is absent or any role is unresolved.
    pub fn extract(&self, source: &str) -> Option<BTreeMap<String, String>> {
        let marker_at = source.find(self.marker.as_str())?;
        let mut bindings = BTreeMap::new();
        for role in &self.roles {
            match role.resolve(source, marker_at, self.window) {
                Some(ident) => {
                    bindings.insert(role.name.clone(), ident);
                }
                None => {
                    debug!(marker = %self.marker, role = %role.name, "role not found near marker");
                    return None;
                }
            }
        }
        Some(bindings)
    }

    /// Substitute `{name}` placeholders in the template.
    pub fn render(&self, bindings: &BTreeMap<String, String>) -> String {
        bindings
            .iter()
            .fold(self.template.clone(), |acc, (name, ident)| {
                acc.replace(&format!("{{{name}}}"), ident)
            })
    }

    fn try_semantic(&self, source: &str) -> Option<String> {
        let bindings = self.extract(source)?;
        let insertion = self.render(&bindings);

        if let Some(known) = &self.known {
            if let Some(at) = source.find(known.anchor.as_str()) {
                let end = at + known.anchor.len();
                return Some(splice(source, end, end, &format!(";{insertion}")));
            }
        }

        // Start of the statement containing the marker.
        let marker_at = source.find(self.marker.as_str())?;
        let boundary = source[..marker_at].rfind(';')? + 1;
        Some(splice(source, boundary, boundary, &insertion))
    }

    fn fallback_site(&self, source: &str) -> Option<(usize, &str)> {
        let known = self.known.as_ref()?;
        let snippet = known.fallback.as_deref()?;
        let at = source.find(known.anchor.as_str())?;
        Some((at + known.anchor.len(), snippet))
    }

    fn try_fallback(&self, source: &str) -> Option<String> {
        let (end, snippet) = self.fallback_site(source)?;
        Some(splice(source, end, end, &format!(";{snippet}")))
    }
}

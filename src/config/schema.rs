use crate::descriptor::{Descriptor, Verification};
use crate::matching::{
    AnchorStrategy, LiteralEdit, LiteralStrategy, PatternRule, PatternStrategy, Role, Scope,
    Strategy, Window,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PatchSetConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub patches: Vec<PatchDefinition>,
}

impl PatchSetConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.patches.is_empty() {
            issues.push(ValidationIssue::EmptyPatchList);
        }

        let mut seen = HashSet::new();
        for patch in &self.patches {
            if patch.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    patch_id: None,
                    field: "id",
                });
            } else if !seen.insert(patch.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    patch_id: patch.id.clone(),
                });
            }
            patch.strategy.validate(&patch.id, &mut issues);
            if let Some(VerifyDefinition::Contains { expected }) = &patch.verify {
                if expected.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        patch_id: Some(patch.id.clone()),
                        field: "verify.expected",
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Compile every definition into a [`Descriptor`], preserving order.
    pub fn build(&self) -> Result<Vec<Descriptor>, ValidationError> {
        self.validate()?;
        self.patches
            .iter()
            .map(|patch| patch.build().map_err(|issue| ValidationError { issues: vec![issue] }))
            .collect()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PatchDefinition {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    pub strategy: StrategyDefinition,
    #[serde(default)]
    pub verify: Option<VerifyDefinition>,
}

impl PatchDefinition {
    pub fn build(&self) -> Result<Descriptor, ValidationIssue> {
        let strategy = self.strategy.build(&self.id)?;
        let verification = match &self.verify {
            None | Some(VerifyDefinition::Changed) => Verification::Changed,
            Some(VerifyDefinition::Contains { expected }) => {
                Verification::Contains(expected.clone())
            }
        };
        Ok(
            Descriptor::new(self.id.clone(), self.description.clone(), strategy)
                .with_required(self.required)
                .verified_by(verification),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StrategyDefinition {
    /// Exact substring; one occurrence is edited
    Literal {
        search: String,
        #[serde(default)]
        replace: Option<String>,
        #[serde(default)]
        insert_before: Option<String>,
        #[serde(default)]
        insert_after: Option<String>,
        #[serde(default)]
        guard: Option<String>,
        #[serde(default = "default_guard_gap")]
        guard_gap: usize,
    },
    Pattern {
        #[serde(default)]
        rules: Vec<RuleDefinition>,
    },
    Anchor {
        marker: String,
        #[serde(default = "default_before")]
        before: usize,
        #[serde(default = "default_after")]
        after: usize,
        #[serde(default)]
        roles: Vec<RoleDefinition>,
        template: String,
        #[serde(default)]
        known_anchor: Option<String>,
        #[serde(default)]
        fallback_snippet: Option<String>,
    },
}

fn default_guard_gap() -> usize {
    5
}

fn default_before() -> usize {
    Window::default().before
}

fn default_after() -> usize {
    Window::default().after
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub scope: ScopeDefinition,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeDefinition {
    #[default]
    All,
    First,
}

impl From<ScopeDefinition> for Scope {
    fn from(scope: ScopeDefinition) -> Self {
        match scope {
            ScopeDefinition::All => Scope::All,
            ScopeDefinition::First => Scope::First,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoleDefinition {
    pub name: String,
    pub pattern: String,
    /// Forward reach past the marker, overriding the strategy window
    #[serde(default)]
    pub after: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum VerifyDefinition {
    Changed,
    Contains { expected: String },
}

impl StrategyDefinition {
    fn validate(&self, patch_id: &str, issues: &mut Vec<ValidationIssue>) {
        let missing = |field: &'static str| ValidationIssue::MissingField {
            patch_id: Some(patch_id.to_string()),
            field,
        };
        let combo = |message: &str| ValidationIssue::InvalidCombo {
            patch_id: Some(patch_id.to_string()),
            message: message.to_string(),
        };

        match self {
            StrategyDefinition::Literal {
                search,
                replace,
                insert_before,
                insert_after,
                guard,
                ..
            } => {
                if search.is_empty() {
                    issues.push(missing("strategy.search"));
                }
                let modes = [replace, insert_before, insert_after]
                    .iter()
                    .filter(|m| m.is_some())
                    .count();
                if modes != 1 {
                    issues.push(combo(
                        "literal strategy needs exactly one of replace, insert_before, insert_after",
                    ));
                }
                if guard.as_deref() == Some("") {
                    issues.push(missing("strategy.guard"));
                }
            }
            StrategyDefinition::Pattern { rules } => {
                if rules.is_empty() {
                    issues.push(missing("strategy.rules"));
                }
                for rule in rules {
                    if let Err(e) = Regex::new(&rule.pattern) {
                        issues.push(ValidationIssue::InvalidPattern {
                            patch_id: patch_id.to_string(),
                            pattern: rule.pattern.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            StrategyDefinition::Anchor {
                marker,
                roles,
                template,
                known_anchor,
                fallback_snippet,
                ..
            } => {
                if marker.is_empty() {
                    issues.push(missing("strategy.marker"));
                }
                if template.is_empty() {
                    issues.push(missing("strategy.template"));
                }
                if fallback_snippet.is_some() && known_anchor.is_none() {
                    issues.push(combo("fallback_snippet requires known_anchor"));
                }
                let mut names = HashSet::new();
                for role in roles {
                    if role.name.trim().is_empty() {
                        issues.push(missing("strategy.roles.name"));
                    } else if !names.insert(role.name.as_str()) {
                        issues.push(combo(&format!("duplicate role name '{}'", role.name)));
                    }
                    match Regex::new(&role.pattern) {
                        Ok(re) if re.captures_len() < 2 => {
                            issues.push(combo(&format!(
                                "role '{}' pattern needs a capture group",
                                role.name
                            )));
                        }
                        Ok(_) => {}
                        Err(e) => issues.push(ValidationIssue::InvalidPattern {
                            patch_id: patch_id.to_string(),
                            pattern: role.pattern.clone(),
                            message: e.to_string(),
                        }),
                    }
                }
            }
        }
    }

    fn build(&self, patch_id: &str) -> Result<Strategy, ValidationIssue> {
        let invalid = |pattern: &str, e: regex::Error| ValidationIssue::InvalidPattern {
            patch_id: patch_id.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        };

        match self {
            StrategyDefinition::Literal {
                search,
                replace,
                insert_before,
                insert_after,
                guard,
                guard_gap,
            } => {
                let edit = match (replace, insert_before, insert_after) {
                    (Some(text), None, None) => LiteralEdit::Replace(text.clone()),
                    (None, Some(text), None) => LiteralEdit::InsertBefore(text.clone()),
                    (None, None, Some(text)) => LiteralEdit::InsertAfter(text.clone()),
                    _ => {
                        return Err(ValidationIssue::InvalidCombo {
                            patch_id: Some(patch_id.to_string()),
                            message: "literal strategy needs exactly one edit mode".to_string(),
                        })
                    }
                };
                let mut literal = LiteralStrategy::new(search.clone(), edit);
                if let Some(prefix) = guard {
                    literal = literal.guarded_by(prefix.clone(), *guard_gap);
                }
                Ok(literal.into())
            }
            StrategyDefinition::Pattern { rules } => {
                let rules = rules
                    .iter()
                    .map(|rule| {
                        PatternRule::new(&rule.pattern, rule.replacement.clone())
                            .map(|r| r.with_scope(rule.scope.into()))
                            .map_err(|e| invalid(&rule.pattern, e))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PatternStrategy::new(rules).into())
            }
            StrategyDefinition::Anchor {
                marker,
                before,
                after,
                roles,
                template,
                known_anchor,
                fallback_snippet,
            } => {
                let mut anchor = AnchorStrategy::new(marker.clone(), template.clone())
                    .with_window(Window::new(*before, *after));
                for def in roles {
                    let mut role =
                        Role::new(def.name.clone(), &def.pattern).map_err(|e| invalid(&def.pattern, e))?;
                    if let Some(reach) = def.after {
                        role = role.reaching(reach);
                    }
                    anchor = anchor.role(role);
                }
                if let Some(known) = known_anchor {
                    anchor = anchor.known_anchor(known.clone(), fallback_snippet.clone());
                }
                Ok(anchor.into())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyPatchList,
    MissingField {
        patch_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        patch_id: String,
    },
    InvalidPattern {
        patch_id: String,
        pattern: String,
        message: String,
    },
    InvalidCombo {
        patch_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyPatchList => write!(f, "patch set contains no patches"),
            ValidationIssue::MissingField { patch_id, field } => match patch_id {
                Some(id) => write!(f, "patch '{id}' missing required field '{field}'"),
                None => write!(f, "patch missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { patch_id } => {
                write!(f, "patch id '{patch_id}' is defined more than once")
            }
            ValidationIssue::InvalidPattern {
                patch_id,
                pattern,
                message,
            } => write!(
                f,
                "patch '{patch_id}' has invalid pattern '{pattern}': {message}"
            ),
            ValidationIssue::InvalidCombo { patch_id, message } => match patch_id {
                Some(id) => write!(f, "patch '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid patch configuration: {message}"),
            },
        }
    }
}

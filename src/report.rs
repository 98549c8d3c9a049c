//! Per-run patch outcomes.
//!
//! A [`RunOutcome`] is created fresh for every engine invocation and holds
//! exactly one [`PatchOutcome`] per registered patch, in registry order.

use serde::Serialize;
use std::fmt;

/// Reason recorded when a patch's target pattern is absent.
pub const REASON_NOT_FOUND: &str = "pattern not found";
/// Reason recorded when an optional patch ran but changed nothing.
pub const REASON_NO_EFFECT: &str = "no effect";
/// Reason recorded when a required patch ran but failed verification.
pub const REASON_VERIFY_FAILED: &str = "verification failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatchStatus {
    Ok,
    Skipped,
    Failed,
}

impl PatchStatus {
    /// Short tag used in debug reports.
    pub fn tag(self) -> &'static str {
        match self {
            PatchStatus::Ok => "[OK]",
            PatchStatus::Skipped => "[SKIP]",
            PatchStatus::Failed => "[FAIL]",
        }
    }
}

impl fmt::Display for PatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchStatus::Ok => write!(f, "OK"),
            PatchStatus::Skipped => write!(f, "SKIPPED"),
            PatchStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Outcome of a single patch within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOutcome {
    pub id: String,
    pub status: PatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PatchOutcome {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: PatchStatus::Ok,
            reason: None,
        }
    }

    pub fn skipped(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: PatchStatus::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: PatchStatus::Failed,
            reason: Some(reason.into()),
        }
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.tag(), self.id)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// A required patch that could not be established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchFailure {
    pub id: String,
    pub reason: String,
}

/// What a caller gets back from [`crate::PatchEngine::apply_patches`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub skipped_via_cache: bool,
    pub results: Vec<PatchOutcome>,
}

impl RunOutcome {
    pub(crate) fn cached() -> Self {
        Self {
            skipped_via_cache: true,
            results: Vec::new(),
        }
    }

    pub fn count(&self, status: PatchStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn get(&self, id: &str) -> Option<&PatchOutcome> {
        self.results.iter().find(|r| r.id == id)
    }
}

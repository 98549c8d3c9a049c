//! Patch engine - folds the registry over the input and persists the result
//!
//! This module provides the orchestration that:
//! - Skips all work when the input digest matches the cached sidecar
//! - Runs every patch strictly in registry order, each on the previous output
//! - Records one outcome per patch, whether it is required or optional
//! - Aborts without writing anything if any required patch failed
//! - Writes the output atomically, then records the input digest

use crate::cache;
use crate::persist::{ArtifactStore, FsStore};
use crate::registry::PatchRegistry;
use crate::report::{
    PatchFailure, PatchOutcome, RunOutcome, REASON_NOT_FOUND, REASON_NO_EFFECT,
    REASON_VERIFY_FAILED,
};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Failure reason for a required patch whose target is absent.
pub const FAILURE_NOT_FOUND: &str = "Target pattern not found in source";
/// Failure reason for a required patch that ran without effect.
pub const FAILURE_VERIFY: &str = "Patch applied but verification failed";

pub const DEFAULT_GUIDANCE: &str = "The upstream bundle may have changed shape since these patches were written.\nReport the incompatibility to the patch set maintainers, including the upstream version.";

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Required patch(es) failed:\n{}", format_failures(.failures))]
    RequiredPatchesFailed {
        failures: Vec<PatchFailure>,
        guidance: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    /// Remediation text for the user, if any.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            EngineError::RequiredPatchesFailed { guidance, .. } => Some(guidance),
            EngineError::Io { .. } => None,
        }
    }

    pub fn failures(&self) -> &[PatchFailure] {
        match self {
            EngineError::RequiredPatchesFailed { failures, .. } => failures,
            EngineError::Io { .. } => &[],
        }
    }
}

fn format_failures(failures: &[PatchFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {}: {}", f.id, f.reason))
        .collect::<Vec<_>>()
        .join("\n")
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> EngineError + '_ {
    move |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Result of folding the registry over one input, before any persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub text: String,
    pub results: Vec<PatchOutcome>,
    pub failures: Vec<PatchFailure>,
}

impl Fold {
    /// True when every required patch was established.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct PatchEngine<S = FsStore> {
    registry: PatchRegistry,
    store: S,
    guidance: String,
}

impl PatchEngine<FsStore> {
    pub fn new(registry: PatchRegistry) -> Self {
        Self::with_store(registry, FsStore)
    }
}

impl<S: ArtifactStore> PatchEngine<S> {
    pub fn with_store(registry: PatchRegistry, store: S) -> Self {
        Self {
            registry,
            store,
            guidance: DEFAULT_GUIDANCE.to_string(),
        }
    }

    /// Replace the remediation text carried by fatal failures.
    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.guidance = guidance.into();
        self
    }

    pub fn registry(&self) -> &PatchRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fold every patch over `input` in registry order. Pure; touches no files.
    pub fn run(&self, input: &str) -> Fold {
        let mut text = input.to_string();
        let mut results = Vec::with_capacity(self.registry.len());
        let mut failures = Vec::new();

        for patch in self.registry.iter() {
            let id = patch.id();

            if !patch.can_apply(&text) {
                if patch.required() {
                    failures.push(PatchFailure {
                        id: id.to_string(),
                        reason: FAILURE_NOT_FOUND.to_string(),
                    });
                    results.push(PatchOutcome::failed(id, REASON_NOT_FOUND));
                } else {
                    results.push(PatchOutcome::skipped(id, REASON_NOT_FOUND));
                }
                continue;
            }

            let candidate = patch.apply(&text);

            if patch.verify(&text, &candidate) {
                text = candidate;
                results.push(PatchOutcome::ok(id));
            } else if patch.required() {
                failures.push(PatchFailure {
                    id: id.to_string(),
                    reason: FAILURE_VERIFY.to_string(),
                });
                results.push(PatchOutcome::failed(id, REASON_VERIFY_FAILED));
            } else {
                results.push(PatchOutcome::skipped(id, REASON_NO_EFFECT));
            }
        }

        debug!("--- Patch Report ---");
        for outcome in &results {
            debug!("  {outcome}");
        }
        debug!("--------------------");

        Fold {
            text,
            results,
            failures,
        }
    }

    /// Patch `input` and persist the result at `output`.
    ///
    /// On a cache hit nothing runs and nothing is written. On any required
    /// failure nothing is written and the previous output, if any, is left
    /// as it was.
    pub fn apply_patches(&self, input: &str, output: &Path) -> Result<RunOutcome, EngineError> {
        let input_digest = cache::digest(input);
        let sidecar = cache::sidecar_path(output);

        if cache::lookup(&self.store, output, &input_digest).map_err(io_error(&sidecar))? {
            info!(output = %output.display(), "source hash matches cache, skipping re-patching");
            return Ok(RunOutcome::cached());
        }

        let fold = self.run(input);

        if !fold.is_success() {
            return Err(EngineError::RequiredPatchesFailed {
                failures: fold.failures,
                guidance: self.guidance.clone(),
            });
        }

        cache::invalidate(&self.store, output).map_err(io_error(&sidecar))?;
        self.store
            .write_atomic(output, fold.text.as_bytes())
            .map_err(io_error(output))?;
        cache::record(&self.store, output, &input_digest).map_err(io_error(&sidecar))?;

        info!(output = %output.display(), "patched output written");
        Ok(RunOutcome {
            skipped_via_cache: false,
            results: fold.results,
        })
    }

    /// Read the upstream text from `input_path`, then [`apply_patches`](Self::apply_patches).
    pub fn apply_file(&self, input_path: &Path, output: &Path) -> Result<RunOutcome, EngineError> {
        let input = self
            .store
            .read_to_string(input_path)
            .map_err(io_error(input_path))?;
        self.apply_patches(&input, output)
    }
}

//! Bundle Patcher: deterministic patch engine for minified JavaScript bundles
//!
//! Takes one upstream bundle as text, folds an ordered registry of patch
//! descriptors over it, and persists the result together with a digest of
//! the input so unchanged upstreams are not re-patched.
//!
//! # Architecture
//!
//! Every descriptor is a [`Patch`]: an id, an applicability predicate, a
//! pure transform, and a verifier. Declarative descriptors select one of
//! three matching strategies from [`matching`]:
//!
//! - literal substring with an optional guard prefix
//! - regex rules, global or first-only
//! - semantic anchor: stable marker, derived identifiers, template
//!   synthesis, known-anchor fallback
//!
//! The [`PatchEngine`] owns sequencing, failure policy, caching, and
//! persistence. Patches never touch the filesystem.
//!
//! # Safety
//!
//! - Required patch failures abort the run before anything is written
//! - Atomic output writes (tempfile + fsync + rename)
//! - The digest sidecar is written only after the output is in place
//!
//! # Example
//!
//! ```no_run
//! use bundle_patcher::{PatchEngine, PatchRegistry};
//! use std::path::Path;
//!
//! let engine = PatchEngine::new(PatchRegistry::builtin());
//! let input = std::fs::read_to_string("cli.js").unwrap();
//!
//! match engine.apply_patches(&input, Path::new("cli.patched.js")) {
//!     Ok(outcome) => println!("{} patches reported", outcome.results.len()),
//!     Err(e) => eprintln!("Patching failed: {}", e),
//! }
//! ```

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod matching;
pub mod patches;
pub mod persist;
pub mod registry;
pub mod report;

// Re-exports
pub use config::{load_descriptors, load_from_path, load_from_str, ConfigError, PatchSetConfig};
pub use descriptor::{Descriptor, Patch, Verification};
pub use engine::{EngineError, Fold, PatchEngine};
pub use matching::{
    AnchorStrategy, CustomStrategy, LiteralStrategy, PatternRule, PatternStrategy, Role, Strategy,
};
pub use persist::{ArtifactStore, FsStore, StagedFile};
pub use registry::{PatchRegistry, RegistryError};
pub use report::{PatchFailure, PatchOutcome, PatchStatus, RunOutcome};

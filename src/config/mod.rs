//! Declarative patch sets loaded from TOML.

pub mod loader;
pub mod schema;

pub use loader::{
    discover, load_descriptors, load_dir, load_from_path, load_from_str, ConfigError,
};
pub use schema::{
    Metadata, PatchDefinition, PatchSetConfig, RoleDefinition, RuleDefinition, ScopeDefinition,
    StrategyDefinition, ValidationError, ValidationIssue, VerifyDefinition,
};

//! Built-in patch set, in application order.

mod auto_updater;
mod internet_access;
mod is_docker;
mod loading_messages;
mod plan_autoaccept;
mod punycode;
mod root_check;

use crate::descriptor::Descriptor;
use crate::matching::PatternRule;

pub use loading_messages::SPINNER_VERBS;
pub use plan_autoaccept::{FALLBACK_SNIPPET, KNOWN_ANCHOR, MARKER};

/// Every built-in descriptor. Order is significant.
pub fn builtin() -> Vec<Descriptor> {
    vec![
        is_docker::descriptor(),
        internet_access::descriptor(),
        root_check::descriptor(),
        punycode::descriptor(),
        plan_autoaccept::descriptor(),
        loading_messages::descriptor(),
        auto_updater::descriptor(),
    ]
}

/// Compile a built-in rule. The patterns are literals in this module tree.
fn rule(pattern: &str, replacement: &str) -> PatternRule {
    PatternRule::new(pattern, replacement).expect("built-in pattern must compile")
}

use crate::descriptor::Descriptor;
use crate::matching::{AnchorStrategy, Role, Window};

/// Stable property name; never minified.
pub const MARKER: &str = "isBypassPermissionsModeAvailable";

/// Statement from a known-good build, used as the preferred insertion site.
pub const KNOWN_ANCHOR: &str = "let M=Md(),R=M?oH(M):null";

/// Insertion recorded from the same build, used when role extraction fails.
pub const FALLBACK_SNIPPET: &str = r#"k5.useEffect(()=>{if(G.toolPermissionContext.isBypassPermissionsModeAvailable&&!F){N("yes-bypass-permissions")}},[]);"#;

const TEMPLATE: &str = r#"{react}.useEffect(()=>{if({context}.toolPermissionContext.isBypassPermissionsModeAvailable&&!F){{submit}("yes-bypass-permissions")}},[]);"#;

pub(super) fn descriptor() -> Descriptor {
    let strategy = AnchorStrategy::new(MARKER, TEMPLATE)
        .with_window(Window::new(2000, 500))
        // React import alias, e.g. `k5.useEffect(`
        .role(role("react", r"((?-u:\w){1,3})\.useEffect\("))
        // Object exposing the permission context, e.g. `G.toolPermissionContext`
        .role(role("context", r"((?-u:\w)+)\.toolPermissionContext"))
        // Dispatcher for the plan-accept action; may sit well after the marker.
        .role(role("submit", r#"((?-u:\w)+)\(["']yes-bypass-permissions["']\)"#).reaching(2000))
        .known_anchor(KNOWN_ANCHOR, Some(FALLBACK_SNIPPET.to_string()));

    Descriptor::new(
        "plan-autoaccept",
        "Auto-accept plan mode when bypass permissions is available",
        strategy,
    )
}

fn role(name: &str, pattern: &str) -> Role {
    Role::new(name, pattern).expect("built-in role pattern must compile")
}

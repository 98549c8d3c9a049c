use super::rule;
use crate::descriptor::Descriptor;
use crate::matching::PatternStrategy;

// Targeted module-specifier shapes rather than every "punycode" string.
pub(super) fn descriptor() -> Descriptor {
    Descriptor::new(
        "punycode",
        "Add trailing slash to punycode imports (Node.js deprecation fix)",
        PatternStrategy::new(vec![
            rule(r#"require\("punycode"\)"#, r#"require("punycode/")"#),
            rule(r#"from "punycode""#, r#"from "punycode/""#),
            rule(r#"import "punycode""#, r#"import "punycode/""#),
        ]),
    )
}

use crate::descriptor::Descriptor;
use crate::matching::LiteralStrategy;

// The auto-updater disable check returns a reason string for the first
// matching env var:
//   function XX(){if(_6(process.env.DISABLE_AUTOUPDATER))return"DISABLE_AUTOUPDATER set";...return null}
// Function names move between builds; the string literals do not.
const SEARCH: &str = r#"process.env.DISABLE_AUTOUPDATER))return"DISABLE_AUTOUPDATER set""#;

const REPLACE: &str = concat!(
    r#"process.env.DISABLE_INSTALLATION_CHECKS))return"DISABLE_INSTALLATION_CHECKS set";"#,
    r#"if(_6(process.env.DISABLE_AUTOUPDATER))return"DISABLE_AUTOUPDATER set""#,
);

// Only the occurrence inside the function body, not copies in strings.
const GUARD: &str = "if(_6(";

pub(super) fn descriptor() -> Descriptor {
    Descriptor::new(
        "auto-updater",
        "Disable auto-updater when DISABLE_INSTALLATION_CHECKS is set",
        LiteralStrategy::replace(SEARCH, REPLACE).guarded_by(GUARD, 5),
    )
}

use super::rule;
use crate::descriptor::Descriptor;
use crate::matching::PatternStrategy;

// Two call shapes across upstream builds:
//   x3.getIsDocker()   inline call
//   getIsDocker:jG9    property in an object literal
pub(super) fn descriptor() -> Descriptor {
    Descriptor::new(
        "is-docker",
        "Replace getIsDocker() calls/references with true",
        PatternStrategy::new(vec![
            rule(r"[a-zA-Z0-9_]*\.getIsDocker\(\)", "true"),
            rule(r"getIsDocker:(?-u:\w)+", "getIsDocker:()=>true"),
        ]),
    )
    .with_required(true)
}

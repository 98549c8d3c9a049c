use super::rule;
use crate::descriptor::Descriptor;
use crate::matching::PatternStrategy;

pub(super) fn descriptor() -> Descriptor {
    Descriptor::new(
        "root-check",
        "Replace all getuid/geteuid === 0 checks with false",
        PatternStrategy::new(vec![
            rule(r"process\.getuid\(\)\s*===\s*0", "false"),
            rule(r"process\.getuid\?\.\(\)\s*===\s*0", "false"),
            rule(r"((?-u:\w)+)\.getuid\(\)\s*===\s*0", "false"),
            rule(r"process\.geteuid\(\)\s*===\s*0", "false"),
            rule(r"process\.geteuid\?\.\(\)\s*===\s*0", "false"),
        ]),
    )
    .with_required(true)
}

use super::rule;
use crate::descriptor::Descriptor;
use crate::matching::PatternStrategy;

pub(super) fn descriptor() -> Descriptor {
    Descriptor::new(
        "internet-access",
        "Replace hasInternetAccess() calls/references with false",
        PatternStrategy::new(vec![
            rule(r"[a-zA-Z0-9_]*\.hasInternetAccess\(\)", "false"),
            rule(r"hasInternetAccess:(?-u:\w)+", "hasInternetAccess:()=>false"),
        ]),
    )
    .with_required(true)
}

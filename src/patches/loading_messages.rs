use crate::descriptor::Descriptor;
use crate::matching::CustomStrategy;

/// Spinner verbs exactly as serialized in the upstream bundle.
pub const SPINNER_VERBS: &str = r#"["Accomplishing","Actioning","Actualizing","Baking","Brewing","Calculating","Cerebrating","Churning","Clauding","Coalescing","Cogitating","Computing","Conjuring","Considering","Cooking","Crafting","Creating","Crunching","Deliberating","Determining","Doing","Effecting","Finagling","Forging","Forming","Generating","Hatching","Herding","Honking","Hustling","Ideating","Inferring","Manifesting","Marinating","Moseying","Mulling","Mustering","Musing","Noodling","Percolating","Pondering","Processing","Puttering","Reticulating","Ruminating","Schlepping","Shucking","Simmering","Smooshing","Spinning","Stewing","Synthesizing","Thinking","Transmuting","Vibing","Working"]"#;

const RESET: &str = "\x1b[0m";

// Suffix i % len goes on verb i, so the output is stable across runs.
const SUFFIXES: [(&str, &str); 4] = [
    ("\x1b[31m", "safety's off, hold on tight"),
    ("\x1b[33m", "all gas, no brakes, lfg"),
    ("\x1b[1m\x1b[35m", "unleashed mode"),
    ("\x1b[36m", "dangerous mode! I guess you can just do things"),
];

pub(super) fn descriptor() -> Descriptor {
    Descriptor::new(
        "loading-messages",
        "Replace loading messages with themed versions",
        CustomStrategy::new(|source| source.contains(SPINNER_VERBS), rewrite),
    )
}

fn rewrite(source: &str) -> String {
    match themed_verbs() {
        Some(themed) => source.replacen(SPINNER_VERBS, &themed, 1),
        None => source.to_string(),
    }
}

fn themed_verbs() -> Option<String> {
    let verbs: Vec<String> = serde_json::from_str(SPINNER_VERBS).ok()?;
    let themed: Vec<String> = verbs
        .iter()
        .enumerate()
        .map(|(i, verb)| {
            let (color, text) = SUFFIXES[i % SUFFIXES.len()];
            format!("{verb} {color}({text}){RESET}")
        })
        .collect();
    serde_json::to_string(&themed).ok()
}

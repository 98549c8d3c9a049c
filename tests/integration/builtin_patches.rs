//! The built-in registry against a mock upstream bundle.

use super::support::mock_bundle;
use bundle_patcher::patches::{FALLBACK_SNIPPET, KNOWN_ANCHOR, SPINNER_VERBS};
use bundle_patcher::report::{REASON_NOT_FOUND, REASON_NO_EFFECT};
use bundle_patcher::{PatchEngine, PatchOutcome, PatchRegistry, PatchStatus};
use std::fs;
use tempfile::TempDir;

fn engine() -> PatchEngine {
    PatchEngine::new(PatchRegistry::builtin())
}

#[test]
fn test_every_builtin_applies_to_mock_bundle() {
    let fold = engine().run(&mock_bundle());

    assert!(fold.is_success(), "{:?}", fold.failures);
    for outcome in &fold.results {
        assert_eq!(outcome.status, PatchStatus::Ok, "{outcome}");
    }
    assert_eq!(fold.results.len(), 7);
}

#[test]
fn test_builtin_output_shape() {
    let patched = engine().run(&mock_bundle()).text;

    assert!(patched.contains("function a(){return true}"));
    assert!(patched.contains("hasInternetAccess:()=>false"));
    assert!(patched.contains("if(!false)"));
    assert!(patched.contains("if(false)throw"));
    assert!(patched.contains(r#"require("punycode/")"#));
    assert!(patched.contains(&format!("{KNOWN_ANCHOR};{FALLBACK_SNIPPET}")));
    assert!(!patched.contains(SPINNER_VERBS));
    assert!(patched.contains(r#"return"DISABLE_INSTALLATION_CHECKS set";if(_6(process.env.DISABLE_AUTOUPDATER))"#));
    assert!(!patched.contains("getIsDocker"));
    assert!(!patched.contains("getuid"));
}

#[test]
fn test_minimal_required_targets_skip_optionals() {
    let source = "a.getIsDocker();b.hasInternetAccess();if(process.geteuid() === 0)x()";
    let fold = engine().run(source);

    assert!(fold.is_success());
    assert_eq!(fold.text, "true;false;if(false)x()");
    assert_eq!(
        &fold.results[3..],
        &[
            PatchOutcome::skipped("punycode", REASON_NOT_FOUND),
            PatchOutcome::skipped("plan-autoaccept", REASON_NOT_FOUND),
            PatchOutcome::skipped("loading-messages", REASON_NOT_FOUND),
            PatchOutcome::skipped("auto-updater", REASON_NOT_FOUND),
        ]
    );
}

#[test]
fn test_missing_required_targets_all_reported() {
    let source = "a.getIsDocker()";
    let fold = engine().run(source);

    let failed: Vec<_> = fold.failures.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(failed, vec!["internet-access", "root-check"]);
    assert_eq!(fold.results.len(), 7);
}

#[test]
fn test_plan_autoaccept_marker_without_resolution_is_skipped() {
    let source = "a.getIsDocker();b.hasInternetAccess();process.getuid()===0;\
                  function t(){return isBypassPermissionsModeAvailable}";
    let fold = engine().run(source);

    assert!(fold.is_success());
    assert_eq!(
        fold.results[4],
        PatchOutcome::skipped("plan-autoaccept", REASON_NO_EFFECT)
    );
}

#[test]
fn test_plan_autoaccept_semantic_names_follow_the_build() {
    let source = [
        "a.getIsDocker()",
        "b.hasInternetAccess()",
        "process.getuid()===0",
        "zR.useEffect(()=>{},[])",
        "ctx.toolPermissionContext.isBypassPermissionsModeAvailable",
        r#"dispatch("yes-bypass-permissions")"#,
    ]
    .join(";");
    let patched = engine().run(&source).text;

    assert!(patched.contains(
        r#"zR.useEffect(()=>{if(ctx.toolPermissionContext.isBypassPermissionsModeAvailable&&!F){dispatch("yes-bypass-permissions")}},[]);ctx.toolPermissionContext"#
    ));
}

#[test]
fn test_full_pipeline_writes_then_hits_cache() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let bundle = mock_bundle();

    let first = engine().apply_patches(&bundle, &output).unwrap();
    let written = fs::read_to_string(&output).unwrap();
    let second = engine().apply_patches(&bundle, &output).unwrap();

    assert_eq!(first.count(PatchStatus::Ok), 7);
    assert!(second.skipped_via_cache);
    assert_eq!(fs::read_to_string(&output).unwrap(), written);
    assert_eq!(written, engine().run(&bundle).text);
}

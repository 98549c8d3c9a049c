//! End-to-end engine behaviour against real files.

use super::support::{Event, RecordingStore};
use bundle_patcher::cache::{digest, sidecar_path};
use bundle_patcher::engine::{FAILURE_NOT_FOUND, FAILURE_VERIFY};
use bundle_patcher::report::REASON_NOT_FOUND;
use bundle_patcher::{
    CustomStrategy, Descriptor, EngineError, LiteralStrategy, PatchEngine, PatchOutcome,
    PatchRegistry, PatchStatus, PatternRule, PatternStrategy,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn registry(patches: Vec<Descriptor>) -> PatchRegistry {
    let mut registry = PatchRegistry::new();
    registry.extend(patches).unwrap();
    registry
}

fn is_docker() -> Descriptor {
    Descriptor::new(
        "is-docker",
        "call shape to true",
        PatternStrategy::new(vec![
            PatternRule::new(r"[a-zA-Z0-9_]*\.getIsDocker\(\)", "true").unwrap()
        ]),
    )
    .with_required(true)
}

fn internet_access() -> Descriptor {
    Descriptor::new(
        "internet-access",
        "every call to false",
        PatternStrategy::new(vec![
            PatternRule::new(r"[a-zA-Z0-9_]*\.hasInternetAccess\(\)", "false").unwrap(),
        ]),
    )
    .with_required(true)
}

fn loading_messages() -> Descriptor {
    Descriptor::new(
        "loading-messages",
        "optional, absent from small inputs",
        LiteralStrategy::replace(r#"["Accomplishing","Actioning"]"#, "[]"),
    )
}

fn recording_engine(patches: Vec<Descriptor>) -> PatchEngine<RecordingStore> {
    PatchEngine::with_store(registry(patches), RecordingStore::default())
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_scenario_exact_call_shape() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![is_docker()]));

    let outcome = engine.apply_patches("x3.getIsDocker()", &output).unwrap();

    assert_eq!(read(&output), "true");
    assert_eq!(outcome.results, vec![PatchOutcome::ok("is-docker")]);
}

#[test]
fn test_scenario_global_replace() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![internet_access()]));

    engine
        .apply_patches("y.hasInternetAccess();z.hasInternetAccess()", &output)
        .unwrap();

    assert_eq!(read(&output), "false;false");
}

#[test]
fn test_scenario_optional_absent_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![loading_messages()]));

    let outcome = engine.apply_patches("function a(){}", &output).unwrap();

    assert_eq!(read(&output), "function a(){}");
    assert_eq!(
        outcome.results,
        vec![PatchOutcome::skipped("loading-messages", REASON_NOT_FOUND)]
    );
}

#[test]
fn test_scenario_required_absent_fails_deterministically() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![is_docker(), loading_messages()]));

    let first = engine.apply_patches("nothing to see", &output).unwrap_err();
    let second = engine.apply_patches("nothing to see", &output).unwrap_err();

    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(first.failures(), second.failures());
    assert_eq!(first.failures()[0].id, "is-docker");
    assert_eq!(first.failures()[0].reason, FAILURE_NOT_FOUND);
    assert!(first.guidance().is_some());
}

#[test]
fn test_required_failure_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = recording_engine(vec![is_docker()]);

    assert!(engine.apply_patches("nothing to see", &output).is_err());

    assert_eq!(engine.store().writes(), 0);
    assert!(!output.exists());
    assert!(!sidecar_path(&output).exists());
}

#[test]
fn test_required_failure_keeps_previous_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![is_docker()]));

    engine.apply_patches("x3.getIsDocker()", &output).unwrap();
    let previous_digest = read(&sidecar_path(&output));

    assert!(engine.apply_patches("drifted upstream", &output).is_err());

    assert_eq!(read(&output), "true");
    assert_eq!(read(&sidecar_path(&output)), previous_digest);
}

#[test]
fn test_required_no_effect_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let stale = Descriptor::new(
        "stale",
        "matches but changes nothing",
        CustomStrategy::new(|s| s.contains("target"), |s| s.to_string()),
    )
    .with_required(true);
    let engine = PatchEngine::new(registry(vec![stale]));

    let err = engine.apply_patches("target", &output).unwrap_err();

    match &err {
        EngineError::RequiredPatchesFailed { failures, .. } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].reason, FAILURE_VERIFY);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_cache_hit_performs_zero_writes() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = recording_engine(vec![is_docker()]);

    let first = engine.apply_patches("x3.getIsDocker()", &output).unwrap();
    assert!(!first.skipped_via_cache);
    let writes_after_first = engine.store().writes();

    let second = engine.apply_patches("x3.getIsDocker()", &output).unwrap();

    assert!(second.skipped_via_cache);
    assert!(second.results.is_empty());
    assert_eq!(engine.store().writes(), writes_after_first);
}

#[test]
fn test_changed_input_invalidates_cache() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![is_docker()]));

    engine.apply_patches("x3.getIsDocker()", &output).unwrap();
    let outcome = engine
        .apply_patches("x3.getIsDocker() ", &output)
        .unwrap();

    assert!(!outcome.skipped_via_cache);
    assert_eq!(read(&output), "true ");
    assert_eq!(read(&sidecar_path(&output)), digest("x3.getIsDocker() "));
}

#[test]
fn test_missing_output_invalidates_cache() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![is_docker()]));

    engine.apply_patches("x3.getIsDocker()", &output).unwrap();
    fs::remove_file(&output).unwrap();

    let outcome = engine.apply_patches("x3.getIsDocker()", &output).unwrap();
    assert!(!outcome.skipped_via_cache);
    assert_eq!(read(&output), "true");
}

#[test]
fn test_sidecar_dropped_then_output_then_digest() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = recording_engine(vec![is_docker()]);

    engine.apply_patches("x3.getIsDocker()", &output).unwrap();

    let events = engine.store().events.borrow().clone();
    assert_eq!(events.len(), 5);
    let sidecar = sidecar_path(&output);
    match (&events[0], &events[1], &events[2], &events[3], &events[4]) {
        (
            Event::Remove { target: stale },
            Event::Stage { temp: t0, target: out0 },
            Event::Commit { temp: t1, target: out1 },
            Event::Stage { temp: t2, target: side0 },
            Event::Commit { temp: t3, target: side1 },
        ) => {
            assert_eq!(stale, &sidecar);
            assert_eq!((out0, out1), (&output, &output));
            assert_eq!(t0, t1);
            assert_eq!((side0, side1), (&sidecar, &sidecar));
            assert_eq!(t2, t3);
            assert_eq!(t0.parent(), output.parent());
            assert!(!t0.exists(), "temp file must be renamed away");
        }
        other => panic!("unexpected write sequence: {other:?}"),
    }
}

#[test]
fn test_report_has_one_entry_per_patch_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![
        loading_messages(),
        is_docker(),
        internet_access(),
    ]));

    let outcome = engine
        .apply_patches("a.getIsDocker();b.hasInternetAccess()", &output)
        .unwrap();

    let ids: Vec<_> = outcome.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["loading-messages", "is-docker", "internet-access"]);
    assert_eq!(outcome.count(PatchStatus::Ok), 2);
    assert_eq!(outcome.count(PatchStatus::Skipped), 1);
    assert_eq!(read(&output), "true;false");
}

#[test]
fn test_later_patch_sees_earlier_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![
        Descriptor::new("seed", "", LiteralStrategy::insert_after("init;", "HOOK;")),
        Descriptor::new("follow", "", LiteralStrategy::insert_after("HOOK;", "ran();"))
            .with_required(true),
    ]));

    engine.apply_patches("init;rest", &output).unwrap();
    assert_eq!(read(&output), "init;HOOK;ran();rest");
}

#[test]
fn test_apply_file_reads_input() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("upstream.js");
    let output = temp_dir.path().join("patched.js");
    fs::write(&input, "q.getIsDocker()&&go()").unwrap();
    let engine = PatchEngine::new(registry(vec![is_docker()]));

    let outcome = engine.apply_file(&input, &output).unwrap();

    assert_eq!(outcome.count(PatchStatus::Ok), 1);
    assert_eq!(read(&output), "true&&go()");
    assert_eq!(read(&input), "q.getIsDocker()&&go()");
}

#[test]
fn test_unreadable_sidecar_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    fs::write(&output, "stale").unwrap();
    fs::create_dir(sidecar_path(&output)).unwrap();
    let engine = PatchEngine::new(registry(vec![is_docker()]));

    let err = engine.apply_patches("x3.getIsDocker()", &output).unwrap_err();

    assert!(matches!(err, EngineError::Io { .. }));
    assert_eq!(read(&output), "stale");
}

#[test]
fn test_failed_sidecar_write_never_serves_other_input() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cli.js");
    let engine = PatchEngine::new(registry(vec![is_docker()]));
    engine.apply_patches("A;x.getIsDocker()", &output).unwrap();
    assert_eq!(read(&sidecar_path(&output)), digest("A;x.getIsDocker()"));

    let failing = PatchEngine::with_store(
        registry(vec![is_docker()]),
        RecordingStore::failing_sidecar(),
    );
    let err = failing
        .apply_patches("B;x.getIsDocker()", &output)
        .unwrap_err();
    assert!(matches!(err, EngineError::Io { .. }));
    assert_eq!(read(&output), "B;true");
    assert!(!sidecar_path(&output).exists());

    let rollback = engine.apply_patches("A;x.getIsDocker()", &output).unwrap();
    assert!(!rollback.skipped_via_cache);
    assert_eq!(read(&output), "A;true");
}

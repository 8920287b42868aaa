//! File-level tests for `idreg replay`: script loading by extension and
//! exit status.

use std::path::PathBuf;

use idreg_cli::replay::{load_script, run_replay, ReplayArgs, EXIT_EXPECTATION_FAILED};
use idreg_cli::OutputFormat;
use idreg_core::GENESIS_ADMIN;

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn args(script: PathBuf) -> ReplayArgs {
    ReplayArgs {
        script,
        genesis_admin: GENESIS_ADMIN.to_string(),
        height: 1,
        format: OutputFormat::Text,
    }
}

#[test]
fn loads_yaml_and_json_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = write(
        &dir,
        "calls.yaml",
        "- {op: bind, caller: U, identity_hash: \"0x1\", issued_by: I}\n",
    );
    let json = write(
        &dir,
        "calls.json",
        r#"[{"op": "bind", "caller": "U", "identity_hash": "0x1", "issued_by": "I", "expect": "ok"}]"#,
    );
    assert_eq!(load_script(&yaml).unwrap().len(), 1);
    assert_eq!(load_script(&json).unwrap().len(), 1);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_script(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read script"));
}

#[test]
fn passing_script_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(
        &dir,
        "ok.yaml",
        "- {op: bind, caller: U, identity_hash: \"0x1\", issued_by: I, expect: ok}\n\
         - {op: bind, caller: U, identity_hash: \"0x2\", issued_by: I, expect: 101}\n",
    );
    assert_eq!(run_replay(&args(script)).unwrap(), 0);
}

#[test]
fn failing_expectation_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(&dir, "bad.yaml", "- {op: get_hash, principal: U, expect: ok}\n");
    assert_eq!(run_replay(&args(script)).unwrap(), EXIT_EXPECTATION_FAILED);
}

#[test]
fn custom_genesis_admin_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(
        &dir,
        "admin.yaml",
        "- {op: transfer_admin, caller: BOOT, new_admin: NEXT, expect: ok}\n",
    );
    let mut replay = args(script);
    replay.genesis_admin = "BOOT".into();
    assert_eq!(run_replay(&replay).unwrap(), 0);
}

#[test]
fn invalid_genesis_admin_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(&dir, "x.yaml", "[]\n");
    let mut replay = args(script);
    replay.genesis_admin = " ".into();
    assert!(run_replay(&replay).is_err());
}

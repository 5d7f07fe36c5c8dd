//! Drives the `confreg` binary against a state file in a temp directory.

use std::path::Path;
use std::process::{Command, Output};

fn confreg(state: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_confreg"))
        .arg("--state")
        .arg(state)
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn succeed(output: &Output) {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn json(output: &Output) -> serde_json::Value {
    succeed(output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn deploy_buy_refund_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");

    json(&confreg(&state, &["deploy", "--operator", "@org", "--format", "json"]));
    let bought = json(&confreg(
        &state,
        &["buy", "--from", "@alice", "--value", "20", "--format", "json"],
    ));
    assert_eq!(bought["result"], true);
    assert_eq!(bought["paid"], 20);

    let shown = json(&confreg(&state, &["show", "--format", "json"]));
    assert_eq!(shown["balance"], 20);
    assert_eq!(shown["num_registrants"], 1);
    assert_eq!(shown["quota"], 500);

    let refunded = json(&confreg(
        &state,
        &["refund", "--from", "@org", "@alice", "20", "--format", "json"],
    ));
    assert_eq!(refunded["balance"], 0);
    assert_eq!(refunded["transfers"][0]["amount"], 20);

    let log = json(&confreg(&state, &["log", "--format", "json"]));
    let kinds: Vec<_> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(kinds, ["Deposit", "Refund"]);

    let verified = json(&confreg(&state, &["verify", "--format", "json"]));
    assert_eq!(verified["balanced"], true);
}

#[test]
fn rejected_operations_leave_state_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");

    succeed(&confreg(&state, &["deploy", "--operator", "@org"]));
    succeed(&confreg(&state, &["buy", "--from", "@alice", "--value", "20"]));
    let before = std::fs::read(&state).unwrap();

    assert!(!confreg(&state, &["change-quota", "--from", "@alice", "700"])
        .status
        .success());
    assert!(!confreg(&state, &["refund", "--from", "@org", "@alice", "10"])
        .status
        .success());
    assert!(!confreg(&state, &["buy", "--from", "@bob", "--value", "0"])
        .status
        .success());
    succeed(&confreg(
        &state,
        &["buy", "--from", "@bob", "--value", "5", "--dry-run"],
    ));

    assert_eq!(std::fs::read(&state).unwrap(), before);
}

#[test]
fn deploy_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");

    succeed(&confreg(&state, &["deploy", "--operator", "@org"]));
    assert!(!confreg(&state, &["deploy", "--operator", "@other"])
        .status
        .success());
    json(&confreg(
        &state,
        &["deploy", "--operator", "@other", "--quota", "2", "--force", "--format", "json"],
    ));

    let shown = json(&confreg(&state, &["show", "--format", "json"]));
    assert_eq!(shown["quota"], 2);
}

#[test]
fn deploy_reads_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");
    let config = dir.path().join("registry.toml");
    std::fs::write(&config, "quota = 1\n").unwrap();

    let config = config.to_str().unwrap();
    succeed(&confreg(
        &state,
        &["deploy", "--operator", "@org", "--config", config],
    ));

    succeed(&confreg(&state, &["buy", "--from", "@alice", "--value", "20"]));
    let rejected = confreg(&state, &["buy", "--from", "@bob", "--value", "20"]);
    assert!(!rejected.status.success());
    assert!(String::from_utf8_lossy(&rejected.stderr).contains("quota exceeded"));
}

/// 64-char hex tokens in text output, in order of appearance.
fn hex_ids(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .split(|c: char| !c.is_ascii_hexdigit())
        .filter(|token| token.len() == 64)
        .map(str::to_owned)
        .collect()
}

#[test]
fn text_output_ids_are_accepted_as_input() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");

    succeed(&confreg(&state, &["deploy", "--operator", "@org"]));
    succeed(&confreg(&state, &["buy", "--from", "@alice", "--value", "20"]));

    let log = confreg(&state, &["log"]);
    succeed(&log);
    let ids = hex_ids(&log);
    assert_eq!(ids.len(), 1);
    let alice = ids[0].as_str();

    let listed = confreg(&state, &["show"]);
    succeed(&listed);
    assert!(hex_ids(&listed).iter().any(|id| id == alice));

    let shown = json(&confreg(&state, &["show", alice, "--format", "json"]));
    assert_eq!(shown["paid"], 20);

    succeed(&confreg(&state, &["refund", "--from", "@org", alice, "20"]));
    let verified = json(&confreg(&state, &["verify", "--format", "json"]));
    assert_eq!(verified["report"]["recorded"], 0);
}

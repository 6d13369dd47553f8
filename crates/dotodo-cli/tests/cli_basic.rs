//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data dir.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_dotodo"))
        .args(args)
        .env("DOTODO_DATA_DIR", data_dir)
        .env_remove("DOTODO_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("not JSON ({e}): {stdout}"))
}

fn add_task(data_dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["task", "add"];
    full.extend_from_slice(args);
    let (code, stdout, stderr) = run_cli(data_dir, &full);
    assert_eq!(code, 0, "task add failed: {stderr}");
    let event = json(&stdout);
    assert_eq!(event["type"], "task_added");
    event["task_id"].as_str().unwrap().to_string()
}

#[test]
fn test_task_add_and_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), &["Write docs", "--notes", "chapter 2", "--warn", "25"]);

    let (code, stdout, _) = run_cli(dir.path(), &["task", "list", "--json"]);
    assert_eq!(code, 0);
    let list = json(&stdout);
    let active = list["active"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], id.as_str());
    assert_eq!(active[0]["title"], "Write docs");
    assert_eq!(active[0]["notes"], "chapter 2");
    assert_eq!(active[0]["warningMinutes"], 25.0);
    assert_eq!(active[0]["status"], "pending");
    assert_eq!(list["stats"]["active"], 1);
    assert_eq!(list["stats"]["completed"], 0);
}

#[test]
fn test_task_list_text() {
    let dir = tempfile::tempdir().unwrap();
    add_task(dir.path(), &["Plain listing"]);
    let (code, stdout, _) = run_cli(dir.path(), &["task", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Active (1)"));
    assert!(stdout.contains("Plain listing"));
    assert!(stdout.contains("Completed (0)"));
}

#[test]
fn test_task_add_blank_title_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["task", "add", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_task_start_stop_by_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), &["Timed"]);
    let prefix = &id[..8];

    let (code, stdout, _) = run_cli(dir.path(), &["task", "start", prefix]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "timer_started");

    let (code, _, stderr) = run_cli(dir.path(), &["task", "start", prefix]);
    assert_eq!(code, 1, "second start must be rejected");
    assert!(stderr.contains("error:"));

    let (code, stdout, _) = run_cli(dir.path(), &["task", "show", prefix]);
    assert_eq!(code, 0);
    let shown = json(&stdout);
    assert_eq!(shown["running"], true);
    assert_eq!(shown["status"], "running");

    let (code, stdout, _) = run_cli(dir.path(), &["task", "stop", prefix]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "timer_stopped");

    let (code, stdout, stderr) = run_cli(dir.path(), &["task", "stop", prefix]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("nothing to do"));
}

#[test]
fn test_task_done_undo_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let done = add_task(dir.path(), &["Finish me"]);
    let keep = add_task(dir.path(), &["Keep me"]);

    let (code, stdout, _) = run_cli(dir.path(), &["task", "done", &done]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "task_completed");

    let (code, stdout, _) = run_cli(dir.path(), &["task", "undo", &done]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "task_reopened");

    run_cli(dir.path(), &["task", "done", &done]);
    let (code, stdout, _) = run_cli(dir.path(), &["task", "clear"]);
    assert_eq!(code, 0);
    let cleared = json(&stdout);
    assert_eq!(cleared["type"], "completed_cleared");
    assert_eq!(cleared["removed"], 1);

    let (_, stdout, _) = run_cli(dir.path(), &["task", "list", "--json"]);
    let list = json(&stdout);
    assert_eq!(list["active"][0]["id"], keep.as_str());
    assert!(list["completed"].as_array().unwrap().is_empty());
}

#[test]
fn test_task_edit_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), &["Draft", "--warn", "10"]);

    let (code, _, _) = run_cli(
        dir.path(),
        &["task", "edit", &id, "--title", "Final", "--clear-warn"],
    );
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["task", "show", &id]);
    let shown = json(&stdout);
    assert_eq!(shown["title"], "Final");
    assert!(shown["warningMinutes"].is_null());

    let (code, stdout, _) = run_cli(dir.path(), &["task", "delete", &id]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "task_deleted");

    let (code, _, stderr) = run_cli(dir.path(), &["task", "show", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_list_query_filters() {
    let dir = tempfile::tempdir().unwrap();
    add_task(dir.path(), &["Buy milk"]);
    add_task(dir.path(), &["Call bank", "--notes", "about the MILK bill"]);
    add_task(dir.path(), &["Walk dog"]);

    let (_, stdout, _) = run_cli(
        dir.path(),
        &["task", "list", "--json", "--query", "milk", "--sort", "title"],
    );
    let list = json(&stdout);
    let titles: Vec<_> = list["active"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Buy milk", "Call bank"]);
    assert_eq!(list["stats"]["active"], 3);
}

#[test]
fn test_stats_json() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), &["One"]);
    add_task(dir.path(), &["Two"]);
    run_cli(dir.path(), &["task", "done", &id]);

    let (code, stdout, _) = run_cli(dir.path(), &["stats", "--json"]);
    assert_eq!(code, 0);
    let stats = json(&stdout);
    assert_eq!(stats["active"], 1);
    assert_eq!(stats["completed"], 1);
}

#[test]
fn test_watch_exits_when_idle() {
    let dir = tempfile::tempdir().unwrap();
    add_task(dir.path(), &["Idle"]);
    let (code, stdout, _) = run_cli(dir.path(), &["watch"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no task is running"));
}

#[test]
fn test_config_set_get_reset() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "notifications.toast_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "4");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "view.default_sort", "title"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "view.default_sort"]);
    assert_eq!(stdout.trim(), "title");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "ticker.interval_secs", "0"]);
    assert_eq!(code, 1);

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "view.default_sort"]);
    assert_eq!(stdout.trim(), "created-desc");
}

#[test]
fn test_config_path_is_in_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    let first = stdout.lines().next().unwrap();
    assert!(first.ends_with("config.toml"));
    assert!(first.starts_with(dir.path().to_str().unwrap()));
}

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("dotodo"));
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SPEC: &str = r#"describe("Cart", function() {
  it("starts empty", function() {
    expect(cart.items.length).toBe(0);
  });
});
"#;

struct Workspace {
    temp: TempDir,
    root: PathBuf,
    spec: PathBuf,
    config: PathBuf,
}

fn workspace() -> Workspace {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shop");
    let spec = root.join("spec/javascripts/cart_spec.js");
    fs::create_dir_all(spec.parent().unwrap()).unwrap();
    fs::write(&spec, SPEC).unwrap();

    let config = root.join("spoon.toml");
    fs::write(
        &config,
        r#"
[commands]
run_all = "echo all {relative_path}"
run_single = "echo one {relative_path} {line_number} {test_name}"
"#,
    )
    .unwrap();

    Workspace {
        temp,
        root,
        spec,
        config,
    }
}

const OVERRIDES: &[&str] = &[
    "SPOON_TEST_FOLDER",
    "SPOON_RUN_ALL_COMMAND",
    "SPOON_RUN_SINGLE_COMMAND",
    "SPOON_BEFORE_CALLBACK",
    "SPOON_AFTER_CALLBACK",
    "SPOON_LOCATOR_SCAN",
];

fn spoon(ws: &Workspace, args: &[&str]) -> Output {
    spoon_with_env(ws, &[], args)
}

fn spoon_with_env(ws: &Workspace, vars: &[(&str, &str)], args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_spoon"));
    for name in OVERRIDES {
        cmd.env_remove(name);
    }
    cmd.arg("--config")
        .arg(&ws.config)
        .args(args)
        .current_dir(&ws.root)
        .env("SPOON_DATA_DIR", ws.temp.path().join("data"))
        .env_remove("RUST_LOG")
        .envs(vars.iter().copied())
        .output()
        .unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn show_config(output: &Output) -> toml::Value {
    assert!(output.status.success(), "{}", stderr(output));
    toml::from_str(&stdout(output)).unwrap()
}

#[test]
fn test_locate_prints_test_name() {
    let ws = workspace();
    let offset = SPEC[..SPEC.find("cart.items").unwrap()].chars().count().to_string();

    let output = spoon(&ws, &["locate", path_arg(&ws.spec), "--offset", &offset]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Cart starts empty");
}

#[test]
fn test_locate_by_line_as_json() {
    let ws = workspace();

    let output = spoon(
        &ws,
        &["locate", path_arg(&ws.spec), "--line", "3", "--column", "5", "--json"],
    );
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["test_name"], "Cart starts empty");
    assert_eq!(value["labels"], serde_json::json!(["Cart", "starts empty"]));
}

#[test]
fn test_locate_outside_any_test_fails() {
    let ws = workspace();
    let plain = ws.root.join("notes.js");
    fs::write(&plain, "var total = 0;\n").unwrap();

    let output = spoon(&ws, &["locate", path_arg(&plain), "--offset", "4"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No test name!"));
}

#[test]
fn test_run_single_dry_run() {
    let ws = workspace();
    let root = path_arg(&ws.root).to_string();

    let output = spoon(
        &ws,
        &["run-single", path_arg(&ws.spec), "--line", "3", "--root", &root, "--dry-run"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let printed = stdout(&output);
    assert!(printed.starts_with("echo one spec/javascripts/cart_spec.js 3 'Cart starts empty'"));
    assert!(printed.contains(&format!("in {root}")));
}

#[test]
fn test_run_all_then_run_last() {
    let ws = workspace();
    let root = path_arg(&ws.root).to_string();

    let output = spoon(&ws, &["run-all", path_arg(&ws.spec), "--root", &root]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "all spec/javascripts/cart_spec.js");

    let output = spoon(&ws, &["run-last", "--dry-run"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("echo all spec/javascripts/cart_spec.js"));
}

#[test]
fn test_run_last_without_history_fails() {
    let ws = workspace();

    let output = spoon(&ws, &["run-last"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_show_reflects_file() {
    let ws = workspace();

    let output = spoon(&ws, &["config", "show"]);
    assert!(output.status.success());
    let shown: toml::Value = toml::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        shown["commands"]["run_all"].as_str(),
        Some("echo all {relative_path}")
    );
}

#[test]
fn test_config_init_prints_defaults() {
    let ws = workspace();

    let shown = show_config(&spoon(&ws, &["config", "init"]));
    assert_eq!(
        shown["commands"]["run_single"].as_str(),
        Some("teaspoon {relative_path} --filter={test_name}")
    );
    assert_eq!(shown["locator"]["scan"].as_str(), Some("textual"));
}

#[test]
fn test_env_run_all_command_beats_config_file() {
    let ws = workspace();
    let root = path_arg(&ws.root).to_string();

    let output = spoon_with_env(
        &ws,
        &[("SPOON_RUN_ALL_COMMAND", "echo env {relative_path}")],
        &["run-all", path_arg(&ws.spec), "--root", &root, "--dry-run"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("echo env spec/javascripts/cart_spec.js\n"));
}

#[test]
fn test_env_run_single_command_and_after_callback() {
    let ws = workspace();
    let root = path_arg(&ws.root).to_string();

    let output = spoon_with_env(
        &ws,
        &[
            ("SPOON_RUN_SINGLE_COMMAND", "echo env {test_name}"),
            ("SPOON_AFTER_CALLBACK", "echo after"),
        ],
        &["run-single", path_arg(&ws.spec), "--line", "3", "--root", &root, "--dry-run"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("echo env 'Cart starts empty' ; echo after\n"));
}

#[test]
fn test_env_before_callback_runs_first() {
    let ws = workspace();
    let root = path_arg(&ws.root).to_string();

    let output = spoon_with_env(
        &ws,
        &[("SPOON_BEFORE_CALLBACK", "echo before")],
        &["run-all", path_arg(&ws.spec), "--root", &root],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "before\nall spec/javascripts/cart_spec.js\n");
}

#[test]
fn test_env_test_folder_and_locator_scan() {
    let ws = workspace();

    let shown = show_config(&spoon_with_env(
        &ws,
        &[("SPOON_TEST_FOLDER", "test/js"), ("SPOON_LOCATOR_SCAN", "structural")],
        &["config", "show"],
    ));
    assert_eq!(shown["files"]["test_folder"].as_str(), Some("test/js"));
    assert_eq!(shown["locator"]["scan"].as_str(), Some("structural"));
}

#[test]
fn test_env_test_folder_excludes_spec_files() {
    let ws = workspace();
    let root = path_arg(&ws.root).to_string();

    let output = spoon_with_env(
        &ws,
        &[("SPOON_TEST_FOLDER", "test/js")],
        &["run-all", path_arg(&ws.spec), "--root", &root, "--dry-run"],
    );
    assert!(!output.status.success());
}

#[test]
fn test_invalid_locator_scan_is_ignored_with_warning() {
    let ws = workspace();

    let output = spoon_with_env(&ws, &[("SPOON_LOCATOR_SCAN", "bogus")], &["config", "show"]);
    let shown = show_config(&output);
    assert_eq!(shown["locator"]["scan"].as_str(), Some("textual"));
    assert!(stderr(&output).contains("ignoring SPOON_LOCATOR_SCAN"));
}

#[test]
fn test_env_template_with_unknown_placeholder_is_rejected() {
    let ws = workspace();

    let output = spoon_with_env(
        &ws,
        &[("SPOON_RUN_ALL_COMMAND", "teaspoon {test_name}")],
        &["config", "show"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("test_name"));
}

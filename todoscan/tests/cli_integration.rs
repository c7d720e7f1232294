//! Integration tests for todoscan CLI

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

const CI_VARS: &[&str] = &[
    "INPUT_SOURCE_SCAN_DIR",
    "INPUT_OUTPUT_DIR",
    "GITHUB_REPOSITORY",
    "GITHUB_SHA",
    "GITHUB_REF_NAME",
    "RUST_LOG",
];

fn run_todoscan_with_env(args: &[&str], env: &[(&str, &str)]) -> (String, String, bool) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_todoscan"));
    for var in CI_VARS {
        cmd.env_remove(var);
    }
    cmd.args(args).envs(env.iter().copied());

    let output = cmd.output().expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run_todoscan(args: &[&str]) -> (String, String, bool) {
    run_todoscan_with_env(args, &[])
}

fn write_fixture(dir: &Path) {
    fs::create_dir_all(dir.join("App")).unwrap();
    fs::write(dir.join("App/App.csproj"), "<Project />\n").unwrap();
    fs::write(
        dir.join("App/Program.cs"),
        "// TODO: wire up\n/* BUG: crashes\n   on exit */\n",
    )
    .unwrap();
    fs::write(dir.join("deploy.sh"), "# NOTE: needs bash\n").unwrap();
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help() {
    let (stdout, _, success) = run_todoscan(&["--help"]);

    assert!(success);
    assert!(stdout.contains("todoscan"));
    assert!(stdout.contains("--output-dir"));
    assert!(stdout.contains("--include"));
    assert!(stdout.contains("--no-history"));
    assert!(stdout.contains("plot"));
}

#[test]
fn test_cli_version() {
    let (stdout, _, success) = run_todoscan(&["--version"]);

    assert!(success);
    assert!(stdout.contains("todoscan"));
}

#[test]
fn test_scan_writes_report_and_history() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let root = path_str(dir.path());

    let (stdout, stderr, success) = run_todoscan(&[&root]);

    assert!(success, "stderr: {stderr}");
    assert!(stdout.contains("found 3 markers"));
    assert!(stdout.contains("App"));
    assert!(stdout.contains("unassigned"));
    assert!(stdout.contains("1 snapshots"));

    let report = fs::read_to_string(dir.path().join("output/TO-DO.md")).unwrap();
    assert!(report.starts_with("# TO-DOs"));
    assert!(report.contains("### App"));
    assert!(dir.path().join("output/metadata/todo_history.json").exists());
    assert!(dir.path().join("output/charts/todo_plots.json").exists());
}

#[test]
fn test_scan_subcommand_with_output_dir() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let out = dir.path().join("site");

    let (_, stderr, success) =
        run_todoscan(&["scan", &path_str(dir.path()), "-o", &path_str(&out)]);

    assert!(success, "stderr: {stderr}");
    assert!(out.join("TO-DO.md").exists());
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_json_output() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let (stdout, _, success) =
        run_todoscan(&[&path_str(dir.path()), "--output", "json", "--no-history"]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["total"]["total"], 3);
    assert_eq!(parsed["kinds"], serde_json::json!(["TODO", "NOTE", "BUG"]));
    assert_eq!(parsed["projects"][0]["count"]["name"], "App");
    assert!(!dir.path().join("output/metadata/todo_history.json").exists());
}

#[test]
fn test_include_filter() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let (stdout, _, success) = run_todoscan(&[
        &path_str(dir.path()),
        "--include",
        "**/*.sh",
        "--output",
        "json",
        "--no-history",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["total"]["total"], 1);
}

#[test]
fn test_env_fallbacks() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let root = path_str(dir.path());

    let (_, stderr, success) = run_todoscan_with_env(
        &["--no-history"],
        &[
            ("INPUT_SOURCE_SCAN_DIR", root.as_str()),
            ("GITHUB_REPOSITORY", "octo/widgets"),
            ("GITHUB_REF_NAME", "main"),
        ],
    );

    assert!(success, "stderr: {stderr}");
    let report = fs::read_to_string(dir.path().join("output/TO-DO.md")).unwrap();
    assert!(report.contains("https://github.com/octo/widgets/tree/main/App/Program.cs#L2C4-L3C10"));
}

#[test]
fn test_plot_command() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let out = path_str(&dir.path().join("output"));

    let (_, _, success) = run_todoscan(&[&path_str(dir.path())]);
    assert!(success);

    let (stdout, _, success) = run_todoscan(&["plot", "-o", &out]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["output_file_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["todo_history", "todo_history_categories", "todo_history_total"]
    );
}

#[test]
fn test_invalid_path() {
    let (_, stderr, success) = run_todoscan(&["/nonexistent/path"]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_invalid_glob() {
    let dir = tempdir().unwrap();
    let (_, stderr, success) = run_todoscan(&[&path_str(dir.path()), "--include", "[unclosed"]);

    assert!(!success);
    assert!(stderr.contains("invalid glob pattern"));
}

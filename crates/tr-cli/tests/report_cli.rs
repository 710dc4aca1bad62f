//! End-to-end tests for the `toggl-report` binary using saved report input.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn report_binary() -> String {
    env!("CARGO_BIN_EXE_toggl-report").to_string()
}

const CONFIG: &str = r#"{
    "round_to_minutes": 15,
    "client_map": {"Acme Inc": "Acme", "^Glo.*$": "Globex"},
    "project_map": {},
    "task_map": {"^(?i)meeting.*$": "Meetings"}
}"#;

const DETAILS: &str = r#"{
    "total_count": 4,
    "data": [
        {"start": "2024-01-15T09:00:00+01:00", "client": "Acme Inc", "project": "Web",
         "description": "Meeting with design", "dur": 1200000},
        {"start": "2024-01-15T14:00:00+01:00", "client": "Acme Inc", "project": "Web",
         "description": "meeting notes", "dur": 900000},
        {"start": "2024-01-15T16:00:00+01:00", "client": "Globo Gym", "project": "Api",
         "description": "Build", "dur": 2700000},
        {"start": "2024-01-16T08:30:00+01:00", "client": null, "project": "Internal",
         "description": "Admin", "dur": 300000}
    ]
}"#;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(temp: &TempDir, args: &[&str]) -> Output {
    Command::new(report_binary())
        .current_dir(temp.path())
        .env("HOME", temp.path())
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run toggl-report")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_table_report_from_input() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "config.json", CONFIG);
    write_file(temp.path(), "details.json", DETAILS);

    let output = run(&temp, &["--input", "details.json", "config.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let rows: Vec<&str> = out.lines().filter(|l| l.starts_with('|')).collect();
    assert!(rows[0].contains("Date") && rows[0].contains("Hours"));

    // Both meetings collapse into one mapped row: 35 min rounds to 30.
    let meetings: Vec<&&str> = rows.iter().filter(|l| l.contains("Meetings")).collect();
    assert_eq!(meetings.len(), 1, "{out}");
    assert!(meetings[0].contains("Acme") && !meetings[0].contains("Acme Inc"));
    assert!(meetings[0].contains("00:35:00") && meetings[0].contains("00:30:00"));
    assert!(meetings[0].contains("0.50"));

    assert!(rows.iter().any(|l| l.contains("Globex") && l.contains("0.75")));
    // 5 minutes is below one unit and rounds up to it.
    assert!(rows.iter().any(|l| l.contains("Admin") && l.contains("00:15:00")));

    let last = rows.last().unwrap();
    assert!(last.contains("01:25:00") && last.contains("01:30:00"));
    assert!(last.contains("1.50"));
}

#[test]
fn test_json_report_from_input() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "config.json", CONFIG);
    write_file(temp.path(), "details.json", DETAILS);

    let output = run(&temp, &["--json", "--input", "details.json", "config.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let rows = value["rows"].as_array().unwrap();
    // Three detail rows plus one total per day.
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["date"], "2024-01-15");
    assert_eq!(rows[0]["client"], "Acme");
    assert_eq!(rows[1]["kind"], "detail");
    assert_eq!(rows[2]["kind"], "daily_total");
    assert_eq!(rows[2]["date"], "2024-01-15");
    assert_eq!(rows[3]["kind"], "detail");
    assert_eq!(rows[4]["kind"], "daily_total");
    assert_eq!(rows[4]["date"], "2024-01-16");
    assert_eq!(value["grand_total"]["duration_ms"], 5_100_000);
    assert_eq!(value["grand_total"]["rounded_duration_ms"], 5_400_000);
    assert_eq!(value["grand_total"]["rounded_hours"], "1.50");
}

#[test]
fn test_empty_input_prints_notice() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "config.json", "{}");
    write_file(temp.path(), "details.json", r#"{"data": []}"#);

    let output = run(&temp, &["--input", "details.json", "config.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "No time entries found.\n");
}

#[test]
fn test_missing_config_fails() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "details.json", DETAILS);

    let output = run(&temp, &["--input", "details.json", "nope.json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("configuration file \"nope.json\" not found"));
}

#[test]
fn test_invalid_date_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "config.json", CONFIG);

    let output = run(&temp, &["--start", "15.01.2024", "config.json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not a valid date: \"15.01.2024\""));
}

#[test]
fn test_reversed_range_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "config.json", CONFIG);

    let output = run(
        &temp,
        &["-s", "2024-01-20", "-e", "2024-01-19", "config.json"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("end date cannot be before start date"));
}

#[test]
fn test_missing_credentials_fail_before_fetching() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "config.json", CONFIG);

    let output = Command::new(report_binary())
        .current_dir(temp.path())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env_remove("TOGGL_API_TOKEN")
        .env_remove("TOGGL_WORKSPACE_ID")
        .args(["-s", "2024-01-15", "-e", "2024-01-15", "config.json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing Toggl API token"));
}

#[test]
fn test_input_conflicts_with_dates() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "config.json", CONFIG);
    write_file(temp.path(), "details.json", DETAILS);

    let output = run(
        &temp,
        &["--input", "details.json", "-s", "2024-01-15", "config.json"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot be used with"));
}

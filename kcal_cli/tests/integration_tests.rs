//! Integration tests for the kcal binary.
//!
//! These tests verify end-to-end behavior including:
//! - Config loading and command-line overrides
//! - Daily, weekly, monthly and yearly reports in text and JSON
//! - Appending to the daily log

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROFILE: &str = r#"
[profile]
metabolic_rate = 2000
weight_loss_goal = 0.5
height_cm = 180.0
weight_lbs = 75.0
date_of_birth = "1990-01-01"
"#;

const DAILY_LOG: &str = "date,food_calories,exercise_calories,weight_lbs
2024-01-03,1500,300,
2024-01-05,2000,0,181.0
2024-02-10,1800,0,180.0
";

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("kcal"))
}

/// Temp dir holding a config file and a daily log
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("config.toml"), config).unwrap();
        fs::write(dir.path().join("daily_log.csv"), DAILY_LOG).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    /// Command with config and data dir pointed at the fixture
    fn cmd(&self) -> Command {
        let mut cmd = cli();
        cmd.arg("--config")
            .arg(self.config_path())
            .arg("--data-dir")
            .arg(self.path());
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("stdout is not JSON")
    }
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Calorie tracking metrics and reports"));
}

#[test]
fn test_today_text() {
    let fixture = Fixture::new(PROFILE);

    fixture
        .cmd()
        .args(["today", "--today", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("550 kcal"))
        .stdout(predicate::str::contains("1750 kcal"))
        .stdout(predicate::str::contains("31%"));
}

#[test]
fn test_default_command_is_today() {
    let fixture = Fixture::new(PROFILE);

    fixture
        .cmd()
        .args(["--today", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-03"))
        .stdout(predicate::str::contains("550 kcal"));
}

#[test]
fn test_today_json() {
    let fixture = Fixture::new(PROFILE);
    let snapshot = fixture.json(&["today", "--today", "2024-01-03"]);

    assert_eq!(snapshot["net_calories"], 550);
    assert_eq!(snapshot["budget"], 1750);
    assert_eq!(snapshot["goal_progress_percent"], 31);
    assert_eq!(snapshot["needs_setup"], false);
}

#[test]
fn test_today_without_metabolic_rate() {
    let fixture = Fixture::new("");

    fixture
        .cmd()
        .args(["today", "--today", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("set a metabolic rate"))
        // Net still uses the 2000 default
        .stdout(predicate::str::contains("800 kcal"));
}

#[test]
fn test_untracked_day_is_zero() {
    let fixture = Fixture::new(PROFILE);
    let snapshot = fixture.json(&["today", "--today", "2024-01-04"]);

    assert_eq!(snapshot["net_calories"], 0);
    assert_eq!(snapshot["goal_progress_percent"], 100);
}

#[test]
fn test_week_report() {
    let fixture = Fixture::new(PROFILE);

    fixture
        .cmd()
        .args(["week", "--today", "2024-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Week of 2024-01-03 to 2024-01-09"))
        .stdout(predicate::str::contains("2/7 days tracked"));

    let report = fixture.json(&["week", "--date", "2024-01-03"]);
    assert_eq!(report["summary"]["net_calories_total"], 300);
    assert_eq!(report["summary"]["days_with_data"], 2);
    assert_eq!(report["summary"]["days_in_period"], 7);
    assert_eq!(report["days"].as_array().unwrap().len(), 7);
    assert_eq!(report["chart"]["labels"][0], "Wed");
}

#[test]
fn test_start_of_week_override() {
    let fixture = Fixture::new(PROFILE);
    let report = fixture.json(&["--start-of-week", "0", "week", "--date", "2024-01-03"]);

    assert_eq!(report["summary"]["start_date"], "2024-01-01");
    assert_eq!(report["chart"]["labels"][0], "Mon");
}

#[test]
fn test_month_report() {
    let fixture = Fixture::new(PROFILE);
    let report = fixture.json(&["month", "--month", "1", "--year", "2024"]);

    assert_eq!(report["summary"]["days_in_period"], 31);
    assert_eq!(report["summary"]["days_with_data"], 2);
    assert_eq!(report["summary"]["net_calories_total"], 300);
    assert_eq!(report["summary"]["average_weight"], 181.0);
    assert_eq!(report["weight"]["labels"][0], "5");
}

#[test]
fn test_year_from_records() {
    let fixture = Fixture::new(PROFILE);
    let report = fixture.json(&["year", "--year", "2024"]);

    assert_eq!(report["stats"]["months_tracked"], 2);
    assert_eq!(report["months"].as_array().unwrap().len(), 12);
    assert_eq!(report["months"][0]["days_tracked"], "2/31 days");
    assert_eq!(report["months"][2]["status"], "no_data");
    assert_eq!(report["insights"]["best_month"]["label"], "Feb");
    assert_eq!(report["insights"]["challenging_month"]["label"], "Jan");
}

#[test]
fn test_year_from_saved_report() {
    let fixture = Fixture::new(PROFILE);
    let report_path = fixture.path().join("yearly.json");
    fs::write(
        &report_path,
        r#"{"year": 2024, "monthly_entries": [
            {"month": 4, "total_food_calories": 15000, "total_exercise_calories": 1000,
             "net_calories": 3000, "average_weight": 180.2, "days_with_data": 10, "days_in_month": 30}
        ]}"#,
    )
    .unwrap();

    fixture
        .cmd()
        .arg("year")
        .arg("--report")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total net calories: 1000"))
        .stdout(predicate::str::contains("10/30 days"))
        .stdout(predicate::str::contains("Track consistently"));
}

#[test]
fn test_bmr() {
    let fixture = Fixture::new(PROFILE);

    fixture
        .cmd()
        .args(["bmr", "--today", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated BMR: 1300 kcal/day"))
        .stdout(predicate::str::contains("Daily target: 1750 kcal/day"));

    let empty = Fixture::new("");
    let bmr = empty.json(&["bmr"]);
    assert!(bmr["bmr"].is_null());
    assert!(bmr["daily_target"].is_null());
}

#[test]
fn test_week_start() {
    let fixture = Fixture::new(PROFILE);

    // 2024-01-01 is a Monday; the default week starts on Wednesday
    fixture
        .cmd()
        .args(["week-start", "--today", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2023-12-27"));

    fixture
        .cmd()
        .args(["week-start", "--date", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-03"));
}

#[test]
fn test_log_appends_to_daily_log() {
    let fixture = Fixture::new(PROFILE);
    let data_dir = fixture.path().join("fresh");

    cli()
        .arg("--config")
        .arg(fixture.config_path())
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["log", "--date", "2024-03-01", "--food", "1200", "--exercise", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged 2024-03-01"));

    let log = fs::read_to_string(data_dir.join("daily_log.csv")).unwrap();
    assert!(log.starts_with("date,food_calories,exercise_calories,weight_lbs"));
    assert!(log.contains("2024-03-01,1200,200,"));

    let output = cli()
        .arg("--config")
        .arg(fixture.config_path())
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["today", "--today", "2024-03-01", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let snapshot: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(snapshot["food_calories"], 1200);
    assert_eq!(snapshot["net_calories"], 750);
}

#[test]
fn test_log_to_uppercase_csv_input() {
    let fixture = Fixture::new(PROFILE);
    let input = fixture.path().join("LOG.CSV");

    fixture
        .cmd()
        .arg("--input")
        .arg(&input)
        .args(["log", "--date", "2024-01-03", "--food", "1500", "--exercise", "300"])
        .assert()
        .success();

    let output = fixture
        .cmd()
        .arg("--input")
        .arg(&input)
        .args(["today", "--today", "2024-01-03", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let snapshot: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(snapshot["net_calories"], 550);
}

#[test]
fn test_today_merges_same_date_rows() {
    let fixture = Fixture::new(PROFILE);
    let input = fixture.path().join("split.csv");
    fs::write(
        &input,
        "date,food_calories,exercise_calories,weight_lbs\n\
         2024-01-03,800,0,181.0\n\
         2024-01-03,700,300,180.5\n",
    )
    .unwrap();

    let output = fixture
        .cmd()
        .arg("--input")
        .arg(&input)
        .args(["today", "--today", "2024-01-03", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let snapshot: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(snapshot["food_calories"], 1500);
    assert_eq!(snapshot["net_calories"], 550);
    assert_eq!(snapshot["weight_lbs"], 180.5);
}

#[test]
fn test_json_input_file() {
    let fixture = Fixture::new(PROFILE);
    let input = fixture.path().join("weekly.json");
    fs::write(
        &input,
        r#"{"start_date": "2024-01-03", "end_date": "2024-01-09", "daily_summaries": [
            {"date": "2024-01-03", "total_food_calories": 1500, "total_exercise_calories": 300, "net_calories": 9999}
        ]}"#,
    )
    .unwrap();

    let output = fixture
        .cmd()
        .arg("--input")
        .arg(&input)
        .args(["week", "--date", "2024-01-03", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&output).unwrap();
    // Server net is recomputed from the profile
    assert_eq!(report["summary"]["net_calories_total"], 550);

    fixture
        .cmd()
        .arg("--input")
        .arg(&input)
        .args(["log", "--food", "100"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_inputs_fail() {
    let fixture = Fixture::new(PROFILE);

    fixture
        .cmd()
        .args(["today", "--today", "01/03/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));

    fixture
        .cmd()
        .args(["--metabolic-rate", "100", "today"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("metabolic_rate"));

    let bad = Fixture::new("[profile]\nstart_of_week = 9\n");
    bad.cmd()
        .arg("today")
        .assert()
        .failure()
        .stderr(predicate::str::contains("start_of_week"));
}

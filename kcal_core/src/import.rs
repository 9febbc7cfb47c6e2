//! Loading daily records from local files.
//!
//! Two sources are understood:
//! - The CSV daily log kept in the data directory
//!   (`date,food_calories,exercise_calories,weight_lbs`)
//! - JSON, either a plain array of records or a saved REST report response
//!
//! Unreadable CSV rows are skipped with a warning so one bad line doesn't
//! hide a year of history.

use crate::payload::{DailyReport, MonthlyReport, WeeklyReport, YearlyReport};
use crate::{DailyRecord, Error, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const DAILY_LOG_FILE: &str = "daily_log.csv";

/// Default location of the daily log inside a data directory
pub fn daily_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DAILY_LOG_FILE)
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    date: String,
    #[serde(default)]
    food_calories: Option<u32>,
    #[serde(default)]
    exercise_calories: Option<u32>,
    #[serde(default)]
    weight_lbs: Option<f64>,
}

impl TryFrom<CsvRow> for DailyRecord {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let date = crate::dates::parse_local_date(&row.date)?;
        Ok(DailyRecord {
            date,
            total_food_calories: row.food_calories.unwrap_or(0),
            total_exercise_calories: row.exercise_calories.unwrap_or(0),
            net_calories: None,
            weight_lbs: row.weight_lbs,
        })
    }
}

impl From<&DailyRecord> for CsvRow {
    fn from(record: &DailyRecord) -> Self {
        Self {
            date: crate::dates::format_api_date(record.date),
            food_calories: Some(record.total_food_calories),
            exercise_calories: Some(record.total_exercise_calories),
            weight_lbs: record.weight_lbs,
        }
    }
}

/// Any JSON document that carries per-day records
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRecords {
    Records(Vec<DailyRecord>),
    Weekly(WeeklyReport),
    Monthly(MonthlyReport),
    Daily(DailyReport),
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// True for a `.csv` path, in any case
pub fn is_csv_path(path: &Path) -> bool {
    lowercase_extension(path).as_deref() == Some("csv")
}

/// Load records from a `.csv` or `.json` file, chosen by extension
pub fn load_records(path: &Path) -> Result<Vec<DailyRecord>> {
    let records = match lowercase_extension(path).as_deref() {
        Some("csv") => load_csv(path)?,
        Some("json") => load_json(path)?,
        _ => {
            return Err(Error::Import(format!(
                "{:?}: expected a .csv or .json file",
                path
            )))
        }
    };

    tracing::info!("Loaded {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Load the CSV daily log; a missing file is an empty log
pub fn load_csv(path: &Path) -> Result<Vec<DailyRecord>> {
    if !path.exists() {
        tracing::debug!("No daily log at {:?}", path);
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match DailyRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping CSV row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(records)
}

/// Load records from a JSON array or a saved daily/weekly/monthly report
pub fn load_json(path: &Path) -> Result<Vec<DailyRecord>> {
    let contents = std::fs::read_to_string(path)?;
    let parsed: JsonRecords = serde_json::from_str(&contents).map_err(|e| {
        Error::Import(format!("{:?} is not a record list or report: {}", path, e))
    })?;

    Ok(match parsed {
        JsonRecords::Records(records) => records,
        JsonRecords::Weekly(report) => report.records(),
        JsonRecords::Monthly(report) => report.records(),
        JsonRecords::Daily(report) => vec![report.to_record()],
    })
}

/// Load a saved yearly report response
pub fn load_yearly_report(path: &Path) -> Result<YearlyReport> {
    let contents = std::fs::read_to_string(path)?;
    let report: YearlyReport = serde_json::from_str(&contents)?;
    tracing::info!(
        "Loaded yearly report for {} ({} months) from {:?}",
        report.year,
        report.monthly_entries.len(),
        path
    );
    Ok(report)
}

/// Append records to the CSV daily log, creating it with a header if needed
pub fn append_records(path: &Path, records: &[DailyRecord]) -> Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;

    tracing::info!("Appended {} records to {:?}", records.len(), path);
    Ok(records.len())
}

//! Payload shapes of the nutrition REST API.
//!
//! Report responses are read into these types and converted into engine
//! inputs. Numeric fields the server leaves null are read as 0, except
//! `net_calories`, which stays `None`. Entry writes are routed by whether an
//! id is present: no id creates, an id updates.

use crate::dates::format_api_date;
use crate::period::days_in_month;
use crate::{DailyRecord, DateRange, Error, PeriodKind, PeriodSummary, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const API_PREFIX: &str = "/api/samaanai";

// ============================================================================
// Entries
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MealEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub meal_type: MealType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub calories: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub calories_burned: u32,
    #[serde(default)]
    pub duration_minutes: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub weight: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP method and path, relative to the API base URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: String,
}

/// A record the API creates or updates keyed by id
pub trait Entry {
    /// Collection segment, e.g. `meals`
    const COLLECTION: &'static str;

    fn id(&self) -> Option<i64>;

    /// `POST` to the collection without an id, `PUT` to the item with one
    fn upsert_route(&self) -> Route {
        match self.id() {
            Some(id) => Route {
                method: Method::Put,
                path: format!("{}/{}/{}/", API_PREFIX, Self::COLLECTION, id),
            },
            None => Route {
                method: Method::Post,
                path: format!("{}/{}/", API_PREFIX, Self::COLLECTION),
            },
        }
    }

    /// `None` for an entry that was never saved
    fn delete_route(&self) -> Option<Route> {
        self.id().map(|id| Route {
            method: Method::Delete,
            path: format!("{}/{}/{}/", API_PREFIX, Self::COLLECTION, id),
        })
    }
}

impl Entry for MealEntry {
    const COLLECTION: &'static str = "meals";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Entry for ExerciseEntry {
    const COLLECTION: &'static str = "exercises";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Entry for WeightEntry {
    const COLLECTION: &'static str = "weight-entries";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Which report to fetch; `None` fields let the server pick "current"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportQuery {
    Daily(NaiveDate),
    Weekly(Option<NaiveDate>),
    Monthly(Option<(u32, i32)>),
    Yearly(Option<i32>),
}

impl ReportQuery {
    pub fn route(&self) -> Route {
        let base = format!("{}/reports", API_PREFIX);
        let path = match self {
            ReportQuery::Daily(date) => format!("{}/daily?date={}", base, format_api_date(*date)),
            ReportQuery::Weekly(Some(date)) => {
                format!("{}/weekly?date={}", base, format_api_date(*date))
            }
            ReportQuery::Weekly(None) => format!("{}/weekly", base),
            ReportQuery::Monthly(Some((month, year))) => {
                format!("{}/monthly?month={}&year={}", base, month, year)
            }
            ReportQuery::Monthly(None) => format!("{}/monthly", base),
            ReportQuery::Yearly(Some(year)) => format!("{}/yearly?year={}", base, year),
            ReportQuery::Yearly(None) => format!("{}/yearly", base),
        };
        Route {
            method: Method::Get,
            path,
        }
    }
}

/// One day in a weekly or monthly report
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    #[serde(default)]
    pub total_food_calories: Option<u32>,
    #[serde(default)]
    pub total_exercise_calories: Option<u32>,
    #[serde(default)]
    pub net_calories: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl From<&DaySummary> for DailyRecord {
    fn from(day: &DaySummary) -> Self {
        DailyRecord {
            date: day.date,
            total_food_calories: day.total_food_calories.unwrap_or(0),
            total_exercise_calories: day.total_exercise_calories.unwrap_or(0),
            net_calories: day.net_calories,
            weight_lbs: day.weight,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyReport {
    pub date: NaiveDate,
    #[serde(default)]
    pub meals: Vec<MealEntry>,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default)]
    pub total_food_calories: Option<u32>,
    #[serde(default)]
    pub total_exercise_calories: Option<u32>,
    #[serde(default)]
    pub net_calories: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl DailyReport {
    /// Totals fall back to the sum of the line items when not supplied
    pub fn to_record(&self) -> DailyRecord {
        let food = self.total_food_calories.unwrap_or_else(|| {
            self.meals
                .iter()
                .fold(0u32, |sum, m| sum.saturating_add(m.calories))
        });
        let exercise = self.total_exercise_calories.unwrap_or_else(|| {
            self.exercises
                .iter()
                .fold(0u32, |sum, e| sum.saturating_add(e.calories_burned))
        });

        DailyRecord {
            date: self.date,
            total_food_calories: food,
            total_exercise_calories: exercise,
            net_calories: self.net_calories,
            weight_lbs: self.weight,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub daily_summaries: Vec<DaySummary>,
    #[serde(default)]
    pub overall_total_food_calories: Option<u64>,
    #[serde(default)]
    pub overall_total_exercise_calories: Option<u64>,
    #[serde(default)]
    pub overall_total_net_calories: Option<i64>,
}

impl WeeklyReport {
    pub fn records(&self) -> Vec<DailyRecord> {
        self.daily_summaries.iter().map(DailyRecord::from).collect()
    }

    pub fn range(&self) -> Result<DateRange> {
        let mut range = DateRange::new(self.start_date, self.end_date)?;
        range.kind = PeriodKind::Week;
        Ok(range)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReport {
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub daily_entries: Vec<DaySummary>,
    #[serde(default)]
    pub total_food_calories: Option<u64>,
    #[serde(default)]
    pub total_exercise_calories: Option<u64>,
    #[serde(default)]
    pub total_net_calories: Option<i64>,
}

impl MonthlyReport {
    pub fn records(&self) -> Vec<DailyRecord> {
        self.daily_entries.iter().map(DailyRecord::from).collect()
    }

    pub fn range(&self) -> Result<DateRange> {
        DateRange::month(self.year, self.month)
    }
}

/// One month of a yearly report
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthEntry {
    pub month: u32,
    #[serde(default)]
    pub total_food_calories: Option<u64>,
    #[serde(default)]
    pub total_exercise_calories: Option<u64>,
    #[serde(default)]
    pub net_calories: Option<i64>,
    #[serde(default)]
    pub average_weight: Option<f64>,
    #[serde(default)]
    pub days_with_data: Option<u32>,
    #[serde(default)]
    pub days_in_month: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct YearlyReport {
    pub year: i32,
    #[serde(default)]
    pub monthly_entries: Vec<MonthEntry>,
    #[serde(default)]
    pub yearly_total_food_calories: Option<u64>,
    #[serde(default)]
    pub yearly_total_exercise_calories: Option<u64>,
    #[serde(default)]
    pub yearly_total_net_calories: Option<i64>,
}

impl YearlyReport {
    /// Twelve monthly summaries, empty for months the server left out
    ///
    /// The server counts a day as having data when any entry exists, even a
    /// zero-calorie one. A month whose food and exercise totals are both zero
    /// is treated as untracked here regardless of that count.
    pub fn monthly_summaries(&self) -> Result<Vec<PeriodSummary>> {
        let mut months = Vec::with_capacity(12);

        for month in 1..=12 {
            let range = DateRange::month(self.year, month)?;
            let entry = self.monthly_entries.iter().find(|e| e.month == month);
            months.push(match entry {
                Some(entry) => entry.to_summary(range)?,
                None => PeriodSummary {
                    start_date: range.start,
                    end_date: range.end,
                    kind: PeriodKind::Month,
                    total_food_calories: 0,
                    total_exercise_calories: 0,
                    net_calories_total: 0,
                    days_in_period: range.num_days(),
                    days_with_data: 0,
                    average_weight: None,
                },
            });
        }

        let unknown: Vec<_> = self
            .monthly_entries
            .iter()
            .filter(|e| !(1..=12).contains(&e.month))
            .map(|e| e.month)
            .collect();
        if !unknown.is_empty() {
            tracing::warn!("Ignoring yearly entries for unknown months {:?}", unknown);
        }

        Ok(months)
    }
}

impl MonthEntry {
    fn to_summary(&self, range: DateRange) -> Result<PeriodSummary> {
        let food = self.total_food_calories.unwrap_or(0);
        let exercise = self.total_exercise_calories.unwrap_or(0);
        let tracked = food > 0 || exercise > 0;

        let days_in_period = match self.days_in_month {
            Some(days) if days > 0 => days,
            _ => days_in_month(range.start.year(), self.month)?,
        };

        let days_with_data = if tracked {
            self.days_with_data.unwrap_or(0)
        } else {
            0
        };
        if days_with_data > days_in_period {
            return Err(Error::Import(format!(
                "month {} reports {} tracked days out of {}",
                self.month, days_with_data, days_in_period
            )));
        }

        Ok(PeriodSummary {
            start_date: range.start,
            end_date: range.end,
            kind: PeriodKind::Month,
            total_food_calories: food,
            total_exercise_calories: exercise,
            net_calories_total: if tracked {
                self.net_calories.unwrap_or(0)
            } else {
                0
            },
            days_in_period,
            days_with_data,
            average_weight: self.average_weight,
        })
    }
}

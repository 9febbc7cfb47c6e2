//! Core domain types for the nutrition-metrics engine.
//!
//! This module defines the values that flow through the engine:
//! - Per-day records of food and exercise calories
//! - The user profile the calculations are parameterised by
//! - Date ranges and the period summaries aggregated over them

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Metabolic rate assumed for net calories when the profile has none
pub const DEFAULT_METABOLIC_RATE: u32 = 2000;

/// Wednesday, in the Monday = 0 convention
pub const DEFAULT_START_OF_WEEK: u8 = 2;

/// Energy equivalent of one pound of body weight
pub const CALORIES_PER_POUND: f64 = 3500.0;

// ============================================================================
// Daily Records
// ============================================================================

/// One calendar date of logged food and exercise for one user
///
/// A record whose food and exercise totals are both zero is *untracked*.
/// There is no way to tell "nothing logged" apart from "logged exactly zero"
/// (a fasting day with no exercise), so both are treated as untracked.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_food_calories: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_exercise_calories: u32,
    /// Server-supplied net calories; the engine recomputes its own
    #[serde(default)]
    pub net_calories: Option<i64>,
    /// The day's weight entry, if one was logged
    #[serde(default)]
    pub weight_lbs: Option<f64>,
}

/// Calorie totals the server sends as `null` read as 0
fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

impl DailyRecord {
    pub fn new(date: NaiveDate, food_calories: u32, exercise_calories: u32) -> Self {
        Self {
            date,
            total_food_calories: food_calories,
            total_exercise_calories: exercise_calories,
            net_calories: None,
            weight_lbs: None,
        }
    }

    pub fn with_weight(mut self, weight_lbs: f64) -> Self {
        self.weight_lbs = Some(weight_lbs);
        self
    }

    /// True iff any food or exercise calories were logged
    pub fn is_tracked(&self) -> bool {
        self.total_food_calories > 0 || self.total_exercise_calories > 0
    }
}

// ============================================================================
// User Profile
// ============================================================================

/// Sex used to pick the Mifflin-St Jeor constant
///
/// Profiles carry no stored sex, so every profile is `Male` unless the
/// config says otherwise. This is a known product limitation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

/// Per-user settings the calculations depend on
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Calories/day. `None` means "not configured", which is not the same as 0.
    #[serde(default)]
    pub metabolic_rate: Option<u32>,

    /// Pounds per week, positive to lose and negative to gain
    #[serde(default)]
    pub weight_loss_goal: Option<f64>,

    #[serde(default)]
    pub height_cm: Option<f64>,

    #[serde(default)]
    pub weight_lbs: Option<f64>,

    /// Raw `YYYY-MM-DD`; parsed only when a BMR estimate is asked for
    #[serde(default)]
    pub date_of_birth: Option<String>,

    /// 0 = Monday .. 6 = Sunday
    #[serde(default = "default_start_of_week")]
    pub start_of_week: u8,

    #[serde(default)]
    pub sex: Sex,
}

fn default_start_of_week() -> u8 {
    DEFAULT_START_OF_WEEK
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            metabolic_rate: None,
            weight_loss_goal: None,
            height_cm: None,
            weight_lbs: None,
            date_of_birth: None,
            start_of_week: DEFAULT_START_OF_WEEK,
            sex: Sex::default(),
        }
    }
}

// ============================================================================
// Periods
// ============================================================================

/// Granularity of an aggregated period
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Day,
    Week,
    Month,
    Year,
    Custom,
}

/// Inclusive range of calendar dates
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: PeriodKind,
}

/// Totals for one week, month or year of daily records
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PeriodSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: PeriodKind,
    pub total_food_calories: u64,
    pub total_exercise_calories: u64,
    /// Sum of net calories over tracked days only
    pub net_calories_total: i64,
    /// Calendar length, not the number of records present
    pub days_in_period: u32,
    pub days_with_data: u32,
    /// Day, month and year periods only
    pub average_weight: Option<f64>,
}

impl PeriodSummary {
    /// True iff at least one day in the period was tracked
    pub fn has_data(&self) -> bool {
        self.days_with_data > 0
    }

    /// True iff any food or exercise calories were logged in the period
    ///
    /// Unlike `has_data`, this doesn't depend on a day count, which a yearly
    /// report may leave out.
    pub fn has_calories(&self) -> bool {
        self.total_food_calories > 0 || self.total_exercise_calories > 0
    }

    /// True iff the period has logged calories or any weight entry
    pub fn has_entries(&self) -> bool {
        self.has_data() || self.has_calories() || self.average_weight.is_some()
    }
}

//! Period aggregation for weekly, monthly and yearly reports.
//!
//! This module folds daily records into period summaries:
//! - Week/month/year date ranges, honouring the user's start of week
//! - Has-data gating: untracked days add nothing to net calories
//! - Pro-ration of monthly totals by the share of days actually tracked
//! - The yearly rollup across twelve monthly summaries

use crate::dates::{sunday_based_weekday, sunday_to_monday_based};
use crate::metrics::{estimated_weight_change_lbs, round_half_up};
use crate::{DailyRecord, DateRange, Error, PeriodKind, PeriodSummary, Result, UserProfile};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Date Ranges
// ============================================================================

/// First day of the week containing `today`
///
/// `start_of_week` uses Monday = 0 .. Sunday = 6. The browser's Sunday-based
/// weekday is converted first, then `(weekday - start_of_week + 7) % 7`
/// days are subtracted. Values above 6 wrap.
pub fn start_of_current_week(today: NaiveDate, start_of_week: u8) -> NaiveDate {
    let weekday = sunday_to_monday_based(sunday_based_weekday(today));
    let start = start_of_week % 7;
    let days_back = (weekday + 7 - start) % 7;
    today - Duration::days(i64::from(days_back))
}

/// Number of days in a calendar month
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let range = DateRange::month(year, month)?;
    Ok(range.num_days())
}

fn invalid_month(year: i32, month: u32) -> Error {
    Error::InvalidPeriod(format!("no such month: {}-{:02}", year, month))
}

impl DateRange {
    /// Custom inclusive range; `end` must not precede `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidPeriod(format!(
                "range ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self {
            start,
            end,
            kind: PeriodKind::Custom,
        })
    }

    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
            kind: PeriodKind::Day,
        }
    }

    /// The seven days starting on the user's start of week
    pub fn week_containing(date: NaiveDate, start_of_week: u8) -> Self {
        let start = start_of_current_week(date, start_of_week);
        Self {
            start,
            end: start + Duration::days(6),
            kind: PeriodKind::Week,
        }
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| invalid_month(year, month))?;
        let next = start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| invalid_month(year, month))?;
        Ok(Self {
            start,
            end: next - Duration::days(1),
            kind: PeriodKind::Month,
        })
    }

    pub fn year(year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = NaiveDate::from_ymd_opt(year, 12, 31);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                start,
                end,
                kind: PeriodKind::Year,
            }),
            _ => Err(Error::InvalidPeriod(format!("no such year: {}", year))),
        }
    }

    /// Calendar length of the range, both ends included
    pub fn num_days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1) as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date of the range in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.num_days() as usize)
    }

    /// The range of the same kind immediately before this one
    pub fn previous(&self) -> Result<Self> {
        self.shift(-1)
    }

    /// The range of the same kind immediately after this one
    pub fn next(&self) -> Result<Self> {
        self.shift(1)
    }

    fn shift(&self, direction: i64) -> Result<Self> {
        match self.kind {
            PeriodKind::Day => Ok(Self::day(self.start + Duration::days(direction))),
            PeriodKind::Week => {
                let start = self.start + Duration::weeks(direction);
                Ok(Self {
                    start,
                    end: start + Duration::days(6),
                    kind: PeriodKind::Week,
                })
            }
            PeriodKind::Month => {
                let anchor = if direction < 0 {
                    self.start.checked_sub_months(Months::new(1))
                } else {
                    self.start.checked_add_months(Months::new(1))
                }
                .ok_or_else(|| invalid_month(self.start.year(), self.start.month()))?;
                Self::month(anchor.year(), anchor.month())
            }
            PeriodKind::Year => Self::year(self.start.year() + direction as i32),
            PeriodKind::Custom => {
                let offset = Duration::days(i64::from(self.num_days()) * direction);
                Ok(Self {
                    start: self.start + offset,
                    end: self.end + offset,
                    kind: PeriodKind::Custom,
                })
            }
        }
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Collapse records into one per date, dropping dates outside `range`
///
/// Records that share a date are summed, matching the backend, which reports
/// the sum of all meal and exercise entries for a date. The last weight wins.
fn merge_by_date(records: &[DailyRecord], range: &DateRange) -> BTreeMap<NaiveDate, DailyRecord> {
    let mut days: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        if !range.contains(record.date) {
            skipped += 1;
            continue;
        }

        days.entry(record.date)
            .and_modify(|day| {
                day.total_food_calories =
                    day.total_food_calories.saturating_add(record.total_food_calories);
                day.total_exercise_calories = day
                    .total_exercise_calories
                    .saturating_add(record.total_exercise_calories);
                day.net_calories = None;
                if record.weight_lbs.is_some() {
                    day.weight_lbs = record.weight_lbs;
                }
            })
            .or_insert_with(|| record.clone());
    }

    if skipped > 0 {
        tracing::debug!(
            "Ignored {} records outside {}..={}",
            skipped,
            range.start,
            range.end
        );
    }

    days
}

fn carries_weight(kind: PeriodKind) -> bool {
    matches!(kind, PeriodKind::Day | PeriodKind::Month | PeriodKind::Year)
}

fn summarize<'a>(
    days: impl Iterator<Item = &'a DailyRecord>,
    range: &DateRange,
    profile: &UserProfile,
) -> PeriodSummary {
    let mut total_food_calories = 0u64;
    let mut total_exercise_calories = 0u64;
    let mut net_calories_total = 0i64;
    let mut days_with_data = 0u32;
    let mut weights = Vec::new();

    for day in days {
        total_food_calories += u64::from(day.total_food_calories);
        total_exercise_calories += u64::from(day.total_exercise_calories);

        if day.is_tracked() {
            net_calories_total += profile.net_calories_for(day);
            days_with_data += 1;
        }

        if let Some(weight) = day.weight_lbs {
            weights.push(weight);
        }
    }

    let average_weight = if carries_weight(range.kind) && !weights.is_empty() {
        let mean = weights.iter().sum::<f64>() / weights.len() as f64;
        Some(round_half_up(mean * 10.0) as f64 / 10.0)
    } else {
        None
    };

    PeriodSummary {
        start_date: range.start,
        end_date: range.end,
        kind: range.kind,
        total_food_calories,
        total_exercise_calories,
        net_calories_total,
        days_in_period: range.num_days(),
        days_with_data,
        average_weight,
    }
}

/// Summarize the records that fall inside `range`
///
/// Net calories are recomputed from the profile for every tracked day; a
/// server-supplied `net_calories` is not trusted. Untracked days contribute
/// nothing to the net total or to `days_with_data`, and days with no record
/// at all count toward `days_in_period` only.
pub fn aggregate(records: &[DailyRecord], range: DateRange, profile: &UserProfile) -> PeriodSummary {
    let days = merge_by_date(records, &range);
    let summary = summarize(days.values(), &range, profile);

    tracing::debug!(
        "Aggregated {:?} {}..={}: {}/{} days tracked, net {}",
        range.kind,
        range.start,
        range.end,
        summary.days_with_data,
        summary.days_in_period,
        summary.net_calories_total
    );

    summary
}

/// All records for `date` merged into one, or an untracked zero day
pub fn record_on(records: &[DailyRecord], date: NaiveDate) -> DailyRecord {
    merge_by_date(records, &DateRange::day(date))
        .remove(&date)
        .unwrap_or_else(|| DailyRecord::new(date, 0, 0))
}

/// One single-day summary for every date in `range`
///
/// Dates without a record come back as untracked zero days, the same shape
/// the weekly endpoint returns for all seven days.
pub fn split_days(
    records: &[DailyRecord],
    range: DateRange,
    profile: &UserProfile,
) -> Vec<PeriodSummary> {
    let days = merge_by_date(records, &range);

    range
        .days()
        .map(|date| {
            let day_range = DateRange::day(date);
            summarize(days.get(&date).into_iter(), &day_range, profile)
        })
        .collect()
}

/// The twelve monthly summaries of a year, January first
pub fn monthly_summaries(
    records: &[DailyRecord],
    year: i32,
    profile: &UserProfile,
) -> Result<Vec<PeriodSummary>> {
    (1..=12)
        .map(|month| DateRange::month(year, month).map(|range| aggregate(records, range, profile)))
        .collect()
}

// ============================================================================
// Pro-ration
// ============================================================================

/// Scale a period total by the share of days that were tracked
///
/// Returns 0 when nothing was tracked or the period is empty.
pub fn pro_rate(total: f64, days_with_data: u32, days_in_period: u32) -> f64 {
    if days_in_period > 0 && days_with_data > 0 {
        total * (f64::from(days_with_data) / f64::from(days_in_period))
    } else {
        0.0
    }
}

impl PeriodSummary {
    /// Copy of this summary with food, exercise and net totals pro-rated
    ///
    /// Each total is scaled independently and rounded, which keeps a month
    /// with a couple of logged days from dominating a yearly chart.
    pub fn prorated(&self) -> PeriodSummary {
        let scale = |total: f64| {
            round_half_up(pro_rate(total, self.days_with_data, self.days_in_period))
        };

        PeriodSummary {
            total_food_calories: scale(self.total_food_calories as f64).max(0) as u64,
            total_exercise_calories: scale(self.total_exercise_calories as f64).max(0) as u64,
            net_calories_total: scale(self.net_calories_total as f64),
            ..self.clone()
        }
    }
}

// ============================================================================
// Yearly Rollup
// ============================================================================

/// Year-level figures derived from monthly summaries
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct YearlyStats {
    /// Sum of pro-rated net calories over months with tracked days
    pub total_net_calories: i64,
    /// Months with logged calories or a weight entry
    pub months_tracked: u32,
    pub average_monthly_calories: i64,
    pub estimated_weight_change_lbs: f64,
    /// Average weight of the latest month that has one
    pub current_weight: Option<f64>,
    pub total_food_calories: u64,
    pub total_exercise_calories: u64,
    pub total_days_tracked: u32,
}

/// Roll monthly summaries up into year-level stats
///
/// Months without tracked days add nothing to the net total and are not
/// counted when averaging, so a year with three tracked months is averaged
/// over three, not twelve.
pub fn yearly_rollup(monthly: &[PeriodSummary]) -> YearlyStats {
    let total_net_calories: i64 = monthly
        .iter()
        .filter(|m| m.has_data())
        .map(|m| m.prorated().net_calories_total)
        .sum();

    let months_tracked = monthly.iter().filter(|m| m.has_entries()).count() as u32;

    let average_monthly_calories = if months_tracked > 0 {
        round_half_up(total_net_calories as f64 / f64::from(months_tracked))
    } else {
        0
    };

    let current_weight = monthly
        .iter()
        .filter(|m| m.average_weight.is_some())
        .max_by_key(|m| m.start_date)
        .and_then(|m| m.average_weight);

    let stats = YearlyStats {
        total_net_calories,
        months_tracked,
        average_monthly_calories,
        estimated_weight_change_lbs: estimated_weight_change_lbs(total_net_calories),
        current_weight,
        total_food_calories: monthly.iter().map(|m| m.total_food_calories).sum(),
        total_exercise_calories: monthly.iter().map(|m| m.total_exercise_calories).sum(),
        total_days_tracked: monthly.iter().map(|m| m.days_with_data).sum(),
    };

    tracing::debug!(
        "Yearly rollup: {} months tracked, net {}",
        stats.months_tracked,
        stats.total_net_calories
    );

    stats
}

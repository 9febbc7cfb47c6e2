//! Report projections for the presentation layer.
//!
//! Everything here reshapes numbers the aggregator already produced:
//! chart series, the yearly month table, insight texts and the daily
//! dashboard snapshot. No totals are recomputed.

use crate::dates::format_api_date;
use crate::metrics::{
    compute_caloric_budget, compute_goal_progress_percent, estimated_weight_change_lbs,
};
use crate::period::YearlyStats;
use crate::{DailyRecord, PeriodSummary, UserProfile, CALORIES_PER_POUND};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

const STRONG_BALANCE: i64 = 7000;
const YEARLY_TREND_BAND: i64 = 10_000;
const MIN_MONTHS_FOR_ADVICE: u32 = 3;

// ============================================================================
// Chart Series
// ============================================================================

/// A plottable figure of a period summary
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Food,
    Exercise,
    Net,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Food, Metric::Exercise, Metric::Net];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Food => "Food Calories",
            Metric::Exercise => "Exercise Calories",
            Metric::Net => "Net Calories",
        }
    }

    fn value(&self, summary: &PeriodSummary) -> f64 {
        match self {
            Metric::Food => summary.total_food_calories as f64,
            Metric::Exercise => summary.total_exercise_calories as f64,
            Metric::Net => summary.net_calories_total as f64,
        }
    }
}

/// How a period's start date is rendered as an axis label
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// `2024-01-03`
    Date,
    /// `Wed`
    Weekday,
    /// `3`
    DayOfMonth,
    /// `Jan`
    Month,
}

impl Granularity {
    pub fn label(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Date => format_api_date(date),
            Granularity::Weekday => date.format("%a").to_string(),
            Granularity::DayOfMonth => date.day().to_string(),
            Granularity::Month => date.format("%b").to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
}

/// Labels plus one or more datasets, index-aligned with the labels
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Project summaries into a chart, one dataset per requested metric
///
/// Returns `None` for an empty input so the caller can show an
/// "insufficient data" state instead of an empty chart.
pub fn to_chart_series(
    summaries: &[PeriodSummary],
    metrics: &[Metric],
    granularity: Granularity,
) -> Option<ChartSeries> {
    if summaries.is_empty() {
        return None;
    }

    let labels = summaries
        .iter()
        .map(|s| granularity.label(s.start_date))
        .collect();

    let datasets = metrics
        .iter()
        .map(|metric| Dataset {
            label: metric.label().to_string(),
            values: summaries.iter().map(|s| metric.value(s)).collect(),
        })
        .collect();

    Some(ChartSeries { labels, datasets })
}

/// Average-weight line over the summaries that have one
pub fn to_weight_series(
    summaries: &[PeriodSummary],
    granularity: Granularity,
) -> Option<ChartSeries> {
    let weighed: Vec<_> = summaries
        .iter()
        .filter_map(|s| s.average_weight.map(|w| (s.start_date, w)))
        .collect();

    if weighed.is_empty() {
        return None;
    }

    Some(ChartSeries {
        labels: weighed.iter().map(|(d, _)| granularity.label(*d)).collect(),
        datasets: vec![Dataset {
            label: "Average Weight (lbs)".to_string(),
            values: weighed.iter().map(|(_, w)| *w).collect(),
        }],
    })
}

/// Tooltip footer for a net-calorie bar worth at least a pound
pub fn weight_change_note(net_calories: i64) -> Option<String> {
    let pounds = net_calories.unsigned_abs() as f64 / CALORIES_PER_POUND;
    if net_calories < -(CALORIES_PER_POUND as i64) {
        Some(format!("Estimated Weight Loss: {:.1} lbs", pounds))
    } else if net_calories > CALORIES_PER_POUND as i64 {
        Some(format!("Estimated Weight Gain: {:.1} lbs", pounds))
    } else {
        None
    }
}

// ============================================================================
// Yearly Table and Insights
// ============================================================================

/// Badge shown next to a month's net calories
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NetBalanceStatus {
    NoData,
    StrongDeficit,
    ModerateDeficit,
    ModerateSurplus,
    StrongSurplus,
}

impl NetBalanceStatus {
    pub fn classify(summary: &PeriodSummary) -> Self {
        if !summary.has_data() {
            return NetBalanceStatus::NoData;
        }
        match summary.net_calories_total {
            n if n < -STRONG_BALANCE => NetBalanceStatus::StrongDeficit,
            n if n < 0 => NetBalanceStatus::ModerateDeficit,
            n if n < STRONG_BALANCE => NetBalanceStatus::ModerateSurplus,
            _ => NetBalanceStatus::StrongSurplus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NetBalanceStatus::NoData => "No Data",
            NetBalanceStatus::StrongDeficit => "Strong Deficit",
            NetBalanceStatus::ModerateDeficit => "Moderate Deficit",
            NetBalanceStatus::ModerateSurplus => "Moderate Surplus",
            NetBalanceStatus::StrongSurplus => "Strong Surplus",
        }
    }
}

/// One month of the yearly breakdown table
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthRow {
    pub label: String,
    /// Pro-rated by days tracked
    pub net_calories: i64,
    pub weight_change_lbs: f64,
    /// `10/30 days`, or `None` when nothing was tracked
    pub days_tracked: String,
    pub status: NetBalanceStatus,
}

/// Rows for the yearly breakdown table, in input order
pub fn yearly_table(monthly: &[PeriodSummary]) -> Vec<MonthRow> {
    monthly
        .iter()
        .map(|month| {
            let prorated = month.prorated();
            let days_tracked = if month.has_data() {
                format!("{}/{} days", month.days_with_data, month.days_in_period)
            } else {
                "None".to_string()
            };
            MonthRow {
                label: Granularity::Month.label(month.start_date),
                net_calories: prorated.net_calories_total,
                weight_change_lbs: estimated_weight_change_lbs(prorated.net_calories_total),
                days_tracked,
                status: NetBalanceStatus::classify(&prorated),
            }
        })
        .collect()
}

/// Overall direction of the year
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    StrongProgress,
    ModerateProgress,
    SlightSurplus,
    SignificantSurplus,
}

impl Trend {
    pub fn from_total(total_net_calories: i64) -> Self {
        match total_net_calories {
            n if n < -YEARLY_TREND_BAND => Trend::StrongProgress,
            n if n < 0 => Trend::ModerateProgress,
            n if n < YEARLY_TREND_BAND => Trend::SlightSurplus,
            _ => Trend::SignificantSurplus,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Trend::StrongProgress => "Strong progress toward weight loss goals",
            Trend::ModerateProgress => "Moderate progress toward weight loss goals",
            Trend::SlightSurplus => "Slight calorie surplus for the year",
            Trend::SignificantSurplus => "Significant calorie surplus for the year",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    KeepGoing,
    TrackConsistently,
    AdjustIntake,
    SmallAdjustments,
}

impl Recommendation {
    pub fn from_stats(stats: &YearlyStats) -> Self {
        if stats.total_net_calories < 0 {
            Recommendation::KeepGoing
        } else if stats.months_tracked < MIN_MONTHS_FOR_ADVICE {
            Recommendation::TrackConsistently
        } else if stats.total_net_calories > YEARLY_TREND_BAND {
            Recommendation::AdjustIntake
        } else {
            Recommendation::SmallAdjustments
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::KeepGoing => {
                "Continue your current approach - you're making progress!"
            }
            Recommendation::TrackConsistently => "Track consistently to get better insights",
            Recommendation::AdjustIntake => {
                "Consider adjusting your calorie intake or increasing activity"
            }
            Recommendation::SmallAdjustments => {
                "Make small adjustments to achieve a calorie deficit"
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthHighlight {
    pub label: String,
    pub net_calories: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct YearlyInsights {
    /// Lowest net calories among tracked months
    pub best_month: Option<MonthHighlight>,
    /// Highest net calories among tracked months
    pub challenging_month: Option<MonthHighlight>,
    pub trend: Trend,
    pub recommendation: Recommendation,
}

/// Insight cards for a year, `None` when no month has any entries
///
/// Best and challenging months compare raw monthly net totals over months
/// with logged calories; ties go to the earlier month.
pub fn yearly_insights(monthly: &[PeriodSummary], stats: &YearlyStats) -> Option<YearlyInsights> {
    if !monthly.iter().any(|m| m.has_entries()) {
        return None;
    }

    let highlight = |m: &PeriodSummary| MonthHighlight {
        label: Granularity::Month.label(m.start_date),
        net_calories: m.net_calories_total,
    };

    let logged = || monthly.iter().filter(|m| m.has_calories());

    Some(YearlyInsights {
        best_month: logged().min_by_key(|m| m.net_calories_total).map(highlight),
        challenging_month: logged()
            .min_by_key(|m| Reverse(m.net_calories_total))
            .map(highlight),
        trend: Trend::from_total(stats.total_net_calories),
        recommendation: Recommendation::from_stats(stats),
    })
}

// ============================================================================
// Daily Snapshot
// ============================================================================

/// Today's dashboard figures
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub food_calories: u32,
    pub exercise_calories: u32,
    /// `None` until the profile has a metabolic rate
    pub budget: Option<i64>,
    pub net_calories: i64,
    pub goal_progress_percent: u8,
    /// The profile still needs a metabolic rate
    pub needs_setup: bool,
    pub weight_lbs: Option<f64>,
}

pub fn daily_snapshot(record: &DailyRecord, profile: &UserProfile) -> DailySnapshot {
    let budget = compute_caloric_budget(profile.metabolic_rate, profile.weight_loss_goal);

    DailySnapshot {
        date: record.date,
        food_calories: record.total_food_calories,
        exercise_calories: record.total_exercise_calories,
        budget,
        net_calories: profile.net_calories_for(record),
        goal_progress_percent: compute_goal_progress_percent(
            budget,
            record.total_food_calories,
            record.total_exercise_calories,
        ),
        needs_setup: profile.metabolic_rate.is_none(),
        weight_lbs: record.weight_lbs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{monthly_summaries, split_days, yearly_rollup};
    use crate::{DateRange, PeriodKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile() -> UserProfile {
        UserProfile {
            metabolic_rate: Some(2000),
            weight_loss_goal: Some(0.5),
            ..UserProfile::default()
        }
    }

    fn month(month: u32, days_with_data: u32, net: i64) -> PeriodSummary {
        let range = DateRange::month(2024, month).unwrap();
        PeriodSummary {
            start_date: range.start,
            end_date: range.end,
            kind: PeriodKind::Month,
            total_food_calories: if days_with_data > 0 { 45_000 } else { 0 },
            total_exercise_calories: 0,
            net_calories_total: net,
            days_in_period: range.num_days(),
            days_with_data,
            average_weight: None,
        }
    }

    #[test]
    fn test_empty_input_is_sentinel() {
        assert_eq!(to_chart_series(&[], &Metric::ALL, Granularity::Weekday), None);
        assert_eq!(to_weight_series(&[], Granularity::Month), None);
    }

    #[test]
    fn test_weekly_series_aligned() {
        let records = vec![
            DailyRecord::new(date(2024, 1, 3), 1500, 300),
            DailyRecord::new(date(2024, 1, 5), 2000, 0),
        ];
        let week = DateRange::week_containing(date(2024, 1, 3), 2);
        let days = split_days(&records, week, &profile());

        let chart = to_chart_series(&days, &Metric::ALL, Granularity::Weekday).unwrap();
        assert_eq!(chart.len(), 7);
        assert_eq!(chart.labels[0], "Wed");
        assert_eq!(chart.labels[6], "Tue");
        assert_eq!(chart.datasets.len(), 3);
        for dataset in &chart.datasets {
            assert_eq!(dataset.values.len(), chart.labels.len());
        }

        let net = &chart.datasets[2];
        assert_eq!(net.label, "Net Calories");
        assert_eq!(net.values, vec![550.0, 0.0, -250.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_series_subset_and_labels() {
        let summaries = vec![month(1, 5, -100), month(2, 0, 0)];
        let chart = to_chart_series(&summaries, &[Metric::Net], Granularity::Month).unwrap();
        assert_eq!(chart.labels, vec!["Jan", "Feb"]);
        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].values, vec![-100.0, 0.0]);

        assert_eq!(Granularity::DayOfMonth.label(date(2024, 1, 7)), "7");
        assert_eq!(Granularity::Date.label(date(2024, 1, 7)), "2024-01-07");
    }

    #[test]
    fn test_weight_series_skips_unweighed() {
        let mut summaries = vec![month(1, 0, 0), month(2, 0, 0), month(3, 0, 0)];
        summaries[0].average_weight = Some(181.2);
        summaries[2].average_weight = Some(179.4);

        let chart = to_weight_series(&summaries, Granularity::Month).unwrap();
        assert_eq!(chart.labels, vec!["Jan", "Mar"]);
        assert_eq!(chart.datasets[0].values, vec![181.2, 179.4]);
    }

    #[test]
    fn test_weight_change_note() {
        assert_eq!(weight_change_note(3500), None);
        assert_eq!(weight_change_note(-3500), None);
        assert_eq!(
            weight_change_note(-7000).as_deref(),
            Some("Estimated Weight Loss: 2.0 lbs")
        );
        assert_eq!(
            weight_change_note(5250).as_deref(),
            Some("Estimated Weight Gain: 1.5 lbs")
        );
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(NetBalanceStatus::classify(&month(1, 0, -9000)), NetBalanceStatus::NoData);
        assert_eq!(NetBalanceStatus::classify(&month(1, 3, -7001)), NetBalanceStatus::StrongDeficit);
        assert_eq!(NetBalanceStatus::classify(&month(1, 3, -7000)), NetBalanceStatus::ModerateDeficit);
        assert_eq!(NetBalanceStatus::classify(&month(1, 3, 0)), NetBalanceStatus::ModerateSurplus);
        assert_eq!(NetBalanceStatus::classify(&month(1, 3, 7000)), NetBalanceStatus::StrongSurplus);
    }

    #[test]
    fn test_yearly_table_prorates() {
        // April: 30 days, 10 tracked
        let rows = yearly_table(&[month(4, 10, -30_000), month(5, 0, 0)]);

        assert_eq!(rows[0].label, "Apr");
        assert_eq!(rows[0].net_calories, -10_000);
        assert_eq!(rows[0].days_tracked, "10/30 days");
        assert_eq!(rows[0].status, NetBalanceStatus::StrongDeficit);
        assert!((rows[0].weight_change_lbs + 10_000.0 / 3500.0).abs() < 1e-9);

        assert_eq!(rows[1].days_tracked, "None");
        assert_eq!(rows[1].status, NetBalanceStatus::NoData);
    }

    #[test]
    fn test_yearly_insights() {
        let monthly = vec![
            month(1, 10, -4000),
            month(2, 0, 0),
            month(3, 12, 2500),
            month(4, 8, -4000),
        ];
        let stats = yearly_rollup(&monthly);
        let insights = yearly_insights(&monthly, &stats).unwrap();

        let best = insights.best_month.unwrap();
        assert_eq!(best.label, "Jan");
        assert_eq!(best.net_calories, -4000);
        assert_eq!(insights.challenging_month.unwrap().label, "Mar");
        assert_eq!(insights.trend, Trend::from_total(stats.total_net_calories));
        assert_eq!(insights.recommendation, Recommendation::KeepGoing);
    }

    #[test]
    fn test_no_insights_without_entries() {
        let monthly = monthly_summaries(&[], 2024, &profile()).unwrap();
        let stats = yearly_rollup(&monthly);
        assert_eq!(yearly_insights(&monthly, &stats), None);
    }

    #[test]
    fn test_recommendation_rules() {
        let mut stats = yearly_rollup(&[]);
        stats.total_net_calories = 500;
        stats.months_tracked = 2;
        assert_eq!(Recommendation::from_stats(&stats), Recommendation::TrackConsistently);

        stats.months_tracked = 6;
        assert_eq!(Recommendation::from_stats(&stats), Recommendation::SmallAdjustments);

        stats.total_net_calories = 10_001;
        assert_eq!(Recommendation::from_stats(&stats), Recommendation::AdjustIntake);
        assert_eq!(Trend::from_total(10_001), Trend::SignificantSurplus);
        assert_eq!(Trend::from_total(-10_001), Trend::StrongProgress);
    }

    #[test]
    fn test_daily_snapshot_setup_required() {
        let record = DailyRecord::new(date(2024, 1, 3), 1500, 300);

        let unset = daily_snapshot(&record, &UserProfile::default());
        assert!(unset.needs_setup);
        assert_eq!(unset.budget, None);
        assert_eq!(unset.goal_progress_percent, 0);
        // Net calories still fall back to the 2000 default
        assert_eq!(unset.net_calories, 800);

        let set = daily_snapshot(&record, &profile());
        assert!(!set.needs_setup);
        assert_eq!(set.budget, Some(1750));
        assert_eq!(set.net_calories, 550);
        // 550 / 1750
        assert_eq!(set.goal_progress_percent, 31);
    }
}

//! Derived nutrition metrics.
//!
//! Pure functions turning a day's logged calories and the user's profile
//! into the numbers every report shows:
//! - Net calories: budget left after food, with exercise added back
//! - Caloric budget: metabolic rate minus the daily share of the weekly goal
//! - Goal progress: remaining budget as a 0-100 percentage
//! - BMR estimate: Mifflin-St Jeor from height, weight and age
//!
//! Missing profile values degrade to documented sentinels rather than errors.

use crate::dates::parse_date_lenient;
use crate::{DailyRecord, Sex, UserProfile, CALORIES_PER_POUND, DEFAULT_METABOLIC_RATE};
use chrono::{Datelike, NaiveDate};

const DAYS_PER_WEEK: f64 = 7.0;
const KG_PER_LB: f64 = 0.453592;

/// Round half-way values toward positive infinity
///
/// `-2.5` becomes `-2`, not `-3`. Net calories are routinely negative, and
/// this keeps them identical to what the web client has always displayed.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Daily calorie adjustment for a weekly weight goal in pounds
pub fn weekly_goal_to_daily(weight_loss_goal: f64) -> f64 {
    weight_loss_goal * CALORIES_PER_POUND / DAYS_PER_WEEK
}

/// Net calories for one day
///
/// Returns 0 for a day with nothing logged, even though the budget minus
/// zero would not be. Otherwise the result is never clamped; its sign is
/// what the deficit/surplus badges in the reports are keyed on.
///
/// An unset metabolic rate falls back to 2000 and an unset goal to 0.
pub fn compute_net_calories(
    food_calories: u32,
    exercise_calories: u32,
    metabolic_rate: Option<u32>,
    weight_loss_goal: Option<f64>,
) -> i64 {
    if food_calories == 0 && exercise_calories == 0 {
        return 0;
    }

    let metabolic_rate = f64::from(metabolic_rate.unwrap_or(DEFAULT_METABOLIC_RATE));
    let daily_goal = weekly_goal_to_daily(weight_loss_goal.unwrap_or(0.0));

    round_half_up(
        metabolic_rate - daily_goal - f64::from(food_calories) + f64::from(exercise_calories),
    )
}

/// Daily caloric budget
///
/// `None` until the user has set a metabolic rate. There is deliberately no
/// default here: callers show a "set up metabolic rate" prompt instead.
pub fn compute_caloric_budget(
    metabolic_rate: Option<u32>,
    weight_loss_goal: Option<f64>,
) -> Option<i64> {
    let metabolic_rate = metabolic_rate?;
    let daily_goal = weekly_goal_to_daily(weight_loss_goal.unwrap_or(0.0));
    Some(round_half_up(f64::from(metabolic_rate) - daily_goal))
}

/// Share of the budget still left, as a whole percentage in `0..=100`
///
/// No budget (or a zero budget) reports 0.
pub fn compute_goal_progress_percent(
    budget: Option<i64>,
    food_calories: u32,
    exercise_calories: u32,
) -> u8 {
    let budget = match budget {
        Some(b) if b != 0 => b as f64,
        _ => return 0,
    };

    let remaining = budget - f64::from(food_calories) + f64::from(exercise_calories);
    let percent = round_half_up(remaining / budget * 100.0);
    percent.clamp(0, 100) as u8
}

/// Whole years between `date_of_birth` and `today`
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Estimate basal metabolic rate with the Mifflin-St Jeor equation
///
/// Returns `None` when height, weight or date of birth is missing, when
/// height or weight is not positive, or when the date of birth doesn't parse.
pub fn estimate_bmr(
    height_cm: Option<f64>,
    weight_lbs: Option<f64>,
    date_of_birth: Option<&str>,
    sex: Sex,
    today: NaiveDate,
) -> Option<i64> {
    let height_cm = height_cm.filter(|h| *h > 0.0)?;
    let weight_lbs = weight_lbs.filter(|w| *w > 0.0)?;
    let dob = match date_of_birth.and_then(parse_date_lenient) {
        Some(dob) => dob,
        None => {
            tracing::debug!("BMR unavailable: date of birth {:?} unusable", date_of_birth);
            return None;
        }
    };

    let age = f64::from(age_on(dob, today));
    let weight_kg = weight_lbs * KG_PER_LB;
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age;

    let bmr = match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    };

    Some(round_half_up(bmr))
}

/// Pounds gained (positive) or lost (negative) for a calorie balance
pub fn estimated_weight_change_lbs(net_calories: i64) -> f64 {
    net_calories as f64 / CALORIES_PER_POUND
}

impl UserProfile {
    /// Net calories for one day under this profile
    pub fn net_calories_for(&self, record: &DailyRecord) -> i64 {
        compute_net_calories(
            record.total_food_calories,
            record.total_exercise_calories,
            self.metabolic_rate,
            self.weight_loss_goal,
        )
    }

    /// Daily target shown on the profile page; same rule as the budget
    pub fn daily_target(&self) -> Option<i64> {
        compute_caloric_budget(self.metabolic_rate, self.weight_loss_goal)
    }

    pub fn estimated_bmr(&self, today: NaiveDate) -> Option<i64> {
        estimate_bmr(
            self.height_cm,
            self.weight_lbs,
            self.date_of_birth.as_deref(),
            self.sex,
            today,
        )
    }
}

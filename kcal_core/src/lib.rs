#![forbid(unsafe_code)]

//! Core domain model and nutrition metrics for kcal.
//!
//! This crate provides:
//! - Domain types (daily records, user profile, periods)
//! - Metrics (net calories, caloric budget, goal progress, BMR)
//! - Period aggregation and pro-ration
//! - Report projections (chart series, yearly table and insights)
//! - REST payload shapes and the token refresh state machine
//! - Record import, configuration and logging

pub mod types;
pub mod error;
pub mod dates;
pub mod metrics;
pub mod period;
pub mod report;
pub mod payload;
pub mod session;
pub mod import;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use dates::{Clock, FixedClock, SystemClock};
pub use metrics::{compute_caloric_budget, compute_goal_progress_percent, compute_net_calories, estimate_bmr};
pub use period::{aggregate, monthly_summaries, start_of_current_week, yearly_rollup, YearlyStats};
pub use report::{to_chart_series, yearly_insights, yearly_table, ChartSeries};
pub use session::SessionManager;

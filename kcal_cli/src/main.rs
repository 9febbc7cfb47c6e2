use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use kcal_core::dates::{format_api_date, parse_local_date};
use kcal_core::import::{
    append_records, daily_log_path, is_csv_path, load_records, load_yearly_report,
};
use kcal_core::metrics::estimated_weight_change_lbs;
use kcal_core::period::{record_on, split_days};
use kcal_core::report::{
    daily_snapshot, to_chart_series, to_weight_series, weight_change_note, DailySnapshot,
    Granularity, Metric,
};
use kcal_core::*;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kcal")]
#[command(about = "Calorie tracking metrics and reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: $XDG_CONFIG_HOME/kcal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read records from this CSV or JSON file instead of the daily log
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    today: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Override the profile's metabolic rate (calories/day)
    #[arg(long, global = true)]
    metabolic_rate: Option<u32>,

    /// Override the weekly weight goal (lb/week, negative to gain)
    #[arg(long, global = true, allow_negative_numbers = true)]
    weight_loss_goal: Option<f64>,

    /// Override the first day of the week (0 = Monday .. 6 = Sunday)
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=6))]
    start_of_week: Option<u8>,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's net calories, budget and goal progress (default)
    Today,

    /// Daily breakdown and totals for a week
    Week {
        /// Any date within the week (default: today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Daily breakdown and totals for a month
    Month {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        #[arg(long)]
        year: Option<i32>,
    },

    /// Monthly table and insights for a year
    Year {
        #[arg(long)]
        year: Option<i32>,

        /// Saved yearly report response to use instead of daily records
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Estimated basal metabolic rate from the profile
    Bmr,

    /// First day of the week containing a date
    WeekStart {
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Append a day's totals to the daily log
    Log {
        /// Date of the entry (default: today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = 0)]
        food: u32,

        #[arg(long, default_value_t = 0)]
        exercise: u32,

        #[arg(long)]
        weight: Option<f64>,
    },
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_local_date(s).map_err(|e| e.to_string())
}

/// Everything a command needs once flags and config are merged
struct Context {
    profile: UserProfile,
    records_path: PathBuf,
    today: NaiveDate,
    json: bool,
}

impl Context {
    fn records(&self) -> Result<Vec<DailyRecord>> {
        load_records(&self.records_path)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    kcal_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(rate) = cli.metabolic_rate {
        config.profile.metabolic_rate = Some(rate);
    }
    if let Some(goal) = cli.weight_loss_goal {
        config.profile.weight_loss_goal = Some(goal);
    }
    if let Some(start) = cli.start_of_week {
        config.profile.start_of_week = start;
    }
    config.validate()?;

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let clock: Box<dyn Clock> = match cli.today {
        Some(date) => Box::new(FixedClock::on(date)),
        None => Box::new(SystemClock),
    };

    let ctx = Context {
        profile: config.profile.clone(),
        records_path: cli.input.unwrap_or_else(|| daily_log_path(&data_dir)),
        today: clock.today(),
        json: cli.json || config.report.json,
    };
    tracing::debug!("Reading records from {:?}", ctx.records_path);

    match cli.command {
        Some(Commands::Today) | None => cmd_today(&ctx),
        Some(Commands::Week { date }) => cmd_week(&ctx, date.unwrap_or(ctx.today)),
        Some(Commands::Month { month, year }) => cmd_month(
            &ctx,
            year.unwrap_or(ctx.today.year()),
            month.unwrap_or(ctx.today.month()),
        ),
        Some(Commands::Year { year, report }) => {
            cmd_year(&ctx, year.unwrap_or(ctx.today.year()), report)
        }
        Some(Commands::Bmr) => cmd_bmr(&ctx),
        Some(Commands::WeekStart { date }) => cmd_week_start(&ctx, date.unwrap_or(ctx.today)),
        Some(Commands::Log {
            date,
            food,
            exercise,
            weight,
        }) => cmd_log(&ctx, date.unwrap_or(ctx.today), food, exercise, weight),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_today(ctx: &Context) -> Result<()> {
    let records = ctx.records()?;
    let record = record_on(&records, ctx.today);
    let snapshot = daily_snapshot(&record, &ctx.profile);

    if ctx.json {
        return print_json(&serde_json::to_value(&snapshot)?);
    }

    display_snapshot(&snapshot);
    Ok(())
}

fn display_snapshot(snapshot: &DailySnapshot) {
    println!("{}", format_api_date(snapshot.date));
    println!("  Food:      {} kcal", snapshot.food_calories);
    println!("  Exercise:  {} kcal", snapshot.exercise_calories);
    println!("  Net:       {} kcal", snapshot.net_calories);
    match snapshot.budget {
        Some(budget) => {
            println!("  Budget:    {} kcal", budget);
            println!("  Remaining: {}%", snapshot.goal_progress_percent);
        }
        None => println!("  Budget:    set a metabolic rate to see your daily budget"),
    }
    if let Some(weight) = snapshot.weight_lbs {
        println!("  Weight:    {:.1} lbs", weight);
    }
}

fn cmd_week(ctx: &Context, date: NaiveDate) -> Result<()> {
    let records = ctx.records()?;
    let range = DateRange::week_containing(date, ctx.profile.start_of_week);
    let summary = aggregate(&records, range, &ctx.profile);
    let days = split_days(&records, range, &ctx.profile);

    if ctx.json {
        return print_json(&json!({
            "summary": summary,
            "days": days,
            "chart": to_chart_series(&days, &Metric::ALL, Granularity::Weekday),
        }));
    }

    println!(
        "Week of {} to {}",
        format_api_date(range.start),
        format_api_date(range.end)
    );
    display_days(&days, Granularity::Weekday);
    display_totals(&summary);
    Ok(())
}

fn cmd_month(ctx: &Context, year: i32, month: u32) -> Result<()> {
    let records = ctx.records()?;
    let range = DateRange::month(year, month)?;
    let summary = aggregate(&records, range, &ctx.profile);
    let days = split_days(&records, range, &ctx.profile);

    if ctx.json {
        return print_json(&json!({
            "summary": summary,
            "days": days,
            "chart": to_chart_series(&days, &Metric::ALL, Granularity::DayOfMonth),
            "weight": to_weight_series(&days, Granularity::DayOfMonth),
        }));
    }

    println!("{}", range.start.format("%B %Y"));
    display_days(&days, Granularity::DayOfMonth);
    display_totals(&summary);
    if let Some(weight) = summary.average_weight {
        println!("  Average weight: {:.1} lbs", weight);
    }
    Ok(())
}

fn display_days(days: &[PeriodSummary], granularity: Granularity) {
    for day in days.iter().filter(|d| d.has_entries()) {
        let weight = day
            .average_weight
            .map(|w| format!("  {:.1} lbs", w))
            .unwrap_or_default();
        println!(
            "  {:>4} {}  food {:>5}  exercise {:>5}  net {:>6}{}",
            granularity.label(day.start_date),
            format_api_date(day.start_date),
            day.total_food_calories,
            day.total_exercise_calories,
            day.net_calories_total,
            weight
        );
    }
}

fn display_totals(summary: &PeriodSummary) {
    println!();
    println!(
        "Total: food {}, exercise {}, net {} ({}/{} days tracked)",
        summary.total_food_calories,
        summary.total_exercise_calories,
        summary.net_calories_total,
        summary.days_with_data,
        summary.days_in_period
    );
    if summary.has_data() {
        println!(
            "  Estimated weight change: {:+.1} lbs",
            estimated_weight_change_lbs(summary.net_calories_total)
        );
    }
}

fn cmd_year(ctx: &Context, year: i32, report: Option<PathBuf>) -> Result<()> {
    let monthly = match report {
        Some(path) => load_yearly_report(&path)?.monthly_summaries()?,
        None => monthly_summaries(&ctx.records()?, year, &ctx.profile)?,
    };

    let stats = yearly_rollup(&monthly);
    let table = yearly_table(&monthly);
    let insights = yearly_insights(&monthly, &stats);

    if ctx.json {
        return print_json(&json!({
            "stats": stats,
            "months": table,
            "insights": insights,
        }));
    }

    let year = monthly.first().map(|m| m.start_date.year()).unwrap_or(year);
    println!("{}", year);
    for row in &table {
        println!(
            "  {}  net {:>7}  {:>+6.1} lbs  {:>12}  {}",
            row.label,
            row.net_calories,
            row.weight_change_lbs,
            row.days_tracked,
            row.status.label()
        );
    }

    println!();
    println!("Total net calories: {}", stats.total_net_calories);
    println!("Months tracked: {}", stats.months_tracked);
    println!("Average per month: {}", stats.average_monthly_calories);
    if let Some(note) = weight_change_note(stats.total_net_calories) {
        println!("{}", note);
    }
    if let Some(weight) = stats.current_weight {
        println!("Current weight: {:.1} lbs", weight);
    }

    match insights {
        Some(insights) => {
            println!();
            if let Some(best) = &insights.best_month {
                println!("Best month: {} ({})", best.label, best.net_calories);
            }
            if let Some(worst) = &insights.challenging_month {
                println!("Most challenging month: {} ({})", worst.label, worst.net_calories);
            }
            println!("{}", insights.trend.message());
            println!("{}", insights.recommendation.message());
        }
        None => println!("No entries for this year."),
    }

    Ok(())
}

fn cmd_bmr(ctx: &Context) -> Result<()> {
    let bmr = ctx.profile.estimated_bmr(ctx.today);

    if ctx.json {
        return print_json(&json!({
            "bmr": bmr,
            "daily_target": ctx.profile.daily_target(),
        }));
    }

    match bmr {
        Some(bmr) => println!("Estimated BMR: {} kcal/day", bmr),
        None => println!("Not enough profile data: set height_cm, weight_lbs and date_of_birth"),
    }
    if let Some(target) = ctx.profile.daily_target() {
        println!("Daily target: {} kcal/day", target);
    }
    Ok(())
}

fn cmd_week_start(ctx: &Context, date: NaiveDate) -> Result<()> {
    let start = start_of_current_week(date, ctx.profile.start_of_week);

    if ctx.json {
        return print_json(&json!({ "week_start": format_api_date(start) }));
    }

    println!("{}", format_api_date(start));
    Ok(())
}

fn cmd_log(
    ctx: &Context,
    date: NaiveDate,
    food: u32,
    exercise: u32,
    weight: Option<f64>,
) -> Result<()> {
    if !is_csv_path(&ctx.records_path) {
        return Err(Error::Import(format!(
            "can only log to a CSV file, not {:?}",
            ctx.records_path
        )));
    }

    let mut record = DailyRecord::new(date, food, exercise);
    record.weight_lbs = weight;
    append_records(&ctx.records_path, &[record.clone()])?;

    println!(
        "✓ Logged {}: food {}, exercise {}, net {}",
        format_api_date(date),
        food,
        exercise,
        ctx.profile.net_calories_for(&record)
    );
    println!("  Log: {}", ctx.records_path.display());
    Ok(())
}

//! Analytics report commands for the CLI.

use chrono::{Datelike, Days};
use clap::Subcommand;
use habitrail_core::{calendar, Period, Settings};

use crate::data;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Cross-habit overview for today
    Overview,
    /// Windowed report for one habit
    Habit {
        /// Habit ID
        id: String,
        /// Reporting window: 7days, 30days, 90days, or 365days
        #[arg(long)]
        period: Option<String>,
    },
    /// Completion summary for one day
    Daily {
        /// Date to report on (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Day-by-day breakdown of one week
    Weekly {
        /// First day of the week (YYYY-MM-DD, default: the week ending today)
        #[arg(long)]
        start: Option<String>,
    },
    /// Day-by-day breakdown of one month
    Monthly {
        /// Year (default: current year)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default: current month)
        #[arg(long)]
        month: Option<u32>,
    },
    /// One summary row per active habit
    Summary {
        /// Reporting window: 7days, 30days, 90days, or 365days
        #[arg(long)]
        period: Option<String>,
    },
}

fn resolve_period(period: Option<String>, settings: &Settings) -> Period {
    match period {
        Some(value) => Period::parse(&value),
        None => settings.analytics.default_period,
    }
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = data::open_tracker()?;
    let settings = Settings::load_or_default();

    match action {
        StatsAction::Overview => {
            let report = tracker.overview_report()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Habit { id, period } => {
            let report = tracker.habit_report(&id, resolve_period(period, &settings))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Daily { date } => {
            let date = match date {
                Some(raw) => calendar::parse_date(&raw)?,
                None => calendar::today(),
            };
            let report = tracker.daily_report(date)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Weekly { start } => {
            let start = match start {
                Some(raw) => calendar::parse_date(&raw)?,
                None => calendar::today()
                    .checked_sub_days(Days::new(6))
                    .unwrap_or_else(calendar::today),
            };
            let report = tracker.weekly_report(start)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Monthly { year, month } => {
            let today = calendar::today();
            let report = tracker
                .monthly_report(year.unwrap_or(today.year()), month.unwrap_or(today.month()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Summary { period } => {
            let rows = tracker.summary_report(resolve_period(period, &settings))?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

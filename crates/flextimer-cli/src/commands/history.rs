use chrono::{Datelike, NaiveDate};
use clap::Subcommand;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Items finished on one day
    Day {
        /// Date as YYYY-MM-DD (default: today)
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Days of a month with recorded items
    Calendar {
        /// Year (default: current year)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default: current month)
        #[arg(long)]
        month: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: HistoryAction) -> CliResult {
    let session = open_session()?;
    let history = session.history();

    match action {
        HistoryAction::Day { date, json } => {
            let date = date.unwrap_or_else(|| session.today());
            let records = history.records_for_date(date);
            if json {
                print_json(&records)?;
                return Ok(());
            }
            if records.is_empty() {
                println!("No records for {date}.");
                return Ok(());
            }
            println!("{date}");
            for record in records {
                println!(
                    "  {}  {:<30} plan {:>3}m  used {:>3}m  {}",
                    record.completed_at.format("%H:%M"),
                    record.title,
                    record.plan_min,
                    record.used_min,
                    record.status.as_str(),
                );
            }
            let summary = history.day_summary(date);
            println!(
                "  {} item(s), plan {}m, used {}m",
                summary.records, summary.plan_min, summary.used_min
            );
        }
        HistoryAction::Calendar { year, month, json } => {
            let today = session.today();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let dates: Vec<NaiveDate> = history.dates_with_activity(year, month)?.collect();

            if json {
                let days: Vec<_> = dates
                    .iter()
                    .map(|date| {
                        serde_json::json!({
                            "date": date,
                            "summary": history.day_summary(*date),
                        })
                    })
                    .collect();
                print_json(&days)?;
            } else if dates.is_empty() {
                println!("No activity in {year}-{month:02}.");
            } else {
                for date in dates {
                    let summary = history.day_summary(date);
                    println!(
                        "{date}  {} item(s)  used {}m",
                        summary.records, summary.used_min
                    );
                }
            }
        }
    }
    Ok(())
}

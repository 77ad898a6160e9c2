use std::path::PathBuf;

use clap::Subcommand;
use flextimer_core::timer::format_clock;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum AgendaAction {
    /// Add an item to the end of the agenda
    Add {
        /// Item title (must be unique)
        title: String,
        /// Planned duration in minutes
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// List agenda items
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an item
    Delete {
        /// Position in the list (1-based)
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// Move an item to another position
    Move {
        /// Current position (1-based)
        #[arg(value_parser = parse_position)]
        from: usize,
        /// New position (1-based)
        #[arg(value_parser = parse_position)]
        to: usize,
    },
    /// Make an item the current one
    Select {
        /// Position in the list (1-based)
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// Put every item back to its planned time
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Clear a fully completed agenda
    Archive,
    /// Write the agenda as CSV
    Export {
        /// Output file (default: FlexTimer_review_<date>.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
}

/// Parse a 1-based position into a list index.
fn parse_position(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{s}' is not a position"))?;
    n.checked_sub(1)
        .ok_or_else(|| "positions start at 1".to_string())
}

pub fn run(action: AgendaAction) -> CliResult {
    let mut session = open_session()?;

    match action {
        AgendaAction::Add { title, minutes } => {
            let index = session.add(&title, minutes)?;
            println!("Added #{}: {} ({minutes} min)", index + 1, title.trim());
        }
        AgendaAction::List { json } => {
            let agenda = session.agenda();
            if json {
                print_json(&agenda.items())?;
            } else if agenda.is_empty() {
                println!("No agenda items.");
            } else {
                for (i, item) in agenda.items().iter().enumerate() {
                    let marker = if agenda.cursor() == Some(i) { '>' } else { ' ' };
                    println!(
                        "{marker} {:>2}. {:<30} {:>6}  plan {:>3}m  used {:>3}m  {}",
                        i + 1,
                        item.title,
                        format_clock(item.remaining_secs),
                        item.plan_min,
                        item.used_min(),
                        item.status.as_str(),
                    );
                }
            }
        }
        AgendaAction::Delete { position } => {
            let removed = session.delete(position)?;
            println!("Deleted: {}", removed.title);
        }
        AgendaAction::Move { from, to } => {
            session.reorder(from, to)?;
            println!("Moved #{} to #{}", from + 1, to + 1);
        }
        AgendaAction::Select { position } => {
            let event = session.select(position)?;
            print_json(&event)?;
        }
        AgendaAction::Reset { yes } => {
            if !yes {
                eprintln!("This resets every item to its planned time. Re-run with --yes.");
            }
            let event = session.reset_all(yes)?;
            print_json(&event)?;
        }
        AgendaAction::Archive => {
            let event = session.archive_and_clear()?;
            print_json(&event)?;
        }
        AgendaAction::Export { output, stdout } => {
            let csv = session.export_csv()?;
            if stdout {
                print!("{csv}");
            } else {
                let path = output.unwrap_or_else(|| PathBuf::from(session.export_file_name()));
                std::fs::write(&path, csv)?;
                println!("Exported to {}", path.display());
            }
        }
    }
    Ok(())
}

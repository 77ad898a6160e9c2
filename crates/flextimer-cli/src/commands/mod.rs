pub mod agenda;
pub mod config;
pub mod history;
pub mod timer;

use flextimer_core::{Database, Session};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Session over the on-disk database with no sound.
pub fn open_session() -> Result<Session<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(Session::open(db))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

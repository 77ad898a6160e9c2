use clap::Subcommand;
use flextimer_core::Settings;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting
    Get {
        /// Setting name (e.g. "font_color", "warning_seconds")
        key: String,
    },
    /// Change a setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    let mut session = open_session()?;

    match action {
        ConfigAction::Get { key } => match session.settings().get(&key) {
            Some(value) => println!("{value}"),
            None => {
                return Err(format!(
                    "unknown key: {key} (expected one of: {})",
                    Settings::FIELDS.join(", ")
                )
                .into())
            }
        },
        ConfigAction::Set { key, value } => {
            for event in session.set_setting(&key, &value)? {
                print_json(&event)?;
            }
        }
        ConfigAction::List => {
            print_json(session.settings())?;
        }
        ConfigAction::Reset => {
            session.reset_settings()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// The presentation layer polls them from command results; the audio
/// and shell collaborators react to the ones addressed to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Pre-roll countdown began for the item under the cursor.
    CountdownStarted {
        index: usize,
        title: String,
        beats: u8,
        at: DateTime<Local>,
    },
    /// One pre-roll beat elapsed; `remaining` beats are left.
    CountdownBeat {
        remaining: u8,
        at: DateTime<Local>,
    },
    /// Pre-roll was dropped before the item started.
    CountdownCancelled {
        index: usize,
        at: DateTime<Local>,
    },
    TimerStarted {
        index: usize,
        title: String,
        remaining_secs: i64,
        at: DateTime<Local>,
    },
    TimerPaused {
        index: usize,
        remaining_secs: i64,
        at: DateTime<Local>,
    },
    TimerResumed {
        index: usize,
        remaining_secs: i64,
        at: DateTime<Local>,
    },
    /// Remaining time hit the warning threshold.
    Warning {
        index: usize,
        title: String,
        remaining_secs: i64,
        at: DateTime<Local>,
    },
    /// Remaining time hit exactly zero.
    Completion {
        index: usize,
        title: String,
        at: DateTime<Local>,
    },
    /// Item marked done and written to history.
    ItemDone {
        index: usize,
        title: String,
        used_secs: u64,
        overtime_secs: u64,
        /// True when the overtime rule advanced on its own.
        auto: bool,
        at: DateTime<Local>,
    },
    /// The cursor ran off the end; every item has been played.
    AgendaCompleted {
        at: DateTime<Local>,
    },
    ItemSelected {
        index: usize,
        title: String,
        at: DateTime<Local>,
    },
    OvertimeToggled {
        enabled: bool,
        at: DateTime<Local>,
    },
    TimerReset {
        at: DateTime<Local>,
    },
    AgendaArchived {
        items: usize,
        at: DateTime<Local>,
    },
    SettingChanged {
        key: String,
        value: String,
        at: DateTime<Local>,
    },
    /// Window opacity request for the desktop shell (0.0 ..= 1.0).
    OpacityChanged {
        opacity: f64,
        at: DateTime<Local>,
    },
    /// Always-on-top request for the desktop shell.
    AlwaysOnTopChanged {
        enabled: bool,
        at: DateTime<Local>,
    },
    StateSnapshot {
        state: TimerState,
        cursor: Option<usize>,
        title: Option<String>,
        remaining_secs: i64,
        /// `MM:SS`, prefixed with `-` in overtime.
        display: String,
        status_line: String,
        warning: bool,
        overtime: bool,
        overtime_enabled: bool,
        done: usize,
        total: usize,
        at: DateTime<Local>,
    },
}

impl Event {
    /// True for the signals the audio collaborator plays.
    pub fn is_alert(&self) -> bool {
        matches!(self, Event::Warning { .. } | Event::Completion { .. })
    }
}

//! Read-only formatting helpers for the presentation layer.

use super::engine::TimerState;
use crate::agenda::AgendaStore;

/// Format seconds as `MM:SS`. Negative values (overtime) get a `-` prefix.
pub fn format_clock(secs: i64) -> String {
    let abs = secs.unsigned_abs();
    let sign = if secs < 0 { "-" } else { "" };
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

/// Whether the display should be in its warning style: inside the
/// warning window but not yet at zero.
pub fn in_warning_window(remaining_secs: i64, warning_secs: i64) -> bool {
    remaining_secs > 0 && remaining_secs <= warning_secs
}

/// One-line status text for the current state.
///
/// "All done" (every item played, cursor back at the start) is kept
/// distinct from an empty agenda.
pub fn status_line(state: TimerState, countdown: u8, agenda: &AgendaStore) -> String {
    if agenda.is_empty() {
        return "Add an agenda item to begin".to_string();
    }
    match state {
        TimerState::Countdown => format!("Starting in {countdown}"),
        TimerState::Running => match agenda.current() {
            Some(item) if item.is_overtime() => "Overtime".to_string(),
            _ => "Running".to_string(),
        },
        TimerState::Paused => "Paused".to_string(),
        TimerState::Idle if agenda.all_done() => "All done".to_string(),
        TimerState::Idle => "Ready".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format_pads_and_signs() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(-5), "-00:05");
        assert_eq!(format_clock(-125), "-02:05");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn warning_window_excludes_zero() {
        assert!(in_warning_window(10, 10));
        assert!(in_warning_window(1, 10));
        assert!(!in_warning_window(0, 10));
        assert!(!in_warning_window(11, 10));
        assert!(!in_warning_window(-3, 10));
    }

    #[test]
    fn empty_and_all_done_are_distinct() {
        let mut agenda = AgendaStore::new();
        assert_eq!(status_line(TimerState::Idle, 0, &agenda), "Add an agenda item to begin");

        agenda.add("A", 1).unwrap();
        assert_eq!(status_line(TimerState::Idle, 0, &agenda), "Ready");
        assert_eq!(status_line(TimerState::Countdown, 2, &agenda), "Starting in 2");
    }
}

mod display;
mod engine;

pub use display::{format_clock, in_warning_window, status_line};
pub use engine::{TimerEngine, TimerState, DEFAULT_WARNING_SECS, PREROLL_BEATS};

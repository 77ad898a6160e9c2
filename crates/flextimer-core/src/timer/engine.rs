//! Agenda timer engine.
//!
//! The engine is a tick-driven state machine. It owns no thread and no
//! timer: the host calls `tick()` once per elapsed second and every other
//! command when the user asks for it. The agenda and history it works on
//! are passed in, so the engine itself only holds the run state.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Countdown (3-2-1) -> Running <-> Paused
//!   ^                             |
//!   +----- skip past last item ---+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::default();
//! engine.start(&agenda, now);
//! // Once per second:
//! let events = engine.tick(&mut agenda, &mut history, now);
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::display::{format_clock, in_warning_window, status_line};
use crate::agenda::AgendaStore;
use crate::error::AgendaError;
use crate::events::Event;
use crate::history::{HistoryArchive, HistoryRecord};

/// Beats of the pre-roll countdown shown before an item starts.
pub const PREROLL_BEATS: u8 = 3;

/// Default warning threshold in seconds.
pub const DEFAULT_WARNING_SECS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    /// Pre-roll: the item is about to start, nothing is decremented yet.
    Countdown,
    Running,
    Paused,
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    state: TimerState,
    /// Beats left while in `Countdown`.
    countdown: u8,
    /// When false, an item that reaches zero is finished automatically.
    overtime_enabled: bool,
    warning_secs: i64,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(true, DEFAULT_WARNING_SECS)
    }
}

impl TimerEngine {
    /// Create an idle engine.
    pub fn new(overtime_enabled: bool, warning_secs: i64) -> Self {
        Self {
            state: TimerState::Idle,
            countdown: 0,
            overtime_enabled,
            warning_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// True while the item under the cursor is being timed or about to be.
    pub fn is_active(&self) -> bool {
        matches!(self.state, TimerState::Running | TimerState::Countdown)
    }

    pub fn countdown_remaining(&self) -> Option<u8> {
        (self.state == TimerState::Countdown).then_some(self.countdown)
    }

    pub fn overtime_enabled(&self) -> bool {
        self.overtime_enabled
    }

    pub fn warning_secs(&self) -> i64 {
        self.warning_secs
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, agenda: &AgendaStore, now: DateTime<Local>) -> Event {
        let current = agenda.current();
        let remaining_secs = current.map(|item| item.remaining_secs).unwrap_or(0);
        Event::StateSnapshot {
            state: self.state,
            cursor: agenda.cursor(),
            title: current.map(|item| item.title.clone()),
            remaining_secs,
            display: format_clock(remaining_secs),
            status_line: status_line(self.state, self.countdown, agenda),
            warning: current.is_some() && in_warning_window(remaining_secs, self.warning_secs),
            overtime: remaining_secs < 0,
            overtime_enabled: self.overtime_enabled,
            done: agenda.len() - agenda.pending(),
            total: agenda.len(),
            at: now,
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Takes effect from the next tick.
    pub fn set_overtime(&mut self, enabled: bool, now: DateTime<Local>) -> Event {
        self.overtime_enabled = enabled;
        debug!(enabled, "overtime extension toggled");
        Event::OvertimeToggled { enabled, at: now }
    }

    pub fn toggle_overtime(&mut self, now: DateTime<Local>) -> Event {
        self.set_overtime(!self.overtime_enabled, now)
    }

    pub fn set_warning_secs(&mut self, secs: i64) {
        self.warning_secs = secs;
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the current item. From `Idle` this begins the pre-roll;
    /// from `Paused` it resumes at once. Does nothing for an empty agenda,
    /// a done item, or a timer that is already going.
    pub fn start(&mut self, agenda: &AgendaStore, now: DateTime<Local>) -> Option<Event> {
        let index = agenda.cursor()?;
        let item = agenda.current()?;
        if item.is_done() {
            return None;
        }

        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Countdown;
                self.countdown = PREROLL_BEATS;
                debug!(index, title = %item.title, "pre-roll started");
                Some(Event::CountdownStarted {
                    index,
                    title: item.title.clone(),
                    beats: PREROLL_BEATS,
                    at: now,
                })
            }
            TimerState::Paused => {
                self.state = TimerState::Running;
                debug!(index, remaining = item.remaining_secs, "timer resumed");
                Some(Event::TimerResumed {
                    index,
                    remaining_secs: item.remaining_secs,
                    at: now,
                })
            }
            TimerState::Running | TimerState::Countdown => None,
        }
    }

    /// Pause a running item, freezing its remaining time. A pending
    /// pre-roll is cancelled instead.
    pub fn pause(&mut self, agenda: &AgendaStore, now: DateTime<Local>) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                let index = agenda.cursor()?;
                let remaining_secs = agenda.current()?.remaining_secs;
                self.state = TimerState::Paused;
                debug!(index, remaining = remaining_secs, "timer paused");
                Some(Event::TimerPaused {
                    index,
                    remaining_secs,
                    at: now,
                })
            }
            TimerState::Countdown => self.cancel_countdown(agenda, now),
            TimerState::Idle | TimerState::Paused => None,
        }
    }

    /// Start/pause button. During the pre-roll it cancels the start.
    pub fn toggle(&mut self, agenda: &AgendaStore, now: DateTime<Local>) -> Option<Event> {
        if matches!(self.state, TimerState::Running | TimerState::Countdown) {
            self.pause(agenda, now)
        } else {
            self.start(agenda, now)
        }
    }

    /// Drop a pending pre-roll so the item never starts.
    pub fn cancel_countdown(&mut self, agenda: &AgendaStore, now: DateTime<Local>) -> Option<Event> {
        if self.state != TimerState::Countdown {
            return None;
        }
        self.state = TimerState::Idle;
        self.countdown = 0;
        let index = agenda.cursor().unwrap_or(0);
        debug!(index, "pre-roll cancelled");
        Some(Event::CountdownCancelled { index, at: now })
    }

    /// Call once per elapsed second.
    ///
    /// During the pre-roll this consumes one beat. While running it
    /// charges one second to the current item, raises the warning and
    /// completion signals at their exact boundaries, and, with overtime
    /// extension off, finishes the item once it reaches zero.
    pub fn tick(
        &mut self,
        agenda: &mut AgendaStore,
        history: &mut HistoryArchive,
        now: DateTime<Local>,
    ) -> Vec<Event> {
        match self.state {
            TimerState::Countdown => self.tick_countdown(agenda, now),
            TimerState::Running => self.tick_running(agenda, history, now),
            TimerState::Idle | TimerState::Paused => Vec::new(),
        }
    }

    /// Finish the current item and move on to the next pending one. A done
    /// item is not recorded twice, but skipping it still moves the cursor.
    /// `AgendaCompleted` is only raised once every item is done.
    pub fn skip_to_next(
        &mut self,
        agenda: &mut AgendaStore,
        history: &mut HistoryArchive,
        now: DateTime<Local>,
    ) -> Vec<Event> {
        self.finish_current(agenda, history, now, false)
    }

    /// Put every item back to its planned time and rewind to the first.
    ///
    /// # Errors
    /// `ConfirmationRequired` unless `confirmed` is true.
    pub fn reset_all(
        &mut self,
        agenda: &mut AgendaStore,
        confirmed: bool,
        now: DateTime<Local>,
    ) -> Result<Event, AgendaError> {
        if !confirmed {
            return Err(AgendaError::ConfirmationRequired { action: "reset" });
        }
        agenda.reset_all();
        self.state = TimerState::Idle;
        self.countdown = 0;
        info!(items = agenda.len(), "agenda reset");
        Ok(Event::TimerReset { at: now })
    }

    /// Make `index` the current item. Not allowed while an item is being
    /// timed; a paused item is abandoned back to `Idle`.
    ///
    /// # Errors
    /// `ItemBusy` while running, `InvalidInput` for a bad index.
    pub fn select(
        &mut self,
        agenda: &mut AgendaStore,
        index: usize,
        now: DateTime<Local>,
    ) -> Result<Event, AgendaError> {
        if self.is_active() {
            return Err(AgendaError::ItemBusy {
                index: agenda.cursor().unwrap_or(index),
            });
        }
        agenda.select(index)?;
        if self.state == TimerState::Paused && agenda.cursor() == Some(index) {
            self.state = TimerState::Idle;
        }
        let title = agenda.current().map(|item| item.title.clone()).unwrap_or_default();
        Ok(Event::ItemSelected {
            index,
            title,
            at: now,
        })
    }

    /// Drop back to `Idle` without touching the agenda. Used when the
    /// item under a paused timer is removed.
    pub(crate) fn halt(&mut self) {
        self.state = TimerState::Idle;
        self.countdown = 0;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick_countdown(&mut self, agenda: &AgendaStore, now: DateTime<Local>) -> Vec<Event> {
        let (Some(index), Some(item)) = (agenda.cursor(), agenda.current()) else {
            self.state = TimerState::Idle;
            self.countdown = 0;
            return Vec::new();
        };
        if item.is_done() {
            self.state = TimerState::Idle;
            self.countdown = 0;
            return Vec::new();
        }

        self.countdown = self.countdown.saturating_sub(1);
        let mut events = vec![Event::CountdownBeat {
            remaining: self.countdown,
            at: now,
        }];
        if self.countdown == 0 {
            self.state = TimerState::Running;
            debug!(index, title = %item.title, "timer started");
            events.push(Event::TimerStarted {
                index,
                title: item.title.clone(),
                remaining_secs: item.remaining_secs,
                at: now,
            });
        }
        events
    }

    fn tick_running(
        &mut self,
        agenda: &mut AgendaStore,
        history: &mut HistoryArchive,
        now: DateTime<Local>,
    ) -> Vec<Event> {
        let Some(index) = agenda.cursor() else {
            self.state = TimerState::Idle;
            return Vec::new();
        };
        let Some(item) = agenda.current_mut() else {
            self.state = TimerState::Idle;
            return Vec::new();
        };

        let remaining = item.tick();
        let mut events = Vec::new();
        if self.warning_secs > 0 && remaining == self.warning_secs {
            events.push(Event::Warning {
                index,
                title: item.title.clone(),
                remaining_secs: remaining,
                at: now,
            });
        }
        if remaining == 0 {
            events.push(Event::Completion {
                index,
                title: item.title.clone(),
                at: now,
            });
        }

        if remaining <= 0 && !self.overtime_enabled {
            events.extend(self.finish_current(agenda, history, now, true));
        }
        events
    }

    fn finish_current(
        &mut self,
        agenda: &mut AgendaStore,
        history: &mut HistoryArchive,
        now: DateTime<Local>,
        auto: bool,
    ) -> Vec<Event> {
        if agenda.all_done() {
            return Vec::new();
        }
        let Some(index) = agenda.cursor() else {
            return Vec::new();
        };
        let Some(item) = agenda.current_mut() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        if item.mark_done() {
            history.record(now.date_naive(), HistoryRecord::from_item(item, now));
            info!(
                index,
                title = %item.title,
                used_secs = item.used_secs,
                overtime_secs = item.overtime_secs,
                auto,
                "agenda item done"
            );
            events.push(Event::ItemDone {
                index,
                title: item.title.clone(),
                used_secs: item.used_secs,
                overtime_secs: item.overtime_secs,
                auto,
                at: now,
            });
        }

        self.state = TimerState::Idle;
        self.countdown = 0;
        if agenda.advance() {
            events.extend(self.start(agenda, now));
        } else if agenda.all_done() {
            info!("agenda completed");
            events.push(Event::AgendaCompleted { at: now });
        } else {
            debug!(pending = agenda.pending(), "wrapped to first item");
        }
        events
    }
}

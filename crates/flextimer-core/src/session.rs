//! Session facade: one agenda, one timer, one history, one settings record.
//!
//! Every command goes through here so that persistence and alerts happen
//! in one place. State is written back to the key-value store right after
//! each mutation; a command that fails validation writes nothing.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::agenda::{export_csv, export_file_name, AgendaItem, AgendaStore};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::events::Event;
use crate::history::HistoryArchive;
use crate::notify::{NullNotifier, Notifier};
use crate::settings::Settings;
use crate::storage::{
    load_agenda, load_history, load_session_state, load_settings, save_agenda, save_history,
    save_session_state, save_settings, KvStore, SessionState,
};
use crate::timer::{TimerEngine, TimerState};

pub struct Session<S, C = SystemClock, N = NullNotifier> {
    store: S,
    clock: C,
    notifier: N,
    agenda: AgendaStore,
    engine: TimerEngine,
    history: HistoryArchive,
    settings: Settings,
}

impl<S: KvStore> Session<S> {
    /// Load a session on the system clock with no sound.
    pub fn open(store: S) -> Self {
        Self::with_parts(store, SystemClock, NullNotifier)
    }
}

impl<S: KvStore, C: Clock, N: Notifier> Session<S, C, N> {
    /// Load the persisted state from `store`. The timer always comes back
    /// `Idle`; the cursor and the overtime flag are restored. Unreadable
    /// state loads as empty.
    pub fn with_parts(store: S, clock: C, notifier: N) -> Self {
        let items = load_agenda(&store);
        let history = load_history(&store);
        let settings = load_settings(&store);
        let saved = load_session_state(&store);

        let agenda = AgendaStore::from_parts(items, saved.cursor);
        let engine = TimerEngine::new(saved.overtime_enabled, settings.warning_seconds);
        debug!(
            items = agenda.len(),
            cursor = ?agenda.cursor(),
            records = history.len(),
            "session loaded"
        );

        Self {
            store,
            clock,
            notifier,
            agenda,
            engine,
            history,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn agenda(&self) -> &AgendaStore {
        &self.agenda
    }

    pub fn history(&self) -> &HistoryArchive {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn overtime_enabled(&self) -> bool {
        self.engine.overtime_enabled()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(&self.agenda, self.clock.now())
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ── Agenda commands ──────────────────────────────────────────────

    /// # Errors
    /// `InvalidInput`/`DuplicateTitle` from the agenda, or a store error.
    pub fn add(&mut self, title: &str, plan_min: i64) -> Result<usize> {
        let index = self.agenda.add(title, plan_min)?;
        self.persist_agenda()?;
        Ok(index)
    }

    /// # Errors
    /// `ItemBusy` for the item being timed, `InvalidInput` for a bad index.
    pub fn delete(&mut self, index: usize) -> Result<AgendaItem> {
        let was_current = self.agenda.cursor() == Some(index);
        let removed = self.agenda.delete(index, self.engine.is_active())?;
        if was_current && self.engine.state() == TimerState::Paused {
            self.engine.halt();
        }
        self.persist_agenda()?;
        Ok(removed)
    }

    /// # Errors
    /// `AnchoredItem` when a done item would move, `InvalidInput` for bad
    /// indexes.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.agenda.reorder(from, to)?;
        self.persist_agenda()
    }

    /// # Errors
    /// `ItemBusy` while an item is timed, `InvalidInput` for a bad index.
    pub fn select(&mut self, index: usize) -> Result<Event> {
        let event = self.engine.select(&mut self.agenda, index, self.clock.now())?;
        self.persist_session()?;
        Ok(event)
    }

    /// # Errors
    /// `ConfirmationRequired` when not confirmed, or a store error.
    pub fn reset_all(&mut self, confirmed: bool) -> Result<Event> {
        let event = self
            .engine
            .reset_all(&mut self.agenda, confirmed, self.clock.now())?;
        self.persist_agenda()?;
        Ok(event)
    }

    /// Clear a finished day. History is untouched.
    ///
    /// # Errors
    /// `IncompleteAgenda` while any item is pending, or a store error.
    pub fn archive_and_clear(&mut self) -> Result<Event> {
        let cleared = self.agenda.archive_and_clear()?;
        self.engine.halt();
        self.persist_agenda()?;
        info!(items = cleared.len(), "agenda archived");
        Ok(Event::AgendaArchived {
            items: cleared.len(),
            at: self.clock.now(),
        })
    }

    /// CSV of the current agenda.
    ///
    /// # Errors
    /// `InvalidInput` for an empty agenda.
    pub fn export_csv(&self) -> Result<String> {
        Ok(export_csv(&self.agenda)?)
    }

    /// Suggested file name for today's export.
    pub fn export_file_name(&self) -> String {
        export_file_name(self.clock.today())
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.engine.start(&self.agenda, self.clock.now())
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause(&self.agenda, self.clock.now())
    }

    pub fn toggle(&mut self) -> Option<Event> {
        self.engine.toggle(&self.agenda, self.clock.now())
    }

    pub fn cancel_countdown(&mut self) -> Option<Event> {
        self.engine.cancel_countdown(&self.agenda, self.clock.now())
    }

    /// Advance the timer by one second.
    ///
    /// # Errors
    /// Returns an error if the new state cannot be persisted.
    pub fn tick(&mut self) -> Result<Vec<Event>> {
        let charged = self.engine.state() == TimerState::Running;
        let events = self
            .engine
            .tick(&mut self.agenda, &mut self.history, self.clock.now());
        self.after_timer_events(&events, charged)?;
        Ok(events)
    }

    /// Finish the current item and move to the next one.
    ///
    /// # Errors
    /// Returns an error if the new state cannot be persisted.
    pub fn skip(&mut self) -> Result<Vec<Event>> {
        let cursor = self.agenda.cursor();
        let events = self
            .engine
            .skip_to_next(&mut self.agenda, &mut self.history, self.clock.now());
        self.after_timer_events(&events, false)?;
        if events.is_empty() && self.agenda.cursor() != cursor {
            self.persist_session()?;
        }
        Ok(events)
    }

    /// # Errors
    /// Returns an error if the flag cannot be persisted.
    pub fn toggle_overtime(&mut self) -> Result<Event> {
        let event = self.engine.toggle_overtime(self.clock.now());
        self.persist_session()?;
        Ok(event)
    }

    /// # Errors
    /// Returns an error if the flag cannot be persisted.
    pub fn set_overtime(&mut self, enabled: bool) -> Result<Event> {
        let event = self.engine.set_overtime(enabled, self.clock.now());
        self.persist_session()?;
        Ok(event)
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Change one setting. Returns the change event followed by any
    /// request addressed to the desktop shell.
    ///
    /// # Errors
    /// `UnknownKey`/`InvalidValue`, or a store error.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<Vec<Event>> {
        self.settings.set(key, value)?;
        save_settings(&self.store, &self.settings)?;
        self.engine.set_warning_secs(self.settings.warning_seconds);

        let now = self.clock.now();
        let mut events = vec![Event::SettingChanged {
            key: key.to_string(),
            value: self.settings.get(key).unwrap_or_default(),
            at: now,
        }];
        match key {
            "opacity" => events.push(Event::OpacityChanged {
                opacity: self.settings.opacity_fraction(),
                at: now,
            }),
            "always_on_top" => events.push(Event::AlwaysOnTopChanged {
                enabled: self.settings.always_on_top,
                at: now,
            }),
            _ => {}
        }
        Ok(events)
    }

    /// # Errors
    /// Returns an error if the defaults cannot be persisted.
    pub fn reset_settings(&mut self) -> Result<()> {
        self.settings = Settings::default();
        self.engine.set_warning_secs(self.settings.warning_seconds);
        save_settings(&self.store, &self.settings)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// `charged` is true when the current item lost a second, which must
    /// be written even if no event came out of it.
    fn after_timer_events(&mut self, events: &[Event], charged: bool) -> Result<()> {
        if events.is_empty() && !charged {
            return Ok(());
        }
        self.play_alerts(events);
        if events.iter().any(|e| matches!(e, Event::ItemDone { .. })) {
            save_history(&self.store, &self.history)?;
        }
        self.persist_agenda()
    }

    fn play_alerts(&self, events: &[Event]) {
        if !self.settings.sound_enabled {
            return;
        }
        for event in events.iter().filter(|e| e.is_alert()) {
            let result = match event {
                Event::Warning { .. } => self.notifier.warning(),
                _ => self.notifier.completion(),
            };
            if let Err(e) = result {
                debug!(error = %e, "alert sound failed");
            }
        }
    }

    fn persist_agenda(&self) -> Result<()> {
        save_agenda(&self.store, self.agenda.items())?;
        self.persist_session()
    }

    fn persist_session(&self) -> Result<()> {
        save_session_state(
            &self.store,
            &SessionState {
                cursor: self.agenda.cursor(),
                overtime_enabled: self.engine.overtime_enabled(),
            },
        )
    }
}

//! # FlexTimer Core Library
//!
//! Business logic for FlexTimer, a single-user meeting agenda timer. The
//! `flextimer` CLI is one presentation layer over this crate; any other
//! front end drives the same [`Session`].
//!
//! ## Architecture
//!
//! - **Agenda**: ordered items with a cursor; done items are anchored
//! - **Timer Engine**: tick-driven state machine with a 3-2-1 pre-roll,
//!   pause, skip and optional overtime
//! - **History**: append-only per-day log of finished items
//! - **Storage**: JSON documents in a key-value store (SQLite or memory)
//!
//! ## Key Components
//!
//! - [`Session`]: command facade that persists after every change
//! - [`TimerEngine`]: core timer state machine
//! - [`AgendaStore`]: agenda list and cursor
//! - [`HistoryArchive`]: calendar lookup of past items
//! - [`Database`]: SQLite key-value persistence

pub mod agenda;
pub mod clock;
pub mod error;
pub mod events;
pub mod history;
pub mod notify;
pub mod session;
pub mod settings;
pub mod storage;
pub mod timer;

pub use agenda::{AgendaItem, AgendaStore, ItemStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AgendaError, CoreError, DatabaseError, SettingsError};
pub use events::Event;
pub use history::{DaySummary, HistoryArchive, HistoryRecord};
pub use notify::{Notifier, NullNotifier};
pub use session::Session;
pub use settings::Settings;
pub use storage::{Database, KvStore, MemoryStore};
pub use timer::{TimerEngine, TimerState};

//! End-to-end scenarios through the session facade.

use chrono::{Local, NaiveDate, TimeZone};
use flextimer_core::storage::{AGENDA_KEY, HISTORY_KEY};
use flextimer_core::{
    AgendaError, CoreError, Database, Event, ItemStatus, KvStore, ManualClock, MemoryStore,
    NullNotifier, Session, TimerState,
};

fn clock() -> ManualClock {
    ManualClock::new(Local.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap())
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

fn session(store: &MemoryStore) -> Session<&MemoryStore, ManualClock, NullNotifier> {
    Session::with_parts(store, clock(), NullNotifier)
}

fn finish_preroll<S: KvStore>(session: &mut Session<S, ManualClock, NullNotifier>) {
    while session.state() == TimerState::Countdown {
        session.tick().unwrap();
    }
}

#[test]
fn overtime_disabled_advances_at_zero() {
    let store = MemoryStore::new();
    let mut session = session(&store);
    session.add("T1", 5).unwrap();
    session.add("T2", 10).unwrap();
    session.set_overtime(false).unwrap();

    session.start().unwrap();
    finish_preroll(&mut session);
    assert_eq!(session.state(), TimerState::Running);

    for tick in 1..=300 {
        let events = session.tick().unwrap();
        let done = events.iter().any(|e| matches!(e, Event::ItemDone { .. }));
        assert_eq!(done, tick == 300, "unexpected completion at tick {tick}");
    }

    let t1 = session.agenda().get(0).unwrap();
    assert_eq!(t1.status, ItemStatus::Done);
    assert_eq!(t1.overtime_secs, 0);

    let records = session.history().records_for_date(day());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "T1");
    assert_eq!(records[0].plan_min, 5);
    assert_eq!(records[0].used_min, 5);
    assert_eq!(records[0].status, ItemStatus::Done);

    assert_eq!(session.agenda().cursor(), Some(1));
    assert_eq!(session.state(), TimerState::Countdown);
    finish_preroll(&mut session);
    assert_eq!(session.state(), TimerState::Running);
    assert_eq!(session.agenda().current().unwrap().remaining_secs, 600);
}

#[test]
fn overtime_enabled_keeps_counting() {
    let store = MemoryStore::new();
    let mut session = session(&store);
    session.add("T1", 1).unwrap();
    session.start().unwrap();
    finish_preroll(&mut session);

    for _ in 0..90 {
        session.tick().unwrap();
    }
    let item = session.agenda().current().unwrap();
    assert_eq!(item.remaining_secs, -30);
    assert_eq!(item.used_secs, 90);
    assert_eq!(item.overtime_secs, 30);
    assert_eq!(item.status, ItemStatus::Ready);
    assert!(session.history().is_empty());

    match session.snapshot() {
        Event::StateSnapshot { display, .. } => assert_eq!(display, "-00:30"),
        other => panic!("Expected StateSnapshot, got {other:?}"),
    }
}

#[test]
fn reset_all_restores_plan() {
    let store = MemoryStore::new();
    let mut session = session(&store);
    session.add("T1", 5).unwrap();
    session.start().unwrap();
    finish_preroll(&mut session);
    for _ in 0..120 {
        session.tick().unwrap();
    }
    session.skip().unwrap();
    assert_eq!(session.agenda().get(0).unwrap().used_secs, 120);

    let err = session.reset_all(false).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Agenda(AgendaError::ConfirmationRequired { .. })
    ));
    assert!(session.agenda().get(0).unwrap().is_done());

    session.reset_all(true).unwrap();
    let item = session.agenda().get(0).unwrap();
    assert_eq!(item.remaining_secs, 300);
    assert_eq!(item.used_secs, 0);
    assert_eq!(item.overtime_secs, 0);
    assert_eq!(item.status, ItemStatus::Ready);
    assert_eq!(session.agenda().cursor(), Some(0));
    assert_eq!(session.state(), TimerState::Idle);
}

#[test]
fn duplicate_title_keeps_one_item() {
    let store = MemoryStore::new();
    let mut session = session(&store);
    session.add("A", 5).unwrap();
    let err = session.add("A", 10).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Agenda(AgendaError::DuplicateTitle { ref title }) if title == "A"
    ));
    assert_eq!(session.agenda().len(), 1);
}

#[test]
fn reorder_onto_done_item_is_rejected() {
    let store = MemoryStore::new();
    let mut session = session(&store);
    session.add("A", 1).unwrap();
    session.add("B", 1).unwrap();
    session.skip().unwrap();
    session.cancel_countdown().unwrap();

    let err = session.reorder(1, 0).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Agenda(AgendaError::AnchoredItem { .. })
    ));
    assert_eq!(session.agenda().get(0).unwrap().title, "A");
}

#[test]
fn skip_twice_on_last_item_records_once() {
    let store = MemoryStore::new();
    let mut session = session(&store);
    session.add("Only", 2).unwrap();

    let first = session.skip().unwrap();
    assert!(matches!(first.last(), Some(Event::AgendaCompleted { .. })));
    assert!(session.skip().unwrap().is_empty());
    assert_eq!(session.history().records_for_date(day()).len(), 1);

    // All done and empty are different states
    match session.snapshot() {
        Event::StateSnapshot {
            status_line, cursor, ..
        } => {
            assert_eq!(status_line, "All done");
            assert_eq!(cursor, Some(0));
        }
        other => panic!("Expected StateSnapshot, got {other:?}"),
    }
}

#[test]
fn skipping_out_of_order_reaches_every_item() {
    let store = MemoryStore::new();
    {
        let mut session = session(&store);
        for title in ["A", "B", "C", "D"] {
            session.add(title, 1).unwrap();
        }
        session.select(1).unwrap();
        session.skip().unwrap();
        session.cancel_countdown().unwrap();
        session.select(0).unwrap();
        session.skip().unwrap();
        assert_eq!(session.agenda().cursor(), Some(2));
        session.cancel_countdown().unwrap();

        session.select(3).unwrap();
        let events = session.skip().unwrap();
        assert!(!events.iter().any(|e| matches!(e, Event::AgendaCompleted { .. })));
        assert_eq!(session.agenda().cursor(), Some(0));

        // Done item under the cursor: skip still moves on
        let events = session.skip().unwrap();
        assert!(events.iter().all(|e| !matches!(e, Event::ItemDone { .. })));
        assert_eq!(session.agenda().cursor(), Some(2));
        assert_eq!(session.state(), TimerState::Countdown);

        let events = session.skip().unwrap();
        assert!(matches!(events.last(), Some(Event::AgendaCompleted { .. })));
    }

    let session = session(&store);
    assert!(session.agenda().all_done());
    assert_eq!(session.history().records_for_date(day()).len(), 4);
}

#[test]
fn archive_needs_every_item_done() {
    let store = MemoryStore::new();
    let mut session = session(&store);
    session.add("A", 1).unwrap();
    session.add("B", 1).unwrap();
    session.skip().unwrap();

    let err = session.archive_and_clear().unwrap_err();
    assert!(matches!(
        err,
        CoreError::Agenda(AgendaError::IncompleteAgenda { pending: 1 })
    ));

    session.skip().unwrap();
    let event = session.archive_and_clear().unwrap();
    assert!(matches!(event, Event::AgendaArchived { items: 2, .. }));
    assert!(session.agenda().is_empty());
    assert_eq!(session.agenda().cursor(), None);
    assert_eq!(session.history().records_for_date(day()).len(), 2);
}

#[test]
fn state_survives_reload() {
    let store = MemoryStore::new();
    {
        let mut session = session(&store);
        session.add("A", 5).unwrap();
        session.add("B \"quoted\"", 10).unwrap();
        session.skip().unwrap();
        session.cancel_countdown().unwrap();
        session.set_overtime(false).unwrap();
        session.set_setting("font_color", "#112233").unwrap();
    }

    let session = session(&store);
    assert_eq!(session.agenda().len(), 2);
    assert_eq!(session.agenda().cursor(), Some(1));
    assert!(session.agenda().get(0).unwrap().is_done());
    assert!(!session.overtime_enabled());
    assert_eq!(session.settings().font_color, "#112233");
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.state(), TimerState::Idle);
}

#[test]
fn corrupt_store_loads_empty() {
    let store = MemoryStore::new();
    store.set(AGENDA_KEY, "not json").unwrap();
    store.set(HISTORY_KEY, "{\"2024-05-02\": 7}").unwrap();

    let session = session(&store);
    assert!(session.agenda().is_empty());
    assert!(session.history().is_empty());
}

#[test]
fn database_backed_session_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flextimer.db");
    let items = {
        let db = Database::open_at(&path).unwrap();
        let mut session = Session::with_parts(db, clock(), NullNotifier);
        session.add("Intro", 5).unwrap();
        session.add("Demo", 15).unwrap();
        session.start().unwrap();
        finish_preroll(&mut session);
        for _ in 0..42 {
            session.tick().unwrap();
        }
        session.agenda().items().to_vec()
    };

    let db = Database::open_at(&path).unwrap();
    let session = Session::with_parts(db, clock(), NullNotifier);
    assert_eq!(session.agenda().items(), &items[..]);
    assert_eq!(session.agenda().get(0).unwrap().remaining_secs, 258);
}

#[test]
fn calendar_lists_active_days() {
    let store = MemoryStore::new();
    let clock = clock();
    let mut session = Session::with_parts(&store, &clock, NullNotifier);
    session.add("A", 1).unwrap();
    session.add("B", 1).unwrap();
    session.add("C", 1).unwrap();

    session.skip().unwrap();
    clock.set(Local.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap());
    session.skip().unwrap();
    clock.set(Local.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
    session.skip().unwrap();

    let may: Vec<_> = session.history().dates_with_activity(2024, 5).unwrap().collect();
    assert_eq!(
        may,
        vec![
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        ]
    );
    assert!(session.history().dates_with_activity(2024, 13).is_err());
}

use std::io::Write;
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use flextimer_core::{Clock, Database, Event, KvStore, Notifier, Session, SystemClock};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the agenda in the foreground, ticking once per second
    ///
    /// Commands on stdin: p = pause/resume, s = skip, o = toggle overtime,
    /// q = quit.
    Run,
    /// Print current timer state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Finish the current item and move to the next
    Skip,
    /// Toggle or set overtime extension
    Overtime {
        /// Explicit state; toggles when omitted
        #[arg(value_enum)]
        state: Option<Switch>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

/// Rings the terminal bell on stderr.
struct BellNotifier;

impl BellNotifier {
    fn ring(times: usize) -> std::io::Result<()> {
        let mut err = std::io::stderr();
        err.write_all("\x07".repeat(times).as_bytes())?;
        err.flush()
    }
}

impl Notifier for BellNotifier {
    fn warning(&self) -> std::io::Result<()> {
        Self::ring(1)
    }

    fn completion(&self) -> std::io::Result<()> {
        Self::ring(2)
    }
}

pub fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Run => {
            let mut session = Session::with_parts(Database::open()?, SystemClock, BellNotifier);
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(drive(&mut session, BufReader::new(tokio::io::stdin())))?;
        }
        TimerAction::Status { json } => {
            let session = open_session()?;
            let snapshot = session.snapshot();
            if json {
                print_json(&snapshot)?;
            } else if let Event::StateSnapshot {
                title,
                display,
                status_line,
                done,
                total,
                ..
            } = snapshot
            {
                match title {
                    Some(title) => println!("{title}  {display}  {status_line}  ({done}/{total} done)"),
                    None => println!("{status_line}"),
                }
            }
        }
        TimerAction::Skip => {
            let mut session = open_session()?;
            let events = session.skip()?;
            if events.is_empty() {
                match session.agenda().cursor() {
                    Some(index) if !session.agenda().all_done() => {
                        println!("Moved to item {}.", index + 1);
                    }
                    _ => println!("Nothing to skip."),
                }
            }
            for event in &events {
                if let Some(line) = describe(event) {
                    println!("{line}");
                }
            }
        }
        TimerAction::Overtime { state } => {
            let mut session = open_session()?;
            let event = match state {
                Some(Switch::On) => session.set_overtime(true)?,
                Some(Switch::Off) => session.set_overtime(false)?,
                None => session.toggle_overtime()?,
            };
            print_json(&event)?;
        }
    }
    Ok(())
}

/// Foreground loop: one engine tick per interval tick, line commands from
/// `input` in between. Ends on `q` or Ctrl-C, and once every item is done.
async fn drive<S, C, N, R>(session: &mut Session<S, C, N>, input: R) -> CliResult
where
    S: KvStore,
    C: Clock,
    N: Notifier,
    R: AsyncBufRead + Unpin,
{
    if session.agenda().is_empty() {
        println!("Add an agenda item to begin.");
        return Ok(());
    }
    if session.agenda().all_done() {
        println!("All done. Reset with `flextimer agenda reset --yes`.");
        return Ok(());
    }

    let mut lines = input.lines();
    let mut input_open = true;
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately.
    ticker.tick().await;

    report(session.start());
    debug!(items = session.agenda().len(), "foreground loop started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = session.tick()?;
                let finished = events.iter().any(|e| matches!(e, Event::AgendaCompleted { .. }));
                report(events);
                if finished {
                    break;
                }
                render(session)?;
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    debug!("input closed, running without commands");
                    input_open = false;
                    continue;
                };
                match line.trim() {
                    "p" | "" => report(session.toggle()),
                    "s" => {
                        let events = session.skip()?;
                        let finished = events.iter().any(|e| matches!(e, Event::AgendaCompleted { .. }));
                        report(events);
                        if finished {
                            break;
                        }
                    }
                    "o" => report([session.toggle_overtime()?]),
                    "q" => break,
                    other => eprintln!("unknown command '{other}' (p, s, o, q)"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!();
    Ok(())
}

fn render<S: KvStore, C: Clock, N: Notifier>(session: &Session<S, C, N>) -> CliResult {
    if let Event::StateSnapshot {
        title,
        display,
        status_line,
        ..
    } = session.snapshot()
    {
        let mut out = std::io::stdout();
        write!(
            out,
            "\r{:<30} {display:>7}  {status_line:<16}",
            title.unwrap_or_default()
        )?;
        out.flush()?;
    }
    Ok(())
}

fn report(events: impl IntoIterator<Item = Event>) {
    for event in events {
        if let Some(line) = describe(&event) {
            println!("\r{line:<60}");
        }
    }
}

/// One-line text for events worth announcing.
fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::CountdownStarted { title, beats, .. } => format!("Next: {title} (starting in {beats})"),
        Event::TimerStarted { title, .. } => format!("Started: {title}"),
        Event::TimerPaused { .. } => "Paused".to_string(),
        Event::TimerResumed { .. } => "Resumed".to_string(),
        Event::CountdownCancelled { .. } => "Countdown cancelled".to_string(),
        Event::Warning { title, remaining_secs, .. } => {
            format!("{title}: {remaining_secs}s left")
        }
        Event::Completion { title, .. } => format!("{title}: time is up"),
        Event::ItemDone {
            title,
            used_secs,
            overtime_secs,
            ..
        } => format!("Done: {title} (used {used_secs}s, overtime {overtime_secs}s)"),
        Event::AgendaCompleted { .. } => "All done".to_string(),
        Event::OvertimeToggled { enabled, .. } => {
            format!("Overtime extension {}", if *enabled { "on" } else { "off" })
        }
        _ => return None,
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use flextimer_core::{ManualClock, MemoryStore, NullNotifier, TimerState};

    fn session(items: &[(&str, i64)]) -> Session<MemoryStore, ManualClock, NullNotifier> {
        let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap());
        let mut session = Session::with_parts(MemoryStore::new(), clock, NullNotifier);
        for (title, plan) in items {
            session.add(title, *plan).unwrap();
        }
        session
    }

    #[tokio::test(start_paused = true)]
    async fn loop_ends_when_last_item_finishes_on_its_own() {
        let mut session = session(&[("Only", 1)]);
        session.set_overtime(false).unwrap();

        drive(&mut session, &b""[..]).await.unwrap();

        assert!(session.agenda().all_done());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.agenda().get(0).unwrap().used_secs, 60);
        assert_eq!(session.state(), TimerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_commands_finish_the_agenda() {
        let mut session = session(&[("A", 5), ("B", 5)]);

        drive(&mut session, &b"s\ns\n"[..]).await.unwrap();

        assert!(session.agenda().all_done());
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn wrapping_with_pending_items_keeps_running_until_quit() {
        let mut session = session(&[("A", 5), ("B", 5), ("C", 5)]);
        session.select(2).unwrap();

        drive(&mut session, &b"s\nq\n"[..]).await.unwrap();

        assert_eq!(session.agenda().pending(), 2);
        assert_eq!(session.agenda().cursor(), Some(0));
        assert_eq!(session.state(), TimerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_agenda_returns_at_once() {
        let mut session = session(&[]);
        drive(&mut session, &b"s\n"[..]).await.unwrap();
        assert!(session.agenda().is_empty());
    }

    #[test]
    fn describes_user_facing_events() {
        let at = Local::now();
        let done = Event::ItemDone {
            index: 0,
            title: "Intro".into(),
            used_secs: 300,
            overtime_secs: 0,
            auto: true,
            at,
        };
        assert_eq!(
            describe(&done).as_deref(),
            Some("Done: Intro (used 300s, overtime 0s)")
        );
        assert!(describe(&Event::TimerReset { at }).is_none());
    }
}

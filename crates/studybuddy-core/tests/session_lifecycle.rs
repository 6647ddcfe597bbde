//! Integration tests for the background service.
//!
//! Drives full sessions through `Background` with a hand-driven clock and
//! scheduler, including process restarts against the same store.

use std::sync::Arc;

use chrono::NaiveDate;
use studybuddy_core::scheduler::Armed;
use studybuddy_core::storage::{load_record, SETTINGS_KEY, TIMER_STATE_KEY};
use studybuddy_core::{
    AppConfig, Background, Clock, Command, EventKind, Host, ManualClock, ManualScheduler,
    MemoryStore, Mode, PresetId, Reconciliation, RecordingPlatform, Response, ScheduleName,
    Scope, Settings, SqliteStore, Store, TimerState, Wakeup,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn boot(
    store: Box<dyn Store>,
    scheduler: &ManualScheduler,
    platform: &RecordingPlatform,
    clock: &ManualClock,
) -> (Background, Reconciliation) {
    let host = Host {
        store,
        scheduler: Box::new(scheduler.clone()),
        platform: Box::new(platform.clone()),
        clock: Arc::new(clock.clone()),
    };
    Background::init(host, &AppConfig::default()).unwrap()
}

/// Run one full focus session to completion via the scheduled wake-up.
fn finish_focus(bg: &mut Background, clock: &ManualClock) {
    assert_eq!(bg.timer_state().mode, Mode::Focus);
    bg.start().unwrap();
    clock.advance_secs(bg.timer_state().time_remaining_seconds);
    bg.on_wakeup(Wakeup {
        schedule: ScheduleName::Completion,
    })
    .unwrap();
    // Back to focus for the next call.
    bg.skip().unwrap();
}

#[test]
fn test_pomodoro_cycle_end_to_end() {
    let store = MemoryStore::new();
    let scheduler = ManualScheduler::new();
    let platform = RecordingPlatform::new();
    let clock = ManualClock::at_date(day(2024, 3, 10));
    let (mut bg, _) = boot(Box::new(store.clone()), &scheduler, &platform, &clock);

    // Start, run 10m30s, pause.
    assert!(bg.handle(Command::StartTimer).is_success());
    clock.advance_secs(630);
    assert!(bg.handle(Command::PauseTimer).is_success());
    assert_eq!(bg.timer_state().time_remaining_seconds, 870);

    // Resume and let it run out.
    bg.handle(Command::StartTimer);
    assert_eq!(
        scheduler.completion_deadline(),
        Some(clock.now_ms() + 870_000)
    );
    clock.advance_secs(870);
    bg.on_wakeup(Wakeup {
        schedule: ScheduleName::Completion,
    })
    .unwrap();

    let state = bg.timer_state();
    assert_eq!(state.mode, Mode::Break);
    assert_eq!(state.time_remaining_seconds, 300);
    assert!(!state.running);
    assert_eq!(bg.stats().sessions_today, 1);
    assert_eq!(bg.stats().focus_minutes_today, 25.0);

    // Badge is up until a UI asks for state.
    let badge = platform.last_badge().flatten().unwrap();
    assert_eq!(badge.text, "DONE");
    let reply = bg.handle(Command::GetTimerState);
    assert!(matches!(reply, Response::State(_)));
    assert_eq!(platform.last_badge(), Some(None));

    // The persisted record matches the in-memory one.
    let stored: TimerState = load_record(&store, Scope::Local, TIMER_STATE_KEY)
        .unwrap()
        .unwrap();
    assert_eq!(&stored, bg.timer_state());
}

#[test]
fn test_late_tick_completes_when_wakeup_is_lost() {
    let scheduler = ManualScheduler::new();
    let platform = RecordingPlatform::new();
    let clock = ManualClock::at_date(day(2024, 3, 10));
    let (mut bg, _) = boot(Box::new(MemoryStore::new()), &scheduler, &platform, &clock);

    bg.start().unwrap();
    clock.advance_secs(3600);
    bg.on_wakeup(Wakeup {
        schedule: ScheduleName::Tick,
    })
    .unwrap();

    assert_eq!(bg.timer_state().mode, Mode::Break);
    assert_eq!(bg.stats().sessions_today, 1);

    // The completion wake-up arriving afterwards changes nothing.
    bg.on_wakeup(Wakeup {
        schedule: ScheduleName::Completion,
    })
    .unwrap();
    assert_eq!(bg.timer_state().mode, Mode::Break);
    assert_eq!(bg.stats().sessions_today, 1);
    let completes = platform
        .broadcasts()
        .iter()
        .filter(|b| b.event_kind == EventKind::TimerComplete)
        .count();
    assert_eq!(completes, 1);
}

#[test]
fn test_streak_across_days_and_reloads() {
    let store = MemoryStore::new();
    let scheduler = ManualScheduler::new();
    let platform = RecordingPlatform::new();
    let clock = ManualClock::at_date(day(2024, 3, 10));

    let (mut bg, _) = boot(Box::new(store.clone()), &scheduler, &platform, &clock);
    finish_focus(&mut bg, &clock);
    finish_focus(&mut bg, &clock);
    assert_eq!(bg.stats().sessions_today, 2);
    assert_eq!(bg.stats().current_streak, 1);
    bg.shutdown();

    // Next day: restart before anything happens. Daily counters clear on
    // load, and the first completion still extends the streak.
    clock.set_ms(ManualClock::at_date(day(2024, 3, 11)).now_ms());
    let (mut bg, _) = boot(Box::new(store.clone()), &scheduler, &platform, &clock);
    assert_eq!(bg.stats().sessions_today, 0);
    assert_eq!(bg.stats().all_time_sessions, 2);
    finish_focus(&mut bg, &clock);
    assert_eq!(bg.stats().current_streak, 2);
    assert_eq!(bg.stats().longest_streak, 2);
    bg.shutdown();

    // Skip a day: the streak restarts.
    clock.set_ms(ManualClock::at_date(day(2024, 3, 13)).now_ms());
    let (mut bg, _) = boot(Box::new(store.clone()), &scheduler, &platform, &clock);
    finish_focus(&mut bg, &clock);
    assert_eq!(bg.stats().current_streak, 1);
    assert_eq!(bg.stats().longest_streak, 2);
    assert_eq!(bg.stats().all_time_sessions, 4);

    let saved: Settings = load_record(&store, Scope::Synced, SETTINGS_KEY)
        .unwrap()
        .unwrap();
    assert_eq!(saved.stats.current_streak, 1);
    assert_eq!(saved.stats.last_active_date, Some(day(2024, 3, 13)));
}

#[test]
fn test_restart_with_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studybuddy.db");
    let scheduler = ManualScheduler::new();
    let platform = RecordingPlatform::new();
    let clock = ManualClock::at_date(day(2024, 6, 1));

    {
        let store = SqliteStore::open_at(&path).unwrap();
        let (mut bg, _) = boot(Box::new(store), &scheduler, &platform, &clock);
        bg.select_preset(PresetId::FiftyTen).unwrap();
        bg.start().unwrap();
        bg.shutdown();
    }
    assert!(!scheduler.is_armed(ScheduleName::Completion));

    // Twenty minutes later the session is still live.
    clock.advance_secs(20 * 60);
    {
        let store = SqliteStore::open_at(&path).unwrap();
        let (mut bg, outcome) = boot(Box::new(store), &scheduler, &platform, &clock);
        assert!(matches!(outcome, Reconciliation::Resumed { .. }));
        assert_eq!(bg.settings().active_preset_id, PresetId::FiftyTen);
        assert!(matches!(
            scheduler.armed(ScheduleName::Tick),
            Some(Armed::Repeating { .. })
        ));
        bg.tick().unwrap();
        assert_eq!(bg.timer_state().time_remaining_seconds, 30 * 60);
        drop(bg);
    }

    // Long after the deadline: caught up exactly once, then idle.
    clock.advance_secs(3 * 60 * 60);
    {
        let store = SqliteStore::open_at(&path).unwrap();
        let (bg, outcome) = boot(Box::new(store), &scheduler, &platform, &clock);
        assert_eq!(outcome, Reconciliation::CaughtUp { completed: Mode::Focus });
        assert_eq!(bg.timer_state().mode, Mode::Break);
        assert_eq!(bg.timer_state().time_remaining_seconds, 10 * 60);
        assert_eq!(bg.stats().focus_minutes_today, 50.0);
    }
    {
        let store = SqliteStore::open_at(&path).unwrap();
        let (bg, outcome) = boot(Box::new(store), &scheduler, &platform, &clock);
        assert_eq!(outcome, Reconciliation::Idle);
        assert_eq!(bg.stats().sessions_today, 1);
    }
}

#[test]
fn test_custom_preset_survives_restart() {
    let store = MemoryStore::new();
    let scheduler = ManualScheduler::new();
    let platform = RecordingPlatform::new();
    let clock = ManualClock::at_date(day(2024, 3, 10));

    let (mut bg, _) = boot(Box::new(store.clone()), &scheduler, &platform, &clock);
    let reply = bg.handle(Command::UpdateCustomTimer {
        focus_minutes: Some(1.5),
        break_minutes: Some(0.5),
    });
    assert!(reply.is_success());
    bg.handle(Command::SelectPreset {
        preset_id: Some("custom".into()),
    });
    bg.shutdown();

    let (bg, _) = boot(Box::new(store), &scheduler, &platform, &clock);
    let custom = bg.settings().session_config.get(PresetId::Custom);
    assert_eq!(custom.focus_minutes, 1.5);
    assert_eq!(custom.break_minutes, 0.5);
    assert_eq!(bg.timer_state().active_preset_id, PresetId::Custom);
    assert_eq!(bg.timer_state().time_remaining_seconds, 90);
}

#[test]
fn test_queued_completion_does_not_end_next_session() {
    let scheduler = ManualScheduler::new();
    let platform = RecordingPlatform::new();
    let clock = ManualClock::at_date(day(2024, 3, 10));
    let (mut bg, _) = boot(Box::new(MemoryStore::new()), &scheduler, &platform, &clock);

    bg.start().unwrap();
    clock.advance_secs(1500);
    // Tick and completion fire together; the tick is handled first.
    bg.on_wakeup(Wakeup {
        schedule: ScheduleName::Tick,
    })
    .unwrap();
    assert_eq!(bg.timer_state().mode, Mode::Break);

    // The user starts the break before the queued completion is drained.
    bg.start().unwrap();
    bg.on_wakeup(Wakeup {
        schedule: ScheduleName::Completion,
    })
    .unwrap();

    let state = bg.timer_state();
    assert_eq!(state.mode, Mode::Break);
    assert!(state.running);
    assert_eq!(state.time_remaining_seconds, 300);
    assert_eq!(platform.notifications().len(), 1);
    assert_eq!(bg.stats().sessions_today, 1);
}

//! The background service.
//!
//! One [`Background`] owns the timer, the settings bundle, and the handles
//! to storage, scheduling and the platform. Commands and scheduler wake-ups
//! are applied one at a time through `&mut self`, so no locking is needed.
//!
//! Every operation follows the same shape: mutate the engine, persist,
//! re-arm or cancel schedules, broadcast.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::{CoreError, Result, ValidationError};
use crate::events::EventKind;
use crate::hub::{BadgeState, Hub};
use crate::platform::{Cue, Platform};
use crate::protocol::{Command, Response, StateReply};
use crate::scheduler::{ScheduleName, Scheduler, Wakeup};
use crate::stats::Statistics;
use crate::storage::{
    load_record, save_record, AppConfig, Preferences, Scope, Settings, Store, SETTINGS_KEY,
    TIMER_STATE_KEY,
};
use crate::timer::{Mode, Preset, PresetId, Restore, TimerEngine, TimerState};

/// Capabilities the service runs against.
pub struct Host {
    pub store: Box<dyn Store>,
    pub scheduler: Box<dyn Scheduler>,
    pub platform: Box<dyn Platform>,
    pub clock: Arc<dyn Clock>,
}

/// What startup reconciliation found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// No session was running.
    Idle,
    /// A session was still in progress; schedules were re-armed.
    Resumed { end_epoch_ms: u64 },
    /// A session ended while the process was gone and was completed now.
    CaughtUp { completed: Mode },
    /// The stored record claimed to be running without a deadline.
    Repaired,
}

pub struct Background {
    engine: TimerEngine,
    settings: Settings,
    store: Box<dyn Store>,
    scheduler: Box<dyn Scheduler>,
    hub: Hub,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
}

impl Background {
    /// Load persisted state and reconcile it against the wall clock.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn init(host: Host, config: &AppConfig) -> Result<(Self, Reconciliation)> {
        let Host {
            mut store,
            scheduler,
            platform,
            clock,
        } = host;
        let today = clock.today();

        let settings = match load_record::<Settings>(store.as_ref(), Scope::Synced, SETTINGS_KEY)? {
            Some(mut settings) => {
                if settings.stats.roll_over_if_new_day(today) {
                    tracing::info!(%today, "new day, cleared daily counters");
                    save_record(store.as_mut(), Scope::Synced, SETTINGS_KEY, &settings)?;
                }
                settings
            }
            None => {
                tracing::info!("first run, writing default settings");
                let settings = Settings::new(today);
                save_record(store.as_mut(), Scope::Synced, SETTINGS_KEY, &settings)?;
                settings
            }
        };

        let timer = match load_record::<TimerState>(store.as_ref(), Scope::Local, TIMER_STATE_KEY)? {
            Some(timer) => timer,
            None => {
                let preset = settings.active_preset_id;
                TimerState {
                    active_preset_id: preset,
                    time_remaining_seconds: settings
                        .session_config
                        .get(preset)
                        .duration_secs(Mode::Focus),
                    ..TimerState::default()
                }
            }
        };

        let engine = TimerEngine::new(timer).with_final_countdown(config.timer.final_countdown_secs);
        let mut service = Self {
            engine,
            settings,
            store,
            scheduler,
            hub: Hub::new(platform, config.ui.clone()),
            clock,
            tick_interval: config.timer.tick_interval(),
        };
        let outcome = service.reconcile()?;
        Ok((service, outcome))
    }

    fn reconcile(&mut self) -> Result<Reconciliation> {
        let now = self.clock.now_ms();
        let outcome = match self.engine.restore(now) {
            Restore::Idle => Reconciliation::Idle,
            Restore::Resume { end_epoch_ms } => {
                self.arm(end_epoch_ms);
                tracing::info!(
                    remaining_secs = self.engine.state().remaining_at(now),
                    "resumed running session"
                );
                Reconciliation::Resumed { end_epoch_ms }
            }
            Restore::Expired => {
                let completed = self.engine.mode();
                tracing::info!(%completed, "session elapsed while stopped, catching up");
                self.complete()?;
                Reconciliation::CaughtUp { completed }
            }
            Restore::Repaired => {
                tracing::warn!("stored timer was running without a deadline, pausing it");
                Reconciliation::Repaired
            }
        };
        self.persist_timer()?;
        if outcome != Reconciliation::Idle {
            self.broadcast(EventKind::TimerUpdate);
        }
        Ok(outcome)
    }

    /// Cancel all schedules. The service is consumed.
    pub fn shutdown(mut self) {
        self.scheduler.cancel_all();
        tracing::info!(running = self.engine.is_running(), "background service stopped");
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer_state(&self) -> &TimerState {
        self.engine.state()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &Statistics {
        &self.settings.stats
    }

    pub fn preferences(&self) -> &Preferences {
        &self.settings.preferences
    }

    pub fn badge_state(&self) -> BadgeState {
        self.hub.badge_state()
    }

    /// State for a UI that just asked. Clears the completion badge, since
    /// the user is now looking at the result.
    pub fn get_timer_state(&mut self) -> StateReply {
        self.hub.acknowledge_badge();
        let now = self.clock.now_ms();
        let mut timer_state = self.engine.state().clone();
        timer_state.time_remaining_seconds = timer_state.remaining_at(now);
        StateReply {
            timer_state,
            stats: self.settings.stats.clone(),
        }
    }

    // ── Timer operations ─────────────────────────────────────────────

    pub fn start(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        let Some(end) = self.engine.start(now) else {
            return Ok(());
        };
        self.arm(end);
        tracing::info!(mode = %self.engine.mode(), end_epoch_ms = end, "timer started");
        self.persist_timer()?;
        self.broadcast(EventKind::TimerUpdate);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        if !self.engine.pause(now) {
            return Ok(());
        }
        self.scheduler.cancel_all();
        tracing::info!(
            remaining_secs = self.engine.state().time_remaining_seconds,
            "timer paused"
        );
        self.persist_timer()?;
        self.broadcast(EventKind::TimerUpdate);
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        self.engine.reset(now, &self.settings.session_config);
        self.scheduler.cancel_all();
        self.persist_timer()?;
        self.broadcast(EventKind::TimerUpdate);
        Ok(())
    }

    /// Abandon the current session and switch modes. Not counted in stats.
    pub fn skip(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        self.engine.skip(now, &self.settings.session_config);
        self.scheduler.cancel_all();
        tracing::info!(mode = %self.engine.mode(), "session skipped");
        self.persist_timer()?;
        self.broadcast(EventKind::TimerUpdate);
        Ok(())
    }

    /// Periodic refresh while running.
    pub fn tick(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        let Some(outcome) = self.engine.tick(now) else {
            return Ok(());
        };
        if outcome.expired {
            // The completion wake-up may be late or lost.
            return self.complete();
        }
        self.persist_timer()?;
        if outcome.minute_boundary {
            self.broadcast(EventKind::MinuteTick);
        }
        if outcome.final_countdown {
            self.hub.play_cue(Cue::Tick, self.settings.preferences.sound_volume);
            self.broadcast(EventKind::FinalCountdown);
        }
        self.broadcast(EventKind::TimerUpdate);
        Ok(())
    }

    /// Finish the running session. A no-op when nothing is running, so the
    /// completion wake-up and an expired tick cannot both count it.
    pub fn complete(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        let Some(completed) = self.engine.begin_completion(now) else {
            tracing::debug!("completion ignored, timer not running");
            return Ok(());
        };
        self.scheduler.cancel_all();
        self.persist_timer()?;
        self.broadcast(EventKind::TimerUpdate);

        self.hub.notify_completion(completed);
        self.hub.set_completion_badge(completed);
        self.hub.activate_ui();
        self.broadcast(EventKind::TimerComplete);

        if completed == Mode::Focus {
            let today = self.clock.today();
            let minutes = self
                .settings
                .session_config
                .get(self.engine.active_preset())
                .focus_minutes;
            let recorded = self.settings.stats.record_focus_session(today, minutes);
            tracing::info!(
                sessions_today = recorded.sessions_today,
                streak = recorded.current_streak,
                rolled_over = recorded.rolled_over,
                "focus session recorded"
            );
            self.persist_settings()?;
            self.broadcast(EventKind::StatsUpdate);
        }

        self.engine.finish_completion(now, &self.settings.session_config);
        tracing::info!(%completed, next = %self.engine.mode(), "session complete");
        self.persist_timer()?;
        self.broadcast(EventKind::TimerUpdate);
        Ok(())
    }

    pub fn select_preset(&mut self, preset: PresetId) -> Result<()> {
        let now = self.clock.now_ms();
        self.engine.select_preset(preset, now, &self.settings.session_config);
        self.scheduler.cancel_all();
        self.settings.active_preset_id = preset;
        tracing::info!(%preset, "preset selected");
        self.persist_timer()?;
        self.persist_settings()?;
        self.broadcast(EventKind::TimerUpdate);
        Ok(())
    }

    /// Replace the custom preset. Resets the timer if custom is active.
    pub fn update_custom_preset(&mut self, focus_minutes: f64, break_minutes: f64) -> Result<()> {
        let preset = Preset::custom(focus_minutes, break_minutes)?;
        self.settings.session_config.set_custom(preset);
        self.persist_settings()?;
        if self.engine.active_preset() == PresetId::Custom {
            self.reset()?;
        }
        Ok(())
    }

    pub fn set_sound_volume(&mut self, volume: f64) -> Result<()> {
        self.settings.preferences.set_volume(volume)?;
        self.persist_settings()
    }

    pub fn set_daily_goal(&mut self, minutes: u32) -> Result<()> {
        self.settings.preferences.set_daily_goal(minutes)?;
        self.persist_settings()
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) -> Result<()> {
        self.settings.preferences.dark_mode = dark_mode;
        self.persist_settings()
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    pub fn on_wakeup(&mut self, wakeup: Wakeup) -> Result<()> {
        match wakeup.schedule {
            ScheduleName::Completion => {
                // A completion queued behind a tick that already finished the
                // session must not end whatever session started after it.
                let now = self.clock.now_ms();
                let due = self.engine.state().end_epoch_ms.is_some_and(|end| now >= end);
                if !due {
                    tracing::debug!(
                        end_epoch_ms = self.engine.state().end_epoch_ms,
                        "stale completion wake-up ignored"
                    );
                    return Ok(());
                }
                self.complete()
            }
            ScheduleName::Tick => self.tick(),
        }
    }

    /// Apply a UI command. Always answers; failures become failure acks.
    pub fn handle(&mut self, command: Command) -> Response {
        let name = command.name();
        match self.apply(command) {
            Ok(response) => response,
            Err(CoreError::Validation(e)) => {
                tracing::debug!(command = name, error = %e, "rejected command");
                Response::failure(e.to_string())
            }
            Err(e) => {
                tracing::error!(command = name, error = %e, "command failed");
                Response::failure(e.to_string())
            }
        }
    }

    fn apply(&mut self, command: Command) -> Result<Response> {
        match command {
            Command::GetTimerState => return Ok(Response::State(self.get_timer_state())),
            Command::StartTimer => self.start()?,
            Command::PauseTimer => self.pause()?,
            Command::ResetTimer => self.reset()?,
            Command::SkipSession => self.skip()?,
            Command::SelectPreset { preset_id } => {
                let raw = preset_id.ok_or(ValidationError::Missing("No preset ID provided"))?;
                self.select_preset(raw.parse()?)?;
            }
            Command::UpdateVolumeSettings { sound_volume } => {
                let volume = sound_volume.ok_or(ValidationError::Missing("No volume setting provided"))?;
                self.set_sound_volume(volume)?;
            }
            Command::UpdateDailyGoal { daily_goal } => {
                let goal = daily_goal.ok_or(ValidationError::Missing("No daily goal provided"))?;
                self.set_daily_goal(goal)?;
            }
            Command::UpdateDarkMode { dark_mode } => {
                let dark = dark_mode.ok_or(ValidationError::Missing("No dark mode setting provided"))?;
                self.set_dark_mode(dark)?;
            }
            Command::UpdateCustomTimer {
                focus_minutes,
                break_minutes,
            } => match (focus_minutes, break_minutes) {
                (Some(focus), Some(brk)) => self.update_custom_preset(focus, brk)?,
                _ => return Err(ValidationError::Missing("Invalid custom timer settings").into()),
            },
        }
        Ok(Response::ok())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, end_epoch_ms: u64) {
        self.scheduler.arm_once(ScheduleName::Completion, end_epoch_ms);
        self.scheduler.arm_repeating(ScheduleName::Tick, self.tick_interval);
    }

    fn persist_timer(&mut self) -> Result<()> {
        save_record(self.store.as_mut(), Scope::Local, TIMER_STATE_KEY, self.engine.state())?;
        Ok(())
    }

    fn persist_settings(&mut self) -> Result<()> {
        save_record(self.store.as_mut(), Scope::Synced, SETTINGS_KEY, &self.settings)?;
        Ok(())
    }

    fn broadcast(&mut self, kind: EventKind) {
        self.hub.broadcast(
            kind,
            self.engine.state(),
            self.settings.preferences.sound_volume,
            &self.settings.stats,
        );
    }
}

use clap::Subcommand;
use studybuddy_core::timer::{minutes_from_parts, split_minutes};
use studybuddy_core::{AppConfig, Command, PresetId, Response};

use crate::session;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the current session
    Start,
    /// Pause the running session
    Pause,
    /// Reload the current mode's full duration
    Reset,
    /// Abandon the current session and switch modes
    Skip,
    /// Print current timer state and stats as JSON
    Status,
    /// Switch to a preset (pomodoro, fifty-ten, ninety-twenty, custom)
    Preset {
        /// Preset ID
        id: String,
    },
    /// Set the custom preset's durations
    Custom {
        #[arg(long, default_value = "25")]
        focus_min: u32,
        #[arg(long, default_value = "0")]
        focus_sec: u32,
        #[arg(long, default_value = "5")]
        break_min: u32,
        #[arg(long, default_value = "0")]
        break_sec: u32,
    },
    /// List presets and their durations
    Presets,
}

pub fn run(action: TimerAction, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut bg = session::open(config)?;

    let command = match action {
        TimerAction::Start => Command::StartTimer,
        TimerAction::Pause => Command::PauseTimer,
        TimerAction::Reset => Command::ResetTimer,
        TimerAction::Skip => Command::SkipSession,
        TimerAction::Status => Command::GetTimerState,
        TimerAction::Preset { id } => Command::SelectPreset { preset_id: Some(id) },
        TimerAction::Custom {
            focus_min,
            focus_sec,
            break_min,
            break_sec,
        } => Command::UpdateCustomTimer {
            focus_minutes: Some(minutes_from_parts(focus_min, focus_sec)),
            break_minutes: Some(minutes_from_parts(break_min, break_sec)),
        },
        TimerAction::Presets => {
            let presets = &bg.settings().session_config;
            let listing: Vec<_> = PresetId::ALL
                .iter()
                .map(|&id| {
                    let preset = presets.get(id);
                    let (focus_min, focus_sec) = split_minutes(preset.focus_minutes);
                    let (break_min, break_sec) = split_minutes(preset.break_minutes);
                    serde_json::json!({
                        "id": id,
                        "active": id == bg.timer_state().active_preset_id,
                        "focus": format!("{focus_min}:{focus_sec:02}"),
                        "break": format!("{break_min}:{break_sec:02}"),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
            return Ok(());
        }
    };

    match session::dispatch(&mut bg, command)? {
        Response::State(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
        Response::Ack(_) => println!("{}", serde_json::to_string_pretty(bg.timer_state())?),
    }
    bg.shutdown();
    Ok(())
}

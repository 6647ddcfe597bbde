use clap::Subcommand;
use studybuddy_core::{AppConfig, Command};

use crate::session;

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show current preferences
    Show,
    /// Alarm and cue volume, 0.0 to 1.0
    Volume { value: f64 },
    /// Daily focus goal in minutes, 15 to 480
    Goal { minutes: u32 },
    /// Dark UI theme
    DarkMode {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

pub fn run(action: PrefsAction, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut bg = session::open(config)?;

    let command = match action {
        PrefsAction::Show => None,
        PrefsAction::Volume { value } => Some(Command::UpdateVolumeSettings {
            sound_volume: Some(value),
        }),
        PrefsAction::Goal { minutes } => Some(Command::UpdateDailyGoal {
            daily_goal: Some(minutes),
        }),
        PrefsAction::DarkMode { enabled } => Some(Command::UpdateDarkMode {
            dark_mode: Some(enabled),
        }),
    };
    if let Some(command) = command {
        session::dispatch(&mut bg, command)?;
    }

    println!("{}", serde_json::to_string_pretty(bg.preferences())?);
    bg.shutdown();
    Ok(())
}

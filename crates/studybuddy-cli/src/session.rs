//! Boots the background service for a one-shot command.
//!
//! Nothing outlives the process, so schedules are only recorded. A session
//! that runs out between invocations is completed by startup
//! reconciliation on the next one.

use std::error::Error;
use std::sync::Arc;

use studybuddy_core::{
    AppConfig, Background, Command, Host, ManualScheduler, Response, SqliteStore, SystemClock,
};

use crate::platform::ConsolePlatform;

pub fn open(config: &AppConfig) -> Result<Background, Box<dyn Error>> {
    let host = Host {
        store: Box::new(SqliteStore::open()?),
        scheduler: Box::new(ManualScheduler::new()),
        platform: Box::new(ConsolePlatform::detached(config.ui.launch_browser)),
        clock: Arc::new(SystemClock),
    };
    let (background, outcome) = Background::init(host, config)?;
    tracing::debug!(?outcome, "state reconciled");
    Ok(background)
}

/// Apply one command and turn a failure ack into an error.
pub fn dispatch(background: &mut Background, command: Command) -> Result<Response, Box<dyn Error>> {
    let name = command.name();
    match background.handle(command) {
        Response::Ack(ack) if !ack.success => {
            let reason = ack.error.unwrap_or_else(|| "unknown error".to_string());
            Err(format!("{name}: {reason}").into())
        }
        response => Ok(response),
    }
}

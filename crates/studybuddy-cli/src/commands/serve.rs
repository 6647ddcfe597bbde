//! Long-running background process over stdio.
//!
//! Reads one JSON command per line from stdin and writes responses and
//! platform effects to stdout as JSON lines. Schedules are real tokio
//! timers, so completions fire on their own.

use std::error::Error;
use std::sync::Arc;

use studybuddy_core::{
    AppConfig, Background, Clock, Command, Host, Response, SqliteStore, SystemClock,
    TokioScheduler, Wakeup,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::platform::{emit, ConsolePlatform, Outbound};

pub fn run(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let (wakeup_tx, mut wakeup_rx) = mpsc::unbounded_channel::<Wakeup>();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let host = Host {
        store: Box::new(SqliteStore::open()?),
        scheduler: Box::new(TokioScheduler::on_current(wakeup_tx, Arc::clone(&clock))),
        platform: Box::new(ConsolePlatform::streaming(config.ui.launch_browser)),
        clock,
    };
    let (mut bg, outcome) = Background::init(host, config)?;
    tracing::info!(?outcome, "background service ready");

    let mut stdin = BufReader::new(tokio::io::stdin());
    // Partial input stays in `buf` when `select!` drops a pending read.
    let mut buf = Vec::new();
    loop {
        tokio::select! {
            read = stdin.read_until(b'\n', &mut buf) => {
                if read? == 0 {
                    tracing::info!("stdin closed, shutting down");
                    break;
                }
                handle_line(&mut bg, &buf);
                buf.clear();
            }
            Some(wakeup) = wakeup_rx.recv() => {
                if let Err(e) = bg.on_wakeup(wakeup) {
                    tracing::error!(schedule = %wakeup.schedule, error = %e, "wake-up failed");
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::warn!(error = %e, "ctrl-c handler failed");
                }
                tracing::info!("received ctrl-c, shutting down");
                break;
            }
        }
    }

    bg.shutdown();
    Ok(())
}

/// Answer one raw line. Undecodable input gets a failure ack and leaves
/// the service running.
fn handle_line(bg: &mut Background, raw: &[u8]) {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(e) => {
            tracing::warn!(error = %e, "command is not valid UTF-8");
            reply(&Response::failure(format!("invalid command: {e}")));
            return;
        }
    };
    if line.is_empty() {
        return;
    }
    let response = match serde_json::from_str::<Command>(line) {
        Ok(command) => {
            tracing::debug!(command = command.name(), "command received");
            bg.handle(command)
        }
        Err(e) => {
            tracing::warn!(error = %e, "undecodable command");
            Response::failure(format!("invalid command: {e}"))
        }
    };
    reply(&response);
}

fn reply(response: &Response) {
    if let Err(e) = emit(&Outbound::Response(response)) {
        tracing::error!(error = %e, "failed to write response");
    }
}

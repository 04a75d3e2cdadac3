mod assessment;
mod config;
mod db;
mod document;
mod docx;
mod form;
mod generate;
mod ipc;
mod plan;
mod presets;
mod render;
mod shell;
mod store;

use std::io::{self, BufRead, Write};
use std::sync::mpsc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // stdout carries the protocol, so logs go to stderr.
    let filter = EnvFilter::try_from_env("MATATAG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn write_line(stdout: &mut io::Stdout, value: &serde_json::Value) {
    let _ = writeln!(
        stdout,
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{\"ok\":false}".to_string())
    );
    let _ = stdout.flush();
}

fn main() {
    init_tracing();

    let config = config::GenerationConfig::from_env();
    if config.api_key.is_none() {
        warn!("no API key configured; lesson.generate will fail until one is set");
    }
    info!(model = %config.model, version = env!("CARGO_PKG_VERSION"), "matatagd starting");

    let (tx, rx) = mpsc::channel::<ipc::Inbound>();
    let mut state = ipc::AppState::new(config);
    state.inbox = Some(tx.clone());

    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(ipc::Inbound::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(ipc::Inbound::Closed);
    });

    let mut stdout = io::stdout();
    for inbound in rx {
        let reply = match inbound {
            ipc::Inbound::Line(line) => ipc::handle_line(&mut state, &line),
            ipc::Inbound::Generated { ticket, outcome } => {
                ipc::handle_generated(&mut state, ticket, outcome)
            }
            ipc::Inbound::Closed => break,
        };
        if let Some(value) = reply {
            write_line(&mut stdout, &value);
        }
    }
    info!("stdin closed; exiting");
}

//! # deat-cli
//!
//! Interactive terminal client for the DEAT survival-engine service —
//! wires the session layer to stdin/stdout and starts the connection.
//!
//! Lines starting with `/` are commands (`/module`, `/variant`,
//! `/preset`, `/send`, `/quit`); any other non-empty line is submitted
//! as a JSON payload. Result rows and status changes print as they
//! arrive.

#![deny(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use deat_client::Session;
use deat_core::{Module, ResultRow, Variant};
use deat_settings::{load_settings, load_settings_from_path};

/// Interactive DEAT client.
#[derive(Parser, Debug)]
#[command(name = "deat", about = "Interactive client for the DEAT survival-engine service")]
struct Cli {
    /// Service host (host:port). Overrides the settings file.
    #[arg(long)]
    host: Option<String>,

    /// Use wss:// instead of ws://.
    #[arg(long)]
    secure: bool,

    /// Module to connect to at startup.
    #[arg(long, default_value = "ARC")]
    module: Module,

    /// Variant preset to load at startup.
    #[arg(long, default_value = "A")]
    variant: Variant,

    /// Settings file path (defaults to `~/.deat/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = match &cli.settings {
        Some(path) => load_settings_from_path(path)?,
        None => load_settings()?,
    };
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if cli.secure {
        settings.server.secure = true;
    }

    let session = Session::spawn(&settings);
    session.select_variant(cli.variant);
    session.select_module(cli.module).await?;

    // Status indicator: one line per connection state change.
    let mut state_rx = session.watch_connection();
    drop(tokio::spawn(async move {
        loop {
            let state = *state_rx.borrow_and_update();
            println!("[status] {state}");
            if state_rx.changed().await.is_err() {
                break;
            }
        }
    }));

    // Result rows print as they arrive.
    let mut rows = session.log().subscribe();
    drop(tokio::spawn(async move {
        loop {
            match rows.recv().await {
                Ok(row) => print_row(&row),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }));

    println!("deat — /module <m>, /variant <v>, /preset, /send, /quit; a JSON line submits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(cmd) = line.strip_prefix('/') {
            match run_command(&session, cmd).await {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => println!("[error] {e}"),
            }
        } else if let Err(e) = session.submit(line).await {
            println!("[error] {e}");
        }
    }

    let _ = session.close().await;
    Ok(())
}

/// Run one slash command. Returns `true` to quit.
async fn run_command(session: &Session, cmd: &str) -> deat_core::Result<bool> {
    let mut parts = cmd.split_whitespace();
    match parts.next().unwrap_or("") {
        "module" => {
            let module: Module = parts.next().unwrap_or("").parse()?;
            session.select_module(module).await?;
            println!("[module] {module}, preset reloaded");
        }
        "variant" => {
            let variant: Variant = parts.next().unwrap_or("").parse()?;
            session.select_variant(variant);
            println!("[variant] {variant}, preset reloaded");
        }
        "preset" => println!("{}", session.payload_text()),
        "send" => session.submit_pending().await?,
        "quit" | "q" => return Ok(true),
        other => println!("unknown command `/{other}`"),
    }
    Ok(false)
}

fn print_row(row: &ResultRow) {
    println!(
        "{} | {} = {:.4} [{}]",
        row.label, row.metric, row.value, row.band
    );
    if !row.equation.is_empty() {
        println!("  {}", row.equation);
    }
    if !row.interpretation.is_empty() {
        println!("  {}", row.interpretation);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! netshot-console - Terminal console for Netshot device groups
//!
//! Browse the device group tree, and add, edit or delete groups through
//! modal dialogs whose operations run in the background. Logs go to a
//! file so they never corrupt the screen.

mod action;
mod app;
mod component;
mod components;
mod config;
mod dialog;
mod error;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::Config;
use crate::services::Inventory;
use crate::tui::Tui;
use anyhow::Result;
use clap::Parser;
use crossterm::event::Event;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "netshot-console", version, about)]
struct Cli {
    /// Config file (defaults to ~/.netshot-console/config.json)
    #[arg(short, long, env = "NETSHOT_CONSOLE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON file holding the device groups
    #[arg(short, long)]
    inventory: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; the returned guard flushes the writer when dropped
fn setup_tracing(log_file: &Path, verbose: u8) -> WorkerGuard {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("netshot_console={level}")));

    let dir = log_file
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("netshot-console.log"));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref());
    if let Some(path) = cli.inventory.clone() {
        config.inventory_path = Some(path);
    }
    if let Some(path) = cli.log_file.clone() {
        config.log_file = Some(path);
    }

    let log_file = config.log_file();
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let _log_guard = setup_tracing(&log_file, cli.verbose);

    // Leave an editable config behind on first start
    if cli.config.is_none() {
        if let Some(path) = Config::default_path().filter(|p| !p.exists()) {
            if let Err(e) = Config::default().save(&path) {
                warn!(path = %path.display(), error = %e, "could not write default config");
            }
        }
    }

    let inventory_path = config.inventory_path();
    info!(inventory = %inventory_path.display(), "starting netshot-console");
    let inventory = Inventory::load(&inventory_path)?
        .with_latency(config.latency())
        .with_session_timeout(config.session_timeout());

    tui::install_panic_hook();
    let mut tui = Tui::new()?.with_tick_rate(config.tick_rate());
    tui.enter()?;

    let mut app = App::new(inventory);
    let result = app.init().and_then(|_| run_app(&mut tui, &mut app));

    tui.exit()?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!(error = %e, "draw failed");
            }
        })?;

        let action = match tui.next_event()? {
            Some(Event::Key(key)) => app.handle_key_event(key)?,
            Some(Event::Resize(w, h)) => Some(Action::Resize(w, h)),
            // No key press or resize within the tick rate
            _ => Some(Action::Tick),
        };

        // An action may produce follow-up actions
        let mut current_action = action;
        while let Some(a) = current_action {
            current_action = app.update(a)?;
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use fsm_designer::{Mode, Session, Settings};
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fsm-designer")]
#[command(version, about = "Interactive designer and simulator for finite-state machines")]
struct Cli {
    /// Command script (or compiled FSM) to load before the interactive prompt
    script: Option<String>,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(&settings);

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "FSM DESIGNER {} {}",
        env!("CARGO_PKG_VERSION"),
        Local::now().format("%B %-d, %Y, %H:%M")
    )?;
    let mut session = Session::new(settings, stdout);

    if let Some(script) = cli.script.as_deref() {
        tracing::info!(script, "preloading");
        session.load_file(script)?;
    }

    if session.is_running() {
        session
            .run(io::stdin().lock(), Mode::Interactive)
            .context("failed to read input")?;
    }
    Ok(())
}

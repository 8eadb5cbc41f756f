//! Coinwatch CLI: compose alert jobs and drive a form session from a console.
//!
//! Commands:
//! - `compose`: build one OCO alert job from flags and print it as JSON
//! - `console`: line-driven session: focus fields, feed keypad values, submit
//! - `watchlist`: list the configured coins

mod console;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use coinwatch_core::domain::Coin;
use coinwatch_core::{
    AlertSession, Config, DraftField, DraftPatch, FocusRouter, JobComposer, JobEnvelope,
    JobSubmitter, SessionError, SubmitError,
};

use crate::console::{parse_line, Command};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "coinwatch.toml";

#[derive(Parser)]
#[command(
    name = "coinwatch",
    about = "Coinwatch CLI: compose price alerts for watched coin pairs"
)]
struct Cli {
    /// Log level written to stderr (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,

    /// Path to a TOML config file. Defaults to ./coinwatch.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an alert job from flags and print it as JSON.
    Compose {
        /// Coin to watch, as exchange:BASE/COUNTER (e.g., binance:BTC/USDT).
        #[arg(long)]
        coin: Coin,

        /// Display name used in alert messages. Defaults to the watchlist name.
        #[arg(long)]
        name: Option<String>,

        /// Alert when price drops below this.
        #[arg(long, default_value = "")]
        low: String,

        /// Alert when price rises above this.
        #[arg(long, default_value = "")]
        high: String,

        /// Note appended to both alert messages.
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Read form events from stdin, one per line.
    Console {
        /// Coin to watch, as exchange:BASE/COUNTER.
        #[arg(long)]
        coin: Coin,
    },
    /// List the coins in the configured watchlist.
    Watchlist,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(cli.log_level)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compose {
            coin,
            name,
            low,
            high,
            message,
        } => cmd_compose(&config, coin, name, low, high, message),
        Commands::Console { coin } => cmd_console(&config, coin),
        Commands::Watchlist => cmd_watchlist(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::from_file(Path::new(DEFAULT_CONFIG))
            .with_context(|| format!("loading {DEFAULT_CONFIG}")),
        None => Ok(Config::default()),
    }
}

/// Use the watchlist's display name unless one was given.
fn resolve_coin(config: &Config, coin: Coin, name: Option<String>) -> Coin {
    match name {
        Some(name) => Coin::with_name(coin.trigger, name),
        None => config.watchlist.resolve(&coin.trigger),
    }
}

// ── compose ──────────────────────────────────────────────────────────

fn cmd_compose(
    config: &Config,
    coin: Coin,
    name: Option<String>,
    low: String,
    high: String,
    message: String,
) -> Result<()> {
    let coin = resolve_coin(config, coin, name);

    let mut composer = JobComposer::with_level(config.composer.notification_level);
    composer.update(
        DraftPatch::field(DraftField::LowPrice, low)
            .set(DraftField::HighPrice, high)
            .set(DraftField::Message, message),
    );

    let validity = composer.validity();
    eprintln!(
        "lowPrice valid: {}, highPrice valid: {}",
        validity.low_price_valid, validity.high_price_valid
    );

    let job = composer.build_job(&coin);
    if job.is_empty() {
        eprintln!("Warning: no valid threshold, job has no branches");
    }
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

// ── console ──────────────────────────────────────────────────────────

/// Prints each submitted envelope as one JSON line on stdout.
struct StdoutSubmitter;

impl JobSubmitter for StdoutSubmitter {
    fn submit(&self, envelope: &JobEnvelope) -> Result<(), SubmitError> {
        let line = serde_json::to_string(envelope)?;
        let mut out = io::stdout().lock();
        writeln!(out, "{line}").map_err(|e| SubmitError::Rejected(e.to_string()))?;
        out.flush().map_err(|e| SubmitError::Rejected(e.to_string()))
    }
}

fn cmd_console(config: &Config, coin: Coin) -> Result<()> {
    let coin = resolve_coin(config, coin, None);
    let router = Arc::new(FocusRouter::new());
    let mut session = AlertSession::new(coin, router, StdoutSubmitter, config.composer);

    eprintln!("Watching {}. Type 'quit' to exit.", session.coin());

    let stdin = io::stdin();
    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("line {}: {err:#}", line_no + 1);
                continue;
            }
        };
        if !run_command(config, &mut session, command)? {
            break;
        }
    }
    Ok(())
}

/// Apply one console command. Returns false when the session should end.
fn run_command(config: &Config, session: &mut AlertSession, command: Command) -> Result<bool> {
    match command {
        Command::Focus(field) => session.on_focus(field),
        Command::Key(value) => {
            if !session.dispatch(value) {
                eprintln!("No field focused, value dropped");
            }
        }
        Command::Set(field, value) => {
            session.on_change(DraftPatch::field(field, value));
        }
        Command::Blur => session.on_blur(),
        Command::Show => {
            let snapshot = session.snapshot();
            let focused = session.router().active_field();
            eprintln!(
                "{} | focus: {}",
                session.coin(),
                focused.as_deref().unwrap_or("-")
            );
            println!("{}", serde_json::to_string(&snapshot)?);
        }
        Command::Reset => session.reset(),
        Command::Submit => match session.submit() {
            Ok(envelope) => eprintln!("Submitted job {}", envelope.id),
            Err(SessionError::EmptyJob) => {
                eprintln!("Nothing to submit: enter a valid low or high price");
            }
            Err(err) => eprintln!("Error: {err}"),
        },
        Command::SwitchCoin(coin) => {
            let coin = config.watchlist.resolve(&coin.trigger);
            eprintln!("Watching {coin}");
            session.change_coin(coin);
        }
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

// ── watchlist ────────────────────────────────────────────────────────

fn cmd_watchlist(config: &Config) -> Result<()> {
    if config.watchlist.is_empty() {
        println!("Watchlist is empty. Add [watchlist.<exchange>] sections to {DEFAULT_CONFIG}.");
        return Ok(());
    }

    println!("{:<12} {:<8} {:<8} Name", "Exchange", "Base", "Counter");
    println!("{}", "-".repeat(44));
    for coin in config.watchlist.coins() {
        println!(
            "{:<12} {:<8} {:<8} {}",
            coin.trigger.exchange, coin.trigger.base, coin.trigger.counter, coin.name
        );
    }
    println!("\n{} coins", config.watchlist.len());
    Ok(())
}

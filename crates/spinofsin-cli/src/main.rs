//! Headless Spin of Sin driver.
//!
//! Reads an input script (see [`script`]), plays it against a seeded game and
//! prints every game event as one JSON object per line on stdout. Logs go to
//! stderr.
//!
//! ```text
//! spinofsin --seed 7 --store profile.json --script round.txt
//! ```

mod script;
mod store;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::Level;

use cylinder::Chamber;
use spinofsin_core::{
    Game, GameConfig, GameEvent, GameState, KeyValueStore, MemoryStore, NullAudio, SeededRandom,
};

use crate::script::Command;
use crate::store::JsonFileStore;

#[derive(Parser)]
#[command(name = "spinofsin", about = "Play Spin of Sin from an input script")]
struct Cli {
    /// Game tuning as JSON; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Profile file; without it the profile lives in memory only.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Seed for every random draw.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Input script; reads stdin when absent.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// More log output on stderr (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One stdout line: an event stamped with the game clock.
#[derive(Serialize)]
struct EventLine<'a> {
    at_ms: u128,
    #[serde(flatten)]
    event: &'a GameEvent,
}

/// Reply to the `state` command.
#[derive(Serialize)]
struct Snapshot<'a> {
    at_ms: u128,
    state: GameState,
    rotation: f64,
    active_slot: Option<usize>,
    total_spins: u64,
    chamber: &'a Chamber,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            GameConfig::from_json_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    let text = match &cli.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read script from stdin")?;
            text
        }
    };
    let commands = script::parse_script(&text)?;

    let store: Box<dyn KeyValueStore> = match &cli.store {
        Some(path) => Box::new(JsonFileStore::open(path)),
        None => Box::new(MemoryStore::new()),
    };
    let mut game = Game::new(
        config,
        store,
        Box::new(NullAudio),
        Box::new(SeededRandom::new(cli.seed)),
    );
    tracing::info!("seed {}, {} commands", cli.seed, commands.len());

    let frame = Duration::from_millis(cli.frame_ms.max(1));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for command in &commands {
        tracing::debug!("{:?}", command);
        script::apply(&mut game, command, frame);
        let at_ms = game.now().as_millis();
        for event in game.take_events() {
            serde_json::to_writer(&mut out, &EventLine { at_ms, event: &event })?;
            writeln!(out)?;
        }
        if *command == Command::State {
            let snapshot = Snapshot {
                at_ms,
                state: game.state(),
                rotation: game.rotation(),
                active_slot: game.active_slot(),
                total_spins: game.total_spins(),
                chamber: game.chamber(),
            };
            serde_json::to_writer(&mut out, &snapshot)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

//! Strictly Cubes - command-line driver.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use strictly_cubes::games::cubes::contracts::apply_audited;
use strictly_cubes::games::cubes::simple_ai::pick_move;
use strictly_cubes::{
    EventKind, GameEvent, GameMode, GameState, MatchConfig, MoveRequest, Point,
    SnapshotPayload, validate_state,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { config, grid_size } => run_play(config.as_deref(), grid_size),
        Command::Audit { snapshot } => run_audit(&snapshot),
        Command::Replay { moves, grid_size } => run_replay(&moves, grid_size),
    }
}

/// Plays a full match with both seats driven by the built-in player.
#[instrument]
fn run_play(config: Option<&Path>, grid_size: Option<u32>) -> Result<()> {
    let mut config = match config {
        Some(path) => MatchConfig::from_file(path)?,
        None => MatchConfig::default(),
    };
    if let Some(n) = grid_size {
        config = config.with_grid_size(n);
    }
    if *config.mode() == GameMode::Online {
        bail!("online matches need a transport; use local or ai mode");
    }

    let mut game = config.with_ai_seats().build_match()?;
    game.subscribe(EventKind::Error, |event| {
        if let GameEvent::Error { kind, detail } = event {
            warn!(%kind, %detail, "Match reported an error");
        }
    });
    game.subscribe(EventKind::GameEnded, |event| {
        if let GameEvent::GameEnded { winner, state } = event {
            info!(%winner, turn = state.turn(), "Match over");
        }
    });
    game.start();

    while let Some(edge) = pick_move(game.state()) {
        game.request_move(edge.start(), edge.end())?;
    }

    println!("{}", game.state().summary());
    Ok(())
}

/// Parses a snapshot through the wire boundary and audits it.
#[instrument]
fn run_audit(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let payload: SnapshotPayload = serde_json::from_str(&raw).context("parsing snapshot")?;
    let state = GameState::try_from(payload)?;

    let report = validate_state(Some(&state));
    print!("{report}");
    if !report.valid {
        bail!("snapshot violates {} invariant(s)", report.errors.len());
    }
    println!("{}", state.summary());
    Ok(())
}

/// Replays an edge list from a fresh lattice, auditing every step.
#[instrument]
fn run_replay(path: &Path, grid_size: u32) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let moves: Vec<[Point; 2]> = serde_json::from_str(&raw).context("parsing moves")?;

    let mut state = MatchConfig::default()
        .with_grid_size(grid_size)
        .build_state()?;
    for (i, [start, end]) in moves.into_iter().enumerate() {
        let request = MoveRequest::new(start, end);
        state = apply_audited(&state, request)
            .with_context(|| format!("move {} ({request}) rejected", i + 1))?
            .state;
    }

    println!("{}", state.summary());
    Ok(())
}

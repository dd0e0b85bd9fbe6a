//! Command-line interface for strictly_cubes.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Cubes - authoritative 3D dots-and-boxes engine
#[derive(Parser, Debug)]
#[command(name = "strictly_cubes")]
#[command(about = "Authoritative engine for three-dimensional dots and boxes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a complete match between two built-in players
    Play {
        /// Match configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the lattice size
        #[arg(long)]
        grid_size: Option<u32>,
    },

    /// Audit a JSON game state snapshot
    Audit {
        /// Snapshot file in wire format
        snapshot: PathBuf,
    },

    /// Replay a JSON list of [start, end] moves from a fresh state
    Replay {
        /// Moves file
        moves: PathBuf,

        /// Lattice size
        #[arg(long, default_value = "3")]
        grid_size: u32,
    },
}

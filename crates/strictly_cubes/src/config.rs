//! Match configuration loaded from TOML.

use crate::games::cubes::geometry::{MAX_GRID_SIZE, MIN_GRID_SIZE};
use crate::games::cubes::types::{GameMode, GameState, Player};
use crate::session::{Match, MatchOptions};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Seat identifiers assigned in order.
pub const SEAT_IDS: [&str; 2] = ["player-1", "player-2"];

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SeatConfig {
    /// Display name.
    name: String,
    /// Display color.
    #[serde(default = "default_color")]
    color: String,
    /// Controlled by the built-in player.
    #[serde(default)]
    ai: bool,
}

impl SeatConfig {
    /// Creates a seat.
    pub fn new(name: impl Into<String>, color: impl Into<String>, ai: bool) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            ai,
        }
    }
}

/// Configuration for a match.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Points per lattice edge.
    #[serde(default = "default_grid_size")]
    grid_size: u32,

    /// Play mode.
    #[serde(default)]
    mode: GameMode,

    /// Exactly two seats, first to move first.
    #[serde(default = "default_players")]
    players: Vec<SeatConfig>,

    /// Automated seats play free continuations themselves.
    #[serde(default = "default_true")]
    autoplay_chains: bool,

    /// Audit every transition.
    #[serde(default = "default_true")]
    audit_transitions: bool,
}

fn default_grid_size() -> u32 {
    3
}

fn default_color() -> String {
    "#aaaaaa".to_string()
}

fn default_true() -> bool {
    true
}

fn default_players() -> Vec<SeatConfig> {
    vec![
        SeatConfig::new("Red", "#ff4136", false),
        SeatConfig::new("Blue", "#0074d9", false),
    ]
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            mode: GameMode::default(),
            players: default_players(),
            autoplay_chains: true,
            audit_transitions: true,
        }
    }
}

impl MatchConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(grid_size = config.grid_size, mode = %config.mode, "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides the lattice size.
    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Makes both seats automated.
    pub fn with_ai_seats(mut self) -> Self {
        for seat in &mut self.players {
            seat.ai = true;
        }
        self
    }

    /// Checks ranges and seat count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(ConfigError::new(format!(
                "grid_size {} outside {}..={}",
                self.grid_size, MIN_GRID_SIZE, MAX_GRID_SIZE
            )));
        }
        if self.players.len() != 2 {
            return Err(ConfigError::new(format!(
                "expected 2 players, found {}",
                self.players.len()
            )));
        }
        Ok(())
    }

    /// Builds the initial state: seats get ids `player-1` and `player-2`.
    #[instrument(skip(self), fields(grid_size = self.grid_size))]
    pub fn build_state(&self) -> Result<GameState, ConfigError> {
        self.validate()?;
        let [first, second] = [0, 1].map(|i| {
            let seat = &self.players[i];
            Player::new(SEAT_IDS[i], seat.name.clone(), seat.color.clone(), seat.ai)
        });
        GameState::new(self.grid_size, [first, second], self.mode)
            .map_err(|e| ConfigError::new(format!("Invalid match setup: {}", e)))
    }

    /// Behavior switches for the match.
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions::new(self.autoplay_chains, self.audit_transitions)
    }

    /// Builds a ready match.
    pub fn build_match(&self) -> Result<Match, ConfigError> {
        Ok(Match::new(self.build_state()?, self.match_options()))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a configuration error at the caller's location.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

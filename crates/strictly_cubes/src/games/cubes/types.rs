//! Core domain types for the cube game.

use super::geometry::{
    CellCoord, Edge, FaceKey, MAX_GRID_SIZE, MIN_GRID_SIZE, Orientation, Point, Square, all_cells,
    cell_count, max_lines,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

/// Stable player identifier, unique within a match.
pub type PlayerId = String;

/// How the match is being played.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    /// Two humans sharing one engine.
    #[default]
    Local,
    /// A human against an automated player.
    Ai,
    /// Two remote peers reconciled against an authoritative server.
    Online,
}

/// A participant in the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Cells owned.
    pub score: u32,
    /// Faces owned.
    pub square_count: u32,
    /// Whether an automated participant controls this seat.
    #[serde(rename = "isAI")]
    pub is_ai: bool,
}

impl Player {
    /// Creates a player with zeroed counters.
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        color: impl Into<String>,
        is_ai: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            score: 0,
            square_count: 0,
            is_ai,
        }
    }
}

/// A drawn edge and the player who drew it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
    /// Who drew it.
    pub player: PlayerId,
}

impl Line {
    /// Records `edge` as drawn by `player`.
    pub fn new(edge: Edge, player: PlayerId) -> Self {
        Self {
            start: edge.start(),
            end: edge.end(),
            player,
        }
    }

    /// The canonical edge, if the endpoints are adjacent.
    pub fn edge(&self) -> Option<Edge> {
        Edge::new(self.start, self.end)
    }

    /// Endpoint pair in sorted order, for undirected deduplication even when
    /// the geometry is invalid.
    pub fn undirected_key(&self) -> (Point, Point) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }
}

/// A completed unit square.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// Sorted corners; the face's identity.
    pub corners: FaceKey,
    /// Plane of the face.
    pub orientation: Orientation,
    /// Player who drew the completing edge.
    pub owner: PlayerId,
}

impl Face {
    /// Creates a face owned by `owner`.
    pub fn new(square: Square, owner: PlayerId) -> Self {
        Self {
            corners: square.key(),
            orientation: square.orientation(),
            owner,
        }
    }

    /// The geometric square, if the corners describe one.
    pub fn square(&self) -> Option<Square> {
        Square::from_key(&self.corners)
    }
}

/// A unit cell of the lattice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Minimum corner.
    pub origin: Point,
    /// Claiming player, fixed once set.
    pub owner: Option<PlayerId>,
}

impl Cell {
    /// Creates an unclaimed cell.
    pub fn unclaimed(coord: CellCoord) -> Self {
        Self {
            origin: coord.origin(),
            owner: None,
        }
    }

    /// Cell coordinate.
    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.origin)
    }
}

/// The most recently applied move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct LastMove {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
    /// Mover.
    pub player: PlayerId,
}

/// Errors creating a fresh game.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SetupError {
    /// Lattice size outside the supported range.
    #[display("Grid size {} is outside {}..={}", _0, MIN_GRID_SIZE, MAX_GRID_SIZE)]
    InvalidGridSize(u32),
    /// Both seats share an id.
    #[display("Player id {:?} is used by both seats", _0)]
    DuplicatePlayerId(PlayerId),
    /// A seat has an empty id.
    #[display("Player ids must not be empty")]
    EmptyPlayerId,
}

impl std::error::Error for SetupError {}

/// Complete game state.
///
/// Values are never mutated after construction by the engine: every
/// operation produces a new state. The large collections sit behind `Arc`
/// and are copied on write, so successive states share storage until one
/// of them changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) grid_size: u32,
    pub(crate) players: Vec<Player>,
    pub(crate) lines: Arc<Vec<Line>>,
    pub(crate) faces: Arc<Vec<Face>>,
    pub(crate) cells: Arc<Vec<Cell>>,
    pub(crate) current_player: PlayerId,
    pub(crate) turn: u64,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) mode: GameMode,
    pub(crate) last_move: Option<LastMove>,
}

impl GameState {
    /// Creates a fresh match: every cell allocated and unclaimed, nothing
    /// drawn, first seat to move.
    #[instrument(skip(players), fields(seat_one = %players[0].id, seat_two = %players[1].id))]
    pub fn new(grid_size: u32, players: [Player; 2], mode: GameMode) -> Result<Self, SetupError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
            return Err(SetupError::InvalidGridSize(grid_size));
        }
        if players.iter().any(|p| p.id.is_empty()) {
            return Err(SetupError::EmptyPlayerId);
        }
        if players[0].id == players[1].id {
            return Err(SetupError::DuplicatePlayerId(players[0].id.clone()));
        }

        let players: Vec<Player> = players
            .into_iter()
            .map(|p| Player {
                score: 0,
                square_count: 0,
                ..p
            })
            .collect();
        let current_player = players[0].id.clone();

        Ok(Self {
            grid_size,
            players,
            lines: Arc::new(Vec::new()),
            faces: Arc::new(Vec::new()),
            cells: Arc::new(all_cells(grid_size).map(Cell::unclaimed).collect()),
            current_player,
            turn: 0,
            winner: None,
            mode,
            last_move: None,
        })
    }

    /// A fresh match with the same lattice, seats and mode.
    ///
    /// An unsupported lattice size, as a remote snapshot may carry, is
    /// clamped into `MIN_GRID_SIZE..=MAX_GRID_SIZE` first.
    pub fn restarted(&self) -> Self {
        let grid_size = self.grid_size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
        Self {
            grid_size,
            players: self
                .players
                .iter()
                .map(|p| Player {
                    score: 0,
                    square_count: 0,
                    ..p.clone()
                })
                .collect(),
            lines: Arc::new(Vec::new()),
            faces: Arc::new(Vec::new()),
            cells: Arc::new(all_cells(grid_size).map(Cell::unclaimed).collect()),
            current_player: self
                .players
                .first()
                .map(|p| p.id.clone())
                .unwrap_or_default(),
            turn: 0,
            winner: None,
            last_move: None,
            ..self.clone()
        }
    }

    /// Lattice edge length.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Seated players.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Drawn lines in the order they were drawn.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Completed faces in the order they were completed.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// All cells of the lattice.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Id of the player to move.
    pub fn current_player(&self) -> &PlayerId {
        &self.current_player
    }

    /// Number of moves applied so far.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Winner, once decided.
    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    /// Play mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Most recent move.
    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }

    /// Looks up a player by id.
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The player to move, if the id resolves.
    pub fn current(&self) -> Option<&Player> {
        self.player(&self.current_player)
    }

    /// The seat facing `id`.
    pub fn opponent_of(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id != id)
    }

    /// Whether the match has a winner.
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Total cells in the lattice.
    pub fn total_cells(&self) -> u64 {
        cell_count(self.grid_size)
    }

    /// Cells with an owner.
    pub fn claimed_cells(&self) -> u64 {
        self.cells.iter().filter(|c| c.owner.is_some()).count() as u64
    }

    /// Edges still available.
    pub fn remaining_edges(&self) -> u64 {
        max_lines(self.grid_size).saturating_sub(self.lines.len() as u64)
    }

    /// Set of drawn, geometrically valid edges.
    pub fn edge_set(&self) -> HashSet<Edge> {
        self.lines.iter().filter_map(Line::edge).collect()
    }

    /// Whether `edge` has been drawn, in either endpoint order.
    pub fn has_line(&self, edge: Edge) -> bool {
        self.lines.iter().any(|l| l.edge() == Some(edge))
    }

    /// One-line scoreboard.
    pub fn summary(&self) -> String {
        let seats = self
            .players
            .iter()
            .map(|p| format!("{}: {} cubes / {} faces", p.name, p.score, p.square_count))
            .collect::<Vec<_>>()
            .join(", ");
        let status = match self.winner().and_then(|w| self.player(w)) {
            Some(w) => format!("winner {}", w.name),
            None => format!("{} to move", self.current_player),
        };
        format!(
            "turn {} | {} | {}/{} cubes claimed | {}",
            self.turn,
            seats,
            self.claimed_cells(),
            self.total_cells(),
            status
        )
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_fresh_state_preallocates_cells() {
        let state = fresh(3);
        assert_eq!(state.cells().len(), 8);
        assert!(state.cells().iter().all(|c| c.owner.is_none()));
        assert_eq!(state.turn(), 0);
        assert_eq!(state.current_player(), "alice");
        assert!(state.winner().is_none());
        assert!(state.lines().is_empty());
    }

    #[test]
    fn test_rejects_bad_setup() {
        assert_eq!(
            GameState::new(1, seats(), GameMode::Local),
            Err(SetupError::InvalidGridSize(1))
        );
        let twins = [
            Player::new("x", "X", "red", false),
            Player::new("x", "Y", "blue", false),
        ];
        assert!(matches!(
            GameState::new(3, twins, GameMode::Local),
            Err(SetupError::DuplicatePlayerId(_))
        ));
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(fresh(2)).unwrap();
        assert!(json.get("gridSize").is_some());
        assert!(json.get("currentPlayer").is_some());
        assert_eq!(json["players"][0]["isAI"], serde_json::json!(false));
        assert_eq!(json["players"][0]["squareCount"], serde_json::json!(0));
    }

    #[test]
    fn test_restarted_keeps_seats() {
        let mut state = fresh(3);
        state.turn = 7;
        state.players[1].score = 2;
        let again = state.restarted();
        assert_eq!(again, fresh(3));
    }

    #[test]
    fn test_restarted_clamps_unsupported_grid() {
        let mut state = fresh(3);
        state.grid_size = 2000;
        let again = state.restarted();
        assert_eq!(again.grid_size(), MAX_GRID_SIZE);
        assert_eq!(again.cells().len() as u64, cell_count(MAX_GRID_SIZE));

        state.grid_size = 0;
        assert_eq!(state.restarted(), fresh(2));
    }
}

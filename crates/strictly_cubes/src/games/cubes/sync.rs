//! Reconciliation of local state with authoritative remote snapshots.
//!
//! Remote messages arrive as explicitly tagged variants. Snapshot payloads
//! are deserialized with every field optional, then converted into a
//! [`GameState`] with the first missing or malformed field reported. A
//! valid snapshot replaces the local state wholesale: no merging, the
//! authority always wins.

use super::types::{Cell, Face, GameMode, GameState, LastMove, Line, Player, PlayerId};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Messages consumed from the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
pub enum RemoteMessage {
    /// This client created a room and was seated.
    RoomCreated {
        /// Room identifier.
        room_id: String,
        /// Seat assigned to this client.
        player_id: PlayerId,
    },
    /// This client joined an existing room.
    RoomJoined {
        /// Room identifier.
        room_id: String,
        /// Seat assigned to this client.
        player_id: PlayerId,
        /// Current snapshot, if the match is already running.
        #[serde(default)]
        game_state: Option<SnapshotPayload>,
    },
    /// Another participant joined.
    PlayerJoined {
        /// Their seat.
        player_id: PlayerId,
        /// Their display name.
        player_name: String,
    },
    /// Another participant left.
    PlayerLeft {
        /// Their seat.
        player_id: PlayerId,
        /// Their display name.
        player_name: String,
    },
    /// The match started; the snapshot is ground truth.
    GameStarted {
        /// Full authoritative snapshot.
        #[serde(default)]
        game_state: Option<SnapshotPayload>,
    },
    /// Authoritative snapshot after a move.
    GameStateUpdate(Option<SnapshotPayload>),
}

impl RemoteMessage {
    /// Parses a JSON message, rejecting unknown message types and shapes.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Malformed`] when the text is not a known message.
    #[instrument(skip(raw), fields(bytes = raw.len()))]
    pub fn from_json(raw: &str) -> Result<Self, SyncError> {
        serde_json::from_str(raw).map_err(|e| SyncError::Malformed(e.to_string()))
    }
}

/// Player as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    /// Stable identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Display color.
    pub color: Option<String>,
    /// Cells owned; signed so negative values can be rejected explicitly.
    pub score: Option<i64>,
    /// Faces owned.
    pub square_count: Option<i64>,
    /// Automated seat.
    #[serde(rename = "isAI", alias = "isAi")]
    pub is_ai: Option<bool>,
}

impl From<&Player> for PlayerPayload {
    fn from(p: &Player) -> Self {
        Self {
            id: Some(p.id.clone()),
            name: Some(p.name.clone()),
            color: Some(p.color.clone()),
            score: Some(i64::from(p.score)),
            square_count: Some(i64::from(p.square_count)),
            is_ai: Some(p.is_ai),
        }
    }
}

/// A game state snapshot as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    /// Lattice edge length.
    pub grid_size: Option<u32>,
    /// Seats.
    pub players: Option<Vec<PlayerPayload>>,
    /// Drawn lines.
    pub lines: Option<Vec<Line>>,
    /// Completed faces.
    pub faces: Option<Vec<Face>>,
    /// All cells.
    pub cells: Option<Vec<Cell>>,
    /// Player to move.
    pub current_player: Option<PlayerId>,
    /// Turn counter.
    pub turn: Option<u64>,
    /// Winner.
    pub winner: Option<PlayerId>,
    /// Mode tag.
    pub mode: Option<GameMode>,
    /// Last move.
    pub last_move: Option<LastMove>,
}

impl From<&GameState> for SnapshotPayload {
    fn from(state: &GameState) -> Self {
        Self {
            grid_size: Some(state.grid_size()),
            players: Some(state.players().iter().map(PlayerPayload::from).collect()),
            lines: Some(state.lines().to_vec()),
            faces: Some(state.faces().to_vec()),
            cells: Some(state.cells().to_vec()),
            current_player: Some(state.current_player().clone()),
            turn: Some(state.turn()),
            winner: state.winner().cloned(),
            mode: Some(state.mode()),
            last_move: state.last_move().cloned(),
        }
    }
}

/// Why a remote payload was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SyncError {
    /// The message carried no snapshot.
    #[display("Message carried no game state")]
    MissingPayload,
    /// A required field was absent or null.
    #[display("Snapshot is missing required field {:?}", _0)]
    MissingField(&'static str),
    /// A field was present but unusable.
    #[display("Snapshot field {:?} is invalid: {}", field, reason)]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The text was not a recognizable message.
    #[display("Malformed message: {}", _0)]
    Malformed(String),
}

impl std::error::Error for SyncError {}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, SyncError> {
    value.ok_or(SyncError::MissingField(field))
}

fn counter(value: Option<i64>, field: &'static str) -> Result<u32, SyncError> {
    let raw = require(value, field)?;
    u32::try_from(raw).map_err(|_| SyncError::InvalidField {
        field,
        reason: format!("{raw} is not a valid count"),
    })
}

impl TryFrom<PlayerPayload> for Player {
    type Error = SyncError;

    fn try_from(p: PlayerPayload) -> Result<Self, Self::Error> {
        Ok(Player {
            id: require(p.id, "players.id")?,
            name: p.name.unwrap_or_default(),
            color: p.color.unwrap_or_default(),
            score: counter(p.score, "players.score")?,
            square_count: counter(p.square_count, "players.squareCount")?,
            is_ai: p.is_ai.unwrap_or(false),
        })
    }
}

impl TryFrom<SnapshotPayload> for GameState {
    type Error = SyncError;

    /// Converts a wire snapshot. Shape is checked here; game invariants are
    /// left to the validator, since the authority's data is accepted as is.
    fn try_from(s: SnapshotPayload) -> Result<Self, Self::Error> {
        let players = require(s.players, "players")?
            .into_iter()
            .map(Player::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GameState {
            grid_size: require(s.grid_size, "gridSize")?,
            players,
            lines: Arc::new(require(s.lines, "lines")?),
            faces: Arc::new(require(s.faces, "faces")?),
            cells: Arc::new(require(s.cells, "cells")?),
            current_player: require(s.current_player, "currentPlayer")?,
            turn: require(s.turn, "turn")?,
            winner: s.winner,
            mode: s.mode.unwrap_or(GameMode::Online),
            last_move: s.last_move,
        })
    }
}

/// Result of reconciling one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The local state was replaced.
    Replaced(GameState),
    /// The snapshot matched the local state; nothing to do.
    Unchanged,
}

/// Applies authoritative snapshots over a local replica.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synchronizer {
    applied: u64,
    unchanged: u64,
    rejected: u64,
}

impl Synchronizer {
    /// Creates a synchronizer with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles `local` with an authoritative `payload`.
    ///
    /// Full overwrite, last writer wins. The local mode tag is kept.
    /// Authoritative data skips the transition checks, so the turn counter
    /// may move backward.
    ///
    /// # Errors
    ///
    /// [`SyncError`] when the payload is absent or malformed; the caller's
    /// local state stays as it was.
    #[instrument(skip_all, fields(local_turn = local.turn()))]
    pub fn reconcile(
        &mut self,
        local: &GameState,
        payload: Option<SnapshotPayload>,
    ) -> Result<SyncOutcome, SyncError> {
        let converted = payload
            .ok_or(SyncError::MissingPayload)
            .and_then(GameState::try_from);
        let mut incoming = match converted {
            Ok(state) => state,
            Err(e) => {
                self.rejected += 1;
                warn!(error = %e, "Discarded remote snapshot");
                return Err(e);
            }
        };
        incoming.mode = local.mode();

        if incoming == *local {
            self.unchanged += 1;
            debug!("Snapshot matches local state");
            return Ok(SyncOutcome::Unchanged);
        }

        if incoming.turn() < local.turn() {
            info!(
                incoming_turn = incoming.turn(),
                "Authoritative snapshot rewinds the turn counter"
            );
        }
        self.applied += 1;
        debug!(remote_turn = incoming.turn(), "Local state replaced");
        Ok(SyncOutcome::Replaced(incoming))
    }

    /// Snapshots that replaced local state.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Snapshots identical to local state.
    pub fn unchanged(&self) -> u64 {
        self.unchanged
    }

    /// Payloads discarded as malformed.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cubes::types::fixtures::fresh;

    fn online(grid: u32) -> GameState {
        let mut s = fresh(grid);
        s.mode = GameMode::Online;
        s
    }

    #[test]
    fn test_snapshot_roundtrips_through_wire_form() {
        let state = online(3);
        let payload = SnapshotPayload::from(&state);
        assert_eq!(GameState::try_from(payload).unwrap(), state);
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut payload = SnapshotPayload::from(&online(3));
        payload.current_player = None;
        assert_eq!(
            GameState::try_from(payload),
            Err(SyncError::MissingField("currentPlayer"))
        );
    }

    #[test]
    fn test_negative_score_rejected() {
        let mut payload = SnapshotPayload::from(&online(3));
        if let Some(players) = payload.players.as_mut() {
            players[0].score = Some(-1);
        }
        assert!(matches!(
            GameState::try_from(payload),
            Err(SyncError::InvalidField {
                field: "players.score",
                ..
            })
        ));
    }

    #[test]
    fn test_identical_snapshot_is_unchanged() {
        let local = online(3);
        let mut sync = Synchronizer::new();
        let outcome = sync
            .reconcile(&local, Some(SnapshotPayload::from(&local)))
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(sync.unchanged(), 1);
    }

    #[test]
    fn test_null_payload_rejected() {
        let mut sync = Synchronizer::new();
        assert_eq!(
            sync.reconcile(&online(3), None),
            Err(SyncError::MissingPayload)
        );
        assert_eq!(sync.rejected(), 1);
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        let err = RemoteMessage::from_json(r#"{"type":"teleport","payload":{}}"#).unwrap_err();
        assert!(matches!(err, SyncError::Malformed(_)));
    }

    #[test]
    fn test_room_created_parses() {
        let msg = RemoteMessage::from_json(
            r#"{"type":"room-created","payload":{"roomId":"r1","playerId":"alice"}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            RemoteMessage::RoomCreated {
                room_id: "r1".into(),
                player_id: "alice".into()
            }
        );
    }
}

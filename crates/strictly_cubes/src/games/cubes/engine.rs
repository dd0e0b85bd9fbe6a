//! State transition engine.
//!
//! Composes the rules into a single "apply move" step that turns one state
//! value into the next. The input state is never touched.

use super::action::{MoveError, MoveRequest};
use super::geometry::{CellCoord, Edge};
use super::rules::completion::faces_closed_by;
use super::rules::{claimed_cells, decide_winner, next_player, rescore, retains_turn, validate_move};
use super::types::{Face, GameState, LastMove, Line, PlayerId};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The outcome of one applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The state after the move.
    pub state: GameState,
    /// The edge that was drawn.
    pub edge: Edge,
    /// Who drew it.
    pub mover: PlayerId,
    /// Faces completed by the move.
    pub new_faces: Vec<Face>,
    /// Cells claimed by the move.
    pub new_cells: Vec<(CellCoord, PlayerId)>,
    /// Whether the mover moves again.
    pub turn_kept: bool,
}

impl Transition {
    /// Winner, if this move ended the match.
    pub fn winner(&self) -> Option<&PlayerId> {
        self.state.winner()
    }
}

/// Validates and applies the move `start`-`end` for the current player.
///
/// # Errors
///
/// Returns the [`MoveError`] from the move validator; the input state is
/// unchanged either way.
#[instrument(skip(state), fields(turn = state.turn(), mover = %state.current_player()))]
pub fn apply_move(state: &GameState, request: MoveRequest) -> Result<Transition, MoveError> {
    let edge = validate_move(state, request.start, request.end)?;
    Ok(apply_edge(state, edge))
}

/// Applies an already validated edge.
///
/// Steps: append the line, detect completed faces, detect claimed cells,
/// recount scores, decide winner and next player, bump the turn counter.
pub(crate) fn apply_edge(state: &GameState, edge: Edge) -> Transition {
    let mover = state.current_player.clone();
    let drawn = state.edge_set();
    let new_faces = faces_closed_by(&drawn, state.grid_size, edge, &mover);

    let mut next = state.clone();
    Arc::make_mut(&mut next.lines).push(Line::new(edge, mover.clone()));
    if !new_faces.is_empty() {
        Arc::make_mut(&mut next.faces).extend(new_faces.iter().cloned());
    }

    let new_cells = claimed_cells(next.grid_size, &next.cells, &next.faces, &new_faces);
    if !new_cells.is_empty() {
        let cells = Arc::make_mut(&mut next.cells);
        for (coord, owner) in &new_cells {
            if let Some(cell) = cells.iter_mut().find(|c| c.origin == coord.origin()) {
                cell.owner = Some(owner.clone());
            }
        }
    }

    next.players = rescore(&next.players, &next.faces, &next.cells);

    let turn_kept = retains_turn(new_faces.len(), new_cells.len());
    next.current_player = next_player(&next.players, &mover, turn_kept);
    next.winner = decide_winner(&next);
    next.turn += 1;
    next.last_move = Some(LastMove::new(edge.start(), edge.end(), mover.clone()));

    debug!(
        %edge,
        faces = new_faces.len(),
        cells = new_cells.len(),
        turn_kept,
        next = %next.current_player,
        "Move applied"
    );
    if let Some(winner) = &next.winner {
        info!(%winner, turn = next.turn, "Game finished");
    }

    Transition {
        state: next,
        edge,
        mover,
        new_faces,
        new_cells,
        turn_kept,
    }
}

/// Re-derives a state by applying `moves` in order from `initial`.
///
/// Deterministic: the same inputs always yield an identical state.
///
/// # Errors
///
/// Stops at the first illegal move.
#[instrument(skip_all, fields(moves = moves.len()))]
pub fn replay(initial: &GameState, moves: &[MoveRequest]) -> Result<GameState, MoveError> {
    moves.iter().try_fold(initial.clone(), |state, request| {
        apply_move(&state, *request).map(|t| t.state)
    })
}

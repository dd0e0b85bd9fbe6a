//! Move legality.

use super::super::action::MoveError;
use super::super::geometry::{Edge, Point, all_edges};
use super::super::types::GameState;
use tracing::{debug, instrument};

/// Checks whether drawing `start`-`end` is legal in `state`.
///
/// Returns the canonical edge on success. Checks run in a fixed order so the
/// reported reason is stable: game over, same point, bounds, adjacency,
/// duplicate.
#[instrument(skip(state), fields(turn = state.turn(), %start, %end))]
pub fn validate_move(state: &GameState, start: Point, end: Point) -> Result<Edge, MoveError> {
    let verdict = check(state, start, end);
    if let Err(reason) = &verdict {
        debug!(%reason, "Move declined");
    }
    verdict
}

fn check(state: &GameState, start: Point, end: Point) -> Result<Edge, MoveError> {
    if state.is_over() {
        return Err(MoveError::GameOver);
    }
    if start == end {
        return Err(MoveError::SamePoint(start));
    }
    for p in [start, end] {
        if !p.in_bounds(state.grid_size()) {
            return Err(MoveError::OutOfBounds(p));
        }
    }
    let edge = Edge::new(start, end).ok_or(MoveError::NotAdjacent(start, end))?;
    if state.has_line(edge) {
        return Err(MoveError::AlreadyDrawn(edge));
    }
    Ok(edge)
}

/// Every undrawn edge in canonical lattice order; empty once the game is over.
#[instrument(skip(state), fields(turn = state.turn()))]
pub fn legal_moves(state: &GameState) -> Vec<Edge> {
    if state.is_over() {
        return Vec::new();
    }
    let drawn = state.edge_set();
    all_edges(state.grid_size())
        .filter(|e| !drawn.contains(e))
        .collect()
}

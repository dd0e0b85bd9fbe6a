//! Simple automated player used by the command-line auto-play.
//!
//! Takes a free face when one exists, otherwise the first edge that does not
//! hand the opponent a face, otherwise the first legal edge.

use super::chain::ChainReaction;
use super::geometry::{Edge, Square};
use super::rules::completion::drawn_sides;
use super::rules::legal_moves;
use super::types::GameState;
use tracing::instrument;

/// Picks a move for the current player, or `None` when nothing is legal.
#[instrument(skip(state), fields(turn = state.turn(), player = %state.current_player()))]
pub fn pick_move(state: &GameState) -> Option<Edge> {
    if let Some(edge) = ChainReaction::best_free_move(state) {
        return Some(edge);
    }
    let drawn = state.edge_set();
    let legal = legal_moves(state);
    legal
        .iter()
        .copied()
        .find(|edge| {
            Square::touching(*edge, state.grid_size())
                .iter()
                .all(|sq| drawn_sides(&drawn, sq) < 2)
        })
        .or_else(|| legal.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cubes::engine::apply_edge;
    use crate::games::cubes::types::fixtures::fresh;

    #[test]
    fn test_plays_a_full_game() {
        let mut state = fresh(3);
        let mut moves = 0;
        while let Some(edge) = pick_move(&state) {
            state = apply_edge(&state, edge).state;
            moves += 1;
            assert!(moves <= 54);
        }
        assert!(state.is_over());
    }

    #[test]
    fn test_first_move_is_first_edge() {
        let state = fresh(3);
        let first = legal_moves(&state)[0];
        assert_eq!(pick_move(&state), Some(first));
    }
}

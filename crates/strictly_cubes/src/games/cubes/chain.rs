//! Chain reaction controller.
//!
//! After a move that keeps the turn, an automated player may have "free"
//! continuations: edges that complete a face on their own. When autoplay is
//! on, the controller plays the best of them repeatedly until none remain,
//! the game ends, or the turn reaches a human.

use super::engine::{Transition, apply_edge};
use super::geometry::Edge;
use super::rules::completion::faces_closed_by;
use super::rules::legal_moves;
use super::types::GameState;
use tracing::{debug, instrument, warn};

/// Drives automatic continuations for automated players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct ChainReaction {
    autoplay: bool,
}

/// Everything the controller applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainOutcome {
    /// Applied moves in order.
    pub steps: Vec<Transition>,
    /// The loop stopped at its iteration cap.
    pub capped: bool,
}

impl ChainOutcome {
    /// State after the last applied step.
    pub fn final_state(&self) -> Option<&GameState> {
        self.steps.last().map(|t| &t.state)
    }
}

impl ChainReaction {
    /// Whether the controller plays continuations itself.
    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Legal moves that would complete at least one face, in canonical order.
    #[instrument(skip(state), fields(turn = state.turn()))]
    pub fn free_moves(state: &GameState) -> Vec<Edge> {
        let drawn = state.edge_set();
        let mover = state.current_player();
        legal_moves(state)
            .into_iter()
            .filter(|e| !faces_closed_by(&drawn, state.grid_size(), *e, mover).is_empty())
            .collect()
    }

    /// The free move gaining the most faces plus cells; the earliest in
    /// canonical order on a tie.
    #[instrument(skip(state), fields(turn = state.turn()))]
    pub fn best_free_move(state: &GameState) -> Option<Edge> {
        let mut best: Option<(usize, Edge)> = None;
        for edge in Self::free_moves(state) {
            let t = apply_edge(state, edge);
            let gain = t.new_faces.len() + t.new_cells.len();
            if best.is_none_or(|(g, _)| gain > g) {
                best = Some((gain, edge));
            }
        }
        best.map(|(_, e)| e)
    }

    /// Whether `state` is in the middle of a chain an automated player owns.
    fn continues(state: &GameState) -> bool {
        let retained = state
            .last_move()
            .is_some_and(|m| &m.player == state.current_player());
        let automated = state.current().is_some_and(|p| p.is_ai);
        retained && automated && !state.is_over()
    }

    /// Plays free continuations from `state`.
    ///
    /// Runs only when autoplay is on and the last move kept the turn for an
    /// automated player. Bounded by the number of remaining edges.
    #[instrument(skip(self, state), fields(turn = state.turn(), autoplay = self.autoplay))]
    pub fn run(&self, state: &GameState) -> ChainOutcome {
        let mut outcome = ChainOutcome::default();
        if !self.autoplay {
            return outcome;
        }

        let cap = state.remaining_edges();
        let mut current = state.clone();
        let mut iterations = 0u64;
        while Self::continues(&current) {
            if iterations >= cap {
                warn!(cap, "Chain reaction hit its iteration cap");
                outcome.capped = true;
                break;
            }
            iterations += 1;

            let Some(edge) = Self::best_free_move(&current) else {
                break;
            };
            let transition = apply_edge(&current, edge);
            debug!(%edge, faces = transition.new_faces.len(), "Chain continuation");
            current = transition.state.clone();
            outcome.steps.push(transition);
        }
        outcome
    }
}

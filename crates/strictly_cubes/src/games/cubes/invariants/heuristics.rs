//! Warning-level heuristics: suspicious, but not proof of corruption.

use super::super::rules::is_finished;
use super::super::types::GameState;
use super::{Invariant, Severity};

/// Heuristic: one line is drawn per turn, so the parities agree.
pub struct TurnParity;

impl Invariant<GameState> for TurnParity {
    fn audit(state: &GameState) -> Vec<String> {
        let lines = state.lines().len() as u64;
        if state.turn() % 2 != lines % 2 {
            vec![format!(
                "turn {} and line count {lines} differ in parity",
                state.turn()
            )]
        } else {
            Vec::new()
        }
    }

    fn description() -> &'static str {
        "Turn counter consistent with line count"
    }

    fn severity() -> Severity {
        Severity::Warning
    }
}

/// Heuristic: a declared winner leads and the lattice is exhausted.
pub struct PlausibleWinner;

impl Invariant<GameState> for PlausibleWinner {
    fn audit(state: &GameState) -> Vec<String> {
        let Some(winner) = state.winner().and_then(|w| state.player(w)) else {
            return Vec::new();
        };
        let mut findings = Vec::new();
        if !is_finished(state) {
            findings.push(format!(
                "{} declared winner with {}/{} cells claimed and {} edges left",
                winner.id,
                state.claimed_cells(),
                state.total_cells(),
                state.remaining_edges()
            ));
        }
        if let Some(rival) = state.opponent_of(&winner.id)
            && rival.score > winner.score
        {
            findings.push(format!(
                "{} declared winner with {} cells against {}'s {}",
                winner.id, winner.score, rival.id, rival.score
            ));
        }
        findings
    }

    fn description() -> &'static str {
        "Declared winner is plausible"
    }

    fn severity() -> Severity {
        Severity::Warning
    }
}

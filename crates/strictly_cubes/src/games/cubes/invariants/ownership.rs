//! Ownership and scoring invariants.
//!
//! Scores are re-derived with the score engine and compared against the
//! stored counters, so a tampered counter is caught even when the face and
//! cell lists are intact.

use super::super::geometry::cell_count;
use super::super::rules::cells::{CLAIM_THRESHOLD, face_owners, faces_held};
use super::super::rules::tally;
use super::super::types::GameState;
use super::Invariant;

/// Invariant: a claimed cell's owner holds at least four of its faces.
///
/// Cells outside the lattice are left to [`super::CellCountExact`].
pub struct CellOwnersHoldMajority;

impl Invariant<GameState> for CellOwnersHoldMajority {
    fn audit(state: &GameState) -> Vec<String> {
        let owners = face_owners(state.faces());
        let n = state.grid_size();
        state
            .cells()
            .iter()
            .filter(|cell| cell.coord().in_bounds(n))
            .filter_map(|cell| {
                let owner = cell.owner.as_ref()?;
                let held = faces_held(&owners, cell.coord())
                    .get(owner)
                    .copied()
                    .unwrap_or(0);
                (held < CLAIM_THRESHOLD).then(|| {
                    format!(
                        "cell {} owned by {owner:?} who holds only {held} of its faces",
                        cell.origin
                    )
                })
            })
            .collect()
    }

    fn description() -> &'static str {
        "Cell owners hold at least 4 of 6 faces"
    }
}

/// Invariant: each player's score equals the cells they own.
pub struct ScoresMatchCells;

impl Invariant<GameState> for ScoresMatchCells {
    fn audit(state: &GameState) -> Vec<String> {
        state
            .players()
            .iter()
            .filter_map(|p| {
                let expected = tally(&p.id, state.faces(), state.cells()).score;
                (p.score != expected).then(|| {
                    format!("{} has score {} but owns {expected} cells", p.id, p.score)
                })
            })
            .collect()
    }

    fn description() -> &'static str {
        "Score equals owned cells"
    }
}

/// Invariant: each player's face count equals the distinct faces they own.
pub struct SquareCountsMatchFaces;

impl Invariant<GameState> for SquareCountsMatchFaces {
    fn audit(state: &GameState) -> Vec<String> {
        state
            .players()
            .iter()
            .filter_map(|p| {
                let expected = tally(&p.id, state.faces(), state.cells()).square_count;
                (p.square_count != expected).then(|| {
                    format!(
                        "{} has square count {} but owns {expected} faces",
                        p.id, p.square_count
                    )
                })
            })
            .collect()
    }

    fn description() -> &'static str {
        "Square count equals owned faces"
    }
}

/// Invariant: the scores cannot add up to more cells than exist.
pub struct ScoreSumBounded;

impl Invariant<GameState> for ScoreSumBounded {
    fn audit(state: &GameState) -> Vec<String> {
        let total: u64 = state.players().iter().map(|p| u64::from(p.score)).sum();
        let cells = cell_count(state.grid_size());
        if total > cells {
            vec![format!("scores sum to {total} but only {cells} cells exist")]
        } else {
            Vec::new()
        }
    }

    fn description() -> &'static str {
        "Score sum within total cells"
    }
}

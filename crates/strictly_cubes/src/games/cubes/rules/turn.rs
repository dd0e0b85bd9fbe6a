//! Turn keeping and the end of the game.

use super::super::types::{GameState, Player, PlayerId};
use std::cmp::Ordering;
use tracing::instrument;

/// Whether the mover keeps the turn: true iff the move completed at least
/// one face or claimed at least one cell.
pub fn retains_turn(new_faces: usize, new_cells: usize) -> bool {
    new_faces > 0 || new_cells > 0
}

/// Who moves next after `mover`.
#[instrument(skip(players))]
pub fn next_player(players: &[Player], mover: &PlayerId, retains: bool) -> PlayerId {
    if retains {
        return mover.clone();
    }
    players
        .iter()
        .find(|p| &p.id != mover)
        .map(|p| p.id.clone())
        .unwrap_or_else(|| mover.clone())
}

/// Whether the lattice is exhausted: every cell claimed, or every edge drawn.
///
/// A cell split 3/3 can never be claimed, so a full board also ends the
/// match.
pub fn is_finished(state: &GameState) -> bool {
    state.claimed_cells() >= state.total_cells() || state.remaining_edges() == 0
}

/// The winner of a finished match, `None` while play continues.
///
/// Higher score wins, then higher face count. A true tie goes to the first
/// seat.
#[instrument(skip(state), fields(turn = state.turn()))]
pub fn decide_winner(state: &GameState) -> Option<PlayerId> {
    if !is_finished(state) {
        return None;
    }
    leader(state.players()).map(|p| p.id.clone())
}

/// Seat ahead on (score, square_count); earlier seat on a tie.
pub fn leader(players: &[Player]) -> Option<&Player> {
    players.iter().reduce(|best, p| {
        match (p.score, p.square_count).cmp(&(best.score, best.square_count)) {
            Ordering::Greater => p,
            _ => best,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(id: &str, score: u32, squares: u32) -> Player {
        Player {
            score,
            square_count: squares,
            ..Player::new(id, id, "gray", false)
        }
    }

    #[test]
    fn test_turn_passes_without_completion() {
        let players = vec![seat("a", 0, 0), seat("b", 0, 0)];
        assert!(!retains_turn(0, 0));
        assert_eq!(next_player(&players, &"a".into(), false), "b");
        assert_eq!(next_player(&players, &"b".into(), false), "a");
    }

    #[test]
    fn test_turn_kept_on_completion() {
        let players = vec![seat("a", 0, 0), seat("b", 0, 0)];
        assert!(retains_turn(1, 0));
        assert!(retains_turn(0, 1));
        assert_eq!(next_player(&players, &"a".into(), true), "a");
    }

    #[test]
    fn test_leader_breaks_ties_on_faces_then_seat() {
        assert_eq!(leader(&[seat("a", 2, 5), seat("b", 3, 0)]).unwrap().id, "b");
        assert_eq!(leader(&[seat("a", 2, 5), seat("b", 2, 9)]).unwrap().id, "b");
        assert_eq!(leader(&[seat("a", 2, 5), seat("b", 2, 5)]).unwrap().id, "a");
    }
}

//! Seating invariants: two distinct players, a known current player.

use super::super::types::GameState;
use super::Invariant;
use std::collections::HashSet;

/// Invariant: exactly two players are seated.
pub struct PlayerCount;

impl Invariant<GameState> for PlayerCount {
    fn audit(state: &GameState) -> Vec<String> {
        match state.players().len() {
            2 => Vec::new(),
            n => vec![format!("expected 2 players, found {n}")],
        }
    }

    fn description() -> &'static str {
        "Exactly two players"
    }
}

/// Invariant: player ids are non-empty and distinct.
pub struct UniquePlayerIds;

impl Invariant<GameState> for UniquePlayerIds {
    fn audit(state: &GameState) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut findings = Vec::new();
        for player in state.players() {
            if player.id.is_empty() {
                findings.push(format!("player {:?} has an empty id", player.name));
            } else if !seen.insert(player.id.as_str()) {
                findings.push(format!("player id {:?} appears more than once", player.id));
            }
        }
        findings
    }

    fn description() -> &'static str {
        "Player ids are unique"
    }
}

/// Invariant: the current player is one of the seated players.
pub struct CurrentPlayerKnown;

impl Invariant<GameState> for CurrentPlayerKnown {
    fn audit(state: &GameState) -> Vec<String> {
        let current = state.current_player();
        if current.is_empty() {
            vec!["current player is missing".to_string()]
        } else if state.player(current).is_none() {
            vec![format!("current player {current:?} is not seated")]
        } else {
            Vec::new()
        }
    }

    fn description() -> &'static str {
        "Current player references a seated player"
    }
}

/// Invariant: a declared winner is one of the seated players.
pub struct WinnerKnown;

impl Invariant<GameState> for WinnerKnown {
    fn audit(state: &GameState) -> Vec<String> {
        match state.winner() {
            Some(w) if state.player(w).is_none() => {
                vec![format!("winner {w:?} is not seated")]
            }
            _ => Vec::new(),
        }
    }

    fn description() -> &'static str {
        "Winner references a seated player"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cubes::types::Player;
    use crate::games::cubes::types::fixtures::fresh;

    #[test]
    fn test_fresh_seats_hold() {
        let state = fresh(3);
        assert!(PlayerCount::holds(&state));
        assert!(UniquePlayerIds::holds(&state));
        assert!(CurrentPlayerKnown::holds(&state));
        assert!(WinnerKnown::holds(&state));
    }

    #[test]
    fn test_third_player_violates() {
        let mut state = fresh(3);
        state.players.push(Player::new("carol", "Carol", "green", false));
        assert!(!PlayerCount::holds(&state));
    }

    #[test]
    fn test_duplicate_ids_violate() {
        let mut state = fresh(3);
        state.players[1].id = "alice".into();
        assert_eq!(UniquePlayerIds::audit(&state).len(), 1);
    }

    #[test]
    fn test_unknown_current_player_violates() {
        let mut state = fresh(3);
        state.current_player = "mallory".into();
        assert!(!CurrentPlayerKnown::holds(&state));
        state.current_player = String::new();
        assert!(!CurrentPlayerKnown::holds(&state));
    }
}

//! Transition invariants: properties of a before/after pair.
//!
//! These apply to locally derived transitions. Authoritative snapshots from
//! the network replace local state without passing through here.

use super::super::types::GameState;
use super::{Invariant, InvariantSet, ValidationReport};
use crate::events::ChangeType;
use tracing::{instrument, warn};

/// A pair of consecutive states and what caused the change.
#[derive(Debug, Clone, Copy)]
pub struct StatePair<'a> {
    /// State before the change.
    pub before: &'a GameState,
    /// State after the change.
    pub after: &'a GameState,
    /// What caused it.
    pub cause: ChangeType,
}

/// Invariant: the turn counter never goes backward.
pub struct TurnMonotonic;

impl Invariant<StatePair<'_>> for TurnMonotonic {
    fn audit(pair: &StatePair<'_>) -> Vec<String> {
        let (b, a) = (pair.before.turn(), pair.after.turn());
        if a < b {
            vec![format!("{} moved turn backward from {b} to {a}", pair.cause)]
        } else {
            Vec::new()
        }
    }

    fn description() -> &'static str {
        "Turn is non-decreasing"
    }
}

/// Invariant: drawn lines are never removed.
pub struct LinesRetained;

impl Invariant<StatePair<'_>> for LinesRetained {
    fn audit(pair: &StatePair<'_>) -> Vec<String> {
        let after: std::collections::HashSet<_> =
            pair.after.lines().iter().map(|l| l.undirected_key()).collect();
        let removed = pair
            .before
            .lines()
            .iter()
            .filter(|l| !after.contains(&l.undirected_key()))
            .count();
        if removed > 0 {
            vec![format!("{} removed {removed} lines", pair.cause)]
        } else {
            Vec::new()
        }
    }

    fn description() -> &'static str {
        "Lines are never removed"
    }
}

/// Invariant: no player's score decreases.
pub struct ScoresMonotonic;

impl Invariant<StatePair<'_>> for ScoresMonotonic {
    fn audit(pair: &StatePair<'_>) -> Vec<String> {
        pair.before
            .players()
            .iter()
            .filter_map(|old| {
                let new = pair.after.player(&old.id)?;
                (new.score < old.score).then(|| {
                    format!(
                        "{} lowered {}'s score from {} to {}",
                        pair.cause, old.id, old.score, new.score
                    )
                })
            })
            .collect()
    }

    fn description() -> &'static str {
        "Scores never decrease"
    }
}

/// Invariant: a winner, once declared, never changes.
pub struct WinnerFixed;

impl Invariant<StatePair<'_>> for WinnerFixed {
    fn audit(pair: &StatePair<'_>) -> Vec<String> {
        match (pair.before.winner(), pair.after.winner()) {
            (Some(old), new) if new != Some(old) => {
                vec![format!("{} changed winner from {old:?} to {new:?}", pair.cause)]
            }
            _ => Vec::new(),
        }
    }

    fn description() -> &'static str {
        "Winner is immutable once set"
    }
}

/// All transition invariants.
pub type TransitionInvariants = (TurnMonotonic, LinesRetained, ScoresMonotonic, WinnerFixed);

/// Audits a locally derived transition.
#[instrument(skip(before, after), fields(before_turn = before.turn(), after_turn = after.turn()))]
pub fn validate_transition(
    before: &GameState,
    after: &GameState,
    cause: ChangeType,
) -> ValidationReport {
    let pair = StatePair {
        before,
        after,
        cause,
    };
    let mut report = ValidationReport::default();
    TransitionInvariants::check_all(&pair, &mut report);
    if !report.valid {
        warn!(%cause, summary = %report.error_summary(), "Transition failed audit");
    }
    report
}

//! Contract-based validation for the cube game.
//!
//! Contracts define correctness through preconditions and postconditions:
//! `{P} action {Q}`. The move contract wraps the transition engine so that
//! every audited move is checked before and after it is applied.

use super::action::{MoveError, MoveRequest};
use super::engine::{Transition, apply_move};
use super::invariants::{validate_state, validate_transition};
use super::rules::validate_move;
use super::types::GameState;
use crate::events::ChangeType;
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

/// Contract for drawing an edge.
///
/// Preconditions:
/// - the move passes the move validator
///
/// Postconditions:
/// - the resulting state satisfies every state invariant
/// - the before/after pair satisfies every transition invariant
pub struct MoveContract;

impl Contract<GameState, MoveRequest> for MoveContract {
    fn pre(state: &GameState, action: &MoveRequest) -> Result<(), MoveError> {
        validate_move(state, action.start, action.end).map(|_| ())
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), MoveError> {
        let mut report = validate_transition(before, after, ChangeType::Move);
        let state_report = validate_state(Some(after));
        report.valid &= state_report.valid;
        report.errors.extend(state_report.errors);

        if report.valid {
            Ok(())
        } else {
            Err(MoveError::InvariantViolation(format!(
                "Postcondition failed: {}",
                report.error_summary()
            )))
        }
    }
}

/// Applies a move under [`MoveContract`].
///
/// # Errors
///
/// Precondition failures surface as the validator's [`MoveError`];
/// postcondition failures as [`MoveError::InvariantViolation`]. In both
/// cases no state is produced.
#[instrument(skip(state), fields(turn = state.turn()))]
pub fn apply_audited(state: &GameState, request: MoveRequest) -> Result<Transition, MoveError> {
    MoveContract::pre(state, &request)?;
    let transition = apply_move(state, request)?;
    if let Err(e) = MoveContract::post(state, &transition.state) {
        warn!(error = %e, "Move broke an invariant");
        return Err(e);
    }
    Ok(transition)
}

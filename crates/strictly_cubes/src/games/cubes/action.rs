//! First-class move types for the cube game.
//!
//! A move request is the player's intent: draw the edge between two points.
//! It can be validated independently of execution, forwarded over the
//! network untouched, or replayed.

use super::geometry::{Edge, Point};
use super::types::PlayerId;
use serde::{Deserialize, Serialize};

/// Intent to draw the edge between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct MoveRequest {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
}

impl From<Edge> for MoveRequest {
    fn from(edge: Edge) -> Self {
        Self::new(edge.start(), edge.end())
    }
}

impl std::fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// Reason a move was declined.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The match already has a winner.
    #[display("Game is already over")]
    GameOver,

    /// Both endpoints are the same point.
    #[display("Start and end are the same point {}", _0)]
    SamePoint(Point),

    /// An endpoint lies outside the lattice.
    #[display("Point {} is outside the lattice", _0)]
    OutOfBounds(Point),

    /// The endpoints are not one unit apart along a single axis.
    #[display("Points {} and {} are not adjacent", _0, _1)]
    NotAdjacent(Point, Point),

    /// The edge has already been drawn.
    #[display("Edge {} is already drawn", _0)]
    AlreadyDrawn(Edge),

    /// The local seat tried to move out of turn.
    #[display("It is {}'s turn", _0)]
    NotYourTurn(PlayerId),

    /// The transition broke an invariant (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}

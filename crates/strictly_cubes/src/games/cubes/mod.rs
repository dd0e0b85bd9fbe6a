//! Three-dimensional dots and boxes.
//!
//! Players take turns drawing unit edges on an N×N×N lattice. Closing the
//! fourth side of a unit square earns the face; holding four of a cube's six
//! faces claims the cube. Completing anything keeps the turn.

pub mod action;
pub mod chain;
pub mod contracts;
pub mod engine;
pub mod geometry;
pub mod invariants;
pub mod rules;
pub mod simple_ai;
pub mod sync;
pub mod types;

pub use action::{MoveError, MoveRequest};
pub use chain::{ChainOutcome, ChainReaction};
pub use contracts::{Contract, MoveContract, apply_audited};
pub use engine::{Transition, apply_move, replay};
pub use geometry::{Axis, CellCoord, Edge, FaceKey, Orientation, Point, Square};
pub use invariants::{ValidationReport, validate_state, validate_transition};
pub use rules::{legal_moves, validate_move};
pub use sync::{RemoteMessage, SnapshotPayload, SyncError, SyncOutcome, Synchronizer};
pub use types::{Cell, Face, GameMode, GameState, LastMove, Line, Player, PlayerId, SetupError};

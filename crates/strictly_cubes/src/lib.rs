//! Strictly Cubes - authoritative engine for three-dimensional dots and boxes
//!
//! The engine owns the rules and the one current game state. Rendering,
//! input and transport sit outside it and talk to it through a [`Match`].
//!
//! # Architecture
//!
//! - **Rules**: pure functions for move legality, face and cube completion,
//!   scoring and turn order
//! - **Engine**: composes the rules into immutable state transitions
//! - **Invariants**: structured audits of states and transitions
//! - **Sync**: reconciliation with authoritative remote snapshots
//! - **Events**: per-match notification bus
//!
//! # Example
//!
//! ```no_run
//! use strictly_cubes::{EventKind, MatchConfig, Point};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut game = MatchConfig::default().build_match()?;
//! game.subscribe(EventKind::GameEnded, |event| println!("{event:?}"));
//! game.start();
//! game.request_move(Point::new(0, 0, 0), Point::new(1, 0, 0))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod events;
pub mod games;
pub mod session;

pub use config::{ConfigError, MatchConfig, SeatConfig};
pub use events::{ChangeType, ErrorKind, EventKind, GameEvent, NotificationBus, Subscription};
pub use session::{Match, MatchOptions, MoveOutcome};

pub use games::cubes::{
    Cell, ChainOutcome, ChainReaction, Edge, Face, GameMode, GameState, Line, MoveError,
    MoveRequest, Player, PlayerId, Point, RemoteMessage, SnapshotPayload, SyncError,
    SyncOutcome, Synchronizer, Transition, ValidationReport, apply_move, replay, validate_state,
    validate_transition,
};

//! Game rules for the cube game.
//!
//! Pure functions evaluating a state according to the rules. They are kept
//! apart from state storage so the transition engine, the chain reaction
//! controller and the auditors can compose them freely.

pub mod cells;
pub mod completion;
pub mod moves;
pub mod score;
pub mod turn;

pub use cells::claimed_cells;
pub use completion::completed_faces;
pub use moves::{legal_moves, validate_move};
pub use score::{Tally, rescore, tally};
pub use turn::{decide_winner, is_finished, next_player, retains_turn};

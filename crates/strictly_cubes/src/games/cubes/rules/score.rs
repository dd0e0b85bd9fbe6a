//! Score computation.
//!
//! Always a full recount from the face and cell lists, never an incremental
//! counter, so the same functions double as an audit of stored scores.

use super::super::geometry::FaceKey;
use super::super::types::{Cell, Face, Player};
use std::collections::HashSet;
use tracing::instrument;

/// Recomputed counters for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    /// Cells owned.
    pub score: u32,
    /// Distinct faces owned.
    pub square_count: u32,
}

/// Recounts what `player_id` owns.
#[instrument(skip(faces, cells))]
pub fn tally(player_id: &str, faces: &[Face], cells: &[Cell]) -> Tally {
    let score = cells
        .iter()
        .filter(|c| c.owner.as_deref() == Some(player_id))
        .count();
    let squares: HashSet<&FaceKey> = faces
        .iter()
        .filter(|f| f.owner == player_id)
        .map(|f| &f.corners)
        .collect();
    Tally {
        score: u32::try_from(score).unwrap_or(u32::MAX),
        square_count: u32::try_from(squares.len()).unwrap_or(u32::MAX),
    }
}

/// Players with `score` and `square_count` recounted.
#[instrument(skip_all)]
pub fn rescore(players: &[Player], faces: &[Face], cells: &[Cell]) -> Vec<Player> {
    players
        .iter()
        .map(|p| {
            let Tally {
                score,
                square_count,
            } = tally(&p.id, faces, cells);
            Player {
                score,
                square_count,
                ..p.clone()
            }
        })
        .collect()
}

//! Geometric invariants over lines, faces and cells.

use super::super::geometry::{MAX_GRID_SIZE, MIN_GRID_SIZE, cell_count, max_lines};
use super::super::types::GameState;
use super::Invariant;
use std::collections::HashSet;

/// Invariant: the lattice size is supported.
pub struct GridSizeInRange;

impl Invariant<GameState> for GridSizeInRange {
    fn audit(state: &GameState) -> Vec<String> {
        let n = state.grid_size();
        if (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&n) {
            Vec::new()
        } else {
            vec![format!(
                "grid size {n} is outside {MIN_GRID_SIZE}..={MAX_GRID_SIZE}"
            )]
        }
    }

    fn description() -> &'static str {
        "Grid size is valid"
    }
}

/// Invariant: every line is a unit segment along one axis, inside the
/// lattice.
pub struct LinesWellFormed;

impl Invariant<GameState> for LinesWellFormed {
    fn audit(state: &GameState) -> Vec<String> {
        let n = state.grid_size();
        state
            .lines()
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                if !line.start.in_bounds(n) || !line.end.in_bounds(n) {
                    Some(format!(
                        "line {i} {}-{} leaves the lattice",
                        line.start, line.end
                    ))
                } else if line.edge().is_none() {
                    Some(format!(
                        "line {i} {}-{} is not a unit edge",
                        line.start, line.end
                    ))
                } else {
                    None
                }
            })
            .collect()
    }

    fn description() -> &'static str {
        "Lines are unit edges inside the lattice"
    }
}

/// Invariant: no edge is drawn twice, in either endpoint order.
pub struct LinesUnique;

impl Invariant<GameState> for LinesUnique {
    fn audit(state: &GameState) -> Vec<String> {
        let mut seen = HashSet::new();
        state
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| !seen.insert(line.undirected_key()))
            .map(|(i, line)| format!("line {i} {}-{} is a duplicate", line.start, line.end))
            .collect()
    }

    fn description() -> &'static str {
        "No duplicate lines"
    }
}

/// Invariant: no more lines than the lattice has edges.
pub struct LineCountBounded;

impl Invariant<GameState> for LineCountBounded {
    fn audit(state: &GameState) -> Vec<String> {
        let max = max_lines(state.grid_size());
        let drawn = state.lines().len() as u64;
        if drawn > max {
            vec![format!("{drawn} lines exceed the maximum of {max}")]
        } else {
            Vec::new()
        }
    }

    fn description() -> &'static str {
        "Line count within 3·N²·(N−1)"
    }
}

/// Invariant: every face is an in-bounds unit square of its stated plane,
/// owned by a seated player, with all four edges drawn.
pub struct FacesWellFormed;

impl Invariant<GameState> for FacesWellFormed {
    fn audit(state: &GameState) -> Vec<String> {
        let n = state.grid_size();
        let drawn = state.edge_set();
        let mut findings = Vec::new();
        for (i, face) in state.faces().iter().enumerate() {
            let corner = face.corners.corners()[0];
            let Some(square) = face.square() else {
                findings.push(format!("face {i} at {corner} is not a unit square"));
                continue;
            };
            if square.orientation() != face.orientation {
                findings.push(format!(
                    "face {i} at {corner} lies in {} but is tagged {}",
                    square.orientation(),
                    face.orientation
                ));
            }
            if !square.in_bounds(n) {
                findings.push(format!("face {i} at {corner} leaves the lattice"));
                continue;
            }
            if state.player(&face.owner).is_none() {
                findings.push(format!(
                    "face {i} at {corner} is owned by unseated {:?}",
                    face.owner
                ));
            }
            let missing = square.edges().into_iter().filter(|e| !drawn.contains(e)).count();
            if missing > 0 {
                findings.push(format!(
                    "face {i} at {corner} has {missing} undrawn edges"
                ));
            }
        }
        findings
    }

    fn description() -> &'static str {
        "Faces are completed unit squares inside the lattice"
    }
}

/// Invariant: each face is recorded once.
pub struct FacesUnique;

impl Invariant<GameState> for FacesUnique {
    fn audit(state: &GameState) -> Vec<String> {
        let mut seen = HashSet::new();
        state
            .faces()
            .iter()
            .enumerate()
            .filter(|(_, face)| !seen.insert(face.corners))
            .map(|(i, face)| {
                format!(
                    "face {i} at {} is a duplicate",
                    face.corners.corners()[0]
                )
            })
            .collect()
    }

    fn description() -> &'static str {
        "No duplicate faces"
    }
}

/// Invariant: the full lattice of cells is allocated, each cell once.
pub struct CellCountExact;

impl Invariant<GameState> for CellCountExact {
    fn audit(state: &GameState) -> Vec<String> {
        let n = state.grid_size();
        let expected = cell_count(n);
        let actual = state.cells().len() as u64;
        let mut findings = Vec::new();
        if actual != expected {
            findings.push(format!("expected {expected} cells, found {actual}"));
        }
        let mut seen = HashSet::new();
        for cell in state.cells() {
            if !cell.coord().in_bounds(n) {
                findings.push(format!("cell {} lies outside the lattice", cell.origin));
            } else if !seen.insert(cell.origin) {
                findings.push(format!("cell {} appears more than once", cell.origin));
            }
        }
        findings
    }

    fn description() -> &'static str {
        "Cell count equals (N−1)³"
    }
}

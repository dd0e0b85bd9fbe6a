//! Face completion detection.

use super::super::geometry::{Edge, Square};
use super::super::types::{Face, GameState, PlayerId};
use std::collections::HashSet;
use tracing::{instrument, trace};

/// Faces completed by adding `edge` to `state`, each owned by `mover`.
///
/// `state` is the state *before* the edge is drawn. Only the (at most four)
/// squares bordering the edge are inspected. Results follow the canonical
/// order of [`Square::touching`].
#[instrument(skip(state, mover), fields(%edge, turn = state.turn()))]
pub fn completed_faces(state: &GameState, edge: Edge, mover: &PlayerId) -> Vec<Face> {
    faces_closed_by(&state.edge_set(), state.grid_size(), edge, mover)
}

/// Same as [`completed_faces`] against a prepared set of drawn edges.
pub(crate) fn faces_closed_by(
    drawn: &HashSet<Edge>,
    grid_size: u32,
    edge: Edge,
    mover: &PlayerId,
) -> Vec<Face> {
    Square::touching(edge, grid_size)
        .into_iter()
        .filter(|square| {
            square
                .edges()
                .iter()
                .all(|e| *e == edge || drawn.contains(e))
        })
        .inspect(|square| trace!(origin = %square.origin(), orientation = %square.orientation(), "Face closed"))
        .map(|square| Face::new(square, mover.clone()))
        .collect()
}

/// How many of `square`'s edges are drawn.
pub(crate) fn drawn_sides(drawn: &HashSet<Edge>, square: &Square) -> usize {
    square.edges().iter().filter(|e| drawn.contains(e)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cubes::geometry::{Orientation, Point};
    use crate::games::cubes::types::Line;
    use crate::games::cubes::types::fixtures::fresh;
    use std::sync::Arc;

    fn edge(a: (i32, i32, i32), b: (i32, i32, i32)) -> Edge {
        Edge::new(Point::new(a.0, a.1, a.2), Point::new(b.0, b.1, b.2)).unwrap()
    }

    fn with_lines(grid: u32, edges: &[(Edge, &str)]) -> GameState {
        let mut state = fresh(grid);
        state.lines = Arc::new(
            edges
                .iter()
                .map(|(e, who)| Line::new(*e, (*who).to_string()))
                .collect(),
        );
        state
    }

    #[test]
    fn test_fourth_side_completes_face_for_mover() {
        let state = with_lines(
            3,
            &[
                (edge((0, 0, 0), (1, 0, 0)), "alice"),
                (edge((1, 0, 0), (1, 1, 0)), "alice"),
                (edge((0, 1, 0), (1, 1, 0)), "alice"),
            ],
        );
        let faces = completed_faces(&state, edge((0, 0, 0), (0, 1, 0)), &"bob".to_string());
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].owner, "bob");
        assert_eq!(faces[0].orientation, Orientation::XY);
    }

    #[test]
    fn test_three_sides_complete_nothing() {
        let state = with_lines(
            3,
            &[
                (edge((0, 0, 0), (1, 0, 0)), "alice"),
                (edge((1, 0, 0), (1, 1, 0)), "bob"),
            ],
        );
        assert!(completed_faces(&state, edge((0, 1, 0), (1, 1, 0)), &"alice".into()).is_empty());
    }

    #[test]
    fn test_one_edge_can_close_two_planes() {
        // The shared edge (1,0,0)-(1,1,0) borders an XY square on each side.
        let state = with_lines(
            3,
            &[
                (edge((0, 0, 0), (1, 0, 0)), "alice"),
                (edge((0, 1, 0), (1, 1, 0)), "alice"),
                (edge((0, 0, 0), (0, 1, 0)), "alice"),
                (edge((1, 0, 0), (2, 0, 0)), "bob"),
                (edge((1, 1, 0), (2, 1, 0)), "bob"),
                (edge((2, 0, 0), (2, 1, 0)), "bob"),
            ],
        );
        let faces = completed_faces(&state, edge((1, 0, 0), (1, 1, 0)), &"alice".into());
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].corners.corners()[0], Point::new(0, 0, 0));
        assert_eq!(faces[1].corners.corners()[0], Point::new(1, 0, 0));
    }
}

//! Cell claim detection.

use super::super::geometry::{CellCoord, FaceKey};
use super::super::types::{Cell, Face, PlayerId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, instrument};

/// Majority of a cell's six faces needed to claim it.
pub const CLAIM_THRESHOLD: u32 = 4;

/// Cells newly claimed after `new_faces` were completed.
///
/// `faces` must already include `new_faces`. Only cells bordering a new face
/// are considered; a cell is claimed when one player owns at least
/// [`CLAIM_THRESHOLD`] of its faces and it has no owner yet. Results are in
/// canonical cell order.
#[instrument(skip_all, fields(new_faces = new_faces.len()))]
pub fn claimed_cells(
    grid_size: u32,
    cells: &[Cell],
    faces: &[Face],
    new_faces: &[Face],
) -> Vec<(CellCoord, PlayerId)> {
    if new_faces.is_empty() {
        return Vec::new();
    }

    let owners = face_owners(faces);
    let candidates: BTreeSet<CellCoord> = new_faces
        .iter()
        .filter_map(Face::square)
        .flat_map(|square| square.adjacent_cells(grid_size))
        .collect();

    let mut claims = Vec::new();
    for coord in candidates {
        let already_owned = cells
            .iter()
            .find(|c| c.origin == coord.origin())
            .is_none_or(|c| c.owner.is_some());
        if already_owned {
            continue;
        }
        if let Some(owner) = majority_owner(&owners, coord) {
            debug!(cell = %coord.origin(), %owner, "Cell claimed");
            claims.push((coord, owner.clone()));
        }
    }
    claims
}

/// Owner of each face key; the first completion wins if a key repeats.
pub(crate) fn face_owners(faces: &[Face]) -> HashMap<FaceKey, &PlayerId> {
    let mut owners = HashMap::with_capacity(faces.len());
    for face in faces {
        owners.entry(face.corners).or_insert(&face.owner);
    }
    owners
}

/// Faces of `coord` owned by each player.
pub(crate) fn faces_held<'a>(
    owners: &HashMap<FaceKey, &'a PlayerId>,
    coord: CellCoord,
) -> BTreeMap<&'a PlayerId, u32> {
    let mut held = BTreeMap::new();
    for square in coord.faces() {
        if let Some(owner) = owners.get(&square.key()) {
            *held.entry(*owner).or_insert(0) += 1;
        }
    }
    held
}

fn majority_owner<'a>(
    owners: &HashMap<FaceKey, &'a PlayerId>,
    coord: CellCoord,
) -> Option<&'a PlayerId> {
    faces_held(owners, coord)
        .into_iter()
        .find(|(_, count)| *count >= CLAIM_THRESHOLD)
        .map(|(owner, _)| owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cubes::geometry::Point;

    fn cell_faces(owners: [&str; 6]) -> Vec<Face> {
        let coord = CellCoord::new(Point::new(0, 0, 0));
        coord
            .faces()
            .into_iter()
            .zip(owners)
            .filter(|(_, o)| !o.is_empty())
            .map(|(sq, o)| Face::new(sq, o.to_string()))
            .collect()
    }

    fn lone_cell() -> Vec<Cell> {
        vec![Cell::unclaimed(CellCoord::new(Point::new(0, 0, 0)))]
    }

    #[test]
    fn test_four_faces_claim() {
        let faces = cell_faces(["a", "a", "b", "a", "a", ""]);
        let new = &faces[faces.len() - 1..];
        let claims = claimed_cells(2, &lone_cell(), &faces, new);
        assert_eq!(claims, vec![(CellCoord::new(Point::new(0, 0, 0)), "a".to_string())]);
    }

    #[test]
    fn test_three_three_split_never_claims() {
        let faces = cell_faces(["a", "b", "a", "b", "a", "b"]);
        assert!(claimed_cells(2, &lone_cell(), &faces, &faces).is_empty());
    }

    #[test]
    fn test_claimed_cell_is_not_reassigned() {
        let faces = cell_faces(["b", "b", "b", "b", "a", "a"]);
        let mut cells = lone_cell();
        cells[0].owner = Some("a".into());
        assert!(claimed_cells(2, &cells, &faces, &faces).is_empty());
    }

    #[test]
    fn test_no_new_faces_no_claims() {
        let faces = cell_faces(["a", "a", "a", "a", "", ""]);
        assert!(claimed_cells(2, &lone_cell(), &faces, &[]).is_empty());
    }
}

//! State and transition audits on states built through the public API.

use strictly_cubes::games::cubes::geometry::{FaceKey, Orientation, Point, Square};
use strictly_cubes::games::cubes::invariants::{
    InvariantSet, LatticeInvariants, SeatInvariants, Severity,
};
use strictly_cubes::{
    ChangeType, Face, GameState, Line, MatchConfig, MoveRequest, SnapshotPayload, ValidationReport,
    replay, validate_state, validate_transition,
};

fn p(x: i32, y: i32, z: i32) -> Point {
    Point::new(x, y, z)
}

fn fresh() -> GameState {
    MatchConfig::default().build_state().unwrap()
}

fn played() -> GameState {
    replay(
        &fresh(),
        &[
            MoveRequest::new(p(0, 0, 0), p(1, 0, 0)),
            MoveRequest::new(p(1, 0, 0), p(1, 1, 0)),
            MoveRequest::new(p(1, 1, 0), p(0, 1, 0)),
            MoveRequest::new(p(0, 1, 0), p(0, 0, 0)),
        ],
    )
    .unwrap()
}

fn tamper(state: &GameState, edit: impl FnOnce(&mut SnapshotPayload)) -> GameState {
    let mut payload = SnapshotPayload::from(state);
    edit(&mut payload);
    GameState::try_from(payload).unwrap()
}

fn mentions(report: &ValidationReport, needle: &str) -> bool {
    report
        .errors
        .iter()
        .any(|f| f.to_string().to_lowercase().contains(needle))
}

#[test]
fn test_played_state_is_clean() {
    let report = validate_state(Some(&played()));
    assert!(report.valid, "{report}");
    assert!(report.warnings.is_empty(), "{report}");
}

#[test]
fn test_unknown_current_player_rejected() {
    let state = tamper(&fresh(), |s| s.current_player = Some("mallory".into()));
    let report = validate_state(Some(&state));
    assert!(!report.valid);
    assert!(mentions(&report, "mallory"));
}

#[test]
fn test_single_player_rejected() {
    let state = tamper(&fresh(), |s| {
        if let Some(players) = s.players.as_mut() {
            players.truncate(1);
        }
    });
    let mut report = ValidationReport::default();
    SeatInvariants::check_all(&state, &mut report);
    assert!(!report.valid);
}

#[test]
fn test_grid_size_outside_range_rejected() {
    let state = tamper(&fresh(), |s| s.grid_size = Some(1));
    let mut report = ValidationReport::default();
    LatticeInvariants::check_all(&state, &mut report);
    assert!(!report.valid);
}

#[test]
fn test_duplicate_reversed_line_rejected() {
    let state = tamper(&played(), |s| {
        if let Some(lines) = s.lines.as_mut() {
            lines.push(Line {
                start: p(1, 0, 0),
                end: p(0, 0, 0),
                player: "player-2".into(),
            });
        }
        s.turn = Some(5);
    });
    let report = validate_state(Some(&state));
    assert!(!report.valid);
}

#[test]
fn test_out_of_bounds_line_rejected() {
    let state = tamper(&fresh(), |s| {
        s.lines = Some(vec![Line {
            start: p(2, 2, 2),
            end: p(3, 2, 2),
            player: "player-1".into(),
        }]);
        s.turn = Some(1);
    });
    assert!(!validate_state(Some(&state)).valid);
}

#[test]
fn test_inflated_score_rejected() {
    let state = tamper(&played(), |s| {
        if let Some(players) = s.players.as_mut() {
            players[0].score = Some(9);
        }
    });
    let report = validate_state(Some(&state));
    assert!(!report.valid);
    assert!(report.errors.len() >= 2, "{report}");
}

#[test]
fn test_cell_without_majority_rejected() {
    let state = tamper(&played(), |s| {
        if let Some(cells) = s.cells.as_mut() {
            cells[0].owner = Some("player-2".into());
        }
    });
    assert!(!validate_state(Some(&state)).valid);
}

#[test]
fn test_parity_mismatch_only_warns() {
    let state = tamper(&played(), |s| s.turn = Some(7));
    let report = validate_state(Some(&state));
    assert!(report.valid, "{report}");
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn test_premature_winner_warns() {
    let state = tamper(&played(), |s| s.winner = Some("player-2".into()));
    let report = validate_state(Some(&state));
    assert!(report.valid, "{report}");
    assert!(!report.warnings.is_empty());
}

#[test]
fn test_null_state_rejected() {
    let report = validate_state(None);
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn test_transition_backward_turn_rejected() {
    let report = validate_transition(&played(), &fresh(), ChangeType::Forced);
    assert!(!report.valid);
    assert!(mentions(&report, "forced"));
}

#[test]
fn test_transition_winner_change_rejected() {
    let before = tamper(&played(), |s| s.winner = Some("player-1".into()));
    let after = tamper(&played(), |s| s.winner = Some("player-2".into()));
    assert!(!validate_transition(&before, &after, ChangeType::Move).valid);
}

#[test]
fn test_forward_transition_accepted() {
    let report = validate_transition(&fresh(), &played(), ChangeType::Move);
    assert!(report.valid, "{report}");
    assert_eq!(Severity::Warning.to_string(), "warning");
}

#[test]
fn test_reordered_duplicate_face_rejected() {
    let mut json = serde_json::to_value(SnapshotPayload::from(&played())).unwrap();
    let mut face = json["faces"][0].clone();
    face["corners"] = serde_json::json!([
        {"x": 1, "y": 1, "z": 0},
        {"x": 0, "y": 0, "z": 0},
        {"x": 1, "y": 0, "z": 0},
        {"x": 0, "y": 1, "z": 0}
    ]);
    json["faces"].as_array_mut().unwrap().push(face);
    json["players"][1]["squareCount"] = serde_json::json!(2);

    let payload: SnapshotPayload = serde_json::from_value(json).unwrap();
    let state = GameState::try_from(payload).unwrap();
    assert_eq!(state.faces()[0].corners, state.faces()[1].corners);

    let report = validate_state(Some(&state));
    assert!(!report.valid);
    assert!(mentions(&report, "duplicate"), "{report}");
    assert!(mentions(&report, "square count 2"), "{report}");
}

#[test]
fn test_face_without_drawn_edges_rejected() {
    let state = tamper(&played(), |s| {
        if let Some(faces) = s.faces.as_mut() {
            faces.push(Face::new(
                Square::new(p(1, 1, 1), Orientation::YZ),
                "player-2".into(),
            ));
        }
    });
    let report = validate_state(Some(&state));
    assert!(!report.valid);
    assert!(mentions(&report, "undrawn"), "{report}");
}

#[test]
fn test_face_owned_by_stranger_rejected() {
    let state = tamper(&played(), |s| {
        if let Some(faces) = s.faces.as_mut() {
            faces[0].owner = "mallory".into();
        }
    });
    let report = validate_state(Some(&state));
    assert!(!report.valid);
    assert!(mentions(&report, "unseated"), "{report}");
}

#[test]
fn test_extreme_coordinates_reported_without_panic() {
    let state = tamper(&played(), |s| {
        if let Some(cells) = s.cells.as_mut() {
            cells[0].origin = p(i32::MAX, 0, 0);
            cells[0].owner = Some("player-1".into());
        }
        if let Some(faces) = s.faces.as_mut() {
            faces.push(Face::new(
                Square::new(p(i32::MAX - 1, 0, 0), Orientation::XY),
                "player-1".into(),
            ));
            faces.push(Face {
                corners: FaceKey::from_corners([
                    p(i32::MIN, 0, 0),
                    p(i32::MAX, 0, 0),
                    p(i32::MIN, 1, 0),
                    p(i32::MAX, 1, 0),
                ]),
                orientation: Orientation::XY,
                owner: "player-1".into(),
            });
        }
    });
    let report = validate_state(Some(&state));
    assert!(!report.valid);
    assert!(mentions(&report, "outside the lattice"), "{report}");
    assert!(mentions(&report, "leaves the lattice"), "{report}");
    assert!(mentions(&report, "not a unit square"), "{report}");
}

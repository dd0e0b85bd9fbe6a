//! Lattice geometry: points, edges, unit squares and unit cells.
//!
//! Everything here is plain data plus the adjacency arithmetic the rules
//! need. Iteration orders are canonical (x-major, then y, then z; axes in
//! `X, Y, Z` order; orientations in `XY, XZ, YZ` order) so that every
//! replica enumerates the lattice identically.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest lattice edge length accepted by the engine.
pub const MAX_GRID_SIZE: u32 = 16;

/// Smallest lattice edge length that still contains a cell.
pub const MIN_GRID_SIZE: u32 = 2;

/// One of the three lattice axes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// A lattice point.
///
/// Coordinates are signed so that malformed remote data (negative
/// coordinates) stays representable long enough to be rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Point {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate along `axis`.
    pub fn coord(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Returns the point moved by `delta` along `axis`.
    ///
    /// Saturates at the coordinate limits, so a point far outside the
    /// lattice stays outside it.
    pub fn step(self, axis: Axis, delta: i32) -> Self {
        let mut p = self;
        match axis {
            Axis::X => p.x = p.x.saturating_add(delta),
            Axis::Y => p.y = p.y.saturating_add(delta),
            Axis::Z => p.z = p.z.saturating_add(delta),
        }
        p
    }

    /// Whether every coordinate lies in `[0, grid_size)`.
    pub fn in_bounds(self, grid_size: u32) -> bool {
        let n = i64::from(grid_size);
        [self.x, self.y, self.z]
            .iter()
            .all(|&c| c >= 0 && i64::from(c) < n)
    }

    /// The single axis along which `other` is one unit away, if any.
    pub fn adjacent_axis(self, other: Point) -> Option<Axis> {
        let mut found = None;
        for axis in Axis::ALL {
            let d = i64::from(other.coord(axis)) - i64::from(self.coord(axis));
            match d {
                0 => {}
                1 | -1 if found.is_none() => found = Some(axis),
                _ => return None,
            }
        }
        found
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A unit segment between two adjacent points.
///
/// Edges are undirected: the constructor orders the endpoints, so
/// `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Edge {
    start: Point,
    end: Point,
}

impl Edge {
    /// Creates the canonical edge between two points, or `None` if they are
    /// not adjacent.
    pub fn new(a: Point, b: Point) -> Option<Self> {
        a.adjacent_axis(b)?;
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Some(Self { start, end })
    }

    /// Lower endpoint.
    pub fn start(&self) -> Point {
        self.start
    }

    /// Upper endpoint.
    pub fn end(&self) -> Point {
        self.end
    }

    /// Axis the edge runs along.
    pub fn axis(&self) -> Axis {
        match (self.end.x - self.start.x, self.end.y - self.start.y) {
            (1, _) => Axis::X,
            (_, 1) => Axis::Y,
            _ => Axis::Z,
        }
    }

    /// Whether both endpoints lie inside the lattice.
    pub fn in_bounds(&self, grid_size: u32) -> bool {
        self.start.in_bounds(grid_size) && self.end.in_bounds(grid_size)
    }

    fn along(origin: Point, axis: Axis) -> Self {
        Self {
            start: origin,
            end: origin.step(axis, 1),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Plane of a unit square, named by the two axes it spans.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
pub enum Orientation {
    /// Spans x and y; normal along z.
    XY,
    /// Spans x and z; normal along y.
    XZ,
    /// Spans y and z; normal along x.
    YZ,
}

impl Orientation {
    /// All orientations in canonical order.
    pub const ALL: [Orientation; 3] = [Orientation::XY, Orientation::XZ, Orientation::YZ];

    /// The two spanning axes, lower axis first.
    pub fn axes(self) -> (Axis, Axis) {
        match self {
            Orientation::XY => (Axis::X, Axis::Y),
            Orientation::XZ => (Axis::X, Axis::Z),
            Orientation::YZ => (Axis::Y, Axis::Z),
        }
    }

    /// The axis perpendicular to the plane.
    pub fn normal(self) -> Axis {
        match self {
            Orientation::XY => Axis::Z,
            Orientation::XZ => Axis::Y,
            Orientation::YZ => Axis::X,
        }
    }

    /// Whether the plane contains lines along `axis`.
    pub fn contains(self, axis: Axis) -> bool {
        self.normal() != axis
    }

    /// The orientation spanned by two distinct axes.
    pub fn spanned_by(a: Axis, b: Axis) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|o| o.axes() == (a.min(b), a.max(b)) && a != b)
    }
}

/// Orientation-independent identity of a face: its four corners, sorted.
///
/// Deserialization sorts the corners, so keys read from the wire compare
/// equal regardless of the order they were listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[Point; 4]")]
pub struct FaceKey([Point; 4]);

impl From<[Point; 4]> for FaceKey {
    fn from(corners: [Point; 4]) -> Self {
        Self::from_corners(corners)
    }
}

impl FaceKey {
    /// Builds a key from corners in any order.
    pub fn from_corners(mut corners: [Point; 4]) -> Self {
        corners.sort();
        Self(corners)
    }

    /// The sorted corners.
    pub fn corners(&self) -> &[Point; 4] {
        &self.0
    }
}

/// A unit square addressed by its minimum corner and its plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    origin: Point,
    orientation: Orientation,
}

impl Square {
    /// Creates a square.
    pub fn new(origin: Point, orientation: Orientation) -> Self {
        Self {
            origin,
            orientation,
        }
    }

    /// Recovers the square described by a sorted corner set, if the corners
    /// really form an axis-aligned unit square.
    pub fn from_key(key: &FaceKey) -> Option<Self> {
        let [origin, _, _, far] = *key.corners();
        let spanned: Vec<Axis> = Axis::ALL
            .into_iter()
            .filter(|&a| i64::from(far.coord(a)) - i64::from(origin.coord(a)) == 1)
            .collect();
        let orientation = match spanned.as_slice() {
            [a, b] => Orientation::spanned_by(*a, *b)?,
            _ => return None,
        };
        let square = Self::new(origin, orientation);
        (square.key() == *key).then_some(square)
    }

    /// Minimum corner.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Plane of the square.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Canonical key.
    pub fn key(&self) -> FaceKey {
        let (a, b) = self.orientation.axes();
        let o = self.origin;
        FaceKey::from_corners([o, o.step(a, 1), o.step(b, 1), o.step(a, 1).step(b, 1)])
    }

    /// The four bordering edges.
    pub fn edges(&self) -> [Edge; 4] {
        let (a, b) = self.orientation.axes();
        let o = self.origin;
        [
            Edge::along(o, a),
            Edge::along(o, b),
            Edge::along(o.step(a, 1), b),
            Edge::along(o.step(b, 1), a),
        ]
    }

    /// Whether all four corners lie inside the lattice.
    pub fn in_bounds(&self, grid_size: u32) -> bool {
        let (a, b) = self.orientation.axes();
        self.origin.in_bounds(grid_size) && self.origin.step(a, 1).step(b, 1).in_bounds(grid_size)
    }

    /// The in-bounds squares bordered by `edge`, in canonical order.
    ///
    /// Only the two planes containing the edge's axis qualify, and each
    /// contributes the square on the negative side of the edge and the one
    /// on the positive side.
    pub fn touching(edge: Edge, grid_size: u32) -> Vec<Square> {
        let axis = edge.axis();
        let mut squares = Vec::with_capacity(4);
        for orientation in Orientation::ALL {
            if !orientation.contains(axis) {
                continue;
            }
            let (a, b) = orientation.axes();
            let other = if a == axis { b } else { a };
            for delta in [-1, 0] {
                let square = Square::new(edge.start().step(other, delta), orientation);
                if square.in_bounds(grid_size) {
                    squares.push(square);
                }
            }
        }
        squares
    }

    /// Cells on either side of the square that lie inside the lattice.
    pub fn adjacent_cells(&self, grid_size: u32) -> Vec<CellCoord> {
        let normal = self.orientation.normal();
        [self.origin.step(normal, -1), self.origin]
            .into_iter()
            .map(CellCoord::new)
            .filter(|c| c.in_bounds(grid_size))
            .collect()
    }
}

/// A unit cell addressed by its minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord(Point);

impl CellCoord {
    /// Creates a cell coordinate.
    pub fn new(origin: Point) -> Self {
        Self(origin)
    }

    /// Minimum corner.
    pub fn origin(&self) -> Point {
        self.0
    }

    /// Whether the whole cell lies inside the lattice.
    pub fn in_bounds(&self, grid_size: u32) -> bool {
        grid_size >= MIN_GRID_SIZE && self.0.in_bounds(grid_size - 1)
    }

    /// The six bordering squares: for each orientation, the near face then
    /// the far face.
    pub fn faces(&self) -> [Square; 6] {
        let o = self.0;
        let mut faces = [Square::new(o, Orientation::XY); 6];
        for (i, orientation) in Orientation::ALL.into_iter().enumerate() {
            faces[2 * i] = Square::new(o, orientation);
            faces[2 * i + 1] = Square::new(o.step(orientation.normal(), 1), orientation);
        }
        faces
    }
}

/// Number of cells in a lattice of edge length `grid_size`.
pub fn cell_count(grid_size: u32) -> u64 {
    let k = u64::from(grid_size.saturating_sub(1));
    k.saturating_mul(k).saturating_mul(k)
}

/// Number of drawable edges in a lattice of edge length `grid_size`.
///
/// Each axis carries `n²` rows of `n − 1` unit segments, hence `3·n²·(n−1)`:
/// 12 for `n = 2`, 54 for `n = 3`.
pub fn max_lines(grid_size: u32) -> u64 {
    let n = u64::from(grid_size);
    let k = u64::from(grid_size.saturating_sub(1));
    3u64.saturating_mul(n).saturating_mul(n).saturating_mul(k)
}

fn lattice_points(extent: u32) -> impl Iterator<Item = Point> {
    let n = extent as i32;
    (0..n).flat_map(move |x| (0..n).flat_map(move |y| (0..n).map(move |z| Point::new(x, y, z))))
}

/// Every drawable edge, in canonical order.
pub fn all_edges(grid_size: u32) -> impl Iterator<Item = Edge> {
    lattice_points(grid_size).flat_map(move |p| {
        Axis::ALL
            .into_iter()
            .map(move |axis| Edge::along(p, axis))
            .filter(move |e| e.end().in_bounds(grid_size))
    })
}

/// Every cell, in canonical order.
pub fn all_cells(grid_size: u32) -> impl Iterator<Item = CellCoord> {
    lattice_points(grid_size.saturating_sub(1)).map(CellCoord::new)
}

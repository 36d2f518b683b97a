//! Tile-local geometry.
//!
//! PVT features carry no geometry type tag. The kind is inferred from the
//! first ring: a single point is a Point, a closed ring is a Polygon, and
//! anything else is a LineString. Later rings never change the kind, so a
//! feature mixing a closed first ring with open later rings is still a
//! Polygon.

pub mod winding;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MalformedTile, TileError};
use crate::format::FeatureRef;

/// Minimum number of points in a closed ring that encloses an area
/// (three distinct corners plus the repeated first point).
pub const MIN_POLYGON_RING_POINTS: usize = 4;

// =============================================================================
// Point
// =============================================================================

/// A point in tile-local integer coordinates.
///
/// The origin is the tile's north-west corner; y grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// GeometryKind
// =============================================================================

/// Geometry type of a feature, as inferred from its first ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    /// Numeric geometry type used by the MVT contract (1, 2, 3).
    pub const fn mvt_type(self) -> u8 {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::LineString => 2,
            GeometryKind::Polygon => 3,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
        };
        f.write_str(name)
    }
}

/// Classify a single ring by point count and closure.
pub fn classify_ring(ring: &[Point]) -> GeometryKind {
    if ring.len() < 2 {
        GeometryKind::Point
    } else if ring.len() >= MIN_POLYGON_RING_POINTS && ring.first() == ring.last() {
        GeometryKind::Polygon
    } else {
        GeometryKind::LineString
    }
}

/// Infer a feature's geometry kind from its first ring.
///
/// Features without rings cannot be classified and are rejected.
pub fn classify(rings: &[Vec<Point>]) -> Result<GeometryKind, TileError> {
    rings
        .first()
        .map(|ring| classify_ring(ring))
        .ok_or_else(|| TileError::UnsupportedGeometry {
            reason: "feature has no geometry rings".to_string(),
        })
}

// =============================================================================
// Materialization
// =============================================================================

/// Copy every ring of a feature out of the buffer into owned point lists.
pub fn materialize(feature: &FeatureRef<'_>) -> Result<Vec<Vec<Point>>, MalformedTile> {
    let ring_count = feature.ring_count();
    let mut rings = Vec::with_capacity(ring_count);
    for i in 0..ring_count {
        let ring = feature.ring(i)?;
        let mut points = Vec::with_capacity(ring.len());
        for j in 0..ring.len() {
            points.push(Point::from(ring.point(j)?));
        }
        rings.push(points);
    }
    Ok(rings)
}

/// Bounding box `[min_x, min_y, max_x, max_y]` over all rings.
///
/// Returns `None` when there are no points at all.
pub fn bbox(rings: &[Vec<Point>]) -> Option<[i32; 4]> {
    let mut points = rings.iter().flatten();
    let first = points.next()?;
    let init = [first.x, first.y, first.x, first.y];
    Some(points.fold(init, |[min_x, min_y, max_x, max_y], p| {
        [min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y)]
    }))
}

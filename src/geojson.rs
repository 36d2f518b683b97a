//! GeoJSON output for decoded features.
//!
//! Geometry is always emitted as a multi-geometry, one member per ring
//! (points and lines) or per shell (polygons):
//!
//! - Point features become `MultiPoint`, taking the first point of each ring
//! - LineString features become `MultiLineString`
//! - Polygon features become `MultiPolygon`, with rings grouped into shells
//!   and holes by [`group_rings`]

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::format::Value;
use crate::geometry::winding::{group_rings, Position};
use crate::geometry::{GeometryKind, Point};
use crate::projection::{project_point, project_ring, TileCoord};

/// Feature properties keyed by property name, in the order the tile
/// stores them.
pub type Properties = IndexMap<String, Value>;

// =============================================================================
// GeoJSON Types
// =============================================================================

/// A GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    MultiPoint { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    /// Number of top-level members (points, lines, or polygons).
    pub fn len(&self) -> usize {
        match self {
            Geometry::MultiPoint { coordinates } => coordinates.len(),
            Geometry::MultiLineString { coordinates } => coordinates.len(),
            Geometry::MultiPolygon { coordinates } => coordinates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A GeoJSON `Feature` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct GeoJsonFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl GeoJsonFeature {
    /// Serialize to a compact GeoJSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A GeoJSON `FeatureCollection` object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<GeoJsonFeature>,
}

impl FeatureCollection {
    /// Serialize to a compact GeoJSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to an indented GeoJSON string.
    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Project tile-local rings and assemble the geometry for `kind`.
pub fn project_geometry(
    kind: GeometryKind,
    rings: &[Vec<Point>],
    coord: TileCoord,
    extent: u32,
) -> Geometry {
    match kind {
        GeometryKind::Point => Geometry::MultiPoint {
            coordinates: rings
                .iter()
                .filter_map(|ring| ring.first())
                .map(|&point| project_point(coord, extent, point))
                .collect(),
        },
        GeometryKind::LineString => Geometry::MultiLineString {
            coordinates: rings
                .iter()
                .map(|ring| project_ring(coord, extent, ring))
                .collect(),
        },
        GeometryKind::Polygon => {
            let projected = rings
                .iter()
                .map(|ring| project_ring(coord, extent, ring))
                .collect();
            Geometry::MultiPolygon {
                coordinates: group_rings(projected),
            }
        }
    }
}

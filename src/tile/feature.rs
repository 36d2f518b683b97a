//! Decoded features.

use tracing::trace;

use crate::error::{MalformedTile, TileError};
use crate::format::{resolve, FeatureRef, TileReader, Value};
use crate::geojson::{project_geometry, GeoJsonFeature, Properties};
use crate::geometry::{self, GeometryKind, Point};
use crate::projection::TileCoord;

/// A fully decoded feature.
///
/// Properties and geometry are read out of the buffer eagerly when the
/// feature is first accessed; everything after that is a plain field read.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: Option<u64>,
    kind: GeometryKind,
    properties: Properties,
    geometries: Vec<Vec<Point>>,
    extent: u32,
}

impl Feature {
    pub(crate) fn decode(
        reader: &TileReader,
        feature: &FeatureRef<'_>,
        extent: u32,
        id_fallback: bool,
    ) -> Result<Self, TileError> {
        let geometries = geometry::materialize(feature)?;
        let kind = geometry::classify(&geometries)?;
        let properties = decode_properties(reader, feature)?;
        let id = resolve_id(feature.id(), feature.secondary_id(), id_fallback);

        trace!(
            ?id,
            %kind,
            rings = geometries.len(),
            properties = properties.len(),
            "Decoded feature"
        );

        Ok(Self {
            id,
            kind,
            properties,
            geometries,
            extent,
        })
    }

    /// Feature id, if the tile carries one.
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Geometry kind inferred from the first ring.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// MVT numeric geometry type (1 = Point, 2 = LineString, 3 = Polygon).
    pub fn mvt_type(&self) -> u8 {
        self.kind.mvt_type()
    }

    pub fn extent(&self) -> u32 {
        self.extent
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// All rings in tile-local coordinates.
    pub fn load_geometry(&self) -> &[Vec<Point>] {
        &self.geometries
    }

    pub fn ring_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn ring(&self, index: usize) -> Result<&[Point], TileError> {
        self.geometries
            .get(index)
            .map(Vec::as_slice)
            .ok_or(TileError::IndexOutOfRange {
                kind: "ring",
                index,
                len: self.geometries.len(),
            })
    }

    /// Bounding box `[min_x, min_y, max_x, max_y]` in tile-local units.
    pub fn bbox(&self) -> Option<[i32; 4]> {
        geometry::bbox(&self.geometries)
    }

    /// Project this feature to WGS84 as if it belonged to tile `coord`.
    pub fn to_geojson(&self, coord: TileCoord) -> GeoJsonFeature {
        GeoJsonFeature {
            id: self.id,
            geometry: project_geometry(self.kind, &self.geometries, coord, self.extent),
            properties: self.properties.clone(),
        }
    }
}

/// Zip the feature's key and value index arrays against the tile tables.
///
/// Properties keep the tile's key order. A repeated key keeps its first
/// position and its last value.
fn decode_properties(
    reader: &TileReader,
    feature: &FeatureRef<'_>,
) -> Result<Properties, TileError> {
    let keys = feature.key_count();
    let values = feature.value_count();
    if keys != values {
        return Err(MalformedTile::PropertyArity { keys, values }.into());
    }

    let mut properties = Properties::with_capacity(keys);
    for i in 0..keys {
        let key = reader.string(feature.key(i)? as usize)?;
        let value = resolve(reader, feature.value(i)? as usize)?;
        properties.insert(key.to_string(), value);
    }
    Ok(properties)
}

/// Pick the feature id from the primary field, falling back to the
/// secondary field when the primary is zero.
///
/// A primary id of exactly 0 cannot be told apart from an absent one.
pub(crate) fn resolve_id(id: u64, secondary: u64, fallback: bool) -> Option<u64> {
    if id != 0 {
        Some(id)
    } else if fallback && secondary != 0 {
        Some(secondary)
    } else {
        None
    }
}

//! Tile coordinates and inverse spherical Mercator projection.
//!
//! A tile `z/x/y` covers `1 / 2^z` of the world along each axis, with `x`
//! growing east and `y` growing south from the north-west corner. Tile-local
//! coordinates run from 0 to `extent` across the tile.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TileCoordError;
use crate::geometry::winding::Position;
use crate::geometry::Point;

/// Deepest zoom level a tile coordinate may address.
pub const MAX_ZOOM: u8 = 32;

// =============================================================================
// TileCoord
// =============================================================================

/// Address of a tile in the `z/x/y` scheme.
///
/// Always lies on its zoom's grid: `z <= MAX_ZOOM` and `x, y < 2^z`.
/// Deserialization goes through the same check as [`TileCoord::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTileCoord")]
pub struct TileCoord {
    z: u8,
    x: u32,
    y: u32,
}

/// Unchecked wire shape of a [`TileCoord`].
#[derive(Deserialize)]
struct RawTileCoord {
    z: u8,
    x: u32,
    y: u32,
}

impl TryFrom<RawTileCoord> for TileCoord {
    type Error = TileCoordError;

    fn try_from(raw: RawTileCoord) -> Result<Self, Self::Error> {
        TileCoord::new(raw.z, raw.x, raw.y)
    }
}

impl TileCoord {
    /// Create a tile coordinate, checking that it lies on the zoom's grid.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self, TileCoordError> {
        if z > MAX_ZOOM {
            return Err(TileCoordError::ZoomTooLarge { z, max: MAX_ZOOM });
        }
        let size = grid_size(z);
        if x as u64 >= size || y as u64 >= size {
            return Err(TileCoordError::OutOfRange { z, x, y, size });
        }
        Ok(Self { z, x, y })
    }

    pub fn z(&self) -> u8 {
        self.z
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    /// Number of tiles along each axis at this zoom.
    pub fn grid_size(&self) -> u64 {
        grid_size(self.z)
    }

    /// Geographic bounds `[west, south, east, north]` in degrees.
    pub fn bounds(&self, extent: u32) -> [f64; 4] {
        let extent_i = extent.min(i32::MAX as u32) as i32;
        let [west, north] = project_point(*self, extent, Point::new(0, 0));
        let [east, south] = project_point(*self, extent, Point::new(extent_i, extent_i));
        [west, south, east, north]
    }
}

/// Tiles per axis at zoom `z`; `z` is at most `MAX_ZOOM`.
fn grid_size(z: u8) -> u64 {
    1u64.checked_shl(u32::from(z)).unwrap_or(u64::MAX)
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

impl FromStr for TileCoord {
    type Err = TileCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TileCoordError::InvalidFormat(s.to_string());
        let mut parts = s.trim().split('/');
        let z = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let x = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let y = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        TileCoord::new(z, x, y)
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Project a tile-local point to `[longitude, latitude]` in degrees.
///
/// ```text
/// granularity = extent * 2^z
/// merc_y = 180 - (extent * y + py) * 360 / granularity
/// lon    = (extent * x + px) * 360 / granularity - 180
/// lat    = 360 / π * atan(exp(merc_y * π / 180)) - 90
/// ```
///
/// Points outside the tile (negative or beyond `extent`) project outside
/// the tile's bounds; nothing is clamped.
pub fn project_point(coord: TileCoord, extent: u32, point: Point) -> Position {
    let extent = extent as f64;
    let granularity = extent * 2f64.powi(coord.z as i32);
    let tile_west = extent * coord.x as f64;
    let tile_north = extent * coord.y as f64;

    let merc_y = 180.0 - (tile_north + point.y as f64) * 360.0 / granularity;
    let lon = (tile_west + point.x as f64) * 360.0 / granularity - 180.0;
    let lat = (360.0 / PI) * (merc_y * PI / 180.0).exp().atan() - 90.0;
    [lon, lat]
}

/// Project every point of a ring.
pub fn project_ring(coord: TileCoord, extent: u32, ring: &[Point]) -> Vec<Position> {
    ring.iter()
        .map(|&point| project_point(coord, extent, point))
        .collect()
}

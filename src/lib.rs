//! # PVT Decode
//!
//! Decoder for Planet Vector Tiles (PVT), a compact FlatBuffers tile format,
//! exposing the Mapbox Vector Tile consumer contract and WGS84 GeoJSON
//! projection.
//!
//! The decoder receives one immutable byte buffer per tile and returns
//! decoded layers and features. It performs no I/O of its own.
//!
//! ## Architecture
//!
//! Data flows one way through the modules:
//!
//! - [`mod@format`] - PVT schema bindings, verified reads, and value resolution
//! - [`geometry`] - Ring materialization, geometry kind inference, winding order
//! - [`tile`] - The `layers` / `feature(i)` facade with memoized decoding
//! - [`projection`] and [`geojson`] - Tile coordinates to WGS84 GeoJSON
//! - [`config`] - Decode options and the `pvt-inspect` command line
//!
//! ## Example
//!
//! ```rust,no_run
//! use pvt_decode::{TileCoord, VectorTile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("tile.pvt")?;
//! let tile = VectorTile::new(bytes)?;
//!
//! if let Some(nodes) = tile.layer("nodes")? {
//!     let feature = nodes.feature(0)?;
//!     println!("{:?} {:?}", feature.kind(), feature.properties());
//!
//!     let geojson = feature.to_geojson(TileCoord::new(14, 8185, 5449)?);
//!     println!("{}", geojson.to_json_string()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod geojson;
pub mod geometry;
pub mod projection;
pub mod tile;

// Re-export commonly used types
pub use config::{DecodeOptions, InspectConfig};
pub use error::{MalformedTile, TileCoordError, TileError};
pub use format::{FeatureRef, LayerRef, RawValue, RingRef, TileReader, Value, ValueTag};
pub use geojson::{FeatureCollection, GeoJsonFeature, Geometry, Properties};
pub use geometry::winding::{group_rings, signed_area, Position, RingRole};
pub use geometry::{classify, classify_ring, materialize, GeometryKind, Point};
pub use projection::{project_point, TileCoord};
pub use tile::{Feature, Layer, Layers, VectorTile, DEFAULT_EXTENT};

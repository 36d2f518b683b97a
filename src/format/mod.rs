//! Binary layer for Planet Vector Tiles.
//!
//! PVT tiles are FlatBuffers with a shared string table, a shared typed value
//! table, and a list of layers:
//!
//! - [`schema`] binds the PVT tables and structs to the `flatbuffers` runtime
//! - [`reader`] verifies a buffer once and exposes index-checked accessors
//! - [`values`] turns value table entries into [`Value`]s

pub mod reader;
pub mod schema;
pub mod values;

pub use reader::{FeatureRef, LayerRef, RawValue, RingRef, TileReader};
pub use values::{resolve, Value, ValueTag};

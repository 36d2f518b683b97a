//! Configuration for the decoder and the `pvt-inspect` tool.
//!
//! The library is configured through [`DecodeOptions`]. The inspection binary
//! adds [`InspectConfig`], parsed from the command line via clap with `PVT_`
//! environment variable fallbacks:
//!
//! - `PVT_LAYER` - Only report this layer
//! - `PVT_TILE` - Tile address `z/x/y` used for GeoJSON projection (default: 0/0/0)
//! - `PVT_EXTENT` - Tile-local coordinate extent (default: 8192)
//! - `PVT_NO_ID_FALLBACK` - Do not fall back to the secondary id field

use std::path::PathBuf;

use clap::Parser;

use crate::projection::TileCoord;
use crate::tile::DEFAULT_EXTENT;

/// Largest accepted extent. Keeps `extent * 2^32` exactly representable
/// as an `f64`.
pub const MAX_EXTENT: u32 = 1 << 16;

/// Default tile address for projection.
pub const DEFAULT_TILE: &str = "0/0/0";

// =============================================================================
// Decode Options
// =============================================================================

/// Options applied when decoding a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Tile-local coordinate extent reported by every layer.
    pub extent: u32,

    /// Use the secondary id field when the primary id is zero.
    ///
    /// Enabled by default for compatibility with existing tiles. A tile
    /// whose primary id is legitimately 0 cannot be told apart from one
    /// without an id.
    pub id_fallback: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            extent: DEFAULT_EXTENT,
            id_fallback: true,
        }
    }
}

impl DecodeOptions {
    /// Validate the options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.extent == 0 {
            return Err("extent must be greater than 0".to_string());
        }
        if self.extent > MAX_EXTENT {
            return Err(format!("extent must be at most {}", MAX_EXTENT));
        }
        Ok(())
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// pvt-inspect - Summarise a Planet Vector Tile or dump it as GeoJSON.
#[derive(Parser, Debug, Clone)]
#[command(name = "pvt-inspect")]
#[command(author, version, about, long_about = None)]
pub struct InspectConfig {
    /// Path to the tile file.
    pub file: PathBuf,

    /// Only report this layer.
    #[arg(short, long, env = "PVT_LAYER")]
    pub layer: Option<String>,

    /// Tile address (z/x/y) used to project geometry.
    #[arg(short, long, default_value = DEFAULT_TILE, env = "PVT_TILE")]
    pub tile: TileCoord,

    /// Print features as a GeoJSON FeatureCollection instead of a summary.
    #[arg(long, default_value_t = false)]
    pub geojson: bool,

    /// Indent GeoJSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Tile-local coordinate extent.
    #[arg(long, default_value_t = DEFAULT_EXTENT, env = "PVT_EXTENT")]
    pub extent: u32,

    /// Do not fall back to the secondary id field when the id is zero.
    #[arg(long, default_value_t = false, env = "PVT_NO_ID_FALLBACK")]
    pub no_id_fallback: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl InspectConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.decode_options().validate()?;

        if self.pretty && !self.geojson {
            return Err("--pretty only applies together with --geojson".to_string());
        }

        if let Some(ref layer) = self.layer {
            if layer.is_empty() {
                return Err("layer name must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Decode options derived from the command line.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            extent: self.extent,
            id_fallback: !self.no_id_fallback,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

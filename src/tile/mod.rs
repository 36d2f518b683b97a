//! Vector tile facade.
//!
//! This module presents a decoded PVT tile through the Mapbox Vector Tile
//! consumer contract:
//!
//! ```text
//! VectorTile ─ layers() ─▶ Layers ─ get(name) ─▶ Layer ─ feature(i) ─▶ Feature
//! ```
//!
//! # Memoization
//!
//! - The name → layer mapping is built on the first call to
//!   [`VectorTile::layers`], in one pass over the layer table. Feature
//!   tables are not touched.
//! - Each layer holds one slot per feature. A slot is filled the first time
//!   its feature is requested and never changes afterwards.
//!
//! Opening a tile verifies the buffer's structure as a whole. Bad string or
//! value table references inside a feature surface at the first access to
//! that feature.
//!
//! # Threading
//!
//! A `VectorTile` can be moved to another thread but not shared between
//! threads. Distinct tiles share nothing and can be decoded in parallel.

mod feature;
mod layer;

pub use feature::Feature;
pub use layer::Layer;

use std::cell::OnceCell;
use std::collections::HashMap;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::config::DecodeOptions;
use crate::error::TileError;
use crate::format::TileReader;

/// Coordinate space of tile-local geometry, matching MapLibre's extent.
pub const DEFAULT_EXTENT: u32 = 8192;

// =============================================================================
// VectorTile
// =============================================================================

/// A decoded PVT tile.
#[derive(Debug)]
pub struct VectorTile {
    reader: TileReader,
    options: DecodeOptions,
    layers: OnceCell<Layers>,
}

impl VectorTile {
    /// Open a tile with default options.
    pub fn new(data: impl Into<Bytes>) -> Result<Self, TileError> {
        Self::with_options(data, DecodeOptions::default())
    }

    /// Validate `options`, then verify the buffer. Layers and features are
    /// not decoded here.
    pub fn with_options(data: impl Into<Bytes>, options: DecodeOptions) -> Result<Self, TileError> {
        options.validate().map_err(TileError::InvalidOptions)?;
        let reader = TileReader::new(data)?;
        debug!(
            bytes = reader.buffer_len(),
            layers = reader.layer_count(),
            strings = reader.string_count(),
            values = reader.value_count(),
            "Opened tile"
        );

        Ok(Self {
            reader,
            options,
            layers: OnceCell::new(),
        })
    }

    /// Structural reader over the tile buffer.
    pub fn reader(&self) -> &TileReader {
        &self.reader
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// The name → layer mapping, built on first call.
    pub fn layers(&self) -> Result<&Layers, TileError> {
        if let Some(layers) = self.layers.get() {
            return Ok(layers);
        }
        let layers = Layers::index(&self.reader, &self.options)?;
        Ok(self.layers.get_or_init(|| layers))
    }

    /// Look up a layer by name.
    pub fn layer(&self, name: &str) -> Result<Option<&Layer>, TileError> {
        Ok(self.layers()?.get(name))
    }

    /// Whether the layer mapping has been built yet.
    pub fn is_indexed(&self) -> bool {
        self.layers.get().is_some()
    }
}

// =============================================================================
// Layers
// =============================================================================

/// Layers of a tile keyed by name, in declaration order.
///
/// If two layers share a name the later one replaces the earlier one,
/// keeping the earlier one's position.
#[derive(Debug)]
pub struct Layers {
    entries: Vec<Layer>,
    by_name: HashMap<String, usize>,
}

impl Layers {
    fn index(reader: &TileReader, options: &DecodeOptions) -> Result<Self, TileError> {
        let count = reader.layer_count();
        let mut entries: Vec<Layer> = Vec::with_capacity(count);
        let mut by_name = HashMap::with_capacity(count);

        for i in 0..count {
            let layer = Layer::new(reader, i, options.extent, options.id_fallback)?;
            match by_name.get(layer.name()) {
                Some(&position) => {
                    warn!(name = layer.name(), "Duplicate layer name, keeping the later layer");
                    entries[position] = layer;
                }
                None => {
                    by_name.insert(layer.name().to_string(), entries.len());
                    entries.push(layer);
                }
            }
        }

        debug!(layers = entries.len(), "Indexed layers");
        Ok(Self { entries, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.by_name.get(name).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layers in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.entries.iter()
    }

    /// Layer names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Layer::name)
    }
}

impl<'a> IntoIterator for &'a Layers {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

//! Structural reader for PVT tiles.
//!
//! The whole buffer is run through the FlatBuffers verifier once, when the
//! reader is built. After that every accessor is a plain read over the
//! shared bytes. What the verifier cannot know is whether the indices a
//! feature stores into the string and value tables are in range; those are
//! checked here on every lookup.

use bytes::Bytes;
use flatbuffers::{Follow, Vector, VerifierOptions};

use crate::error::MalformedTile;

use super::schema::{PVTFeature, PVTLayer, PVTTile, PVTTilePoint};

/// Upper bound on tables visited while verifying one tile.
///
/// Dense tiles hold two tables per feature (feature and geometry) plus one
/// per extra ring, so the verifier's own default is too low.
const MAX_TABLES: usize = 1 << 24;

fn verifier_options() -> VerifierOptions {
    VerifierOptions {
        max_tables: MAX_TABLES,
        ..VerifierOptions::default()
    }
}

/// Bounds-checked vector lookup reporting the offending table by name.
fn element<'a, T: Follow<'a> + 'a>(
    vector: Option<Vector<'a, T>>,
    index: usize,
    table: &'static str,
) -> Result<T::Inner, MalformedTile> {
    match vector {
        Some(v) if index < v.len() => Ok(v.get(index)),
        v => Err(MalformedTile::TableIndex {
            table,
            index,
            len: v.map_or(0, |v| v.len()),
        }),
    }
}

// =============================================================================
// RawValue
// =============================================================================

/// An undecoded value table entry: the type tag and its numeric payload.
///
/// For string values the payload is an index into the string table; for
/// booleans it is 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawValue {
    pub tag: u8,
    pub payload: f64,
}

// =============================================================================
// TileReader
// =============================================================================

/// Verified view over a PVT tile buffer.
///
/// Cloning is cheap: the bytes are reference counted.
#[derive(Debug, Clone)]
pub struct TileReader {
    data: Bytes,
}

impl TileReader {
    /// Verify `data` as a `PVTTile` and build a reader over it without
    /// copying.
    pub fn new(data: impl Into<Bytes>) -> Result<Self, MalformedTile> {
        let data = data.into();
        flatbuffers::root_with_opts::<PVTTile>(&verifier_options(), &data)?;
        Ok(Self { data })
    }

    fn root(&self) -> PVTTile<'_> {
        // SAFETY: `data` passed the verifier in `new` and is immutable.
        unsafe { flatbuffers::root_unchecked::<PVTTile>(&self.data) }
    }

    /// Size of the underlying buffer in bytes.
    pub fn buffer_len(&self) -> usize {
        self.data.len()
    }

    pub fn string_count(&self) -> usize {
        self.root().strings().map_or(0, |v| v.len())
    }

    /// Resolve a string table index.
    pub fn string(&self, index: usize) -> Result<&str, MalformedTile> {
        element(self.root().strings(), index, "string")
    }

    pub fn value_count(&self) -> usize {
        self.root().values().map_or(0, |v| v.len())
    }

    /// Read a value table entry without interpreting its tag.
    pub fn raw_value(&self, index: usize) -> Result<RawValue, MalformedTile> {
        let value = element(self.root().values(), index, "value")?;
        Ok(RawValue {
            tag: value.t(),
            payload: value.v(),
        })
    }

    pub fn layer_count(&self) -> usize {
        self.root().layers().map_or(0, |v| v.len())
    }

    pub fn layer(&self, index: usize) -> Result<LayerRef<'_>, MalformedTile> {
        Ok(LayerRef {
            table: element(self.root().layers(), index, "layer")?,
        })
    }
}

// =============================================================================
// LayerRef
// =============================================================================

/// Structural access to one layer table.
#[derive(Clone, Copy)]
pub struct LayerRef<'a> {
    table: PVTLayer<'a>,
}

impl<'a> LayerRef<'a> {
    /// Index of the layer name in the string table.
    pub fn name_index(&self) -> u32 {
        self.table.name()
    }

    pub fn feature_count(&self) -> usize {
        self.table.features().map_or(0, |v| v.len())
    }

    pub fn feature(&self, index: usize) -> Result<FeatureRef<'a>, MalformedTile> {
        Ok(FeatureRef {
            table: element(self.table.features(), index, "feature")?,
        })
    }
}

// =============================================================================
// FeatureRef
// =============================================================================

/// Structural access to one feature table.
#[derive(Clone, Copy)]
pub struct FeatureRef<'a> {
    table: PVTFeature<'a>,
}

impl<'a> FeatureRef<'a> {
    /// Primary id as stored; 0 when the field is absent.
    pub fn id(&self) -> u64 {
        self.table.id()
    }

    /// Secondary id (the Hilbert index of the source entity); 0 when absent.
    pub fn secondary_id(&self) -> u64 {
        self.table.h()
    }

    pub fn key_count(&self) -> usize {
        self.table.keys().map_or(0, |v| v.len())
    }

    /// String table index of property key `i`.
    pub fn key(&self, i: usize) -> Result<u32, MalformedTile> {
        element(self.table.keys(), i, "key")
    }

    pub fn value_count(&self) -> usize {
        self.table.values().map_or(0, |v| v.len())
    }

    /// Value table index of property value `i`.
    pub fn value(&self, i: usize) -> Result<u32, MalformedTile> {
        element(self.table.values(), i, "property value")
    }

    pub fn ring_count(&self) -> usize {
        self.table.geometries().map_or(0, |v| v.len())
    }

    pub fn ring(&self, index: usize) -> Result<RingRef<'a>, MalformedTile> {
        let geometry = element(self.table.geometries(), index, "ring")?;
        Ok(RingRef {
            points: geometry.points(),
        })
    }
}

// =============================================================================
// RingRef
// =============================================================================

/// Structural access to one ring's inline point structs.
#[derive(Clone, Copy)]
pub struct RingRef<'a> {
    points: Option<Vector<'a, PVTTilePoint>>,
}

impl RingRef<'_> {
    pub fn len(&self) -> usize {
        self.points.map_or(0, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read point `index` as tile-local `(x, y)`.
    pub fn point(&self, index: usize) -> Result<(i32, i32), MalformedTile> {
        let point = element(self.points, index, "point")?;
        Ok((point.x(), point.y()))
    }
}

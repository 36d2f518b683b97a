use flatbuffers::InvalidFlatbuffer;
use thiserror::Error;

/// Structural defects in a tile buffer.
///
/// The upstream writer is trusted, so none of these are expected in practice.
/// When one does occur the whole tile should be dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTile {
    /// The buffer failed FlatBuffers verification as a `PVTTile`
    #[error("Verification failed: {0}")]
    Verification(String),

    /// A table index stored in the tile points past the table's length
    #[error("{table} index {index} out of bounds (table length {len})")]
    TableIndex {
        table: &'static str,
        index: usize,
        len: usize,
    },

    /// Value table entry carries a tag outside {String, Number, Boolean}
    #[error("Unknown value tag: {0}")]
    UnknownValueTag(u8),

    /// String value whose payload is not a usable string table index
    #[error("Value {index} has a non-integral string reference")]
    InvalidStringRef { index: usize },

    /// Feature key and value index arrays differ in length
    #[error("Feature has {keys} property keys but {values} property values")]
    PropertyArity { keys: usize, values: usize },
}

impl From<InvalidFlatbuffer> for MalformedTile {
    fn from(err: InvalidFlatbuffer) -> Self {
        MalformedTile::Verification(err.to_string())
    }
}

/// Errors returned by the tile decoder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// The buffer does not describe a well-formed tile
    #[error("Malformed tile: {0}")]
    Malformed(#[from] MalformedTile),

    /// Decode options rejected before the tile was opened
    #[error("Invalid decode options: {0}")]
    InvalidOptions(String),

    /// Caller asked for an element past the declared count
    #[error("Index out of range: {kind} {index} requested, but only {len} available")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// Feature shape cannot be classified as Point, LineString, or Polygon
    #[error("Unsupported geometry: {reason}")]
    UnsupportedGeometry { reason: String },
}

/// Errors from parsing or validating a `z/x/y` tile coordinate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileCoordError {
    /// Input is not three `/`-separated integers
    #[error("Invalid tile coordinate '{0}': expected z/x/y")]
    InvalidFormat(String),

    /// Zoom beyond the deepest level the projection supports
    #[error("Zoom {z} exceeds maximum of {max}")]
    ZoomTooLarge { z: u8, max: u8 },

    /// Column or row outside the zoom level's grid
    #[error("Tile {x}/{y} is outside the {size}x{size} grid at zoom {z}")]
    OutOfRange { z: u8, x: u32, y: u32, size: u64 },
}

impl TileError {
    /// Whether this error means the tile itself is unusable.
    ///
    /// `IndexOutOfRange` and `UnsupportedGeometry` concern a single request
    /// or feature, so callers may skip the feature and keep the tile.
    pub fn is_malformed(&self) -> bool {
        matches!(self, TileError::Malformed(_))
    }
}

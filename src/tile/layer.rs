//! Layers with lazily decoded, memoized features.

use std::cell::OnceCell;

use tracing::trace;

use crate::error::TileError;
use crate::format::TileReader;
use crate::geojson::FeatureCollection;
use crate::projection::TileCoord;

use super::feature::Feature;

/// A named group of features.
///
/// Features are decoded on first access into a fixed slot array sized to
/// the feature count. Each slot is written at most once, so repeated access
/// to the same index returns the same `&Feature`. A decode error leaves the
/// slot empty and is returned again on the next attempt.
#[derive(Debug)]
pub struct Layer {
    name: String,
    extent: u32,
    id_fallback: bool,
    reader: TileReader,
    layer_index: usize,
    features: Box<[OnceCell<Feature>]>,
}

impl Layer {
    pub(crate) fn new(
        reader: &TileReader,
        layer_index: usize,
        extent: u32,
        id_fallback: bool,
    ) -> Result<Self, TileError> {
        let layer = reader.layer(layer_index)?;
        let name = reader.string(layer.name_index() as usize)?.to_string();
        let features = (0..layer.feature_count()).map(|_| OnceCell::new()).collect();

        Ok(Self {
            name,
            extent,
            id_fallback,
            reader: reader.clone(),
            layer_index,
            features,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the tile-local coordinate space.
    pub fn extent(&self) -> u32 {
        self.extent
    }

    /// Number of features in the layer.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Decode feature `index`, or return the copy decoded earlier.
    pub fn feature(&self, index: usize) -> Result<&Feature, TileError> {
        let slot = self
            .features
            .get(index)
            .ok_or(TileError::IndexOutOfRange {
                kind: "feature",
                index,
                len: self.features.len(),
            })?;

        if let Some(feature) = slot.get() {
            return Ok(feature);
        }

        trace!(layer = %self.name, index, "Decoding feature");
        let table = self.reader.layer(self.layer_index)?.feature(index)?;
        let feature = Feature::decode(&self.reader, &table, self.extent, self.id_fallback)?;
        Ok(slot.get_or_init(|| feature))
    }

    /// Decode every feature in index order.
    pub fn features(&self) -> impl Iterator<Item = Result<&Feature, TileError>> + '_ {
        (0..self.len()).map(move |index| self.feature(index))
    }

    /// Whether feature `index` has already been decoded.
    pub fn is_decoded(&self, index: usize) -> bool {
        self.features
            .get(index)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of feature slots decoded so far.
    pub fn decoded_count(&self) -> usize {
        self.features.iter().filter(|slot| slot.get().is_some()).count()
    }

    /// Project every feature as if the layer belonged to tile `coord`.
    pub fn to_geojson(&self, coord: TileCoord) -> Result<FeatureCollection, TileError> {
        let features = self
            .features()
            .map(|feature| feature.map(|f| f.to_geojson(coord)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FeatureCollection { features })
    }
}

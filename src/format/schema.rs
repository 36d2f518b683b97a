//! Planet Vector Tile schema bindings.
//!
//! ```text
//! struct PVTTilePoint { x: int; y: int; }
//! struct PVTValue     { t: PVTValueType (ubyte); v: double; }
//!
//! table PVTGeometry { points: [PVTTilePoint]; }
//! table PVTFeature  { id: ulong; h: ulong; keys: [uint]; values: [uint]; geometries: [PVTGeometry]; }
//! table PVTLayer    { name: uint; features: [PVTFeature]; }
//! table PVTTile     { layers: [PVTLayer]; strings: [string]; values: [PVTValue]; }
//! root_type PVTTile;
//! ```
//!
//! These follow the shape of `flatc --rust` output for the schema above,
//! trimmed to what the decoder and its fixture builders use.

#![allow(clippy::needless_lifetimes)]

use flatbuffers::{
    FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Push, PushAlignment,
    SimpleToVerifyInSlice, Table, VOffsetT, Vector, Verifiable, Verifier, WIPOffset,
};

// =============================================================================
// Structs
// =============================================================================

/// A tile-local point, stored inline in geometry vectors.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct PVTTilePoint(pub [u8; 8]);

impl PVTTilePoint {
    pub fn new(x: i32, y: i32) -> Self {
        let mut bytes = [0u8; 8];
        bytes[0..4].copy_from_slice(&x.to_le_bytes());
        bytes[4..8].copy_from_slice(&y.to_le_bytes());
        Self(bytes)
    }

    pub fn x(&self) -> i32 {
        i32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn y(&self) -> i32 {
        i32::from_le_bytes([self.0[4], self.0[5], self.0[6], self.0[7]])
    }
}

impl std::fmt::Debug for PVTTilePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PVTTilePoint")
            .field("x", &self.x())
            .field("y", &self.y())
            .finish()
    }
}

/// A typed value table entry: tag byte, 7 bytes of padding, `f64` payload.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct PVTValue(pub [u8; 16]);

impl PVTValue {
    pub fn new(t: u8, v: f64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0] = t;
        bytes[8..16].copy_from_slice(&v.to_le_bytes());
        Self(bytes)
    }

    pub fn t(&self) -> u8 {
        self.0[0]
    }

    pub fn v(&self) -> f64 {
        let mut payload = [0u8; 8];
        payload.copy_from_slice(&self.0[8..16]);
        f64::from_le_bytes(payload)
    }
}

impl std::fmt::Debug for PVTValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PVTValue")
            .field("t", &self.t())
            .field("v", &self.v())
            .finish()
    }
}

macro_rules! inline_struct {
    ($name:ident, $align:expr) => {
        impl SimpleToVerifyInSlice for $name {}

        impl<'a> Follow<'a> for $name {
            type Inner = &'a $name;

            #[inline]
            unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
                <&'a $name>::follow(buf, loc)
            }
        }

        impl<'a> Follow<'a> for &'a $name {
            type Inner = &'a $name;

            #[inline]
            unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
                flatbuffers::follow_cast_ref::<$name>(buf, loc)
            }
        }

        impl Push for $name {
            type Output = $name;

            #[inline]
            unsafe fn push(&self, dst: &mut [u8], _written_len: usize) {
                dst.copy_from_slice(&self.0);
            }

            #[inline]
            fn alignment() -> PushAlignment {
                PushAlignment::new($align)
            }
        }

        impl Verifiable for $name {
            #[inline]
            fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
                v.in_buffer::<Self>(pos)
            }
        }
    };
}

inline_struct!(PVTTilePoint, 4);
inline_struct!(PVTValue, 8);

// =============================================================================
// Tables
// =============================================================================

macro_rules! table {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq)]
        pub struct $name<'a> {
            pub _tab: Table<'a>,
        }

        impl<'a> Follow<'a> for $name<'a> {
            type Inner = $name<'a>;

            #[inline]
            unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
                Self {
                    _tab: Table::new(buf, loc),
                }
            }
        }
    };
}

table!(PVTGeometry);
table!(PVTFeature);
table!(PVTLayer);
table!(PVTTile);

// The accessors below are sound because every table is only ever reached
// through a buffer that passed `Verifiable::run_verifier` for its root.

impl<'a> PVTGeometry<'a> {
    pub const VT_POINTS: VOffsetT = 4;

    pub fn points(&self) -> Option<Vector<'a, PVTTilePoint>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, PVTTilePoint>>>(Self::VT_POINTS, None)
        }
    }

    pub fn create<'bldr: 'args, 'args: 'mut_bldr, 'mut_bldr>(
        fbb: &'mut_bldr mut FlatBufferBuilder<'bldr>,
        args: &'args PVTGeometryArgs<'args>,
    ) -> WIPOffset<PVTGeometry<'bldr>> {
        let start = fbb.start_table();
        if let Some(points) = args.points {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_POINTS, points);
        }
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}

impl Verifiable for PVTGeometry<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, PVTTilePoint>>>(
                "points",
                Self::VT_POINTS,
                false,
            )?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct PVTGeometryArgs<'a> {
    pub points: Option<WIPOffset<Vector<'a, PVTTilePoint>>>,
}

impl<'a> PVTFeature<'a> {
    pub const VT_ID: VOffsetT = 4;
    pub const VT_H: VOffsetT = 6;
    pub const VT_KEYS: VOffsetT = 8;
    pub const VT_VALUES: VOffsetT = 10;
    pub const VT_GEOMETRIES: VOffsetT = 12;

    pub fn id(&self) -> u64 {
        unsafe { self._tab.get::<u64>(Self::VT_ID, Some(0)).unwrap_or(0) }
    }

    pub fn h(&self) -> u64 {
        unsafe { self._tab.get::<u64>(Self::VT_H, Some(0)).unwrap_or(0) }
    }

    pub fn keys(&self) -> Option<Vector<'a, u32>> {
        unsafe { self._tab.get::<ForwardsUOffset<Vector<'a, u32>>>(Self::VT_KEYS, None) }
    }

    pub fn values(&self) -> Option<Vector<'a, u32>> {
        unsafe { self._tab.get::<ForwardsUOffset<Vector<'a, u32>>>(Self::VT_VALUES, None) }
    }

    pub fn geometries(&self) -> Option<Vector<'a, ForwardsUOffset<PVTGeometry<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<PVTGeometry>>>>(
                    Self::VT_GEOMETRIES,
                    None,
                )
        }
    }

    pub fn create<'bldr: 'args, 'args: 'mut_bldr, 'mut_bldr>(
        fbb: &'mut_bldr mut FlatBufferBuilder<'bldr>,
        args: &'args PVTFeatureArgs<'args>,
    ) -> WIPOffset<PVTFeature<'bldr>> {
        let start = fbb.start_table();
        fbb.push_slot::<u64>(Self::VT_H, args.h, 0);
        fbb.push_slot::<u64>(Self::VT_ID, args.id, 0);
        if let Some(geometries) = args.geometries {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_GEOMETRIES, geometries);
        }
        if let Some(values) = args.values {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_VALUES, values);
        }
        if let Some(keys) = args.keys {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_KEYS, keys);
        }
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}

impl Verifiable for PVTFeature<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u64>("id", Self::VT_ID, false)?
            .visit_field::<u64>("h", Self::VT_H, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, u32>>>("keys", Self::VT_KEYS, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, u32>>>("values", Self::VT_VALUES, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<PVTGeometry>>>>(
                "geometries",
                Self::VT_GEOMETRIES,
                false,
            )?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct PVTFeatureArgs<'a> {
    pub id: u64,
    pub h: u64,
    pub keys: Option<WIPOffset<Vector<'a, u32>>>,
    pub values: Option<WIPOffset<Vector<'a, u32>>>,
    pub geometries: Option<WIPOffset<Vector<'a, ForwardsUOffset<PVTGeometry<'a>>>>>,
}

impl<'a> PVTLayer<'a> {
    pub const VT_NAME: VOffsetT = 4;
    pub const VT_FEATURES: VOffsetT = 6;

    /// Index of the layer name in the tile's string table.
    pub fn name(&self) -> u32 {
        unsafe { self._tab.get::<u32>(Self::VT_NAME, Some(0)).unwrap_or(0) }
    }

    pub fn features(&self) -> Option<Vector<'a, ForwardsUOffset<PVTFeature<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<PVTFeature>>>>(
                    Self::VT_FEATURES,
                    None,
                )
        }
    }

    pub fn create<'bldr: 'args, 'args: 'mut_bldr, 'mut_bldr>(
        fbb: &'mut_bldr mut FlatBufferBuilder<'bldr>,
        args: &'args PVTLayerArgs<'args>,
    ) -> WIPOffset<PVTLayer<'bldr>> {
        let start = fbb.start_table();
        if let Some(features) = args.features {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_FEATURES, features);
        }
        fbb.push_slot::<u32>(Self::VT_NAME, args.name, 0);
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}

impl Verifiable for PVTLayer<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("name", Self::VT_NAME, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<PVTFeature>>>>(
                "features",
                Self::VT_FEATURES,
                false,
            )?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct PVTLayerArgs<'a> {
    pub name: u32,
    pub features: Option<WIPOffset<Vector<'a, ForwardsUOffset<PVTFeature<'a>>>>>,
}

impl<'a> PVTTile<'a> {
    pub const VT_LAYERS: VOffsetT = 4;
    pub const VT_STRINGS: VOffsetT = 6;
    pub const VT_VALUES: VOffsetT = 8;

    pub fn layers(&self) -> Option<Vector<'a, ForwardsUOffset<PVTLayer<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<PVTLayer>>>>(
                    Self::VT_LAYERS,
                    None,
                )
        }
    }

    pub fn strings(&self) -> Option<Vector<'a, ForwardsUOffset<&'a str>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<&'a str>>>>(
                    Self::VT_STRINGS,
                    None,
                )
        }
    }

    pub fn values(&self) -> Option<Vector<'a, PVTValue>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, PVTValue>>>(Self::VT_VALUES, None)
        }
    }

    pub fn create<'bldr: 'args, 'args: 'mut_bldr, 'mut_bldr>(
        fbb: &'mut_bldr mut FlatBufferBuilder<'bldr>,
        args: &'args PVTTileArgs<'args>,
    ) -> WIPOffset<PVTTile<'bldr>> {
        let start = fbb.start_table();
        if let Some(values) = args.values {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_VALUES, values);
        }
        if let Some(strings) = args.strings {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_STRINGS, strings);
        }
        if let Some(layers) = args.layers {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_LAYERS, layers);
        }
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}

impl Verifiable for PVTTile<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<PVTLayer>>>>(
                "layers",
                Self::VT_LAYERS,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<&str>>>>(
                "strings",
                Self::VT_STRINGS,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, PVTValue>>>(
                "values",
                Self::VT_VALUES,
                false,
            )?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct PVTTileArgs<'a> {
    pub layers: Option<WIPOffset<Vector<'a, ForwardsUOffset<PVTLayer<'a>>>>>,
    pub strings: Option<WIPOffset<Vector<'a, ForwardsUOffset<&'a str>>>>,
    pub values: Option<WIPOffset<Vector<'a, PVTValue>>>,
}

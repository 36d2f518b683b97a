//! Decoding integration tests.
//!
//! Tests verify:
//! - Layer and feature counts survive encoding
//! - Features are decoded once and cached per slot
//! - Geometry kinds are inferred from the first ring
//! - Property values keep their types
//! - Malformed tiles fail with typed errors instead of panicking

use std::ptr;

use pvt_decode::config::MAX_EXTENT;
use pvt_decode::{
    DecodeOptions, GeometryKind, MalformedTile, Point, TileError, Value, VectorTile,
};

use super::test_utils::{
    create_populated_tile, create_tile_boundary_tile, rectangle, FeatureSpec, TileBuilder,
    EXTENT, NODE_COUNT,
};

// =============================================================================
// Fixture Tiles
// =============================================================================

#[test]
fn test_tile_boundary_fixture() {
    let tile = VectorTile::new(create_tile_boundary_tile()).unwrap();
    let layer = tile.layer("tile_boundary").unwrap().expect("layer present");
    assert_eq!(layer.len(), 1);
    assert_eq!(layer.extent(), 8192);

    let feature = layer.feature(0).unwrap();
    assert_eq!(feature.kind(), GeometryKind::Polygon);

    let ring = feature.ring(0).unwrap();
    assert_eq!(ring.len(), 5);
    assert_eq!(ring.first(), ring.last());
    assert!(ring.contains(&Point::new(0, 0)));
    assert!(ring.contains(&Point::new(EXTENT - 1, EXTENT - 1)));

    for key in ["z", "x", "y"] {
        assert_eq!(feature.property(key), Some(&Value::Number(0.0)), "{}", key);
    }
    assert_eq!(feature.properties().len(), 3);
}

#[test]
fn test_populated_nodes_layer() {
    let tile = VectorTile::new(create_populated_tile()).unwrap();
    let nodes = tile.layer("nodes").unwrap().expect("nodes layer");
    assert_eq!(nodes.len(), NODE_COUNT);

    let first = nodes.feature(0).unwrap();
    assert_eq!(first.kind(), GeometryKind::Point);
    assert_eq!(first.ring_count(), 1);
    assert_eq!(first.ring(0).unwrap().len(), 1);
    assert_eq!(first.property("osm_id"), Some(&Value::Number(5_680_698_655.0)));
    assert_eq!(first.property("power"), Some(&Value::from("pole")));
}

#[test]
fn test_layer_names_in_declaration_order() {
    let tile = VectorTile::new(create_populated_tile()).unwrap();
    let layers = tile.layers().unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers.names().collect::<Vec<_>>(), vec!["nodes", "ways"]);
    assert!(layers.contains("ways"));
    assert!(tile.layer("water").unwrap().is_none());
}

#[test]
fn test_layer_count_matches_encoded_layers() {
    for count in [0usize, 1, 5] {
        let mut builder = TileBuilder::new();
        for i in 0..count {
            let features = (0..i).map(|j| FeatureSpec::point(j as i32, 0)).collect();
            builder.add_layer(&format!("layer_{}", i), features);
        }
        let tile = VectorTile::new(builder.build()).unwrap();
        let layers = tile.layers().unwrap();

        assert_eq!(layers.len(), count);
        for (i, layer) in layers.iter().enumerate() {
            assert_eq!(layer.name(), format!("layer_{}", i));
            assert_eq!(layer.len(), i);
        }
    }
}

// =============================================================================
// Memoization
// =============================================================================

#[test]
fn test_feature_decoded_once() {
    let tile = VectorTile::new(create_populated_tile()).unwrap();
    assert!(!tile.is_indexed());

    let nodes = tile.layer("nodes").unwrap().unwrap();
    assert!(tile.is_indexed());
    assert_eq!(nodes.decoded_count(), 0);

    let first = nodes.feature(10).unwrap();
    let second = nodes.feature(10).unwrap();
    assert!(ptr::eq(first, second));
    assert!(nodes.is_decoded(10));
    assert!(!nodes.is_decoded(11));
    assert_eq!(nodes.decoded_count(), 1);
}

#[test]
fn test_layers_built_once() {
    let tile = VectorTile::new(create_populated_tile()).unwrap();
    let a = tile.layers().unwrap();
    let b = tile.layers().unwrap();
    assert!(ptr::eq(a, b));
}

#[test]
fn test_iterating_decodes_every_feature() {
    let tile = VectorTile::new(create_populated_tile()).unwrap();
    let ways = tile.layer("ways").unwrap().unwrap();
    let kinds: Vec<_> = ways.features().map(|f| f.unwrap().kind()).collect();
    assert_eq!(kinds, vec![GeometryKind::LineString, GeometryKind::Polygon]);
    assert_eq!(ways.decoded_count(), ways.len());
}

// =============================================================================
// Geometry and Properties
// =============================================================================

#[test]
fn test_classification_uses_first_ring() {
    let mut builder = TileBuilder::new();
    builder.add_layer(
        "shapes",
        vec![
            FeatureSpec::point(5, 5),
            FeatureSpec::new(vec![vec![(0, 0), (10, 0)]]),
            // Closed but too short to be a polygon
            FeatureSpec::new(vec![vec![(0, 0), (10, 0), (0, 0)]]),
            FeatureSpec::new(vec![rectangle(0, 0, 10, 10)]),
            // A closed second ring does not make a line a polygon
            FeatureSpec::new(vec![vec![(0, 0), (5, 5)], rectangle(0, 0, 10, 10)]),
        ],
    );
    let tile = VectorTile::new(builder.build()).unwrap();
    let shapes = tile.layer("shapes").unwrap().unwrap();

    let kinds: Vec<_> = shapes.features().map(|f| f.unwrap().kind()).collect();
    assert_eq!(
        kinds,
        vec![
            GeometryKind::Point,
            GeometryKind::LineString,
            GeometryKind::LineString,
            GeometryKind::Polygon,
            GeometryKind::LineString,
        ]
    );
    assert_eq!(shapes.feature(3).unwrap().mvt_type(), 3);
}

#[test]
fn test_property_types_preserved() {
    let mut builder = TileBuilder::new();
    let name = builder.string_property("name", "Main Street");
    let lanes = builder.number_property("lanes", 2.0);
    let width = builder.number_property("width", 7.5);
    let oneway = builder.bool_property("oneway", false);
    let feature = FeatureSpec::new(vec![vec![(0, 0), (100, 0)]])
        .with_property(name)
        .with_property(lanes)
        .with_property(width)
        .with_property(oneway);
    builder.add_layer("roads", vec![feature]);

    let tile = VectorTile::new(builder.build()).unwrap();
    let feature = tile.layer("roads").unwrap().unwrap().feature(0).unwrap();

    assert_eq!(feature.property("name"), Some(&Value::String("Main Street".into())));
    assert_eq!(feature.property("lanes"), Some(&Value::Number(2.0)));
    assert_eq!(feature.property("width").and_then(Value::as_f64), Some(7.5));
    assert_eq!(feature.property("oneway"), Some(&Value::Boolean(false)));
}

#[test]
fn test_repeated_key_keeps_last_value() {
    let mut builder = TileBuilder::new();
    let first = builder.string_property("name", "old");
    let second = builder.string_property("name", "new");
    builder.add_layer(
        "places",
        vec![FeatureSpec::point(1, 1).with_property(first).with_property(second)],
    );

    let tile = VectorTile::new(builder.build()).unwrap();
    let feature = tile.layer("places").unwrap().unwrap().feature(0).unwrap();
    assert_eq!(feature.properties().len(), 1);
    assert_eq!(feature.property("name"), Some(&Value::from("new")));
}

#[test]
fn test_properties_follow_encoded_key_order() {
    let tile = VectorTile::new(create_tile_boundary_tile()).unwrap();
    let feature = tile.layer("tile_boundary").unwrap().unwrap().feature(0).unwrap();
    let keys: Vec<_> = feature.properties().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "x", "y"]);
}

#[test]
fn test_repeated_key_keeps_first_position() {
    let mut builder = TileBuilder::new();
    let first = builder.string_property("name", "old");
    let kind = builder.string_property("kind", "city");
    let second = builder.string_property("name", "new");
    builder.add_layer(
        "places",
        vec![FeatureSpec::point(1, 1)
            .with_property(first)
            .with_property(kind)
            .with_property(second)],
    );

    let tile = VectorTile::new(builder.build()).unwrap();
    let feature = tile.layer("places").unwrap().unwrap().feature(0).unwrap();
    let entries: Vec<_> = feature.properties().iter().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], (&"name".to_string(), &Value::from("new")));
    assert_eq!(entries[1], (&"kind".to_string(), &Value::from("city")));
}

#[test]
fn test_bbox_in_tile_units() {
    let tile = VectorTile::new(create_populated_tile()).unwrap();
    let ways = tile.layer("ways").unwrap().unwrap();
    assert_eq!(ways.feature(0).unwrap().bbox(), Some([100, 100, 4000, 900]));
    assert_eq!(ways.feature(1).unwrap().bbox(), Some([1000, 1000, 3000, 3000]));
}

// =============================================================================
// Ids
// =============================================================================

#[test]
fn test_id_fallback() {
    let mut builder = TileBuilder::new();
    builder.add_layer(
        "ids",
        vec![
            FeatureSpec::point(0, 0).with_id(42).with_h(7),
            FeatureSpec::point(0, 0).with_h(7),
            FeatureSpec::point(0, 0),
        ],
    );
    let bytes = builder.build();

    let tile = VectorTile::new(bytes.clone()).unwrap();
    let ids = tile.layer("ids").unwrap().unwrap();
    let resolved: Vec<_> = ids.features().map(|f| f.unwrap().id()).collect();
    assert_eq!(resolved, vec![Some(42), Some(7), None]);

    let options = DecodeOptions {
        id_fallback: false,
        ..DecodeOptions::default()
    };
    let tile = VectorTile::with_options(bytes, options).unwrap();
    let ids = tile.layer("ids").unwrap().unwrap();
    let resolved: Vec<_> = ids.features().map(|f| f.unwrap().id()).collect();
    assert_eq!(resolved, vec![Some(42), None, None]);
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn test_zero_extent_rejected() {
    let options = DecodeOptions {
        extent: 0,
        ..DecodeOptions::default()
    };
    let err = VectorTile::with_options(create_tile_boundary_tile(), options).unwrap_err();
    assert!(matches!(err, TileError::InvalidOptions(_)));
    assert!(!err.is_malformed());
}

#[test]
fn test_extent_above_maximum_rejected() {
    let options = DecodeOptions {
        extent: MAX_EXTENT + 1,
        ..DecodeOptions::default()
    };
    let err = VectorTile::with_options(create_tile_boundary_tile(), options).unwrap_err();
    assert!(matches!(err, TileError::InvalidOptions(_)));

    let options = DecodeOptions {
        extent: MAX_EXTENT,
        ..DecodeOptions::default()
    };
    let tile = VectorTile::with_options(create_tile_boundary_tile(), options).unwrap();
    assert_eq!(tile.layer("tile_boundary").unwrap().unwrap().extent(), MAX_EXTENT);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_feature_index_past_end() {
    let tile = VectorTile::new(create_populated_tile()).unwrap();
    let nodes = tile.layer("nodes").unwrap().unwrap();

    assert!(nodes.feature(NODE_COUNT - 1).is_ok());
    assert_eq!(
        nodes.feature(NODE_COUNT).unwrap_err(),
        TileError::IndexOutOfRange {
            kind: "feature",
            index: NODE_COUNT,
            len: NODE_COUNT,
        }
    );
}

#[test]
fn test_key_index_out_of_range() {
    let mut builder = TileBuilder::new();
    let value = builder.number_value(1.0);
    builder.add_layer("bad", vec![FeatureSpec::point(0, 0).with_property((99, value))]);

    let tile = VectorTile::new(builder.build()).unwrap();
    let err = tile.layer("bad").unwrap().unwrap().feature(0).unwrap_err();
    assert!(err.is_malformed());
    assert!(matches!(
        err,
        TileError::Malformed(MalformedTile::TableIndex { table: "string", index: 99, .. })
    ));
}

#[test]
fn test_value_index_out_of_range() {
    let mut builder = TileBuilder::new();
    let key = builder.string("name");
    builder.add_layer("bad", vec![FeatureSpec::point(0, 0).with_property((key, 5))]);

    let tile = VectorTile::new(builder.build()).unwrap();
    let err = tile.layer("bad").unwrap().unwrap().feature(0).unwrap_err();
    assert!(matches!(
        err,
        TileError::Malformed(MalformedTile::TableIndex { table: "value", index: 5, .. })
    ));
}

#[test]
fn test_unknown_value_tag() {
    let mut builder = TileBuilder::new();
    let key = builder.string("name");
    let value = builder.raw_value(9, 0.0);
    builder.add_layer("bad", vec![FeatureSpec::point(0, 0).with_property((key, value))]);

    let tile = VectorTile::new(builder.build()).unwrap();
    let err = tile.layer("bad").unwrap().unwrap().feature(0).unwrap_err();
    assert_eq!(err, TileError::Malformed(MalformedTile::UnknownValueTag(9)));
}

#[test]
fn test_property_arity_mismatch() {
    let mut builder = TileBuilder::new();
    let (key, value) = builder.string_property("power", "pole");
    let mut feature = FeatureSpec::point(0, 0).with_property((key, value));
    feature.keys.push(key);
    builder.add_layer("bad", vec![feature]);

    let tile = VectorTile::new(builder.build()).unwrap();
    let err = tile.layer("bad").unwrap().unwrap().feature(0).unwrap_err();
    assert_eq!(
        err,
        TileError::Malformed(MalformedTile::PropertyArity { keys: 2, values: 1 })
    );
}

#[test]
fn test_feature_without_rings() {
    let mut builder = TileBuilder::new();
    builder.add_layer("empty", vec![FeatureSpec::new(Vec::new())]);

    let tile = VectorTile::new(builder.build()).unwrap();
    let layer = tile.layer("empty").unwrap().unwrap();
    let err = layer.feature(0).unwrap_err();
    assert!(matches!(err, TileError::UnsupportedGeometry { .. }));

    // Failures are not cached
    assert!(!layer.is_decoded(0));
    assert!(layer.feature(0).is_err());
}

#[test]
fn test_bad_feature_does_not_poison_layer() {
    let mut builder = TileBuilder::new();
    builder.add_layer(
        "mixed",
        vec![FeatureSpec::point(1, 2), FeatureSpec::new(Vec::new()), FeatureSpec::point(3, 4)],
    );

    let tile = VectorTile::new(builder.build()).unwrap();
    let layer = tile.layer("mixed").unwrap().unwrap();
    assert!(layer.feature(1).is_err());
    assert_eq!(layer.feature(2).unwrap().ring(0).unwrap()[0], Point::new(3, 4));
    assert_eq!(layer.decoded_count(), 1);
}

#[test]
fn test_truncated_buffer() {
    let bytes = create_populated_tile();
    let truncated = bytes[..bytes.len() / 2].to_vec();

    // Either the root or a later table read fails; nothing panics.
    match VectorTile::new(truncated) {
        Err(err) => assert!(err.is_malformed()),
        Ok(tile) => {
            let result = tile.layers().and_then(|layers| {
                for layer in layers {
                    for feature in layer.features() {
                        feature?;
                    }
                }
                Ok(())
            });
            assert!(result.unwrap_err().is_malformed());
        }
    }
}

#[test]
fn test_empty_buffer() {
    let err = VectorTile::new(Vec::new()).unwrap_err();
    assert!(err.is_malformed());
}

// =============================================================================
// Duplicate Layers and Threads
// =============================================================================

#[test]
fn test_duplicate_layer_name_keeps_later_layer() {
    let mut builder = TileBuilder::new();
    builder.add_layer("roads", vec![FeatureSpec::point(0, 0)]);
    builder.add_layer("water", vec![FeatureSpec::point(0, 0)]);
    builder.add_layer(
        "roads",
        vec![FeatureSpec::point(1, 1), FeatureSpec::point(2, 2)],
    );

    let tile = VectorTile::new(builder.build()).unwrap();
    let layers = tile.layers().unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers.names().collect::<Vec<_>>(), vec!["roads", "water"]);
    assert_eq!(layers.get("roads").unwrap().len(), 2);
}

#[test]
fn test_distinct_tiles_decode_in_parallel() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let bytes = if i % 2 == 0 {
                    create_populated_tile()
                } else {
                    create_tile_boundary_tile()
                };
                let tile = VectorTile::new(bytes).unwrap();
                let mut decoded = 0;
                for layer in tile.layers().unwrap() {
                    for feature in layer.features() {
                        feature.unwrap();
                        decoded += 1;
                    }
                }
                decoded
            })
        })
        .collect();

    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![NODE_COUNT + 2, 1, NODE_COUNT + 2, 1]);
}

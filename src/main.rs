//! pvt-inspect - Summarise a Planet Vector Tile or dump it as GeoJSON.
//!
//! This binary reads one tile from disk and reports its layers. It exists for
//! debugging tiles produced upstream; the library itself does no I/O.

use std::collections::BTreeMap;
use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pvt_decode::{
    config::InspectConfig, FeatureCollection, GeometryKind, Layer, TileError, VectorTile,
};

fn main() -> ExitCode {
    let config = InspectConfig::parse();
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let bytes = match std::fs::read(&config.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read {}: {}", config.file.display(), e);
            return ExitCode::FAILURE;
        }
    };
    info!("Read {} bytes from {}", bytes.len(), config.file.display());

    let tile = match VectorTile::with_options(bytes, config.decode_options()) {
        Ok(tile) => tile,
        Err(e) => {
            error!("Failed to open tile: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = if config.geojson {
        run_geojson(&tile, &config)
    } else {
        run_summary(&tile, &config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Collect the layers selected by `--layer`, or all layers.
fn selected_layers<'a>(
    tile: &'a VectorTile,
    config: &InspectConfig,
) -> Result<Vec<&'a Layer>, TileError> {
    let layers = tile.layers()?;
    match config.layer {
        Some(ref name) => match layers.get(name) {
            Some(layer) => Ok(vec![layer]),
            None => {
                let available: Vec<_> = layers.names().collect();
                warn!("Layer '{}' not found; available: {:?}", name, available);
                Ok(Vec::new())
            }
        },
        None => Ok(layers.iter().collect()),
    }
}

// =============================================================================
// Summary
// =============================================================================

fn run_summary(tile: &VectorTile, config: &InspectConfig) -> Result<(), Box<dyn Error>> {
    let reader = tile.reader();
    println!("Tile: {}", config.file.display());
    println!("─────────────────");
    println!("  Bytes:   {}", reader.buffer_len());
    println!("  Strings: {}", reader.string_count());
    println!("  Values:  {}", reader.value_count());
    println!("  Layers:  {}", tile.layers()?.len());
    println!();

    for layer in selected_layers(tile, config)? {
        let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
        let mut failed = 0;

        for feature in layer.features() {
            match feature {
                Ok(feature) => *kinds.entry(feature.kind().to_string()).or_default() += 1,
                Err(e) => {
                    warn!("Layer '{}': {}", layer.name(), e);
                    failed += 1;
                }
            }
        }

        println!("  {} ({} features, extent {})", layer.name(), layer.len(), layer.extent());
        for kind in [GeometryKind::Point, GeometryKind::LineString, GeometryKind::Polygon] {
            if let Some(count) = kinds.get(&kind.to_string()) {
                println!("    {:<11} {}", kind, count);
            }
        }
        if failed > 0 {
            println!("    failed      {}", failed);
        }
    }

    Ok(())
}

// =============================================================================
// GeoJSON
// =============================================================================

fn run_geojson(tile: &VectorTile, config: &InspectConfig) -> Result<(), Box<dyn Error>> {
    let mut collection = FeatureCollection::default();
    for layer in selected_layers(tile, config)? {
        let layer_collection = layer.to_geojson(config.tile)?;
        info!(
            "Projected {} features from '{}' at {}",
            layer_collection.features.len(),
            layer.name(),
            config.tile
        );
        collection.features.extend(layer_collection.features);
    }

    let json = if config.pretty {
        collection.to_json_string_pretty()?
    } else {
        collection.to_json_string()?
    };
    println!("{}", json);
    Ok(())
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pvt_decode=debug,pvt_inspect=debug"
    } else {
        "pvt_decode=info,pvt_inspect=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

//! Terrain generation pipeline
//!
//! fractal base -> hills -> erosion -> optional river -> normalization

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::TerrainConfig;
use crate::erosion::{self, ErosionStats};
use crate::terrain::{diamond_square, river, Terrain};
use crate::tilemap::Tilemap;
use crate::units::{BLOCK_WIDTH, DEFAULT_TERRAIN_SCALE};

/// Smallest hill radius, in blocks.
const HILL_MIN_RADIUS: f32 = 3.0;
/// Largest hill radius, in blocks.
const HILL_MAX_RADIUS: f32 = 8.0;

/// Generate a terrain covering `column_count` x `row_count` blocks.
///
/// Odd counts put the terrain edge on half-integer map coordinates.
pub fn generate_terrain(config: &TerrainConfig, rng: &mut ChaCha8Rng) -> (Terrain, ErosionStats) {
    let scale = DEFAULT_TERRAIN_SCALE;
    let steps_per_block = (1.0 / scale).round() as usize;
    let mut land = generate_base_heightmap(config, rng);
    let (width, height) = (land.width, land.height);

    let erosion_stats = erosion::simulate_erosion(&mut land, &config.erosion, BLOCK_WIDTH * scale, rng);
    debug!(
        eroded = erosion_stats.total_eroded,
        deposited = erosion_stats.total_deposited,
        "erosion complete"
    );

    let mut water = Tilemap::new_with(width, height, 0.0f32);
    if rng.gen::<f32>() < config.probability_of_river {
        let river = river::carve_river(&mut land, &mut water, steps_per_block, rng);
        debug!(along_x = river.along_x, surface = river.surface_height, "carved river");
    }

    normalize(&mut land, &water);

    (Terrain::from_layers(&land, &water, scale), erosion_stats)
}

/// Fractal land heights plus hills, before erosion, river and normalization.
pub fn generate_base_heightmap(config: &TerrainConfig, rng: &mut ChaCha8Rng) -> Tilemap<f32> {
    let steps_per_block = (1.0 / DEFAULT_TERRAIN_SCALE).round() as usize;
    let width = config.column_count * steps_per_block + 1;
    let height = config.row_count * steps_per_block + 1;

    info!("Generating {}x{} terrain grid", width, height);
    let mut land = diamond_square::generate(
        width,
        height,
        config.height_jitter,
        config.height_jitter_decay,
        rng,
    );
    add_hills(&mut land, config.hill_count, config.max_hill_height, steps_per_block, rng);
    land
}

/// Add rounded cosine bumps at random positions.
fn add_hills(
    land: &mut Tilemap<f32>,
    hill_count: usize,
    max_hill_height: f32,
    steps_per_block: usize,
    rng: &mut ChaCha8Rng,
) {
    if max_hill_height <= 0.0 {
        return;
    }

    for _ in 0..hill_count {
        let center_x = rng.gen_range(0..land.width) as f32;
        let center_y = rng.gen_range(0..land.height) as f32;
        let radius = rng.gen_range(HILL_MIN_RADIUS..=HILL_MAX_RADIUS) * steps_per_block as f32;
        let peak = rng.gen_range(0.0..=max_hill_height);

        for (x, y, h) in land.iter_mut() {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < radius {
                *h += peak * (1.0 + (std::f32::consts::PI * distance / radius).cos()) / 2.0;
            }
        }
    }
}

/// Shift land so the lowest combined land + water height is exactly 0.
fn normalize(land: &mut Tilemap<f32>, water: &Tilemap<f32>) {
    let mut lowest = (0, 0);
    let mut min_height = f32::MAX;
    for (x, y, &h) in land.iter() {
        let combined = h + *water.get(x, y);
        if combined < min_height {
            min_height = combined;
            lowest = (x, y);
        }
    }

    for (x, y, h) in land.iter_mut() {
        *h -= min_height;
        // Rounding can leave a wet cell a hair below zero
        let w = *water.get(x, y);
        if *h + w < 0.0 {
            *h = -w;
        }
    }

    let w = *water.get(lowest.0, lowest.1);
    land.set(lowest.0, lowest.1, -w);
}

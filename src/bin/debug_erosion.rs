//! Debug tool for comparing erosion presets visually
//! Erodes one base heightmap with every preset, prints the statistics and
//! saves the shaded results side by side.

use city_generator::config::TerrainConfig;
use city_generator::erosion::{self, ErosionParams, ErosionPreset};
use city_generator::map_export::shaded_heightmap_image;
use city_generator::terrain::generate_base_heightmap;
use city_generator::units::{BLOCK_WIDTH, DEFAULT_TERRAIN_SCALE};
use image::{ImageBuffer, Rgb, RgbImage};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

const SEED: u64 = 42;
const OUTPUT: &str = "erosion_comparison.png";
const GAP: u32 = 4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Generating erosion comparison...");

    let config = TerrainConfig { column_count: 96, row_count: 96, ..Default::default() };
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let base = generate_base_heightmap(&config, &mut rng);
    let cell_size = BLOCK_WIDTH * DEFAULT_TERRAIN_SCALE;

    let mut images = Vec::new();
    for &preset in ErosionPreset::all() {
        let mut heightmap = base.clone();
        let mut preset_rng = ChaCha8Rng::seed_from_u64(SEED);
        let params = ErosionParams::from_preset(preset);
        let stats = erosion::simulate_erosion(&mut heightmap, &params, cell_size, &mut preset_rng);

        println!("  {:<9} {}", preset.to_string(), preset.description());
        println!(
            "            eroded {:.1}, deposited {:.1}, max erosion {:.2}, max deposition {:.2}, roughness {:.3}",
            stats.total_eroded,
            stats.total_deposited,
            stats.max_erosion,
            stats.max_deposition,
            heightmap.roughness(),
        );
        images.push(shaded_heightmap_image(&heightmap, cell_size, 3.0));
    }

    let grid = side_by_side(&images);
    grid.save(OUTPUT)?;
    println!("Saved {} (left to right: {:?})", OUTPUT, ErosionPreset::all());
    Ok(())
}

fn side_by_side(images: &[RgbImage]) -> RgbImage {
    let Some(first) = images.first() else {
        return ImageBuffer::new(1, 1);
    };
    let (cell_width, cell_height) = first.dimensions();
    let width = cell_width * images.len() as u32 + GAP * (images.len() as u32 - 1);
    let mut grid: RgbImage = ImageBuffer::from_pixel(width, cell_height, Rgb([40, 40, 40]));

    for (i, img) in images.iter().enumerate() {
        let x_offset = i as u32 * (cell_width + GAP);
        for (x, y, pixel) in img.enumerate_pixels() {
            grid.put_pixel(x_offset + x, y, *pixel);
        }
    }
    grid
}

//! Top-down PNG export of a generated city
//!
//! Layers, bottom to top: hillshaded terrain with water, roads and bridges,
//! buildings shaded by height, neighborhood centers.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use tracing::info;

use crate::error::Result;
use crate::road_network::GradeType;
use crate::terrain::Terrain;
use crate::tilemap::Tilemap;
use crate::units::{BLOCK_WIDTH, HALF_STREET_WIDTH_FRACTION};
use crate::world::WorldData;

const SURFACE_ROAD_COLOR: (u8, u8, u8) = (70, 70, 75);
const BRIDGE_COLOR: (u8, u8, u8) = (150, 110, 70);
const NEIGHBORHOOD_COLOR: (u8, u8, u8) = (220, 40, 40);

/// Configuration for map export
#[derive(Clone, Debug)]
pub struct MapExportConfig {
    /// Image pixels per block along each axis
    pub pixels_per_block: u32,
    pub hillshade: bool,
    /// Vertical exaggeration used for hillshading
    pub height_exaggeration: f32,
    pub draw_roads: bool,
    pub draw_buildings: bool,
    pub draw_neighborhoods: bool,
}

impl Default for MapExportConfig {
    fn default() -> Self {
        Self {
            pixels_per_block: 8,
            hillshade: true,
            height_exaggeration: 2.0,
            draw_roads: true,
            draw_buildings: true,
            draw_neighborhoods: true,
        }
    }
}

/// Render the city to an image without saving it.
pub fn render_city_image(world: &WorldData, config: &MapExportConfig) -> RgbImage {
    let terrain = &world.terrain;
    let ppb = config.pixels_per_block.max(1) as f32;
    let width = ((terrain.max_x() - terrain.min_x()) * ppb).round().max(1.0) as u32;
    let height = ((terrain.max_z() - terrain.min_z()) * ppb).round().max(1.0) as u32;

    // Pixel center -> map coordinates
    let to_map = |px: u32, py: u32| {
        (
            terrain.min_x() + (px as f32 + 0.5) / ppb,
            terrain.min_z() + (py as f32 + 0.5) / ppb,
        )
    };
    // Map coordinates -> pixel, clamped to the image
    let to_pixel = |x: f32, z: f32| {
        let px = ((x - terrain.min_x()) * ppb).floor().clamp(0.0, (width - 1) as f32) as u32;
        let py = ((z - terrain.min_z()) * ppb).floor().clamp(0.0, (height - 1) as f32) as u32;
        (px, py)
    };

    let (min_height, max_height) = terrain
        .cells()
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), (_, _, c)| (lo.min(c.land_height), hi.max(c.land_height)));

    let mut img = ImageBuffer::new(width, height);
    for py in 0..height {
        for px in 0..width {
            let (x, z) = to_map(px, py);
            let color = terrain_color(terrain, x, z, min_height, max_height, config);
            img.put_pixel(px, py, Rgb([color.0, color.1, color.2]));
        }
    }

    if config.draw_roads {
        let half_width = (HALF_STREET_WIDTH_FRACTION * ppb).ceil().max(1.0) as i64;
        for (x, z, intersection) in world.road_network.intersections() {
            for edge in intersection.edges() {
                // Each undirected edge is drawn once, from its lower endpoint
                if (edge.dest_x, edge.dest_z) < (x, z) {
                    continue;
                }
                let color = match edge.grade_type {
                    GradeType::Surface => SURFACE_ROAD_COLOR,
                    GradeType::Bridge => BRIDGE_COLOR,
                };
                let (x0, y0) = to_pixel(x as f32, z as f32);
                let (x1, y1) = to_pixel(edge.dest_x as f32, edge.dest_z as f32);
                fill_rect(
                    &mut img,
                    x0.min(x1) as i64 - half_width,
                    y0.min(y1) as i64 - half_width,
                    x0.max(x1) as i64 + half_width,
                    y0.max(y1) as i64 + half_width,
                    color,
                );
            }
        }
    }

    if config.draw_buildings {
        let max_stories = world.buildings.iter().map(|b| b.stories).max().unwrap_or(1).max(1) as f32;
        for building in world.buildings.iter() {
            let t = building.stories as f32 / max_stories;
            let color = blend_colors((235, 225, 200), (90, 60, 120), t);
            let (x0, y0) = to_pixel(building.left, building.top);
            let (x1, y1) = to_pixel(building.right, building.bottom);
            fill_rect(&mut img, x0 as i64, y0 as i64, x1 as i64 - 1, y1 as i64 - 1, color);
        }
    }

    if config.draw_neighborhoods {
        let radius = (ppb / 4.0).ceil() as i64;
        for neighborhood in &world.neighborhoods {
            let (px, py) = to_pixel(neighborhood.center_x() as f32, neighborhood.center_z() as f32);
            let (px, py) = (px as i64, py as i64);
            fill_rect(&mut img, px - radius, py - radius, px + radius, py + radius, NEIGHBORHOOD_COLOR);
        }
    }

    img
}

/// Export the city map as a PNG
pub fn export_city_map(world: &WorldData, path: impl AsRef<Path>, config: &MapExportConfig) -> Result<()> {
    let path = path.as_ref();
    render_city_image(world, config).save(path)?;
    info!("Exported city map to {}", path.display());
    Ok(())
}

/// Grayscale hillshaded image of a bare heightmap, one pixel per sample.
pub fn shaded_heightmap_image(heightmap: &Tilemap<f32>, cell_size: f32, z_factor: f32) -> RgbImage {
    let (min, max) = heightmap.min_max();
    let range = (max - min).max(f32::EPSILON);
    let mut img = ImageBuffer::new(heightmap.width as u32, heightmap.height as u32);

    for (x, y, &h) in heightmap.iter() {
        let left = *heightmap.get(x.saturating_sub(1), y);
        let right = *heightmap.get((x + 1).min(heightmap.width - 1), y);
        let up = *heightmap.get(x, y.saturating_sub(1));
        let down = *heightmap.get(x, (y + 1).min(heightmap.height - 1));
        let shade = hillshade(right - left, down - up, cell_size * 2.0, z_factor);

        let v = ((0.25 + 0.75 * (h - min) / range) * shade * 255.0).clamp(0.0, 255.0) as u8;
        img.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
    }
    img
}

fn terrain_color(terrain: &Terrain, x: f32, z: f32, min: f32, max: f32, config: &MapExportConfig) -> (u8, u8, u8) {
    let Some(land) = terrain.land_height_at(x, z) else {
        return (0, 0, 0);
    };
    let water = terrain.water_height_at(x, z).unwrap_or(0.0);
    if water > 0.0 {
        let depth = (water / 5.0).min(1.0);
        return blend_colors((90, 150, 200), (25, 60, 130), depth);
    }

    let t = (land - min) / (max - min).max(f32::EPSILON);
    let base = if t < 0.5 {
        blend_colors((110, 150, 80), (150, 160, 95), t * 2.0)
    } else {
        blend_colors((150, 160, 95), (170, 150, 120), (t - 0.5) * 2.0)
    };

    if !config.hillshade {
        return base;
    }

    // Central differences one grid step either side
    let step = terrain.scale();
    let sample = |dx: f32, dz: f32| terrain.land_height_at(x + dx, z + dz).unwrap_or(land);
    let shade = hillshade(
        sample(step, 0.0) - sample(-step, 0.0),
        sample(0.0, step) - sample(0.0, -step),
        2.0 * step * BLOCK_WIDTH,
        config.height_exaggeration,
    );
    let apply = |c: u8| (c as f32 * shade).clamp(0.0, 255.0) as u8;
    (apply(base.0), apply(base.1), apply(base.2))
}

/// Diffuse light factor from height differences across one sample span.
fn hillshade(dx_height: f32, dz_height: f32, span: f32, z_factor: f32) -> f32 {
    // Light direction from top-left (sun angle)
    let light = (-0.6_f32, -0.6_f32, 0.5_f32);
    let light_len = (light.0 * light.0 + light.1 * light.1 + light.2 * light.2).sqrt();

    let nx = -dx_height * z_factor / span;
    let ny = -dz_height * z_factor / span;
    let n_len = (nx * nx + ny * ny + 1.0).sqrt();

    let n_dot_l = (nx * light.0 + ny * light.1 + light.2) / (n_len * light_len);
    (0.55 + 0.6 * n_dot_l).clamp(0.3, 1.3)
}

fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: (u8, u8, u8)) {
    let max_x = img.width() as i64 - 1;
    let max_y = img.height() as i64 - 1;
    for y in y0.max(0)..=y1.min(max_y) {
        for x in x0.max(0)..=x1.min(max_x) {
            img.put_pixel(x as u32, y as u32, Rgb([color.0, color.1, color.2]));
        }
    }
}

fn blend_colors(a: (u8, u8, u8), b: (u8, u8, u8), ratio: f32) -> (u8, u8, u8) {
    let ratio = ratio.clamp(0.0, 1.0);
    let inv = 1.0 - ratio;
    (
        (a.0 as f32 * inv + b.0 as f32 * ratio) as u8,
        (a.1 as f32 * inv + b.1 as f32 * ratio) as u8,
        (a.2 as f32 * inv + b.2 as f32 * ratio) as u8,
    )
}

//! Meandering river carved across the terrain.
//!
//! The river runs the full length of the map along one axis. Its water
//! surface sits level with the lowest land height on its centerline, so it
//! cuts through any higher ground it meets; the bed is parabolic and the
//! banks blend back into the original terrain.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::tilemap::Tilemap;

/// Half the width of the water channel, in blocks.
const CHANNEL_HALF_WIDTH_BLOCKS: f32 = 0.75;
/// Width of the blended bank on each side of the channel, in blocks.
const BANK_WIDTH_BLOCKS: f32 = 1.5;
/// Depth of water at the channel edge.
const EDGE_DEPTH: f32 = 1.0;
/// Depth of water on the centerline.
const CENTER_DEPTH: f32 = 4.0;
/// How far the top of the bank stands above the water surface.
const BANK_HEIGHT: f32 = 1.0;
/// Largest lateral change in drift per grid step.
const MEANDER_JITTER: f32 = 0.15;
/// Largest lateral drift per grid step.
const MAX_DRIFT: f32 = 0.5;

/// Where a river was carved.
#[derive(Clone, Debug)]
pub struct River {
    /// True when the river flows along the X axis (its centerline is a function of column).
    pub along_x: bool,
    /// Lateral grid position of the centerline at each step along the flow axis.
    pub centerline: Vec<f32>,
    pub surface_height: f32,
}

/// Carve a river into `land` and fill its channel in `water`.
pub fn carve_river(
    land: &mut Tilemap<f32>,
    water: &mut Tilemap<f32>,
    steps_per_block: usize,
    rng: &mut ChaCha8Rng,
) -> River {
    let along_x = rng.gen_bool(0.5);
    let (length, span) = if along_x {
        (land.width, land.height)
    } else {
        (land.height, land.width)
    };

    let steps = steps_per_block as f32;
    let half_width = CHANNEL_HALF_WIDTH_BLOCKS * steps;
    let bank_width = BANK_WIDTH_BLOCKS * steps;

    // Keep the whole channel and its banks on the map when there is room
    let middle = (span - 1) as f32 / 2.0;
    let margin = half_width + bank_width + steps;
    let low = margin.min(middle);
    let high = ((span - 1) as f32 - margin).max(middle);

    let mut offset = (middle + rng.gen_range(-0.25f32..=0.25) * span as f32).clamp(low, high);
    let mut drift = 0.0f32;
    let mut centerline = Vec::with_capacity(length);
    for _ in 0..length {
        centerline.push(offset);
        drift = (drift + rng.gen_range(-MEANDER_JITTER..=MEANDER_JITTER)).clamp(-MAX_DRIFT, MAX_DRIFT);
        offset = (offset + drift).clamp(low, high);
    }

    let sample = |map: &Tilemap<f32>, along: usize, lateral: usize| {
        if along_x { *map.get(along, lateral) } else { *map.get(lateral, along) }
    };
    let surface_height = centerline
        .iter()
        .enumerate()
        .map(|(along, &lateral)| sample(land, along, (lateral.round() as usize).min(span - 1)))
        .fold(f32::MAX, f32::min);
    let bank_top = surface_height + BANK_HEIGHT;

    for (x, y, h) in land.iter_mut() {
        let (along, lateral) = if along_x { (x, y) } else { (y, x) };
        let distance = (lateral as f32 - centerline[along]).abs();

        if distance <= half_width {
            let t = distance / half_width.max(f32::EPSILON);
            let depth = EDGE_DEPTH + (CENTER_DEPTH - EDGE_DEPTH) * (1.0 - t * t);
            *h = surface_height - depth;
            water.set(x, y, depth);
        } else if distance <= half_width + bank_width {
            let t = (distance - half_width) / bank_width;
            let blend = t * t * (3.0 - 2.0 * t);
            *h = bank_top + (*h - bank_top) * blend;
        }
    }

    River { along_x, centerline, surface_height }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_river_crosses_whole_map() {
        let mut land = Tilemap::new_with(33, 33, 10.0f32);
        let mut water = Tilemap::new_with(33, 33, 0.0f32);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let river = carve_river(&mut land, &mut water, 2, &mut rng);

        assert_eq!(river.centerline.len(), 33);
        assert_eq!(river.surface_height, 10.0);

        // Every slice across the flow axis holds some water
        for along in 0..33 {
            let wet = (0..33).any(|lateral| {
                let (x, y) = if river.along_x { (along, lateral) } else { (lateral, along) };
                *water.get(x, y) > 0.0
            });
            assert!(wet, "no water at step {}", along);
        }
    }

    #[test]
    fn test_water_surface_is_level() {
        let mut land = Tilemap::new_with(25, 25, 0.0f32);
        for (x, y, h) in land.iter_mut() {
            *h = (x + y) as f32;
        }
        let mut water = Tilemap::new_with(25, 25, 0.0f32);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let river = carve_river(&mut land, &mut water, 2, &mut rng);

        for (x, y, &w) in water.iter() {
            if w > 0.0 {
                assert!((*land.get(x, y) + w - river.surface_height).abs() < 1e-4);
            }
        }
    }
}

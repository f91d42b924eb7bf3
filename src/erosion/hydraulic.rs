//! Hydraulic erosion simulation using particle-based water droplets.
//!
//! Each droplet follows the terrain gradient, picking up sediment on steep
//! slopes and depositing it when the flow slows down or the droplet dries up.
//! Droplets that roll off the map edge take their sediment with them.

use crate::erosion::params::ErosionParams;
use crate::erosion::utils::{apply_brush, create_erosion_brush, gradient_at, height_at};
use crate::erosion::ErosionStats;
use crate::tilemap::Tilemap;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Largest height change a single droplet step may make, in meters.
const MAX_CHANGE_PER_STEP: f32 = 1.0;

/// A water droplet for hydraulic erosion simulation
struct WaterDroplet {
    x: f32,
    y: f32,
    dir_x: f32,
    dir_y: f32,
    velocity: f32,
    water: f32,
    sediment: f32,
}

impl WaterDroplet {
    fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            dir_x: 0.0,
            dir_y: 0.0,
            velocity: 1.0,
            water: 1.0,
            sediment: 0.0,
        }
    }
}

/// Run hydraulic erosion simulation.
///
/// Algorithm:
/// 1. Spawn droplet at a random position
/// 2. While droplet has water and hasn't exceeded max steps:
///    a. Calculate terrain gradient at current position
///    b. Update direction using inertia + gradient
///    c. Move droplet one cell in that direction
///    d. Compare sediment against carrying capacity (slope * speed * water)
///    e. Deposit the excess, or erode up to the height just descended
///    f. Accelerate downhill, evaporate some water
/// 3. Drop any remaining sediment where the droplet dies
pub fn simulate(
    heightmap: &mut Tilemap<f32>,
    params: &ErosionParams,
    rng: &mut ChaCha8Rng,
) -> ErosionStats {
    let width_f = heightmap.width as f32;
    let height_f = heightmap.height as f32;
    let brush = create_erosion_brush(params.droplet_erosion_radius);

    let droplet_count = (heightmap.width * heightmap.height) as f32 * params.droplets_per_cell;
    let droplet_count = droplet_count.round() as usize;

    let mut stats = ErosionStats {
        iterations: droplet_count,
        ..Default::default()
    };

    if heightmap.width < 2 || heightmap.height < 2 {
        return stats;
    }

    for _ in 0..droplet_count {
        let mut droplet = WaterDroplet::new(
            rng.gen_range(0.0..width_f - 1.0),
            rng.gen_range(0.0..height_f - 1.0),
        );

        for _ in 0..params.droplet_max_steps {
            stats.steps_taken += 1;
            let cell_x = droplet.x as usize;
            let cell_y = droplet.y as usize;
            let old_height = height_at(heightmap, droplet.x, droplet.y);

            let (grad_x, grad_y) = gradient_at(heightmap, droplet.x, droplet.y);
            droplet.dir_x = droplet.dir_x * params.droplet_inertia - grad_x * (1.0 - params.droplet_inertia);
            droplet.dir_y = droplet.dir_y * params.droplet_inertia - grad_y * (1.0 - params.droplet_inertia);

            let dir_len = (droplet.dir_x * droplet.dir_x + droplet.dir_y * droplet.dir_y).sqrt();
            if dir_len > 0.0001 {
                droplet.dir_x /= dir_len;
                droplet.dir_y /= dir_len;
            } else {
                // Flat spot - pick random direction
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                droplet.dir_x = angle.cos();
                droplet.dir_y = angle.sin();
            }

            droplet.x += droplet.dir_x;
            droplet.y += droplet.dir_y;

            // Off the map: the sediment leaves with the water
            if droplet.x < 0.0 || droplet.y < 0.0 || droplet.x >= width_f - 1.0 || droplet.y >= height_f - 1.0 {
                break;
            }

            let new_height = height_at(heightmap, droplet.x, droplet.y);
            let delta_height = new_height - old_height;

            let capacity = ((-delta_height).max(params.droplet_min_volume)
                * droplet.velocity
                * droplet.water
                * params.droplet_capacity_factor)
                .max(0.0);

            if droplet.sediment > capacity || delta_height > 0.0 {
                // Uphill: fill the pit behind us, otherwise drop the excess
                let deposit_amount = if delta_height > 0.0 {
                    droplet.sediment.min(delta_height)
                } else {
                    (droplet.sediment - capacity) * params.droplet_deposit_rate
                }
                .min(MAX_CHANGE_PER_STEP);

                if deposit_amount > 0.0 {
                    droplet.sediment -= deposit_amount;
                    apply_brush(heightmap, &brush, cell_x, cell_y, deposit_amount);
                    stats.total_deposited += deposit_amount as f64;
                    stats.max_deposition = stats.max_deposition.max(deposit_amount);
                }
            } else {
                let erode_amount = ((capacity - droplet.sediment) * params.droplet_erosion_rate)
                    .min(-delta_height)
                    .min(MAX_CHANGE_PER_STEP);

                if erode_amount > 0.0 {
                    droplet.sediment += erode_amount;
                    apply_brush(heightmap, &brush, cell_x, cell_y, -erode_amount);
                    stats.total_eroded += erode_amount as f64;
                    stats.max_erosion = stats.max_erosion.max(erode_amount);
                }
            }

            droplet.velocity = (droplet.velocity * droplet.velocity - delta_height * params.droplet_gravity)
                .max(0.0)
                .sqrt();
            droplet.water *= 1.0 - params.droplet_evaporation;

            if droplet.water < params.droplet_min_volume {
                let cell_x = droplet.x as usize;
                let cell_y = droplet.y as usize;
                if droplet.sediment > 0.0 {
                    apply_brush(heightmap, &brush, cell_x, cell_y, droplet.sediment);
                    stats.total_deposited += droplet.sediment as f64;
                }
                break;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_droplet_erodes_slope() {
        let mut heightmap = Tilemap::new_with(32, 32, 0.0f32);
        for y in 0..32 {
            for x in 0..32 {
                heightmap.set(x, y, (32.0 - x as f32) * 2.0 + (32.0 - y as f32) * 2.0);
            }
        }
        let before = heightmap.clone();

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let params = ErosionParams::default();
        let stats = simulate(&mut heightmap, &params, &mut rng);

        assert!(stats.total_eroded > 0.0);
        let changed = heightmap.iter().filter(|&(x, y, &h)| (h - *before.get(x, y)).abs() > 1e-4).count();
        assert!(changed > 0);
        assert!(heightmap.iter().all(|(_, _, h)| h.is_finite()));
    }

    #[test]
    fn test_flat_terrain_stays_flat() {
        let mut heightmap = Tilemap::new_with(16, 16, 5.0f32);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let stats = simulate(&mut heightmap, &ErosionParams::default(), &mut rng);
        assert_eq!(stats.total_eroded, 0.0);
        assert!(heightmap.iter().all(|(_, _, &h)| (h - 5.0).abs() < 1e-4));
    }
}

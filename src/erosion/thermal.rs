//! Thermal erosion: loose material slumps off slopes steeper than the talus angle.
//!
//! Each pass measures, for every cell, how far it stands above each lower
//! 4-neighbor beyond the stable talus height, and moves a fraction of that
//! excess downhill. All transfers of a pass are computed from the same
//! snapshot and applied together, so scan order never biases the result.

use crate::erosion::params::ErosionParams;
use crate::erosion::ErosionStats;
use crate::tilemap::Tilemap;

/// Run thermal erosion on a heightmap whose cells are `cell_size` world units apart.
pub fn simulate(heightmap: &mut Tilemap<f32>, params: &ErosionParams, cell_size: f32) -> ErosionStats {
    let talus_height = params.talus_angle.tan() * cell_size;
    let rate = params.thermal_rate.clamp(0.0, 0.5);

    let mut stats = ErosionStats {
        iterations: params.thermal_iterations,
        ..Default::default()
    };
    let mut delta = Tilemap::new_with(heightmap.width, heightmap.height, 0.0f32);

    for _ in 0..params.thermal_iterations {
        delta.fill(0.0);
        let mut moved_any = false;

        for (x, y, &h) in heightmap.iter() {
            let mut excess = [(0usize, 0usize, 0.0f32); 4];
            let mut excess_count = 0;
            let mut excess_total = 0.0;

            for (nx, ny) in heightmap.neighbors(x, y) {
                let diff = h - *heightmap.get(nx, ny);
                if diff > talus_height {
                    excess[excess_count] = (nx, ny, diff - talus_height);
                    excess_count += 1;
                    excess_total += diff - talus_height;
                }
            }
            if excess_count == 0 {
                continue;
            }

            // Split the outflow in proportion to each neighbor's excess, and
            // never move more than would level the steepest pair.
            let steepest = excess[..excess_count].iter().map(|e| e.2).fold(0.0f32, f32::max);
            let outflow = rate * steepest;
            for &(nx, ny, e) in &excess[..excess_count] {
                let share = outflow * e / excess_total;
                *delta.get_mut(nx, ny) += share;
            }
            *delta.get_mut(x, y) -= outflow;

            stats.total_eroded += outflow as f64;
            stats.max_erosion = stats.max_erosion.max(outflow);
            moved_any = true;
        }

        if !moved_any {
            break;
        }

        for (x, y, h) in heightmap.iter_mut() {
            let d = *delta.get(x, y);
            if d > 0.0 {
                stats.total_deposited += d as f64;
                stats.max_deposition = stats.max_deposition.max(d);
            }
            *h += d;
        }
        stats.steps_taken += 1;
    }

    stats
}

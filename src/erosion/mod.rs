//! Erosion simulation module
//!
//! Implements two complementary erosion techniques, run in this order:
//! - **Thermal erosion**: talus-angle slumping that softens cliffs left by the fractal
//! - **Hydraulic erosion**: particle-based water droplets that carve gullies and fill pits

pub mod hydraulic;
pub mod params;
pub mod thermal;
pub mod utils;

pub use params::{ErosionParams, ErosionPreset};

use crate::tilemap::Tilemap;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Statistics from erosion simulation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErosionStats {
    /// Total material eroded (in height units)
    pub total_eroded: f64,
    /// Total material deposited
    pub total_deposited: f64,
    /// Total number of simulation steps taken (passes or droplet steps)
    pub steps_taken: u64,
    /// Number of iterations/droplets processed
    pub iterations: usize,
    /// Maximum erosion at any single point
    pub max_erosion: f32,
    /// Maximum deposition at any single point
    pub max_deposition: f32,
}

impl ErosionStats {
    /// Fold another simulation's statistics into this one.
    pub fn merge(&mut self, other: &ErosionStats) {
        self.total_eroded += other.total_eroded;
        self.total_deposited += other.total_deposited;
        self.steps_taken += other.steps_taken;
        self.iterations += other.iterations;
        self.max_erosion = self.max_erosion.max(other.max_erosion);
        self.max_deposition = self.max_deposition.max(other.max_deposition);
    }
}

/// Erode a land heightmap in place.
///
/// `cell_size` is the distance between adjacent samples in world units; the
/// talus angle is converted to a height difference with it.
pub fn simulate_erosion(
    heightmap: &mut Tilemap<f32>,
    params: &ErosionParams,
    cell_size: f32,
    rng: &mut ChaCha8Rng,
) -> ErosionStats {
    let mut stats = ErosionStats::default();

    if params.enable_thermal {
        let thermal_stats = thermal::simulate(heightmap, params, cell_size);
        debug!(
            passes = thermal_stats.steps_taken,
            eroded = thermal_stats.total_eroded,
            "thermal erosion done"
        );
        stats.merge(&thermal_stats);
    }

    if params.enable_hydraulic {
        let hydraulic_stats = hydraulic::simulate(heightmap, params, rng);
        debug!(
            droplets = hydraulic_stats.iterations,
            eroded = hydraulic_stats.total_eroded,
            deposited = hydraulic_stats.total_deposited,
            "hydraulic erosion done"
        );
        stats.merge(&hydraulic_stats);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_disabled_params_leave_terrain_untouched() {
        let mut heightmap = Tilemap::new_with(8, 8, 0.0f32);
        heightmap.set(3, 3, 500.0);
        let before = heightmap.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let params = ErosionParams::from_preset(ErosionPreset::None);
        let stats = simulate_erosion(&mut heightmap, &params, 50.0, &mut rng);
        assert_eq!(stats, ErosionStats::default());
        assert!(heightmap.iter().all(|(x, y, &h)| h == *before.get(x, y)));
    }

    #[test]
    fn test_merge_keeps_maxima() {
        let mut a = ErosionStats { max_erosion: 2.0, total_eroded: 1.0, ..Default::default() };
        let b = ErosionStats { max_erosion: 1.0, total_eroded: 3.0, ..Default::default() };
        a.merge(&b);
        assert_eq!(a.max_erosion, 2.0);
        assert_eq!(a.total_eroded, 4.0);
    }
}

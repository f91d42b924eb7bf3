//! World data container module
//!
//! Runs the whole city pipeline and bundles its outputs into one struct:
//! terrain -> neighborhoods -> roads -> zoning -> buildings.

use std::sync::Arc;

use tracing::info;

use crate::buildings::{self, Buildings};
use crate::config::CityConfig;
use crate::erosion::ErosionStats;
use crate::error::Result;
use crate::neighborhoods::{self, Neighborhood};
use crate::road_network::{self, RoadNetwork};
use crate::seeds::WorldSeeds;
use crate::terrain::{self, Terrain};
use crate::zoning::{self, ZonedBlock};

/// All generated city data bundled together
#[derive(Clone, Debug)]
pub struct WorldData {
    /// Seeds used for generation (allows recreation)
    pub seeds: WorldSeeds,
    pub terrain: Arc<Terrain>,
    pub road_network: RoadNetwork,
    /// Neighborhood sites, primary first
    pub neighborhoods: Vec<Neighborhood>,
    pub zoned_blocks: Vec<ZonedBlock>,
    pub buildings: Buildings,
    /// What the erosion pass did to the raw heightmap
    pub erosion_stats: ErosionStats,
}

impl WorldData {
    /// Terrain extent in blocks: (width, depth)
    pub fn size_in_blocks(&self) -> (f32, f32) {
        (
            self.terrain.max_x() - self.terrain.min_x(),
            self.terrain.max_z() - self.terrain.min_z(),
        )
    }
}

/// Generate a complete city.
///
/// Every stage draws from its own RNG stream in `seeds`, so the same config
/// and seeds always give the same city.
pub fn generate_world(config: &CityConfig, seeds: &WorldSeeds) -> Result<WorldData> {
    config.validate()?;
    info!("Generating city with seed {}", seeds.master);

    let mut terrain_rng = seeds.terrain_rng();
    let (terrain, erosion_stats) = terrain::generate_terrain(&config.terrain, &mut terrain_rng);
    let terrain = Arc::new(terrain);

    let neighborhoods = neighborhoods::place_neighborhoods(&terrain, &config.neighborhoods);
    info!("Placed {} neighborhoods", neighborhoods.len());

    let mut roads_rng = seeds.roads_rng();
    let road_network = road_network::generate_road_network(
        Arc::clone(&terrain),
        &neighborhoods,
        &config.road_network,
        &config.neighborhoods,
        &mut roads_rng,
    )?;

    let mut zoning_rng = seeds.zoning_rng();
    let zoned_blocks = if config.zoned_blocks.is_present {
        zoning::zone_blocks(
            &road_network,
            &neighborhoods,
            &config.zoned_blocks,
            &config.neighborhoods,
            &mut zoning_rng,
        )
    } else {
        info!("Zoning disabled");
        zoning::zone_blocks(
            &RoadNetwork::new(Arc::clone(&terrain)),
            &neighborhoods,
            &config.zoned_blocks,
            &config.neighborhoods,
            &mut zoning_rng,
        )
    };

    let mut buildings_rng = seeds.buildings_rng();
    let buildings = buildings::generate_buildings(&terrain, &zoned_blocks, &mut buildings_rng);

    info!(
        neighborhoods = neighborhoods.len(),
        intersections = road_network.intersection_count(),
        blocks = zoned_blocks.len(),
        buildings = buildings.building_count(),
        "City generation complete"
    );

    Ok(WorldData {
        seeds: seeds.clone(),
        terrain,
        road_network,
        neighborhoods,
        zoned_blocks,
        buildings,
        erosion_stats,
    })
}

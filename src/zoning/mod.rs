//! Zoning: which blocks along the roads get lots, and how big buildings may be.
//!
//! A block is the unit cell whose top-left corner is `(x, z)`. It is zoned
//! when at least one of its four sides carries a road:
//!
//! ```text
//! top    (x, z)     - (x + 1, z)
//! bottom (x, z + 1) - (x + 1, z + 1)
//! left   (x, z)     - (x, z + 1)
//! right  (x + 1, z) - (x + 1, z + 1)
//! ```

pub mod layouts;

pub use layouts::{Lot, LotLayout, LAYOUTS};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::{NeighborhoodConfig, ZonedBlockConfig};
use crate::neighborhoods::Neighborhood;
use crate::road_network::RoadNetwork;
use crate::terrain::Terrain;
use crate::units::distance_decay_probability;

#[derive(Clone, Debug, PartialEq)]
pub struct ZonedBlock {
    pub x: i32,
    pub z: i32,
    pub build_probability: f32,
    pub max_stories: u32,
    pub has_top_road: bool,
    pub has_bottom_road: bool,
    pub has_left_road: bool,
    pub has_right_road: bool,
    pub layout: &'static LotLayout,
}

impl ZonedBlock {
    /// Whether the lot faces a side of this block that has a road.
    pub fn lot_touches_road(&self, lot: &Lot) -> bool {
        (self.has_top_road && lot.touches_top())
            || (self.has_bottom_road && lot.touches_bottom())
            || (self.has_left_road && lot.touches_left())
            || (self.has_right_road && lot.touches_right())
    }
}

/// Zone every block that borders a road, row by row.
///
/// Blocks whose corners are too steep for the drawn layout are left empty.
pub fn zone_blocks(
    network: &RoadNetwork,
    neighborhoods: &[Neighborhood],
    zoning_config: &ZonedBlockConfig,
    neighborhood_config: &NeighborhoodConfig,
    rng: &mut ChaCha8Rng,
) -> Vec<ZonedBlock> {
    let Some(bounds) = network.bounding_box() else {
        info!("No roads to zone along");
        return Vec::new();
    };

    let terrain = network.terrain();
    let half_extent = neighborhood_config.half_extent();
    let cap_radius = (terrain.max_x() - terrain.min_x()).max(terrain.max_z() - terrain.min_z()) / 2.0;

    let mut blocks = Vec::new();
    let mut too_steep = 0usize;
    for z in (bounds.min_z - 1)..=bounds.max_z {
        for x in (bounds.min_x - 1)..=bounds.max_x {
            let has_top_road = network.has_edge_between(x, z, x + 1, z, None);
            let has_bottom_road = network.has_edge_between(x, z + 1, x + 1, z + 1, None);
            let has_left_road = network.has_edge_between(x, z, x, z + 1, None);
            let has_right_road = network.has_edge_between(x + 1, z, x + 1, z + 1, None);
            if !(has_top_road || has_bottom_road || has_left_road || has_right_road) {
                continue;
            }

            let Some(steepness) = corner_steepness(terrain, x, z) else {
                continue;
            };
            let layout = &LAYOUTS[rng.gen_range(0..LAYOUTS.len())];
            if steepness > layout.max_corner_steepness {
                too_steep += 1;
                continue;
            }

            let (center_x, center_z) = (x as f32 + 0.5, z as f32 + 0.5);
            blocks.push(ZonedBlock {
                x,
                z,
                build_probability: build_probability(
                    neighborhoods,
                    center_x,
                    center_z,
                    zoning_config.block_distance_decay_begins,
                    half_extent,
                ),
                max_stories: story_cap(
                    neighborhoods,
                    center_x,
                    center_z,
                    zoning_config.max_building_stories,
                    cap_radius,
                ),
                has_top_road,
                has_bottom_road,
                has_left_road,
                has_right_road,
                layout,
            });
        }
    }

    debug!(too_steep, "blocks rejected for steepness");
    info!("Zoned {} blocks", blocks.len());
    blocks
}

/// Spread between the highest and lowest land corner of a block, or `None`
/// if any corner is off the terrain.
pub fn corner_steepness(terrain: &Terrain, x: i32, z: i32) -> Option<f32> {
    let (x, z) = (x as f32, z as f32);
    let corners = [
        terrain.land_height_at(x, z)?,
        terrain.land_height_at(x + 1.0, z)?,
        terrain.land_height_at(x, z + 1.0)?,
        terrain.land_height_at(x + 1.0, z + 1.0)?,
    ];
    let (min, max) = corners
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)));
    Some(max - min)
}

/// Chance that a lot in a block centered at `(x, z)` gets a building, by
/// distance to the nearest neighborhood.
pub fn build_probability(neighborhoods: &[Neighborhood], x: f32, z: f32, decay_begins: f32, half_extent: f32) -> f32 {
    neighborhoods
        .iter()
        .map(|n| n.distance_to(x, z))
        .min_by(f32::total_cmp)
        .map_or(0.0, |distance| distance_decay_probability(distance, decay_begins, half_extent).max(0.0))
}

/// Tallest building allowed at `(x, z)`. Shrinks with squared distance from
/// the first neighborhood, reaching a single story at `radius`.
pub fn story_cap(neighborhoods: &[Neighborhood], x: f32, z: f32, max_stories: u32, radius: f32) -> u32 {
    let Some(primary) = neighborhoods.first() else {
        return 1;
    };
    let distance = primary.distance_to(x, z);
    let falloff = (1.0 - (distance * distance) / (radius * radius).max(f32::EPSILON)).max(0.0);
    ((max_stories as f32 * falloff).ceil() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road_network::GradeType;
    use crate::terrain::TerrainCell;
    use crate::tilemap::Tilemap;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn flat_network() -> RoadNetwork {
        RoadNetwork::new(Arc::new(Terrain::flat(12, 12, 0.0, 0.5)))
    }

    fn zone(network: &RoadNetwork, seed: u64) -> Vec<ZonedBlock> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        zone_blocks(
            network,
            &[Neighborhood::new(0, 0)],
            &ZonedBlockConfig::default(),
            &NeighborhoodConfig::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_empty_network_zones_nothing() {
        assert!(zone(&flat_network(), 1).is_empty());
    }

    #[test]
    fn test_road_flags_match_sides() {
        let mut network = flat_network();
        network.add_edge(0, 0, 1, 0, 0.0, 1.0, GradeType::Surface).unwrap();

        let blocks = zone(&network, 2);
        assert_eq!(blocks.len(), 2);

        let below = blocks.iter().find(|b| (b.x, b.z) == (0, 0)).unwrap();
        assert!(below.has_top_road && !below.has_bottom_road);
        assert!(!below.has_left_road && !below.has_right_road);

        let above = blocks.iter().find(|b| (b.x, b.z) == (0, -1)).unwrap();
        assert!(above.has_bottom_road && !above.has_top_road);
    }

    #[test]
    fn test_vertical_road_zones_left_and_right() {
        let mut network = flat_network();
        network.add_edge(2, 1, 2, 2, 0.0, 1.0, GradeType::Surface).unwrap();

        let blocks = zone(&network, 3);
        let coords: Vec<_> = blocks.iter().map(|b| (b.x, b.z)).collect();
        assert_eq!(coords, vec![(1, 1), (2, 1)]);
        assert!(blocks[0].has_right_road);
        assert!(blocks[1].has_left_road);
    }

    #[test]
    fn test_steep_blocks_are_skipped() {
        let mut cells = Tilemap::new_with(25, 25, TerrainCell::default());
        for (column, _, cell) in cells.iter_mut() {
            cell.land_height = column as f32 * 5.0;
        }
        let mut network = RoadNetwork::new(Arc::new(Terrain::new(cells, 0.5)));
        network.add_edge(0, 0, 0, 1, 0.0, 1.0, GradeType::Surface).unwrap();

        // 10 m between corners exceeds every layout
        for seed in 0..5 {
            assert!(zone(&network, seed).is_empty());
        }
    }

    #[test]
    fn test_build_probability_decays() {
        let neighborhoods = [Neighborhood::new(0, 0), Neighborhood::new(20, 0)];
        assert_eq!(build_probability(&neighborhoods, 0.5, 0.5, 4.0, 8.0), 1.0);
        assert_eq!(build_probability(&neighborhoods, 19.5, 0.5, 4.0, 8.0), 1.0);
        let mid = build_probability(&neighborhoods, 6.5, 0.5, 4.0, 8.0);
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(build_probability(&neighborhoods, 10.0, 30.0, 4.0, 8.0), 0.0);
        assert_eq!(build_probability(&[], 0.0, 0.0, 4.0, 8.0), 0.0);
    }

    #[test]
    fn test_story_cap_shrinks_with_distance() {
        let neighborhoods = [Neighborhood::new(0, 0)];
        assert_eq!(story_cap(&neighborhoods, 0.0, 0.0, 40, 10.0), 40);
        let near = story_cap(&neighborhoods, 3.0, 0.0, 40, 10.0);
        let far = story_cap(&neighborhoods, 8.0, 0.0, 40, 10.0);
        assert!(near > far);
        assert_eq!(story_cap(&neighborhoods, 12.0, 0.0, 40, 10.0), 1);
    }
}

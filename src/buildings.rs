//! Building placement on zoned lots
//!
//! Lots sit inside their block, inset by half a street on every side. A lot
//! gets a building when it faces a road, stands on dry and gentle ground, and
//! wins a draw against its block's build probability.

use std::collections::BTreeMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::terrain::Terrain;
use crate::units::{BLOCK_DEPTH, BLOCK_WIDTH, HALF_STREET_DEPTH_FRACTION, HALF_STREET_WIDTH_FRACTION};
use crate::zoning::{Lot, ZonedBlock};

/// Steepest lot a building is placed on: corner height spread over lot diagonal.
pub const MAX_LOT_GRADE: f32 = 0.1;

pub const MIN_STORY_HEIGHT: f32 = 3.0;
pub const MAX_STORY_HEIGHT: f32 = 4.2;

/// Buildings at least this tall may carry an antenna.
pub const MIN_STORIES_FOR_ANTENNA: u32 = 25;
pub const ANTENNA_PROBABILITY: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoofStyle {
    Flat,
    Antenna,
}

/// A single building on a lot, in map coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    /// Land height the ground floor sits on
    pub floor_height: f32,
    /// Height from floor to roof, in world units
    pub height: f32,
    pub stories: u32,
    pub roof_style: RoofStyle,
}

impl Building {
    pub fn center(&self) -> (f32, f32) {
        ((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }
}

/// All buildings, grouped by the block they stand on.
#[derive(Clone, Debug, Default)]
pub struct Buildings {
    blocks: BTreeMap<(i32, i32), Vec<Building>>,
    building_count: usize,
}

impl Buildings {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, x: i32, z: i32, building: Building) {
        self.blocks.entry((x, z)).or_default().push(building);
        self.building_count += 1;
    }

    /// Buildings on the block whose top-left corner is `(x, z)`.
    pub fn block_at_coordinates(&self, x: i32, z: i32) -> Option<&[Building]> {
        self.blocks.get(&(x, z)).map(Vec::as_slice)
    }

    pub fn building_count(&self) -> usize {
        self.building_count
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.blocks.values().flatten()
    }

    pub fn tallest(&self) -> Option<&Building> {
        self.iter().max_by(|a, b| a.height.total_cmp(&b.height))
    }
}

/// Place buildings on the lots of every zoned block.
pub fn generate_buildings(terrain: &Terrain, zoned_blocks: &[ZonedBlock], rng: &mut ChaCha8Rng) -> Buildings {
    let mut buildings = Buildings::new();

    for block in zoned_blocks {
        for lot in block.layout.lots {
            if let Some(building) = place_on_lot(terrain, block, lot, rng) {
                buildings.add(block.x, block.z, building);
            }
        }
    }

    info!("Placed {} buildings on {} blocks", buildings.building_count(), buildings.block_count());
    buildings
}

fn place_on_lot(terrain: &Terrain, block: &ZonedBlock, lot: &Lot, rng: &mut ChaCha8Rng) -> Option<Building> {
    if !block.lot_touches_road(lot) {
        return None;
    }

    let (left, top, right, bottom) = lot_bounds(block, lot);
    let corners = [(left, top), (right, top), (left, bottom), (right, bottom)];
    if !corners.iter().all(|&(x, z)| terrain.is_dry_at(x, z)) {
        return None;
    }

    let mut floor_height = f32::MAX;
    let mut highest = f32::MIN;
    for &(x, z) in &corners {
        let h = terrain.land_height_at(x, z)?;
        floor_height = floor_height.min(h);
        highest = highest.max(h);
    }
    let width = (right - left) * BLOCK_WIDTH;
    let depth = (bottom - top) * BLOCK_DEPTH;
    let grade = (highest - floor_height) / (width * width + depth * depth).sqrt();
    if grade > MAX_LOT_GRADE {
        return None;
    }

    if rng.gen::<f32>() >= block.build_probability {
        return None;
    }

    let max_stories = block.max_stories.min(lot.max_stories).max(1);
    let stories = rng.gen_range(1..=max_stories);
    let story_height = rng.gen_range(MIN_STORY_HEIGHT..MAX_STORY_HEIGHT);
    let roof_style = if stories >= MIN_STORIES_FOR_ANTENNA && rng.gen::<f32>() < ANTENNA_PROBABILITY {
        RoofStyle::Antenna
    } else {
        RoofStyle::Flat
    };

    Some(Building {
        left,
        top,
        right,
        bottom,
        floor_height,
        height: stories as f32 * story_height,
        stories,
        roof_style,
    })
}

/// Map-space rectangle of a lot: `(left, top, right, bottom)`.
pub fn lot_bounds(block: &ZonedBlock, lot: &Lot) -> (f32, f32, f32, f32) {
    let inner_width = 1.0 - 2.0 * HALF_STREET_WIDTH_FRACTION;
    let inner_depth = 1.0 - 2.0 * HALF_STREET_DEPTH_FRACTION;
    let origin_x = block.x as f32 + HALF_STREET_WIDTH_FRACTION;
    let origin_z = block.z as f32 + HALF_STREET_DEPTH_FRACTION;
    (
        origin_x + lot.left * inner_width,
        origin_z + lot.top * inner_depth,
        origin_x + lot.right * inner_width,
        origin_z + lot.bottom * inner_depth,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoning::LAYOUTS;
    use rand::SeedableRng;

    fn block(layout_index: usize, build_probability: f32, max_stories: u32) -> ZonedBlock {
        ZonedBlock {
            x: 0,
            z: 0,
            build_probability,
            max_stories,
            has_top_road: true,
            has_bottom_road: false,
            has_left_road: false,
            has_right_road: false,
            layout: &LAYOUTS[layout_index],
        }
    }

    #[test]
    fn test_only_road_facing_lots_are_built() {
        let terrain = Terrain::flat(8, 8, 0.0, 0.5);
        // Stacked halves: only the top half faces the road
        let blocks = [block(2, 1.0, 10)];
        let buildings = generate_buildings(&terrain, &blocks, &mut ChaCha8Rng::seed_from_u64(1));

        assert_eq!(buildings.building_count(), 1);
        let built = &buildings.block_at_coordinates(0, 0).unwrap()[0];
        assert!(built.top < 0.1 && built.bottom < 0.6);
        assert!(buildings.block_at_coordinates(1, 0).is_none());
    }

    #[test]
    fn test_dense_layout_skips_interior_lots() {
        let terrain = Terrain::flat(8, 8, 0.0, 0.5);
        let mut dense = block(6, 1.0, 40);
        dense.has_left_road = true;
        let buildings = generate_buildings(&terrain, &[dense], &mut ChaCha8Rng::seed_from_u64(2));
        // Five along the top, plus the three below them in the left column
        assert_eq!(buildings.building_count(), 8);
    }

    #[test]
    fn test_stories_respect_caps() {
        let terrain = Terrain::flat(8, 8, 2.0, 0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let buildings = generate_buildings(&terrain, &[block(3, 1.0, 40)], &mut rng);
            for building in buildings.iter() {
                // Thirds are capped at 20 stories
                assert!(building.stories >= 1 && building.stories <= 20);
                let per_story = building.height / building.stories as f32;
                assert!((MIN_STORY_HEIGHT - 1e-4..MAX_STORY_HEIGHT + 1e-4).contains(&per_story));
                assert_eq!(building.floor_height, 2.0);
                assert_eq!(building.roof_style, RoofStyle::Flat);
            }
        }
    }

    #[test]
    fn test_antennas_only_on_tall_buildings() {
        let terrain = Terrain::flat(8, 8, 0.0, 0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut antennas = 0;
        for _ in 0..400 {
            let buildings = generate_buildings(&terrain, &[block(0, 1.0, 40)], &mut rng);
            for building in buildings.iter() {
                if building.roof_style == RoofStyle::Antenna {
                    assert!(building.stories >= MIN_STORIES_FOR_ANTENNA);
                    antennas += 1;
                }
            }
        }
        assert!(antennas > 0);
    }

    #[test]
    fn test_zero_probability_builds_nothing() {
        let terrain = Terrain::flat(8, 8, 0.0, 0.5);
        let buildings = generate_buildings(&terrain, &[block(0, 0.0, 10)], &mut ChaCha8Rng::seed_from_u64(4));
        assert_eq!(buildings.building_count(), 0);
    }

    #[test]
    fn test_lots_are_inset_from_streets() {
        let (left, top, right, bottom) = lot_bounds(&block(0, 1.0, 1), &LAYOUTS[0].lots[0]);
        assert!((left - HALF_STREET_WIDTH_FRACTION).abs() < 1e-6);
        assert!((top - HALF_STREET_DEPTH_FRACTION).abs() < 1e-6);
        assert!((right - (1.0 - HALF_STREET_WIDTH_FRACTION)).abs() < 1e-6);
        assert!((bottom - (1.0 - HALF_STREET_DEPTH_FRACTION)).abs() < 1e-6);
    }
}

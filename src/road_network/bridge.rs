//! Straight bridges across water.

use crate::road_network::RoadNetwork;

/// Largest difference allowed between the land heights at the two ends.
pub const MAX_TERMINAL_HEIGHT_DIFFERENCE: f32 = 5.0;

/// Minimum clearance between the deck and the highest water surface crossed.
pub const MIN_WATER_CLEARANCE: f32 = 8.0;

/// A water crossing between two dry points on one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bridge {
    pub start_x: i32,
    pub start_z: i32,
    pub end_x: i32,
    pub end_z: i32,
    /// Constant height of the whole deck
    pub deck_height: f32,
}

impl Bridge {
    /// Unit direction from start to end.
    pub fn direction(&self) -> (i32, i32) {
        ((self.end_x - self.start_x).signum(), (self.end_z - self.start_z).signum())
    }

    /// Number of unit segments in the crossing.
    pub fn span(&self) -> i32 {
        (self.end_x - self.start_x).abs() + (self.end_z - self.start_z).abs()
    }
}

/// Try to bridge from dry `(start_x, start_z)` across the water that begins
/// one step away in direction `(dx, dz)`.
///
/// Fails if the start is wet, the next point is dry, the crossing leaves the
/// allowed bound or runs into an existing intersection, or the two dry ends
/// differ in height by more than [`MAX_TERMINAL_HEIGHT_DIFFERENCE`].
pub fn build_bridge(network: &RoadNetwork, start_x: i32, start_z: i32, dx: i32, dz: i32) -> Option<Bridge> {
    debug_assert!(dx.abs() + dz.abs() == 1, "bridges run along one axis");

    let terrain = network.terrain();
    if !network.is_within_allowed_bounds(start_x, start_z) || !terrain.is_dry_at(start_x as f32, start_z as f32) {
        return None;
    }

    let (mut x, mut z) = (start_x + dx, start_z + dz);
    if !terrain.is_underwater_at(x as f32, z as f32) {
        return None;
    }

    let mut max_water_surface = f32::MIN;
    while terrain.is_underwater_at(x as f32, z as f32) {
        if !network.is_within_allowed_bounds(x, z) || network.has_intersection(x, z) {
            return None;
        }
        max_water_surface = max_water_surface.max(terrain.height_at(x as f32, z as f32)?);
        x += dx;
        z += dz;
    }

    if !network.is_within_allowed_bounds(x, z) || !terrain.is_dry_at(x as f32, z as f32) {
        return None;
    }

    let start_height = terrain.height_at(start_x as f32, start_z as f32)?;
    let end_height = terrain.height_at(x as f32, z as f32)?;
    if (start_height - end_height).abs() > MAX_TERMINAL_HEIGHT_DIFFERENCE {
        return None;
    }

    Some(Bridge {
        start_x,
        start_z,
        end_x: x,
        end_z: z,
        deck_height: start_height.max(end_height).max(max_water_surface + MIN_WATER_CLEARANCE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road_network::GradeType;
    use crate::terrain::{Terrain, TerrainCell};
    use crate::tilemap::Tilemap;
    use std::sync::Arc;

    /// 8x8 blocks at scale 1.0, water at x = 1 and x = 2, land height given per side.
    fn river(west: f32, east: f32) -> RoadNetwork {
        let mut cells = Tilemap::new_with(9, 9, TerrainCell::default());
        for (column, _, cell) in cells.iter_mut() {
            *cell = match column {
                5 | 6 => TerrainCell { land_height: 0.0, water_height: 3.0 },
                c if c < 5 => TerrainCell { land_height: west, water_height: 0.0 },
                _ => TerrainCell { land_height: east, water_height: 0.0 },
            };
        }
        RoadNetwork::new(Arc::new(Terrain::new(cells, 1.0)))
    }

    #[test]
    fn test_bridge_spans_river() {
        let network = river(4.0, 6.0);
        let bridge = build_bridge(&network, 0, 0, 1, 0).unwrap();
        assert_eq!((bridge.end_x, bridge.end_z), (3, 0));
        assert_eq!(bridge.span(), 3);
        assert_eq!(bridge.direction(), (1, 0));
        assert_eq!(bridge.deck_height, 11.0);
    }

    #[test]
    fn test_bridge_works_in_reverse() {
        let network = river(4.0, 6.0);
        let bridge = build_bridge(&network, 3, -2, -1, 0).unwrap();
        assert_eq!((bridge.end_x, bridge.end_z), (0, -2));
    }

    #[test]
    fn test_bridge_needs_water_next() {
        let network = river(4.0, 6.0);
        assert_eq!(build_bridge(&network, -1, 0, 1, 0), None);
        assert_eq!(build_bridge(&network, 0, 0, 0, 1), None);
        // Starting in the water
        assert_eq!(build_bridge(&network, 1, 0, 1, 0), None);
    }

    #[test]
    fn test_bridge_rejects_uneven_banks() {
        let network = river(2.0, 9.0);
        assert_eq!(build_bridge(&network, 0, 0, 1, 0), None);
    }

    #[test]
    fn test_bridge_blocked_by_existing_intersection() {
        let mut network = river(4.0, 6.0);
        network.add_edge(1, 1, 1, 0, 20.0, 1.0, GradeType::Bridge).unwrap();
        assert_eq!(build_bridge(&network, 0, 0, 1, 0), None);
        assert!(build_bridge(&network, 0, 2, 1, 0).is_some());
    }

    #[test]
    fn test_high_banks_set_deck_height() {
        let network = river(30.0, 32.0);
        let bridge = build_bridge(&network, 0, 0, 1, 0).unwrap();
        assert_eq!(bridge.deck_height, 32.0);
    }
}

//! Virtual road graph synthesized from terrain.
//!
//! Every dry point inside the allowed bound is a candidate intersection.
//! Neighbors are joined where a road could be laid, either a unit segment
//! within the slope limit or a bridge across water. Nothing is stored; edges
//! are worked out on demand while a path search runs.

use crate::pathfinding::{PathEdge, PathGraph};
use crate::road_network::{build_bridge, is_segment_buildable, RoadNetwork};

/// Extra cost per unit of bridge, so paths only cross water when they must.
pub const BRIDGE_COST_MULTIPLIER: f32 = 2.0;

const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub struct TerrainCandidateGraph<'a> {
    network: &'a RoadNetwork,
    max_road_angle: f32,
}

impl<'a> TerrainCandidateGraph<'a> {
    pub fn new(network: &'a RoadNetwork, max_road_angle: f32) -> Self {
        Self { network, max_road_angle }
    }
}

impl PathGraph for TerrainCandidateGraph<'_> {
    fn has_intersection(&self, x: i32, z: i32) -> bool {
        self.network.is_within_allowed_bounds(x, z) && self.network.terrain().is_dry_at(x as f32, z as f32)
    }

    fn edges_from(&self, x: i32, z: i32) -> Vec<PathEdge> {
        let terrain = self.network.terrain();
        let mut edges = Vec::with_capacity(DIRECTIONS.len());

        for (dx, dz) in DIRECTIONS {
            let (nx, nz) = (x + dx, z + dz);

            if terrain.is_underwater_at(nx as f32, nz as f32) {
                if let Some(bridge) = build_bridge(self.network, x, z, dx, dz) {
                    edges.push(PathEdge {
                        dest_x: bridge.end_x,
                        dest_z: bridge.end_z,
                        distance: bridge.span() as f32 * BRIDGE_COST_MULTIPLIER,
                    });
                }
            } else if self.has_intersection(nx, nz) && is_segment_buildable(terrain, x, z, nx, nz, self.max_road_angle) {
                edges.push(PathEdge { dest_x: nx, dest_z: nz, distance: 1.0 });
            }
        }

        edges
    }
}

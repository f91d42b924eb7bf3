//! Road network: a sparse graph of intersections at integer map coordinates.
//!
//! Intersections live in a dense array covering the allowed bound, one block
//! inside the terrain edge on every side:
//!
//! ```text
//! index = (z - min_allowed_z) * allowed_width + (x - min_allowed_x)
//! ```
//!
//! Edges are undirected and always stored on both endpoints. An intersection
//! exists exactly while it has at least one edge.

pub mod bridge;
pub mod generator;
pub mod terrain_candidates;

pub use bridge::{build_bridge, Bridge};
pub use generator::generate_road_network;
pub use terrain_candidates::TerrainCandidateGraph;

use std::sync::Arc;

use crate::error::{CityError, Result};
use crate::pathfinding::{PathEdge, PathGraph};
use crate::terrain::Terrain;
use crate::units::{BLOCK_DEPTH, HALF_STREET_DEPTH_FRACTION, HALF_STREET_WIDTH_FRACTION};

/// Whether a road sits on the ground or spans water.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GradeType {
    Surface,
    Bridge,
}

/// One direction of an undirected road edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub dest_x: i32,
    pub dest_z: i32,
    pub distance: f32,
    pub grade_type: GradeType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Intersection {
    pub height: f32,
    pub grade_type: GradeType,
    edges: Vec<Edge>,
}

impl Intersection {
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Smallest rectangle containing every intersection ever added.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl BoundingBox {
    fn around(x: i32, z: i32) -> Self {
        Self { min_x: x, max_x: x, min_z: z, max_z: z }
    }

    fn include(&mut self, x: i32, z: i32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }
}

#[derive(Clone, Debug)]
pub struct RoadNetwork {
    terrain: Arc<Terrain>,
    min_allowed_x: i32,
    max_allowed_x: i32,
    min_allowed_z: i32,
    max_allowed_z: i32,
    intersections: Vec<Option<Intersection>>,
    intersection_count: usize,
    edge_count: usize,
    bounding_box: Option<BoundingBox>,
}

impl RoadNetwork {
    /// An empty network over `terrain`.
    pub fn new(terrain: Arc<Terrain>) -> Self {
        let min_allowed_x = terrain.min_x().ceil() as i32 + 1;
        let max_allowed_x = terrain.max_x().floor() as i32 - 1;
        let min_allowed_z = terrain.min_z().ceil() as i32 + 1;
        let max_allowed_z = terrain.max_z().floor() as i32 - 1;

        let width = (max_allowed_x - min_allowed_x + 1).max(0) as usize;
        let depth = (max_allowed_z - min_allowed_z + 1).max(0) as usize;

        Self {
            terrain,
            min_allowed_x,
            max_allowed_x,
            min_allowed_z,
            max_allowed_z,
            intersections: vec![None; width * depth],
            intersection_count: 0,
            edge_count: 0,
            bounding_box: None,
        }
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn min_allowed_x(&self) -> i32 {
        self.min_allowed_x
    }

    pub fn max_allowed_x(&self) -> i32 {
        self.max_allowed_x
    }

    pub fn min_allowed_z(&self) -> i32 {
        self.min_allowed_z
    }

    pub fn max_allowed_z(&self) -> i32 {
        self.max_allowed_z
    }

    pub fn is_within_allowed_bounds(&self, x: i32, z: i32) -> bool {
        x >= self.min_allowed_x && x <= self.max_allowed_x && z >= self.min_allowed_z && z <= self.max_allowed_z
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        if !self.is_within_allowed_bounds(x, z) {
            return None;
        }
        let width = (self.max_allowed_x - self.min_allowed_x + 1) as usize;
        Some((z - self.min_allowed_z) as usize * width + (x - self.min_allowed_x) as usize)
    }

    fn check_bounds(&self, x: i32, z: i32) -> Result<usize> {
        self.index(x, z).ok_or(CityError::OutOfBounds {
            x,
            z,
            min_x: self.min_allowed_x,
            max_x: self.max_allowed_x,
            min_z: self.min_allowed_z,
            max_z: self.max_allowed_z,
        })
    }

    pub fn intersection(&self, x: i32, z: i32) -> Option<&Intersection> {
        self.index(x, z).and_then(|i| self.intersections[i].as_ref())
    }

    pub fn has_intersection(&self, x: i32, z: i32) -> bool {
        self.intersection(x, z).is_some()
    }

    pub fn get_intersection_grade_type(&self, x: i32, z: i32) -> Option<GradeType> {
        self.intersection(x, z).map(|i| i.grade_type)
    }

    /// Height of the road surface at a map point, or `None` off the network.
    ///
    /// Exact at intersections. Along an edge, the road stays flat for half a
    /// street width from each end (the intersection pad) and slopes linearly
    /// in between.
    pub fn get_road_height(&self, x: f32, z: f32) -> Option<f32> {
        let x0 = x.floor();
        let z0 = z.floor();
        let fx = x - x0;
        let fz = z - z0;
        let (ix, iz) = (x0 as i32, z0 as i32);

        if fx == 0.0 && fz == 0.0 {
            return self.intersection(ix, iz).map(|i| i.height);
        }

        let (end_x, end_z, t, margin) = if fz == 0.0 {
            (ix + 1, iz, fx, HALF_STREET_WIDTH_FRACTION)
        } else if fx == 0.0 {
            (ix, iz + 1, fz, HALF_STREET_DEPTH_FRACTION)
        } else {
            return None;
        };

        if !self.has_edge_between(ix, iz, end_x, end_z, None) {
            return None;
        }
        let start_height = self.intersection(ix, iz)?.height;
        let end_height = self.intersection(end_x, end_z)?.height;

        let height = if t <= margin {
            start_height
        } else if t >= 1.0 - margin {
            end_height
        } else {
            let along = (t - margin) / (1.0 - 2.0 * margin);
            start_height + (end_height - start_height) * along
        };
        Some(height)
    }

    /// Connect two points with a road, creating intersections as needed.
    ///
    /// A new intersection on dry land takes the terrain height and a surface
    /// grade; one over water takes `non_terrain_height` and a bridge grade.
    /// Adding an edge that already exists does nothing.
    pub fn add_edge(
        &mut self,
        x1: i32,
        z1: i32,
        x2: i32,
        z2: i32,
        non_terrain_height: f32,
        distance: f32,
        grade_type: GradeType,
    ) -> Result<()> {
        let first = self.check_bounds(x1, z1)?;
        let second = self.check_bounds(x2, z2)?;

        if self.has_edge_between(x1, z1, x2, z2, None) {
            return Ok(());
        }

        self.ensure_intersection(first, x1, z1, non_terrain_height);
        self.ensure_intersection(second, x2, z2, non_terrain_height);

        if let Some(intersection) = self.intersections[first].as_mut() {
            intersection.edges.push(Edge { dest_x: x2, dest_z: z2, distance, grade_type });
        }
        if let Some(intersection) = self.intersections[second].as_mut() {
            intersection.edges.push(Edge { dest_x: x1, dest_z: z1, distance, grade_type });
        }
        self.edge_count += 1;
        Ok(())
    }

    fn ensure_intersection(&mut self, index: usize, x: i32, z: i32, non_terrain_height: f32) {
        if self.intersections[index].is_some() {
            return;
        }

        let (fx, fz) = (x as f32, z as f32);
        let (height, grade_type) = if self.terrain.is_underwater_at(fx, fz) {
            (non_terrain_height, GradeType::Bridge)
        } else {
            (self.terrain.height_at(fx, fz).unwrap_or(non_terrain_height), GradeType::Surface)
        };

        self.intersections[index] = Some(Intersection { height, grade_type, edges: Vec::new() });
        self.intersection_count += 1;
        match self.bounding_box.as_mut() {
            Some(bounds) => bounds.include(x, z),
            None => self.bounding_box = Some(BoundingBox::around(x, z)),
        }
    }

    /// Remove the road between two points from both ends. Intersections left
    /// without edges are removed too.
    pub fn remove_edge(&mut self, x1: i32, z1: i32, x2: i32, z2: i32) {
        let (Some(first), Some(second)) = (self.index(x1, z1), self.index(x2, z2)) else {
            return;
        };
        if !self.has_edge_between(x1, z1, x2, z2, None) {
            return;
        }

        self.detach(first, x2, z2);
        self.detach(second, x1, z1);
        self.edge_count -= 1;
    }

    fn detach(&mut self, index: usize, dest_x: i32, dest_z: i32) {
        let now_empty = match self.intersections[index].as_mut() {
            Some(intersection) => {
                intersection.edges.retain(|e| !(e.dest_x == dest_x && e.dest_z == dest_z));
                intersection.edges.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.intersections[index] = None;
            self.intersection_count -= 1;
        }
    }

    pub fn edge_between(&self, x1: i32, z1: i32, x2: i32, z2: i32) -> Option<&Edge> {
        self.intersection(x1, z1)?
            .edges
            .iter()
            .find(|e| e.dest_x == x2 && e.dest_z == z2)
    }

    /// Whether a road joins the two points, optionally of a specific grade.
    pub fn has_edge_between(&self, x1: i32, z1: i32, x2: i32, z2: i32, grade_type: Option<GradeType>) -> bool {
        match self.edge_between(x1, z1, x2, z2) {
            Some(edge) => grade_type.map_or(true, |g| edge.grade_type == g),
            None => false,
        }
    }

    pub fn edges_from(&self, x: i32, z: i32) -> &[Edge] {
        self.intersection(x, z).map_or(&[], |i| i.edges.as_slice())
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    pub fn min_bounding_x(&self) -> Option<i32> {
        self.bounding_box.map(|b| b.min_x)
    }

    pub fn max_bounding_x(&self) -> Option<i32> {
        self.bounding_box.map(|b| b.max_x)
    }

    pub fn min_bounding_z(&self) -> Option<i32> {
        self.bounding_box.map(|b| b.min_z)
    }

    pub fn max_bounding_z(&self) -> Option<i32> {
        self.bounding_box.map(|b| b.max_z)
    }

    pub fn intersection_count(&self) -> usize {
        self.intersection_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.intersection_count == 0
    }

    /// Every intersection with its coordinates, row by row.
    pub fn intersections(&self) -> impl Iterator<Item = (i32, i32, &Intersection)> {
        let width = (self.max_allowed_x - self.min_allowed_x + 1).max(1) as usize;
        let (min_x, min_z) = (self.min_allowed_x, self.min_allowed_z);
        self.intersections.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref()
                .map(|intersection| (min_x + (i % width) as i32, min_z + (i / width) as i32, intersection))
        })
    }
}

/// Whether a unit road segment could be laid on the terrain: both ends and
/// the midpoint dry, and the climb no steeper than `max_road_angle` radians.
pub fn is_segment_buildable(terrain: &Terrain, x1: i32, z1: i32, x2: i32, z2: i32, max_road_angle: f32) -> bool {
    let (ax, az) = (x1 as f32, z1 as f32);
    let (bx, bz) = (x2 as f32, z2 as f32);
    if !terrain.is_dry_at(ax, az) || !terrain.is_dry_at(bx, bz) || !terrain.is_dry_at((ax + bx) / 2.0, (az + bz) / 2.0) {
        return false;
    }

    match (terrain.height_at(ax, az), terrain.height_at(bx, bz)) {
        (Some(start), Some(end)) => (end - start).abs().atan2(BLOCK_DEPTH) <= max_road_angle,
        _ => false,
    }
}

impl PathGraph for RoadNetwork {
    fn has_intersection(&self, x: i32, z: i32) -> bool {
        RoadNetwork::has_intersection(self, x, z)
    }

    fn edges_from(&self, x: i32, z: i32) -> Vec<PathEdge> {
        RoadNetwork::edges_from(self, x, z)
            .iter()
            .map(|e| PathEdge { dest_x: e.dest_x, dest_z: e.dest_z, distance: e.distance })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainCell;
    use crate::tilemap::Tilemap;

    fn flat_network() -> RoadNetwork {
        RoadNetwork::new(Arc::new(Terrain::flat(8, 8, 5.0, 0.5)))
    }

    /// 8x8 blocks at scale 1.0 with a wet column at x = 1.
    fn river_network() -> RoadNetwork {
        let mut cells = Tilemap::new_with(9, 9, TerrainCell { land_height: 5.0, water_height: 0.0 });
        for row in 0..9 {
            cells.set(5, row, TerrainCell { land_height: 1.0, water_height: 2.0 });
        }
        RoadNetwork::new(Arc::new(Terrain::new(cells, 1.0)))
    }

    #[test]
    fn test_allowed_bounds_are_one_inside_terrain() {
        let network = flat_network();
        assert_eq!((network.min_allowed_x(), network.max_allowed_x()), (-3, 3));
        assert_eq!((network.min_allowed_z(), network.max_allowed_z()), (-3, 3));
    }

    #[test]
    fn test_edges_are_symmetric() {
        let mut network = flat_network();
        network.add_edge(0, 0, 1, 0, 0.0, 1.0, GradeType::Surface).unwrap();

        assert!(network.has_edge_between(0, 0, 1, 0, None));
        assert!(network.has_edge_between(1, 0, 0, 0, None));
        assert!(network.has_edge_between(1, 0, 0, 0, Some(GradeType::Surface)));
        assert!(!network.has_edge_between(1, 0, 0, 0, Some(GradeType::Bridge)));
        assert_eq!(network.edge_count(), 1);

        network.remove_edge(1, 0, 0, 0);
        assert!(!network.has_edge_between(0, 0, 1, 0, None));
        assert!(!network.has_edge_between(1, 0, 0, 0, None));
        assert_eq!(network.edge_count(), 0);
    }

    #[test]
    fn test_orphaned_intersections_are_removed() {
        let mut network = flat_network();
        network.add_edge(0, 0, 1, 0, 0.0, 1.0, GradeType::Surface).unwrap();
        network.add_edge(1, 0, 1, 1, 0.0, 1.0, GradeType::Surface).unwrap();
        assert_eq!(network.intersection_count(), 3);

        network.remove_edge(0, 0, 1, 0);
        assert!(!network.has_intersection(0, 0));
        assert!(network.has_intersection(1, 0));
        assert_eq!(network.intersection_count(), 2);
    }

    #[test]
    fn test_add_edge_outside_bounds_fails() {
        let mut network = flat_network();
        let result = network.add_edge(3, 0, 4, 0, 0.0, 1.0, GradeType::Surface);
        assert!(matches!(result, Err(CityError::OutOfBounds { x: 4, z: 0, .. })));
        assert!(network.add_edge(0, -4, 0, -3, 0.0, 1.0, GradeType::Surface).is_err());
        assert!(network.add_edge(-3, 3, -2, 3, 0.0, 1.0, GradeType::Surface).is_ok());
        assert!(!network.is_empty());
        assert!(!network.has_intersection(4, 0));
    }

    #[test]
    fn test_duplicate_edge_is_ignored() {
        let mut network = flat_network();
        network.add_edge(0, 0, 0, 1, 0.0, 1.0, GradeType::Surface).unwrap();
        network.add_edge(0, 1, 0, 0, 0.0, 1.0, GradeType::Surface).unwrap();
        assert_eq!(network.edge_count(), 1);
        assert_eq!(network.edges_from(0, 0).len(), 1);
    }

    #[test]
    fn test_intersection_height_and_grade_come_from_terrain() {
        let mut network = river_network();
        network.add_edge(0, 0, 1, 0, 9.0, 1.0, GradeType::Bridge).unwrap();
        network.add_edge(1, 0, 2, 0, 9.0, 1.0, GradeType::Bridge).unwrap();

        assert_eq!(network.get_intersection_grade_type(0, 0), Some(GradeType::Surface));
        assert_eq!(network.intersection(0, 0).unwrap().height, 5.0);
        assert_eq!(network.get_intersection_grade_type(1, 0), Some(GradeType::Bridge));
        assert_eq!(network.intersection(1, 0).unwrap().height, 9.0);
        assert_eq!(network.get_intersection_grade_type(5, 5), None);
    }

    #[test]
    fn test_road_height_is_flat_near_intersections() {
        let mut network = river_network();
        network.add_edge(0, 0, 1, 0, 9.0, 1.0, GradeType::Bridge).unwrap();

        assert_eq!(network.get_road_height(0.0, 0.0), Some(5.0));
        assert_eq!(network.get_road_height(0.03, 0.0), Some(5.0));
        assert_eq!(network.get_road_height(0.97, 0.0), Some(9.0));
        let middle = network.get_road_height(0.5, 0.0).unwrap();
        assert!((middle - 7.0).abs() < 1e-4);
        assert_eq!(network.get_road_height(0.5, 0.5), None);
        assert_eq!(network.get_road_height(0.0, 0.5), None);
    }

    #[test]
    fn test_road_height_on_z_edges_and_negative_coordinates() {
        let mut cells = Tilemap::new_with(9, 9, TerrainCell::default());
        for (x, y, cell) in cells.iter_mut() {
            cell.land_height = x as f32 * 10.0 + y as f32 * 2.0;
        }
        let mut network = RoadNetwork::new(Arc::new(Terrain::new(cells, 1.0)));
        network.add_edge(-2, 0, -1, 0, 0.0, 1.0, GradeType::Surface).unwrap();
        network.add_edge(0, 1, 0, 2, 0.0, 1.0, GradeType::Surface).unwrap();
        network.add_edge(0, -2, 0, -1, 0.0, 1.0, GradeType::Surface).unwrap();

        // X edge left of the origin: 28 at x = -2, 38 at x = -1
        assert_eq!(network.get_road_height(-1.97, 0.0), Some(28.0));
        assert_eq!(network.get_road_height(-1.03, 0.0), Some(38.0));
        assert!((network.get_road_height(-1.5, 0.0).unwrap() - 33.0).abs() < 1e-4);

        // Z edge: 50 at z = 1, 52 at z = 2
        assert_eq!(network.get_road_height(0.0, 1.03), Some(50.0));
        assert_eq!(network.get_road_height(0.0, 1.97), Some(52.0));
        assert!((network.get_road_height(0.0, 1.5).unwrap() - 51.0).abs() < 1e-4);

        // Z edge above the origin: 44 at z = -2, 46 at z = -1
        assert_eq!(network.get_road_height(0.0, -1.97), Some(44.0));
        assert!((network.get_road_height(0.0, -1.5).unwrap() - 45.0).abs() < 1e-4);
        assert_eq!(network.get_road_height(0.0, 0.5), None);
    }

    #[test]
    fn test_bounding_box_grows() {
        let mut network = flat_network();
        assert_eq!(network.bounding_box(), None);
        network.add_edge(-2, 1, -1, 1, 0.0, 1.0, GradeType::Surface).unwrap();
        network.add_edge(2, -3, 2, -2, 0.0, 1.0, GradeType::Surface).unwrap();
        assert_eq!(network.min_bounding_x(), Some(-2));
        assert_eq!(network.max_bounding_x(), Some(2));
        assert_eq!(network.min_bounding_z(), Some(-3));
        assert_eq!(network.max_bounding_z(), Some(1));
    }

    #[test]
    fn test_segment_slope_limit() {
        let mut cells = Tilemap::new_with(9, 9, TerrainCell::default());
        for (x, _, cell) in cells.iter_mut() {
            cell.land_height = x as f32 * 40.0;
        }
        let terrain = Terrain::new(cells, 1.0);

        // 40 m over a 100 m block is about 0.38 rad
        assert!(is_segment_buildable(&terrain, 0, 0, 1, 0, 0.4));
        assert!(!is_segment_buildable(&terrain, 0, 0, 1, 0, 0.35));
        assert!(is_segment_buildable(&terrain, 0, 0, 0, 1, 0.0));

        let network = river_network();
        assert!(!is_segment_buildable(network.terrain(), 0, 0, 1, 0, std::f32::consts::PI));
        assert!(is_segment_buildable(network.terrain(), -1, 0, 0, 0, std::f32::consts::PI));
    }

    #[test]
    fn test_intersections_iterator_reports_coordinates() {
        let mut network = flat_network();
        network.add_edge(-1, 2, 0, 2, 0.0, 1.0, GradeType::Surface).unwrap();
        let mut coords: Vec<_> = network.intersections().map(|(x, z, _)| (x, z)).collect();
        coords.sort();
        assert_eq!(coords, vec![(-1, 2), (0, 2)]);
    }
}

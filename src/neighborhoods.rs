//! Neighborhood site selection
//!
//! Neighborhoods prefer central, flat, dry land and keep a minimum distance
//! from each other. Each candidate gets a score (lower is better):
//!
//! ```text
//! score = centrality + flatness + closeness
//! centrality = (|x| + |z|) / (half_width + half_depth) * CENTRALITY_WEIGHT
//! flatness   = mean |h - h_center| over the dry samples around the candidate
//! closeness  = infinite within min_distance_between of a chosen site
//! ```

use rayon::prelude::*;
use tracing::debug;

use crate::config::NeighborhoodConfig;
use crate::terrain::Terrain;

/// How far around a candidate flatness is sampled, in blocks.
pub const FLATNESS_RADIUS_BLOCKS: i32 = 2;

const CENTRALITY_WEIGHT: f32 = 10.0;

/// A chosen neighborhood center on an integer map point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighborhood {
    center_x: i32,
    center_z: i32,
}

impl Neighborhood {
    pub fn new(center_x: i32, center_z: i32) -> Self {
        Self { center_x, center_z }
    }

    pub fn center_x(&self) -> i32 {
        self.center_x
    }

    pub fn center_z(&self) -> i32 {
        self.center_z
    }

    pub fn distance_to(&self, x: f32, z: f32) -> f32 {
        let dx = x - self.center_x as f32;
        let dz = z - self.center_z as f32;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Pick up to `config.count` neighborhood sites, best first.
///
/// Stops early when no candidate with a finite score remains.
pub fn place_neighborhoods(terrain: &Terrain, config: &NeighborhoodConfig) -> Vec<Neighborhood> {
    let candidates = candidate_points(terrain);
    let half_span = ((terrain.max_x() - terrain.min_x()) + (terrain.max_z() - terrain.min_z())) / 2.0;

    let base_scores: Vec<f32> = candidates
        .par_iter()
        .map(|&(x, z)| {
            let centrality = (x.abs() + z.abs()) as f32 / half_span.max(f32::EPSILON) * CENTRALITY_WEIGHT;
            centrality + flatness_score(terrain, x, z)
        })
        .collect();

    let mut chosen: Vec<Neighborhood> = Vec::with_capacity(config.count);
    while chosen.len() < config.count {
        let best = candidates
            .iter()
            .zip(&base_scores)
            .filter(|(_, score)| score.is_finite())
            .filter(|(&(x, z), _)| {
                chosen
                    .iter()
                    .all(|n| n.distance_to(x as f32, z as f32) >= config.min_distance_between)
            })
            .min_by(|a, b| a.1.total_cmp(b.1));

        let Some((&(x, z), score)) = best else {
            debug!(placed = chosen.len(), requested = config.count, "ran out of neighborhood sites");
            break;
        };
        debug!(x, z, score, "placed neighborhood");
        chosen.push(Neighborhood::new(x, z));
    }

    chosen
}

/// Integer map points far enough inside the terrain for a full flatness window, row by row.
fn candidate_points(terrain: &Terrain) -> Vec<(i32, i32)> {
    let min_x = terrain.min_x().ceil() as i32 + FLATNESS_RADIUS_BLOCKS;
    let max_x = terrain.max_x().floor() as i32 - FLATNESS_RADIUS_BLOCKS;
    let min_z = terrain.min_z().ceil() as i32 + FLATNESS_RADIUS_BLOCKS;
    let max_z = terrain.max_z().floor() as i32 - FLATNESS_RADIUS_BLOCKS;

    (min_z..=max_z)
        .flat_map(|z| (min_x..=max_x).map(move |x| (x, z)))
        .collect()
}

/// Mean height deviation from the center over the dry samples in the window.
///
/// Infinite when the center is wet or the window holds more water than land.
fn flatness_score(terrain: &Terrain, x: i32, z: i32) -> f32 {
    let Some(center) = terrain.land_height_at(x as f32, z as f32) else {
        return f32::INFINITY;
    };
    if !terrain.is_dry_at(x as f32, z as f32) {
        return f32::INFINITY;
    }

    let cells = terrain.cells();
    let (gx, gz) = terrain.map_to_grid(x as f32, z as f32);
    let (gx, gz) = (gx.round() as i64, gz.round() as i64);
    let radius = (FLATNESS_RADIUS_BLOCKS as f32 / terrain.scale()).round() as i64;

    let mut deviation = 0.0;
    let mut dry = 0usize;
    let mut wet = 0usize;
    for row in (gz - radius)..=(gz + radius) {
        for column in (gx - radius)..=(gx + radius) {
            if !cells.contains(column, row) {
                continue;
            }
            let cell = cells.get(column as usize, row as usize);
            if cell.water_height > 0.0 {
                wet += 1;
            } else {
                dry += 1;
                deviation += (cell.land_height - center).abs();
            }
        }
    }

    if dry == 0 || wet > dry {
        return f32::INFINITY;
    }
    deviation / dry as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainCell;
    use crate::tilemap::Tilemap;

    fn config(count: usize, min_distance_between: f32) -> NeighborhoodConfig {
        NeighborhoodConfig { count, min_distance_between, ..Default::default() }
    }

    #[test]
    fn test_flat_terrain_prefers_center() {
        let terrain = Terrain::flat(16, 16, 3.0, 0.5);
        let placed = place_neighborhoods(&terrain, &config(1, 4.0));
        assert_eq!(placed, vec![Neighborhood::new(0, 0)]);
    }

    #[test]
    fn test_sites_keep_minimum_separation() {
        let terrain = Terrain::flat(20, 20, 0.0, 0.5);
        let placed = place_neighborhoods(&terrain, &config(6, 5.0));
        assert_eq!(placed.len(), 6);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                let distance = a.distance_to(b.center_x() as f32, b.center_z() as f32);
                assert!(distance >= 5.0, "{:?} and {:?} are {} apart", a, b, distance);
            }
        }
    }

    #[test]
    fn test_stops_when_sites_run_out() {
        // Candidates span -2..=2 on both axes
        let terrain = Terrain::flat(8, 8, 0.0, 0.5);
        let placed = place_neighborhoods(&terrain, &config(10, 4.0));
        assert!(!placed.is_empty());
        assert!(placed.len() < 10);
    }

    #[test]
    fn test_avoids_water_and_rough_ground() {
        let mut cells = Tilemap::new_with(33, 33, TerrainCell::default());
        for (column, row, cell) in cells.iter_mut() {
            // Lake over the western half, jagged hills in the north-east
            if column < 16 {
                *cell = TerrainCell { land_height: 0.0, water_height: 2.0 };
            } else if row < 16 {
                cell.land_height = if (column + row) % 2 == 0 { 30.0 } else { 0.0 };
            }
        }
        let terrain = Terrain::new(cells, 0.5);
        let placed = place_neighborhoods(&terrain, &config(1, 4.0));

        let site = placed[0];
        assert!(site.center_x() >= 0);
        assert!(site.center_z() >= 0);
        assert!(terrain.is_dry_at(site.center_x() as f32, site.center_z() as f32));
    }

    #[test]
    fn test_all_water_places_nothing() {
        let cells = Tilemap::new_with(17, 17, TerrainCell { land_height: 0.0, water_height: 1.0 });
        let terrain = Terrain::new(cells, 0.5);
        assert!(place_neighborhoods(&terrain, &config(3, 2.0)).is_empty());
    }
}

//! Road network generation
//!
//! Each neighborhood grows a street grid outward from its center. Before a
//! neighborhood grows, it is linked to the roads already built by the
//! cheapest path over the terrain, crossing rivers by bridge where needed.

use std::sync::Arc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::{NeighborhoodConfig, RoadNetworkConfig};
use crate::error::Result;
use crate::neighborhoods::Neighborhood;
use crate::pathfinding::shortest_path;
use crate::road_network::{build_bridge, is_segment_buildable, GradeType, RoadNetwork, TerrainCandidateGraph};
use crate::terrain::Terrain;
use crate::units::distance_decay_probability;

const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Build the road network for all neighborhoods, in order.
///
/// Returns an empty network when roads are disabled or there are no
/// neighborhoods. Neighborhoods that cannot be reached are skipped.
pub fn generate_road_network(
    terrain: Arc<Terrain>,
    neighborhoods: &[Neighborhood],
    road_config: &RoadNetworkConfig,
    neighborhood_config: &NeighborhoodConfig,
    rng: &mut ChaCha8Rng,
) -> Result<RoadNetwork> {
    let mut network = RoadNetwork::new(terrain);
    if !road_config.is_present || neighborhoods.is_empty() {
        info!("Skipping road network");
        return Ok(network);
    }

    info!("Generating roads for {} neighborhoods", neighborhoods.len());
    for (index, neighborhood) in neighborhoods.iter().enumerate() {
        let (cx, cz) = (neighborhood.center_x(), neighborhood.center_z());

        if !network.is_empty() && !network.has_intersection(cx, cz) {
            let path = {
                let graph = TerrainCandidateGraph::new(&network, road_config.max_road_angle);
                shortest_path(&graph, cx, cz, |x, z| network.has_intersection(x, z))
            };
            match path {
                Some(path) => {
                    debug!(index, length = path.len(), "connecting neighborhood");
                    connect_path(&mut network, (cx, cz), &path)?;
                }
                None => {
                    warn!(index, x = cx, z = cz, "no route to neighborhood, skipping");
                    continue;
                }
            }
        }

        let added = grow_neighborhood(&mut network, neighborhood, road_config, neighborhood_config, rng)?;
        debug!(index, added, "grew neighborhood streets");
    }

    info!(
        intersections = network.intersection_count(),
        edges = network.edge_count(),
        "Road network complete"
    );
    Ok(network)
}

/// Lay a path found over the terrain candidate graph into the network.
fn connect_path(network: &mut RoadNetwork, start: (i32, i32), path: &[(i32, i32)]) -> Result<()> {
    let mut previous = start;
    for &point in path {
        let span = (point.0 - previous.0).abs() + (point.1 - previous.1).abs();
        if span > 1 {
            lay_bridge(network, previous, point)?;
        } else {
            network.add_edge(previous.0, previous.1, point.0, point.1, 0.0, 1.0, GradeType::Surface)?;
        }
        previous = point;
    }
    Ok(())
}

fn lay_bridge(network: &mut RoadNetwork, from: (i32, i32), to: (i32, i32)) -> Result<()> {
    let (dx, dz) = ((to.0 - from.0).signum(), (to.1 - from.1).signum());
    let Some(bridge) = build_bridge(network, from.0, from.1, dx, dz) else {
        warn!(?from, ?to, "bridge no longer fits, leaving gap");
        return Ok(());
    };

    let (step_x, step_z) = bridge.direction();
    let (mut x, mut z) = (bridge.start_x, bridge.start_z);
    for _ in 0..bridge.span() {
        network.add_edge(x, z, x + step_x, z + step_z, bridge.deck_height, 1.0, GradeType::Bridge)?;
        x += step_x;
        z += step_z;
    }
    Ok(())
}

/// Grow streets outward from a neighborhood center. Returns the number of edges added.
///
/// A branch is tried toward each of the four neighbors of every new
/// intersection, staying inside the neighborhood's rectangle. Branches must
/// be buildable and pass a random draw against [`branch_probability`].
pub fn grow_neighborhood(
    network: &mut RoadNetwork,
    neighborhood: &Neighborhood,
    road_config: &RoadNetworkConfig,
    neighborhood_config: &NeighborhoodConfig,
    rng: &mut ChaCha8Rng,
) -> Result<usize> {
    let (cx, cz) = (neighborhood.center_x(), neighborhood.center_z());
    let half_columns = (neighborhood_config.column_count / 2) as i32;
    let half_rows = (neighborhood_config.row_count / 2) as i32;
    let half_extent = neighborhood_config.half_extent();

    if !network.is_within_allowed_bounds(cx, cz) {
        return Ok(0);
    }

    let mut added = 0;
    let mut stack = vec![(cx, cz)];
    while let Some((x, z)) = stack.pop() {
        for (dx, dz) in DIRECTIONS {
            let (nx, nz) = (x + dx, z + dz);
            if (nx - cx).abs() > half_columns || (nz - cz).abs() > half_rows {
                continue;
            }
            if !network.is_within_allowed_bounds(nx, nz) || network.has_edge_between(x, z, nx, nz, None) {
                continue;
            }
            if !is_segment_buildable(network.terrain(), x, z, nx, nz, road_config.max_road_angle) {
                continue;
            }

            let probability = branch_probability(
                neighborhood,
                (x, z),
                (nx, nz),
                road_config.safe_from_decay_blocks,
                half_extent,
            );
            if rng.gen::<f32>() >= probability {
                continue;
            }

            let is_new = !network.has_intersection(nx, nz);
            network.add_edge(x, z, nx, nz, 0.0, 1.0, GradeType::Surface)?;
            added += 1;
            if is_new {
                stack.push((nx, nz));
            }
        }
    }

    Ok(added)
}

/// Chance of building the street from `from` to `to`.
///
/// Certain along the neighborhood's two axes and within `safe_from_decay`
/// blocks of the center; beyond that it decays to zero at `half_extent`.
pub fn branch_probability(
    neighborhood: &Neighborhood,
    from: (i32, i32),
    to: (i32, i32),
    safe_from_decay: f32,
    half_extent: f32,
) -> f32 {
    let (cx, cz) = (neighborhood.center_x(), neighborhood.center_z());
    let on_axis = (from.0 == cx && to.0 == cx) || (from.1 == cz && to.1 == cz);
    if on_axis {
        return 1.0;
    }
    let distance = neighborhood.distance_to(to.0 as f32, to.1 as f32);
    distance_decay_probability(distance, safe_from_decay, half_extent)
}

//! Dijkstra shortest paths over any intersection graph.
//!
//! The search only needs to ask whether a point is an intersection and which
//! edges leave it, so the same code runs over a built road network and over
//! graphs synthesized on the fly from terrain.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// One outgoing edge as seen by the search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathEdge {
    pub dest_x: i32,
    pub dest_z: i32,
    pub distance: f32,
}

/// A graph of intersections at integer map coordinates.
pub trait PathGraph {
    fn has_intersection(&self, x: i32, z: i32) -> bool;

    fn edges_from(&self, x: i32, z: i32) -> Vec<PathEdge>;
}

#[derive(Clone, Copy, Debug)]
struct NodeState {
    visited: bool,
    distance: f32,
    predecessor: Option<(i32, i32)>,
}

/// Node for Dijkstra's priority queue
#[derive(Clone, Copy, Debug)]
struct PathNode {
    x: i32,
    z: i32,
    distance: f32,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathNode {}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; equal distances pop in coordinate order
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.z.cmp(&self.z))
            .then_with(|| other.x.cmp(&self.x))
    }
}

/// Find the cheapest path from `(start_x, start_z)` to the first point that
/// satisfies `is_target`.
///
/// The returned points exclude the start and end with the target. A start
/// that is already a target yields an empty path. Returns `None` when the
/// start is not an intersection or no target is reachable.
pub fn shortest_path<G, F>(graph: &G, start_x: i32, start_z: i32, is_target: F) -> Option<Vec<(i32, i32)>>
where
    G: PathGraph + ?Sized,
    F: Fn(i32, i32) -> bool,
{
    if !graph.has_intersection(start_x, start_z) {
        return None;
    }

    let mut nodes: HashMap<(i32, i32), NodeState> = HashMap::new();
    let mut frontier = BinaryHeap::new();

    nodes.insert(
        (start_x, start_z),
        NodeState { visited: false, distance: 0.0, predecessor: None },
    );
    frontier.push(PathNode { x: start_x, z: start_z, distance: 0.0 });

    while let Some(PathNode { x, z, distance }) = frontier.pop() {
        let Some(state) = nodes.get_mut(&(x, z)) else {
            continue;
        };
        // Stale queue entry
        if state.visited || distance > state.distance {
            continue;
        }
        state.visited = true;

        if is_target(x, z) {
            return Some(reconstruct(&nodes, x, z));
        }

        for edge in graph.edges_from(x, z) {
            if !graph.has_intersection(edge.dest_x, edge.dest_z) {
                continue;
            }
            let candidate = distance + edge.distance;
            let entry = nodes.entry((edge.dest_x, edge.dest_z)).or_insert(NodeState {
                visited: false,
                distance: f32::INFINITY,
                predecessor: None,
            });
            if !entry.visited && candidate < entry.distance {
                entry.distance = candidate;
                entry.predecessor = Some((x, z));
                frontier.push(PathNode { x: edge.dest_x, z: edge.dest_z, distance: candidate });
            }
        }
    }

    None
}

/// Shortest path between two specific points.
pub fn shortest_path_between<G>(graph: &G, start: (i32, i32), end: (i32, i32)) -> Option<Vec<(i32, i32)>>
where
    G: PathGraph + ?Sized,
{
    shortest_path(graph, start.0, start.1, |x, z| (x, z) == end)
}

fn reconstruct(nodes: &HashMap<(i32, i32), NodeState>, end_x: i32, end_z: i32) -> Vec<(i32, i32)> {
    let mut path = Vec::new();
    let mut current = (end_x, end_z);
    while let Some(previous) = nodes.get(&current).and_then(|s| s.predecessor) {
        path.push(current);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Adjacency list graph for tests.
    struct TestGraph {
        edges: HashMap<(i32, i32), Vec<PathEdge>>,
    }

    impl TestGraph {
        fn new() -> Self {
            Self { edges: HashMap::new() }
        }

        fn connect(&mut self, a: (i32, i32), b: (i32, i32), distance: f32) {
            self.edges
                .entry(a)
                .or_default()
                .push(PathEdge { dest_x: b.0, dest_z: b.1, distance });
            self.edges
                .entry(b)
                .or_default()
                .push(PathEdge { dest_x: a.0, dest_z: a.1, distance });
        }

        fn add_isolated(&mut self, point: (i32, i32)) {
            self.edges.entry(point).or_default();
        }
    }

    impl PathGraph for TestGraph {
        fn has_intersection(&self, x: i32, z: i32) -> bool {
            self.edges.contains_key(&(x, z))
        }

        fn edges_from(&self, x: i32, z: i32) -> Vec<PathEdge> {
            self.edges.get(&(x, z)).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn test_line_graph_path_excludes_start() {
        let mut graph = TestGraph::new();
        graph.connect((0, 0), (1, 0), 1.0);
        graph.connect((1, 0), (2, 0), 1.0);

        let path = shortest_path_between(&graph, (0, 0), (2, 0));
        assert_eq!(path, Some(vec![(1, 0), (2, 0)]));
    }

    #[test]
    fn test_unreachable_target_is_none() {
        let mut graph = TestGraph::new();
        graph.connect((0, 0), (1, 0), 1.0);
        graph.add_isolated((5, 5));

        assert_eq!(shortest_path_between(&graph, (0, 0), (5, 5)), None);
        assert_eq!(shortest_path_between(&graph, (9, 9), (0, 0)), None);
    }

    #[test]
    fn test_start_on_target_is_empty_path() {
        let mut graph = TestGraph::new();
        graph.connect((0, 0), (1, 0), 1.0);
        assert_eq!(shortest_path_between(&graph, (0, 0), (0, 0)), Some(vec![]));
    }

    #[test]
    fn test_prefers_cheaper_detour() {
        let mut graph = TestGraph::new();
        graph.connect((0, 0), (3, 0), 10.0);
        graph.connect((0, 0), (0, 1), 1.0);
        graph.connect((0, 1), (3, 1), 1.0);
        graph.connect((3, 1), (3, 0), 1.0);

        let path = shortest_path_between(&graph, (0, 0), (3, 0));
        assert_eq!(path, Some(vec![(0, 1), (3, 1), (3, 0)]));
    }

    #[test]
    fn test_predicate_finds_nearest_target() {
        let mut graph = TestGraph::new();
        for x in 0..6 {
            graph.connect((x, 0), (x + 1, 0), 1.0);
        }
        let path = shortest_path(&graph, 0, 0, |x, _| x >= 4);
        assert_eq!(path, Some(vec![(1, 0), (2, 0), (3, 0), (4, 0)]));
    }
}

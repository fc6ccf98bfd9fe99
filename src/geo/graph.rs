use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::geo::{haversine_m, GeoPoint};

/// Walkable street network for one administrative area. Nodes carry
/// coordinates, edges carry their length in meters. Undirected: every
/// street segment is traversable both ways on foot.
#[derive(Debug, Default, Clone)]
pub struct StreetGraph {
    nodes: HashMap<i64, GeoPoint>,
    adjacency: HashMap<i64, Vec<(i64, f64)>>,
    edge_count: usize,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, id: i64, point: GeoPoint) {
        self.nodes.insert(id, point);
    }

    /// Connects two known nodes with the given length. Unknown endpoints
    /// are ignored rather than creating dangling adjacency entries.
    pub fn insert_edge(&mut self, from: i64, to: i64, length_m: f64) {
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return;
        }

        self.adjacency.entry(from).or_default().push((to, length_m));
        self.adjacency.entry(to).or_default().push((from, length_m));
        self.edge_count += 1;
    }

    /// Connects two known nodes, deriving the length from their coordinates.
    pub fn connect(&mut self, from: i64, to: i64) {
        let (Some(a), Some(b)) = (self.nodes.get(&from), self.nodes.get(&to)) else {
            return;
        };
        let length = haversine_m(a, b);
        self.insert_edge(from, to, length);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn point_of(&self, id: i64) -> Option<GeoPoint> {
        self.nodes.get(&id).copied()
    }

    /// Snaps a coordinate to the nearest graph node. `None` on an empty graph.
    pub fn nearest_node(&self, point: &GeoPoint) -> Option<i64> {
        self.nodes
            .iter()
            .map(|(id, node)| (*id, haversine_m(point, node)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Dijkstra over edge length. Returns the node sequence from `from` to
    /// `to`, or `None` when the nodes lie on disconnected components.
    pub fn shortest_path(&self, from: i64, to: i64) -> Option<Vec<i64>> {
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return None;
        }

        if from == to {
            return Some(vec![from]);
        }

        let mut dist: HashMap<i64, f64> = HashMap::new();
        let mut prev: HashMap<i64, i64> = HashMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(from, 0.0);
        heap.push(Visit {
            cost: 0.0,
            node: from,
        });

        while let Some(Visit { cost, node }) = heap.pop() {
            if node == to {
                break;
            }

            if dist.get(&node).is_some_and(|&best| cost > best) {
                continue;
            }

            let Some(neighbors) = self.adjacency.get(&node) else {
                continue;
            };

            for &(next, length) in neighbors {
                let candidate = cost + length;
                let better = dist.get(&next).is_none_or(|&best| candidate < best);
                if better {
                    dist.insert(next, candidate);
                    prev.insert(next, node);
                    heap.push(Visit {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        if !prev.contains_key(&to) {
            return None;
        }

        let mut path = vec![to];
        let mut current = to;
        while let Some(&parent) = prev.get(&current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// Total length in meters of a node sequence. Missing edges contribute
    /// the straight-line distance, which only happens on malformed input.
    pub fn path_length_m(&self, path: &[i64]) -> f64 {
        path.windows(2)
            .map(|pair| self.edge_length(pair[0], pair[1]))
            .sum()
    }

    fn edge_length(&self, from: i64, to: i64) -> f64 {
        self.adjacency
            .get(&from)
            .and_then(|neighbors| {
                neighbors
                    .iter()
                    .filter(|(next, _)| *next == to)
                    .map(|(_, length)| *length)
                    .min_by(|a, b| a.total_cmp(b))
            })
            .unwrap_or_else(|| match (self.nodes.get(&from), self.nodes.get(&to)) {
                (Some(a), Some(b)) => haversine_m(a, b),
                _ => 0.0,
            })
    }
}

/// Min-heap entry; `BinaryHeap` is a max-heap so ordering is reversed.
#[derive(Debug, Clone, Copy)]
struct Visit {
    cost: f64,
    node: i64,
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for Visit {}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

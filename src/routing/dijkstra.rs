use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::HashMap;
use petgraph::graph::NodeIndex;

use crate::model::PathNetwork;

#[derive(Copy, Clone)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal && self.node == other.node
    }
}

impl Eq for State {}

// Min-heap by cost (reversed from standard Rust BinaryHeap). Equal costs
// pop the lower node index first, which keeps tie-breaking consistent
// within a run.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub(crate) struct SearchTree {
    pub distances: HashMap<NodeIndex, f64>,
    pub predecessors: HashMap<NodeIndex, NodeIndex>,
}

impl SearchTree {
    /// Walks predecessor links backward from `target`. If the search
    /// never reached `target`, the result degenerates to `[target]`.
    pub fn path_to(&self, start: NodeIndex, target: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![target];
        let mut current = target;
        while current != start {
            match self.predecessors.get(&current) {
                Some(&prev) => {
                    path.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Dijkstra's algorithm over the footpath graph, with distances in meters.
///
/// Stops as soon as `target` is popped as the frontier minimum; correct
/// because all edge weights are nonnegative. Stale heap entries are
/// skipped lazily.
pub(crate) fn shortest_path_tree(
    network: &PathNetwork,
    start: NodeIndex,
    target: Option<NodeIndex>,
) -> SearchTree {
    let estimated_nodes = network.graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if target == Some(node) {
            break;
        }

        // Skip if we've already found a better path.
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for (next, weight) in network.neighbors(node) {
            let next_cost = cost + weight;
            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, node);
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, node);
                    }
                }
            }
        }
    }

    SearchTree {
        distances,
        predecessors,
    }
}

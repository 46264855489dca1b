//! Cycle detection using petgraph.
//!
//! The store keeps adjacency as two sets per node. For whole-graph algorithms
//! it is projected onto a `DiGraph` whose edges point from **dependent to
//! dependency**, the same direction as `DependencyNode::dependencies`.

use crate::store::GraphStore;
use crate::types::ContentId;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// A closed dependency path.
///
/// Each member depends on the next one, and the last depends on the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Members in edge order, starting at the smallest ID
    pub members: Vec<ContentId>,
}

impl Cycle {
    /// Returns `true` for an item that depends on itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.members.len() == 1
    }
}

/// Find every dependency cycle in the store.
///
/// One cycle is reported per strongly connected component with more than one
/// member, or per node with an edge to itself. The reported cycle is the
/// shortest one through the component's smallest ID, so the report is stable
/// across runs.
#[must_use]
pub fn find_cycles(store: &GraphStore) -> Vec<Cycle> {
    let mut graph: DiGraph<&ContentId, ()> = DiGraph::with_capacity(store.len(), 0);
    let mut node_map: HashMap<&ContentId, NodeIndex> = HashMap::with_capacity(store.len());

    for node in store.nodes() {
        node_map.insert(node.id(), graph.add_node(node.id()));
    }

    for node in store.nodes() {
        let source = node_map[node.id()];
        for dependency in node.dependencies() {
            let Some(&target) = node_map.get(dependency) else {
                continue;
            };
            graph.add_edge(source, target, ());
        }
    }

    let mut cycles: Vec<Cycle> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1 || graph.contains_edge(component[0], component[0]))
        .map(|component| {
            let scc: HashSet<&ContentId> = component.iter().map(|&idx| graph[idx]).collect();
            let start = scc.iter().min().copied().unwrap_or(graph[component[0]]);
            Cycle {
                members: shortest_cycle(store, start, &scc),
            }
        })
        .collect();

    cycles.sort_by(|a, b| a.members.cmp(&b.members));
    cycles
}

/// Breadth-first search for the shortest path from `start` back to itself,
/// staying inside `component`.
fn shortest_cycle(
    store: &GraphStore,
    start: &ContentId,
    component: &HashSet<&ContentId>,
) -> Vec<ContentId> {
    let mut parent: HashMap<&ContentId, &ContentId> = HashMap::new();
    let mut queue: VecDeque<&ContentId> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let Some(node) = store.try_get(current) else {
            continue;
        };
        let mut next: Vec<&ContentId> = node
            .dependencies()
            .iter()
            .filter(|dependency| component.contains(*dependency))
            .collect();
        next.sort();

        for dependency in next {
            if dependency == start {
                let mut path = vec![current.clone()];
                let mut cursor = current;
                while let Some(&previous) = parent.get(cursor) {
                    path.push(previous.clone());
                    cursor = previous;
                }
                path.reverse();
                return path;
            }
            if !parent.contains_key(dependency) {
                parent.insert(dependency, current);
                queue.push_back(dependency);
            }
        }
    }

    vec![start.clone()]
}

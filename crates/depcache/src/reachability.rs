//! Read-only reachability queries over a [`GraphStore`].
//!
//! All traversals are breadth-first with a visited set keyed by content ID, so
//! they terminate on cyclic graphs in time proportional to the graph size.
//! Unknown IDs are never an error: they simply reach nothing.

use crate::store::{DependencyNode, GraphStore};
use crate::types::ContentId;
use std::collections::{HashSet, VecDeque};

/// Returns `true` if `to` is a direct dependency of `from`.
#[must_use]
pub fn has_direct_dependency(store: &GraphStore, from: &ContentId, to: &ContentId) -> bool {
    store
        .try_get(from)
        .is_some_and(|node| node.dependencies().contains(to))
}

/// Returns `true` if `to` can be reached from `from` in at most `max_depth` hops.
///
/// A direct edge is one hop. `None` means unbounded; `Some(0)` reaches nothing.
/// `from == to` is only reachable through an actual cycle.
#[must_use]
pub fn has_dependency(
    store: &GraphStore,
    from: &ContentId,
    to: &ContentId,
    max_depth: Option<usize>,
) -> bool {
    let Some(start) = store.try_get(from) else {
        return false;
    };

    let mut visited: HashSet<&ContentId> = HashSet::new();
    let mut queue: VecDeque<(&DependencyNode, usize)> = VecDeque::new();
    queue.push_back((start, 0));

    while let Some((node, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        for dependency in node.dependencies() {
            if dependency == to {
                return true;
            }
            if visited.insert(dependency)
                && let Some(next) = store.try_get(dependency)
            {
                queue.push_back((next, depth + 1));
            }
        }
    }

    false
}

/// All transitive dependencies of `id` with the depth they were first reached at.
///
/// Results are in breadth-first order; ties within a depth are sorted by ID.
#[must_use]
pub fn dependency_tree(
    store: &GraphStore,
    id: &ContentId,
    max_depth: Option<usize>,
) -> Vec<(ContentId, usize)> {
    walk(store, id, max_depth, DependencyNode::dependencies)
}

/// All items that transitively reference `id`, with their depth.
#[must_use]
pub fn reference_tree(
    store: &GraphStore,
    id: &ContentId,
    max_depth: Option<usize>,
) -> Vec<(ContentId, usize)> {
    walk(store, id, max_depth, DependencyNode::references)
}

fn walk<'a>(
    store: &'a GraphStore,
    id: &ContentId,
    max_depth: Option<usize>,
    edges: impl Fn(&'a DependencyNode) -> &'a HashSet<ContentId>,
) -> Vec<(ContentId, usize)> {
    let Some(start) = store.try_get(id) else {
        return Vec::new();
    };

    let mut result = Vec::new();
    let mut visited: HashSet<&ContentId> = HashSet::new();
    let mut queue: VecDeque<(&DependencyNode, usize)> = VecDeque::new();
    queue.push_back((start, 0));

    while let Some((node, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        let mut next_ids: Vec<&ContentId> = edges(node)
            .iter()
            .filter(|next| visited.insert(*next))
            .collect();
        next_ids.sort();

        for next_id in next_ids {
            result.push((next_id.clone(), depth + 1));
            if let Some(next) = store.try_get(next_id) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    result
}

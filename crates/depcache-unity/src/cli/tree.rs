//! `depcache deps` and `depcache refs` command implementation.

use colored::Colorize;
use depcache::ContentId;
use serde::Serialize;

use super::display::{heading, print_json};
use super::{AssetRef, Direction, LoadedCache, OutputMode, Session};

#[derive(Serialize)]
struct TreeEntry {
    #[serde(flatten)]
    asset: AssetRef,
    depth: usize,
    parent: ContentId,
}

#[derive(Serialize)]
struct TreeOutput {
    root: AssetRef,
    direction: &'static str,
    max_depth: Option<usize>,
    entries: Vec<TreeEntry>,
}

/// Run a dependency or reference tree query.
pub fn run(
    session: &Session,
    target: &str,
    depth: Option<usize>,
    direction: Direction,
) -> anyhow::Result<()> {
    let loaded = session.load()?;
    let id = session.resolve(&loaded, target)?;

    let mut entries = match direction {
        Direction::Dependencies => loaded.cache.dependency_tree(&id, depth),
        Direction::References => loaded.cache.reference_tree(&id, depth),
    };
    entries.sort_by_cached_key(|(entry, depth)| (*depth, loaded.label(entry)));
    let parents = assign_parents(&entries, |from, to| has_edge(&loaded, direction, from, to));

    let (name, empty) = match direction {
        Direction::Dependencies => ("dependencies", "No dependencies."),
        Direction::References => ("references", "Nothing references this asset."),
    };

    if session.mode() == OutputMode::Json {
        return print_json(&TreeOutput {
            root: loaded.asset(&id),
            direction: name,
            max_depth: depth,
            entries: entries
                .iter()
                .zip(&parents)
                .map(|((entry, depth), parent)| TreeEntry {
                    asset: loaded.asset(entry),
                    depth: *depth,
                    parent: parent.map_or_else(|| id.clone(), |p| entries[p].0.clone()),
                })
                .collect(),
        });
    }

    println!("{}", heading(&loaded, &id));
    if entries.is_empty() {
        println!("  {}", empty.dimmed());
        return Ok(());
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    let mut top_level = Vec::new();
    for (index, parent) in parents.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(index),
            None => top_level.push(index),
        }
    }
    print_children(&loaded, &entries, &children, &top_level, "");

    println!();
    println!("{} {name}", entries.len().to_string().bold());

    Ok(())
}

/// Whether `from` leads to `to` in one step in the queried direction.
fn has_edge(loaded: &LoadedCache, direction: Direction, from: &ContentId, to: &ContentId) -> bool {
    loaded.cache.try_get_node(from).is_some_and(|node| match direction {
        Direction::Dependencies => node.dependencies().contains(to),
        Direction::References => node.references().contains(to),
    })
}

/// Pick a parent for every entry of a breadth-first walk.
///
/// `entries` must be sorted by depth. Depth-1 entries hang off the root
/// (`None`); deeper entries get the first entry one level up that has an edge
/// to them.
fn assign_parents(
    entries: &[(ContentId, usize)],
    has_edge: impl Fn(&ContentId, &ContentId) -> bool,
) -> Vec<Option<usize>> {
    entries
        .iter()
        .map(|(id, depth)| {
            if *depth <= 1 {
                return None;
            }
            entries
                .iter()
                .position(|(candidate, d)| *d + 1 == *depth && has_edge(candidate, id))
        })
        .collect()
}

/// Render `nodes` and their subtrees with box-drawing connectors.
fn print_children(
    loaded: &LoadedCache,
    entries: &[(ContentId, usize)],
    children: &[Vec<usize>],
    nodes: &[usize],
    prefix: &str,
) {
    for (i, &node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;
        let (connector, continuation) = if is_last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        println!(
            "{prefix}{}{}",
            connector.dimmed(),
            loaded.label(&entries[node].0)
        );

        let prefix = format!("{prefix}{}", continuation.dimmed());
        print_children(loaded, entries, children, &children[node], &prefix);
    }
}

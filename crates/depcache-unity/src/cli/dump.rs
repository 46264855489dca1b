//! `depcache dump` command implementation.

use colored::Colorize;
use depcache::LocalId;
use serde::Serialize;

use super::display::{heading, print_assets, print_json};
use super::{AssetRef, OutputMode, Session};

#[derive(Serialize)]
struct NodeOutput {
    #[serde(flatten)]
    asset: AssetRef,
    local_id: Option<LocalId>,
    dependencies: Vec<AssetRef>,
    references: Vec<AssetRef>,
}

/// Run the dump command.
pub fn run(session: &Session) -> anyhow::Result<()> {
    let loaded = session.load()?;

    let mut nodes: Vec<_> = loaded.cache.nodes().collect();
    nodes.sort_by_key(|node| (loaded.path(node.id()).is_none(), loaded.label(node.id())));

    if session.mode() == OutputMode::Json {
        let output: Vec<_> = nodes
            .iter()
            .map(|node| NodeOutput {
                asset: loaded.asset(node.id()),
                local_id: node.local_id(),
                dependencies: node
                    .sorted_dependencies()
                    .into_iter()
                    .map(|id| loaded.asset(id))
                    .collect(),
                references: node
                    .sorted_references()
                    .into_iter()
                    .map(|id| loaded.asset(id))
                    .collect(),
            })
            .collect();
        return print_json(&output);
    }

    if nodes.is_empty() {
        println!("{}", "The cache is empty.".dimmed());
        return Ok(());
    }

    for node in &nodes {
        println!("{}", heading(&loaded, node.id()));
        println!("  {}:", "Dependencies".cyan());
        print_assets(&loaded, &node.sorted_dependencies(), "(none)");
        println!("  {}:", "References".cyan());
        print_assets(&loaded, &node.sorted_references(), "(none)");
        println!();
    }
    println!("{} nodes", nodes.len().to_string().bold());

    Ok(())
}

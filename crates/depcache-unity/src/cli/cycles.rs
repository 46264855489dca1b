//! `depcache cycles` command implementation.

use colored::Colorize;
use serde::Serialize;

use super::display::print_json;
use super::{AssetRef, OutputMode, Session};

#[derive(Serialize)]
struct CycleOutput {
    members: Vec<AssetRef>,
}

/// Run the cycles command.
pub fn run(session: &Session) -> anyhow::Result<()> {
    let loaded = session.load()?;

    let cycles = loaded.cache.find_cycles();

    if session.mode() == OutputMode::Json {
        let output: Vec<_> = cycles
            .iter()
            .map(|cycle| CycleOutput {
                members: cycle.members.iter().map(|id| loaded.asset(id)).collect(),
            })
            .collect();
        return print_json(&output);
    }

    if cycles.is_empty() {
        println!("{}", "No circular dependencies detected.".green());
        return Ok(());
    }

    println!(
        "Found {} circular dependencies:",
        cycles.len().to_string().red().bold()
    );
    println!();

    for (i, cycle) in cycles.iter().enumerate() {
        println!("  {} {}:", "Cycle".yellow().bold(), i + 1);

        // a -> b -> c -> a
        let mut path_str = cycle
            .members
            .iter()
            .map(|id| loaded.label(id))
            .collect::<Vec<_>>()
            .join(" → ");

        if let Some(first) = cycle.members.first() {
            path_str.push_str(" → ");
            path_str.push_str(&loaded.label(first));
        }

        println!("    {}", path_str.dimmed());
    }

    Ok(())
}

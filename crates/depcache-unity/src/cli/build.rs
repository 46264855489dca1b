//! `depcache build` command implementation.

use std::time::Instant;

use colored::Colorize;
use depcache::rules::DefaultRules;
use depcache::{BuildContext, BuildReport, DependencyCache};
use futures::StreamExt;
use serde::Serialize;
use tracing::debug;

use super::display::print_json;
use super::{OutputMode, Session};

const MAX_DISPLAY_ERRORS: usize = 5;

#[derive(Serialize)]
struct BuildOutput<'a> {
    #[serde(flatten)]
    report: &'a BuildReport,
    duration_ms: u128,
}

/// Run the build command.
///
/// The build is driven as a stream so checkpoints show up in the log as
/// they happen.
pub async fn run(session: &Session) -> anyhow::Result<()> {
    let root = session.corpus().root();
    if session.mode() == OutputMode::Text {
        println!("{} {}...", "Scanning".cyan().bold(), root.display());
    }

    let started = Instant::now();
    let mut cache = DependencyCache::new(session.settings().clone());
    let rules = DefaultRules::new(session.settings());
    let mut stream = cache
        .build_async(BuildContext::with_defaults(session.corpus(), &rules))?
        .into_stream();

    while let Some(checkpoint) = stream.next().await {
        debug!(
            processed = checkpoint.items_processed,
            total = checkpoint.total_items,
            item = checkpoint.current_item.as_deref().unwrap_or_default(),
            properties = checkpoint.properties_since_checkpoint,
            "Checkpoint"
        );
    }
    let report = stream.report().clone();
    let duration = started.elapsed();

    if session.mode() == OutputMode::Json {
        return print_json(&BuildOutput {
            report: &report,
            duration_ms: duration.as_millis(),
        });
    }

    println!();
    println!(
        "{} {} assets, {} nodes, {} edges",
        "Scanned".green().bold(),
        report.items_scanned,
        report.nodes,
        report.edges
    );
    println!("{}: {:.2?}", "Duration".dimmed(), duration);

    if report.items_excluded > 0 {
        println!(
            "{}: {} assets (exclude filters)",
            "Skipped".yellow(),
            report.items_excluded
        );
    }

    if report.skipped_unresolved > 0 || report.skipped_reserved > 0 {
        println!(
            "{}: {} unresolved, {} built-in",
            "Ignored references".dimmed(),
            report.skipped_unresolved,
            report.skipped_reserved
        );
    }

    if !report.errors.is_empty() {
        println!();
        println!("{} ({}):", "Errors".red().bold(), report.errors.len());
        for err in report.errors.iter().take(MAX_DISPLAY_ERRORS) {
            println!(
                "  {} {}: {} ({})",
                "•".red(),
                err.path.display(),
                err.message,
                err.kind
            );
        }
        if report.errors.len() > MAX_DISPLAY_ERRORS {
            let hidden = report.errors.len() - MAX_DISPLAY_ERRORS;
            println!("  ... and {hidden} more");
        }
    }

    Ok(())
}

//! Common display utilities for CLI commands.

use colored::Colorize;
use depcache::ContentId;
use serde::Serialize;

use super::LoadedCache;

const MAX_DISPLAY_ITEMS: usize = 10;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display a list of assets with optional truncation.
///
/// Shows up to `MAX_DISPLAY_ITEMS` assets. If there are more, shows
/// "... and N more". If empty, shows the provided `empty_message`.
pub fn print_assets(loaded: &LoadedCache, ids: &[&ContentId], empty_message: &str) {
    if ids.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for id in ids.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {}", "•".dimmed(), loaded.label(id));
    }

    if ids.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            ids.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Header line naming an asset by path, with its ID dimmed.
pub fn heading(loaded: &LoadedCache, id: &ContentId) -> String {
    match loaded.path(id) {
        Some(path) => format!("{} {}", path.white().bold(), id.as_str().dimmed()),
        None => id.as_str().white().bold().to_string(),
    }
}

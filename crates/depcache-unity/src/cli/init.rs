//! `depcache init` command implementation.

use std::path::Path;

use anyhow::bail;
use colored::Colorize;
use depcache_unity::{ProjectConfig, ProjectCorpus};

use super::config_path;

/// Run the init command.
///
/// Writes the default settings so they can be edited by hand. An existing
/// file is only replaced with `force`.
pub async fn run(root: &Path, config: Option<&Path>, force: bool) -> anyhow::Result<()> {
    ProjectCorpus::open(root)?;
    let path = config_path(root, config);

    if !force && tokio::fs::try_exists(&path).await? {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    ProjectConfig::default().save(&path).await?;

    println!("{} {}", "Created".green().bold(), path.display());
    Ok(())
}

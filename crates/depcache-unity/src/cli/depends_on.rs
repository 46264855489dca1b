//! `depcache depends-on` command implementation.

use colored::Colorize;
use serde::Serialize;

use super::display::print_json;
use super::{AssetRef, OutputMode, Session};

#[derive(Serialize)]
struct DependsOnOutput {
    from: AssetRef,
    to: AssetRef,
    max_depth: Option<usize>,
    depends_on: bool,
}

/// Run the depends-on command.
///
/// `direct` limits the query to a single edge; otherwise `depth` bounds the
/// number of hops, unbounded when `None`.
pub fn run(
    session: &Session,
    from: &str,
    to: &str,
    depth: Option<usize>,
    direct: bool,
) -> anyhow::Result<()> {
    let loaded = session.load()?;
    let from_id = session.resolve(&loaded, from)?;
    let to_id = session.resolve(&loaded, to)?;

    let max_depth = if direct { Some(1) } else { depth };
    let depends_on = if direct {
        loaded.cache.has_direct_dependency(&from_id, &to_id)
    } else {
        loaded.cache.has_dependency(&from_id, &to_id, max_depth)
    };

    if session.mode() == OutputMode::Json {
        return print_json(&DependsOnOutput {
            from: loaded.asset(&from_id),
            to: loaded.asset(&to_id),
            max_depth,
            depends_on,
        });
    }

    let from_label = loaded.label(&from_id);
    let to_label = loaded.label(&to_id);
    let scope = match max_depth {
        Some(1) => " directly".to_string(),
        Some(n) => format!(" within {n} hops"),
        None => String::new(),
    };
    if depends_on {
        println!(
            "{} {from_label} depends on {to_label}{scope}",
            "Yes:".green().bold()
        );
    } else {
        println!(
            "{} {from_label} does not depend on {to_label}{scope}",
            "No:".yellow().bold()
        );
    }

    Ok(())
}

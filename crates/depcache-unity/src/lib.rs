//! # depcache-unity: dependency cache for engine project trees
//!
//! Plugs an on-disk project into [`depcache`]:
//!
//! - every asset has a sidecar `<asset>.meta` whose `guid:` line is its content ID
//! - `.prefab` assets are scanned as entity hierarchies
//! - `.unity` scenes are scanned from their raw text
//! - everything else is scanned as a single object; binary assets have no references
//!
//! Build settings come from `depcache.yaml` at the project root.
//!
//! ## Quick Start
//!
//! ```no_run
//! use depcache::rules::DefaultRules;
//! use depcache::{BuildContext, DependencyCache};
//! use depcache_unity::{ProjectConfig, ProjectCorpus};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), depcache_unity::Error> {
//! let root = Path::new("/path/to/project");
//! let config = ProjectConfig::discover(root, None).await?;
//! let corpus = ProjectCorpus::open(root)?;
//!
//! let mut cache = DependencyCache::new(config.settings());
//! let rules = DefaultRules::new(cache.settings());
//! let report = cache.build(BuildContext::with_defaults(&corpus, &rules))?;
//! println!("{} assets, {} edges", report.items_scanned, report.edges);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod hierarchy;
mod meta;
mod project;
mod yaml;

pub use config::{CONFIG_FILE_NAME, ProjectConfig};
pub use error::{Error, Result};
pub use hierarchy::build_hierarchy;
pub use meta::{META_EXTENSION, meta_path, parse_guid, read_guid};
pub use project::{PREFAB_EXTENSION, ProjectCorpus, SCENE_EXTENSION};
pub use yaml::{YamlDocument, is_yaml_asset, parse_documents};

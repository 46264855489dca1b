//! CLI command implementations.

mod display;

pub mod build;
pub mod cycles;
pub mod depends_on;
pub mod dump;
pub mod init;
pub mod tree;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use depcache::rules::DefaultRules;
use depcache::{BuildContext, CacheSettings, ContentId, DependencyCache};
use depcache_unity::{ProjectConfig, ProjectCorpus};
use serde::Serialize;
use tracing::debug;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Colored text for terminals
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Which edges a tree query follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// What the asset points to
    Dependencies,
    /// What points to the asset
    References,
}

/// Project, settings and output mode shared by every command.
pub struct Session {
    corpus: ProjectCorpus,
    settings: CacheSettings,
    mode: OutputMode,
}

/// A freshly built cache plus the paths of its assets.
pub struct LoadedCache {
    pub cache: DependencyCache,
    paths: HashMap<ContentId, String>,
}

/// An asset as printed in JSON output.
#[derive(Debug, Serialize)]
pub struct AssetRef {
    pub id: ContentId,
    pub path: Option<String>,
}

impl Session {
    /// Load the settings and open the project.
    pub async fn open(
        root: PathBuf,
        config: Option<PathBuf>,
        mode: OutputMode,
    ) -> anyhow::Result<Self> {
        let project = ProjectConfig::discover(&root, config.as_deref())
            .await
            .context("failed to load settings")?;
        let corpus = ProjectCorpus::open(root)?;
        Ok(Self {
            corpus,
            settings: project.settings(),
            mode,
        })
    }

    pub fn corpus(&self) -> &ProjectCorpus {
        &self.corpus
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Build the cache synchronously.
    pub fn load(&self) -> anyhow::Result<LoadedCache> {
        let mut cache = DependencyCache::new(self.settings.clone());
        let rules = DefaultRules::new(&self.settings);
        let report = cache
            .build(BuildContext::with_defaults(&self.corpus, &rules))
            .context("failed to build the dependency cache")?;
        debug!(
            nodes = report.nodes,
            edges = report.edges,
            failed = report.items_failed(),
            "Cache ready"
        );

        let paths = self.corpus.path_index()?;
        Ok(LoadedCache { cache, paths })
    }

    /// Resolve a command-line target to a content ID.
    pub fn resolve(&self, loaded: &LoadedCache, target: &str) -> anyhow::Result<ContentId> {
        Ok(self.corpus.resolve(&loaded.paths, target)?)
    }
}

impl LoadedCache {
    /// Project-relative path of `id`, if it belongs to a scanned asset.
    pub fn path(&self, id: &ContentId) -> Option<&str> {
        self.paths.get(id).map(String::as_str)
    }

    pub fn asset(&self, id: &ContentId) -> AssetRef {
        AssetRef {
            id: id.clone(),
            path: self.path(id).map(str::to_string),
        }
    }

    /// Path if known, otherwise the raw ID.
    pub fn label(&self, id: &ContentId) -> String {
        self.path(id).map_or_else(|| id.to_string(), str::to_string)
    }
}

/// Path of the settings file a command should write to or read from.
pub fn config_path(root: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| ProjectConfig::default_path(root), Path::to_path_buf)
}

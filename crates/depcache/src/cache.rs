//! The dependency cache: a graph store plus the settings that build it.

use crate::build::{BuildOperation, BuildReport};
use crate::corpus::BuildContext;
use crate::error::Result;
use crate::graph::{self, Cycle};
use crate::reachability;
use crate::settings::CacheSettings;
use crate::store::{DependencyNode, GraphStore};
use crate::types::ContentId;
use tracing::{debug, info};

/// Dependency graph of a corpus, rebuilt from scratch on every build.
#[derive(Debug, Default)]
pub struct DependencyCache {
    pub(crate) store: GraphStore,
    pub(crate) settings: CacheSettings,
}

impl DependencyCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            store: GraphStore::new(),
            settings,
        }
    }

    /// Settings used by builds of this cache.
    #[must_use]
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Discard every node.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Start a cooperative build.
    ///
    /// The store is cleared and the corpus enumerated up front; scanning only
    /// happens as the returned operation is iterated.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the corpus cannot be
    /// enumerated. The store is left untouched in that case.
    pub fn build_async<'a>(&'a mut self, ctx: BuildContext<'a>) -> Result<BuildOperation<'a>> {
        self.settings.validate()?;
        let all_paths = ctx.corpus.item_paths()?;
        let total = all_paths.len();

        let paths: Vec<String> = all_paths
            .into_iter()
            .filter(|path| !ctx.exclusion.is_excluded(path, &self.settings))
            .collect();
        let excluded = total - paths.len();

        info!(
            items = paths.len(),
            excluded,
            "Starting dependency cache build"
        );
        self.store.clear();
        Ok(BuildOperation::new(self, ctx, paths, excluded))
    }

    /// Build the cache synchronously.
    ///
    /// Equivalent to draining [`DependencyCache::build_async`].
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the corpus cannot be
    /// enumerated. Per-item failures are reported in [`BuildReport::errors`].
    pub fn build(&mut self, ctx: BuildContext<'_>) -> Result<BuildReport> {
        let report = self.build_async(ctx)?.finish();
        debug!(
            checkpoints = report.checkpoints,
            "Synchronous build drained"
        );
        Ok(report)
    }

    /// Look up the node of `id`.
    #[must_use]
    pub fn try_get_node(&self, id: &ContentId) -> Option<&DependencyNode> {
        self.store.try_get(id)
    }

    /// Iterate over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.store.nodes()
    }

    /// Returns `true` if `from` depends on `to` through a single edge.
    #[must_use]
    pub fn has_direct_dependency(&self, from: &ContentId, to: &ContentId) -> bool {
        reachability::has_direct_dependency(&self.store, from, to)
    }

    /// Returns `true` if `to` is reachable from `from` in at most `max_depth` hops.
    ///
    /// `None` means unbounded.
    #[must_use]
    pub fn has_dependency(
        &self,
        from: &ContentId,
        to: &ContentId,
        max_depth: Option<usize>,
    ) -> bool {
        reachability::has_dependency(&self.store, from, to, max_depth)
    }

    /// Transitive dependencies of `id` with the depth they were first reached at.
    #[must_use]
    pub fn dependency_tree(
        &self,
        id: &ContentId,
        max_depth: Option<usize>,
    ) -> Vec<(ContentId, usize)> {
        reachability::dependency_tree(&self.store, id, max_depth)
    }

    /// Items that transitively depend on `id`, with their depth.
    #[must_use]
    pub fn reference_tree(
        &self,
        id: &ContentId,
        max_depth: Option<usize>,
    ) -> Vec<(ContentId, usize)> {
        reachability::reference_tree(&self.store, id, max_depth)
    }

    /// Every dependency cycle in the graph.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Cycle> {
        graph::find_cycles(&self.store)
    }
}

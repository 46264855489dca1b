//! The cooperative build coordinator.
//!
//! A [`BuildOperation`] is an explicit state machine over the corpus. Every
//! call to [`Iterator::next`] resumes where the previous one stopped and runs
//! until one of:
//!
//! - `properties_per_checkpoint` structural properties were visited since the
//!   last checkpoint,
//! - a text document was finished (one checkpoint per document),
//! - the corpus is exhausted, which ends the iteration.
//!
//! Dropping the operation cancels the build. Every edge recorded up to that
//! point is complete on both sides.

use crate::cache::DependencyCache;
use crate::corpus::BuildContext;
use crate::error::ScanError;
use crate::scanner::{self, Link, Rules, Visit};
use crate::types::{ContentId, Item};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

/// Progress checkpoint yielded by a running build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheBuildOperation {
    /// Number of items that survived exclusion
    pub total_items: usize,
    /// Path of the item being scanned
    pub current_item: Option<String>,
    /// Items finished so far, failed ones included
    pub items_processed: usize,
    /// Properties visited since the previous checkpoint
    pub properties_since_checkpoint: usize,
    /// Properties visited since the build started
    pub properties_visited: usize,
}

impl CacheBuildOperation {
    /// Fraction of items finished, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total_items == 0 {
            return 1.0;
        }
        self.items_processed as f64 / self.total_items as f64
    }
}

/// Summary of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Items scanned without error
    pub items_scanned: usize,
    /// Items skipped by the exclusion rule
    pub items_excluded: usize,
    /// Per-item failures; the build continued past each one
    pub errors: Vec<ScanError>,
    /// Structural properties visited
    pub properties_visited: usize,
    /// Distinct edges added to the store
    pub links_recorded: usize,
    /// Dependency properties that did not resolve to an item
    pub skipped_unresolved: usize,
    /// References into the reserved namespace
    pub skipped_reserved: usize,
    /// Checkpoints yielded
    pub checkpoints: usize,
    /// Nodes in the store when the build finished
    pub nodes: usize,
    /// Edges in the store when the build finished
    pub edges: usize,
}

impl BuildReport {
    /// Number of items that failed to scan.
    #[must_use]
    pub fn items_failed(&self) -> usize {
        self.errors.len()
    }
}

/// The item whose visits are being replayed.
struct ActiveItem {
    subject: ContentId,
    visits: std::vec::IntoIter<Visit>,
}

/// A running build of a [`DependencyCache`].
///
/// Obtained from [`DependencyCache::build_async`]. The operation borrows the
/// cache mutably, so no query can observe the store until it is dropped.
pub struct BuildOperation<'a> {
    cache: &'a mut DependencyCache,
    ctx: BuildContext<'a>,
    pending: std::vec::IntoIter<String>,
    active: Option<ActiveItem>,
    progress: CacheBuildOperation,
    report: BuildReport,
    finished: bool,
}

impl<'a> BuildOperation<'a> {
    pub(crate) fn new(
        cache: &'a mut DependencyCache,
        ctx: BuildContext<'a>,
        paths: Vec<String>,
        items_excluded: usize,
    ) -> Self {
        let progress = CacheBuildOperation {
            total_items: paths.len(),
            ..CacheBuildOperation::default()
        };
        let report = BuildReport {
            items_excluded,
            ..BuildReport::default()
        };
        Self {
            cache,
            ctx,
            pending: paths.into_iter(),
            active: None,
            progress,
            report,
            finished: false,
        }
    }

    /// The current progress, without advancing the build.
    #[must_use]
    pub fn progress(&self) -> &CacheBuildOperation {
        &self.progress
    }

    /// The report so far.
    ///
    /// Node and edge counts are filled in when the build finishes.
    #[must_use]
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Returns `true` once the corpus is exhausted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run the build to completion and return its report.
    #[must_use]
    pub fn finish(mut self) -> BuildReport {
        self.by_ref().for_each(drop);
        self.report
    }

    /// Take a checkpoint and reset the per-checkpoint counter.
    fn checkpoint(&mut self) -> CacheBuildOperation {
        self.report.checkpoints += 1;
        let snapshot = self.progress.clone();
        self.progress.properties_since_checkpoint = 0;
        snapshot
    }

    fn fail(&mut self, error: ScanError) {
        warn!(
            path = %error.path.display(),
            kind = %error.kind,
            error = %error.message,
            "Failed to scan item"
        );
        self.report.errors.push(error);
        self.progress.items_processed += 1;
    }

    /// Resolve, load and classify the next item.
    ///
    /// Returns `true` if a checkpoint is due, which happens after a text
    /// document is scanned.
    fn start_item(&mut self, path: String) -> bool {
        self.progress.current_item = Some(path.clone());

        let subject = match self.ctx.corpus.content_id(&path) {
            Ok(id) => id,
            Err(e) => {
                self.fail(e);
                return false;
            }
        };
        self.cache.store.create_or_get(&subject);

        let item = match self.ctx.corpus.load_item(&path) {
            Ok(item) => item,
            Err(e) => {
                self.fail(e);
                return false;
            }
        };
        debug!(path = %path, id = %subject, shape = %item.shape(), "Scanning item");

        let rules = Rules {
            settings: &self.cache.settings,
            resolver: self.ctx.resolver,
            predicate: self.ctx.predicate,
        };
        let visits = match item {
            Item::Object(object) => scanner::scan_object(&object, rules),
            Item::Composite(root) => scanner::scan_composite(&root, rules),
            Item::Document => {
                let text = match self.ctx.corpus.raw_text(&path) {
                    Ok(text) => text,
                    Err(e) => {
                        self.fail(e);
                        return false;
                    }
                };
                for visit in scanner::scan_document(&text, self.ctx.resolver) {
                    self.apply(&subject, visit);
                }
                self.complete_item();
                return true;
            }
        };

        self.active = Some(ActiveItem {
            subject,
            visits: visits.into_iter(),
        });
        false
    }

    fn complete_item(&mut self) {
        self.active = None;
        self.report.items_scanned += 1;
        self.progress.items_processed += 1;
    }

    /// Record the outcome of one visit in the store.
    fn apply(&mut self, subject: &ContentId, visit: Visit) {
        match visit {
            Visit::Plain => {}
            Visit::Unresolved => {
                trace!(subject = %subject, "Skipping unresolved reference");
                self.report.skipped_unresolved += 1;
            }
            Visit::Reserved => {
                trace!(subject = %subject, "Skipping reserved reference");
                self.report.skipped_reserved += 1;
            }
            Visit::Link(Link { target, local_id }) => {
                let store = &mut self.cache.store;
                store.create_or_get(&target);
                if let Some(local_id) = local_id
                    && let Err(e) = store.set_local_id(&target, local_id)
                {
                    warn!(target = %target, error = %e, "Failed to record local id");
                }
                match store.connect(subject, &target) {
                    Ok(true) => self.report.links_recorded += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            subject = %subject,
                            target = %target,
                            error = %e,
                            "Failed to connect"
                        );
                    }
                }
            }
        }
    }

    fn complete_build(&mut self) {
        self.finished = true;
        self.progress.current_item = None;
        self.report.properties_visited = self.progress.properties_visited;
        self.report.nodes = self.cache.store.len();
        self.report.edges = self.cache.store.edge_count();
        info!(
            items = self.report.items_scanned,
            failed = self.report.items_failed(),
            nodes = self.report.nodes,
            edges = self.report.edges,
            "Dependency cache build finished"
        );
    }
}

impl Iterator for BuildOperation<'_> {
    type Item = CacheBuildOperation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let per_checkpoint = self.cache.settings.properties_per_checkpoint.max(1);
        loop {
            let Some(active) = self.active.as_mut() else {
                let Some(path) = self.pending.next() else {
                    self.complete_build();
                    return None;
                };
                if self.start_item(path) {
                    return Some(self.checkpoint());
                }
                continue;
            };

            let Some(visit) = active.visits.next() else {
                self.complete_item();
                continue;
            };
            let subject = active.subject.clone();
            self.apply(&subject, visit);

            self.progress.properties_visited += 1;
            self.progress.properties_since_checkpoint += 1;
            self.report.properties_visited = self.progress.properties_visited;
            if self.progress.properties_since_checkpoint >= per_checkpoint {
                return Some(self.checkpoint());
            }
        }
    }
}

impl std::fmt::Debug for BuildOperation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOperation")
            .field("progress", &self.progress)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCorpus;
    use crate::rules::DefaultRules;
    use crate::settings::CacheSettings;
    use crate::types::{ObjectReference, Property, SerializedObject};

    const SHADER: &str = "7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d";

    fn material(properties: usize) -> SerializedObject {
        let mut props: Vec<Property> = (0..properties)
            .map(|i| Property::scalar(format!("m_Float{i}"), "0.5"))
            .collect();
        props.push(Property::reference("m_Shader", ObjectReference::external(SHADER, 4_800_000)));
        SerializedObject::new("Material", props)
    }

    fn settings(per_checkpoint: usize) -> CacheSettings {
        CacheSettings {
            properties_per_checkpoint: per_checkpoint,
            ..CacheSettings::default()
        }
    }

    #[test]
    fn checkpoints_every_n_properties() {
        // 9 scalars + 1 reference = 10 properties
        let corpus = MemoryCorpus::new().insert_object("Assets/A.mat", "a", material(9));
        let mut cache = DependencyCache::new(settings(4));
        let rules = DefaultRules::new(cache.settings());

        let checkpoints: Vec<_> = cache
            .build_async(BuildContext::with_defaults(&corpus, &rules))
            .unwrap()
            .collect();

        assert_eq!(checkpoints.len(), 2);
        for checkpoint in &checkpoints {
            assert_eq!(checkpoint.properties_since_checkpoint, 4);
        }
        assert_eq!(checkpoints[0].current_item.as_deref(), Some("Assets/A.mat"));
        assert_eq!(checkpoints[1].properties_visited, 8);
        assert!(cache.has_direct_dependency(&"a".into(), &SHADER.into()));
    }

    #[test]
    fn text_document_yields_one_checkpoint() {
        let corpus = MemoryCorpus::new().insert_document(
            "Assets/Level.unity",
            "lvl",
            format!("m_Shader: {{fileID: 1, guid: {SHADER}}}"),
        );
        let mut cache = DependencyCache::new(settings(100));
        let rules = DefaultRules::new(cache.settings());

        let mut build = cache
            .build_async(BuildContext::with_defaults(&corpus, &rules))
            .unwrap();
        let checkpoint = build.next().unwrap();

        assert_eq!(checkpoint.items_processed, 1);
        assert_eq!(checkpoint.properties_since_checkpoint, 0);
        assert!(build.next().is_none());
        assert!(build.is_finished());
        assert_eq!(build.report().links_recorded, 1);
    }

    #[test]
    fn finished_build_stays_finished() {
        let corpus = MemoryCorpus::new();
        let mut cache = DependencyCache::new(CacheSettings::default());
        let rules = DefaultRules::new(cache.settings());

        let mut build = cache
            .build_async(BuildContext::with_defaults(&corpus, &rules))
            .unwrap();

        assert!(build.next().is_none());
        assert!(build.next().is_none());
        assert_eq!(build.progress().fraction(), 1.0);
    }

    #[test]
    fn report_counts_skips() {
        let object = SerializedObject::new(
            "MeshRenderer",
            vec![
                Property::reference("m_Parent", ObjectReference::local(400_000)),
                Property::reference(
                    "m_Builtin",
                    ObjectReference::external("0000000000000000f000000000000000", 10_303),
                ),
                Property::reference("m_Material", ObjectReference::external("m", 2_100_000)),
            ],
        );
        let corpus = MemoryCorpus::new().insert_object("Assets/R.asset", "r", object);
        let mut cache = DependencyCache::new(CacheSettings::default());
        let rules = DefaultRules::new(cache.settings());

        let report = cache
            .build(BuildContext::with_defaults(&corpus, &rules))
            .unwrap();

        assert_eq!(report.items_scanned, 1);
        assert_eq!(report.properties_visited, 3);
        assert_eq!(report.skipped_unresolved, 1);
        assert_eq!(report.skipped_reserved, 1);
        assert_eq!(report.links_recorded, 1);
        assert_eq!(report.nodes, 2);
        assert_eq!(report.edges, 1);
    }

    #[test]
    fn excluded_items_are_counted_not_scanned() {
        let corpus = MemoryCorpus::new()
            .insert_object("Assets/A.mat", "a", material(0))
            .insert_object("Packages/B.mat", "b", material(0));
        let mut cache = DependencyCache::new(CacheSettings::default());
        let rules = DefaultRules::new(cache.settings());

        let report = cache
            .build(BuildContext::with_defaults(&corpus, &rules))
            .unwrap();

        assert_eq!(report.items_scanned, 1);
        assert_eq!(report.items_excluded, 1);
        assert!(cache.try_get_node(&"b".into()).is_none());
    }
}

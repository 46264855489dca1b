//! Default implementations of the build rules.
//!
//! These follow the conventions of engine project trees where every asset
//! has a 32-character hex `guid` and references are serialized as
//! `{fileID: N, guid: G, type: T}`:
//!
//! - [`GlobExclusion`]: include prefix plus glob exclude filters
//! - [`ReferencePredicate`]: any non-null reference not named in `ignored-properties`
//! - [`GuidResolver`]: a reference with a guid resolves to `(guid, file_id)`

use crate::corpus::{DependencyPredicate, ExclusionRule, IdentityResolver};
use crate::settings::CacheSettings;
use crate::types::{ContentId, LocalId, VisitedProperty};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;

/// Excludes paths outside the include prefix or matching an exclude filter.
#[derive(Debug, Clone)]
pub struct GlobExclusion {
    filters: GlobSet,
}

impl GlobExclusion {
    /// Compile the exclude filters of `settings`.
    ///
    /// Invalid patterns are logged and skipped rather than failing the build.
    #[must_use]
    pub fn new(settings: &CacheSettings) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in &settings.exclude_filters {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!(pattern = %pattern, error = %e, "Ignoring invalid exclude filter"),
            }
        }
        let filters = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to compile exclude filters, excluding nothing");
            GlobSet::empty()
        });
        Self { filters }
    }
}

impl ExclusionRule for GlobExclusion {
    fn is_excluded(&self, path: &str, settings: &CacheSettings) -> bool {
        !path.starts_with(&settings.include_prefix) || self.filters.is_match(path)
    }
}

/// Treats every non-null reference as a dependency, except ignored property names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferencePredicate;

impl DependencyPredicate for ReferencePredicate {
    fn is_dependency(&self, settings: &CacheSettings, property: &VisitedProperty) -> bool {
        property.holds_reference()
            && !settings
                .ignored_properties
                .iter()
                .any(|ignored| ignored == &property.name)
    }
}

/// Resolves references through their serialized guid.
#[derive(Debug, Clone)]
pub struct GuidResolver {
    reserved_prefix: String,
}

impl GuidResolver {
    /// Create a resolver treating IDs with `reserved_prefix` as built-in.
    ///
    /// An empty prefix reserves nothing.
    pub fn new(reserved_prefix: impl Into<String>) -> Self {
        Self {
            reserved_prefix: reserved_prefix.into(),
        }
    }
}

impl IdentityResolver for GuidResolver {
    fn resolve_reference(
        &self,
        property: &VisitedProperty,
    ) -> Option<(ContentId, Option<LocalId>)> {
        let reference = property.reference.as_ref()?;
        let guid = reference.guid.as_ref()?;
        if guid.as_str().is_empty() {
            return None;
        }
        Some((guid.clone(), Some(reference.file_id)))
    }

    fn is_reserved(&self, id: &ContentId) -> bool {
        !self.reserved_prefix.is_empty() && id.as_str().starts_with(&self.reserved_prefix)
    }
}

/// The default rule set, built from one [`CacheSettings`].
#[derive(Debug, Clone)]
pub struct DefaultRules {
    /// Path exclusion
    pub exclusion: GlobExclusion,
    /// Dependency property test
    pub predicate: ReferencePredicate,
    /// Reference resolution
    pub resolver: GuidResolver,
}

impl DefaultRules {
    /// Build the default rules for `settings`.
    #[must_use]
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            exclusion: GlobExclusion::new(settings),
            predicate: ReferencePredicate,
            resolver: GuidResolver::new(settings.reserved_prefix.clone()),
        }
    }
}

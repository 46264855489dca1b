//! Host-supplied collaborators of the build.
//!
//! The cache never touches the file system or decides what a reference is on
//! its own. The host provides:
//!
//! - a [`Corpus`] that lists items and loads their content,
//! - an [`IdentityResolver`] that turns reference properties into content IDs,
//! - an [`ExclusionRule`] that keeps items out of the build,
//! - a [`DependencyPredicate`] that decides which properties are dependency links.
//!
//! Plain closures implement the two rule traits, which keeps tests short.
//! [`crate::rules`] has default implementations of the last three.

use crate::error::{Result, ScanError};
use crate::settings::CacheSettings;
use crate::types::{ContentId, Item, LocalId, VisitedProperty};

/// Source of the items to scan.
pub trait Corpus {
    /// List every item path, in the order the build should visit them.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be enumerated at all.
    fn item_paths(&self) -> Result<Vec<String>>;

    /// Content ID of the item at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the item has no identifier.
    fn content_id(&self, path: &str) -> std::result::Result<ContentId, ScanError>;

    /// Load and classify the item at `path`.
    ///
    /// Text documents are returned as [`Item::Document`] without reading
    /// their content; the scanner asks for [`Corpus::raw_text`] instead.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the item cannot be read or parsed.
    fn load_item(&self, path: &str) -> std::result::Result<Item, ScanError>;

    /// The raw text of the item at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] of kind `Read` if the text is unavailable.
    fn raw_text(&self, path: &str) -> std::result::Result<String, ScanError>;
}

/// Maps reference properties to stable content identifiers.
pub trait IdentityResolver {
    /// Resolve the target of a reference property.
    ///
    /// Returns `None` if the property does not resolve to another item.
    fn resolve_reference(&self, property: &VisitedProperty) -> Option<(ContentId, Option<LocalId>)>;

    /// Returns `true` for IDs of built-in resources outside the corpus.
    fn is_reserved(&self, id: &ContentId) -> bool;
}

/// Decides which items stay out of the build.
pub trait ExclusionRule {
    /// Returns `true` if the item at `path` must not be scanned.
    fn is_excluded(&self, path: &str, settings: &CacheSettings) -> bool;
}

impl<F> ExclusionRule for F
where
    F: Fn(&str, &CacheSettings) -> bool,
{
    fn is_excluded(&self, path: &str, settings: &CacheSettings) -> bool {
        self(path, settings)
    }
}

/// Decides whether a structural property is a dependency link.
pub trait DependencyPredicate {
    /// Returns `true` if `property` links to another item.
    fn is_dependency(&self, settings: &CacheSettings, property: &VisitedProperty) -> bool;
}

impl<F> DependencyPredicate for F
where
    F: Fn(&CacheSettings, &VisitedProperty) -> bool,
{
    fn is_dependency(&self, settings: &CacheSettings, property: &VisitedProperty) -> bool {
        self(settings, property)
    }
}

/// Everything a build needs from the host, borrowed for the build's duration.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    /// Items to scan
    pub corpus: &'a dyn Corpus,
    /// Reference resolution
    pub resolver: &'a dyn IdentityResolver,
    /// Dependency property test
    pub predicate: &'a dyn DependencyPredicate,
    /// Item exclusion
    pub exclusion: &'a dyn ExclusionRule,
}

impl<'a> BuildContext<'a> {
    /// Bundle the collaborators of a build.
    #[must_use]
    pub fn new(
        corpus: &'a dyn Corpus,
        resolver: &'a dyn IdentityResolver,
        predicate: &'a dyn DependencyPredicate,
        exclusion: &'a dyn ExclusionRule,
    ) -> Self {
        Self {
            corpus,
            resolver,
            predicate,
            exclusion,
        }
    }

    /// Use the [`DefaultRules`](crate::rules::DefaultRules) for everything but the corpus.
    #[must_use]
    pub fn with_defaults(corpus: &'a dyn Corpus, rules: &'a crate::rules::DefaultRules) -> Self {
        Self::new(corpus, &rules.resolver, &rules.predicate, &rules.exclusion)
    }
}

impl std::fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext").finish_non_exhaustive()
    }
}

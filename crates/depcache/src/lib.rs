//! # depcache: asset dependency cache
//!
//! `depcache` scans a corpus of structured content items and records which
//! item references which. Every edge is stored in both directions, so a
//! node knows its **dependencies** (what it points to) and its
//! **references** (what points to it).
//!
//! ## Design
//!
//! - **Rebuild, don't migrate** - every build clears the store and scans the corpus again
//! - **Cooperative** - a build is an iterator of checkpoints; the caller decides the pace
//! - **Host-pluggable** - corpus access, exclusion, dependency detection and identity
//!   resolution are traits, with defaults in [`rules`]
//! - **Cycle-safe** - cycles are ordinary data; every traversal keeps a visited set
//!
//! ## Quick Start
//!
//! ```
//! use depcache::rules::DefaultRules;
//! use depcache::{
//!     BuildContext, CacheSettings, ContentId, DependencyCache, MemoryCorpus, ObjectReference,
//!     Property, SerializedObject,
//! };
//!
//! let texture = "1f4c0e3ab26d4e8f9a7b6c5d4e3f2a1b";
//! let corpus = MemoryCorpus::new()
//!     .insert_object(
//!         "Assets/Wood.mat",
//!         "9fd2b1c4a7e04b56a1c3d2e1f0a9b8c7",
//!         SerializedObject::new(
//!             "Material",
//!             vec![Property::reference(
//!                 "m_MainTex",
//!                 ObjectReference::external(texture, 2_800_000),
//!             )],
//!         ),
//!     )
//!     .insert_object("Assets/Wood.png", texture, SerializedObject::default());
//!
//! let mut cache = DependencyCache::new(CacheSettings::default());
//! let rules = DefaultRules::new(cache.settings());
//!
//! // Drive the build one checkpoint at a time, or call `build` to drain it
//! for checkpoint in cache.build_async(BuildContext::with_defaults(&corpus, &rules))? {
//!     println!("{}/{} items", checkpoint.items_processed, checkpoint.total_items);
//! }
//!
//! let material = ContentId::new("9fd2b1c4a7e04b56a1c3d2e1f0a9b8c7");
//! assert!(cache.has_direct_dependency(&material, &ContentId::new(texture)));
//! # Ok::<(), depcache::Error>(())
//! ```

mod build;
mod cache;
mod corpus;
mod error;
mod graph;
mod memory;
mod reachability;
pub mod rules;
mod scanner;
mod settings;
mod store;
mod stream;
mod types;

pub use build::{BuildOperation, BuildReport, CacheBuildOperation};
pub use cache::DependencyCache;
pub use corpus::{BuildContext, Corpus, DependencyPredicate, ExclusionRule, IdentityResolver};
pub use error::{Error, Result, ScanError, ScanErrorKind};
pub use graph::{Cycle, find_cycles};
pub use memory::MemoryCorpus;
pub use reachability::{dependency_tree, has_dependency, has_direct_dependency, reference_tree};
pub use settings::{
    CacheSettings, DEFAULT_INCLUDE_PREFIX, DEFAULT_PROPERTIES_PER_CHECKPOINT,
    DEFAULT_RESERVED_PREFIX,
};
pub use store::{DependencyNode, GraphStore};
pub use stream::BuildStream;
pub use types::{
    ContentId, Entity, Item, ItemShape, LocalId, ObjectReference, Property, PropertyValue,
    SerializedObject, VisitedProperty,
};

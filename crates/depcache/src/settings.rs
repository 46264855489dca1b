//! Build settings shared by the coordinator and the default rules.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of properties visited between two checkpoints.
pub const DEFAULT_PROPERTIES_PER_CHECKPOINT: usize = 100;

/// Default prefix an item path must start with to be scanned.
pub const DEFAULT_INCLUDE_PREFIX: &str = "Assets/";

/// Default prefix of content IDs that belong to built-in resources.
pub const DEFAULT_RESERVED_PREFIX: &str = "0000000000000000";

/// Settings for building the dependency cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheSettings {
    /// Structural properties to visit before yielding a checkpoint
    pub properties_per_checkpoint: usize,

    /// Only paths starting with this prefix are scanned (empty for all)
    pub include_prefix: String,

    /// Glob patterns of paths to leave out of the build
    pub exclude_filters: Vec<String>,

    /// Property names never treated as dependencies
    pub ignored_properties: Vec<String>,

    /// Content IDs starting with this prefix are built-in and never recorded
    pub reserved_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            properties_per_checkpoint: DEFAULT_PROPERTIES_PER_CHECKPOINT,
            include_prefix: DEFAULT_INCLUDE_PREFIX.to_string(),
            exclude_filters: Vec::new(),
            ignored_properties: Vec::new(),
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_string(),
        }
    }
}

impl CacheSettings {
    /// Check that the settings can drive a build.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `properties_per_checkpoint` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.properties_per_checkpoint == 0 {
            return Err(Error::Config("properties-per-checkpoint must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Parse the comma-separated filter list used by older settings files.
    #[must_use]
    pub fn with_filter_list(mut self, filters: &str) -> Self {
        self.exclude_filters.extend(
            filters
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        );
        self
    }
}

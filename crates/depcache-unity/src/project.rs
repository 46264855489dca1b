//! [`Corpus`] over an on-disk project tree.

use crate::error::{Error, Result};
use crate::hierarchy::build_hierarchy;
use crate::meta::{self, META_EXTENSION};
use crate::yaml::{self, YamlDocument};
use depcache::{ContentId, Corpus, Item, ItemShape, Property, ScanError, SerializedObject};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Extension of hierarchical composite assets.
pub const PREFAB_EXTENSION: &str = "prefab";

/// Extension of assets scanned as raw text.
pub const SCENE_EXTENSION: &str = "unity";

/// A project tree whose assets carry their content ID in `.meta` sidecars.
#[derive(Debug, Clone)]
pub struct ProjectCorpus {
    root: PathBuf,
}

impl ProjectCorpus {
    /// Open the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::ProjectNotFound(root));
        }
        Ok(Self { root })
    }

    /// The project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan strategy for the asset at `path`, decided by its extension.
    #[must_use]
    pub fn shape_of(path: &str) -> ItemShape {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(PREFAB_EXTENSION) => ItemShape::HierarchicalComposite,
            Some(SCENE_EXTENSION) => ItemShape::TextDocument,
            _ => ItemShape::Default,
        }
    }

    /// Map every asset with a readable sidecar to its project-relative path.
    ///
    /// # Errors
    ///
    /// Returns an error if the project cannot be enumerated.
    pub fn path_index(&self) -> depcache::Result<HashMap<ContentId, String>> {
        Ok(self
            .item_paths()?
            .into_iter()
            .filter_map(|path| self.content_id(&path).ok().map(|id| (id, path)))
            .collect())
    }

    /// Resolve a command-line argument to a content ID.
    ///
    /// The argument may be a content ID already known to `index`, or a
    /// project-relative path of an asset with a sidecar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAsset`] if neither interpretation matches.
    pub fn resolve(&self, index: &HashMap<ContentId, String>, target: &str) -> Result<ContentId> {
        let as_id = ContentId::new(target);
        if index.contains_key(&as_id) {
            return Ok(as_id);
        }
        let normalized = target.replace('\\', "/");
        if let Some((id, _)) = index.iter().find(|(_, path)| **path == normalized) {
            return Ok(id.clone());
        }
        self.content_id(&normalized)
            .map_err(|_| Error::UnknownAsset(target.to_string()))
    }

    fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn relative(&self, entry: &DirEntry) -> Option<String> {
        let relative = entry.path().strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        Some(parts.join("/"))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_meta(entry: &DirEntry) -> bool {
    entry
        .path()
        .extension()
        .is_some_and(|e| e == META_EXTENSION)
}

impl Corpus for ProjectCorpus {
    fn item_paths(&self) -> depcache::Result<Vec<String>> {
        let mut paths = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable project entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || is_meta(&entry) {
                continue;
            }
            if let Some(path) = self.relative(&entry) {
                paths.push(path);
            }
        }

        debug!(root = %self.root.display(), assets = paths.len(), "Enumerated project");
        Ok(paths)
    }

    fn content_id(&self, path: &str) -> std::result::Result<ContentId, ScanError> {
        meta::read_guid(&self.absolute(path), path)
    }

    fn load_item(&self, path: &str) -> std::result::Result<Item, ScanError> {
        let shape = Self::shape_of(path);
        if shape == ItemShape::TextDocument {
            return Ok(Item::Document);
        }

        let bytes = std::fs::read(self.absolute(path))
            .map_err(|e| ScanError::read(path, &e))?;
        let Ok(text) = std::str::from_utf8(&bytes) else {
            // Binary imported asset: no serialized references
            return Ok(Item::Object(SerializedObject::default()));
        };
        if !yaml::is_yaml_asset(text) {
            return Ok(Item::Object(SerializedObject::default()));
        }

        let documents = yaml::parse_documents(text)
            .map_err(|message| ScanError::parse(path, message))?;
        match shape {
            ItemShape::HierarchicalComposite => {
                let name = Path::new(path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(Item::Composite(build_hierarchy(&name, documents)))
            }
            ItemShape::Default | ItemShape::TextDocument => Ok(Item::Object(merge(documents))),
        }
    }

    fn raw_text(&self, path: &str) -> std::result::Result<String, ScanError> {
        std::fs::read_to_string(self.absolute(path)).map_err(|e| ScanError::read(path, &e))
    }
}

/// Fold the documents of a plain asset into one object.
///
/// A single document is the object itself; sub-assets become nested
/// properties named after their type.
fn merge(mut documents: Vec<YamlDocument>) -> SerializedObject {
    if documents.len() == 1 {
        return documents.remove(0).object;
    }
    let type_name = documents
        .first()
        .map(|d| d.object.type_name.clone())
        .unwrap_or_default();
    let properties = documents
        .into_iter()
        .map(|d| Property::nested(d.object.type_name, d.object.properties))
        .collect();
    SerializedObject::new(type_name, properties)
}

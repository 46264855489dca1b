//! In-memory corpus for tests and embedders that already hold their items.

use crate::corpus::Corpus;
use crate::error::{Result, ScanError};
use crate::types::{ContentId, Entity, Item, SerializedObject};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Entry {
    Object(SerializedObject),
    Composite(Entity),
    Document(String),
    Unreadable(String),
}

#[derive(Debug, Clone)]
struct Stored {
    id: ContentId,
    entry: Entry,
}

/// A [`Corpus`] backed by a map of path to item.
///
/// Paths are enumerated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    order: Vec<String>,
    items: BTreeMap<String, Stored>,
}

impl MemoryCorpus {
    /// Create an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(mut self, path: impl Into<String>, id: impl Into<ContentId>, entry: Entry) -> Self {
        let path = path.into();
        let stored = Stored {
            id: id.into(),
            entry,
        };
        if self.items.insert(path.clone(), stored).is_none() {
            self.order.push(path);
        }
        self
    }

    /// Add a structured object.
    #[must_use]
    pub fn insert_object(
        self,
        path: impl Into<String>,
        id: impl Into<ContentId>,
        object: SerializedObject,
    ) -> Self {
        self.insert(path, id, Entry::Object(object))
    }

    /// Add an entity hierarchy.
    #[must_use]
    pub fn insert_composite(
        self,
        path: impl Into<String>,
        id: impl Into<ContentId>,
        root: Entity,
    ) -> Self {
        self.insert(path, id, Entry::Composite(root))
    }

    /// Add a text document.
    #[must_use]
    pub fn insert_document(
        self,
        path: impl Into<String>,
        id: impl Into<ContentId>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(path, id, Entry::Document(text.into()))
    }

    /// Add a text document whose content cannot be read.
    #[must_use]
    pub fn insert_unreadable(
        self,
        path: impl Into<String>,
        id: impl Into<ContentId>,
        reason: impl Into<String>,
    ) -> Self {
        self.insert(path, id, Entry::Unreadable(reason.into()))
    }

    /// Same items, enumerated in reverse order.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.order.reverse();
        self
    }

    fn get(&self, path: &str) -> std::result::Result<&Stored, ScanError> {
        self.items.get(path).ok_or_else(|| {
            ScanError::read(
                path,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "no such item"),
            )
        })
    }
}

impl Corpus for MemoryCorpus {
    fn item_paths(&self) -> Result<Vec<String>> {
        Ok(self.order.clone())
    }

    fn content_id(&self, path: &str) -> std::result::Result<ContentId, ScanError> {
        self.items
            .get(path)
            .map(|stored| stored.id.clone())
            .ok_or_else(|| ScanError::missing_id(path))
    }

    fn load_item(&self, path: &str) -> std::result::Result<Item, ScanError> {
        Ok(match &self.get(path)?.entry {
            Entry::Object(object) => Item::Object(object.clone()),
            Entry::Composite(root) => Item::Composite(root.clone()),
            Entry::Document(_) | Entry::Unreadable(_) => Item::Document,
        })
    }

    fn raw_text(&self, path: &str) -> std::result::Result<String, ScanError> {
        match &self.get(path)?.entry {
            Entry::Document(text) => Ok(text.clone()),
            Entry::Unreadable(reason) => Err(ScanError::read(
                path,
                &std::io::Error::new(std::io::ErrorKind::InvalidData, reason.clone()),
            )),
            Entry::Object(_) | Entry::Composite(_) => {
                Err(ScanError::parse(path, "item is not a text document"))
            }
        }
    }
}

//! Core domain types: content identifiers and the structural item model.
//!
//! Items arrive from a [`Corpus`](crate::Corpus) as a closed [`Item`] variant.
//! Structured items are trees of [`Property`] values; text documents carry no
//! structure and are scanned from their raw text instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable content identifier assigned to an item by the host.
///
/// The identifier is opaque: any string, including the empty string, is a
/// valid key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    /// Create a new content ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a sub-object inside an item.
pub type LocalId = i64;

/// How an item must be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemShape {
    /// A single structured object; every property is walked.
    Default,
    /// An entity hierarchy; the components of the root and all descendants are walked.
    HierarchicalComposite,
    /// A document too large to deserialize; its raw text is scanned for identifiers.
    TextDocument,
}

impl fmt::Display for ItemShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::HierarchicalComposite => write!(f, "composite"),
            Self::TextDocument => write!(f, "document"),
        }
    }
}

/// A reference exactly as it was serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    /// Content ID of the referenced item, absent for references within the same item.
    pub guid: Option<ContentId>,
    /// Sub-object inside the referenced item (`0` for none).
    pub file_id: LocalId,
}

impl ObjectReference {
    /// A reference to a sub-object of another item.
    pub fn external(guid: impl Into<ContentId>, file_id: LocalId) -> Self {
        Self {
            guid: Some(guid.into()),
            file_id,
        }
    }

    /// A reference to a sub-object of the item that holds it.
    #[must_use]
    pub fn local(file_id: LocalId) -> Self {
        Self {
            guid: None,
            file_id,
        }
    }

    /// Returns `true` for the serialized form of "no object".
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.guid.is_none() && self.file_id == 0
    }
}

/// Value held by a structural property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Any leaf value that is not a reference.
    Scalar(String),
    /// A reference to another object.
    Reference(ObjectReference),
    /// A nested structure; arrays are nested structures with indexed names.
    Nested(Vec<Property>),
}

/// A named structural property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name within its parent
    pub name: String,
    /// Property value
    pub value: PropertyValue,
}

impl Property {
    /// Create a scalar property.
    pub fn scalar(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Scalar(value.into()),
        }
    }

    /// Create a reference property.
    pub fn reference(name: impl Into<String>, reference: ObjectReference) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Reference(reference),
        }
    }

    /// Create a nested property.
    pub fn nested(name: impl Into<String>, children: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Nested(children),
        }
    }
}

/// One structural container: an object or a component of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializedObject {
    /// Type of the object (e.g. `Material`, `MeshRenderer`)
    pub type_name: String,
    /// Top-level properties in declaration order
    pub properties: Vec<Property>,
}

impl SerializedObject {
    /// Create an object with the given type and properties.
    pub fn new(type_name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            type_name: type_name.into(),
            properties,
        }
    }
}

/// A node of a hierarchical composite item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Display name
    pub name: String,
    /// Whether the entity is active; inactive entities are still scanned
    pub active: bool,
    /// Components attached to this entity
    pub components: Vec<SerializedObject>,
    /// Child entities
    pub children: Vec<Entity>,
}

impl Entity {
    /// Create an active entity without components or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a component.
    #[must_use]
    pub fn with_component(mut self, component: SerializedObject) -> Self {
        self.components.push(component);
        self
    }

    /// Add a child entity.
    #[must_use]
    pub fn with_child(mut self, child: Entity) -> Self {
        self.children.push(child);
        self
    }

    /// Mark the entity inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// A loaded item, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A single structured object
    Object(SerializedObject),
    /// An entity hierarchy
    Composite(Entity),
    /// A text document, scanned from its raw text
    Document,
}

impl Item {
    /// The shape that decides which scan strategy applies.
    #[must_use]
    pub fn shape(&self) -> ItemShape {
        match self {
            Self::Object(_) => ItemShape::Default,
            Self::Composite(_) => ItemShape::HierarchicalComposite,
            Self::Document => ItemShape::TextDocument,
        }
    }
}

/// A property as seen by the dependency predicate and the identity resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedProperty {
    /// Dotted path from the container root (e.g. `m_Materials.Array.data[0]`)
    pub path: String,
    /// The property's own name
    pub name: String,
    /// Type of the container the property belongs to
    pub container: String,
    /// The reference held by the property, if it holds one
    pub reference: Option<ObjectReference>,
}

impl VisitedProperty {
    /// Returns `true` if the property holds a non-null reference.
    #[must_use]
    pub fn holds_reference(&self) -> bool {
        self.reference.as_ref().is_some_and(|r| !r.is_null())
    }
}

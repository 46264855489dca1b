//! Rebuilding the entity tree of a prefab from its flat document list.
//!
//! A prefab file stores game objects, components and transforms as sibling
//! documents linked by file ID:
//!
//! - `GameObject.m_Component` lists the file IDs of the object's components
//! - `Transform.m_Father` points to the parent's transform
//! - `Transform.m_GameObject` points back to the owning game object
//!
//! Documents owned by no game object (prefab instances, loose components)
//! are attached to the root so their references are still scanned.
//! Stripped documents are placeholders for objects of a nested prefab; the
//! instance's `PrefabInstance` document already carries the reference to the
//! source, so they are left out.

use crate::yaml::{YamlDocument, find};
use depcache::{Entity, LocalId, Property, PropertyValue, SerializedObject};
use std::collections::{HashMap, HashSet};

const GAME_OBJECT: &str = "GameObject";

/// Build the entity tree of a composite asset.
///
/// `name` is used for the synthetic root when the file has zero or several
/// root game objects.
#[must_use]
pub fn build_hierarchy(name: &str, documents: Vec<YamlDocument>) -> Entity {
    let documents: Vec<YamlDocument> = documents.into_iter().filter(|doc| !doc.stripped).collect();
    let index: HashMap<LocalId, usize> = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| (doc.file_id, i))
        .collect();

    let game_objects: Vec<usize> = documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| doc.object.type_name == GAME_OBJECT)
        .map(|(i, _)| i)
        .collect();

    let mut owned: HashSet<LocalId> = HashSet::new();
    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for &go in &game_objects {
        let ids = component_ids(&documents[go].object);
        owned.extend(ids.iter().copied());
        let known = ids.iter().filter_map(|id| index.get(id)).copied();
        components.insert(go, known.collect());
    }

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for &go in &game_objects {
        match parent_of(&documents, &index, &components[&go]) {
            Some(parent) if parent != go => children.entry(parent).or_default().push(go),
            _ => roots.push(go),
        }
    }

    let loose: Vec<usize> = documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| doc.object.type_name != GAME_OBJECT && !owned.contains(&doc.file_id))
        .map(|(i, _)| i)
        .collect();

    let mut slots: Vec<Option<YamlDocument>> = documents.into_iter().map(Some).collect();
    let mut visited = HashSet::new();

    let mut root = match roots.as_slice() {
        &[single] => assemble_entity(single, &components, &children, &mut slots, &mut visited)
            .unwrap_or_else(|| Entity::new(name)),
        _ => {
            let mut root = Entity::new(name);
            for &go in &roots {
                if let Some(child) =
                    assemble_entity(go, &components, &children, &mut slots, &mut visited)
                {
                    root.children.push(child);
                }
            }
            root
        }
    };

    // Objects whose parent chain loops never hang below a root
    for &go in &game_objects {
        if let Some(orphan) =
            assemble_entity(go, &components, &children, &mut slots, &mut visited)
        {
            root.children.push(orphan);
        }
    }

    for i in loose {
        if let Some(doc) = slots[i].take() {
            root.components.push(doc.object);
        }
    }
    root
}

fn assemble_entity(
    go: usize,
    components: &HashMap<usize, Vec<usize>>,
    children: &HashMap<usize, Vec<usize>>,
    slots: &mut [Option<YamlDocument>],
    visited: &mut HashSet<usize>,
) -> Option<Entity> {
    if !visited.insert(go) {
        return None;
    }
    let doc = slots[go].take()?;

    let name = match find(&doc.object.properties, "m_Name").map(|p| &p.value) {
        Some(PropertyValue::Scalar(name)) => name.clone(),
        _ => String::new(),
    };
    let mut entity = Entity::new(name);
    if matches!(
        find(&doc.object.properties, "m_IsActive").map(|p| &p.value),
        Some(PropertyValue::Scalar(active)) if active == "0"
    ) {
        entity = entity.inactive();
    }

    for &component in components.get(&go).into_iter().flatten() {
        if let Some(component) = slots[component].take() {
            entity.components.push(component.object);
        }
    }
    for &child in children.get(&go).into_iter().flatten() {
        if let Some(child) = assemble_entity(child, components, children, slots, visited) {
            entity.children.push(child);
        }
    }
    Some(entity)
}

/// File IDs listed in `GameObject.m_Component`.
fn component_ids(game_object: &SerializedObject) -> Vec<LocalId> {
    let Some(Property {
        value: PropertyValue::Nested(entries),
        ..
    }) = find(&game_object.properties, "m_Component")
    else {
        return Vec::new();
    };

    entries.iter().filter_map(first_reference).collect()
}

/// The first local file ID found in an `m_Component` entry.
///
/// Entries are `- component: {fileID: N}`, or `- 4: {fileID: N}` in older files.
fn first_reference(entry: &Property) -> Option<LocalId> {
    match &entry.value {
        PropertyValue::Reference(reference) => Some(reference.file_id),
        PropertyValue::Nested(inner) => inner.iter().find_map(first_reference),
        PropertyValue::Scalar(_) => None,
    }
}

fn reference_file_id(object: &SerializedObject, name: &str) -> Option<LocalId> {
    match find(&object.properties, name).map(|p| &p.value) {
        Some(PropertyValue::Reference(reference)) if reference.file_id != 0 => {
            Some(reference.file_id)
        }
        _ => None,
    }
}

/// Index of the parent game object, found through the transforms.
fn parent_of(
    documents: &[YamlDocument],
    index: &HashMap<LocalId, usize>,
    components: &[usize],
) -> Option<usize> {
    let father = components
        .iter()
        .find_map(|&c| reference_file_id(&documents[c].object, "m_Father"))?;
    let father_transform = &documents[*index.get(&father)?].object;
    let parent_go = reference_file_id(father_transform, "m_GameObject")?;
    index.get(&parent_go).copied()
}

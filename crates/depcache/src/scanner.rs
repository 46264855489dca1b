//! Dependency discovery, one strategy per item shape.
//!
//! Every strategy is a pure function from an item to the ordered list of
//! [`Visit`]s it produces. The coordinator replays the visits against the
//! store, which is what lets a build stop between any two properties.
//!
//! | Shape                   | Strategy                                         |
//! |-------------------------|--------------------------------------------------|
//! | `Default`               | walk every property of the object                |
//! | `HierarchicalComposite` | walk the components of the root and descendants  |
//! | `TextDocument`          | match `guid: <32 hex>` tokens in the raw text    |

use crate::corpus::{DependencyPredicate, IdentityResolver};
use crate::settings::CacheSettings;
use crate::types::{
    ContentId, Entity, LocalId, Property, PropertyValue, SerializedObject, VisitedProperty,
};
use regex::Regex;
use std::sync::LazyLock;

/// Identifier token embedded in serialized documents.
static GUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"guid: ([0-9a-f]{32})[,}]").expect("guid pattern is a valid regex")
});

/// A dependency target found by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub target: ContentId,
    pub local_id: Option<LocalId>,
}

/// What happened when one property (or one document token) was visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Visit {
    /// Not a dependency
    Plain,
    /// A dependency on another item
    Link(Link),
    /// Looked like a dependency but did not resolve to an item
    Unresolved,
    /// Resolved into the reserved namespace
    Reserved,
}

/// Rules consulted while walking structured items.
#[derive(Clone, Copy)]
pub(crate) struct Rules<'a> {
    pub settings: &'a CacheSettings,
    pub resolver: &'a dyn IdentityResolver,
    pub predicate: &'a dyn DependencyPredicate,
}

/// Walk every property of `object`, depth-first in declaration order.
pub(crate) fn scan_object(object: &SerializedObject, rules: Rules<'_>) -> Vec<Visit> {
    let mut visits = Vec::new();
    walk_object(object, rules, &mut visits);
    visits
}

/// Walk the root's own components, then the components of every descendant.
///
/// Inactive entities are included.
pub(crate) fn scan_composite(root: &Entity, rules: Rules<'_>) -> Vec<Visit> {
    let mut visits = Vec::new();
    for component in &root.components {
        walk_object(component, rules, &mut visits);
    }

    let mut stack: Vec<&Entity> = root.children.iter().rev().collect();
    while let Some(entity) = stack.pop() {
        for component in &entity.components {
            walk_object(component, rules, &mut visits);
        }
        stack.extend(entity.children.iter().rev());
    }
    visits
}

fn walk_object(object: &SerializedObject, rules: Rules<'_>, visits: &mut Vec<Visit>) {
    walk_properties(&object.type_name, "", &object.properties, rules, visits);
}

/// Extract every embedded content ID from a document's raw text.
///
/// Only links and reserved hits are produced; documents have no local IDs.
pub(crate) fn scan_document(text: &str, resolver: &dyn IdentityResolver) -> Vec<Visit> {
    GUID_PATTERN
        .captures_iter(text)
        .map(|captures| {
            let target = ContentId::new(&captures[1]);
            if resolver.is_reserved(&target) {
                Visit::Reserved
            } else {
                Visit::Link(Link {
                    target,
                    local_id: None,
                })
            }
        })
        .collect()
}

fn walk_properties(
    container: &str,
    prefix: &str,
    properties: &[Property],
    rules: Rules<'_>,
    visits: &mut Vec<Visit>,
) {
    for property in properties {
        let path = if prefix.is_empty() {
            property.name.clone()
        } else {
            format!("{prefix}.{}", property.name)
        };

        let reference = match &property.value {
            PropertyValue::Reference(reference) => Some(reference.clone()),
            PropertyValue::Scalar(_) | PropertyValue::Nested(_) => None,
        };
        let visited = VisitedProperty {
            path,
            name: property.name.clone(),
            container: container.to_string(),
            reference,
        };
        visits.push(visit(&visited, rules));

        if let PropertyValue::Nested(children) = &property.value {
            walk_properties(container, &visited.path, children, rules, visits);
        }
    }
}

fn visit(property: &VisitedProperty, rules: Rules<'_>) -> Visit {
    if !rules.predicate.is_dependency(rules.settings, property) {
        return Visit::Plain;
    }
    let Some((target, local_id)) = rules.resolver.resolve_reference(property) else {
        return Visit::Unresolved;
    };
    if rules.resolver.is_reserved(&target) {
        return Visit::Reserved;
    }
    Visit::Link(Link { target, local_id })
}

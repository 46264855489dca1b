//! Integration tests for building the dependency cache from a corpus.
//!
//! # Test Coverage
//!
//! - Mixed corpus of objects, composites and text documents
//! - Synchronous and cooperative builds producing the same graph
//! - Rebuild isolation and enumeration-order independence
//! - Per-item failures that do not abort the build
//! - Reserved namespace and custom rule closures
//! - Consistency of a store left behind by an abandoned build

use depcache::rules::DefaultRules;
use depcache::{
    BuildContext, CacheSettings, ContentId, DependencyCache, Entity, MemoryCorpus,
    ObjectReference, Property, ScanErrorKind, SerializedObject, VisitedProperty,
};
use rstest::{fixture, rstest};
use std::collections::{BTreeMap, BTreeSet};

const P: &str = "a0000000000000000000000000000001";
const Q: &str = "a0000000000000000000000000000002";
const R: &str = "a0000000000000000000000000000003";
const S: &str = "a0000000000000000000000000000004";
const T: &str = "a0000000000000000000000000000005";
const BUILTIN: &str = "0000000000000000f000000000000000";

// ============================================================================
// Helpers
// ============================================================================

fn id(s: &str) -> ContentId {
    ContentId::new(s)
}

fn refers_to(name: &str, guid: &str, file_id: i64) -> Property {
    Property::reference(name, ObjectReference::external(guid, file_id))
}

/// Map of every node to its sorted dependency set.
fn snapshot(cache: &DependencyCache) -> BTreeMap<ContentId, BTreeSet<ContentId>> {
    cache
        .nodes()
        .map(|node| (node.id().clone(), node.dependencies().iter().cloned().collect()))
        .collect()
}

fn assert_symmetric(cache: &DependencyCache) {
    for node in cache.nodes() {
        for dep in node.dependencies() {
            let target = cache
                .try_get_node(dep)
                .unwrap_or_else(|| panic!("dangling dependency {dep}"));
            assert!(
                target.references().contains(node.id()),
                "{} -> {dep} has no back edge",
                node.id()
            );
        }
        for referrer in node.references() {
            let source = cache
                .try_get_node(referrer)
                .unwrap_or_else(|| panic!("dangling reference {referrer}"));
            assert!(source.dependencies().contains(node.id()));
        }
    }
}

fn build(
    corpus: &MemoryCorpus,
    settings: CacheSettings,
) -> (DependencyCache, depcache::BuildReport) {
    let mut cache = DependencyCache::new(settings);
    let rules = DefaultRules::new(cache.settings());
    let report = cache
        .build(BuildContext::with_defaults(corpus, &rules))
        .expect("build should start");
    (cache, report)
}

// ============================================================================
// Fixtures
// ============================================================================

/// P references Q, S has a child referencing Q and R, T is a document
/// embedding Q plus a malformed token.
#[fixture]
fn scenario() -> MemoryCorpus {
    let p = SerializedObject::new(
        "Material",
        vec![
            Property::scalar("m_Name", "P"),
            refers_to("m_Shader", Q, 4_800_000),
        ],
    );
    let s = Entity::new("S")
        .with_component(SerializedObject::new(
            "Transform",
            vec![Property::reference("m_Father", ObjectReference::local(0))],
        ))
        .with_child(
            Entity::new("Child").inactive().with_component(SerializedObject::new(
                "MeshRenderer",
                vec![Property::nested(
                    "m_Materials",
                    vec![
                        refers_to("data[0]", Q, 2_100_000),
                        refers_to("data[1]", R, 2_100_000),
                    ],
                )],
            )),
        );
    let t = format!(
        "--- !u!1 &100\nGameObject:\n  m_Name: Camera\n\
         --- !u!114 &200\nMonoBehaviour:\n  m_Script: {{fileID: 11500000, guid: {Q}, type: 3}}\n  \
         m_Broken: {{fileID: 1, guid: {}, type: 3}}\n",
        "XYZ0000000000000000000000000000"
    );

    MemoryCorpus::new()
        .insert_object("Assets/P.mat", P, p)
        .insert_composite("Assets/S.prefab", S, s)
        .insert_document("Assets/T.unity", T, t)
        .insert_object("Assets/Q.shader", Q, SerializedObject::default())
        .insert_object("Assets/R.mat", R, SerializedObject::default())
}

// ============================================================================
// Scenario
// ============================================================================

#[rstest]
fn mixed_corpus_builds_expected_graph(scenario: MemoryCorpus) {
    let (cache, report) = build(&scenario, CacheSettings::default());

    let deps = |s: &str| -> BTreeSet<ContentId> {
        let node = cache.try_get_node(&id(s)).unwrap();
        node.dependencies().iter().cloned().collect()
    };
    let refs = |s: &str| -> BTreeSet<ContentId> {
        let node = cache.try_get_node(&id(s)).unwrap();
        node.references().iter().cloned().collect()
    };

    assert_eq!(deps(P), BTreeSet::from([id(Q)]));
    assert_eq!(deps(S), BTreeSet::from([id(Q), id(R)]));
    assert_eq!(deps(T), BTreeSet::from([id(Q)]));
    assert_eq!(refs(Q), BTreeSet::from([id(P), id(S), id(T)]));
    assert_eq!(refs(R), BTreeSet::from([id(S)]));

    assert_eq!(report.items_scanned, 5);
    assert!(report.errors.is_empty());
    assert_eq!(report.nodes, 5);
    assert_eq!(report.edges, 4);
    assert_symmetric(&cache);
}

#[rstest]
fn local_id_is_recorded_on_target(scenario: MemoryCorpus) {
    let (cache, _) = build(&scenario, CacheSettings::default());

    // Q was last reached from S through a material slot
    let local_id = |s: &str| cache.try_get_node(&id(s)).unwrap().local_id();
    assert_eq!(local_id(Q), Some(2_100_000));
    assert_eq!(local_id(R), Some(2_100_000));
    assert_eq!(local_id(P), None);
}

#[rstest]
fn reachability_after_build(scenario: MemoryCorpus) {
    let (cache, _) = build(&scenario, CacheSettings::default());

    assert!(cache.has_direct_dependency(&id(S), &id(R)));
    assert!(!cache.has_direct_dependency(&id(R), &id(S)));
    assert!(cache.has_dependency(&id(T), &id(Q), Some(1)));
    assert!(!cache.has_dependency(&id(Q), &id(P), None));
    assert_eq!(
        cache.reference_tree(&id(Q), None),
        vec![(id(P), 1), (id(S), 1), (id(T), 1)]
    );
    assert!(cache.find_cycles().is_empty());
}

// ============================================================================
// Build Modes
// ============================================================================

#[rstest]
#[case(1)]
#[case(2)]
#[case(100)]
fn cooperative_build_matches_synchronous(scenario: MemoryCorpus, #[case] per_checkpoint: usize) {
    let settings = CacheSettings {
        properties_per_checkpoint: per_checkpoint,
        ..CacheSettings::default()
    };
    let (sync_cache, sync_report) = build(&scenario, settings.clone());

    let mut coop_cache = DependencyCache::new(settings);
    let rules = DefaultRules::new(coop_cache.settings());
    let mut operation = coop_cache
        .build_async(BuildContext::with_defaults(&scenario, &rules))
        .unwrap();
    let mut yielded = 0;
    for checkpoint in operation.by_ref() {
        assert!(checkpoint.properties_since_checkpoint <= per_checkpoint);
        yielded += 1;
    }
    let coop_report = operation.finish();

    assert_eq!(yielded, coop_report.checkpoints);
    assert_eq!(coop_report, sync_report);
    assert_eq!(snapshot(&coop_cache), snapshot(&sync_cache));
}

#[rstest]
fn rebuild_reproduces_same_graph(scenario: MemoryCorpus) {
    let (mut cache, _) = build(&scenario, CacheSettings::default());
    let first = snapshot(&cache);

    cache.clear();
    assert_eq!(cache.nodes().count(), 0);

    let rules = DefaultRules::new(cache.settings());
    cache
        .build(BuildContext::with_defaults(&scenario, &rules))
        .unwrap();

    assert_eq!(snapshot(&cache), first);
}

#[rstest]
fn rebuild_drops_stale_nodes(scenario: MemoryCorpus) {
    let (mut cache, _) = build(&scenario, CacheSettings::default());
    let smaller = MemoryCorpus::new().insert_object("Assets/R.mat", R, SerializedObject::default());

    let rules = DefaultRules::new(cache.settings());
    cache
        .build(BuildContext::with_defaults(&smaller, &rules))
        .unwrap();

    assert_eq!(cache.nodes().count(), 1);
    assert!(cache.try_get_node(&id(P)).is_none());
}

#[rstest]
fn edge_set_is_independent_of_enumeration_order(scenario: MemoryCorpus) {
    let (forward, _) = build(&scenario, CacheSettings::default());
    let (backward, _) = build(&scenario.reversed(), CacheSettings::default());

    assert_eq!(snapshot(&forward), snapshot(&backward));
}

// ============================================================================
// Failures and Skips
// ============================================================================

#[test]
fn unreadable_document_does_not_abort_build() {
    let corpus = MemoryCorpus::new()
        .insert_unreadable("Assets/Broken.unity", "broken", "truncated file")
        .insert_object(
            "Assets/P.mat",
            P,
            SerializedObject::new("Material", vec![refers_to("m_Shader", Q, 4_800_000)]),
        );

    let (cache, report) = build(&corpus, CacheSettings::default());

    assert_eq!(report.items_failed(), 1);
    assert_eq!(report.errors[0].kind, ScanErrorKind::Read);
    assert_eq!(report.items_scanned, 1);

    let broken = cache.try_get_node(&id("broken")).unwrap();
    assert!(broken.dependencies().is_empty());
    assert!(cache.has_direct_dependency(&id(P), &id(Q)));
}

#[test]
fn reserved_targets_never_become_nodes() {
    let corpus = MemoryCorpus::new()
        .insert_object(
            "Assets/P.mat",
            P,
            SerializedObject::new("Material", vec![refers_to("m_Shader", BUILTIN, 46)]),
        )
        .insert_document(
            "Assets/T.unity",
            T,
            format!("m_Sprite: {{fileID: 10911, guid: {BUILTIN}, type: 0}}"),
        );

    let (cache, report) = build(&corpus, CacheSettings::default());

    assert!(cache.try_get_node(&id(BUILTIN)).is_none());
    assert_eq!(report.skipped_reserved, 2);
    assert_eq!(report.edges, 0);
}

#[test]
fn empty_corpus_builds_empty_graph() {
    let (cache, report) = build(&MemoryCorpus::new(), CacheSettings::default());

    assert_eq!(cache.nodes().count(), 0);
    assert_eq!(report, depcache::BuildReport::default());
}

#[test]
fn item_without_dependencies_still_gets_a_node() {
    let corpus = MemoryCorpus::new().insert_object(
        "Assets/Lonely.asset",
        "lonely",
        SerializedObject::new("ScriptableObject", vec![Property::scalar("m_Value", "3")]),
    );

    let (cache, _) = build(&corpus, CacheSettings::default());

    let node = cache.try_get_node(&id("lonely")).unwrap();
    assert!(node.dependencies().is_empty());
    assert!(node.references().is_empty());
}

// ============================================================================
// Custom Rules
// ============================================================================

#[rstest]
fn closures_replace_default_rules(scenario: MemoryCorpus) {
    let mut cache = DependencyCache::new(CacheSettings::default());
    let rules = DefaultRules::new(cache.settings());
    let skip_prefabs = |path: &str, _: &CacheSettings| path.ends_with(".prefab");
    let only_shaders = |_: &CacheSettings, property: &VisitedProperty| {
        property.holds_reference() && property.name == "m_Shader"
    };

    let ctx = BuildContext::new(&scenario, &rules.resolver, &only_shaders, &skip_prefabs);
    let report = cache.build(ctx).unwrap();

    assert_eq!(report.items_excluded, 1);
    assert!(cache.try_get_node(&id(S)).is_none());
    assert!(cache.has_direct_dependency(&id(P), &id(Q)));
    // Documents are scanned from raw text and ignore the predicate
    assert!(cache.has_direct_dependency(&id(T), &id(Q)));
}

#[rstest]
fn abandoned_build_leaves_consistent_store(scenario: MemoryCorpus) {
    let mut cache = DependencyCache::new(CacheSettings {
        properties_per_checkpoint: 1,
        ..CacheSettings::default()
    });
    let rules = DefaultRules::new(cache.settings());

    {
        let mut operation = cache
            .build_async(BuildContext::with_defaults(&scenario, &rules))
            .unwrap();
        operation.next();
        operation.next();
        operation.next();
    }

    assert!(cache.nodes().count() > 0);
    assert_symmetric(&cache);
}

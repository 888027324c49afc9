//! Type propagation over hand-built graphs
//!
//! Exercises nodes, filtered edges and domain sharing directly, without method
//! bodies in between.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use depgraph_ir::{DependencyAnalyzer, NodeId, ValueType};
use pretty_assertions::assert_eq;

fn zoo() -> DependencyAnalyzer {
    analyzer(animal_classes())
}

fn drain(analyzer: &mut DependencyAnalyzer) {
    analyzer.process_dependencies().expect("no contract violation");
}

fn feed(analyzer: &mut DependencyAnalyzer, node: NodeId, names: &[&str]) {
    for name in names {
        let ty = analyzer.type_index(name);
        analyzer.propagate(node, ty);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Filters
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_filtered_edge_passes_only_subtypes() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    let animals = analyzer.super_class_filter(ANIMAL);
    analyzer.connect_filtered(source, destination, Some(animals));

    feed(&mut analyzer, source, &[DOG, CAR]);
    drain(&mut analyzer);

    assert_types(&analyzer, source, &[DOG, CAR]);
    assert_types(&analyzer, destination, &[DOG]);
}

#[test]
fn test_filter_accepts_its_own_class() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    let animals = analyzer.super_class_filter(ANIMAL);
    analyzer.connect_filtered(source, destination, Some(animals));

    feed(&mut analyzer, source, &[ANIMAL]);
    drain(&mut analyzer);

    assert_types(&analyzer, destination, &[ANIMAL]);
}

#[test]
fn test_typed_node_rejects_unrelated_types() {
    let mut analyzer = zoo();
    let any = analyzer.create_node(None);
    let animal = analyzer.create_node(Some(ValueType::object(ANIMAL)));
    analyzer.connect(any, animal);

    feed(&mut analyzer, any, &[CAT, CAR, DOG]);
    drain(&mut analyzer);

    assert_types(&analyzer, animal, &[CAT, DOG]);
    assert!(!analyzer.value(animal).has_type(CAR));
    assert!(analyzer.value(any).has_type(CAR));
}

#[test]
fn test_types_present_before_connect_flow_immediately() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    feed(&mut analyzer, source, &[DOG]);
    drain(&mut analyzer);

    analyzer.connect(source, destination);
    drain(&mut analyzer);

    assert_types(&analyzer, destination, &[DOG]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Fixed point
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cycle_terminates_with_shared_types() {
    let mut analyzer = zoo();
    let a = analyzer.create_node(None);
    let b = analyzer.create_node(None);
    analyzer.connect(a, b);
    analyzer.connect(b, a);

    feed(&mut analyzer, a, &[DOG]);
    drain(&mut analyzer);

    assert_types(&analyzer, a, &[DOG]);
    assert_types(&analyzer, b, &[DOG]);
}

#[test]
fn test_long_cycle_with_late_types() {
    let mut analyzer = zoo();
    let nodes: Vec<NodeId> = (0..6).map(|_| analyzer.create_node(None)).collect();
    for pair in nodes.windows(2) {
        analyzer.connect(pair[0], pair[1]);
    }
    analyzer.connect(nodes[5], nodes[0]);

    feed(&mut analyzer, nodes[2], &[DOG]);
    drain(&mut analyzer);
    feed(&mut analyzer, nodes[4], &[CAT]);
    drain(&mut analyzer);

    for node in &nodes {
        assert_types(&analyzer, *node, &[CAT, DOG]);
    }
}

#[test]
fn test_propagating_twice_changes_nothing() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    analyzer.connect(source, destination);
    analyzer.connect(source, destination);

    feed(&mut analyzer, source, &[DOG]);
    drain(&mut analyzer);
    let before = analyzer.stats();

    feed(&mut analyzer, source, &[DOG]);
    drain(&mut analyzer);
    let after = analyzer.stats();

    assert_eq!(after.transitions, before.transitions);
    assert_eq!(after.propagations, before.propagations);
    assert_types(&analyzer, destination, &[DOG]);
}

#[test]
fn test_reverse_feed_order_converges_to_same_sets() {
    let build = |order: &[&str]| {
        let mut analyzer = zoo();
        let root = analyzer.create_node(None);
        let left = analyzer.create_node(None);
        let right = analyzer.create_node(Some(ValueType::object(ANIMAL)));
        let sink = analyzer.create_node(None);
        analyzer.connect(root, left);
        analyzer.connect(root, right);
        analyzer.connect(left, sink);
        analyzer.connect(right, sink);
        feed(&mut analyzer, root, order);
        drain(&mut analyzer);
        [root, left, right, sink].map(|node| sorted_types(&analyzer, node))
    };

    let forward = build(&[DOG, CAT, CAR]);
    let reverse = build(&[CAR, CAT, DOG]);
    assert_eq!(forward, reverse);
}

// ═══════════════════════════════════════════════════════════════════════════
// Domains
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unfiltered_chain_shares_one_domain() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    analyzer.connect(source, destination);

    feed(&mut analyzer, source, &[DOG]);
    drain(&mut analyzer);
    assert!(analyzer.same_domain(source, destination));

    feed(&mut analyzer, source, &[CAT]);
    drain(&mut analyzer);
    assert_types(&analyzer, destination, &[CAT, DOG]);
}

#[test]
fn test_split_keeps_types_and_stays_one_way() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    analyzer.connect(source, destination);
    feed(&mut analyzer, source, &[DOG]);
    drain(&mut analyzer);

    // a type of its own forces the destination out of the shared domain
    feed(&mut analyzer, destination, &[CAR]);
    drain(&mut analyzer);

    assert!(!analyzer.same_domain(source, destination));
    assert_eq!(analyzer.stats().domain_splits, 1);
    assert_types(&analyzer, destination, &[CAR, DOG]);
    assert_types(&analyzer, source, &[DOG]);

    feed(&mut analyzer, source, &[CAT]);
    drain(&mut analyzer);
    assert_types(&analyzer, destination, &[CAR, CAT, DOG]);
    assert_types(&analyzer, source, &[CAT, DOG]);
}

#[test]
fn test_covered_destination_is_absorbed() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    feed(&mut analyzer, source, &[DOG, CAT]);
    feed(&mut analyzer, destination, &[DOG]);
    drain(&mut analyzer);

    analyzer.connect(source, destination);
    drain(&mut analyzer);

    assert!(analyzer.same_domain(source, destination));
    assert!(analyzer.stats().domain_merges >= 1);
    assert_types(&analyzer, destination, &[CAT, DOG]);

    feed(&mut analyzer, source, &[CAR]);
    drain(&mut analyzer);
    assert_types(&analyzer, destination, &[CAR, CAT, DOG]);
}

#[test]
fn test_disabled_merging_still_propagates() {
    let config = depgraph_ir::AnalyzerConfig::default().domain_merging(false);
    let mut analyzer = analyzer_with(animal_classes(), config);
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    analyzer.connect(source, destination);

    feed(&mut analyzer, source, &[DOG, CAT]);
    drain(&mut analyzer);

    assert!(!analyzer.same_domain(source, destination));
    assert_types(&analyzer, destination, &[CAT, DOG]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Arrays and class values
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_array_items_follow_array_edges() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    let source_items = analyzer.array_item(source);
    let destination_items = analyzer.array_item(destination);
    analyzer.connect(source, destination);

    feed(&mut analyzer, source, &["[Lzoo.Dog;"]);
    feed(&mut analyzer, source_items, &[DOG]);
    drain(&mut analyzer);

    assert!(analyzer.value(destination).has_array_type());
    assert_types(&analyzer, destination_items, &[DOG]);
}

#[test]
fn test_array_items_stay_put_without_array_types() {
    let mut analyzer = zoo();
    let source = analyzer.create_node(None);
    let destination = analyzer.create_node(None);
    let source_items = analyzer.array_item(source);
    let destination_items = analyzer.array_item(destination);
    analyzer.connect(source, destination);

    feed(&mut analyzer, source, &[DOG]);
    feed(&mut analyzer, source_items, &[CAT]);
    drain(&mut analyzer);

    assert!(analyzer.value(destination_items).is_empty());
}

//! Fast (coarse) analysis mode
//!
//! Every object value shares one node, so reachability is driven by which
//! classes are instantiated anywhere rather than by data flow.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use depgraph_ir::shared::constants::classes;
use depgraph_ir::{
    AnalysisMode, AnalyzerConfig, CallGraph, ClassInfo, DependencyInfo, FieldInfo,
    FieldReference, ValueType,
};
use pretty_assertions::assert_eq;

fn fast() -> AnalyzerConfig {
    AnalyzerConfig::default().mode(AnalysisMode::Fast)
}

#[test]
fn test_dispatch_follows_instantiated_classes() {
    let body = ProgramBuilder::new(3)
        .create(1, DOG)
        .invoke_virtual(None, 2, speak(ANIMAL), &[])
        .exit(None)
        .build();
    let analyzer = run_main_with(animal_classes(), body, fast());

    // the receiver variable never held a Dog, but all values are merged
    assert_used(&analyzer, &speak(DOG));
    assert_reached_not_used(&analyzer, &speak(CAT));
    assert_no_problems(&analyzer);
}

#[test]
fn test_all_values_share_the_instances_node() {
    let keeper = FieldReference::new("zoo.Zoo", "keeper");
    let mut classes = animal_classes();
    classes.push(ClassInfo::new("zoo.Zoo").with_field(FieldInfo::new("keeper", ValueType::object(ANIMAL))));
    let body = ProgramBuilder::new(3)
        .create(1, CAT)
        .string(2, "meow")
        .put_field(None, keeper.clone(), 1, ValueType::object(ANIMAL))
        .exit(None)
        .build();
    let analyzer = run_main_with(classes, body, fast());

    let instances = analyzer.fast_nodes().expect("fast mode nodes").instances;
    assert_eq!(variable(&analyzer, &main_method(), 2), instances);
    assert_eq!(
        analyzer.get_field(&keeper).map(|f| f.value()),
        Some(instances)
    );
    let types = sorted_types(&analyzer, instances);
    assert!(types.contains(&CAT.to_string()));
    assert!(types.contains(&classes::STRING.to_string()));
}

#[test]
fn test_virtual_calls_share_one_site_per_method() {
    let helper = depgraph_ir::MethodReference::new(MAIN, depgraph_ir::MethodDescriptor::void("helper"));
    let body = ProgramBuilder::new(2)
        .create(1, DOG)
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .invoke_static(None, helper.clone(), &[])
        .exit(None)
        .build();
    let helper_body = ProgramBuilder::new(2)
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .exit(None)
        .build();
    let mut classes = animal_classes();
    classes.push(main_class(body).with_method(
        depgraph_ir::MethodInfo::new(helper.descriptor.clone())
            .with_modifier(depgraph_ir::ElementModifier::Static)
            .with_program(helper_body),
    ));
    let mut analyzer = analyzer_with(classes, fast());
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    let graph = analyzer.call_graph();
    let mut callers: Vec<String> = graph
        .callers(&speak(DOG))
        .into_iter()
        .map(|m| m.to_string())
        .collect();
    callers.sort();
    assert_eq!(callers, vec!["app.Main.helper()V", "app.Main.run()V"]);

    let virtual_sites = graph
        .node(&speak(DOG))
        .expect("Dog.speak in call graph")
        .caller_call_sites
        .iter()
        .filter(|id| graph.call_site(**id).is_virtual())
        .count();
    assert_eq!(virtual_sites, 1);
}

#[test]
fn test_get_class_feeds_class_values() {
    let get_class = depgraph_ir::MethodReference::of(
        classes::OBJECT,
        "getClass",
        vec![],
        ValueType::object(classes::CLASS),
    );
    let body = ProgramBuilder::new(3)
        .create(1, DOG)
        .invoke_virtual(Some(2), 1, get_class, &[])
        .exit(None)
        .build();
    let analyzer = run_main_with(animal_classes(), body, fast());

    let fast_nodes = analyzer.fast_nodes().expect("fast mode nodes");
    assert!(analyzer.value(fast_nodes.instances).has_type(classes::CLASS));
    assert!(analyzer.value(fast_nodes.classes).has_type(DOG));
}

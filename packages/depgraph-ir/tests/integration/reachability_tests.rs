//! Reachability through method bodies
//!
//! Each test analyses `app.Main.run()` over a small class model and checks
//! what became reachable and which types reached which variables.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use depgraph_ir::shared::constants::classes;
use depgraph_ir::shared::models::PrimitiveType;
use depgraph_ir::{
    CallGraph, ClassInfo, DependencyInfo, ElementModifier, FieldInfo, FieldReference,
    MethodDescriptor, MethodInfo, MethodReference, TextLocation, ValueType,
};
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════════════
// Virtual dispatch
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_dispatch_on_every_receiver_type() {
    let body = ProgramBuilder::new(4)
        .create(1, DOG)
        .create(2, CAT)
        .assign(3, 1)
        .assign(3, 2)
        .at("Main.java", 7)
        .invoke_virtual(None, 3, speak(ANIMAL), &[])
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    assert_used(&analyzer, &speak(DOG));
    assert_used(&analyzer, &speak(CAT));
    assert_not_reached(&analyzer, &speak(ANIMAL));

    let graph = analyzer.call_graph();
    let mut callees: Vec<String> = graph
        .callees(&main_method())
        .into_iter()
        .map(|m| m.to_string())
        .collect();
    callees.sort();
    assert_eq!(callees, vec!["zoo.Cat.speak()V", "zoo.Dog.speak()V"]);

    let node = graph.node(&main_method()).expect("main is in the call graph");
    assert_eq!(node.call_sites.len(), 2);
    for site in &node.call_sites {
        assert_eq!(
            graph.call_site(*site).locations(),
            vec![&TextLocation::new("Main.java", 7)]
        );
    }
}

#[test]
fn test_overrides_are_reached_but_only_instantiated_ones_used() {
    let body = ProgramBuilder::new(2)
        .create(1, DOG)
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    assert_used(&analyzer, &speak(DOG));
    assert_reached_not_used(&analyzer, &speak(CAT));
    assert_no_problems(&analyzer);
}

#[test]
fn test_receiver_flows_into_this() {
    let body = ProgramBuilder::new(2)
        .create(1, DOG)
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    let this = variable(&analyzer, &speak(DOG), 0);
    assert_types(&analyzer, this, &[DOG]);
}

#[test]
fn test_inherited_implementation_is_used() {
    let mut classes = animal_classes();
    classes.push(ClassInfo::new("zoo.Puppy").with_parent(DOG));
    let body = ProgramBuilder::new(2)
        .create(1, "zoo.Puppy")
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .exit(None)
        .build();
    let analyzer = run_main(classes, body);

    assert_used(&analyzer, &speak(DOG));
    let this = variable(&analyzer, &speak(DOG), 0);
    assert_types(&analyzer, this, &["zoo.Puppy"]);
}

#[test]
fn test_arguments_and_results_cross_calls() {
    let identity = MethodReference::of(
        "zoo.Keeper",
        "pick",
        vec![ValueType::object(ANIMAL)],
        ValueType::object(ANIMAL),
    );
    let keeper = ClassInfo::new("zoo.Keeper").with_method(
        MethodInfo::new(identity.descriptor.clone())
            .with_modifier(ElementModifier::Static)
            .with_program(ProgramBuilder::new(2).exit(Some(1)).build()),
    );
    let mut classes = animal_classes();
    classes.push(keeper);

    let body = ProgramBuilder::new(3)
        .create(1, CAT)
        .invoke_static(Some(2), identity.clone(), &[1])
        .exit(None)
        .build();
    let analyzer = run_main(classes, body);

    assert_types(&analyzer, variable(&analyzer, &identity, 1), &[CAT]);
    assert_types(&analyzer, variable(&analyzer, &main_method(), 2), &[CAT]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cast_to_known_class_filters() {
    let body = ProgramBuilder::new(5)
        .create(1, DOG)
        .create(2, CAR)
        .assign(3, 1)
        .assign(3, 2)
        .cast(4, 3, ValueType::object(ANIMAL))
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    assert_types(&analyzer, variable(&analyzer, &main_method(), 3), &[CAR, DOG]);
    assert_types(&analyzer, variable(&analyzer, &main_method(), 4), &[DOG]);
}

#[test]
fn test_cast_to_object_is_unfiltered() {
    let body = ProgramBuilder::new(3)
        .create(1, CAR)
        .cast(2, 1, object_type())
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    assert_types(&analyzer, variable(&analyzer, &main_method(), 2), &[CAR]);
}

#[test]
fn test_static_field_carries_types_between_methods() {
    let keeper = FieldReference::new("zoo.Zoo", "keeper");
    let zoo = ClassInfo::new("zoo.Zoo").with_field(FieldInfo::new("keeper", ValueType::object(ANIMAL)));
    let mut classes = animal_classes();
    classes.push(zoo);

    let body = ProgramBuilder::new(3)
        .create(1, DOG)
        .put_field(None, keeper.clone(), 1, ValueType::object(ANIMAL))
        .get_field(2, None, keeper.clone(), ValueType::object(ANIMAL))
        .exit(None)
        .build();
    let analyzer = run_main(classes, body);

    let field = analyzer.get_field(&keeper).expect("field reached");
    assert_types(&analyzer, field.value(), &[DOG]);
    assert_types(&analyzer, variable(&analyzer, &main_method(), 2), &[DOG]);
    assert!(analyzer.get_class("zoo.Zoo").is_some_and(|c| c.is_initialized()));
}

#[test]
fn test_primitive_field_does_not_carry_types() {
    let count = FieldReference::new("zoo.Zoo", "count");
    let int = ValueType::Primitive(PrimitiveType::Int);
    let zoo = ClassInfo::new("zoo.Zoo").with_field(FieldInfo::new("count", int.clone()));
    let mut classes = animal_classes();
    classes.push(zoo);

    let body = ProgramBuilder::new(3)
        .create(1, DOG)
        .put_field(None, count.clone(), 1, int.clone())
        .get_field(2, None, count.clone(), int)
        .exit(None)
        .build();
    let analyzer = run_main(classes, body);

    let field = analyzer.get_field(&count).expect("field still linked");
    assert!(analyzer.value(field.value()).is_empty());
    assert!(analyzer.value(variable(&analyzer, &main_method(), 2)).is_empty());
}

#[test]
fn test_string_constant_links_string_constructor() {
    let body = ProgramBuilder::new(2).string(1, "woof").exit(None).build();
    let analyzer = run_main(animal_classes(), body);

    assert_types(&analyzer, variable(&analyzer, &main_method(), 1), &[classes::STRING]);
    let constructor = MethodReference::of(
        classes::STRING,
        "<init>",
        vec![ValueType::array(ValueType::Primitive(
            depgraph_ir::shared::models::PrimitiveType::Char,
        ))],
        ValueType::Void,
    );
    assert_used(&analyzer, &constructor);
    assert_no_problems(&analyzer);
}

#[test]
fn test_class_initializer_runs_once() {
    let init_body = ProgramBuilder::new(2).create(1, CAT).exit(None).build();
    let registry = ClassInfo::new("zoo.Registry").with_method(
        MethodInfo::new(MethodDescriptor::void("<clinit>"))
            .with_modifier(ElementModifier::Static)
            .with_program(init_body),
    );
    let mut classes = animal_classes();
    classes.push(registry);

    let body = ProgramBuilder::new(1)
        .instruction(depgraph_ir::Instruction::InitClass {
            class_name: "zoo.Registry".to_string(),
        })
        .instruction(depgraph_ir::Instruction::InitClass {
            class_name: "zoo.Registry".to_string(),
        })
        .exit(None)
        .build();
    let analyzer = run_main(classes, body);

    let clinit = MethodReference::new("zoo.Registry", MethodDescriptor::void("<clinit>"));
    assert_used(&analyzer, &clinit);
    assert_eq!(analyzer.call_graph().callers(&clinit).len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Arrays
// ═══════════════════════════════════════════════════════════════════════════

fn animal_array() -> ValueType {
    ValueType::array(ValueType::object(ANIMAL))
}

#[test]
fn test_element_stored_by_callee_is_read_through_alias() {
    let store = MethodReference::of("zoo.Keeper", "store", vec![animal_array()], ValueType::Void);
    let store_body = ProgramBuilder::new(4)
        .create(2, DOG)
        .put_element(1, 3, 2)
        .exit(None)
        .build();
    let keeper = ClassInfo::new("zoo.Keeper").with_method(
        MethodInfo::new(store.descriptor.clone())
            .with_modifier(ElementModifier::Static)
            .with_program(store_body),
    );
    let mut classes = animal_classes();
    classes.push(keeper);

    let body = ProgramBuilder::new(5)
        .create_array(1, ValueType::object(ANIMAL), 2)
        .assign(3, 1)
        .invoke_static(None, store.clone(), &[1])
        .get_element(4, 3, 2)
        .exit(None)
        .build();
    let analyzer = run_main(classes, body);

    assert_types(&analyzer, variable(&analyzer, &main_method(), 3), &["[Lzoo.Animal;"]);
    assert_types(&analyzer, variable(&analyzer, &main_method(), 4), &[DOG]);
}

#[test]
fn test_clone_keeps_item_types() {
    let body = ProgramBuilder::new(7)
        .create_array(1, ValueType::object(ANIMAL), 3)
        .create(2, DOG)
        .put_element(1, 3, 2)
        .clone_array(4, 1)
        .get_element(6, 4, 3)
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    assert_types(&analyzer, variable(&analyzer, &main_method(), 4), &["[Lzoo.Animal;"]);
    assert_types(&analyzer, variable(&analyzer, &main_method(), 6), &[DOG]);
    let clone = MethodReference::of(classes::OBJECT, "clone", vec![], object_type());
    assert_used(&analyzer, &clone);
}

#[test]
fn test_unwrapped_array_shares_items() {
    let body = ProgramBuilder::new(6)
        .create_array(1, ValueType::object(ANIMAL), 3)
        .create(2, CAT)
        .put_element(1, 3, 2)
        .unwrap_array(4, 1)
        .get_element(5, 4, 3)
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    assert_types(&analyzer, variable(&analyzer, &main_method(), 4), &["[Lzoo.Animal;"]);
    assert_types(&analyzer, variable(&analyzer, &main_method(), 5), &[CAT]);
}

#[test]
fn test_multi_array_types_every_dimension() {
    let body = ProgramBuilder::new(4)
        .create_multi_array(1, ValueType::array(animal_array()), &[2, 3])
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    let array = analyzer.value(variable(&analyzer, &main_method(), 1));
    assert_eq!(array.types(), vec!["[[Lzoo.Animal;"]);
    let items = array.array_item().expect("item node created");
    assert_eq!(items.types(), vec!["[Lzoo.Animal;"]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Exceptions
// ═══════════════════════════════════════════════════════════════════════════

fn thrower(exception: &str) -> (MethodReference, ClassInfo) {
    let method = MethodReference::new("io.Files", MethodDescriptor::void("open"));
    let cls = ClassInfo::new("io.Files").with_method(
        MethodInfo::new(method.descriptor.clone())
            .with_modifier(ElementModifier::Static)
            .with_program(ProgramBuilder::new(2).create(1, exception).raise(1).build()),
    );
    (method, cls)
}

#[test]
fn test_first_matching_catch_wins() {
    let (open, files) = thrower(IO_EXCEPTION);
    let mut classes = exception_classes();
    classes.push(files);

    let body = ProgramBuilder::new(4)
        .invoke_static(None, open.clone(), &[])
        .exit(None)
        .catch(Some(FILE_NOT_FOUND), Some(1))
        .catch(Some(IO_EXCEPTION), Some(2))
        .catch(Some(EXCEPTION), Some(3))
        .build();
    let analyzer = run_main(classes, body);

    let main = main_method();
    assert!(analyzer.value(variable(&analyzer, &main, 1)).is_empty());
    assert_types(&analyzer, variable(&analyzer, &main, 2), &[IO_EXCEPTION]);
    assert!(analyzer.value(variable(&analyzer, &main, 3)).is_empty());

    let thrown = analyzer.get_method(&main).map(|m| m.thrown()).expect("main reached");
    assert!(analyzer.value(thrown).is_empty());
    assert_types(&analyzer, analyzer.get_method(&open).map(|m| m.thrown()).expect("open reached"), &[IO_EXCEPTION]);
}

#[test]
fn test_uncaught_exception_escapes_to_thrown() {
    let (open, files) = thrower(EXCEPTION);
    let mut classes = exception_classes();
    classes.push(files);

    let body = ProgramBuilder::new(2)
        .invoke_static(None, open, &[])
        .exit(None)
        .catch(Some(IO_EXCEPTION), Some(1))
        .build();
    let analyzer = run_main(classes, body);

    let main = main_method();
    assert!(analyzer.value(variable(&analyzer, &main, 1)).is_empty());
    let thrown = analyzer.get_method(&main).map(|m| m.thrown()).expect("main reached");
    assert_types(&analyzer, thrown, &[EXCEPTION]);
}

#[test]
fn test_catch_all_handler_takes_everything() {
    let body = ProgramBuilder::new(3)
        .create(1, FILE_NOT_FOUND)
        .raise(1)
        .catch(None, Some(2))
        .build();
    let analyzer = run_main(exception_classes(), body);

    assert_types(&analyzer, variable(&analyzer, &main_method(), 2), &[FILE_NOT_FOUND]);
}

#[test]
fn test_null_check_raises_null_pointer_exception() {
    let body = ProgramBuilder::new(3)
        .create(1, DOG)
        .instruction(depgraph_ir::Instruction::NullCheck {
            receiver: var(2),
            value: var(1),
        })
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    let main = main_method();
    assert_types(&analyzer, variable(&analyzer, &main, 2), &[DOG]);
    let thrown = analyzer.get_method(&main).map(|m| m.thrown()).expect("main reached");
    assert_types(&analyzer, thrown, &[classes::NULL_POINTER_EXCEPTION]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Missing symbols
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_symbols_reported_once_per_site() {
    let ghost = MethodReference::new("app.Ghost", MethodDescriptor::void("haunt"));
    let body = ProgramBuilder::new(1)
        .at("Main.java", 3)
        .invoke_static(None, ghost.clone(), &[])
        .invoke_static(None, ghost.clone(), &[])
        .at("Main.java", 4)
        .invoke_static(None, ghost.clone(), &[])
        .exit(None)
        .build();
    let analyzer = run_main(vec![], body);

    let messages = problem_messages(&analyzer);
    let method_reports = messages
        .iter()
        .filter(|m| *m == "Method app.Ghost.haunt()V was not found")
        .count();
    let class_reports = messages
        .iter()
        .filter(|m| *m == "Class app.Ghost was not found")
        .count();
    assert_eq!(method_reports, 2);
    assert_eq!(class_reports, 2);
    assert!(analyzer.get_method(&ghost).is_some_and(|m| m.is_missing()));
}

#[test]
fn test_missing_field_reported() {
    let field = FieldReference::new(ANIMAL, "legs");
    let body = ProgramBuilder::new(2)
        .get_field(1, None, field, ValueType::Primitive(depgraph_ir::shared::models::PrimitiveType::Int))
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    assert_eq!(
        problem_messages(&analyzer),
        vec!["Field zoo.Animal.legs was not found".to_string()]
    );
}

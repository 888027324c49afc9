//! Analyzer facade
//!
//! Entry points, listeners and plugins, code submitted during analysis,
//! dynamic call sites, platform checks, interruption and cleanup.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use depgraph_ir::features::dependency::{CancellationFlag, DynamicCallSite};
use depgraph_ir::shared::constants::{classes, methods};
use depgraph_ir::{
    AnalyzerConfig, CallLocation, ClassInfo, DepGraphError, DependencyAnalyzer, DependencyInfo,
    DependencyListener, ElementModifier, FieldReference, Instruction, MethodDescriptor,
    MethodInfo, MethodReference, ProgramEmitter, ValueType,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn dog_speaks() -> depgraph_ir::Program {
    ProgramBuilder::new(2)
        .create(1, DOG)
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .exit(None)
        .build()
}

// ═══════════════════════════════════════════════════════════════════════════
// Entry points
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_entry_point_arguments_flow_into_parameters() {
    let string_array = ValueType::array(ValueType::object(classes::STRING));
    let entry = MethodReference::of(MAIN, "main", vec![string_array.clone()], ValueType::Void);
    let main = ClassInfo::new(MAIN).with_method(
        MethodInfo::new(entry.descriptor.clone())
            .with_modifier(ElementModifier::Static)
            .with_program(ProgramBuilder::new(2).exit(None).build()),
    );
    let mut analyzer = analyzer(vec![main]);
    analyzer
        .add_entry_point(&entry, &[MAIN, "[Ljava.lang.String;"])
        .unwrap();
    analyzer.process_dependencies().unwrap();

    let args = variable(&analyzer, &entry, 1);
    assert_types(&analyzer, args, &["[Ljava.lang.String;"]);
    assert!(analyzer.value(args).has_array_type());
    assert!(analyzer.get_class(classes::STRING).is_some());
    assert_types(&analyzer, variable(&analyzer, &entry, 0), &[MAIN]);
}

#[test]
fn test_entry_point_arity_mismatch_is_an_error() {
    let mut analyzer = analyzer(vec![main_class(dog_speaks())]);
    let err = analyzer.add_entry_point(&main_method(), &[MAIN, DOG]).unwrap_err();
    assert!(matches!(
        err,
        DepGraphError::EntryPointArity {
            expected: 1,
            actual: 2,
            ..
        }
    ));
}

#[test]
fn test_synchronized_static_method_locks_its_class() {
    let main = ClassInfo::new(MAIN).with_method(
        MethodInfo::new(MethodDescriptor::void("run"))
            .with_modifier(ElementModifier::Static)
            .with_modifier(ElementModifier::Synchronized)
            .with_program(ProgramBuilder::new(1).exit(None).build()),
    );
    let mut analyzer = analyzer(vec![main]);
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    let enter = MethodReference::of(
        classes::OBJECT,
        methods::MONITOR_ENTER,
        vec![object_type()],
        ValueType::Void,
    );
    assert_used(&analyzer, &enter);
    assert_types(&analyzer, variable(&analyzer, &enter, 1), &[classes::CLASS]);
}

#[test]
fn test_get_class_exposes_receiver_types() {
    let get_class = MethodReference::of(
        classes::OBJECT,
        methods::GET_CLASS,
        vec![],
        ValueType::object(classes::CLASS),
    );
    let body = ProgramBuilder::new(3)
        .create(1, DOG)
        .invoke_virtual(Some(2), 1, get_class, &[])
        .exit(None)
        .build();
    let analyzer = run_main(animal_classes(), body);

    let result = analyzer.value(variable(&analyzer, &main_method(), 2));
    assert_eq!(result.types(), vec![classes::CLASS]);
    let class_value = result.class_value_node().expect("class value node");
    assert_eq!(class_value.types(), vec![DOG]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Listeners and plugins
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
}

impl DependencyListener for Recorder {
    fn started(&mut self, _analyzer: &mut DependencyAnalyzer) {
        self.log.borrow_mut().push("started".to_string());
    }

    fn class_reached(&mut self, _: &mut DependencyAnalyzer, class_name: &str, _: &CallLocation) {
        self.log.borrow_mut().push(format!("class {class_name}"));
    }

    fn method_reached(
        &mut self,
        _: &mut DependencyAnalyzer,
        method: &MethodReference,
        _: &CallLocation,
    ) {
        self.log.borrow_mut().push(format!("method {method}"));
    }

    fn field_reached(&mut self, _: &mut DependencyAnalyzer, field: &FieldReference, _: &CallLocation) {
        self.log.borrow_mut().push(format!("field {field}"));
    }

    fn completing(&mut self, _analyzer: &mut DependencyAnalyzer) {
        self.log.borrow_mut().push("completing".to_string());
    }
}

#[test]
fn test_listener_sees_reachability_events() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut analyzer = analyzer_with(
        {
            let mut classes = animal_classes();
            classes.push(main_class(dog_speaks()));
            classes
        },
        AnalyzerConfig::default(),
    );
    analyzer.add_listener(Recorder { log: log.clone() });
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    let log = log.borrow();
    assert_eq!(log.first().map(String::as_str), Some("started"));
    assert_eq!(log.last().map(String::as_str), Some("completing"));
    assert!(log.contains(&"method app.Main.run()V".to_string()));
    assert!(log.contains(&"method zoo.Dog.speak()V".to_string()));
    assert!(log.contains(&format!("class {DOG}")));
    assert!(log.contains(&format!("class {ANIMAL}")));
    // one event per method per new site
    let runs = log.iter().filter(|e| *e == "method app.Main.run()V").count();
    assert_eq!(runs, 1);
}

#[test]
fn test_plugin_runs_when_method_is_reached() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut classes = animal_classes();
    classes.push(main_class(dog_speaks()));
    let mut analyzer = analyzer(classes);

    let seen = calls.clone();
    analyzer.add_plugin(
        speak(DOG),
        move |_: &mut DependencyAnalyzer, method: &MethodReference, location: &CallLocation| {
            seen.borrow_mut()
                .push((method.to_string(), location.method.clone()));
        },
    );
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    assert_eq!(
        *calls.borrow(),
        vec![("zoo.Dog.speak()V".to_string(), Some(main_method()))]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Submitted code
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_submitted_method_is_analysed_when_called() {
    let helper = MethodReference::new(MAIN, MethodDescriptor::void("helper"));
    let body = ProgramBuilder::new(1)
        .invoke_static(None, helper.clone(), &[])
        .exit(None)
        .build();
    let mut classes = animal_classes();
    classes.push(main_class(body));
    let mut analyzer = analyzer(classes);

    analyzer
        .submit_method(&helper, dog_speaks())
        .expect("new static method");
    let err = analyzer.submit_method(&helper, dog_speaks()).unwrap_err();
    assert!(matches!(err, DepGraphError::MethodAlreadyExists(_)));

    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    assert_used(&analyzer, &helper);
    assert_used(&analyzer, &speak(DOG));
}

#[test]
fn test_submit_method_to_unknown_class_fails() {
    let mut analyzer = analyzer(animal_classes());
    let method = MethodReference::new("app.Nowhere", MethodDescriptor::void("run"));
    let err = analyzer.submit_method(&method, dog_speaks()).unwrap_err();
    assert!(matches!(err, DepGraphError::ClassNotFound(_)));
}

/// Supplies the body of a native factory once the analysis completes
struct NativeProvider {
    method: MethodReference,
    outcome: Rc<RefCell<Option<Result<(), String>>>>,
}

impl DependencyListener for NativeProvider {
    fn completing(&mut self, analyzer: &mut DependencyAnalyzer) {
        let body = ProgramBuilder::new(2).create(1, DOG).exit(Some(1)).build();
        let result = analyzer
            .submit_method(&self.method, body)
            .map_err(|e| e.to_string());
        *self.outcome.borrow_mut() = Some(result);
    }
}

#[test]
fn test_native_body_submitted_during_completion() {
    let make = MethodReference::of("zoo.Factory", "make", vec![], ValueType::object(ANIMAL));
    let factory = ClassInfo::new("zoo.Factory").with_method(
        MethodInfo::new(make.descriptor.clone())
            .with_modifier(ElementModifier::Static)
            .with_modifier(ElementModifier::Native),
    );
    let body = ProgramBuilder::new(3)
        .create(1, DOG)
        .invoke_static(Some(2), make.clone(), &[])
        .exit(None)
        .build();
    let mut classes = animal_classes();
    classes.push(factory);
    classes.push(main_class(body));

    let outcome = Rc::new(RefCell::new(None));
    let mut analyzer = analyzer(classes);
    analyzer.add_listener(NativeProvider {
        method: make.clone(),
        outcome: outcome.clone(),
    });
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    assert_eq!(*outcome.borrow(), Some(Ok(())));
    assert_used(&analyzer, &make);
    let result = analyzer.get_method(&make).and_then(|m| m.result()).expect("result node");
    assert_types(&analyzer, result, &[DOG]);
}

#[test]
fn test_submission_rules_during_completion() {
    let mut classes = animal_classes();
    classes.push(main_class(dog_speaks()));
    let mut analyzer = analyzer(classes);
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();
    assert!(analyzer.is_completing());

    let err = analyzer.submit_method(&speak(DOG), dog_speaks()).unwrap_err();
    assert!(matches!(err, DepGraphError::MethodNotNative(_)));

    let unreached = MethodReference::new(CAR, MethodDescriptor::void("drive"));
    let err = analyzer.submit_method(&unreached, dog_speaks()).unwrap_err();
    assert!(matches!(err, DepGraphError::MethodNotReached(_)));

    let err = analyzer.submit_class(ClassInfo::new("zoo.Late")).unwrap_err();
    assert!(matches!(err, DepGraphError::CompletionPhase { .. }));

    let err = analyzer
        .link_class(CAR, &CallLocation::root())
        .unwrap_err();
    assert!(matches!(err, DepGraphError::CompletionPhase { .. }));
    assert!(analyzer.link_class(DOG, &CallLocation::root()).is_ok());
}

#[test]
fn test_submitted_class_is_linkable() {
    let mut analyzer = analyzer(animal_classes());
    analyzer
        .submit_class(ClassInfo::new("zoo.Horse").with_parent(ANIMAL))
        .unwrap();
    let body = ProgramBuilder::new(2)
        .create(1, "zoo.Horse")
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .exit(None)
        .build();
    analyzer.submit_class(main_class(body)).unwrap();
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    assert_used(&analyzer, &speak(ANIMAL));
    assert_no_problems(&analyzer);
}

// ═══════════════════════════════════════════════════════════════════════════
// Dynamic call sites and platform checks
// ═══════════════════════════════════════════════════════════════════════════

fn bootstrap() -> MethodReference {
    MethodReference::of("zoo.Lambdas", "metafactory", vec![], object_type())
}

fn dynamic_factory_body() -> depgraph_ir::Program {
    ProgramBuilder::new(2)
        .instruction(Instruction::InvokeDynamic {
            receiver: Some(var(1)),
            instance: None,
            method: MethodDescriptor::new("get", vec![], ValueType::object(ANIMAL)),
            arguments: vec![],
            bootstrap_method: bootstrap(),
            bootstrap_arguments: vec![],
        })
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .exit(None)
        .build()
}

#[test]
fn test_dynamic_call_site_is_substituted() {
    let mut classes = animal_classes();
    classes.push(main_class(dynamic_factory_body()));
    let mut analyzer = analyzer(classes);
    analyzer.add_bootstrap_substitutor(
        bootstrap(),
        |_: &DynamicCallSite, emitter: &mut ProgramEmitter<'_>| Some(emitter.construct(CAT)),
    );
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    assert_used(&analyzer, &speak(CAT));
    assert_reached_not_used(&analyzer, &speak(DOG));
    assert_types(&analyzer, variable(&analyzer, &main_method(), 1), &[CAT]);
    assert_no_problems(&analyzer);
}

#[test]
fn test_dynamic_call_without_substitutor_is_reported() {
    let analyzer = run_main(animal_classes(), dynamic_factory_body());

    assert_eq!(
        problem_messages(&analyzer),
        vec!["Substitutor for bootstrap method zoo.Lambdas.metafactory()Ljava.lang.Object; was not found".to_string()]
    );
    assert!(analyzer.value(variable(&analyzer, &main_method(), 1)).is_empty());
    assert_reached_not_used(&analyzer, &speak(CAT));
}

#[test]
fn test_unsupported_class_is_reported_and_skipped() {
    let mut tablet = ClassInfo::new("zoo.Tablet");
    tablet.unsupported_on = vec!["web".to_string()];
    let mut classes = animal_classes();
    classes.push(tablet);
    let body = ProgramBuilder::new(3)
        .create(1, "zoo.Tablet")
        .create(2, DOG)
        .exit(None)
        .build();

    let config = AnalyzerConfig::default().platform_tag("web");
    let analyzer = run_main_with(classes.clone(), body.clone(), config);
    assert_eq!(
        problem_messages(&analyzer),
        vec!["Class zoo.Tablet is not supported on current target".to_string()]
    );
    assert!(analyzer.get_class("zoo.Tablet").is_none());
    assert_types(&analyzer, variable(&analyzer, &main_method(), 2), &[DOG]);

    let analyzer = run_main_with(classes, body, AnalyzerConfig::default().platform_tag("jvm"));
    assert_no_problems(&analyzer);
    assert!(analyzer.get_class("zoo.Tablet").is_some());
}

// ═══════════════════════════════════════════════════════════════════════════
// Interruption and cleanup
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cancelled_analysis_stops_before_completion() {
    let mut classes = animal_classes();
    classes.push(main_class(dog_speaks()));
    let config = AnalyzerConfig::default().interrupt_granularity(1);
    let mut analyzer = analyzer_with(classes, config);

    let flag = CancellationFlag::new();
    flag.cancel();
    analyzer.set_interruptor(flag);
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    assert!(analyzer.was_interrupted());
    assert!(!analyzer.is_completing());
    assert!(analyzer.get_method(&speak(DOG)).is_none());
}

/// A later run with a permissive interruptor drains what the cancelled one
/// left queued and completes
#[test]
fn test_rerun_after_cancel_completes_remaining_work() {
    let mut classes = animal_classes();
    classes.push(main_class(dog_speaks()));
    let config = AnalyzerConfig::default().interrupt_granularity(1);
    let mut analyzer = analyzer_with(classes, config);

    let flag = CancellationFlag::new();
    flag.cancel();
    analyzer.set_interruptor(flag);
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();
    assert!(analyzer.was_interrupted());

    analyzer.set_interruptor(|| true);
    analyzer.process_dependencies().unwrap();

    assert!(!analyzer.was_interrupted());
    assert!(analyzer.is_completing());
    assert_used(&analyzer, &speak(DOG));
}

#[test]
fn test_cleanup_keeps_committed_types() {
    let mut classes = animal_classes();
    classes.push(main_class(dog_speaks()));
    let mut analyzer = analyzer(classes);
    analyzer.add_entry_point(&main_method(), &[MAIN]).unwrap();
    analyzer.process_dependencies().unwrap();

    let stats = analyzer.stats();
    assert!(stats.transitions > 0);
    assert_eq!(stats.reachable_methods, analyzer.reachable_methods().len());

    analyzer.cleanup();
    assert_eq!(analyzer.stats().transitions, 0);
    assert_types(&analyzer, variable(&analyzer, &main_method(), 1), &[DOG]);
    assert_types(&analyzer, variable(&analyzer, &speak(DOG), 0), &[DOG]);
}

#[test]
fn test_method_implementation_lookup() {
    let mut classes = animal_classes();
    classes.push(ClassInfo::new("zoo.Puppy").with_parent(DOG));
    let body = ProgramBuilder::new(2)
        .create(1, "zoo.Puppy")
        .invoke_virtual(None, 1, speak(ANIMAL), &[])
        .exit(None)
        .build();
    let analyzer = run_main(classes, body);

    let implementation = analyzer
        .get_method_implementation(&speak("zoo.Puppy"))
        .expect("inherited implementation");
    assert_eq!(implementation.reference(), &speak(DOG));
    assert!(analyzer.get_method(&speak("zoo.Puppy")).is_none());
}

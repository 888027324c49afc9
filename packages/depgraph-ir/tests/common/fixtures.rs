//! Test fixtures
//!
//! Class models used across the integration tests. Every model starts from the
//! runtime classes the analyzer links by itself (string constants, null checks,
//! monitors, array clones), so a clean run reports no diagnostics.

use depgraph_ir::shared::constants::{classes, methods};
use depgraph_ir::shared::models::PrimitiveType;
use depgraph_ir::{
    AnalyzerConfig, ClassInfo, DependencyAnalyzer, ElementModifier, InMemoryClassSource,
    MethodDescriptor, MethodInfo, MethodReference, Program, ValueType,
};

/// Owner of the `run()` entry point
pub const MAIN: &str = "app.Main";

pub const ANIMAL: &str = "zoo.Animal";
pub const DOG: &str = "zoo.Dog";
pub const CAT: &str = "zoo.Cat";
pub const CAR: &str = "zoo.Car";

pub const EXCEPTION: &str = "java.lang.Exception";
pub const IO_EXCEPTION: &str = "java.io.IOException";
pub const FILE_NOT_FOUND: &str = "java.io.FileNotFoundException";

pub fn object_type() -> ValueType {
    ValueType::object(classes::OBJECT)
}

/// `java.lang.Object`, `Class`, `String` and `NullPointerException` with the
/// members the graph builder links implicitly
pub fn runtime_classes() -> Vec<ClassInfo> {
    let monitor = |name: &str| {
        MethodInfo::new(MethodDescriptor::new(name, vec![object_type()], ValueType::Void))
            .with_modifier(ElementModifier::Static)
    };
    let char_array = ValueType::array(ValueType::Primitive(PrimitiveType::Char));

    vec![
        ClassInfo::new(classes::OBJECT)
            .with_method(MethodInfo::new(MethodDescriptor::void(methods::CONSTRUCTOR)))
            .with_method(MethodInfo::new(MethodDescriptor::new(
                methods::GET_CLASS,
                vec![],
                ValueType::object(classes::CLASS),
            )))
            .with_method(MethodInfo::new(MethodDescriptor::new(
                methods::CLONE,
                vec![],
                object_type(),
            )))
            .with_method(monitor(methods::MONITOR_ENTER))
            .with_method(monitor(methods::MONITOR_ENTER_SYNC))
            .with_method(monitor(methods::MONITOR_EXIT))
            .with_method(monitor(methods::MONITOR_EXIT_SYNC)),
        ClassInfo::new(classes::CLASS),
        ClassInfo::new(classes::STRING).with_method(MethodInfo::new(MethodDescriptor::new(
            methods::CONSTRUCTOR,
            vec![char_array],
            ValueType::Void,
        ))),
        ClassInfo::new(classes::NULL_POINTER_EXCEPTION)
            .with_method(MethodInfo::new(MethodDescriptor::void(methods::CONSTRUCTOR))),
    ]
}

pub fn speak_descriptor() -> MethodDescriptor {
    MethodDescriptor::void("speak")
}

/// `class_name.speak()V`
pub fn speak(class_name: &str) -> MethodReference {
    MethodReference::new(class_name, speak_descriptor())
}

/// `Animal` with two overriding subclasses and an unrelated `Car`
pub fn animal_classes() -> Vec<ClassInfo> {
    vec![
        ClassInfo::new(ANIMAL).with_method(MethodInfo::new(speak_descriptor())),
        ClassInfo::new(DOG)
            .with_parent(ANIMAL)
            .with_method(MethodInfo::new(speak_descriptor())),
        ClassInfo::new(CAT)
            .with_parent(ANIMAL)
            .with_method(MethodInfo::new(speak_descriptor())),
        ClassInfo::new(CAR),
    ]
}

/// `Exception <- IOException <- FileNotFoundException`
pub fn exception_classes() -> Vec<ClassInfo> {
    vec![
        ClassInfo::new(EXCEPTION),
        ClassInfo::new(IO_EXCEPTION).with_parent(EXCEPTION),
        ClassInfo::new(FILE_NOT_FOUND).with_parent(IO_EXCEPTION),
    ]
}

/// `app.Main.run()V`
pub fn main_method() -> MethodReference {
    MethodReference::new(MAIN, MethodDescriptor::void("run"))
}

/// `app.Main` with a static `run()V` executing `body`
pub fn main_class(body: Program) -> ClassInfo {
    ClassInfo::new(MAIN).with_method(
        MethodInfo::new(MethodDescriptor::void("run"))
            .with_modifier(ElementModifier::Static)
            .with_program(body),
    )
}

/// Analyzer over the runtime classes plus `classes`
pub fn analyzer_with(classes: Vec<ClassInfo>, config: AnalyzerConfig) -> DependencyAnalyzer {
    let source = InMemoryClassSource::from_classes(runtime_classes().into_iter().chain(classes));
    DependencyAnalyzer::new(source, config).expect("valid test configuration")
}

pub fn analyzer(classes: Vec<ClassInfo>) -> DependencyAnalyzer {
    analyzer_with(classes, AnalyzerConfig::default())
}

/// Analyse `app.Main.run()` with `body` over `classes`
pub fn run_main_with(
    classes: Vec<ClassInfo>,
    body: Program,
    config: AnalyzerConfig,
) -> DependencyAnalyzer {
    let mut all = classes;
    all.push(main_class(body));
    let mut analyzer = analyzer_with(all, config);
    analyzer
        .add_entry_point(&main_method(), &[MAIN])
        .expect("entry point links");
    analyzer
        .process_dependencies()
        .expect("analysis completes");
    analyzer
}

pub fn run_main(classes: Vec<ClassInfo>, body: Program) -> DependencyAnalyzer {
    run_main_with(classes, body, AnalyzerConfig::default())
}

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sym_tree::{Kind, Node};

use super::{dependent_generic_param, stdlib_type, ty, type_with_children, Demangler};
use crate::config::DemangleConfig;
use crate::error::DemangleError;
use crate::resolver::{Directness, NoResolver, SymbolicReferenceKind};

fn demangle_with(input: &str, config: &DemangleConfig) -> Result<Node, DemangleError> {
    let scalars: Vec<char> = input.chars().collect();
    Demangler::new(&scalars, &NoResolver, config).demangle_symbol()
}

fn demangle(input: &str) -> Result<Node, DemangleError> {
    demangle_with(input, &DemangleConfig::default())
}

fn module(name: &str) -> Node {
    Node::with_text(Kind::Module, name)
}

fn ident(name: &str) -> Node {
    Node::with_text(Kind::Identifier, name)
}

fn empty_tuple() -> Node {
    ty(Node::new(Kind::Tuple))
}

fn type_mangling(node: Node) -> Node {
    Node::with_child(Kind::Global, Node::with_child(Kind::TypeMangling, node))
}

/// `() -> ()` with the given argument tuple type.
fn function_type(arguments: Node) -> Node {
    type_with_children(
        Kind::FunctionType,
        [
            Node::with_child(Kind::ArgumentTuple, arguments),
            Node::with_child(Kind::ReturnType, empty_tuple()),
        ],
    )
}

fn main_struct(name: &str) -> Node {
    type_with_children(Kind::Structure, [module("main"), ident(name)])
}

// === Prefixes ===

#[test]
fn test_mangling_prefix_len() {
    let len = |s: &str| super::mangling_prefix_len(&s.chars().collect::<Vec<_>>());
    assert_eq!(len("$s4main"), 2);
    assert_eq!(len("_$s4main"), 3);
    assert_eq!(len("_T04main"), 3);
    assert_eq!(len("@__swiftmacro_1a"), 14);
    assert_eq!(len("_Tt4main"), 0);
    assert_eq!(len("main"), 0);
}

#[test]
fn test_bridged_type_name_detection() {
    let bridged = |s: &str| super::is_bridged_type_name(&s.chars().collect::<Vec<_>>());
    assert!(bridged("_TtC4main3Foo"));
    assert!(bridged("_TtP4main5Proto_"));
    assert!(!bridged("_TtV4main3Foo"));
    assert!(!bridged("_Tt"));
}

// === Entities ===

#[test]
fn test_plain_function() {
    let expected = Node::with_child(
        Kind::Global,
        Node::with_children(
            Kind::Function,
            [module("main"), ident("foo"), function_type(empty_tuple())],
        ),
    );
    assert_eq!(demangle("$s4main3fooyyF").unwrap(), expected);
}

#[test]
fn test_function_with_argument_label() {
    let int = stdlib_type(Kind::Structure, "Int");
    let arguments = type_with_children(
        Kind::Tuple,
        [Node::with_child(Kind::TupleElement, int)],
    );
    let expected = Node::with_child(
        Kind::Global,
        Node::with_children(
            Kind::Function,
            [
                module("main"),
                ident("foo"),
                Node::with_child(Kind::LabelList, ident("x")),
                function_type(arguments),
            ],
        ),
    );
    assert_eq!(demangle("$s4main3foo1xySi_tF").unwrap(), expected);
}

#[test]
fn test_static_method_on_nested_context() {
    let function = Node::with_children(
        Kind::Function,
        [
            main_struct("S").first_child().cloned().unwrap(),
            ident("foo"),
            function_type(empty_tuple()),
        ],
    );
    let expected = Node::with_child(Kind::Global, Node::with_child(Kind::Static, function));
    assert_eq!(demangle("$s4main1SV3fooyyFZ").unwrap(), expected);
}

#[test]
fn test_suffix_follows_entity() {
    let global = demangle("$s4main3fooyyF.cold").unwrap();
    assert_eq!(global.num_children(), 2);
    assert_eq!(global.child_kind(0), Some(Kind::Function));
    assert_eq!(global.children()[1], Node::with_text(Kind::Suffix, ".cold"));
}

// === Types ===

#[test]
fn test_standard_type() {
    assert_eq!(
        demangle("$sSiD").unwrap(),
        type_mangling(stdlib_type(Kind::Structure, "Int"))
    );
}

#[test]
fn test_bound_generic_array() {
    let expected = ty(Node::with_children(
        Kind::BoundGenericStructure,
        [
            stdlib_type(Kind::Structure, "Array"),
            Node::with_child(Kind::TypeList, stdlib_type(Kind::Structure, "Int")),
        ],
    ));
    assert_eq!(demangle("$sSaySiGD").unwrap(), type_mangling(expected));
}

#[test]
fn test_optional_shorthand() {
    let expected = ty(Node::with_children(
        Kind::BoundGenericEnum,
        [
            stdlib_type(Kind::Enum, "Optional"),
            Node::with_child(Kind::TypeList, stdlib_type(Kind::Structure, "Int")),
        ],
    ));
    assert_eq!(demangle("$sSiSgD").unwrap(), type_mangling(expected));
}

#[test]
fn test_tuple_with_back_reference() {
    let element = Node::with_child(Kind::TupleElement, main_struct("S"));
    let expected = type_with_children(Kind::Tuple, [element.clone(), element]);
    assert_eq!(demangle("$s4main1SV_ACtD").unwrap(), type_mangling(expected));
}

#[test]
fn test_word_substitutions() {
    // `0bC0` spells "My" + "Struct" from the words of "main" and "MyStruct".
    let inner = main_struct("MyStruct").first_child().cloned().unwrap();
    let expected = type_with_children(Kind::Structure, [inner, ident("MyStruct")]);
    assert_eq!(demangle("$s4main8MyStructV0bC0VD").unwrap(), type_mangling(expected));
}

#[test]
fn test_bare_type_mangling() {
    let scalars: Vec<char> = "SiSg".chars().collect();
    let config = DemangleConfig::default();
    let node = Demangler::new(&scalars, &NoResolver, &config).demangle_type().unwrap();
    assert_eq!(node.first_child().map(Node::kind), Some(Kind::BoundGenericEnum));
}

// === Function type annotations ===

fn global(child: Node) -> Node {
    Node::with_child(Kind::Global, child)
}

/// `main.f` with the given function type children.
fn main_f(function_type_children: impl IntoIterator<Item = Node>) -> Node {
    Node::with_children(
        Kind::Function,
        [
            module("main"),
            ident("f"),
            type_with_children(Kind::FunctionType, function_type_children),
        ],
    )
}

fn empty_arguments() -> Node {
    Node::with_child(Kind::ArgumentTuple, empty_tuple())
}

fn empty_return() -> Node {
    Node::with_child(Kind::ReturnType, empty_tuple())
}

#[test]
fn test_async_throws_pop_order() {
    let expected = main_f([
        Node::new(Kind::ThrowsAnnotation),
        Node::new(Kind::AsyncAnnotation),
        empty_arguments(),
        empty_return(),
    ]);
    assert_eq!(demangle("$s4main1fyyYaKF").unwrap(), global(expected));
}

#[test]
fn test_every_annotation_in_order() {
    let expected = main_f([
        Node::new(Kind::SendingResultFunctionType),
        Node::new(Kind::IsolatedAnyFunctionType),
        Node::with_index(Kind::DifferentiableFunctionType, u64::from('r')),
        Node::new(Kind::ThrowsAnnotation),
        Node::new(Kind::ConcurrentFunctionType),
        Node::new(Kind::AsyncAnnotation),
        empty_arguments(),
        empty_return(),
    ]);
    assert_eq!(demangle("$s4main1fyyYaYbKYjrYAYTF").unwrap(), global(expected));
}

#[test]
fn test_global_actor_annotation() {
    let main_actor = stdlib_type(Kind::Class, "MainActor").first_child().cloned().unwrap();
    let expected = main_f([
        Node::with_child(Kind::GlobalActorFunctionType, main_actor),
        empty_arguments(),
        empty_return(),
    ]);
    assert_eq!(demangle("$s4main1fyyScMYcF").unwrap(), global(expected));
}

#[test]
fn test_misordered_annotations_fail() {
    // `K` must be pushed after `Ya`.
    assert!(demangle("$s4main1fyyKYaF").is_err());
}

// === Generic signatures ===

fn param(depth: u64, index: u64) -> Node {
    ty(dependent_generic_param(depth, index))
}

fn generic_main_f(signature: Node, arguments: Node, result: Node) -> Node {
    let function_type = type_with_children(
        Kind::FunctionType,
        [
            Node::with_child(Kind::ArgumentTuple, arguments),
            Node::with_child(Kind::ReturnType, result),
        ],
    );
    Node::with_children(
        Kind::Function,
        [
            module("main"),
            ident("f"),
            Node::new(Kind::LabelList),
            type_with_children(Kind::DependentGenericType, [signature, function_type]),
        ],
    )
}

fn param_count(count: u64) -> Node {
    Node::with_index(Kind::DependentGenericParamCount, count)
}

#[test]
fn test_single_parameter_signature() {
    let signature = Node::with_child(Kind::DependentGenericSignature, param_count(1));
    let expected = generic_main_f(signature, param(0, 0), param(0, 0));
    assert_eq!(demangle("$s4main1fyxxlF").unwrap(), global(expected));
}

#[test]
fn test_signature_with_parameter_counts() {
    let signature = Node::with_child(Kind::DependentGenericSignature, param_count(2));
    let expected = generic_main_f(signature, param(0, 0), param(0, 1));
    assert_eq!(demangle("$s4main1fyq_xr0_lF").unwrap(), global(expected));
}

#[test]
fn test_conformance_requirement() {
    let requirement = Node::with_children(
        Kind::DependentGenericConformanceRequirement,
        [param(0, 0), stdlib_type(Kind::Protocol, "Equatable")],
    );
    let signature = Node::with_children(
        Kind::DependentGenericSignature,
        [param_count(1), requirement],
    );
    let expected = generic_main_f(signature, param(0, 0), empty_tuple());
    assert_eq!(demangle("$s4main1fyyxSQRzlF").unwrap(), global(expected));
}

// === Witnesses and metadata ===

#[test]
fn test_protocol_witness_table() {
    let conformance = Node::with_children(
        Kind::ProtocolConformance,
        [
            stdlib_type(Kind::Structure, "Int"),
            stdlib_type(Kind::Protocol, "Comparable"),
            module("Swift"),
        ],
    );
    let expected = Node::with_child(Kind::ProtocolWitnessTable, conformance);
    assert_eq!(demangle("$sSiSLsWP").unwrap(), global(expected));
}

#[test]
fn test_value_witness_table() {
    let expected = Node::with_child(Kind::ValueWitnessTable, main_struct("Foo"));
    assert_eq!(demangle("$s4main3FooVWV").unwrap(), global(expected));
}

#[test]
fn test_metadata_symbols() {
    for (symbol, kind) in [
        ("$s4main3FooVMa", Kind::TypeMetadataAccessFunction),
        ("$s4main3FooVMn", Kind::NominalTypeDescriptor),
        ("$s4main3FooVN", Kind::TypeMetadata),
    ] {
        let expected = Node::with_child(kind, main_struct("Foo"));
        assert_eq!(demangle(symbol).unwrap(), global(expected), "{symbol}");
    }
}

// === Thunks and specializations ===

#[test]
fn test_partial_apply_forwarder_wraps_function() {
    let function = main_f([empty_arguments(), empty_return()]);
    let expected = Node::with_child(Kind::PartialApplyForwarder, function);
    assert_eq!(demangle("$s4main1fyyFTA").unwrap(), global(expected));
}

#[test]
fn test_curry_thunk() {
    let function = main_f([empty_arguments(), empty_return()]);
    let expected = Node::with_child(Kind::CurryThunk, function);
    assert_eq!(demangle("$s4main1fyyFTc").unwrap(), global(expected));
}

#[test]
fn test_generic_specialization_precedes_function() {
    let specialization = Node::with_children(
        Kind::GenericSpecialization,
        [
            Node::with_index(Kind::SpecializationPassID, 5),
            Node::with_child(
                Kind::GenericSpecializationParam,
                stdlib_type(Kind::Structure, "Int"),
            ),
        ],
    );
    let signature = Node::with_child(Kind::DependentGenericSignature, param_count(1));
    let function = generic_main_f(signature, param(0, 0), empty_tuple());
    let expected = Node::with_children(Kind::Global, [specialization, function]);
    assert_eq!(demangle("$s4main1fyyxlFSi_Tg5").unwrap(), expected);
}

// === Impl function types ===

#[test]
fn test_impl_function_type() {
    let convention = |text: &str| Node::with_text(Kind::ImplConvention, text);
    let no_differentiability = || Node::with_text(Kind::ImplParameterResultDifferentiability, "");
    let expected = type_with_children(
        Kind::ImplFunctionType,
        [
            Node::new(Kind::ImplEscaping),
            convention("@callee_guaranteed"),
            Node::with_children(
                Kind::ImplParameter,
                [
                    convention("@unowned"),
                    no_differentiability(),
                    stdlib_type(Kind::Structure, "Int"),
                ],
            ),
            Node::with_children(
                Kind::ImplResult,
                [
                    convention("@unowned"),
                    no_differentiability(),
                    stdlib_type(Kind::Structure, "Bool"),
                ],
            ),
        ],
    );
    assert_eq!(demangle("$sSiSbIegyd_D").unwrap(), type_mangling(expected));
}

// === Special types ===

#[test]
fn test_ownership_qualifier() {
    let expected = ty(Node::with_child(Kind::Weak, stdlib_type(Kind::Structure, "Int")));
    assert_eq!(demangle("$sSiXwD").unwrap(), type_mangling(expected));
}

#[test]
fn test_noescape_function_type() {
    let expected = type_with_children(
        Kind::NoEscapeFunctionType,
        [empty_arguments(), empty_return()],
    );
    assert_eq!(demangle("$syyXED").unwrap(), type_mangling(expected));
}

// === Opaque types ===

#[test]
fn test_opaque_return_type_records_its_declaration() {
    let opaque = ty(Node::with_child(
        Kind::OpaqueReturnType,
        Node::with_text(Kind::OpaqueReturnTypeParent, "main.f"),
    ));
    let expected = main_f([empty_arguments(), Node::with_child(Kind::ReturnType, opaque)]);
    assert_eq!(demangle("$s4main1fQryF").unwrap(), global(expected));
}

// === Contexts ===

#[test]
fn test_extension_context() {
    let extension = Node::with_children(
        Kind::Extension,
        [module("bar"), main_struct("Foo").first_child().cloned().unwrap()],
    );
    let expected = Node::with_children(
        Kind::Function,
        [extension, ident("baz"), function_type(empty_tuple())],
    );
    assert_eq!(demangle("$s4main3FooV3barE3bazyyF").unwrap(), global(expected));
}

#[test]
fn test_explicit_closure() {
    let function = Node::with_children(
        Kind::Function,
        [module("main"), ident("foo"), function_type(empty_tuple())],
    );
    let closure_type = type_with_children(Kind::FunctionType, [empty_arguments(), empty_return()]);
    let expected = Node::with_children(
        Kind::ExplicitClosure,
        [function, Node::with_index(Kind::Number, 0), closure_type],
    );
    assert_eq!(demangle("$s4main3fooyyFyycfU_").unwrap(), global(expected));
}

#[test]
fn test_freestanding_macro_expansion() {
    let expected = Node::with_children(
        Kind::FreestandingMacroExpansion,
        [module("main"), ident("myMacro"), Node::with_index(Kind::Number, 0)],
    );
    assert_eq!(demangle("$s4main7myMacrofMf_").unwrap(), global(expected));
}

// === Bridged names ===

#[test]
fn test_bridged_class() {
    let expected = ty(Node::with_children(Kind::Class, [module("main"), ident("Foo")]));
    assert_eq!(demangle("_TtC4main3Foo").unwrap(), type_mangling(expected));
}

#[test]
fn test_bridged_protocol() {
    let protocol = ty(Node::with_children(Kind::Protocol, [module("Swift"), ident("Proto")]));
    let expected = ty(Node::with_child(
        Kind::ProtocolList,
        Node::with_child(Kind::TypeList, protocol),
    ));
    assert_eq!(demangle("_TtPs5Proto_").unwrap(), type_mangling(expected));
}

// === Symbolic references ===

#[test]
fn test_symbolic_references_are_numbered_in_order() {
    let resolver = |kind: SymbolicReferenceKind, directness: Directness, index: usize| {
        assert_eq!(kind, SymbolicReferenceKind::Context);
        assert_eq!(directness, Directness::Direct);
        Some(ty(Node::with_index(Kind::TypeSymbolicReference, index as u64)))
    };
    let scalars: Vec<char> = "$s\u{1}_\u{1}tD".chars().collect();
    let config = DemangleConfig::default();
    let global = Demangler::new(&scalars, &resolver, &config).demangle_symbol().unwrap();

    let element = |index| {
        Node::with_child(
            Kind::TupleElement,
            ty(Node::with_index(Kind::TypeSymbolicReference, index)),
        )
    };
    let expected = type_with_children(Kind::Tuple, [element(0), element(1)]);
    assert_eq!(global, type_mangling(expected));
}

#[test]
fn test_resolved_context_is_a_back_reference() {
    let resolver = |_: SymbolicReferenceKind, _: Directness, index: usize| {
        Some(ty(Node::with_index(Kind::TypeSymbolicReference, index as u64)))
    };
    let scalars: Vec<char> = "$s\u{1}_AAtD".chars().collect();
    let config = DemangleConfig::default();
    let global = Demangler::new(&scalars, &resolver, &config).demangle_symbol().unwrap();

    let element = Node::with_child(
        Kind::TupleElement,
        ty(Node::with_index(Kind::TypeSymbolicReference, 0)),
    );
    let expected = type_with_children(Kind::Tuple, [element.clone(), element]);
    assert_eq!(global, type_mangling(expected));
}

#[test]
fn test_unresolved_reference_fails() {
    assert!(matches!(
        demangle("$s\u{1}D"),
        Err(DemangleError::Malformed { .. })
    ));
}

// === Failures ===

#[test]
fn test_prefix_only_is_malformed() {
    assert_eq!(demangle("$s"), Err(DemangleError::Malformed { position: 2 }));
}

#[test]
fn test_truncated_operator_is_malformed() {
    assert!(matches!(demangle("$sSiDQ"), Err(DemangleError::Malformed { .. })));
    assert!(matches!(demangle("$s4mai"), Err(DemangleError::Malformed { .. })));
}

#[test]
fn test_missing_prefix_is_malformed() {
    assert_eq!(demangle("4main3fooyyF"), Err(DemangleError::Malformed { position: 0 }));
}

#[test]
fn test_back_reference_out_of_range() {
    assert!(demangle("$s4main1SVAZD").is_err());
}

#[test]
fn test_depth_limit() {
    let config = DemangleConfig::default().with_max_depth(4);
    assert!(demangle_with("$sSiD", &config).is_ok());
    assert!(matches!(
        demangle_with("$sSaySiGD", &config),
        Err(DemangleError::TooDeep { limit: 4, .. })
    ));
}

#[test]
fn test_postfix_chains_are_height_bounded() {
    // Each `Sg` wraps the previous type without recursing.
    let symbol = format!("$sSi{}D", "Sg".repeat(4000));
    assert!(matches!(
        demangle(&symbol),
        Err(DemangleError::TooDeep { limit: 1024, .. })
    ));

    let config = DemangleConfig::default().with_max_depth(64);
    let shallow = format!("$sSi{}D", "Sg".repeat(15));
    assert!(demangle_with(&shallow, &config).is_ok());
    let tall = format!("$sSi{}D", "Sg".repeat(40));
    assert!(matches!(
        demangle_with(&tall, &config),
        Err(DemangleError::TooDeep { limit: 64, .. })
    ));
}

#[test]
fn test_height_failure_reports_position() {
    let config = DemangleConfig::default().with_max_depth(8);
    // `Si` is three tall and every `Sg` adds three, so the second one fails.
    let symbol = format!("$sSi{}D", "Sg".repeat(5));
    assert_eq!(
        demangle_with(&symbol, &config),
        Err(DemangleError::TooDeep { position: 8, limit: 8 })
    );
}

proptest! {
    #[test]
    fn test_arbitrary_input_never_panics(body in "[ -~]{0,48}") {
        let _ = demangle(&format!("$s{body}"));
    }

    #[test]
    fn test_arbitrary_input_respects_depth(body in "[A-Za-z0-9_]{0,48}") {
        let config = DemangleConfig::default().with_max_depth(4);
        if let Err(DemangleError::TooDeep { limit, .. }) = demangle_with(&format!("$s{body}"), &config) {
            prop_assert_eq!(limit, 4);
        }
    }
}

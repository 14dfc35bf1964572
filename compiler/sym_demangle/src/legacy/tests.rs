#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sym_tree::{Kind, Node};

use super::LegacyDemangler;
use crate::config::DemangleConfig;
use crate::demangler::{dependent_generic_param, ty};
use crate::error::DemangleError;

fn demangle_with(input: &str, config: &DemangleConfig) -> Result<Node, DemangleError> {
    let scalars: Vec<char> = input.chars().collect();
    LegacyDemangler::new(&scalars, config).demangle_symbol()
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

fn swift(kind: Kind, name: &str) -> Node {
    ty(Node::with_children(kind, [module("Swift"), ident(name)]))
}

fn global(child: Node) -> Node {
    Node::with_child(Kind::Global, child)
}

fn type_mangling(node: Node) -> Node {
    global(Node::with_child(Kind::TypeMangling, node))
}

fn function_type(arguments: Node, result: Node) -> Node {
    ty(Node::with_children(
        Kind::FunctionType,
        [
            Node::with_child(Kind::ArgumentTuple, arguments),
            Node::with_child(Kind::ReturnType, result),
        ],
    ))
}

fn empty_tuple() -> Node {
    ty(Node::new(Kind::Tuple))
}

fn main_foo() -> Node {
    Node::with_children(
        Kind::Function,
        [
            module("main"),
            ident("foo"),
            function_type(empty_tuple(), empty_tuple()),
        ],
    )
}

fn main_class(name: &str) -> Node {
    Node::with_children(Kind::Class, [module("main"), ident(name)])
}

// === Entities ===

#[test]
fn test_function() {
    assert_eq!(demangle("_TF4main3fooFT_T_").unwrap(), global(main_foo()));
}

#[test]
fn test_operator_function() {
    let int_element = Node::with_child(Kind::TupleElement, swift(Kind::Structure, "Int"));
    let arguments = ty(Node::with_children(
        Kind::Tuple,
        [int_element.clone(), int_element],
    ));
    let expected = Node::with_children(
        Kind::Function,
        [
            module("Swift"),
            Node::with_text(Kind::InfixOperator, "=="),
            function_type(arguments, swift(Kind::Structure, "Bool")),
        ],
    );
    assert_eq!(demangle("_TFsoi2eeFTSiSi_Sb").unwrap(), global(expected));
}

#[test]
fn test_getter_wraps_variable() {
    let variable = Node::with_children(
        Kind::Variable,
        [main_class("Foo"), ident("bar"), swift(Kind::Structure, "Int")],
    );
    let expected = global(Node::with_child(Kind::Getter, variable));
    assert_eq!(demangle("_TFC4main3Foog3barSi").unwrap(), expected);
}

#[test]
fn test_subscript_getter() {
    let int = swift(Kind::Structure, "Int");
    let subscript = Node::with_children(
        Kind::Subscript,
        [main_class("Foo"), function_type(int.clone(), int)],
    );
    let expected = global(Node::with_child(Kind::Getter, subscript));
    assert_eq!(demangle("_TFC4main3Foog9subscriptFSiSi").unwrap(), expected);
}

#[test]
fn test_static_entity() {
    let node = demangle("_TZF4main3fooFT_T_").unwrap();
    assert_eq!(node, global(Node::with_child(Kind::Static, main_foo())));
}

#[test]
fn test_suffix_is_kept() {
    let node = demangle("_TF4main3fooFT_T_.cold").unwrap();
    assert_eq!(node.num_children(), 2);
    assert_eq!(node.children()[1], Node::with_text(Kind::Suffix, ".cold"));
}

// === Types ===

#[test]
fn test_standard_type() {
    assert_eq!(
        demangle("_TtSi").unwrap(),
        type_mangling(swift(Kind::Structure, "Int"))
    );
}

#[test]
fn test_bridged_class_name() {
    assert_eq!(
        demangle("_TtC4main3Foo").unwrap(),
        type_mangling(ty(main_class("Foo")))
    );
}

#[test]
fn test_bound_generic() {
    let expected = ty(Node::with_children(
        Kind::BoundGenericEnum,
        [
            swift(Kind::Enum, "Optional"),
            Node::with_child(Kind::TypeList, swift(Kind::Structure, "Int")),
        ],
    ));
    assert_eq!(demangle("_TtGSqSi_").unwrap(), type_mangling(expected));
}

#[test]
fn test_positional_substitution() {
    // `S0_` is the second recorded name: the module comes first, then the class.
    let element = |name: &str| {
        Node::with_children(
            Kind::TupleElement,
            [
                Node::with_text(Kind::TupleElementName, name),
                ty(main_class("Foo")),
            ],
        )
    };
    let expected = ty(Node::with_children(
        Kind::Tuple,
        [element("foo"), element("bar")],
    ));
    assert_eq!(
        demangle("_TtT3fooC4main3Foo3barS0__").unwrap(),
        type_mangling(expected)
    );
}

#[test]
fn test_generic_signature() {
    let param = || ty(dependent_generic_param(0, 0));
    let requirement = Node::with_children(
        Kind::DependentGenericConformanceRequirement,
        [dependent_generic_param(0, 0), swift(Kind::Protocol, "Equatable")],
    );
    let signature = Node::with_children(
        Kind::DependentGenericSignature,
        [
            Node::with_index(Kind::DependentGenericParamCount, 1),
            requirement,
        ],
    );
    let expected = ty(Node::with_children(
        Kind::DependentGenericType,
        [signature, function_type(param(), param())],
    ));
    assert_eq!(
        demangle("_TtuRxs9EquatablerFxx").unwrap(),
        type_mangling(expected)
    );
}

#[test]
fn test_punycode_identifier() {
    assert_eq!(
        demangle("_TtC4mainX10Mnchen_Dya").unwrap(),
        type_mangling(ty(main_class("München")))
    );
}

#[test]
fn test_variadic_tuple_marks_last_element() {
    let node = demangle("_TttSiSi_").unwrap();
    let tuple = node.first_child().and_then(Node::first_child).and_then(Node::first_child).unwrap();
    assert_eq!(tuple.kind(), Kind::Tuple);
    assert_eq!(tuple.children()[0].child_kind(0), Some(Kind::Type));
    assert_eq!(tuple.children()[1].child_kind(0), Some(Kind::VariadicMarker));
}

// === Globals ===

#[test]
fn test_value_witness() {
    let expected = global(Node::with_children(
        Kind::ValueWitness,
        [
            Node::with_index(Kind::Index, 0),
            swift(Kind::Structure, "Int"),
        ],
    ));
    assert_eq!(demangle("_TwalSi").unwrap(), expected);
}

#[test]
fn test_enum_tag_witnesses_are_not_legacy() {
    assert!(demangle("_TwuiSi").is_err());
    assert!(demangle("_TwstSi").is_err());
}

#[test]
fn test_protocol_witness_table() {
    let conformance = Node::with_children(
        Kind::ProtocolConformance,
        [
            swift(Kind::Structure, "Int"),
            swift(Kind::Protocol, "Equatable"),
            module("Swift"),
        ],
    );
    let expected = global(Node::with_child(Kind::ProtocolWitnessTable, conformance));
    assert_eq!(demangle("_TWPSis9Equatables").unwrap(), expected);
}

#[test]
fn test_partial_apply_forwarder() {
    let node = demangle("_TPA__TF4main3fooFT_T_").unwrap();
    let forwarder = Node::with_child(Kind::PartialApplyForwarder, main_foo());
    assert_eq!(node, global(forwarder));
}

// === Specializations ===

#[test]
fn test_generic_specialization() {
    let specialization = Node::with_children(
        Kind::GenericSpecialization,
        [
            Node::with_index(Kind::SpecializationPassID, 5),
            Node::with_child(
                Kind::GenericSpecializationParam,
                swift(Kind::Structure, "Int"),
            ),
        ],
    );
    let expected = Node::with_children(Kind::Global, [specialization, main_foo()]);
    assert_eq!(demangle("_TTSg5Si___TF4main3fooFT_T_").unwrap(), expected);
}

#[test]
fn test_function_signature_specialization() {
    let node = demangle("_TTSf1d_n___TF4main3fooFT_T_").unwrap();
    let specialization = &node.children()[0];
    assert_eq!(specialization.kind(), Kind::FunctionSignatureSpecialization);
    assert_eq!(specialization.num_children(), 3);
    let dead = &specialization.children()[1];
    assert_eq!(dead.first_child().and_then(Node::index), Some(64));
    assert_eq!(specialization.children()[2].num_children(), 0);
}

#[test]
fn test_attribute_prefix() {
    let node = demangle("_TToF4main3fooFT_T_").unwrap();
    assert_eq!(node.child_kind(0), Some(Kind::ObjCAttribute));
    assert_eq!(node.child_kind(1), Some(Kind::Function));
}

// === Failures ===

#[test]
fn test_requires_prefix() {
    assert_eq!(demangle("$s4main"), Err(DemangleError::Malformed { position: 0 }));
    assert!(demangle("_T").is_err());
}

#[test]
fn test_substitution_out_of_range() {
    assert!(demangle("_TtS5_").is_err());
}

#[test]
fn test_depth_limit() {
    let config = DemangleConfig::default().with_max_depth(1);
    assert!(demangle_with("_TtSi", &config).is_ok());
    assert!(matches!(
        demangle_with("_TtGSqSi_", &config),
        Err(DemangleError::TooDeep { limit: 1, .. })
    ));
}

proptest! {
    #[test]
    fn test_arbitrary_input_never_panics(body in "[ -~]{0,48}") {
        let _ = demangle(&format!("_T{body}"));
    }
}

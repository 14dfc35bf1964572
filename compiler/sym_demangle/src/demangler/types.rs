//! Type productions.
//!
//! Builtins, nominal and bound generic types, function and impl-function
//! types, tuples, packs and archetypes. Everything here pushes a `Type`
//! node (or a marker that a later function type consumes).

use std::iter;

use smallvec::SmallVec;
use sym_tree::{Kind, Node};

use super::{
    builtin_type, dependent_generic_param, ty, type_with_child, type_with_children, DemangleResult,
    Demangler, MAX_BUILTIN_WIDTH,
};
use crate::codes::Differentiability;

/// Markers that may precede the argument tuple of a function type, in
/// the order they appear among its children.
const FUNCTION_ANNOTATIONS: [&[Kind]; 8] = [
    &[Kind::SendingResultFunctionType],
    &[Kind::GlobalActorFunctionType],
    &[Kind::IsolatedAnyFunctionType],
    &[Kind::NonIsolatedCallerFunctionType],
    &[Kind::DifferentiableFunctionType],
    &[Kind::ThrowsAnnotation, Kind::TypedThrowsAnnotation],
    &[Kind::ConcurrentFunctionType],
    &[Kind::AsyncAnnotation],
];

impl Demangler<'_> {
    // =========================================================================
    // Builtins and Nominals
    // =========================================================================

    pub(super) fn demangle_builtin_type(&mut self) -> DemangleResult<Node> {
        let name = match self.cursor.read_scalar()? {
            'b' => "Builtin.BridgeObject",
            'B' => "Builtin.UnsafeValueBuffer",
            'e' => "Builtin.Executor",
            'f' => {
                let width = self.demangle_builtin_width()?;
                return Ok(builtin_type(format!("Builtin.FPIEEE{width}")));
            }
            'i' => {
                let width = self.demangle_builtin_width()?;
                return Ok(builtin_type(format!("Builtin.Int{width}")));
            }
            'I' => "Builtin.IntLiteral",
            'v' => {
                let elements = self.demangle_builtin_width()?;
                let element = self.pop_type_and_get_child()?;
                self.ensure(element.kind() == Kind::BuiltinTypeName)?;
                let element_name = element.text().and_then(|t| t.strip_prefix("Builtin."));
                let element_name = self.require(element_name)?;
                return Ok(builtin_type(format!("Builtin.Vec{elements}x{element_name}")));
            }
            'V' => {
                let element = self.pop_type()?;
                let size = self.pop_type()?;
                return Ok(type_with_children(Kind::BuiltinFixedArray, [size, element]));
            }
            'O' => "Builtin.UnknownObject",
            'o' => "Builtin.NativeObject",
            'p' => "Builtin.RawPointer",
            't' => "Builtin.SILToken",
            'w' => "Builtin.Word",
            'c' => "Builtin.RawUnsafeContinuation",
            'D' => "Builtin.DefaultActorStorage",
            'd' => "Builtin.NonDefaultDistributedActorStorage",
            'j' => "Builtin.Job",
            'P' => "Builtin.PackIndex",
            _ => return Err(self.fail()),
        };
        Ok(builtin_type(name))
    }

    /// Bit width or element count of a builtin, `1..=MAX_BUILTIN_WIDTH`.
    fn demangle_builtin_width(&mut self) -> DemangleResult<u64> {
        let index = self.demangle_index()?;
        let width = self.require(index.checked_sub(1))?;
        self.ensure(width > 0 && width <= MAX_BUILTIN_WIDTH)?;
        Ok(width)
    }

    /// `C`, `O`, `P`, `V`, `a`, `XY`: a named nominal in a context.
    pub(super) fn demangle_any_generic_type(&mut self, kind: Kind) -> DemangleResult<Node> {
        let name = self.pop_decl_name()?;
        let context = self.pop_context()?;
        let nominal = type_with_children(kind, [context, name]);
        self.push_substitution(nominal.clone());
        Ok(nominal)
    }

    /// `$`: an integer generic argument.
    pub(super) fn demangle_integer_type(&mut self) -> DemangleResult<Node> {
        let kind = if self.cursor.conditional('n') {
            Kind::NegativeInteger
        } else {
            Kind::Integer
        };
        Ok(ty(Node::with_index(kind, self.demangle_index()?)))
    }

    /// `u`: a type under a generic signature.
    pub(super) fn demangle_generic_type(&mut self) -> DemangleResult<Node> {
        let signature = self.pop_required_kind(Kind::DependentGenericSignature)?;
        let inner = self.pop_type()?;
        Ok(type_with_children(Kind::DependentGenericType, [signature, inner]))
    }

    // =========================================================================
    // Bound Generics
    // =========================================================================

    pub(super) fn pop_retroactive_conformances(&mut self) -> Option<Node> {
        let mut conformances = Vec::new();
        while let Some(conformance) = self.pop_kind(Kind::RetroactiveConformance) {
            conformances.push(conformance);
        }
        if conformances.is_empty() {
            return None;
        }
        conformances.reverse();
        Some(Node::with_children(Kind::TypeList, conformances))
    }

    /// Generic argument lists, innermost nominal first, plus any
    /// retroactive conformances that trail them.
    pub(super) fn demangle_bound_generics(&mut self) -> DemangleResult<(Vec<Node>, Option<Node>)> {
        let retroactive = self.pop_retroactive_conformances();
        let mut lists = Vec::new();
        loop {
            let mut types = Vec::new();
            while let Some(arg) = self.pop_kind(Kind::Type) {
                types.push(arg);
            }
            types.reverse();
            lists.push(Node::with_children(Kind::TypeList, types));

            if self.pop_kind(Kind::EmptyList).is_some() {
                break;
            }
            self.pop_required_kind(Kind::FirstElementMarker)?;
        }
        Ok((lists, retroactive))
    }

    /// `G`: apply argument lists to a nominal and its generic parents.
    pub(super) fn demangle_bound_generic_type(&mut self) -> DemangleResult<Node> {
        let (lists, retroactive) = self.demangle_bound_generics()?;
        let nominal = self.pop_type_and_get_any_generic()?;
        let mut bound = self.demangle_bound_generic_args(&nominal, &lists, 0)?;
        if let Some(retroactive) = retroactive {
            bound.add_child(retroactive);
        }
        let bound = ty(bound);
        self.push_substitution(bound.clone());
        Ok(bound)
    }

    fn demangle_bound_generic_args(
        &mut self,
        nominal: &Node,
        lists: &[Node],
        index: usize,
    ) -> DemangleResult<Node> {
        self.descend(|this| this.bind_generic_args(nominal, lists, index))
    }

    /// Bind `lists[index]` to `nominal` and the following lists to its parents.
    fn bind_generic_args(
        &mut self,
        nominal: &Node,
        lists: &[Node],
        index: usize,
    ) -> DemangleResult<Node> {
        if matches!(
            nominal.kind(),
            Kind::TypeSymbolicReference | Kind::ProtocolSymbolicReference
        ) {
            let remaining = lists.iter().rev().flat_map(|list| list.children().iter().cloned());
            return Ok(Node::with_children(
                Kind::BoundGenericOtherNominalType,
                [ty(nominal.clone()), Node::with_children(Kind::TypeList, remaining)],
            ));
        }

        let context = self.require(nominal.first_child())?;
        let consumes_generic_args = !matches!(
            nominal.kind(),
            Kind::Variable
                | Kind::Subscript
                | Kind::ImplicitClosure
                | Kind::ExplicitClosure
                | Kind::DefaultArgumentInitializer
                | Kind::Initializer
                | Kind::PropertyWrapperBackingInitializer
                | Kind::PropertyWrapperInitFromProjectedValue
                | Kind::Static
        );
        let args = self.require(lists.get(index))?;

        let parent_index = index + usize::from(consumes_generic_args);
        let bound_nominal = if parent_index < lists.len() {
            let bound_parent = if context.kind() == Kind::Extension {
                let extended = self.require(context.child(1))?;
                let bound_extended = self.demangle_bound_generic_args(extended, lists, parent_index)?;
                let module = self.require(context.first_child().cloned())?;
                let children = [module, bound_extended].into_iter().chain(context.child(2).cloned());
                Node::with_children(Kind::Extension, children)
            } else {
                self.demangle_bound_generic_args(context, lists, parent_index)?
            };
            Node::with_children(
                nominal.kind(),
                iter::once(bound_parent).chain(nominal.children().iter().skip(1).cloned()),
            )
        } else {
            nominal.clone()
        };

        if !consumes_generic_args || args.num_children() == 0 {
            return Ok(bound_nominal);
        }

        let kind = match bound_nominal.kind() {
            Kind::Class => Kind::BoundGenericClass,
            Kind::Structure => Kind::BoundGenericStructure,
            Kind::Enum => Kind::BoundGenericEnum,
            Kind::Protocol => Kind::BoundGenericProtocol,
            Kind::OtherNominalType => Kind::BoundGenericOtherNominalType,
            Kind::TypeAlias => Kind::BoundGenericTypeAlias,
            Kind::Function | Kind::Constructor => {
                return Ok(Node::with_children(
                    Kind::BoundGenericFunction,
                    [bound_nominal, args.clone()],
                ));
            }
            _ => return Err(self.fail()),
        };
        Ok(Node::with_children(kind, [ty(bound_nominal), args.clone()]))
    }

    // =========================================================================
    // Function Types
    // =========================================================================

    /// Assemble a function type from the stack.
    ///
    /// Annotations are optional and popped in a fixed order, then the
    /// argument tuple, then the result.
    pub(super) fn pop_function_type(&mut self, kind: Kind, has_clang_type: bool) -> DemangleResult<Node> {
        let mut children = Vec::new();
        if has_clang_type {
            children.push(self.demangle_clang_type()?);
        }
        children.extend(self.pop_kind(Kind::SendingResultFunctionType));
        children.extend(self.pop_if(|k| {
            matches!(
                k,
                Kind::GlobalActorFunctionType
                    | Kind::IsolatedAnyFunctionType
                    | Kind::NonIsolatedCallerFunctionType
            )
        }));
        children.extend(self.pop_kind(Kind::DifferentiableFunctionType));
        children.extend(
            self.pop_if(|k| matches!(k, Kind::ThrowsAnnotation | Kind::TypedThrowsAnnotation)),
        );
        children.extend(self.pop_kind(Kind::ConcurrentFunctionType));
        children.extend(self.pop_kind(Kind::AsyncAnnotation));
        children.push(self.pop_function_params(Kind::ArgumentTuple)?);
        children.push(self.pop_function_params(Kind::ReturnType)?);
        Ok(type_with_children(kind, children))
    }

    /// `y` stands for the empty tuple.
    fn pop_function_params(&mut self, kind: Kind) -> DemangleResult<Node> {
        if self.pop_kind(Kind::EmptyList).is_some() {
            return Ok(Node::with_child(kind, ty(Node::new(Kind::Tuple))));
        }
        Ok(Node::with_child(kind, self.pop_type()?))
    }

    /// Argument labels of a function-typed declaration.
    ///
    /// Labels sit on the stack below the type, one per parameter, with `_`
    /// for unlabeled ones. `None` means the type takes no label list at all.
    pub(super) fn pop_function_param_labels(&mut self, function_type: &Node) -> DemangleResult<Option<Node>> {
        if !self.old_function_type_mangling && self.pop_kind(Kind::EmptyList).is_some() {
            return Ok(Some(Node::new(Kind::LabelList)));
        }
        if function_type.kind() != Kind::Type {
            return Ok(None);
        }

        let top = self.require(function_type.first_child())?;
        let function = if top.kind() == Kind::DependentGenericType {
            self.require(top.child(1).and_then(Node::first_child))?
        } else {
            top
        };
        if !matches!(function.kind(), Kind::FunctionType | Kind::NoEscapeFunctionType) {
            return Ok(None);
        }

        let mut first = 0;
        for kinds in FUNCTION_ANNOTATIONS {
            if function.child_kind(first).is_some_and(|k| kinds.contains(&k)) {
                first += 1;
            }
        }

        let arguments = self.require(function.child(first))?;
        self.ensure(arguments.kind() == Kind::ArgumentTuple)?;
        let params_type = self.require(arguments.first_child())?;
        self.ensure(params_type.kind() == Kind::Type)?;

        let params = params_type.first_child();
        let is_tuple = params.is_some_and(|p| p.kind() == Kind::Tuple);
        let num_params = match params {
            Some(tuple) if is_tuple => tuple.num_children(),
            _ => 1,
        };
        if num_params == 0 {
            return Ok(None);
        }
        if self.old_function_type_mangling || !is_tuple {
            return Ok(Some(Node::new(Kind::LabelList)));
        }

        let mut labels: SmallVec<[Node; 4]> = SmallVec::with_capacity(num_params);
        let mut has_labels = false;
        for _ in 0..num_params {
            let label = self.pop_required()?;
            self.ensure(matches!(label.kind(), Kind::Identifier | Kind::FirstElementMarker))?;
            has_labels |= label.kind() != Kind::FirstElementMarker;
            labels.push(label);
        }
        if !has_labels {
            return Ok(Some(Node::new(Kind::LabelList)));
        }
        Ok(Some(Node::with_children(Kind::LabelList, labels.into_iter().rev())))
    }

    pub(super) fn demangle_clang_type(&mut self) -> DemangleResult<Node> {
        let len = self.demangle_count()?;
        let text = self.cursor.read_scalars(len)?;
        Ok(Node::with_text(Kind::ClangType, text))
    }

    /// `Y`: function type annotations and type qualifiers.
    pub(super) fn demangle_type_annotation(&mut self) -> DemangleResult<Node> {
        Ok(match self.cursor.read_scalar()? {
            'a' => Node::new(Kind::AsyncAnnotation),
            'A' => Node::new(Kind::IsolatedAnyFunctionType),
            'b' => Node::new(Kind::ConcurrentFunctionType),
            'c' => Node::with_child(Kind::GlobalActorFunctionType, self.pop_type_and_get_child()?),
            'C' => Node::new(Kind::NonIsolatedCallerFunctionType),
            'i' => type_with_child(Kind::Isolated, self.pop_type_and_get_child()?),
            'j' => {
                let differentiability = Differentiability::from_code(self.cursor.read_scalar()?);
                let differentiability = self.require(differentiability)?;
                Node::with_index(Kind::DifferentiableFunctionType, differentiability.index())
            }
            'k' => type_with_child(Kind::NoDerivative, self.pop_type_and_get_child()?),
            'K' => Node::with_child(Kind::TypedThrowsAnnotation, self.pop_type_and_get_child()?),
            't' => type_with_child(Kind::CompileTimeLiteral, self.pop_type_and_get_child()?),
            'T' => Node::new(Kind::SendingResultFunctionType),
            'u' => type_with_child(Kind::Sending, self.pop_type_and_get_child()?),
            'g' => type_with_child(Kind::ConstValue, self.pop_type_and_get_child()?),
            _ => return Err(self.fail()),
        })
    }

    // =========================================================================
    // Tuples, Packs and Type Lists
    // =========================================================================

    /// `t`: tuple elements, each with an optional label and variadic marker.
    pub(super) fn pop_tuple(&mut self) -> DemangleResult<Node> {
        let elements = if self.pop_kind(Kind::EmptyList).is_some() {
            Vec::new()
        } else {
            self.pop_marked_list(|this| {
                let mut children = Vec::with_capacity(3);
                children.extend(this.pop_kind(Kind::VariadicMarker));
                if let Some(label) = this.pop_kind(Kind::Identifier).as_ref().and_then(Node::text) {
                    children.push(Node::with_text(Kind::TupleElementName, label));
                }
                children.push(this.pop_type()?);
                Ok(Node::with_children(Kind::TupleElement, children))
            })?
        };
        Ok(type_with_children(Kind::Tuple, elements))
    }

    fn pop_pack(&mut self, kind: Kind) -> DemangleResult<Node> {
        if self.pop_kind(Kind::EmptyList).is_some() {
            return Ok(ty(Node::new(kind)));
        }
        let elements = self.pop_marked_list(Self::pop_type)?;
        Ok(type_with_children(kind, elements))
    }

    fn pop_sil_pack(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'd' => self.pop_pack(Kind::SilPackDirect),
            'i' => self.pop_pack(Kind::SilPackIndirect),
            _ => Err(self.fail()),
        }
    }

    pub(super) fn pop_type_list(&mut self) -> DemangleResult<Node> {
        let types = if self.pop_kind(Kind::EmptyList).is_some() {
            Vec::new()
        } else {
            self.pop_marked_list(Self::pop_type)?
        };
        Ok(Node::with_children(Kind::TypeList, types))
    }

    // =========================================================================
    // Impl Function Types
    // =========================================================================

    /// `I`: a lowered function type with explicit conventions.
    ///
    /// Parameters, results, yields and the error result are read first;
    /// their types are then popped from the stack, last one first.
    pub(super) fn demangle_impl_function_type(&mut self) -> DemangleResult<Node> {
        let mut children = Vec::new();

        if self.cursor.conditional('s') {
            let (lists, conformances) = self.demangle_bound_generics()?;
            let signature = self.pop_required_kind(Kind::DependentGenericSignature)?;
            let substitutions = self.require(lists.into_iter().next())?;
            let pattern = [signature, substitutions].into_iter().chain(conformances);
            children.push(Node::with_children(Kind::ImplPatternSubstitutions, pattern));
        }
        if self.cursor.conditional('I') {
            let (lists, conformances) = self.demangle_bound_generics()?;
            let substitutions = self.require(lists.into_iter().next())?;
            let invocation = iter::once(substitutions).chain(conformances);
            children.push(Node::with_children(Kind::ImplInvocationSubstitutions, invocation));
        }

        let generic_signature = match self.pop_kind(Kind::DependentGenericSignature) {
            Some(signature) if self.cursor.conditional('P') => {
                Some(signature.changing_kind(Kind::DependentPseudogenericSignature))
            }
            other => other,
        };

        if self.cursor.conditional('e') {
            children.push(Node::new(Kind::ImplEscaping));
        }
        if self.cursor.conditional('A') {
            children.push(Node::new(Kind::ImplErasedIsolation));
        }
        if let Some(differentiability) = self.cursor.peek().and_then(Differentiability::from_code) {
            self.cursor.skip(1)?;
            children.push(Node::with_index(
                Kind::ImplDifferentiabilityKind,
                differentiability.index(),
            ));
        }

        let callee = match self.cursor.read_scalar()? {
            'y' => "@callee_unowned",
            'g' => "@callee_guaranteed",
            'x' => "@callee_owned",
            't' => "@convention(thin)",
            _ => return Err(self.fail()),
        };
        children.push(Node::with_text(Kind::ImplConvention, callee));

        children.extend(self.demangle_impl_function_convention()?);

        let coroutine = if self.cursor.conditional('A') {
            Some("yield_once")
        } else if self.cursor.conditional('I') {
            Some("yield_once_2")
        } else if self.cursor.conditional('G') {
            Some("yield_many")
        } else {
            None
        };
        children.extend(coroutine.map(|kind| Node::with_text(Kind::ImplCoroutineKind, kind)));

        if self.cursor.conditional('h') {
            children.push(Node::with_text(Kind::ImplFunctionAttribute, "@Sendable"));
        }
        if self.cursor.conditional('H') {
            children.push(Node::with_text(Kind::ImplFunctionAttribute, "@async"));
        }
        if self.cursor.conditional('T') {
            children.push(Node::new(Kind::ImplSendingResult));
        }
        children.extend(generic_signature);

        let mut types_to_add = 0;
        while let Some(mut param) = self.demangle_impl_param_convention(Kind::ImplParameter)? {
            param.add_child(self.demangle_impl_differentiability());
            if self.cursor.conditional('T') {
                param.add_child(Node::with_text(Kind::ImplParameterSending, "sending"));
            }
            if self.cursor.conditional('I') {
                param.add_child(Node::with_text(Kind::ImplParameterIsolated, "isolated"));
            }
            if self.cursor.conditional('L') {
                param.add_child(Node::with_text(
                    Kind::ImplParameterImplicitLeading,
                    "sil_implicit_leading_param",
                ));
            }
            children.push(param);
            types_to_add += 1;
        }
        while let Some(mut result) = self.demangle_impl_result_convention(Kind::ImplResult)? {
            result.add_child(self.demangle_impl_differentiability());
            children.push(result);
            types_to_add += 1;
        }
        while self.cursor.conditional('Y') {
            let yielded = self.demangle_impl_param_convention(Kind::ImplYield)?;
            children.push(self.require(yielded)?);
            types_to_add += 1;
        }
        if self.cursor.conditional('z') {
            let error = self.demangle_impl_result_convention(Kind::ImplErrorResult)?;
            children.push(self.require(error)?);
            types_to_add += 1;
        }
        self.cursor.match_scalar('_')?;

        for i in 1..=types_to_add {
            let index = self.require(children.len().checked_sub(i))?;
            let param_type = self.pop_type()?;
            children[index].add_child(param_type);
        }
        Ok(type_with_children(Kind::ImplFunctionType, children))
    }

    fn demangle_impl_function_convention(&mut self) -> DemangleResult<Option<Node>> {
        let mut has_clang_type = false;
        let name = match self.cursor.read_scalar()? {
            'B' => "block",
            'C' => "c",
            'z' => match self.cursor.read_scalar()? {
                'B' => {
                    has_clang_type = true;
                    "block"
                }
                'C' => {
                    has_clang_type = true;
                    "c"
                }
                _ => {
                    self.cursor.backtrack(2)?;
                    return Ok(None);
                }
            },
            'M' => "method",
            'O' => "objc_method",
            'K' => "closure",
            'W' => "witness_method",
            _ => {
                self.cursor.backtrack(1)?;
                return Ok(None);
            }
        };
        let mut convention = Node::with_child(
            Kind::ImplFunctionConvention,
            Node::with_text(Kind::ImplFunctionConventionName, name),
        );
        if has_clang_type {
            convention.add_child(self.demangle_clang_type()?);
        }
        Ok(Some(convention))
    }

    fn demangle_impl_param_convention(&mut self, kind: Kind) -> DemangleResult<Option<Node>> {
        let convention = match self.cursor.read_scalar()? {
            'i' => "@in",
            'c' => "@in_constant",
            'l' => "@inout",
            'b' => "@inout_aliasable",
            'n' => "@in_guaranteed",
            'X' => "@in_cxx",
            'x' => "@owned",
            'g' => "@guaranteed",
            'e' => "@deallocating",
            'y' => "@unowned",
            'v' => "@pack_owned",
            'p' => "@pack_guaranteed",
            'm' => "@pack_inout",
            _ => {
                self.cursor.backtrack(1)?;
                return Ok(None);
            }
        };
        Ok(Some(Node::with_child(kind, Node::with_text(Kind::ImplConvention, convention))))
    }

    fn demangle_impl_result_convention(&mut self, kind: Kind) -> DemangleResult<Option<Node>> {
        let convention = match self.cursor.read_scalar()? {
            'r' => "@out",
            'o' => "@owned",
            'd' => "@unowned",
            'u' => "@unowned_inner_pointer",
            'a' => "@autoreleased",
            'k' => "@pack_out",
            _ => {
                self.cursor.backtrack(1)?;
                return Ok(None);
            }
        };
        Ok(Some(Node::with_child(kind, Node::with_text(Kind::ImplConvention, convention))))
    }

    fn demangle_impl_differentiability(&mut self) -> Node {
        let text = if self.cursor.conditional('w') { "@noDerivative" } else { "" };
        Node::with_text(Kind::ImplParameterResultDifferentiability, text)
    }

    // =========================================================================
    // Archetypes
    // =========================================================================

    /// `Q`: associated type references, opaque types and packs.
    pub(super) fn demangle_archetype(&mut self) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        match c {
            'a' => {
                let ident = self.pop_required_kind(Kind::Identifier)?;
                let archetype = self.pop_type_and_get_child()?;
                let assoc = type_with_children(Kind::AssociatedTypeRef, [archetype, ident]);
                self.push_substitution(assoc.clone());
                Ok(assoc)
            }
            'O' => Ok(Node::with_child(Kind::OpaqueReturnTypeOf, self.pop_context()?)),
            'o' => {
                let index = self.demangle_index()?;
                let (lists, retroactive) = self.demangle_bound_generics()?;
                let name = self.pop_required()?;
                let children = [
                    name,
                    Node::with_index(Kind::Index, index),
                    Node::with_children(Kind::TypeList, lists.into_iter().rev()),
                ];
                let opaque = type_with_children(Kind::OpaqueType, children.into_iter().chain(retroactive));
                self.push_substitution(opaque.clone());
                Ok(opaque)
            }
            'r' => Ok(ty(Node::new(Kind::OpaqueReturnType))),
            'R' => {
                let index = self.demangle_index()?;
                Ok(type_with_child(
                    Kind::OpaqueReturnType,
                    Node::with_index(Kind::OpaqueReturnTypeIndex, index),
                ))
            }
            'x' | 'X' | 'y' | 'Y' | 'z' | 'Z' => {
                let base = match c.to_ascii_lowercase() {
                    'x' => None,
                    'y' => Some(self.demangle_generic_param_index()?),
                    _ => Some(dependent_generic_param(0, 0)),
                };
                let assoc = if c.is_ascii_lowercase() {
                    self.demangle_associated_type_simple(base)?
                } else {
                    self.demangle_associated_type_compound(base)?
                };
                self.push_substitution(assoc.clone());
                Ok(assoc)
            }
            'p' => {
                let count = self.pop_type_and_get_child()?;
                let pattern = self.pop_type_and_get_child()?;
                Ok(type_with_children(Kind::PackExpansion, [pattern, count]))
            }
            'e' => {
                let pack = self.pop_type_and_get_child()?;
                let level = self.demangle_index()?;
                Ok(type_with_children(
                    Kind::PackElement,
                    [pack, Node::with_index(Kind::PackElementLevel, level)],
                ))
            }
            'P' => self.pop_pack(Kind::Pack),
            'S' => self.pop_sil_pack(),
            _ => Err(self.fail()),
        }
    }
}

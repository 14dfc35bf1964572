//! Grammar driver for the legacy `_T` mangling dialect.
//!
//! Unlike the current dialect this grammar is prefix-ordered: every
//! production reads its operands itself, top-down. Back-references are
//! positional. `S<n>_` names the n-th entry of `name_stack`, which records
//! modules, nominal types, protocols and associated types in decode order.

mod types;

use sym_scanner::Cursor;
use sym_stack::{ensure_sufficient_stack, DepthLimit};
use sym_tree::{Kind, Node, C_SYNTHESIZED_MODULE, OBJC_MODULE, STDLIB_MODULE};
use tracing::trace;

use crate::codes::{FunctionSigSpecializationParamKind as ParamKind, ValueWitnessKind};
use crate::config::DemangleConfig;
use crate::demangler::{ty, DemangleResult};
use crate::error::DemangleError;
use crate::resolver::Directness;
use crate::{punycode, tables};

/// Value witness for a legacy two-letter code.
///
/// The enum-tag witnesses postdate this dialect.
fn value_witness(code: &str) -> Option<ValueWitnessKind> {
    ValueWitnessKind::from_code(code).filter(|kind| {
        !matches!(
            kind,
            ValueWitnessKind::DestructiveInjectEnumTag
                | ValueWitnessKind::GetEnumTagSinglePayload
                | ValueWitnessKind::StoreEnumTagSinglePayload
        )
    })
}

/// A standard library nominal, not wrapped in `Type`.
fn stdlib_node(kind: Kind, name: &str) -> Node {
    Node::with_children(
        kind,
        [
            Node::with_text(Kind::Module, STDLIB_MODULE),
            Node::with_text(Kind::Identifier, name),
        ],
    )
}

fn param_kind(value: u64) -> Node {
    Node::with_index(Kind::FunctionSignatureSpecializationParamKind, value)
}

fn payload(text: impl Into<String>) -> Node {
    Node::with_text(Kind::FunctionSignatureSpecializationParamPayload, text)
}

/// Split a storage name that spells `subscript` into the subscript marker
/// and what is left of the name.
fn split_subscript_name(name: Option<Node>) -> (bool, Option<Node>) {
    match name {
        Some(name) if name.is_identifier("subscript") => (true, None),
        Some(name)
            if name.kind() == Kind::PrivateDeclName
                && name.child(1).and_then(Node::text) == Some("subscript") =>
        {
            let discriminator = name.first_child().cloned();
            (true, discriminator.map(|d| Node::with_child(Kind::PrivateDeclName, d)))
        }
        other => (false, other),
    }
}

/// Decoder state for one legacy input.
pub(crate) struct LegacyDemangler<'a> {
    cursor: Cursor<'a>,
    name_stack: Vec<Node>,
    depth: DepthLimit,
}

impl<'a> LegacyDemangler<'a> {
    pub(crate) fn new(scalars: &'a [char], config: &DemangleConfig) -> Self {
        LegacyDemangler {
            cursor: Cursor::new(scalars),
            name_stack: Vec::new(),
            depth: DepthLimit::new(config.max_depth),
        }
    }

    /// Decode a complete `_T` symbol.
    ///
    /// Specialization and attribute prefixes come first, then one global,
    /// then an optional unparsed suffix.
    pub(crate) fn demangle_symbol(&mut self) -> DemangleResult<Node> {
        self.name_stack.clear();
        self.cursor.reset();
        self.cursor.match_str("_T")?;

        let mut children = Vec::new();
        let first = self.cursor.read_scalar()?;
        let second = self.cursor.read_scalar()?;
        match (first, second) {
            ('T', 'S') => {
                loop {
                    children.push(self.demangle_specialization()?);
                    self.name_stack.clear();
                    if !self.cursor.conditional_str("_TTS") {
                        break;
                    }
                }
                self.cursor.match_str("_T")?;
            }
            ('T', 'o') => children.push(Node::new(Kind::ObjCAttribute)),
            ('T', 'O') => children.push(Node::new(Kind::NonObjCAttribute)),
            ('T', 'D') => children.push(Node::new(Kind::DynamicAttribute)),
            ('T', 'd') => children.push(Node::new(Kind::DirectMethodReferenceAttribute)),
            ('T', 'v') => children.push(Node::new(Kind::VTableAttribute)),
            _ => self.cursor.backtrack(2)?,
        }

        children.push(self.demangle_global()?);
        let remainder = self.cursor.remainder();
        if !remainder.is_empty() {
            children.push(Node::with_text(Kind::Suffix, remainder));
        }
        Ok(Node::with_children(Kind::Global, children))
    }

    // =========================================================================
    // Failure Helpers
    // =========================================================================

    fn fail(&self) -> DemangleError {
        DemangleError::Malformed {
            position: self.cursor.pos(),
        }
    }

    fn require<T>(&self, value: Option<T>) -> DemangleResult<T> {
        value.ok_or_else(|| self.fail())
    }

    fn ensure(&self, condition: bool) -> DemangleResult<()> {
        if condition {
            Ok(())
        } else {
            Err(self.fail())
        }
    }

    fn descend<T>(&mut self, f: impl FnOnce(&mut Self) -> DemangleResult<T>) -> DemangleResult<T> {
        if let Err(exceeded) = self.depth.enter() {
            return Err(DemangleError::TooDeep {
                position: self.cursor.pos(),
                limit: exceeded.limit,
            });
        }
        let result = ensure_sufficient_stack(|| f(self));
        self.depth.exit();
        result
    }

    // =========================================================================
    // Globals
    // =========================================================================

    fn demangle_global(&mut self) -> DemangleResult<Node> {
        let first = self.cursor.read_scalar()?;
        let second = self.cursor.read_scalar()?;
        let (kind, operand) = match (first, second) {
            ('M', 'P') => (Kind::GenericTypeMetadataPattern, self.demangle_type()?),
            ('M', 'a') => (Kind::TypeMetadataAccessFunction, self.demangle_type()?),
            ('M', 'L') => (Kind::TypeMetadataLazyCache, self.demangle_type()?),
            ('M', 'm') => (Kind::Metaclass, self.demangle_type()?),
            ('M', 'n') => (Kind::NominalTypeDescriptor, self.demangle_type()?),
            ('M', 'f') => (Kind::FullTypeMetadata, self.demangle_type()?),
            ('M', 'p') => (Kind::ProtocolDescriptor, self.demangle_protocol_name()?),
            ('M', _) => {
                self.cursor.backtrack(1)?;
                (Kind::TypeMetadata, self.demangle_type()?)
            }
            ('P', 'A') => {
                let kind = if self.cursor.conditional('o') {
                    Kind::PartialApplyObjCForwarder
                } else {
                    Kind::PartialApplyForwarder
                };
                let mut forwarder = Node::new(kind);
                if self.cursor.conditional_str("__T") {
                    forwarder.add_child(self.descend(Self::demangle_global)?);
                }
                return Ok(forwarder);
            }
            ('t', _) => {
                self.cursor.backtrack(1)?;
                (Kind::TypeMangling, self.demangle_type()?)
            }
            ('w', _) => return self.demangle_value_witness(second),
            ('W', 'V') => (Kind::ValueWitnessTable, self.demangle_type()?),
            ('W', 'v') => {
                let directness = if self.cursor.read_scalar()? == 'd' {
                    Directness::Direct
                } else {
                    Directness::Indirect
                };
                let field = self.demangle_entity()?;
                return Ok(Node::with_children(
                    Kind::FieldOffset,
                    [Node::with_index(Kind::Directness, directness.index()), field],
                ));
            }
            ('W', 'P') => (Kind::ProtocolWitnessTable, self.demangle_protocol_conformance()?),
            ('W', 'G') => (
                Kind::GenericProtocolWitnessTable,
                self.demangle_protocol_conformance()?,
            ),
            ('W', 'I') => (
                Kind::GenericProtocolWitnessTableInstantiationFunction,
                self.demangle_protocol_conformance()?,
            ),
            ('W', 'a') => (
                Kind::ProtocolWitnessTableAccessor,
                self.demangle_protocol_conformance()?,
            ),
            ('W', 'l' | 'L') => {
                let kind = if second == 'l' {
                    Kind::LazyProtocolWitnessTableAccessor
                } else {
                    Kind::LazyProtocolWitnessTableCacheVariable
                };
                let conforming = self.demangle_type()?;
                let conformance = self.demangle_protocol_conformance()?;
                return Ok(Node::with_children(kind, [conforming, conformance]));
            }
            ('W', 't') => {
                let conformance = self.demangle_protocol_conformance()?;
                let name = self.demangle_decl_name()?;
                return Ok(Node::with_children(
                    Kind::AssociatedTypeMetadataAccessor,
                    [conformance, name],
                ));
            }
            ('W', 'T') => {
                let conformance = self.demangle_protocol_conformance()?;
                let name = self.demangle_decl_name()?;
                let protocol = self.demangle_protocol_name()?;
                return Ok(Node::with_children(
                    Kind::AssociatedTypeWitnessTableAccessor,
                    [conformance, name, protocol],
                ));
            }
            ('T', 'W') => {
                let conformance = self.demangle_protocol_conformance()?;
                let entity = self.demangle_entity()?;
                return Ok(Node::with_children(Kind::ProtocolWitness, [conformance, entity]));
            }
            ('T', 'R' | 'r') => {
                let kind = if second == 'R' {
                    Kind::ReabstractionThunkHelper
                } else {
                    Kind::ReabstractionThunk
                };
                let mut children = Vec::with_capacity(3);
                if self.cursor.conditional('G') {
                    children.push(self.demangle_generic_signature()?);
                }
                children.push(self.demangle_type()?);
                children.push(self.demangle_type()?);
                return Ok(Node::with_children(kind, children));
            }
            ('P' | 'W', _) => return Err(self.fail()),
            _ => {
                self.cursor.backtrack(2)?;
                return self.demangle_entity();
            }
        };
        Ok(Node::with_child(kind, operand))
    }

    /// `w<code>`: a value witness function of a type.
    fn demangle_value_witness(&mut self, first: char) -> DemangleResult<Node> {
        let second = self.cursor.read_scalar()?;
        let code: String = [first, second].iter().collect();
        let witness = self.require(value_witness(&code))?;
        let operand = self.demangle_type()?;
        Ok(Node::with_children(
            Kind::ValueWitness,
            [Node::with_index(Kind::Index, witness.index()), operand],
        ))
    }

    // =========================================================================
    // Specializations
    // =========================================================================

    /// One `TS` attribute: `g`/`r` generic or `f` function-signature.
    fn demangle_specialization(&mut self) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        let mut children = Vec::new();
        if self.cursor.conditional('q') {
            children.push(Node::new(Kind::IsSerialized));
        }
        let pass = self.cursor.read_scalar()?.to_digit(10);
        let pass = self.require(pass)?;
        children.push(Node::with_index(Kind::SpecializationPassID, u64::from(pass)));

        match c {
            'g' | 'r' => {
                while !self.cursor.conditional('_') {
                    let mut param = vec![self.demangle_type()?];
                    while !self.cursor.conditional('_') {
                        param.push(self.demangle_protocol_conformance()?);
                    }
                    children.push(Node::with_children(Kind::GenericSpecializationParam, param));
                }
                let kind = if c == 'r' {
                    Kind::GenericSpecializationNotReAbstracted
                } else {
                    Kind::GenericSpecialization
                };
                Ok(Node::with_children(kind, children))
            }
            'f' => {
                while !self.cursor.conditional('_') {
                    let param = self.demangle_func_sig_param()?;
                    children.push(Node::with_children(
                        Kind::FunctionSignatureSpecializationParam,
                        param,
                    ));
                }
                Ok(Node::with_children(Kind::FunctionSignatureSpecialization, children))
            }
            _ => Err(self.fail()),
        }
    }

    fn demangle_func_sig_param(&mut self) -> DemangleResult<Vec<Node>> {
        let first = self.cursor.read_scalar()?;
        let second = self.cursor.read_scalar()?;
        match (first, second) {
            ('n', '_') => Ok(Vec::new()),
            ('c', 'p') => self.demangle_constant_prop(),
            ('c', 'l') => {
                let mut children = vec![
                    param_kind(ParamKind::CLOSURE_PROP),
                    self.demangle_identifier_payload()?,
                ];
                while !self.cursor.conditional('_') {
                    children.push(self.demangle_type()?);
                }
                Ok(children)
            }
            ('i', '_') => Ok(vec![param_kind(ParamKind::BOX_TO_VALUE)]),
            ('k', '_') => Ok(vec![param_kind(ParamKind::BOX_TO_STACK)]),
            _ => {
                self.cursor.backtrack(2)?;
                let mut value = 0;
                for (flag, bit) in [
                    ('d', ParamKind::DEAD),
                    ('g', ParamKind::OWNED_TO_GUARANTEED),
                    ('o', ParamKind::GUARANTEED_TO_OWNED),
                    ('s', ParamKind::SROA),
                ] {
                    if self.cursor.conditional(flag) {
                        value |= bit;
                    }
                }
                self.cursor.match_scalar('_')?;
                Ok(vec![param_kind(value)])
            }
        }
    }

    /// `cp`: the constant a parameter was specialized to.
    fn demangle_constant_prop(&mut self) -> DemangleResult<Vec<Node>> {
        let first = self.cursor.read_scalar()?;
        let second = self.cursor.read_scalar()?;
        match (first, second) {
            ('f', 'r') => {
                let name = self.demangle_identifier_payload()?;
                self.cursor.match_scalar('_')?;
                Ok(vec![param_kind(ParamKind::CONSTANT_PROP_FUNCTION), name])
            }
            ('g', _) => {
                self.cursor.backtrack(1)?;
                let name = self.demangle_identifier_payload()?;
                self.cursor.match_scalar('_')?;
                Ok(vec![param_kind(ParamKind::CONSTANT_PROP_GLOBAL), name])
            }
            ('i', _) => {
                self.cursor.backtrack(1)?;
                let literal = self.cursor.read_until('_')?;
                self.cursor.match_scalar('_')?;
                Ok(vec![param_kind(ParamKind::CONSTANT_PROP_INTEGER), payload(literal)])
            }
            ('f', 'l') => {
                let literal = self.cursor.read_until('_')?;
                self.cursor.match_scalar('_')?;
                Ok(vec![param_kind(ParamKind::CONSTANT_PROP_FLOAT), payload(literal)])
            }
            ('s', 'e') => {
                let encoding = match self.cursor.read_scalar()? {
                    '0' => "u8",
                    '1' => "u16",
                    _ => return Err(self.fail()),
                };
                self.cursor.match_scalar('v')?;
                let name = self.demangle_identifier_payload()?;
                self.cursor.match_scalar('_')?;
                Ok(vec![
                    param_kind(ParamKind::CONSTANT_PROP_STRING),
                    payload(encoding),
                    name,
                ])
            }
            _ => Err(self.fail()),
        }
    }

    fn demangle_identifier_payload(&mut self) -> DemangleResult<Node> {
        let identifier = self.demangle_identifier(None)?;
        let text = self.require(identifier.text())?;
        Ok(payload(text))
    }

    // =========================================================================
    // Conformances and Protocols
    // =========================================================================

    fn demangle_protocol_conformance(&mut self) -> DemangleResult<Node> {
        let conforming = self.demangle_type()?;
        let protocol = self.demangle_protocol_name()?;
        let context = self.demangle_context()?;
        Ok(Node::with_children(
            Kind::ProtocolConformance,
            [conforming, protocol, context],
        ))
    }

    /// A protocol, wrapped in `Type`.
    fn demangle_protocol_name(&mut self) -> DemangleResult<Node> {
        let protocol = if self.cursor.conditional('S') {
            let substitution = self.demangle_substitution_index()?;
            match substitution.kind() {
                Kind::Protocol => substitution,
                Kind::Module => self.demangle_protocol_name_given_context(substitution)?,
                _ => return Err(self.fail()),
            }
        } else if self.cursor.conditional('s') {
            let stdlib = Node::with_text(Kind::Module, STDLIB_MODULE);
            self.demangle_protocol_name_given_context(stdlib)?
        } else {
            self.demangle_declaration_name(Kind::Protocol)?
        };
        Ok(ty(protocol))
    }

    fn demangle_protocol_name_given_context(&mut self, context: Node) -> DemangleResult<Node> {
        let name = self.demangle_decl_name()?;
        let protocol = Node::with_children(Kind::Protocol, [context, name]);
        self.push_substitution(protocol.clone());
        Ok(protocol)
    }

    // =========================================================================
    // Nominal Types
    // =========================================================================

    fn demangle_nominal_type(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'S' => self.demangle_substitution_index(),
            'V' => self.demangle_declaration_name(Kind::Structure),
            'O' => self.demangle_declaration_name(Kind::Enum),
            'C' => self.demangle_declaration_name(Kind::Class),
            'P' => self.demangle_declaration_name(Kind::Protocol),
            _ => Err(self.fail()),
        }
    }

    /// `<context> <decl-name>`, recorded as a back-reference.
    fn demangle_declaration_name(&mut self, kind: Kind) -> DemangleResult<Node> {
        let context = self.demangle_context()?;
        let name = self.demangle_decl_name()?;
        let declaration = Node::with_children(kind, [context, name]);
        self.push_substitution(declaration.clone());
        Ok(declaration)
    }

    /// Generic arguments for `nominal` and each of its generic parents.
    ///
    /// The outermost parent's list comes first; each list ends with `_`.
    fn demangle_bound_generic_args(&mut self, nominal: &Node) -> DemangleResult<Node> {
        let parent = self.require(nominal.first_child())?;
        let nominal = if matches!(
            parent.kind(),
            Kind::Module | Kind::Function | Kind::Extension
        ) {
            nominal.clone()
        } else {
            let parent = self.descend(|this| this.demangle_bound_generic_args(parent))?;
            let name = self.require(nominal.child(1))?.clone();
            Node::with_children(nominal.kind(), [parent, name])
        };

        let mut args = Vec::new();
        while !self.cursor.conditional('_') {
            args.push(self.demangle_type()?);
        }
        if args.is_empty() {
            return Ok(nominal);
        }
        let kind = match nominal.kind() {
            Kind::Class => Kind::BoundGenericClass,
            Kind::Structure => Kind::BoundGenericStructure,
            Kind::Enum => Kind::BoundGenericEnum,
            _ => return Err(self.fail()),
        };
        Ok(Node::with_children(
            kind,
            [ty(nominal), Node::with_children(Kind::TypeList, args)],
        ))
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Functions, variables, initializers, subscripts and their accessors.
    /// Anything else is a nominal type.
    fn demangle_entity(&mut self) -> DemangleResult<Node> {
        let is_static = self.cursor.conditional('Z');
        let basic_kind = match self.cursor.read_scalar()? {
            'F' => Kind::Function,
            'v' => Kind::Variable,
            'I' => Kind::Initializer,
            'i' => Kind::Subscript,
            _ => {
                self.cursor.backtrack(1)?;
                return self.demangle_nominal_type();
            }
        };

        let context = self.demangle_context()?;
        let entity = self.demangle_entity_body(basic_kind, context)?;
        Ok(if is_static {
            Node::with_child(Kind::Static, entity)
        } else {
            entity
        })
    }

    fn demangle_entity_body(&mut self, basic_kind: Kind, context: Node) -> DemangleResult<Node> {
        let is_initializer = basic_kind == Kind::Initializer;
        let c = self.cursor.read_scalar()?;
        let (kind, has_type, name, is_accessor) = match c {
            'Z' => (Kind::IsolatedDeallocator, false, None, false),
            'D' => (Kind::Deallocator, false, None, false),
            'd' => (Kind::Destructor, false, None, false),
            'e' => (Kind::IVarInitializer, false, None, false),
            'E' => (Kind::IVarDestroyer, false, None, false),
            'C' => (Kind::Allocator, true, None, false),
            'c' => (Kind::Constructor, true, None, false),
            'a' | 'l' => {
                let mutable = c == 'a';
                let kind = match (self.cursor.read_scalar()?, mutable) {
                    ('O', true) => Kind::OwningMutableAddressor,
                    ('O', false) => Kind::OwningAddressor,
                    ('o', true) => Kind::NativeOwningMutableAddressor,
                    ('o', false) => Kind::NativeOwningAddressor,
                    ('p', true) => Kind::NativePinningMutableAddressor,
                    ('p', false) => Kind::NativePinningAddressor,
                    ('u', true) => Kind::UnsafeMutableAddressor,
                    ('u', false) => Kind::UnsafeAddressor,
                    _ => return Err(self.fail()),
                };
                (kind, true, Some(self.demangle_decl_name()?), true)
            }
            'g' | 'G' | 's' | 'm' | 'w' | 'W' => {
                let kind = match c {
                    'g' => Kind::Getter,
                    'G' => Kind::GlobalGetter,
                    's' => Kind::Setter,
                    'm' => Kind::MaterializeForSet,
                    'w' => Kind::WillSet,
                    _ => Kind::DidSet,
                };
                (kind, true, Some(self.demangle_decl_name()?), true)
            }
            'U' => (Kind::ExplicitClosure, true, Some(self.demangle_index_as_name()?), false),
            'u' => (Kind::ImplicitClosure, true, Some(self.demangle_index_as_name()?), false),
            'A' if is_initializer => (
                Kind::DefaultArgumentInitializer,
                false,
                Some(self.demangle_index_as_name()?),
                false,
            ),
            'i' if is_initializer => (Kind::Initializer, false, None, false),
            _ if is_initializer => return Err(self.fail()),
            _ => {
                self.cursor.backtrack(1)?;
                (basic_kind, true, Some(self.demangle_decl_name()?), false)
            }
        };

        if is_accessor {
            let (is_subscript, name) = split_subscript_name(name);
            let storage_type = self.demangle_type()?;
            let storage = if is_subscript {
                let children = [context, storage_type].into_iter().chain(name);
                Node::with_children(Kind::Subscript, children)
            } else {
                let children = [context].into_iter().chain(name).chain([storage_type]);
                Node::with_children(Kind::Variable, children)
            };
            return Ok(Node::with_child(kind, storage));
        }

        let mut children = vec![context];
        children.extend(name);
        if has_type {
            children.push(self.demangle_type()?);
        }
        Ok(Node::with_children(kind, children))
    }

    // =========================================================================
    // Contexts
    // =========================================================================

    fn demangle_context(&mut self) -> DemangleResult<Node> {
        self.descend(Self::read_context)
    }

    fn read_context(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'E' => {
                let module = self.demangle_module()?;
                let extended = self.demangle_context()?;
                Ok(Node::with_children(Kind::Extension, [module, extended]))
            }
            'e' => {
                let module = self.demangle_module()?;
                let signature = self.demangle_generic_signature()?;
                let extended = self.demangle_context()?;
                Ok(Node::with_children(Kind::Extension, [module, extended, signature]))
            }
            'S' => self.demangle_substitution_index(),
            's' => Ok(Node::with_text(Kind::Module, STDLIB_MODULE)),
            'G' => {
                let nominal = self.demangle_nominal_type()?;
                self.demangle_bound_generic_args(&nominal)
            }
            'F' | 'I' | 'v' | 'P' | 'Z' | 'C' | 'V' | 'O' => {
                self.cursor.backtrack(1)?;
                self.demangle_entity()
            }
            _ => {
                self.cursor.backtrack(1)?;
                self.demangle_module()
            }
        }
    }

    fn demangle_module(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'S' => self.demangle_substitution_index(),
            's' => Ok(Node::with_text(Kind::Module, STDLIB_MODULE)),
            _ => {
                self.cursor.backtrack(1)?;
                let module = self.demangle_identifier(Some(Kind::Module))?;
                self.push_substitution(module.clone());
                Ok(module)
            }
        }
    }

    // =========================================================================
    // Substitutions
    // =========================================================================

    fn push_substitution(&mut self, node: Node) {
        trace!(index = self.name_stack.len(), kind = %node.kind(), "legacy substitution");
        self.name_stack.push(node);
    }

    /// `S<code>`: a fixed module or standard type, or `S<n>_` for the n-th
    /// recorded name.
    fn demangle_substitution_index(&mut self) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        match c {
            'o' => Ok(Node::with_text(Kind::Module, OBJC_MODULE)),
            'C' => Ok(Node::with_text(Kind::Module, C_SYNTHESIZED_MODULE)),
            _ => {
                if let Some(entry) = tables::legacy(c) {
                    return Ok(stdlib_node(entry.kind, entry.name));
                }
                self.cursor.backtrack(1)?;
                let index = self.demangle_index()?;
                let index = usize::try_from(index).ok();
                self.require(index.and_then(|i| self.name_stack.get(i)).cloned())
            }
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// `L<index><ident>` local, `P<ident><ident>` private, or a plain
    /// identifier.
    fn demangle_decl_name(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'L' => {
                let discriminator = self.demangle_index_as_name()?;
                let name = self.demangle_identifier(None)?;
                Ok(Node::with_children(Kind::LocalDeclName, [discriminator, name]))
            }
            'P' => {
                let discriminator = self.demangle_identifier(None)?;
                let name = self.demangle_identifier(None)?;
                Ok(Node::with_children(Kind::PrivateDeclName, [discriminator, name]))
            }
            _ => {
                self.cursor.backtrack(1)?;
                self.demangle_identifier(None)
            }
        }
    }

    /// `_` is 0; `<n>_` is n + 1.
    fn demangle_index(&mut self) -> DemangleResult<u64> {
        if self.cursor.conditional('_') {
            return Ok(0);
        }
        let value = self.cursor.read_int()?;
        self.cursor.match_scalar('_')?;
        self.require(value.checked_add(1))
    }

    fn demangle_index_as_name(&mut self) -> DemangleResult<Node> {
        Ok(Node::with_index(Kind::Number, self.demangle_index()?))
    }

    /// `[X][o<fixity>]<len><text>`.
    ///
    /// `X` marks punycode. Operators spell their characters in letter code
    /// and can only appear where the caller did not ask for a specific kind.
    fn demangle_identifier(&mut self, kind: Option<Kind>) -> DemangleResult<Node> {
        let is_punycoded = self.cursor.conditional('X');
        let (kind, is_operator) = if self.cursor.conditional('o') {
            self.ensure(kind.is_none())?;
            let fixity = match self.cursor.read_scalar()? {
                'p' => Kind::PrefixOperator,
                'P' => Kind::PostfixOperator,
                'i' => Kind::InfixOperator,
                _ => return Err(self.fail()),
            };
            (fixity, true)
        } else {
            (kind.unwrap_or(Kind::Identifier), false)
        };

        let len = self.cursor.read_int()?;
        let len = self.require(usize::try_from(len).ok())?;
        let mut text = self.cursor.read_scalars(len)?;
        if is_punycoded {
            text = self.require(punycode::decode(&text))?;
        }
        if is_operator {
            text = self.spell_operator(&text)?;
        }
        Ok(Node::with_text(kind, text))
    }

    fn spell_operator(&self, code: &str) -> DemangleResult<String> {
        code.chars()
            .map(|c| {
                if c.is_ascii() {
                    self.require(tables::operator_char(c))
                } else {
                    Ok(c)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;

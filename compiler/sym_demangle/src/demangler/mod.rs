//! Grammar driver for the current mangling dialect.
//!
//! The driver is a stack machine over a [`Cursor`]. Each operator character
//! either pushes a leaf or pops the operands the encoder emitted before it,
//! so pops always run in reverse emission order. Back-references index the
//! `substitutions` table, which grows as nominal types, identifiers and a
//! few other nodes are produced.
//!
//! Productions are split across the submodules by concern. Each of them
//! adds an `impl Demangler` block; this file holds the shared state, the
//! stack helpers and the single-character dispatch table.

mod entities;
mod generics;
mod identifiers;
mod special;
mod thunks;
mod types;
mod witness;

use sym_scanner::Cursor;
use sym_stack::{ensure_sufficient_stack, DepthLimit};
use sym_tree::{predicates, Kind, Node, STDLIB_MODULE};
use tracing::trace;

use crate::config::DemangleConfig;
use crate::error::DemangleError;
use crate::resolver::{SymbolicReferenceKind, SymbolicResolver};

pub(crate) type DemangleResult<T> = Result<T, DemangleError>;

/// Cap on `<count>` repetitions in substitution productions.
const MAX_REPEAT_COUNT: u64 = 2048;

/// Cap on the word table used by compressed identifiers.
const MAX_NUM_WORDS: usize = 26;

/// Cap on builtin integer, float and vector widths.
const MAX_BUILTIN_WIDTH: u64 = 4096;

/// Recognized prefixes, tried in this order.
const MANGLING_PREFIXES: &[&str] = &["_T0", "$S", "_$S", "$s", "_$s", "$e", "_$e", "@__swiftmacro_"];

/// Length of the current-dialect prefix `scalars` starts with, or 0.
pub(crate) fn mangling_prefix_len(scalars: &[char]) -> usize {
    let mut cursor = Cursor::new(scalars);
    MANGLING_PREFIXES
        .iter()
        .find(|prefix| cursor.conditional_str(prefix))
        .map_or(0, |prefix| prefix.chars().count())
}

/// Whether `scalars` is a bridged class or protocol name (`_TtC`, `_TtP`).
pub(crate) fn is_bridged_type_name(scalars: &[char]) -> bool {
    matches!(scalars, ['_', 'T', 't', 'C' | 'P', ..])
}

/// Decoder state for one input.
pub(crate) struct Demangler<'a> {
    cursor: Cursor<'a>,
    name_stack: Vec<Node>,
    substitutions: Vec<Node>,
    words: Vec<String>,
    old_function_type_mangling: bool,
    symbolic_reference_index: usize,
    resolver: &'a dyn SymbolicResolver,
    depth: DepthLimit,
}

impl<'a> Demangler<'a> {
    pub(crate) fn new(
        scalars: &'a [char],
        resolver: &'a dyn SymbolicResolver,
        config: &DemangleConfig,
    ) -> Self {
        Demangler {
            cursor: Cursor::new(scalars),
            name_stack: Vec::new(),
            substitutions: Vec::new(),
            words: Vec::new(),
            old_function_type_mangling: false,
            symbolic_reference_index: 0,
            resolver,
            depth: DepthLimit::new(config.max_depth),
        }
    }

    fn reset(&mut self) {
        self.name_stack.clear();
        self.substitutions.clear();
        self.words.clear();
        self.cursor.reset();
    }

    /// Decode a complete symbol that carries a current-dialect or bridging prefix.
    pub(crate) fn demangle_symbol(&mut self) -> DemangleResult<Node> {
        self.reset();

        if self.cursor.conditional_str("_Tt") {
            return self.demangle_bridged_type_name();
        }
        if self.cursor.conditional_str("_T") {
            self.old_function_type_mangling = true;
            self.cursor.backtrack(2)?;
        }

        self.read_mangling_prefix()?;
        self.parse_and_push_names()?;

        let suffix = self.pop_kind(Kind::Suffix);
        let mut children = self.pop_top_level_children()?;
        children.extend(suffix);
        self.ensure(!children.is_empty())?;
        Ok(Node::with_children(Kind::Global, children))
    }

    /// Decode a bare type mangling.
    ///
    /// Input that produces nothing comes back whole as a `Suffix`.
    pub(crate) fn demangle_type(&mut self) -> DemangleResult<Node> {
        self.reset();
        self.parse_and_push_names()?;
        match self.pop() {
            Some(result) => Ok(result),
            None => Ok(Node::with_text(Kind::Suffix, self.cursor.source())),
        }
    }

    fn read_mangling_prefix(&mut self) -> DemangleResult<()> {
        if MANGLING_PREFIXES.iter().any(|prefix| self.cursor.conditional_str(prefix)) {
            Ok(())
        } else {
            Err(self.fail())
        }
    }

    fn parse_and_push_names(&mut self) -> DemangleResult<()> {
        while !self.cursor.is_at_end() {
            let node = self.descend(Self::demangle_operator)?;
            // Postfix operators stack without recursing, so the recursion
            // guard alone does not bound how tall a node gets.
            if node.height() > self.depth.limit() {
                return Err(DemangleError::TooDeep {
                    position: self.cursor.pos(),
                    limit: self.depth.limit(),
                });
            }
            self.name_stack.push(node);
        }
        Ok(())
    }

    /// Fold the name stack into the children of `Global`.
    ///
    /// A partial-apply forwarder wraps everything that is left below it.
    fn pop_top_level_children(&mut self) -> DemangleResult<Vec<Node>> {
        let mut children = Vec::new();
        while let Some(mut attr) = self.pop_if(predicates::is_function_attr) {
            if matches!(
                attr.kind(),
                Kind::PartialApplyForwarder | Kind::PartialApplyObjCForwarder
            ) {
                let nested = self.descend(Self::pop_top_level_children)?;
                attr.add_children(nested);
                children.push(attr);
                return Ok(children);
            }
            children.push(attr);
        }
        for name in &self.name_stack {
            if name.kind() == Kind::Type {
                children.push(self.require(name.first_child().cloned())?);
            } else {
                children.push(name.clone());
            }
        }
        Ok(children)
    }

    /// `_Tt` bridged names: `C <module> <name>` or `P <module> <name> _`.
    fn demangle_bridged_type_name(&mut self) -> DemangleResult<Node> {
        let child = if self.cursor.conditional('C') {
            let module = self.demangle_bridged_module()?;
            let name = self.demangle_identifier()?;
            Node::with_children(Kind::Class, [module, name])
        } else if self.cursor.conditional('P') {
            let module = self.demangle_bridged_module()?;
            let name = self.demangle_identifier()?;
            let protocol = ty(Node::with_children(Kind::Protocol, [module, name]));
            self.cursor.match_scalar('_')?;
            Node::with_child(Kind::ProtocolList, Node::with_child(Kind::TypeList, protocol))
        } else {
            return Err(self.fail());
        };
        self.ensure(self.cursor.is_at_end())?;
        Ok(Node::with_child(
            Kind::Global,
            Node::with_child(Kind::TypeMangling, ty(child)),
        ))
    }

    fn demangle_bridged_module(&mut self) -> DemangleResult<Node> {
        if self.cursor.conditional('s') {
            Ok(Node::with_text(Kind::Module, STDLIB_MODULE))
        } else {
            Ok(self.demangle_identifier()?.changing_kind(Kind::Module))
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn demangle_operator(&mut self) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        match c {
            '\u{1}'..='\u{c}' => self.demangle_symbolic_reference(u32::from(c)),
            'A' => self.demangle_multi_substitutions(),
            'B' => self.demangle_builtin_type(),
            'C' => self.demangle_any_generic_type(Kind::Class),
            'D' => Ok(Node::with_child(Kind::TypeMangling, self.pop_type()?)),
            'E' => self.demangle_extension_context(),
            'F' => self.demangle_plain_function(),
            'G' => self.demangle_bound_generic_type(),
            'H' => self.demangle_conformance_operator(),
            'I' => self.demangle_impl_function_type(),
            'K' => Ok(Node::new(Kind::ThrowsAnnotation)),
            'L' => self.demangle_local_identifier(),
            'M' => self.demangle_metatype(),
            'N' => Ok(Node::with_child(Kind::TypeMetadata, self.pop_type()?)),
            'O' => self.demangle_any_generic_type(Kind::Enum),
            'P' => self.demangle_any_generic_type(Kind::Protocol),
            'Q' => self.demangle_archetype(),
            'R' => self.demangle_generic_requirement(),
            'S' => self.demangle_standard_substitution(),
            'T' => self.demangle_thunk_or_specialization(),
            'V' => self.demangle_any_generic_type(Kind::Structure),
            'W' => self.demangle_witness(),
            'X' => self.demangle_special_type(),
            'Y' => self.demangle_type_annotation(),
            'Z' => {
                let entity = self.pop_required_if(predicates::is_entity)?;
                Ok(Node::with_child(Kind::Static, entity))
            }
            'a' => self.demangle_any_generic_type(Kind::TypeAlias),
            'c' => self.pop_function_type(Kind::FunctionType, false),
            'd' => Ok(Node::new(Kind::VariadicMarker)),
            'f' => self.demangle_function_entity(),
            'g' => self.demangle_retroactive_conformance(),
            'h' => Ok(type_with_child(Kind::Shared, self.pop_type_and_get_child()?)),
            'i' => self.demangle_subscript(),
            'l' => self.demangle_generic_signature(false),
            'm' => Ok(type_with_child(Kind::Metatype, self.pop_type()?)),
            'n' => Ok(type_with_child(Kind::Owned, self.pop_type_and_get_child()?)),
            'o' => self.demangle_operator_identifier(),
            'p' => Ok(ty(self.demangle_protocol_list()?)),
            'q' => Ok(ty(self.demangle_generic_param_index()?)),
            'r' => self.demangle_generic_signature(true),
            's' => Ok(Node::with_text(Kind::Module, STDLIB_MODULE)),
            't' => self.pop_tuple(),
            'u' => self.demangle_generic_type(),
            'v' => self.demangle_variable(),
            'w' => self.demangle_value_witness(),
            'x' => Ok(ty(dependent_generic_param(0, 0))),
            'y' => Ok(Node::new(Kind::EmptyList)),
            'z' => Ok(type_with_child(Kind::InOut, self.pop_type_and_get_child()?)),
            '_' => Ok(Node::new(Kind::FirstElementMarker)),
            '.' => {
                self.cursor.backtrack(1)?;
                Ok(Node::with_text(Kind::Suffix, self.cursor.remainder()))
            }
            '$' => self.demangle_integer_type(),
            _ => {
                self.cursor.backtrack(1)?;
                self.demangle_identifier()
            }
        }
    }

    fn demangle_symbolic_reference(&mut self, byte: u32) -> DemangleResult<Node> {
        let (kind, directness) = self.require(SymbolicReferenceKind::from_byte(byte))?;
        let index = self.symbolic_reference_index;
        trace!(?kind, ?directness, index, "resolving symbolic reference");
        let resolved = self.resolver.resolve(kind, directness, index);
        let node = self.require(resolved)?;
        self.symbolic_reference_index += 1;
        if kind.is_substitutable()
            && !matches!(
                node.kind(),
                Kind::OpaqueTypeDescriptorSymbolicReference | Kind::OpaqueReturnTypeOf
            )
        {
            self.push_substitution(node.clone());
        }
        Ok(node)
    }

    // =========================================================================
    // Failure Helpers
    // =========================================================================

    /// The uniform grammar failure at the current position.
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

    /// Run a recursive production one nesting level deeper.
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
    // Name Stack
    // =========================================================================

    fn pop(&mut self) -> Option<Node> {
        self.name_stack.pop()
    }

    fn pop_kind(&mut self, kind: Kind) -> Option<Node> {
        self.pop_if(|k| k == kind)
    }

    fn pop_if(&mut self, pred: impl Fn(Kind) -> bool) -> Option<Node> {
        if self.name_stack.last().is_some_and(|top| pred(top.kind())) {
            self.name_stack.pop()
        } else {
            None
        }
    }

    fn pop_required(&mut self) -> DemangleResult<Node> {
        let node = self.pop();
        self.require(node)
    }

    fn pop_required_kind(&mut self, kind: Kind) -> DemangleResult<Node> {
        let node = self.pop_kind(kind);
        self.require(node)
    }

    fn pop_required_if(&mut self, pred: impl Fn(Kind) -> bool) -> DemangleResult<Node> {
        let node = self.pop_if(pred);
        self.require(node)
    }

    fn pop_type(&mut self) -> DemangleResult<Node> {
        self.pop_required_kind(Kind::Type)
    }

    fn pop_type_and_get_child(&mut self) -> DemangleResult<Node> {
        let ty = self.pop_type()?;
        self.require(ty.first_child().cloned())
    }

    fn pop_type_and_get_any_generic(&mut self) -> DemangleResult<Node> {
        let child = self.pop_type_and_get_child()?;
        self.ensure(predicates::is_any_generic(child.kind()))?;
        Ok(child)
    }

    fn pop_decl_name(&mut self) -> DemangleResult<Node> {
        self.pop_required_if(predicates::is_decl_name)
    }

    /// Pop an identifier as a module, or a module.
    fn pop_module(&mut self) -> Option<Node> {
        if let Some(ident) = self.pop_kind(Kind::Identifier) {
            return Some(ident.changing_kind(Kind::Module));
        }
        self.pop_kind(Kind::Module)
    }

    fn pop_context(&mut self) -> DemangleResult<Node> {
        if let Some(module) = self.pop_module() {
            return Ok(module);
        }
        if let Some(ty) = self.pop_kind(Kind::Type) {
            let child = self.require(ty.first_child().cloned())?;
            self.ensure(predicates::is_context(child.kind()))?;
            return Ok(child);
        }
        self.pop_required_if(predicates::is_context)
    }

    /// Pop the elements of a `_`-started list, last element first.
    ///
    /// The encoder marks the first element of a list with `_`, so popping
    /// stops after the element that sits on a `FirstElementMarker`. The
    /// result is in emission order.
    fn pop_marked_list(
        &mut self,
        mut pop_element: impl FnMut(&mut Self) -> DemangleResult<Node>,
    ) -> DemangleResult<Vec<Node>> {
        let mut elements = Vec::new();
        loop {
            let first = self.pop_kind(Kind::FirstElementMarker).is_some();
            elements.push(pop_element(self)?);
            if first {
                break;
            }
        }
        elements.reverse();
        Ok(elements)
    }

    fn push_substitution(&mut self, node: Node) {
        trace!(index = self.substitutions.len(), kind = %node.kind(), "substitution");
        self.substitutions.push(node);
    }
}

// =============================================================================
// Node Construction
// =============================================================================

/// `Type(child)`.
pub(crate) fn ty(child: Node) -> Node {
    Node::with_child(Kind::Type, child)
}

/// `Type(kind(child))`.
fn type_with_child(kind: Kind, child: Node) -> Node {
    ty(Node::with_child(kind, child))
}

/// `Type(kind(children...))`.
fn type_with_children(kind: Kind, children: impl IntoIterator<Item = Node>) -> Node {
    ty(Node::with_children(kind, children))
}

/// A standard library nominal type, `Type(kind(Module Swift, Identifier name))`.
fn stdlib_type(kind: Kind, name: &str) -> Node {
    type_with_children(
        kind,
        [
            Node::with_text(Kind::Module, STDLIB_MODULE),
            Node::with_text(Kind::Identifier, name),
        ],
    )
}

fn builtin_type(name: impl Into<String>) -> Node {
    ty(Node::with_text(Kind::BuiltinTypeName, name))
}

pub(crate) fn dependent_generic_param(depth: u64, index: u64) -> Node {
    Node::with_children(
        Kind::DependentGenericParamType,
        [
            Node::with_index(Kind::Index, depth),
            Node::with_index(Kind::Index, index),
        ],
    )
}

#[cfg(test)]
mod tests;

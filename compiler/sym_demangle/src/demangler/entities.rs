//! Declarations: functions, variables, subscripts, accessors, extensions
//! and macro expansions.

use sym_stack::ensure_sufficient_stack;
use sym_tree::{predicates, Kind, Node};

use super::{type_with_children, DemangleResult, Demangler};
use crate::codes::ValueWitnessKind;

/// Operands a function-like entity carries besides its context.
enum EntityArgs {
    None,
    Index,
    TypeAndIndex,
    TypeAndMaybePrivateName,
}

/// Dotted path naming an entity, e.g. `main.Foo.bar`.
///
/// Stored on opaque return types so they can be traced back to their
/// declaration.
fn parent_id(context: &Node, leaf: &str) -> String {
    let mut segments = vec![leaf.to_owned()];
    let mut current = Some(context);
    while let Some(node) = current {
        match node.kind() {
            Kind::Module => {
                segments.extend(node.text().map(str::to_owned));
                break;
            }
            Kind::Extension => current = node.child(1),
            Kind::Type => current = node.first_child(),
            _ => {
                segments.extend(node.child(1).and_then(decl_name_text));
                current = node.first_child();
            }
        }
    }
    segments.reverse();
    segments.join(".")
}

fn decl_name_text(name: &Node) -> Option<String> {
    match name.kind() {
        Kind::LocalDeclName | Kind::PrivateDeclName | Kind::RelatedEntityDeclName => {
            name.last_child().and_then(Node::text).map(str::to_owned)
        }
        _ => name.text().map(str::to_owned),
    }
}

/// Attach `parent` to every opaque return type under `node` that has none.
///
/// Nested entities keep their own annotation. Returns `None` when nothing
/// changed.
fn set_opaque_parent(node: &Node, parent: &str) -> Option<Node> {
    if node.kind() == Kind::OpaqueReturnType {
        if node.last_child().is_some_and(|c| c.kind() == Kind::OpaqueReturnTypeParent) {
            return None;
        }
        return Some(
            node.clone()
                .adding_child(Node::with_text(Kind::OpaqueReturnTypeParent, parent)),
        );
    }
    if matches!(node.kind(), Kind::Function | Kind::Variable | Kind::Subscript) {
        return None;
    }

    let mut updated: Option<Node> = None;
    for (i, child) in node.children().iter().enumerate() {
        if let Some(new_child) = ensure_sufficient_stack(|| set_opaque_parent(child, parent)) {
            updated.get_or_insert_with(|| node.clone()).replace_child(i, new_child);
        }
    }
    updated
}

fn with_opaque_parent(node: Node, parent: &str) -> Node {
    set_opaque_parent(&node, parent).unwrap_or(node)
}

impl Demangler<'_> {
    /// `E`: an extension of a nominal type, declared in a module.
    pub(super) fn demangle_extension_context(&mut self) -> DemangleResult<Node> {
        let signature = self.pop_kind(Kind::DependentGenericSignature);
        let module = self.pop_module();
        let module = self.require(module)?;
        let extended = self.pop_type_and_get_any_generic()?;
        let children = [module, extended].into_iter().chain(signature);
        Ok(Node::with_children(Kind::Extension, children))
    }

    /// `F`: a named function with its type and optional argument labels.
    pub(super) fn demangle_plain_function(&mut self) -> DemangleResult<Node> {
        let signature = self.pop_kind(Kind::DependentGenericSignature);
        let function_type = self.pop_function_type(Kind::FunctionType, false)?;
        let labels = self.pop_function_param_labels(&function_type)?;
        let function_type = match signature {
            Some(signature) => {
                type_with_children(Kind::DependentGenericType, [signature, function_type])
            }
            None => function_type,
        };
        let name = self.pop_decl_name()?;
        let context = self.pop_context()?;

        let leaf = decl_name_text(&name).unwrap_or_default();
        let function_type = with_opaque_parent(function_type, &parent_id(&context, &leaf));
        let children = [context, name].into_iter().chain(labels).chain([function_type]);
        Ok(Node::with_children(Kind::Function, children))
    }

    /// `f`: constructors, destructors, closures, initializers and macros.
    pub(super) fn demangle_function_entity(&mut self) -> DemangleResult<Node> {
        let (args, kind) = match self.cursor.read_scalar()? {
            'D' => (EntityArgs::None, Kind::Deallocator),
            'd' => (EntityArgs::None, Kind::Destructor),
            'Z' => (EntityArgs::None, Kind::IsolatedDeallocator),
            'E' => (EntityArgs::None, Kind::IVarDestroyer),
            'e' => (EntityArgs::None, Kind::IVarInitializer),
            'i' => (EntityArgs::None, Kind::Initializer),
            'C' => (EntityArgs::TypeAndMaybePrivateName, Kind::Allocator),
            'c' => (EntityArgs::TypeAndMaybePrivateName, Kind::Constructor),
            'U' => (EntityArgs::TypeAndIndex, Kind::ExplicitClosure),
            'u' => (EntityArgs::TypeAndIndex, Kind::ImplicitClosure),
            'A' => (EntityArgs::Index, Kind::DefaultArgumentInitializer),
            'm' => return self.demangle_entity(Kind::Macro),
            'M' => return self.demangle_macro_expansion(),
            'p' => return self.demangle_entity(Kind::GenericTypeParamDecl),
            'P' => (EntityArgs::None, Kind::PropertyWrapperBackingInitializer),
            'W' => (EntityArgs::None, Kind::PropertyWrapperInitFromProjectedValue),
            _ => return Err(self.fail()),
        };

        let mut children = Vec::with_capacity(4);
        match args {
            EntityArgs::None => {}
            EntityArgs::Index => children.push(self.demangle_index_as_name()?),
            EntityArgs::TypeAndIndex => {
                children.push(self.demangle_index_as_name()?);
                children.push(self.pop_type()?);
            }
            EntityArgs::TypeAndMaybePrivateName => {
                let private_name = self.pop_kind(Kind::PrivateDeclName);
                let param_type = self.pop_type()?;
                children.extend(self.pop_function_param_labels(&param_type)?);
                children.push(param_type);
                children.extend(private_name);
            }
        }
        children.insert(0, self.pop_context()?);
        Ok(Node::with_children(kind, children))
    }

    /// A named, typed entity: `context name [labels] type`.
    fn demangle_entity(&mut self, kind: Kind) -> DemangleResult<Node> {
        let entity_type = self.pop_type()?;
        let labels = self.pop_function_param_labels(&entity_type)?;
        let name = self.pop_decl_name()?;
        let context = self.pop_context()?;

        let leaf = decl_name_text(&name).unwrap_or_default();
        let entity_type = with_opaque_parent(entity_type, &parent_id(&context, &leaf));
        let children = [context, name].into_iter().chain(labels).chain([entity_type]);
        Ok(Node::with_children(kind, children))
    }

    /// `v`: a variable, optionally wrapped in an accessor.
    pub(super) fn demangle_variable(&mut self) -> DemangleResult<Node> {
        let variable = self.demangle_entity(Kind::Variable)?;
        self.demangle_accessor(variable)
    }

    /// `i`: a subscript, always followed by an accessor letter.
    pub(super) fn demangle_subscript(&mut self) -> DemangleResult<Node> {
        let private_name = self.pop_kind(Kind::PrivateDeclName);
        let subscript_type = self.pop_type()?;
        let labels = self.pop_function_param_labels(&subscript_type)?;
        let context = self.pop_context()?;

        let subscript_type = with_opaque_parent(subscript_type, &parent_id(&context, "subscript"));
        let children = [context]
            .into_iter()
            .chain(labels)
            .chain([subscript_type])
            .chain(private_name);
        let subscript = Node::with_children(Kind::Subscript, children);
        self.demangle_accessor(subscript)
    }

    /// Wrap a storage declaration in the accessor its suffix letter names.
    /// `p` leaves it bare.
    fn demangle_accessor(&mut self, storage: Node) -> DemangleResult<Node> {
        let kind = match self.cursor.read_scalar()? {
            'm' => Kind::MaterializeForSet,
            's' => Kind::Setter,
            'g' => Kind::Getter,
            'G' => Kind::GlobalGetter,
            'w' => Kind::WillSet,
            'W' => Kind::DidSet,
            'r' => Kind::ReadAccessor,
            'y' => Kind::Read2Accessor,
            'M' => Kind::ModifyAccessor,
            'x' => Kind::Modify2Accessor,
            'i' => Kind::InitAccessor,
            'a' => match self.cursor.read_scalar()? {
                'O' => Kind::OwningMutableAddressor,
                'o' => Kind::NativeOwningMutableAddressor,
                'p' => Kind::NativePinningMutableAddressor,
                'u' => Kind::UnsafeMutableAddressor,
                _ => return Err(self.fail()),
            },
            'l' => match self.cursor.read_scalar()? {
                'O' => Kind::OwningAddressor,
                'o' => Kind::NativeOwningAddressor,
                'p' => Kind::NativePinningAddressor,
                'u' => Kind::UnsafeAddressor,
                _ => return Err(self.fail()),
            },
            'p' => return Ok(storage),
            _ => return Err(self.fail()),
        };
        Ok(Node::with_child(kind, storage))
    }

    /// `fM`: macro expansions and their source locations.
    fn demangle_macro_expansion(&mut self) -> DemangleResult<Node> {
        let (kind, is_attached, is_freestanding) = match self.cursor.read_scalar()? {
            'a' => (Kind::AccessorAttachedMacroExpansion, true, false),
            'r' => (Kind::MemberAttributeAttachedMacroExpansion, true, false),
            'm' => (Kind::MemberAttachedMacroExpansion, true, false),
            'p' => (Kind::PeerAttachedMacroExpansion, true, false),
            'c' => (Kind::ConformanceAttachedMacroExpansion, true, false),
            'b' => (Kind::BodyAttachedMacroExpansion, true, false),
            'f' => (Kind::FreestandingMacroExpansion, false, true),
            'u' => (Kind::MacroExpansionUniqueName, false, false),
            'X' => {
                let line = self.demangle_index()?;
                let column = self.demangle_index()?;
                let buffer = self.pop_required_kind(Kind::Identifier)?;
                let module = self.pop_required_kind(Kind::Identifier)?;
                return Ok(Node::with_children(
                    Kind::MacroExpansionLoc,
                    [
                        module,
                        buffer,
                        Node::with_index(Kind::Index, line),
                        Node::with_index(Kind::Index, column),
                    ],
                ));
            }
            _ => return Err(self.fail()),
        };

        let macro_name = self.pop_required_kind(Kind::Identifier)?;
        let private_discriminator = if is_freestanding {
            self.pop_kind(Kind::PrivateDeclName)
        } else {
            None
        };
        let attached_name = if is_attached {
            self.pop_if(predicates::is_decl_name)
        } else {
            None
        };
        let context = match self.pop_if(predicates::is_macro_expansion) {
            Some(outer) => outer,
            None => self.pop_context()?,
        };
        let discriminator = self.demangle_index_as_name()?;

        let children = [context]
            .into_iter()
            .chain(attached_name)
            .chain([macro_name, discriminator])
            .chain(private_discriminator);
        Ok(Node::with_children(kind, children))
    }

    /// `w`: a value witness function of a type.
    pub(super) fn demangle_value_witness(&mut self) -> DemangleResult<Node> {
        let code = self.cursor.read_scalars(2)?;
        let witness = self.require(ValueWitnessKind::from_code(&code))?;
        let witness_type = self.pop_type()?;
        Ok(Node::with_children(
            Kind::ValueWitness,
            [Node::with_index(Kind::Index, witness.index()), witness_type],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn module(name: &str) -> Node {
        Node::with_text(Kind::Module, name)
    }

    fn ident(name: &str) -> Node {
        Node::with_text(Kind::Identifier, name)
    }

    #[test]
    fn test_parent_id_walks_contexts() {
        let structure = Node::with_children(Kind::Structure, [module("main"), ident("Box")]);
        assert_eq!(parent_id(&structure, "value"), "main.Box.value");

        let extension = Node::with_children(Kind::Extension, [module("app"), structure]);
        assert_eq!(parent_id(&extension, "value"), "main.Box.value");

        let private = Node::with_children(
            Kind::PrivateDeclName,
            [ident("_ABC"), ident("hidden")],
        );
        let class = Node::with_children(Kind::Class, [module("m"), private]);
        assert_eq!(parent_id(&class, "f"), "m.hidden.f");
    }

    #[test]
    fn test_opaque_parent_is_added_once() {
        let opaque = Node::with_child(Kind::Type, Node::new(Kind::OpaqueReturnType));
        let ret = Node::with_child(Kind::ReturnType, opaque);

        let annotated = with_opaque_parent(ret.clone(), "main.foo");
        let parent = &annotated.children()[0].children()[0].children()[0];
        assert_eq!(parent.kind(), Kind::OpaqueReturnTypeParent);
        assert_eq!(parent.text(), Some("main.foo"));

        let again = with_opaque_parent(annotated.clone(), "other");
        assert!(again.ptr_eq(&annotated));
        assert_eq!(ret.children()[0].children()[0].num_children(), 0);
    }

    #[test]
    fn test_opaque_parent_stops_at_nested_entities() {
        let inner = Node::with_children(
            Kind::Function,
            [module("m"), ident("g"), Node::new(Kind::OpaqueReturnType)],
        );
        let outer = Node::with_child(Kind::Type, inner);
        let result = with_opaque_parent(outer.clone(), "m.f");
        assert!(result.ptr_eq(&outer));
    }
}

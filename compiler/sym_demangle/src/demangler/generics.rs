//! Generic signatures, requirements, protocols and conformances.

use sym_tree::{predicates, Kind, Node};

use super::{dependent_generic_param, ty, type_with_children, DemangleResult, Demangler};

/// What a generic requirement constrains its subject with.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Constraint {
    ValueMarker,
    PackMarker,
    Protocol,
    BaseClass,
    SameType,
    SameShape,
    Layout,
    Inverse,
}

/// How the subject of a generic requirement is spelled.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Subject {
    Generic,
    Assoc,
    CompoundAssoc,
    Substitution,
}

impl Demangler<'_> {
    // =========================================================================
    // Generic Parameters and Signatures
    // =========================================================================

    /// A generic parameter reference: `d<depth>_<index>_`, `z`, `s` for the
    /// constrained existential's `Self`, or `<index>_` at depth 0.
    pub(super) fn demangle_generic_param_index(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'd' => {
                let depth = self.demangle_index()?;
                let depth = self.require(depth.checked_add(1))?;
                let index = self.demangle_index()?;
                Ok(dependent_generic_param(depth, index))
            }
            'z' => Ok(dependent_generic_param(0, 0)),
            's' => Ok(Node::new(Kind::ConstrainedExistentialSelf)),
            _ => {
                self.cursor.backtrack(1)?;
                let index = self.demangle_index()?;
                Ok(dependent_generic_param(0, self.require(index.checked_add(1))?))
            }
        }
    }

    /// `l` and `r`: parameter counts per depth followed by the requirements
    /// already on the stack.
    pub(super) fn demangle_generic_signature(&mut self, has_param_counts: bool) -> DemangleResult<Node> {
        let mut children = Vec::new();
        if has_param_counts {
            while !self.cursor.conditional('l') {
                let count = if self.cursor.conditional('z') {
                    0
                } else {
                    let index = self.demangle_index()?;
                    self.require(index.checked_add(1))?
                };
                children.push(Node::with_index(Kind::DependentGenericParamCount, count));
            }
        } else {
            children.push(Node::with_index(Kind::DependentGenericParamCount, 1));
        }

        let mut requirements = Vec::new();
        while let Some(requirement) = self.pop_if(predicates::is_requirement) {
            requirements.push(requirement);
        }
        children.extend(requirements.into_iter().rev());
        Ok(Node::with_children(Kind::DependentGenericSignature, children))
    }

    /// `R`: one requirement of a generic signature.
    pub(super) fn demangle_generic_requirement(&mut self) -> DemangleResult<Node> {
        let mut inverse = None;
        let (constraint, subject) = match self.cursor.read_scalar()? {
            'V' => (Constraint::ValueMarker, Subject::Generic),
            'v' => (Constraint::PackMarker, Subject::Generic),
            'c' => (Constraint::BaseClass, Subject::Assoc),
            'C' => (Constraint::BaseClass, Subject::CompoundAssoc),
            'b' => (Constraint::BaseClass, Subject::Generic),
            'B' => (Constraint::BaseClass, Subject::Substitution),
            't' => (Constraint::SameType, Subject::Assoc),
            'T' => (Constraint::SameType, Subject::CompoundAssoc),
            's' => (Constraint::SameType, Subject::Generic),
            'S' => (Constraint::SameType, Subject::Substitution),
            'm' => (Constraint::Layout, Subject::Assoc),
            'M' => (Constraint::Layout, Subject::CompoundAssoc),
            'l' => (Constraint::Layout, Subject::Generic),
            'L' => (Constraint::Layout, Subject::Substitution),
            'p' => (Constraint::Protocol, Subject::Assoc),
            'P' => (Constraint::Protocol, Subject::CompoundAssoc),
            'Q' => (Constraint::Protocol, Subject::Substitution),
            'h' => (Constraint::SameShape, Subject::Generic),
            'i' => {
                inverse = Some(self.demangle_index_as_name()?);
                (Constraint::Inverse, Subject::Generic)
            }
            'I' => {
                inverse = Some(self.demangle_index_as_name()?);
                (Constraint::Inverse, Subject::Substitution)
            }
            _ => {
                self.cursor.backtrack(1)?;
                (Constraint::Protocol, Subject::Generic)
            }
        };

        let subject = match subject {
            Subject::Generic => ty(self.demangle_generic_param_index()?),
            Subject::Assoc => {
                let param = self.demangle_generic_param_index()?;
                let assoc = self.demangle_associated_type_simple(Some(param))?;
                self.push_substitution(assoc.clone());
                assoc
            }
            Subject::CompoundAssoc => {
                let param = self.demangle_generic_param_index()?;
                let assoc = self.demangle_associated_type_compound(Some(param))?;
                self.push_substitution(assoc.clone());
                assoc
            }
            Subject::Substitution => self.pop_type()?,
        };

        let (kind, constraint_node) = match constraint {
            Constraint::ValueMarker => (Kind::DependentGenericParamValueMarker, self.pop_type()?),
            Constraint::PackMarker => {
                return Ok(Node::with_child(Kind::DependentGenericParamPackMarker, subject));
            }
            Constraint::Protocol => (Kind::DependentGenericConformanceRequirement, self.pop_protocol()?),
            Constraint::Inverse => (
                Kind::DependentGenericInverseConformanceRequirement,
                self.require(inverse)?,
            ),
            Constraint::BaseClass => (Kind::DependentGenericConformanceRequirement, self.pop_type()?),
            Constraint::SameType => (Kind::DependentGenericSameTypeRequirement, self.pop_type()?),
            Constraint::SameShape => (Kind::DependentGenericSameShapeRequirement, self.pop_type()?),
            Constraint::Layout => return self.demangle_layout_requirement(subject),
        };
        Ok(Node::with_children(kind, [subject, constraint_node]))
    }

    /// Layout letter, then a size for `e`/`m`/`S` or size and alignment for `E`/`M`.
    fn demangle_layout_requirement(&mut self, subject: Node) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        let mut children = vec![subject, Node::with_text(Kind::Identifier, c.to_string())];
        match c {
            'U' | 'R' | 'N' | 'C' | 'D' | 'T' | 'B' => {}
            'E' | 'M' => {
                children.push(self.demangle_index_as_name()?);
                children.push(self.demangle_index_as_name()?);
            }
            'e' | 'm' | 'S' => children.push(self.demangle_index_as_name()?),
            _ => return Err(self.fail()),
        }
        Ok(Node::with_children(Kind::DependentGenericLayoutRequirement, children))
    }

    // =========================================================================
    // Associated Types
    // =========================================================================

    /// A dependent member type on a generic parameter or on the popped type.
    pub(super) fn demangle_associated_type_simple(&mut self, base: Option<Node>) -> DemangleResult<Node> {
        let name = self.pop_associated_type_name()?;
        let base = match base {
            Some(param) => ty(param),
            None => self.pop_type()?,
        };
        Ok(type_with_children(Kind::DependentMemberType, [base, name]))
    }

    /// A chain of dependent member types, outermost name last.
    pub(super) fn demangle_associated_type_compound(&mut self, base: Option<Node>) -> DemangleResult<Node> {
        let mut names = Vec::new();
        loop {
            let first = self.pop_kind(Kind::FirstElementMarker).is_some();
            names.push(self.pop_associated_type_name()?);
            if first {
                break;
            }
        }

        let mut base = match base {
            Some(param) => ty(param),
            None => self.pop_type()?,
        };
        while let Some(name) = names.pop() {
            base = type_with_children(Kind::DependentMemberType, [base, name]);
        }
        Ok(base)
    }

    /// An associated type name, optionally qualified by its protocol.
    pub(super) fn pop_associated_type_name(&mut self) -> DemangleResult<Node> {
        let protocol = match self.pop_kind(Kind::Type) {
            Some(protocol) => {
                self.ensure(protocol.is_protocol())?;
                Some(protocol)
            }
            None => self.pop_if(|k| {
                matches!(
                    k,
                    Kind::ProtocolSymbolicReference | Kind::ObjectiveCProtocolSymbolicReference
                )
            }),
        };
        let ident = self.pop_required_kind(Kind::Identifier)?;
        let children = std::iter::once(ident).chain(protocol);
        Ok(Node::with_children(Kind::DependentAssociatedTypeRef, children))
    }

    pub(super) fn pop_associated_type_path(&mut self) -> DemangleResult<Node> {
        let names = self.pop_marked_list(Self::pop_associated_type_name)?;
        Ok(Node::with_children(Kind::AssocTypePath, names))
    }

    // =========================================================================
    // Protocols
    // =========================================================================

    /// A protocol as a `Type`, a symbolic reference, or a name in a context.
    pub(super) fn pop_protocol(&mut self) -> DemangleResult<Node> {
        if let Some(protocol) = self.pop_kind(Kind::Type) {
            self.ensure(protocol.first_child().is_some_and(Node::is_protocol))?;
            return Ok(protocol);
        }
        if let Some(reference) = self.pop_if(|k| {
            matches!(
                k,
                Kind::ProtocolSymbolicReference | Kind::ObjectiveCProtocolSymbolicReference
            )
        }) {
            return Ok(reference);
        }
        let name = self.pop_decl_name()?;
        let context = self.pop_context()?;
        Ok(type_with_children(Kind::Protocol, [context, name]))
    }

    /// `p`: a protocol composition; `y` is the empty one.
    pub(super) fn demangle_protocol_list(&mut self) -> DemangleResult<Node> {
        let protocols = if self.pop_kind(Kind::EmptyList).is_some() {
            Vec::new()
        } else {
            self.pop_marked_list(Self::pop_protocol)?
        };
        Ok(Node::with_child(
            Kind::ProtocolList,
            Node::with_children(Kind::TypeList, protocols),
        ))
    }

    pub(super) fn demangle_constrained_existential_requirement_list(&mut self) -> DemangleResult<Node> {
        let requirements =
            self.pop_marked_list(|this| this.pop_required_if(predicates::is_requirement))?;
        Ok(Node::with_children(
            Kind::ConstrainedExistentialRequirementList,
            requirements,
        ))
    }

    // =========================================================================
    // Conformances
    // =========================================================================

    /// `H`: conformance references and descriptor records.
    ///
    /// An unknown second letter means the `H` began an identifier.
    pub(super) fn demangle_conformance_operator(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'A' => self.demangle_dependent_conformance_associated(),
            'C' => self.demangle_concrete_conformance(),
            'D' => self.demangle_dependent_conformance_root(),
            'I' => self.demangle_dependent_conformance_inherited(),
            'O' => {
                let opaque = self.pop_type()?;
                let conformance = self.pop_dependent_conformance()?;
                Ok(Node::with_children(
                    Kind::DependentProtocolConformanceOpaque,
                    [conformance, opaque],
                ))
            }
            'P' => Ok(Node::with_child(
                Kind::ProtocolConformanceRefInTypeModule,
                self.pop_protocol()?,
            )),
            'p' => Ok(Node::with_child(
                Kind::ProtocolConformanceRefInProtocolModule,
                self.pop_protocol()?,
            )),
            'X' => Ok(Node::with_child(
                Kind::PackProtocolConformance,
                self.pop_any_conformance_list()?,
            )),
            'c' => Ok(Node::with_child(
                Kind::ProtocolConformanceDescriptorRecord,
                self.pop_protocol_conformance()?,
            )),
            'n' => Ok(Node::with_child(Kind::NominalTypeDescriptorRecord, self.pop_type()?)),
            'o' => Ok(Node::with_child(Kind::OpaqueTypeDescriptorRecord, self.pop_required()?)),
            'r' => Ok(Node::with_child(Kind::ProtocolDescriptorRecord, self.pop_protocol()?)),
            'F' => Ok(Node::new(Kind::AccessibleFunctionRecord)),
            _ => {
                self.cursor.backtrack(2)?;
                self.demangle_identifier()
            }
        }
    }

    /// `g`: a retroactive conformance attached to a generic argument.
    pub(super) fn demangle_retroactive_conformance(&mut self) -> DemangleResult<Node> {
        let index = self.demangle_index_as_name()?;
        let conformance = self.pop_any_conformance()?;
        Ok(Node::with_children(Kind::RetroactiveConformance, [index, conformance]))
    }

    fn pop_any_conformance(&mut self) -> DemangleResult<Node> {
        self.pop_required_if(|k| {
            matches!(
                k,
                Kind::ConcreteProtocolConformance
                    | Kind::PackProtocolConformance
                    | Kind::DependentProtocolConformanceRoot
                    | Kind::DependentProtocolConformanceInherited
                    | Kind::DependentProtocolConformanceAssociated
            )
        })
    }

    fn pop_dependent_conformance(&mut self) -> DemangleResult<Node> {
        self.pop_required_if(|k| {
            matches!(
                k,
                Kind::DependentProtocolConformanceRoot
                    | Kind::DependentProtocolConformanceInherited
                    | Kind::DependentProtocolConformanceAssociated
            )
        })
    }

    pub(super) fn pop_any_conformance_list(&mut self) -> DemangleResult<Node> {
        let conformances = if self.pop_kind(Kind::EmptyList).is_some() {
            Vec::new()
        } else {
            self.pop_marked_list(Self::pop_any_conformance)?
        };
        Ok(Node::with_children(Kind::AnyProtocolConformanceList, conformances))
    }

    fn demangle_concrete_conformance(&mut self) -> DemangleResult<Node> {
        let conditional = self.pop_any_conformance_list()?;
        let reference = match self.pop_if(|k| {
            matches!(
                k,
                Kind::ProtocolConformanceRefInTypeModule | Kind::ProtocolConformanceRefInProtocolModule
            )
        }) {
            Some(reference) => reference,
            None => {
                let module = self.pop_module();
                let module = self.require(module)?;
                let protocol = self.pop_protocol()?;
                Node::with_children(Kind::ProtocolConformanceRefInOtherModule, [protocol, module])
            }
        };
        let conforming = self.pop_type()?;
        Ok(Node::with_children(
            Kind::ConcreteProtocolConformance,
            [conforming, reference, conditional],
        ))
    }

    fn demangle_dependent_conformance_root(&mut self) -> DemangleResult<Node> {
        let index = self.demangle_dependent_conformance_index()?;
        let protocol = self.pop_protocol()?;
        let subject = self.pop_type()?;
        Ok(Node::with_children(
            Kind::DependentProtocolConformanceRoot,
            [subject, protocol, index],
        ))
    }

    fn demangle_dependent_conformance_inherited(&mut self) -> DemangleResult<Node> {
        let index = self.demangle_dependent_conformance_index()?;
        let protocol = self.pop_protocol()?;
        let nested = self.pop_dependent_conformance()?;
        Ok(Node::with_children(
            Kind::DependentProtocolConformanceInherited,
            [nested, protocol, index],
        ))
    }

    fn demangle_dependent_conformance_associated(&mut self) -> DemangleResult<Node> {
        let index = self.demangle_dependent_conformance_index()?;
        let protocol = self.pop_protocol()?;
        let subject = self.pop_type()?;
        let associated = Node::with_children(Kind::DependentAssociatedConformance, [subject, protocol]);
        let nested = self.pop_dependent_conformance()?;
        Ok(Node::with_children(
            Kind::DependentProtocolConformanceAssociated,
            [nested, associated, index],
        ))
    }

    /// `1` encodes an unknown index; larger values are offset by two.
    fn demangle_dependent_conformance_index(&mut self) -> DemangleResult<Node> {
        match self.demangle_index()? {
            1 => Ok(Node::new(Kind::UnknownIndex)),
            index => {
                let index = self.require(index.checked_sub(2))?;
                Ok(Node::with_index(Kind::Index, index))
            }
        }
    }

    /// The operands of a protocol conformance record or witness table symbol.
    pub(super) fn pop_protocol_conformance(&mut self) -> DemangleResult<Node> {
        let signature = self.pop_kind(Kind::DependentGenericSignature);
        let module = self.pop_module();
        let module = self.require(module)?;
        let protocol = self.pop_protocol()?;

        let mut conforming = self.pop_kind(Kind::Type);
        let mut ident = None;
        if conforming.is_none() {
            ident = self.pop_kind(Kind::Identifier);
            conforming = self.pop_kind(Kind::Type);
        }
        let conforming = self.require(conforming)?;
        let conforming = match signature {
            Some(signature) => {
                type_with_children(Kind::DependentGenericType, [signature, conforming])
            }
            None => conforming,
        };

        let children = [conforming, protocol, module].into_iter().chain(ident);
        Ok(Node::with_children(Kind::ProtocolConformance, children))
    }
}

//! Legacy types, generic signatures and requirements.

use sym_tree::{Kind, Node, STDLIB_MODULE};

use super::LegacyDemangler;
use crate::demangler::{dependent_generic_param, ty, DemangleResult};

impl LegacyDemangler<'_> {
    /// A type, wrapped in `Type`.
    pub(super) fn demangle_type(&mut self) -> DemangleResult<Node> {
        let inner = self.descend(Self::read_type)?;
        Ok(ty(inner))
    }

    fn read_type(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'B' => self.demangle_builtin_type(),
            'a' => self.demangle_declaration_name(Kind::TypeAlias),
            'b' => self.demangle_function_type(Kind::ObjCBlock),
            'c' => self.demangle_function_type(Kind::CFunctionPointer),
            'D' => Ok(Node::with_child(Kind::DynamicSelf, self.demangle_type()?)),
            'E' => {
                let tag = self.cursor.read_scalars(2)?;
                self.ensure(tag == "RR")?;
                Ok(Node::new(Kind::ErrorType))
            }
            'F' => self.demangle_function_type(Kind::FunctionType),
            'f' => self.demangle_function_type(Kind::UncurriedFunctionType),
            'G' => {
                let nominal = self.demangle_nominal_type()?;
                self.demangle_bound_generic_args(&nominal)
            }
            'X' => self.demangle_special_type(),
            'K' => self.demangle_function_type(Kind::AutoClosureType),
            'M' => Ok(Node::with_child(Kind::Metatype, self.demangle_type()?)),
            'P' if self.cursor.conditional('M') => {
                Ok(Node::with_child(Kind::ExistentialMetatype, self.demangle_type()?))
            }
            'P' => self.demangle_protocol_list(),
            'Q' => {
                if self.cursor.conditional('u') {
                    Ok(Node::new(Kind::OpaqueReturnType))
                } else if self.cursor.conditional('U') {
                    let index = self.demangle_index()?;
                    Ok(Node::with_child(
                        Kind::OpaqueReturnType,
                        Node::with_index(Kind::OpaqueReturnTypeIndex, index),
                    ))
                } else {
                    self.demangle_archetype()
                }
            }
            'q' => {
                let next = self.cursor.require_peek()?;
                if next == 'd' || next == '_' || next.is_ascii_digit() {
                    self.demangle_generic_param_index()
                } else {
                    let base = self.demangle_type()?;
                    self.demangle_dependent_member_type_name(base)
                }
            }
            'x' => Ok(dependent_generic_param(0, 0)),
            'w' => self.demangle_associated_type_simple(),
            'W' => self.demangle_associated_type_compound(),
            'R' => {
                let inner = self.demangle_type()?;
                Ok(Node::with_children(Kind::InOut, inner.children().iter().cloned()))
            }
            'S' => self.demangle_substitution_index(),
            'T' => self.demangle_tuple(false),
            't' => self.demangle_tuple(true),
            'u' => {
                let signature = self.demangle_generic_signature()?;
                let inner = self.demangle_type()?;
                Ok(Node::with_children(Kind::DependentGenericType, [signature, inner]))
            }
            'C' => self.demangle_declaration_name(Kind::Class),
            'V' => self.demangle_declaration_name(Kind::Structure),
            'O' => self.demangle_declaration_name(Kind::Enum),
            _ => Err(self.fail()),
        }
    }

    fn demangle_builtin_type(&mut self) -> DemangleResult<Node> {
        let name = match self.cursor.read_scalar()? {
            'b' => "Builtin.BridgeObject".to_owned(),
            'B' => "Builtin.UnsafeValueBuffer".to_owned(),
            'f' => format!("Builtin.FPIEEE{}", self.read_width()?),
            'i' => format!("Builtin.Int{}", self.read_width()?),
            'v' => {
                let elements = self.cursor.read_int()?;
                self.cursor.match_scalar('B')?;
                let element = match self.cursor.read_scalar()? {
                    'p' => "xRawPointer".to_owned(),
                    'i' => format!("xInt{}", self.read_width()?),
                    'f' => format!("xFPIEEE{}", self.read_width()?),
                    _ => return Err(self.fail()),
                };
                format!("Builtin.Vec{elements}{element}")
            }
            'O' => "Builtin.UnknownObject".to_owned(),
            'o' => "Builtin.NativeObject".to_owned(),
            't' => "Builtin.SILToken".to_owned(),
            'p' => "Builtin.RawPointer".to_owned(),
            'w' => "Builtin.Word".to_owned(),
            _ => return Err(self.fail()),
        };
        Ok(Node::with_text(Kind::BuiltinTypeName, name))
    }

    /// `<n>_`
    fn read_width(&mut self) -> DemangleResult<u64> {
        let width = self.cursor.read_int()?;
        self.cursor.match_scalar('_')?;
        Ok(width)
    }

    fn demangle_function_type(&mut self, kind: Kind) -> DemangleResult<Node> {
        let mut children = Vec::with_capacity(3);
        if self.cursor.conditional('z') {
            children.push(Node::new(Kind::ThrowsAnnotation));
        }
        children.push(Node::with_child(Kind::ArgumentTuple, self.demangle_type()?));
        children.push(Node::with_child(Kind::ReturnType, self.demangle_type()?));
        Ok(Node::with_children(kind, children))
    }

    /// Protocols up to `_`.
    fn demangle_protocol_list(&mut self) -> DemangleResult<Node> {
        let mut protocols = Vec::new();
        while !self.cursor.conditional('_') {
            protocols.push(self.demangle_protocol_name()?);
        }
        Ok(Node::with_child(
            Kind::ProtocolList,
            Node::with_children(Kind::TypeList, protocols),
        ))
    }

    /// Elements up to `_`, each optionally named. A variadic tuple marks its
    /// last element.
    fn demangle_tuple(&mut self, variadic: bool) -> DemangleResult<Node> {
        let mut elements = Vec::new();
        while !self.cursor.conditional('_') {
            let mut children = Vec::with_capacity(2);
            let next = self.cursor.require_peek()?;
            if next.is_ascii_digit() || next == 'o' {
                children.push(self.demangle_identifier(Some(Kind::TupleElementName))?);
            }
            children.push(self.demangle_type()?);
            elements.push(Node::with_children(Kind::TupleElement, children));
        }
        if variadic {
            if let Some(last) = elements.last_mut() {
                last.insert_child(0, Node::new(Kind::VariadicMarker));
            }
        }
        Ok(Node::with_children(Kind::Tuple, elements))
    }

    // =========================================================================
    // Special Types
    // =========================================================================

    fn demangle_special_type(&mut self) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        match c {
            'b' => Ok(Node::with_child(Kind::SilBoxType, self.demangle_type()?)),
            'B' => self.demangle_sil_box_layout(),
            'P' if self.cursor.conditional('M') => {
                self.demangle_represented_metatype(Kind::ExistentialMetatype)
            }
            'M' => self.demangle_represented_metatype(Kind::Metatype),
            'P' => self.demangle_protocol_list(),
            'f' => self.demangle_function_type(Kind::ThinFunctionType),
            'o' => Ok(Node::with_child(Kind::Unowned, self.demangle_type()?)),
            'u' => Ok(Node::with_child(Kind::Unmanaged, self.demangle_type()?)),
            'w' => Ok(Node::with_child(Kind::Weak, self.demangle_type()?)),
            'F' => self.demangle_impl_function_type(),
            _ => Err(self.fail()),
        }
    }

    fn demangle_represented_metatype(&mut self, kind: Kind) -> DemangleResult<Node> {
        let representation = match self.cursor.read_scalar()? {
            't' => "@thick",
            'T' => "@thin",
            'o' => "@objc_metatype",
            _ => return Err(self.fail()),
        };
        let instance = self.demangle_type()?;
        Ok(Node::with_children(
            kind,
            [Node::with_text(Kind::MetatypeRepresentation, representation), instance],
        ))
    }

    /// `XB[G<signature>]` fields up to `_`, then generic arguments up to `_`
    /// when a signature was given.
    fn demangle_sil_box_layout(&mut self) -> DemangleResult<Node> {
        let signature = if self.cursor.conditional('G') {
            Some(self.demangle_generic_signature()?)
        } else {
            None
        };

        let mut fields = Vec::new();
        while !self.cursor.conditional('_') {
            let kind = match self.cursor.read_scalar()? {
                'm' => Kind::SilBoxMutableField,
                'i' => Kind::SilBoxImmutableField,
                _ => return Err(self.fail()),
            };
            fields.push(Node::with_child(kind, self.demangle_type()?));
        }

        let mut children = vec![Node::with_children(Kind::SilBoxLayout, fields)];
        if let Some(signature) = signature {
            let mut args = Vec::new();
            while !self.cursor.conditional('_') {
                args.push(self.demangle_type()?);
            }
            children.push(signature);
            children.push(Node::with_children(Kind::TypeList, args));
        }
        Ok(Node::with_children(Kind::SilBoxTypeWithLayout, children))
    }

    // =========================================================================
    // Impl Function Types
    // =========================================================================

    fn demangle_impl_function_type(&mut self) -> DemangleResult<Node> {
        let callee = self.demangle_impl_convention(Kind::ImplConvention)?;
        let mut children = vec![Node::with_text(Kind::ImplConvention, callee)];

        if self.cursor.conditional('C') {
            let attribute = match self.cursor.read_scalar()? {
                'b' => "@convention(block)",
                'c' => "@convention(c)",
                'm' => "@convention(method)",
                'O' => "@convention(objc_method)",
                'w' => "@convention(witness_method)",
                _ => return Err(self.fail()),
            };
            children.push(Node::with_text(Kind::ImplFunctionAttribute, attribute));
        }
        // `g` marks a pseudo-generic signature; both decode the same way.
        if self.cursor.conditional('G') || self.cursor.conditional('g') {
            children.push(self.demangle_generic_signature()?);
        }

        self.cursor.match_scalar('_')?;
        while !self.cursor.conditional('_') {
            children.push(self.demangle_impl_parameter_or_result(Kind::ImplParameter)?);
        }
        while !self.cursor.conditional('_') {
            children.push(self.demangle_impl_parameter_or_result(Kind::ImplResult)?);
        }
        Ok(Node::with_children(Kind::ImplFunctionType, children))
    }

    /// Convention letter, read in the slot `kind` names: the callee
    /// (`ImplConvention`), a parameter or a result.
    fn demangle_impl_convention(&mut self, kind: Kind) -> DemangleResult<&'static str> {
        let slot = if kind == Kind::ImplErrorResult {
            Kind::ImplResult
        } else {
            kind
        };
        Ok(match (self.cursor.read_scalar()?, slot) {
            ('a', Kind::ImplResult) => "@autoreleased",
            ('d', Kind::ImplConvention) => "@callee_unowned",
            ('d', _) => "@unowned",
            ('D', Kind::ImplResult) => "@unowned_inner_pointer",
            ('g', Kind::ImplParameter) => "@guaranteed",
            ('e', Kind::ImplParameter) => "@deallocating",
            ('g', Kind::ImplConvention) => "@callee_guaranteed",
            ('i', Kind::ImplParameter) => "@in",
            ('i', Kind::ImplResult) => "@out",
            ('l', Kind::ImplParameter) => "@inout",
            ('o', Kind::ImplConvention) => "@callee_owned",
            ('o', _) => "@owned",
            ('t', Kind::ImplConvention) => "@convention(thin)",
            _ => return Err(self.fail()),
        })
    }

    /// `[z]<convention><type>`. `z` marks the error result.
    fn demangle_impl_parameter_or_result(&mut self, kind: Kind) -> DemangleResult<Node> {
        let kind = if self.cursor.conditional('z') {
            self.ensure(kind == Kind::ImplResult)?;
            Kind::ImplErrorResult
        } else {
            kind
        };
        let convention = self.demangle_impl_convention(kind)?;
        let operand = self.demangle_type()?;
        Ok(Node::with_children(
            kind,
            [Node::with_text(Kind::ImplConvention, convention), operand],
        ))
    }

    // =========================================================================
    // Archetypes
    // =========================================================================

    /// `Q<archetype><ident>`, `S<subst><ident>` or `s<ident>`.
    fn demangle_archetype(&mut self) -> DemangleResult<Node> {
        let root = match self.cursor.read_scalar()? {
            'Q' => self.descend(Self::demangle_archetype)?,
            'S' => self.demangle_substitution_index()?,
            's' => Node::with_text(Kind::Module, STDLIB_MODULE),
            _ => return Err(self.fail()),
        };
        let name = self.demangle_identifier(None)?;
        let reference = Node::with_children(Kind::AssociatedTypeRef, [root, name]);
        self.push_substitution(reference.clone());
        Ok(reference)
    }

    // =========================================================================
    // Generics
    // =========================================================================

    /// Parameter counts up to `R` or `r`, then requirements between `R` and
    /// `r`. No counts at all means one parameter.
    pub(super) fn demangle_generic_signature(&mut self) -> DemangleResult<Node> {
        let mut children = Vec::new();
        while !matches!(self.cursor.require_peek()?, 'R' | 'r') {
            let count = if self.cursor.conditional('z') {
                0
            } else {
                let index = self.demangle_index()?;
                self.require(index.checked_add(1))?
            };
            children.push(Node::with_index(Kind::DependentGenericParamCount, count));
        }
        if children.is_empty() {
            children.push(Node::with_index(Kind::DependentGenericParamCount, 1));
        }
        if !self.cursor.conditional('r') {
            self.cursor.match_scalar('R')?;
            while !self.cursor.conditional('r') {
                children.push(self.demangle_generic_requirement()?);
            }
        }
        Ok(Node::with_children(Kind::DependentGenericSignature, children))
    }

    fn demangle_generic_requirement(&mut self) -> DemangleResult<Node> {
        let constrained = self.demangle_constrained_type()?;
        if self.cursor.conditional('z') {
            let same = self.demangle_type()?;
            return Ok(Node::with_children(
                Kind::DependentGenericSameTypeRequirement,
                [constrained, same],
            ));
        }
        if self.cursor.conditional('l') {
            return self.demangle_layout_requirement(constrained);
        }

        let constraint = match self.cursor.require_peek()? {
            'C' => self.demangle_type()?,
            'S' => {
                self.cursor.match_scalar('S')?;
                let substitution = self.demangle_substitution_index()?;
                let name = match substitution.kind() {
                    Kind::Protocol | Kind::Class => substitution,
                    Kind::Module => self.demangle_protocol_name_given_context(substitution)?,
                    _ => return Err(self.fail()),
                };
                ty(name)
            }
            _ => self.demangle_protocol_name()?,
        };
        Ok(Node::with_children(
            Kind::DependentGenericConformanceRequirement,
            [constrained, constraint],
        ))
    }

    /// `l<letter>[size[_alignment]]`.
    fn demangle_layout_requirement(&mut self, constrained: Node) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        let (has_size, has_alignment) = match c {
            'U' | 'R' | 'N' | 'T' => (false, false),
            'e' | 'm' => (true, false),
            'E' | 'M' => (true, true),
            _ => return Err(self.fail()),
        };
        let mut children = vec![constrained, Node::with_text(Kind::Identifier, c.to_string())];
        if has_size {
            let size = self.cursor.read_int()?;
            children.push(Node::with_index(Kind::Number, size));
            if has_alignment {
                self.cursor.match_scalar('_')?;
                let alignment = self.cursor.read_int()?;
                children.push(Node::with_index(Kind::Number, alignment));
            }
        }
        Ok(Node::with_children(Kind::DependentGenericLayoutRequirement, children))
    }

    fn demangle_constrained_type(&mut self) -> DemangleResult<Node> {
        if self.cursor.conditional('w') {
            self.demangle_associated_type_simple()
        } else if self.cursor.conditional('W') {
            self.demangle_associated_type_compound()
        } else {
            self.demangle_generic_param_index()
        }
    }

    fn demangle_associated_type_simple(&mut self) -> DemangleResult<Node> {
        let base = self.demangle_generic_param_index()?;
        self.demangle_dependent_member_type_name(ty(base))
    }

    /// A chain of member names off one generic parameter, ended by `_`.
    fn demangle_associated_type_compound(&mut self) -> DemangleResult<Node> {
        let mut base = self.demangle_generic_param_index()?;
        while !self.cursor.conditional('_') {
            base = self.demangle_dependent_member_type_name(ty(base))?;
        }
        Ok(base)
    }

    /// `x` is the first parameter, `d<depth><index>` any parameter, and a
    /// bare index a parameter at depth 0.
    fn demangle_generic_param_index(&mut self) -> DemangleResult<Node> {
        let (depth, index) = match self.cursor.read_scalar()? {
            'd' => {
                let depth = self.demangle_index()?;
                let depth = self.require(depth.checked_add(1))?;
                (depth, self.demangle_index()?)
            }
            'x' => (0, 0),
            _ => {
                self.cursor.backtrack(1)?;
                let index = self.demangle_index()?;
                (0, self.require(index.checked_add(1))?)
            }
        };
        Ok(dependent_generic_param(depth, index))
    }

    fn demangle_dependent_member_type_name(&mut self, base: Node) -> DemangleResult<Node> {
        let associated = if self.cursor.conditional('S') {
            self.demangle_substitution_index()?
        } else {
            let protocol = if self.cursor.conditional('P') {
                Some(self.demangle_protocol_name()?)
            } else {
                None
            };
            let name = self.demangle_identifier(None)?;
            let reference = Node::with_children(
                Kind::DependentAssociatedTypeRef,
                [name].into_iter().chain(protocol),
            );
            self.push_substitution(reference.clone());
            reference
        };
        Ok(Node::with_children(Kind::DependentMemberType, [base, associated]))
    }
}

//! `X`: function type flavors, ownership qualifiers, existentials, SIL
//! boxes and sugared types.

use sym_tree::{Kind, Node};

use super::{ty, type_with_child, type_with_children, DemangleResult, Demangler};

impl Demangler<'_> {
    pub(super) fn demangle_special_type(&mut self) -> DemangleResult<Node> {
        let special = self.cursor.read_scalar()?;
        match special {
            'E' => self.pop_function_type(Kind::NoEscapeFunctionType, false),
            'A' => self.pop_function_type(Kind::EscapingAutoClosureType, false),
            'f' => self.pop_function_type(Kind::ThinFunctionType, false),
            'K' => self.pop_function_type(Kind::AutoClosureType, false),
            'U' => self.pop_function_type(Kind::UncurriedFunctionType, false),
            'L' => self.pop_function_type(Kind::EscapingObjCBlock, false),
            'B' => self.pop_function_type(Kind::ObjCBlock, false),
            'C' => self.pop_function_type(Kind::CFunctionPointer, false),
            'z' => match self.cursor.read_scalar()? {
                'B' => self.pop_function_type(Kind::ObjCBlock, true),
                'C' => self.pop_function_type(Kind::CFunctionPointer, true),
                _ => Err(self.fail()),
            },
            'g' | 'G' => self.demangle_extended_existential_shape(special == 'G'),
            'j' => self.demangle_symbolic_extended_existential(),
            'o' => Ok(type_with_child(Kind::Unowned, self.pop_type()?)),
            'u' => Ok(type_with_child(Kind::Unmanaged, self.pop_type()?)),
            'w' => Ok(type_with_child(Kind::Weak, self.pop_type()?)),
            'b' => Ok(type_with_child(Kind::SilBoxType, self.pop_type()?)),
            'D' => Ok(type_with_child(Kind::DynamicSelf, self.pop_type()?)),
            'M' => {
                let representation = self.demangle_metatype_representation()?;
                let instance = self.pop_type()?;
                Ok(type_with_children(Kind::Metatype, [representation, instance]))
            }
            'm' => {
                let representation = self.demangle_metatype_representation()?;
                let instance = self.pop_type()?;
                Ok(type_with_children(Kind::ExistentialMetatype, [representation, instance]))
            }
            'P' => {
                let requirements = self.demangle_constrained_existential_requirement_list()?;
                let base = self.pop_type()?;
                Ok(type_with_children(Kind::ConstrainedExistential, [base, requirements]))
            }
            'p' => Ok(type_with_child(Kind::ExistentialMetatype, self.pop_type()?)),
            'c' => {
                let superclass = self.pop_type()?;
                let protocols = self.demangle_protocol_list()?;
                Ok(type_with_children(Kind::ProtocolListWithClass, [protocols, superclass]))
            }
            'l' => Ok(type_with_child(
                Kind::ProtocolListWithAnyObject,
                self.demangle_protocol_list()?,
            )),
            'X' | 'x' => self.demangle_sil_box(special == 'X'),
            'Y' => self.demangle_any_generic_type(Kind::OtherNominalType),
            'Z' => {
                let types = self.pop_type_list()?;
                let name = self.pop_required_kind(Kind::Identifier)?;
                let parent = self.pop_context()?;
                Ok(Node::with_children(Kind::AnonymousContext, [name, parent, types]))
            }
            'e' => Ok(ty(Node::new(Kind::ErrorType))),
            'S' => self.demangle_sugared_type(),
            _ => Err(self.fail()),
        }
    }

    fn demangle_sugared_type(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'q' => Ok(ty(Node::new(Kind::SugaredOptional))),
            'a' => Ok(ty(Node::new(Kind::SugaredArray))),
            'D' => {
                let value = self.pop_type()?;
                let key = self.pop_type()?;
                Ok(type_with_children(Kind::SugaredDictionary, [key, value]))
            }
            'p' => Ok(ty(Node::new(Kind::SugaredParen))),
            'A' => {
                let element = self.pop_type()?;
                let count = self.pop_type()?;
                Ok(type_with_children(Kind::SugaredInlineArray, [count, element]))
            }
            _ => Err(self.fail()),
        }
    }

    /// `Xx`/`XX`: a SIL box with its field layout. `XX` adds a generic
    /// signature and its arguments.
    fn demangle_sil_box(&mut self, is_generic: bool) -> DemangleResult<Node> {
        let generic = if is_generic {
            let signature = self.pop_required_kind(Kind::DependentGenericSignature)?;
            let args = self.pop_type_list()?;
            Some((signature, args))
        } else {
            None
        };

        let field_types = self.pop_type_list()?;
        let mut fields = Vec::with_capacity(field_types.num_children());
        for field_type in field_types.children() {
            self.ensure(field_type.kind() == Kind::Type)?;
            let field = match field_type.first_child() {
                Some(inout) if inout.kind() == Kind::InOut => {
                    let inner = self.require(inout.first_child().cloned())?;
                    Node::with_child(Kind::SilBoxMutableField, ty(inner))
                }
                _ => Node::with_child(Kind::SilBoxImmutableField, field_type.clone()),
            };
            fields.push(field);
        }

        let mut children = vec![Node::with_children(Kind::SilBoxLayout, fields)];
        if let Some((signature, args)) = generic {
            children.push(signature);
            children.push(args);
        }
        Ok(type_with_children(Kind::SilBoxTypeWithLayout, children))
    }

    fn demangle_extended_existential_shape(&mut self, has_signature: bool) -> DemangleResult<Node> {
        let shape_type = self.pop_type()?;
        let signature = if has_signature {
            self.pop_kind(Kind::DependentGenericSignature)
        } else {
            None
        };
        let children = signature.into_iter().chain([shape_type]);
        Ok(Node::with_children(Kind::ExtendedExistentialTypeShape, children))
    }

    /// `Xj`: generic arguments applied to a shape given by symbolic reference.
    fn demangle_symbolic_extended_existential(&mut self) -> DemangleResult<Node> {
        let retroactive = self.pop_retroactive_conformances();
        let mut args = Vec::new();
        while let Some(arg) = self.pop_kind(Kind::Type) {
            args.push(arg);
        }
        args.reverse();
        let shape = self.pop_required_if(|k| {
            matches!(
                k,
                Kind::UniqueExtendedExistentialTypeShapeSymbolicReference
                    | Kind::NonUniqueExtendedExistentialTypeShapeSymbolicReference
            )
        })?;
        let children = [shape, Node::with_children(Kind::TypeList, args)]
            .into_iter()
            .chain(retroactive);
        Ok(type_with_children(Kind::SymbolicExtendedExistentialType, children))
    }

    fn demangle_metatype_representation(&mut self) -> DemangleResult<Node> {
        let representation = match self.cursor.read_scalar()? {
            't' => "@thin",
            'T' => "@thick",
            'o' => "@objc_metatype",
            _ => return Err(self.fail()),
        };
        Ok(Node::with_text(Kind::MetatypeRepresentation, representation))
    }
}

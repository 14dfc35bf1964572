//! `W` witness tables and outlined value operations, `M` metadata symbols.

use sym_tree::{predicates, Kind, Node};

use super::{DemangleResult, Demangler};
use crate::resolver::Directness;

impl Demangler<'_> {
    /// `W`: witness tables, field offsets, outlined operations and
    /// global-once tokens.
    pub(super) fn demangle_witness(&mut self) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        let (kind, operand) = match c {
            'C' => (Kind::EnumCase, self.pop_required_if(predicates::is_entity)?),
            'V' => (Kind::ValueWitnessTable, self.pop_type()?),
            'v' => {
                let directness = match self.cursor.read_scalar()? {
                    'd' => Directness::Direct,
                    'i' => Directness::Indirect,
                    _ => return Err(self.fail()),
                };
                let field = self.pop_required_if(predicates::is_entity)?;
                return Ok(Node::with_children(
                    Kind::FieldOffset,
                    [Node::with_index(Kind::Directness, directness.index()), field],
                ));
            }
            'S' => (Kind::ProtocolSelfConformanceWitnessTable, self.pop_protocol()?),
            'P' => (Kind::ProtocolWitnessTable, self.pop_protocol_conformance()?),
            'p' => (Kind::ProtocolWitnessTablePattern, self.pop_protocol_conformance()?),
            'G' => (Kind::GenericProtocolWitnessTable, self.pop_protocol_conformance()?),
            'I' => (
                Kind::GenericProtocolWitnessTableInstantiationFunction,
                self.pop_protocol_conformance()?,
            ),
            'r' => (Kind::ResilientProtocolWitnessTable, self.pop_protocol_conformance()?),
            'a' => (Kind::ProtocolWitnessTableAccessor, self.pop_protocol_conformance()?),
            'l' | 'L' => {
                let conformance = self.pop_protocol_conformance()?;
                let conforming = self.pop_type()?;
                let kind = if c == 'l' {
                    Kind::LazyProtocolWitnessTableAccessor
                } else {
                    Kind::LazyProtocolWitnessTableCacheVariable
                };
                return Ok(Node::with_children(kind, [conforming, conformance]));
            }
            't' => {
                let name = self.pop_decl_name()?;
                let conformance = self.pop_protocol_conformance()?;
                return Ok(Node::with_children(
                    Kind::AssociatedTypeMetadataAccessor,
                    [conformance, name],
                ));
            }
            'T' => {
                let protocol = self.pop_type()?;
                let path = self.pop_associated_type_path()?;
                let conformance = self.pop_protocol_conformance()?;
                return Ok(Node::with_children(
                    Kind::AssociatedTypeWitnessTableAccessor,
                    [conformance, path, protocol],
                ));
            }
            'b' => {
                let protocol = self.pop_type()?;
                let conformance = self.pop_protocol_conformance()?;
                return Ok(Node::with_children(
                    Kind::BaseWitnessTableAccessor,
                    [conformance, protocol],
                ));
            }
            'O' => return self.demangle_outlined_operation(),
            'Z' | 'z' => {
                let mut names = Vec::new();
                while self.pop_kind(Kind::FirstElementMarker).is_some() {
                    names.push(self.pop_decl_name()?);
                }
                let context = self.pop_context()?;
                let kind = if c == 'Z' {
                    Kind::GlobalVariableOnceFunction
                } else {
                    Kind::GlobalVariableOnceToken
                };
                return Ok(Node::with_children(
                    kind,
                    [context, Node::with_children(Kind::GlobalVariableOnceDeclList, names)],
                ));
            }
            'J' => return self.demangle_differentiability_witness(),
            _ => return Err(self.fail()),
        };
        Ok(Node::with_child(kind, operand))
    }

    /// `WO`: outlined copies, destroys and enum operations on a type.
    fn demangle_outlined_operation(&mut self) -> DemangleResult<Node> {
        let signature = self.pop_kind(Kind::DependentGenericSignature);
        let operand = self.pop_type()?;
        let mut children: Vec<Node> = [operand].into_iter().chain(signature).collect();
        let kind = match self.cursor.read_scalar()? {
            'B' => Kind::OutlinedInitializeWithTakeNoValueWitness,
            'C' => Kind::OutlinedInitializeWithCopyNoValueWitness,
            'D' => Kind::OutlinedAssignWithTakeNoValueWitness,
            'F' => Kind::OutlinedAssignWithCopyNoValueWitness,
            'H' => Kind::OutlinedDestroyNoValueWitness,
            'y' => Kind::OutlinedCopy,
            'e' => Kind::OutlinedConsume,
            'r' => Kind::OutlinedRetain,
            's' => Kind::OutlinedRelease,
            'b' => Kind::OutlinedInitializeWithTake,
            'c' => Kind::OutlinedInitializeWithCopy,
            'd' => Kind::OutlinedAssignWithTake,
            'f' => Kind::OutlinedAssignWithCopy,
            'h' => Kind::OutlinedDestroy,
            'g' => Kind::OutlinedEnumGetTag,
            'i' => {
                children.push(self.demangle_index_as_name()?);
                Kind::OutlinedEnumTagStore
            }
            'j' => {
                children.push(self.demangle_index_as_name()?);
                Kind::OutlinedEnumProjectDataForLoad
            }
            _ => return Err(self.fail()),
        };
        Ok(Node::with_children(kind, children))
    }

    /// `M`: type metadata, descriptors, caches and accessors.
    pub(super) fn demangle_metatype(&mut self) -> DemangleResult<Node> {
        let (kind, operand) = match self.cursor.read_scalar()? {
            'a' => (Kind::TypeMetadataAccessFunction, self.pop_type()?),
            'A' => (
                Kind::ReflectionMetadataAssocTypeDescriptor,
                self.pop_protocol_conformance()?,
            ),
            'b' => (
                Kind::CanonicalSpecializedGenericTypeMetadataAccessFunction,
                self.pop_type()?,
            ),
            'B' => (Kind::ReflectionMetadataBuiltinDescriptor, self.pop_type()?),
            'c' => (Kind::ProtocolConformanceDescriptor, self.pop_protocol_conformance()?),
            'C' => (
                Kind::ReflectionMetadataSuperclassDescriptor,
                self.pop_type_and_get_any_generic()?,
            ),
            'D' | 'd' => (Kind::TypeMetadataDemanglingCache, self.pop_type()?),
            'R' => (Kind::TypeMetadataMangledNameRef, self.pop_type()?),
            'f' => (Kind::FullTypeMetadata, self.pop_type()?),
            'F' => (Kind::ReflectionMetadataFieldDescriptor, self.pop_type()?),
            'g' => (Kind::OpaqueTypeDescriptorAccessor, self.pop_required()?),
            'h' => (Kind::OpaqueTypeDescriptorAccessorImpl, self.pop_required()?),
            'i' => (Kind::TypeMetadataInstantiationFunction, self.pop_type()?),
            'I' => (Kind::TypeMetadataInstantiationCache, self.pop_type()?),
            'j' => (Kind::OpaqueTypeDescriptorAccessorKey, self.pop_required()?),
            'J' => (
                Kind::NoncanonicalSpecializedGenericTypeMetadataCache,
                self.pop_required()?,
            ),
            'k' => (Kind::OpaqueTypeDescriptorAccessorVar, self.pop_required()?),
            'K' => (Kind::MetadataInstantiationCache, self.pop_required()?),
            'l' => (Kind::TypeMetadataSingletonInitializationCache, self.pop_type()?),
            'L' => (Kind::TypeMetadataLazyCache, self.pop_type()?),
            'm' => (Kind::Metaclass, self.pop_type()?),
            'M' => (Kind::CanonicalSpecializedGenericMetaclass, self.pop_type()?),
            'n' => (Kind::NominalTypeDescriptor, self.pop_type()?),
            'N' => (Kind::NoncanonicalSpecializedGenericTypeMetadata, self.pop_type()?),
            'o' => (Kind::ClassMetadataBaseOffset, self.pop_type()?),
            'p' => (Kind::ProtocolDescriptor, self.pop_protocol()?),
            'P' => (Kind::GenericTypeMetadataPattern, self.pop_type()?),
            'q' => (Kind::Uniquable, self.pop_required()?),
            'Q' => (Kind::OpaqueTypeDescriptor, self.pop_required()?),
            'r' => (Kind::TypeMetadataCompletionFunction, self.pop_type()?),
            's' => (Kind::ObjCResilientClassStub, self.pop_type()?),
            'S' => (Kind::ProtocolSelfConformanceDescriptor, self.pop_protocol()?),
            't' => (Kind::FullObjCResilientClassStub, self.pop_type()?),
            'u' => (Kind::MethodLookupFunction, self.pop_type()?),
            'U' => (Kind::ObjCMetadataUpdateFunction, self.pop_type()?),
            'V' => (Kind::PropertyDescriptor, self.pop_required_if(predicates::is_entity)?),
            'X' => return self.demangle_private_context_descriptor(),
            'z' => (
                Kind::CanonicalPrespecializedGenericTypeCachingOnceToken,
                self.pop_type()?,
            ),
            _ => return Err(self.fail()),
        };
        Ok(Node::with_child(kind, operand))
    }

    /// `MX`: descriptors of contexts that have no public name.
    fn demangle_private_context_descriptor(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'E' => Ok(Node::with_child(Kind::ExtensionDescriptor, self.pop_context()?)),
            'M' => {
                let module = self.pop_module();
                Ok(Node::with_child(Kind::ModuleDescriptor, self.require(module)?))
            }
            'Y' => {
                let discriminator = self.pop_required()?;
                let context = self.pop_context()?;
                Ok(Node::with_children(Kind::AnonymousDescriptor, [context, discriminator]))
            }
            'X' => Ok(Node::with_child(Kind::AnonymousDescriptor, self.pop_context()?)),
            'A' => {
                let path = self.pop_associated_type_path()?;
                let base = self.pop_type()?;
                Ok(Node::with_children(Kind::AssociatedTypeGenericParamRef, [base, path]))
            }
            _ => Err(self.fail()),
        }
    }
}

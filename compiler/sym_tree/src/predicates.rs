//! Kind predicates.
//!
//! These decide which already-built nodes a production may pop off the
//! name stack, so they are part of the grammar. Each one lists the kinds
//! it accepts and rejects everything else, so a new kind is refused until
//! it is added here.

use crate::Kind;

/// Nodes that can stand as the name of a declaration.
pub fn is_decl_name(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Identifier
            | Kind::LocalDeclName
            | Kind::PrivateDeclName
            | Kind::RelatedEntityDeclName
            | Kind::PrefixOperator
            | Kind::PostfixOperator
            | Kind::InfixOperator
            | Kind::TypeSymbolicReference
            | Kind::ProtocolSymbolicReference
            | Kind::ObjectiveCProtocolSymbolicReference
    )
}

/// Nodes that can enclose another declaration.
pub fn is_context(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Allocator
            | Kind::AnonymousContext
            | Kind::AutoDiffFunction
            | Kind::Class
            | Kind::Constructor
            | Kind::CurryThunk
            | Kind::Deallocator
            | Kind::DefaultArgumentInitializer
            | Kind::Destructor
            | Kind::DidSet
            | Kind::DispatchThunk
            | Kind::Enum
            | Kind::ExplicitClosure
            | Kind::Extension
            | Kind::Function
            | Kind::Getter
            | Kind::GlobalGetter
            | Kind::IVarInitializer
            | Kind::IVarDestroyer
            | Kind::ImplicitClosure
            | Kind::Initializer
            | Kind::InitAccessor
            | Kind::IsolatedDeallocator
            | Kind::MaterializeForSet
            | Kind::ModifyAccessor
            | Kind::Modify2Accessor
            | Kind::Module
            | Kind::NativeOwningAddressor
            | Kind::NativeOwningMutableAddressor
            | Kind::NativePinningAddressor
            | Kind::NativePinningMutableAddressor
            | Kind::OpaqueReturnTypeOf
            | Kind::OtherNominalType
            | Kind::OwningAddressor
            | Kind::OwningMutableAddressor
            | Kind::PropertyWrapperBackingInitializer
            | Kind::PropertyWrapperInitFromProjectedValue
            | Kind::Protocol
            | Kind::ProtocolSymbolicReference
            | Kind::ReadAccessor
            | Kind::Read2Accessor
            | Kind::Setter
            | Kind::Static
            | Kind::Structure
            | Kind::Subscript
            | Kind::TypeSymbolicReference
            | Kind::TypeAlias
            | Kind::UnsafeAddressor
            | Kind::UnsafeMutableAddressor
            | Kind::Variable
            | Kind::WillSet
    )
}

/// Nominal declarations that can carry generic arguments.
pub fn is_any_generic(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Structure
            | Kind::Class
            | Kind::Enum
            | Kind::Protocol
            | Kind::ProtocolSymbolicReference
            | Kind::OtherNominalType
            | Kind::TypeAlias
            | Kind::TypeSymbolicReference
            | Kind::ObjectiveCProtocolSymbolicReference
    )
}

/// A type or any context.
pub fn is_entity(kind: Kind) -> bool {
    kind == Kind::Type || is_context(kind)
}

/// Entries of a generic signature after the parameter counts.
pub fn is_requirement(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::DependentGenericParamPackMarker
            | Kind::DependentGenericParamValueMarker
            | Kind::DependentGenericSameTypeRequirement
            | Kind::DependentGenericSameShapeRequirement
            | Kind::DependentGenericLayoutRequirement
            | Kind::DependentGenericConformanceRequirement
            | Kind::DependentGenericInverseConformanceRequirement
    )
}

/// Attributes that wrap the global they precede.
pub fn is_function_attr(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::FunctionSignatureSpecialization
            | Kind::GenericSpecialization
            | Kind::GenericSpecializationPrespecialized
            | Kind::InlinedGenericFunction
            | Kind::GenericSpecializationNotReAbstracted
            | Kind::GenericPartialSpecialization
            | Kind::GenericPartialSpecializationNotReAbstracted
            | Kind::GenericSpecializationInResilienceDomain
            | Kind::ObjCAttribute
            | Kind::NonObjCAttribute
            | Kind::DynamicAttribute
            | Kind::DirectMethodReferenceAttribute
            | Kind::VTableAttribute
            | Kind::PartialApplyForwarder
            | Kind::PartialApplyObjCForwarder
            | Kind::OutlinedVariable
            | Kind::OutlinedReadOnlyObject
            | Kind::OutlinedBridgedMethod
            | Kind::MergedFunction
            | Kind::DistributedThunk
            | Kind::DistributedAccessor
            | Kind::DynamicallyReplaceableFunctionImpl
            | Kind::DynamicallyReplaceableFunctionKey
            | Kind::DynamicallyReplaceableFunctionVar
            | Kind::AsyncFunctionPointer
            | Kind::AsyncAwaitResumePartialFunction
            | Kind::AsyncSuspendResumePartialFunction
            | Kind::AccessibleFunctionRecord
            | Kind::BackDeploymentThunk
            | Kind::BackDeploymentFallback
            | Kind::HasSymbolQuery
    )
}

pub fn is_macro_expansion(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::AccessorAttachedMacroExpansion
            | Kind::MemberAttributeAttachedMacroExpansion
            | Kind::FreestandingMacroExpansion
            | Kind::MemberAttachedMacroExpansion
            | Kind::PeerAttachedMacroExpansion
            | Kind::ConformanceAttachedMacroExpansion
            | Kind::ExtensionAttachedMacroExpansion
            | Kind::MacroExpansionLoc
    )
}

pub fn is_existential_type(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::ExistentialMetatype
            | Kind::ProtocolList
            | Kind::ProtocolListWithClass
            | Kind::ProtocolListWithAnyObject
    )
}

/// Kinds that name a protocol directly.
pub fn is_protocol_kind(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Protocol | Kind::ProtocolSymbolicReference | Kind::ObjectiveCProtocolSymbolicReference
    )
}

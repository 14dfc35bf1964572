//! The closed set of symbol node kinds.
//!
//! Kinds are named after the declaration or type construct they describe.
//! The display form is the variant name itself (`BoundGenericStructure`,
//! `DependentGenericParamType`), which is also what the tree dump prints.

use std::fmt;

/// Defines [`Kind`] together with its name table.
///
/// Each generated kind has:
/// - a unit variant
/// - an entry in `Kind::ALL` (declaration order)
/// - a `name()` string equal to the variant identifier
macro_rules! define_kinds {
    ($($name:ident),* $(,)?) => {
        /// Tag of a symbol node.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Kind {
            $($name,)*
        }

        impl Kind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [Kind] = &[$(Kind::$name,)*];

            /// Variant name, as printed in tree dumps.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Kind::$name => stringify!($name),)*
                }
            }
        }
    };
}

define_kinds!(
    AccessibleFunctionRecord,
    AccessorAttachedMacroExpansion,
    AccessorFunctionReference,
    Allocator,
    AnonymousContext,
    AnonymousDescriptor,
    AnyProtocolConformanceList,
    ArgumentTuple,
    AssocTypePath,
    AssociatedConformanceDescriptor,
    AssociatedType,
    AssociatedTypeDescriptor,
    AssociatedTypeGenericParamRef,
    AssociatedTypeMetadataAccessor,
    AssociatedTypeRef,
    AssociatedTypeWitnessTableAccessor,
    AsyncAnnotation,
    AsyncAwaitResumePartialFunction,
    AsyncFunctionPointer,
    AsyncRemoved,
    AsyncSuspendResumePartialFunction,
    AutoClosureType,
    AutoDiffDerivativeVTableThunk,
    AutoDiffFunction,
    AutoDiffFunctionKind,
    AutoDiffSelfReorderingReabstractionThunk,
    AutoDiffSubsetParametersThunk,
    BackDeploymentFallback,
    BackDeploymentThunk,
    BaseConformanceDescriptor,
    BaseWitnessTableAccessor,
    BodyAttachedMacroExpansion,
    BoundGenericClass,
    BoundGenericEnum,
    BoundGenericFunction,
    BoundGenericOtherNominalType,
    BoundGenericProtocol,
    BoundGenericStructure,
    BoundGenericTypeAlias,
    BuiltinFixedArray,
    BuiltinTupleType,
    BuiltinTypeName,
    CFunctionPointer,
    CanonicalPrespecializedGenericTypeCachingOnceToken,
    CanonicalSpecializedGenericMetaclass,
    CanonicalSpecializedGenericTypeMetadataAccessFunction,
    ClangType,
    Class,
    ClassMetadataBaseOffset,
    CompileTimeConst,
    CompileTimeLiteral,
    ConcreteProtocolConformance,
    ConcurrentFunctionType,
    ConformanceAttachedMacroExpansion,
    ConstValue,
    ConstrainedExistential,
    ConstrainedExistentialRequirementList,
    ConstrainedExistentialSelf,
    Constructor,
    CoroFunctionPointer,
    CoroutineContinuationPrototype,
    CurryThunk,
    Deallocator,
    DeclContext,
    DefaultArgumentInitializer,
    DefaultAssociatedConformanceAccessor,
    DefaultAssociatedTypeMetadataAccessor,
    DefaultOverride,
    DependentAssociatedConformance,
    DependentAssociatedTypeRef,
    DependentGenericConformanceRequirement,
    DependentGenericInverseConformanceRequirement,
    DependentGenericLayoutRequirement,
    DependentGenericParamCount,
    DependentGenericParamPackMarker,
    DependentGenericParamType,
    DependentGenericParamValueMarker,
    DependentGenericSameShapeRequirement,
    DependentGenericSameTypeRequirement,
    DependentGenericSignature,
    DependentGenericType,
    DependentMemberType,
    DependentProtocolConformanceAssociated,
    DependentProtocolConformanceInherited,
    DependentProtocolConformanceOpaque,
    DependentProtocolConformanceRoot,
    DependentPseudogenericSignature,
    Destructor,
    DidSet,
    DifferentiabilityWitness,
    DifferentiableFunctionType,
    DirectMethodReferenceAttribute,
    Directness,
    DispatchThunk,
    DistributedAccessor,
    DistributedThunk,
    DroppedArgument,
    DynamicAttribute,
    DynamicSelf,
    DynamicallyReplaceableFunctionImpl,
    DynamicallyReplaceableFunctionKey,
    DynamicallyReplaceableFunctionVar,
    EmptyList,
    Enum,
    EnumCase,
    ErrorType,
    EscapingAutoClosureType,
    EscapingObjCBlock,
    ExistentialMetatype,
    ExplicitClosure,
    ExtendedExistentialTypeShape,
    Extension,
    ExtensionAttachedMacroExpansion,
    ExtensionDescriptor,
    FieldOffset,
    FirstElementMarker,
    FreestandingMacroExpansion,
    FullObjCResilientClassStub,
    FullTypeMetadata,
    Function,
    FunctionSignatureSpecialization,
    FunctionSignatureSpecializationParam,
    FunctionSignatureSpecializationParamKind,
    FunctionSignatureSpecializationParamPayload,
    FunctionSignatureSpecializationReturn,
    FunctionType,
    GenericPartialSpecialization,
    GenericPartialSpecializationNotReAbstracted,
    GenericProtocolWitnessTable,
    GenericProtocolWitnessTableInstantiationFunction,
    GenericSpecialization,
    GenericSpecializationInResilienceDomain,
    GenericSpecializationNotReAbstracted,
    GenericSpecializationParam,
    GenericSpecializationPrespecialized,
    GenericTypeMetadataPattern,
    GenericTypeParamDecl,
    Getter,
    Global,
    GlobalActorFunctionType,
    GlobalGetter,
    GlobalVariableOnceDeclList,
    GlobalVariableOnceFunction,
    GlobalVariableOnceToken,
    HasSymbolQuery,
    IVarDestroyer,
    IVarInitializer,
    Identifier,
    ImplConvention,
    ImplCoroutineKind,
    ImplDifferentiabilityKind,
    ImplErasedIsolation,
    ImplErrorResult,
    ImplEscaping,
    ImplFunctionAttribute,
    ImplFunctionConvention,
    ImplFunctionConventionName,
    ImplFunctionType,
    ImplInvocationSubstitutions,
    ImplParameter,
    ImplParameterImplicitLeading,
    ImplParameterIsolated,
    ImplParameterResultDifferentiability,
    ImplParameterSending,
    ImplPatternSubstitutions,
    ImplResult,
    ImplSendingResult,
    ImplYield,
    ImplicitClosure,
    InOut,
    Index,
    IndexSubset,
    InfixOperator,
    InitAccessor,
    Initializer,
    InlinedGenericFunction,
    Integer,
    IsSerialized,
    Isolated,
    IsolatedAnyFunctionType,
    IsolatedDeallocator,
    KeyPathAppliedMethodThunkHelper,
    KeyPathEqualsThunkHelper,
    KeyPathGetterThunkHelper,
    KeyPathHashThunkHelper,
    KeyPathSetterThunkHelper,
    KeyPathUnappliedMethodThunkHelper,
    LabelList,
    LazyProtocolWitnessTableAccessor,
    LazyProtocolWitnessTableCacheVariable,
    LocalDeclName,
    Macro,
    MacroExpansionLoc,
    MacroExpansionUniqueName,
    MaterializeForSet,
    MemberAttachedMacroExpansion,
    MemberAttributeAttachedMacroExpansion,
    MergedFunction,
    Metaclass,
    MetadataInstantiationCache,
    Metatype,
    MetatypeRepresentation,
    MethodDescriptor,
    MethodLookupFunction,
    Modify2Accessor,
    ModifyAccessor,
    Module,
    ModuleDescriptor,
    NativeOwningAddressor,
    NativeOwningMutableAddressor,
    NativePinningAddressor,
    NativePinningMutableAddressor,
    NegativeInteger,
    NoDerivative,
    NoEscapeFunctionType,
    NominalTypeDescriptor,
    NominalTypeDescriptorRecord,
    NonIsolatedCallerFunctionType,
    NonObjCAttribute,
    NonUniqueExtendedExistentialTypeShapeSymbolicReference,
    NoncanonicalSpecializedGenericTypeMetadata,
    NoncanonicalSpecializedGenericTypeMetadataCache,
    Number,
    ObjCAsyncCompletionHandlerImpl,
    ObjCAttribute,
    ObjCBlock,
    ObjCMetadataUpdateFunction,
    ObjCResilientClassStub,
    ObjectiveCProtocolSymbolicReference,
    OpaqueReturnType,
    OpaqueReturnTypeIndex,
    OpaqueReturnTypeOf,
    OpaqueReturnTypeParent,
    OpaqueType,
    OpaqueTypeDescriptor,
    OpaqueTypeDescriptorAccessor,
    OpaqueTypeDescriptorAccessorImpl,
    OpaqueTypeDescriptorAccessorKey,
    OpaqueTypeDescriptorAccessorVar,
    OpaqueTypeDescriptorRecord,
    OpaqueTypeDescriptorSymbolicReference,
    OtherNominalType,
    OutlinedAssignWithCopy,
    OutlinedAssignWithCopyNoValueWitness,
    OutlinedAssignWithTake,
    OutlinedAssignWithTakeNoValueWitness,
    OutlinedBridgedMethod,
    OutlinedConsume,
    OutlinedCopy,
    OutlinedDestroy,
    OutlinedDestroyNoValueWitness,
    OutlinedEnumGetTag,
    OutlinedEnumProjectDataForLoad,
    OutlinedEnumTagStore,
    OutlinedInitializeWithCopy,
    OutlinedInitializeWithCopyNoValueWitness,
    OutlinedInitializeWithTake,
    OutlinedInitializeWithTakeNoValueWitness,
    OutlinedReadOnlyObject,
    OutlinedRelease,
    OutlinedRetain,
    OutlinedVariable,
    Owned,
    OwningAddressor,
    OwningMutableAddressor,
    Pack,
    PackElement,
    PackElementLevel,
    PackExpansion,
    PackProtocolConformance,
    PartialApplyForwarder,
    PartialApplyObjCForwarder,
    PeerAttachedMacroExpansion,
    PostfixOperator,
    PredefinedObjCAsyncCompletionHandlerImpl,
    PrefixOperator,
    PrivateDeclName,
    PropertyDescriptor,
    PropertyWrapperBackingInitializer,
    PropertyWrapperInitFromProjectedValue,
    Protocol,
    ProtocolConformance,
    ProtocolConformanceDescriptor,
    ProtocolConformanceDescriptorRecord,
    ProtocolConformanceRefInOtherModule,
    ProtocolConformanceRefInProtocolModule,
    ProtocolConformanceRefInTypeModule,
    ProtocolDescriptor,
    ProtocolDescriptorRecord,
    ProtocolList,
    ProtocolListWithAnyObject,
    ProtocolListWithClass,
    ProtocolRequirementsBaseDescriptor,
    ProtocolSelfConformanceDescriptor,
    ProtocolSelfConformanceWitness,
    ProtocolSelfConformanceWitnessTable,
    ProtocolSymbolicReference,
    ProtocolWitness,
    ProtocolWitnessTable,
    ProtocolWitnessTableAccessor,
    ProtocolWitnessTablePattern,
    ReabstractionThunk,
    ReabstractionThunkHelper,
    ReabstractionThunkHelperWithGlobalActor,
    ReabstractionThunkHelperWithSelf,
    Read2Accessor,
    ReadAccessor,
    ReflectionMetadataAssocTypeDescriptor,
    ReflectionMetadataBuiltinDescriptor,
    ReflectionMetadataFieldDescriptor,
    ReflectionMetadataSuperclassDescriptor,
    RelatedEntityDeclName,
    ResilientProtocolWitnessTable,
    RetroactiveConformance,
    ReturnType,
    Sending,
    SendingResultFunctionType,
    Setter,
    Shared,
    SilBoxImmutableField,
    SilBoxLayout,
    SilBoxMutableField,
    SilBoxType,
    SilBoxTypeWithLayout,
    SilPackDirect,
    SilPackIndirect,
    SilThunkHopToMainActorIfNeeded,
    SilThunkIdentity,
    SpecializationPassID,
    Static,
    Structure,
    Subscript,
    Suffix,
    SugaredArray,
    SugaredDictionary,
    SugaredInlineArray,
    SugaredOptional,
    SugaredParen,
    SymbolicExtendedExistentialType,
    ThinFunctionType,
    ThrowsAnnotation,
    Tuple,
    TupleElement,
    TupleElementName,
    Type,
    TypeAlias,
    TypeList,
    TypeMangling,
    TypeMetadata,
    TypeMetadataAccessFunction,
    TypeMetadataCompletionFunction,
    TypeMetadataDemanglingCache,
    TypeMetadataInstantiationCache,
    TypeMetadataInstantiationFunction,
    TypeMetadataLazyCache,
    TypeMetadataMangledNameRef,
    TypeMetadataSingletonInitializationCache,
    TypeSymbolicReference,
    TypedThrowsAnnotation,
    UncurriedFunctionType,
    Uniquable,
    UniqueExtendedExistentialTypeShapeSymbolicReference,
    UnknownIndex,
    Unmanaged,
    Unowned,
    UnsafeAddressor,
    UnsafeMutableAddressor,
    VTableAttribute,
    VTableThunk,
    ValueWitness,
    ValueWitnessTable,
    Variable,
    VariadicMarker,
    Weak,
    WillSet,
);

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! `T`: thunks, specializations, descriptors and auto-diff symbols.

use std::mem;

use sym_tree::{predicates, Kind, Node};

use super::{DemangleResult, Demangler};
use crate::codes::{AutoDiffFunctionKind, Differentiability, FunctionSigSpecializationParamKind};

impl Demangler<'_> {
    pub(super) fn demangle_thunk_or_specialization(&mut self) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        match c {
            'T' => {
                let kind = match self.cursor.read_scalar()? {
                    'I' => Kind::SilThunkIdentity,
                    'H' => Kind::SilThunkHopToMainActorIfNeeded,
                    _ => return Err(self.fail()),
                };
                Ok(Node::with_child(kind, self.pop_required_if(predicates::is_entity)?))
            }
            'c' => Ok(Node::with_child(Kind::CurryThunk, self.pop_required_if(predicates::is_entity)?)),
            'j' => Ok(Node::with_child(Kind::DispatchThunk, self.pop_required_if(predicates::is_entity)?)),
            'q' => Ok(Node::with_child(Kind::MethodDescriptor, self.pop_required_if(predicates::is_entity)?)),
            'o' => Ok(Node::new(Kind::ObjCAttribute)),
            'O' => Ok(Node::new(Kind::NonObjCAttribute)),
            'D' => Ok(Node::new(Kind::DynamicAttribute)),
            'd' => Ok(Node::new(Kind::DirectMethodReferenceAttribute)),
            'E' => Ok(Node::new(Kind::DistributedThunk)),
            'F' => Ok(Node::new(Kind::DistributedAccessor)),
            'a' => Ok(Node::new(Kind::PartialApplyObjCForwarder)),
            'A' => Ok(Node::new(Kind::PartialApplyForwarder)),
            'm' => Ok(Node::new(Kind::MergedFunction)),
            'X' => Ok(Node::new(Kind::DynamicallyReplaceableFunctionVar)),
            'x' => Ok(Node::new(Kind::DynamicallyReplaceableFunctionKey)),
            'I' => Ok(Node::new(Kind::DynamicallyReplaceableFunctionImpl)),
            'Y' => Ok(Node::with_child(
                Kind::AsyncSuspendResumePartialFunction,
                self.demangle_index_as_name()?,
            )),
            'Q' => Ok(Node::with_child(
                Kind::AsyncAwaitResumePartialFunction,
                self.demangle_index_as_name()?,
            )),
            'C' => Ok(Node::with_child(Kind::CoroutineContinuationPrototype, self.pop_type()?)),
            'z' | 'Z' => {
                let flag_mode = self.demangle_index_as_name()?;
                let signature = self.pop_kind(Kind::DependentGenericSignature);
                let result_type = self.pop_type()?;
                let impl_type = self.pop_type()?;
                let kind = if c == 'z' {
                    Kind::ObjCAsyncCompletionHandlerImpl
                } else {
                    Kind::PredefinedObjCAsyncCompletionHandlerImpl
                };
                let children = [impl_type, result_type, flag_mode].into_iter().chain(signature);
                Ok(Node::with_children(kind, children))
            }
            'V' => {
                let base = self.pop_required_if(predicates::is_entity)?;
                let derived = self.pop_required_if(predicates::is_entity)?;
                Ok(Node::with_children(Kind::VTableThunk, [derived, base]))
            }
            'W' => {
                let entity = self.pop_required_if(predicates::is_entity)?;
                let conformance = self.pop_protocol_conformance()?;
                Ok(Node::with_children(Kind::ProtocolWitness, [conformance, entity]))
            }
            'S' => Ok(Node::with_child(
                Kind::ProtocolSelfConformanceWitness,
                self.pop_required_if(predicates::is_entity)?,
            )),
            'R' | 'r' | 'y' => {
                let kind = match c {
                    'R' => Kind::ReabstractionThunkHelper,
                    'y' => Kind::ReabstractionThunkHelperWithSelf,
                    _ => Kind::ReabstractionThunk,
                };
                let mut children: Vec<Node> =
                    self.pop_kind(Kind::DependentGenericSignature).into_iter().collect();
                if kind == Kind::ReabstractionThunkHelperWithSelf {
                    children.push(self.pop_type()?);
                }
                children.push(self.pop_type()?);
                children.push(self.pop_type()?);
                Ok(Node::with_children(kind, children))
            }
            'g' => self.demangle_generic_specialization(Kind::GenericSpecialization, Vec::new()),
            'G' => self.demangle_generic_specialization(
                Kind::GenericSpecializationNotReAbstracted,
                Vec::new(),
            ),
            'B' => self.demangle_generic_specialization(
                Kind::GenericSpecializationInResilienceDomain,
                Vec::new(),
            ),
            't' => {
                self.cursor.backtrack(1)?;
                self.demangle_generic_specialization_with_dropped_arguments()
            }
            's' => self.demangle_generic_specialization(
                Kind::GenericSpecializationPrespecialized,
                Vec::new(),
            ),
            'i' => self.demangle_generic_specialization(Kind::InlinedGenericFunction, Vec::new()),
            'P' | 'p' => {
                let kind = if c == 'P' {
                    Kind::GenericPartialSpecializationNotReAbstracted
                } else {
                    Kind::GenericPartialSpecialization
                };
                let mut spec = self.demangle_spec_attributes(kind, false)?;
                spec.add_child(Node::with_child(Kind::GenericSpecializationParam, self.pop_type()?));
                Ok(spec)
            }
            'f' => self.demangle_function_specialization(),
            'K' | 'k' => self.demangle_key_path_accessor_thunk(c == 'K'),
            'l' => Ok(Node::with_child(
                Kind::AssociatedTypeDescriptor,
                self.pop_associated_type_name()?,
            )),
            'L' => Ok(Node::with_child(
                Kind::ProtocolRequirementsBaseDescriptor,
                self.pop_protocol()?,
            )),
            'M' => Ok(Node::with_child(
                Kind::DefaultAssociatedTypeMetadataAccessor,
                self.pop_associated_type_name()?,
            )),
            'n' | 'N' => {
                let requirement = self.pop_protocol()?;
                let path = self.pop_associated_type_path()?;
                let protocol = self.pop_type()?;
                let kind = if c == 'n' {
                    Kind::AssociatedConformanceDescriptor
                } else {
                    Kind::DefaultAssociatedConformanceAccessor
                };
                Ok(Node::with_children(kind, [protocol, path, requirement]))
            }
            'b' => {
                let requirement = self.pop_protocol()?;
                let protocol = self.pop_type()?;
                Ok(Node::with_children(
                    Kind::BaseConformanceDescriptor,
                    [protocol, requirement],
                ))
            }
            'H' | 'h' => self.demangle_key_path_hash_thunk(c == 'H'),
            'v' => {
                let index = self.demangle_index()?;
                let kind = if self.cursor.conditional('r') {
                    Kind::OutlinedReadOnlyObject
                } else {
                    Kind::OutlinedVariable
                };
                Ok(Node::with_index(kind, index))
            }
            'e' => {
                let params = self.demangle_bridged_method_params()?;
                Ok(Node::with_text(Kind::OutlinedBridgedMethod, params))
            }
            'u' => Ok(Node::new(Kind::AsyncFunctionPointer)),
            'U' => {
                let global_actor = self.pop_type()?;
                let reabstraction = self.pop_required()?;
                Ok(Node::with_children(
                    Kind::ReabstractionThunkHelperWithGlobalActor,
                    [reabstraction, global_actor],
                ))
            }
            'J' => match self.cursor.read_scalar()? {
                'S' => self.demangle_auto_diff_subset_parameters_thunk(),
                'O' => self.demangle_auto_diff_self_reordering_thunk(),
                'V' => self.demangle_auto_diff_function(Kind::AutoDiffDerivativeVTableThunk),
                _ => {
                    self.cursor.backtrack(1)?;
                    self.demangle_auto_diff_function(Kind::AutoDiffFunction)
                }
            },
            'w' => {
                let kind = match self.cursor.read_scalar()? {
                    'b' => Kind::BackDeploymentThunk,
                    'B' => Kind::BackDeploymentFallback,
                    'c' => Kind::CoroFunctionPointer,
                    'd' => Kind::DefaultOverride,
                    'S' => Kind::HasSymbolQuery,
                    _ => return Err(self.fail()),
                };
                Ok(Node::new(kind))
            }
            _ => Err(self.fail()),
        }
    }

    // =========================================================================
    // Specializations
    // =========================================================================

    /// `[q][a]<pass digit>[unique id]`, shared by every specialization.
    fn demangle_spec_attributes(&mut self, kind: Kind, with_unique_id: bool) -> DemangleResult<Node> {
        let is_serialized = self.cursor.conditional('q');
        let async_removed = self.cursor.conditional('a');
        let pass_id = self.cursor.read_scalar()?.to_digit(10);
        let pass_id = self.require(pass_id)?;
        let unique_id = if with_unique_id {
            self.demangle_natural()
        } else {
            None
        };

        let mut spec = unique_id.map_or_else(|| Node::new(kind), |id| Node::with_index(kind, id));
        if is_serialized {
            spec.add_child(Node::new(Kind::IsSerialized));
        }
        if async_removed {
            spec.add_child(Node::new(Kind::AsyncRemoved));
        }
        spec.add_child(Node::with_index(Kind::SpecializationPassID, u64::from(pass_id)));
        Ok(spec)
    }

    fn demangle_generic_specialization(
        &mut self,
        kind: Kind,
        dropped_arguments: Vec<Node>,
    ) -> DemangleResult<Node> {
        let mut spec = self.demangle_spec_attributes(kind, false)?;
        spec.add_children(dropped_arguments);
        let args = self.pop_type_list()?;
        spec.add_children(
            args.children()
                .iter()
                .map(|arg| Node::with_child(Kind::GenericSpecializationParam, arg.clone())),
        );
        Ok(spec)
    }

    /// `t<n>` runs name the generic arguments a specialization dropped.
    fn demangle_generic_specialization_with_dropped_arguments(&mut self) -> DemangleResult<Node> {
        let mut dropped = Vec::new();
        while self.cursor.conditional('t') {
            let index = match self.demangle_natural() {
                Some(n) => self.require(n.checked_add(1))?,
                None => 0,
            };
            dropped.push(Node::with_index(Kind::DroppedArgument, index));
        }
        let kind = match self.cursor.read_scalar()? {
            'g' => Kind::GenericSpecialization,
            'G' => Kind::GenericSpecializationNotReAbstracted,
            'B' => Kind::GenericSpecializationInResilienceDomain,
            _ => return Err(self.fail()),
        };
        self.demangle_generic_specialization(kind, dropped)
    }

    /// `Tf`: a function-signature specialization.
    ///
    /// Parameters are read first. Constant-propagated and closure parameters
    /// then take their payload name (and any closure types) from the stack,
    /// last parameter first.
    fn demangle_function_specialization(&mut self) -> DemangleResult<Node> {
        use FunctionSigSpecializationParamKind as P;

        let mut spec = self.demangle_spec_attributes(Kind::FunctionSignatureSpecialization, true)?;
        while !self.cursor.conditional('_') {
            spec.add_child(self.demangle_func_spec_param(Kind::FunctionSignatureSpecializationParam)?);
        }
        if !self.cursor.conditional('n') {
            spec.add_child(self.demangle_func_spec_param(Kind::FunctionSignatureSpecializationReturn)?);
        }

        for param in spec.children_mut().iter_mut().rev() {
            if param.kind() != Kind::FunctionSignatureSpecializationParam {
                continue;
            }
            let Some(kind_node) = param.first_child() else {
                continue;
            };
            self.ensure(kind_node.kind() == Kind::FunctionSignatureSpecializationParamKind)?;
            let param_kind = self.require(kind_node.index())?;
            if !matches!(
                param_kind,
                P::CONSTANT_PROP_FUNCTION
                    | P::CONSTANT_PROP_GLOBAL
                    | P::CONSTANT_PROP_STRING
                    | P::CONSTANT_PROP_KEY_PATH
                    | P::CLOSURE_PROP
            ) {
                continue;
            }

            let takes_types = matches!(param_kind, P::CLOSURE_PROP | P::CONSTANT_PROP_KEY_PATH);
            let end = param.num_children();
            while let Some(captured) = self.pop_kind(Kind::Type) {
                self.ensure(takes_types)?;
                param.insert_child(end, captured);
            }
            let name = self.pop_required_kind(Kind::Identifier)?;
            let mut text = self.require(name.text())?;
            if param_kind == P::CONSTANT_PROP_STRING {
                text = text.strip_prefix('_').unwrap_or(text);
            }
            param.insert_child(
                end,
                Node::with_text(Kind::FunctionSignatureSpecializationParamPayload, text),
            );
        }
        Ok(spec)
    }

    fn demangle_func_spec_param(&mut self, kind: Kind) -> DemangleResult<Node> {
        use FunctionSigSpecializationParamKind as P;

        let mut param = Node::new(kind);
        let mut payload = None;
        let value = match self.cursor.read_scalar()? {
            'n' => return Ok(param),
            'c' => P::CLOSURE_PROP,
            'p' => match self.cursor.read_scalar()? {
                'f' => P::CONSTANT_PROP_FUNCTION,
                'g' => P::CONSTANT_PROP_GLOBAL,
                'i' => P::CONSTANT_PROP_INTEGER,
                'd' => P::CONSTANT_PROP_FLOAT,
                's' => {
                    payload = Some(match self.cursor.read_scalar()? {
                        'b' => "u8",
                        'w' => "u16",
                        'c' => "objc",
                        _ => return Err(self.fail()),
                    });
                    P::CONSTANT_PROP_STRING
                }
                'k' => P::CONSTANT_PROP_KEY_PATH,
                _ => return Err(self.fail()),
            },
            'e' => self.read_spec_flags(
                P::EXISTENTIAL_TO_GENERIC,
                &[
                    ('D', P::DEAD),
                    ('G', P::OWNED_TO_GUARANTEED),
                    ('O', P::GUARANTEED_TO_OWNED),
                    ('X', P::SROA),
                ],
            ),
            'd' => self.read_spec_flags(
                P::DEAD,
                &[('G', P::OWNED_TO_GUARANTEED), ('O', P::GUARANTEED_TO_OWNED), ('X', P::SROA)],
            ),
            'g' => self.read_spec_flags(P::OWNED_TO_GUARANTEED, &[('X', P::SROA)]),
            'o' => self.read_spec_flags(P::GUARANTEED_TO_OWNED, &[('X', P::SROA)]),
            'x' => P::SROA,
            'i' => P::BOX_TO_VALUE,
            's' => P::BOX_TO_STACK,
            'r' => P::IN_OUT_TO_OUT,
            _ => return Err(self.fail()),
        };

        param.add_child(Node::with_index(Kind::FunctionSignatureSpecializationParamKind, value));
        if let Some(payload) = payload {
            param.add_child(Node::with_text(
                Kind::FunctionSignatureSpecializationParamPayload,
                payload,
            ));
        }
        Ok(param)
    }

    /// Or optional flag letters, in the given order, into `base`.
    fn read_spec_flags(&mut self, base: u64, flags: &[(char, u64)]) -> u64 {
        flags.iter().fold(base, |value, &(letter, flag)| {
            if self.cursor.conditional(letter) {
                value | flag
            } else {
                value
            }
        })
    }

    // =========================================================================
    // Key Paths
    // =========================================================================

    /// `TK`/`Tk`: key path getter and setter thunks, or method thunk helpers
    /// when followed by `mu`/`MA`.
    fn demangle_key_path_accessor_thunk(&mut self, is_getter: bool) -> DemangleResult<Node> {
        let kind = if self.cursor.conditional_str("mu") {
            Kind::KeyPathUnappliedMethodThunkHelper
        } else if self.cursor.conditional_str("MA") {
            Kind::KeyPathAppliedMethodThunkHelper
        } else if is_getter {
            Kind::KeyPathGetterThunkHelper
        } else {
            Kind::KeyPathSetterThunkHelper
        };
        let is_serialized = self.cursor.conditional('q');

        let mut types = Vec::new();
        while let Some(t) = self.pop_kind(Kind::Type) {
            types.push(t);
        }
        let top = self.pop_required()?;
        let mut children = if top.kind() == Kind::DependentGenericSignature {
            let decl = self.pop_required()?;
            vec![decl, top]
        } else {
            vec![top]
        };
        children.extend(types.into_iter().rev());
        if is_serialized {
            children.push(Node::new(Kind::IsSerialized));
        }
        Ok(Node::with_children(kind, children))
    }

    /// `TH`/`Th`: key path equality and hash thunks over every type on the stack.
    fn demangle_key_path_hash_thunk(&mut self, is_equals: bool) -> DemangleResult<Node> {
        let kind = if is_equals {
            Kind::KeyPathEqualsThunkHelper
        } else {
            Kind::KeyPathHashThunkHelper
        };
        let is_serialized = self.cursor.conditional('q');

        let top = self.pop_required()?;
        let mut signature = None;
        let mut types = Vec::new();
        match top.kind() {
            Kind::DependentGenericSignature => signature = Some(top),
            Kind::Type => types.push(top),
            _ => return Err(self.fail()),
        }
        while let Some(t) = self.pop() {
            self.ensure(t.kind() == Kind::Type)?;
            types.push(t);
        }

        let mut children: Vec<Node> = types.into_iter().rev().chain(signature).collect();
        if is_serialized {
            children.push(Node::new(Kind::IsSerialized));
        }
        Ok(Node::with_children(kind, children))
    }

    /// `Te`: ownership letters of a bridged method's parameters.
    fn demangle_bridged_method_params(&mut self) -> DemangleResult<String> {
        if self.cursor.conditional('_') {
            return Ok(String::new());
        }
        let kind = self.cursor.read_scalar()?;
        if !matches!(kind, 'o' | 'p' | 'a' | 'm') {
            return Ok(String::new());
        }
        let mut params = String::from(kind);
        while !self.cursor.conditional('_') {
            let c = self.cursor.read_scalar()?;
            self.ensure(matches!(c, 'n' | 'b' | 'g'))?;
            params.push(c);
        }
        Ok(params)
    }

    // =========================================================================
    // Auto-Diff
    // =========================================================================

    fn demangle_auto_diff_function_kind(&mut self) -> DemangleResult<Node> {
        let kind = AutoDiffFunctionKind::from_code(self.cursor.read_scalar()?);
        let kind = self.require(kind)?;
        Ok(Node::with_index(Kind::AutoDiffFunctionKind, kind.index()))
    }

    /// A non-empty run of `S` (in the subset) and `U` (not in it).
    fn demangle_index_subset(&mut self) -> DemangleResult<Node> {
        let subset = self.cursor.read_while(|c| c == 'S' || c == 'U');
        self.ensure(!subset.is_empty())?;
        Ok(Node::with_text(Kind::IndexSubset, subset))
    }

    /// Parameter and result index subsets, `<params>p<results>r`.
    fn demangle_parameter_result_subsets(&mut self, children: &mut Vec<Node>) -> DemangleResult<()> {
        children.push(self.demangle_index_subset()?);
        self.cursor.match_scalar('p')?;
        children.push(self.demangle_index_subset()?);
        self.cursor.match_scalar('r')?;
        Ok(())
    }

    /// The whole stack becomes the operands of an auto-diff function.
    fn demangle_auto_diff_function(&mut self, kind: Kind) -> DemangleResult<Node> {
        let mut children = mem::take(&mut self.name_stack);
        children.push(self.demangle_auto_diff_function_kind()?);
        self.demangle_parameter_result_subsets(&mut children)?;
        Ok(Node::with_children(kind, children))
    }

    fn demangle_auto_diff_subset_parameters_thunk(&mut self) -> DemangleResult<Node> {
        let mut children = mem::take(&mut self.name_stack);
        children.push(self.demangle_auto_diff_function_kind()?);
        self.demangle_parameter_result_subsets(&mut children)?;
        children.push(self.demangle_index_subset()?);
        self.cursor.match_scalar('P')?;
        Ok(Node::with_children(Kind::AutoDiffSubsetParametersThunk, children))
    }

    fn demangle_auto_diff_self_reordering_thunk(&mut self) -> DemangleResult<Node> {
        let mut children: Vec<Node> =
            self.pop_kind(Kind::DependentGenericSignature).into_iter().collect();
        children.push(self.pop_type()?);
        children.push(self.pop_type()?);
        children.reverse();
        children.push(self.demangle_auto_diff_function_kind()?);
        Ok(Node::with_children(
            Kind::AutoDiffSelfReorderingReabstractionThunk,
            children,
        ))
    }

    /// `WJ`: a differentiability witness for the entity on the stack.
    pub(super) fn demangle_differentiability_witness(&mut self) -> DemangleResult<Node> {
        let signature = self.pop_kind(Kind::DependentGenericSignature);
        let mut children = mem::take(&mut self.name_stack);
        let differentiability = Differentiability::from_code(self.cursor.read_scalar()?);
        let differentiability = self.require(differentiability)?;
        children.push(Node::with_index(Kind::Index, differentiability.index()));
        self.demangle_parameter_result_subsets(&mut children)?;
        children.extend(signature);
        Ok(Node::with_children(Kind::DifferentiabilityWitness, children))
    }
}

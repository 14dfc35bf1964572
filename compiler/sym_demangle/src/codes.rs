//! Small integer vocabularies stored in `Index` payloads.
//!
//! A few productions record a code rather than a subtree: value witnesses,
//! function-signature specialization parameter kinds, differentiability.
//! Consumers decode the index with these types.

/// Value witness functions, addressed by a two-letter code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum ValueWitnessKind {
    AllocateBuffer = 0,
    AssignWithCopy = 1,
    AssignWithTake = 2,
    DeallocateBuffer = 3,
    Destroy = 4,
    DestroyArray = 5,
    DestroyBuffer = 6,
    InitializeBufferWithCopyOfBuffer = 7,
    InitializeBufferWithCopy = 8,
    InitializeWithCopy = 9,
    InitializeBufferWithTake = 10,
    InitializeWithTake = 11,
    ProjectBuffer = 12,
    InitializeBufferWithTakeOfBuffer = 13,
    InitializeArrayWithCopy = 14,
    InitializeArrayWithTakeFrontToBack = 15,
    InitializeArrayWithTakeBackToFront = 16,
    StoreExtraInhabitant = 17,
    GetExtraInhabitantIndex = 18,
    GetEnumTag = 19,
    DestructiveProjectEnumData = 20,
    DestructiveInjectEnumTag = 21,
    GetEnumTagSinglePayload = 22,
    StoreEnumTagSinglePayload = 23,
}

impl ValueWitnessKind {
    pub fn from_code(code: &str) -> Option<Self> {
        use ValueWitnessKind as V;
        Some(match code {
            "al" => V::AllocateBuffer,
            "ca" => V::AssignWithCopy,
            "ta" => V::AssignWithTake,
            "de" => V::DeallocateBuffer,
            "xx" => V::Destroy,
            "XX" => V::DestroyBuffer,
            "Xx" => V::DestroyArray,
            "CP" => V::InitializeBufferWithCopyOfBuffer,
            "Cp" => V::InitializeBufferWithCopy,
            "cp" => V::InitializeWithCopy,
            "Tk" => V::InitializeBufferWithTake,
            "tk" => V::InitializeWithTake,
            "pr" => V::ProjectBuffer,
            "TK" => V::InitializeBufferWithTakeOfBuffer,
            "Cc" => V::InitializeArrayWithCopy,
            "Tt" => V::InitializeArrayWithTakeFrontToBack,
            "tT" => V::InitializeArrayWithTakeBackToFront,
            "xs" => V::StoreExtraInhabitant,
            "xg" => V::GetExtraInhabitantIndex,
            "ug" => V::GetEnumTag,
            "up" => V::DestructiveProjectEnumData,
            "ui" => V::DestructiveInjectEnumTag,
            "et" => V::GetEnumTagSinglePayload,
            "st" => V::StoreEnumTagSinglePayload,
            _ => return None,
        })
    }

    #[inline]
    pub fn index(self) -> u64 {
        self as u64
    }
}

/// How a function-signature specialization rewrote one parameter.
///
/// The low values are exclusive kinds; the high values are flags that can
/// be or-ed together.
pub struct FunctionSigSpecializationParamKind;

impl FunctionSigSpecializationParamKind {
    pub const CONSTANT_PROP_FUNCTION: u64 = 0;
    pub const CONSTANT_PROP_GLOBAL: u64 = 1;
    pub const CONSTANT_PROP_INTEGER: u64 = 2;
    pub const CONSTANT_PROP_FLOAT: u64 = 3;
    pub const CONSTANT_PROP_STRING: u64 = 4;
    pub const CLOSURE_PROP: u64 = 5;
    pub const BOX_TO_VALUE: u64 = 6;
    pub const BOX_TO_STACK: u64 = 7;
    pub const IN_OUT_TO_OUT: u64 = 8;
    pub const CONSTANT_PROP_KEY_PATH: u64 = 9;

    pub const DEAD: u64 = 64;
    pub const OWNED_TO_GUARANTEED: u64 = 128;
    pub const SROA: u64 = 256;
    pub const GUARANTEED_TO_OWNED: u64 = 512;
    pub const EXISTENTIAL_TO_GENERIC: u64 = 1024;
}

/// Differentiability of a function type or witness.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Differentiability {
    Normal,
    Linear,
    Forward,
    Reverse,
}

impl Differentiability {
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'd' => Some(Differentiability::Normal),
            'l' => Some(Differentiability::Linear),
            'f' => Some(Differentiability::Forward),
            'r' => Some(Differentiability::Reverse),
            _ => None,
        }
    }

    /// The mangling letter, which is also what the tree stores.
    pub fn code(self) -> char {
        match self {
            Differentiability::Normal => 'd',
            Differentiability::Linear => 'l',
            Differentiability::Forward => 'f',
            Differentiability::Reverse => 'r',
        }
    }

    #[inline]
    pub fn index(self) -> u64 {
        u64::from(self.code())
    }
}

/// Which derivative-related function an auto-diff thunk stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AutoDiffFunctionKind {
    Jvp,
    Vjp,
    Differential,
    Pullback,
}

impl AutoDiffFunctionKind {
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'f' => Some(AutoDiffFunctionKind::Jvp),
            'r' => Some(AutoDiffFunctionKind::Vjp),
            'd' => Some(AutoDiffFunctionKind::Differential),
            'p' => Some(AutoDiffFunctionKind::Pullback),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            AutoDiffFunctionKind::Jvp => 'f',
            AutoDiffFunctionKind::Vjp => 'r',
            AutoDiffFunctionKind::Differential => 'd',
            AutoDiffFunctionKind::Pullback => 'p',
        }
    }

    #[inline]
    pub fn index(self) -> u64 {
        u64::from(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_witness_codes() {
        assert_eq!(ValueWitnessKind::from_code("al"), Some(ValueWitnessKind::AllocateBuffer));
        assert_eq!(ValueWitnessKind::from_code("Xx").map(ValueWitnessKind::index), Some(5));
        assert_eq!(ValueWitnessKind::from_code("st").map(ValueWitnessKind::index), Some(23));
        assert_eq!(ValueWitnessKind::from_code("zz"), None);
    }

    #[test]
    fn test_differentiability_round_trips_through_code() {
        for c in ['d', 'l', 'f', 'r'] {
            assert_eq!(Differentiability::from_code(c).map(Differentiability::code), Some(c));
        }
        assert_eq!(Differentiability::from_code('x'), None);
    }

    #[test]
    fn test_autodiff_kinds() {
        assert_eq!(AutoDiffFunctionKind::from_code('p'), Some(AutoDiffFunctionKind::Pullback));
        assert_eq!(AutoDiffFunctionKind::Jvp.index(), u64::from('f'));
        assert_eq!(AutoDiffFunctionKind::from_code('l'), None);
    }
}

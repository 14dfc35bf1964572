//! Symbolic references.
//!
//! Names embedded in binary metadata may replace a whole subtree with a
//! control byte (`0x01..=0x0C`) followed by a relative address. The grammar
//! driver never interprets the address itself: it asks a caller-supplied
//! [`SymbolicResolver`] for the node instead.

use sym_tree::Node;

/// What a symbolic reference points at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolicReferenceKind {
    /// A context descriptor (type, protocol, extension, ...).
    Context,
    /// A function that produces the referenced metadata.
    AccessorFunctionReference,
    UniqueExtendedExistentialTypeShape,
    NonUniqueExtendedExistentialTypeShape,
    /// An Objective-C protocol record.
    ObjectiveCProtocol,
}

/// Whether the address leads straight to the target or through a pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Directness {
    Direct,
    Indirect,
}

impl Directness {
    /// Encoding used in `Directness` tree nodes.
    pub fn index(self) -> u64 {
        match self {
            Directness::Direct => 0,
            Directness::Indirect => 1,
        }
    }
}

impl SymbolicReferenceKind {
    /// Decode a control byte. Bytes in range but without a meaning fail.
    pub fn from_byte(byte: u32) -> Option<(SymbolicReferenceKind, Directness)> {
        match byte {
            0x01 => Some((SymbolicReferenceKind::Context, Directness::Direct)),
            0x02 => Some((SymbolicReferenceKind::Context, Directness::Indirect)),
            0x09 => Some((SymbolicReferenceKind::AccessorFunctionReference, Directness::Direct)),
            0x0A => Some((
                SymbolicReferenceKind::UniqueExtendedExistentialTypeShape,
                Directness::Indirect,
            )),
            0x0B => Some((
                SymbolicReferenceKind::NonUniqueExtendedExistentialTypeShape,
                Directness::Direct,
            )),
            0x0C => Some((SymbolicReferenceKind::ObjectiveCProtocol, Directness::Direct)),
            _ => None,
        }
    }

    /// Resolved nodes of these kinds become back-reference targets.
    pub fn is_substitutable(self) -> bool {
        matches!(
            self,
            SymbolicReferenceKind::Context | SymbolicReferenceKind::ObjectiveCProtocol
        )
    }
}

/// Host hook that turns a symbolic reference into a node.
///
/// `index` counts the references seen so far in the current decode,
/// starting at 0. Returning `None` fails the decode.
///
/// Closures of the right shape implement this trait:
///
/// ```
/// use sym_demangle::{Directness, SymbolicReferenceKind};
/// use sym_tree::{Kind, Node};
///
/// let resolver = |_kind: SymbolicReferenceKind, _directness: Directness, index: usize| {
///     Some(Node::with_index(Kind::TypeSymbolicReference, index as u64))
/// };
/// # let _: &dyn sym_demangle::SymbolicResolver = &resolver;
/// ```
pub trait SymbolicResolver {
    fn resolve(&self, kind: SymbolicReferenceKind, directness: Directness, index: usize)
        -> Option<Node>;
}

impl<F> SymbolicResolver for F
where
    F: Fn(SymbolicReferenceKind, Directness, usize) -> Option<Node>,
{
    fn resolve(
        &self,
        kind: SymbolicReferenceKind,
        directness: Directness,
        index: usize,
    ) -> Option<Node> {
        self(kind, directness, index)
    }
}

/// Resolver for callers without binary metadata. Every reference fails.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoResolver;

impl SymbolicResolver for NoResolver {
    fn resolve(&self, _: SymbolicReferenceKind, _: Directness, _: usize) -> Option<Node> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_tree::Kind;

    #[test]
    fn test_byte_map() {
        assert_eq!(
            SymbolicReferenceKind::from_byte(0x01),
            Some((SymbolicReferenceKind::Context, Directness::Direct))
        );
        assert_eq!(
            SymbolicReferenceKind::from_byte(0x0A),
            Some((
                SymbolicReferenceKind::UniqueExtendedExistentialTypeShape,
                Directness::Indirect
            ))
        );
        for unused in 0x03..=0x08 {
            assert_eq!(SymbolicReferenceKind::from_byte(unused), None);
        }
        assert_eq!(SymbolicReferenceKind::from_byte(0x0D), None);
    }

    #[test]
    fn test_only_contexts_and_objc_protocols_are_substitutable() {
        assert!(SymbolicReferenceKind::Context.is_substitutable());
        assert!(SymbolicReferenceKind::ObjectiveCProtocol.is_substitutable());
        assert!(!SymbolicReferenceKind::AccessorFunctionReference.is_substitutable());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: SymbolicReferenceKind, _: Directness, index: usize| {
            Some(Node::with_index(Kind::TypeSymbolicReference, index as u64))
        };
        let node = resolver.resolve(SymbolicReferenceKind::Context, Directness::Direct, 4);
        assert_eq!(node.and_then(|n| n.index()), Some(4));
        assert_eq!(
            NoResolver.resolve(SymbolicReferenceKind::Context, Directness::Direct, 0),
            None
        );
    }
}

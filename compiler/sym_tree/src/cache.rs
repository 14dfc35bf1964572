//! Structural interning of symbol trees.
//!
//! Demangling every symbol of a large binary produces millions of nodes, most
//! of them repeats (`Swift.Int`, `Swift.String`, the same module over and
//! over). A [`NodeCache`] rebuilds trees bottom-up so that structurally equal
//! subtrees share one allocation.

use rustc_hash::FxHashMap;
use sym_stack::ensure_sufficient_stack;

use crate::Node;

/// Deduplicating store of nodes.
#[derive(Default)]
pub struct NodeCache {
    nodes: FxHashMap<Node, Node>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct subtrees seen so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Return the canonical copy of `node`, interning its children first.
    pub fn intern(&mut self, node: &Node) -> Node {
        let mut rebuilt = node.clone();
        for (i, child) in node.children().iter().enumerate() {
            let canonical = ensure_sufficient_stack(|| self.intern(child));
            if !canonical.ptr_eq(child) {
                rebuilt.replace_child(i, canonical);
            }
        }
        if let Some(existing) = self.nodes.get(&rebuilt) {
            return existing.clone();
        }
        self.nodes.insert(rebuilt.clone(), rebuilt.clone());
        rebuilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kind;

    fn swift_int() -> Node {
        Node::with_child(
            Kind::Type,
            Node::with_children(
                Kind::Structure,
                [
                    Node::with_text(Kind::Module, "Swift"),
                    Node::with_text(Kind::Identifier, "Int"),
                ],
            ),
        )
    }

    #[test]
    fn test_equal_trees_share_storage() {
        let mut cache = NodeCache::new();
        let a = cache.intern(&swift_int());
        let b = cache.intern(&swift_int());
        assert!(a.ptr_eq(&b));
        assert_eq!(a, swift_int());
    }

    #[test]
    fn test_shared_subtrees_are_deduplicated() {
        let mut cache = NodeCache::new();
        let tuple = Node::with_children(Kind::Tuple, [swift_int(), swift_int()]);
        let interned = cache.intern(&tuple);
        assert!(interned.children()[0].ptr_eq(&interned.children()[1]));
        // Module, Identifier, Structure, Type, Tuple
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_deep_chain_interns() {
        let mut chain = swift_int();
        for _ in 0..5_000 {
            chain = Node::with_child(Kind::SugaredOptional, chain);
        }
        let mut cache = NodeCache::new();
        let interned = cache.intern(&chain);
        assert_eq!(interned.height(), chain.height());
        assert!(cache.intern(&chain).ptr_eq(&interned));
        assert_eq!(cache.len(), 5_004);
    }

    #[test]
    fn test_clear() {
        let mut cache = NodeCache::new();
        cache.intern(&swift_int());
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}

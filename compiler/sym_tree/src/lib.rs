//! Symbol tree model.
//!
//! Everything the demangler produces, and everything a printer or type
//! builder consumes, is a tree of [`Node`]s tagged with a [`Kind`]. The
//! [`predicates`] module groups the kind tests the grammar relies on.

mod cache;
mod kind;
mod node;
pub mod predicates;

pub use cache::NodeCache;
pub use kind::Kind;
pub use node::{ChildrenMut, Contents, Node};

/// Name of the standard library module.
pub const STDLIB_MODULE: &str = "Swift";

/// Module that imported Objective-C declarations live in.
pub const OBJC_MODULE: &str = "__C";

/// Module for declarations synthesized by the C importer.
pub const C_SYNTHESIZED_MODULE: &str = "__C_Synthesized";

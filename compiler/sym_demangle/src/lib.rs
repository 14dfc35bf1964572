//! Grammar driver for mangled symbol names.
//!
//! Turns a mangled name into a [`Node`] tree. Two dialects are understood:
//!
//! - the current dialect, introduced by one of the version prefixes
//!   (`$s`, `$S`, `$e`, `_T0`, `@__swiftmacro_`, and their `_`-prefixed
//!   variants), which records back-references in a substitution table;
//! - the legacy dialect, introduced by a bare `_T`, which refers back to
//!   earlier names by position.
//!
//! Bridged class and protocol names (`_TtC...`, `_TtP...`) are accepted by
//! both and tried in that order.
//!
//! Decoding is a pure function of the input, the optional
//! [`SymbolicResolver`] and a [`DemangleConfig`]. Every call owns its state,
//! so independent names may be decoded on as many threads as the resolver
//! tolerates; [`demangle_batch`] does exactly that.

pub mod codes;
mod config;
mod demangler;
mod error;
mod legacy;
pub mod punycode;
mod resolver;
pub mod tables;

use rayon::prelude::*;
use sym_tree::{Node, NodeCache};
use tracing::debug;

pub use config::{DemangleConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_LEN};
pub use error::DemangleError;
pub use resolver::{Directness, NoResolver, SymbolicReferenceKind, SymbolicResolver};

use demangler::{is_bridged_type_name, mangling_prefix_len, Demangler};
use legacy::LegacyDemangler;

/// Which grammar a top-level decode dispatched to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dialect {
    Current,
    Bridged,
    Legacy,
    Type,
}

fn scalars_within_limit(input: &str, config: &DemangleConfig) -> Result<Vec<char>, DemangleError> {
    let scalars: Vec<char> = input.chars().collect();
    if scalars.len() > config.max_input_len {
        return Err(DemangleError::TooLong {
            length: scalars.len(),
            limit: config.max_input_len,
        });
    }
    Ok(scalars)
}

fn log_failure(dialect: Dialect, result: Result<Node, DemangleError>) -> Result<Node, DemangleError> {
    if let Err(err) = &result {
        debug!(?dialect, position = err.position(), %err, "decode failed");
    }
    result
}

/// Decode a complete mangled symbol.
///
/// The version prefix picks the dialect. A name without a current-dialect
/// prefix must be a legacy `_T` name; bridged `_TtC`/`_TtP` names are read
/// with the current grammar first and with the legacy one if that fails.
///
/// ```
/// use sym_demangle::{demangle_symbol, DemangleConfig, NoResolver};
/// use sym_tree::Kind;
///
/// let tree = demangle_symbol("$s4main3fooyyF", &NoResolver, &DemangleConfig::default()).unwrap();
/// assert_eq!(tree.kind(), Kind::Global);
/// assert_eq!(tree.child_kind(0), Some(Kind::Function));
/// ```
pub fn demangle_symbol(
    input: &str,
    resolver: &dyn SymbolicResolver,
    config: &DemangleConfig,
) -> Result<Node, DemangleError> {
    let scalars = scalars_within_limit(input, config)?;

    let dialect = if mangling_prefix_len(&scalars) > 0 {
        Dialect::Current
    } else if is_bridged_type_name(&scalars) {
        Dialect::Bridged
    } else {
        Dialect::Legacy
    };
    debug!(?dialect, len = scalars.len(), "decoding symbol");

    let result = match dialect {
        Dialect::Current => Demangler::new(&scalars, resolver, config).demangle_symbol(),
        Dialect::Bridged => Demangler::new(&scalars, resolver, config)
            .demangle_symbol()
            .or_else(|err| {
                debug!(position = err.position(), "bridged name retried as legacy");
                LegacyDemangler::new(&scalars, config).demangle_symbol()
            }),
        Dialect::Legacy | Dialect::Type => LegacyDemangler::new(&scalars, config).demangle_symbol(),
    };
    log_failure(dialect, result)
}

/// Decode a bare current-dialect type mangling, with no prefix.
///
/// Input that contains no production at all comes back whole as a
/// `Suffix` node.
pub fn demangle_type(
    input: &str,
    resolver: &dyn SymbolicResolver,
    config: &DemangleConfig,
) -> Result<Node, DemangleError> {
    let scalars = scalars_within_limit(input, config)?;
    debug!(dialect = ?Dialect::Type, len = scalars.len(), "decoding type");
    let result = Demangler::new(&scalars, resolver, config).demangle_type();
    log_failure(Dialect::Type, result)
}

/// [`demangle_symbol`] with no resolver and the default limits.
pub fn demangle(input: &str) -> Result<Node, DemangleError> {
    demangle_symbol(input, &NoResolver, &DemangleConfig::default())
}

/// Decode many symbols in parallel.
///
/// Results come back in input order, `None` marking names that failed to
/// decode. Successful trees are interned into one [`NodeCache`] afterwards,
/// so subtrees repeated across symbols share storage.
pub fn demangle_batch<S>(symbols: &[S], config: &DemangleConfig) -> Vec<Option<Node>>
where
    S: AsRef<str> + Sync,
{
    debug!(count = symbols.len(), "decoding batch");
    let decoded: Vec<Option<Node>> = symbols
        .par_iter()
        .map(|symbol| demangle_symbol(symbol.as_ref(), &NoResolver, config).ok())
        .collect();

    let mut cache = NodeCache::new();
    decoded
        .into_iter()
        .map(|node| node.map(|node| cache.intern(&node)))
        .collect()
}

#[cfg(test)]
mod tests;

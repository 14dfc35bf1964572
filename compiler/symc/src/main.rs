//! Symbol demangler CLI
//!
//! Prints the decoded tree of every mangled name given on the command line.

mod options;

use std::sync::Once;

use sym_demangle::{demangle_symbol, demangle_type, DemangleError, NoResolver};
use sym_tree::Node;

use options::{parse_options, Mode, Options};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Only active when `RUST_LOG` is set, e.g. `RUST_LOG=sym_demangle=trace`.
/// Safe to call multiple times.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(HierarchicalLayer::new(2).with_targets(true))
                .init();
        }
    });
}

fn decode(options: &Options, symbol: &str) -> Result<Node, DemangleError> {
    match options.mode {
        Mode::Symbol => demangle_symbol(symbol, &NoResolver, &options.config),
        Mode::Type => demangle_type(symbol, &NoResolver, &options.config),
    }
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    };

    if options.symbols.is_empty() {
        print_usage();
        return;
    }

    let mut failed = false;
    for symbol in &options.symbols {
        match decode(&options, symbol) {
            Ok(tree) => print!("{tree}"),
            Err(err) => {
                eprintln!("error: {symbol}: {err}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Symbol demangler");
    println!();
    println!("Usage: symc [options] <symbol>...");
    println!();
    println!("Options:");
    println!("  --type, -t          Decode each argument as a bare type mangling");
    println!("  --max-depth=<n>     Nesting limit (default: {})", sym_demangle::DEFAULT_MAX_DEPTH);
    println!("  --max-len=<n>       Input length limit in scalars (default: {})", sym_demangle::DEFAULT_MAX_INPUT_LEN);
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=sym_demangle=debug) to trace decoding.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sym_demangle::DemangleConfig;

    fn options(mode: Mode) -> Options {
        Options {
            mode,
            config: DemangleConfig::default(),
            symbols: Vec::new(),
        }
    }

    #[test]
    fn test_symbol_mode_dumps_tree() {
        let tree = decode(&options(Mode::Symbol), "$sSiD").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            tree.to_string(),
            "kind=Global\n\
             \x20 kind=TypeMangling\n\
             \x20   kind=Type\n\
             \x20     kind=Structure\n\
             \x20       kind=Module, text=\"Swift\"\n\
             \x20       kind=Identifier, text=\"Int\"\n"
        );
    }

    #[test]
    fn test_type_mode() {
        let tree = decode(&options(Mode::Type), "Si").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(tree.child_kind(0), Some(sym_tree::Kind::Structure));
    }

    #[test]
    fn test_errors_carry_position() {
        let err = decode(&options(Mode::Symbol), "$s4mai").err();
        assert!(matches!(err, Some(DemangleError::Malformed { .. })));
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}

//! Command-line options.

use sym_demangle::DemangleConfig;

/// What to do with each positional argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Full symbol, any dialect.
    Symbol,
    /// Bare type mangling without a prefix.
    Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    pub config: DemangleConfig,
    pub symbols: Vec<String>,
}

/// Parse everything after the program name.
///
/// Flags may appear anywhere. Returns a message naming the first bad flag.
pub fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        mode: Mode::Symbol,
        config: DemangleConfig::default(),
        symbols: Vec::new(),
    };

    for arg in args {
        if arg == "--type" || arg == "-t" {
            options.mode = Mode::Type;
        } else if let Some(value) = arg.strip_prefix("--max-depth=") {
            options.config = options.config.with_max_depth(parse_limit(arg, value)?);
        } else if let Some(value) = arg.strip_prefix("--max-len=") {
            options.config = options.config.with_max_input_len(parse_limit(arg, value)?);
        } else if arg.starts_with("--") {
            return Err(format!("unknown option '{arg}'"));
        } else {
            options.symbols.push(arg.clone());
        }
    }

    Ok(options)
}

fn parse_limit(arg: &str, value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("invalid number in '{arg}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_positional_symbols() {
        let options = parse_options(&args(&["$sSiD", "_TtSi"])).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(options.mode, Mode::Symbol);
        assert_eq!(options.symbols, args(&["$sSiD", "_TtSi"]));
        assert_eq!(options.config, DemangleConfig::default());
    }

    #[test]
    fn test_flags_anywhere() {
        let options = parse_options(&args(&["Si", "--type", "--max-depth=8", "--max-len=64"]))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(options.mode, Mode::Type);
        assert_eq!(options.config.max_depth, 8);
        assert_eq!(options.config.max_input_len, 64);
        assert_eq!(options.symbols, args(&["Si"]));
    }

    #[test]
    fn test_bad_flags() {
        assert_eq!(
            parse_options(&args(&["--max-depth=lots"])),
            Err("invalid number in '--max-depth=lots'".to_string())
        );
        assert_eq!(
            parse_options(&args(&["--verbose"])),
            Err("unknown option '--verbose'".to_string())
        );
    }

    #[test]
    fn test_dollar_symbols_are_not_flags() {
        let options = parse_options(&args(&["$s4main3fooyyF"])).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(options.symbols.len(), 1);
    }
}

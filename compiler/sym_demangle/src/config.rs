//! Resource bounds for a single decode.

/// Default cap on input length, in scalars.
pub const DEFAULT_MAX_INPUT_LEN: usize = 8192;

/// Default cap on nesting of recursive productions.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Limits applied to every decode call.
///
/// Mangled names are usually read out of binaries that nobody vetted, so
/// both limits are on by default.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DemangleConfig {
    /// Inputs longer than this are rejected before parsing.
    pub max_input_len: usize,
    /// Recursive productions nest at most this deep. In the current
    /// dialect every node pushed on the name stack is also held to this
    /// height.
    pub max_depth: usize,
}

impl Default for DemangleConfig {
    fn default() -> Self {
        DemangleConfig {
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DemangleConfig {
    #[must_use]
    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DemangleConfig::default();
        assert_eq!(config.max_input_len, 8192);
        assert_eq!(config.max_depth, 1024);
    }

    #[test]
    fn test_builders() {
        let config = DemangleConfig::default()
            .with_max_input_len(16)
            .with_max_depth(2);
        assert_eq!(
            config,
            DemangleConfig {
                max_input_len: 16,
                max_depth: 2
            }
        );
    }
}

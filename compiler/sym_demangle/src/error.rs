//! Decode errors.

use sym_scanner::ScanError;
use thiserror::Error;

/// Why a decode produced no tree.
///
/// The grammar itself only knows one failure, [`Malformed`](Self::Malformed):
/// a missing operand, an unknown production and an out-of-range
/// back-reference all look the same to the caller. The other two variants
/// come from the configured resource bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum DemangleError {
    #[error("malformed mangled name at position {position}")]
    Malformed { position: usize },

    #[error("nesting deeper than {limit} at position {position}")]
    TooDeep { position: usize, limit: usize },

    #[error("input of {length} scalars exceeds the limit of {limit}")]
    TooLong { length: usize, limit: usize },
}

impl DemangleError {
    /// Scalar offset the failure is attributed to.
    ///
    /// An over-long input is rejected before anything is read, so it
    /// reports the first scalar past the limit.
    pub fn position(&self) -> usize {
        match *self {
            DemangleError::Malformed { position } | DemangleError::TooDeep { position, .. } => {
                position
            }
            DemangleError::TooLong { limit, .. } => limit,
        }
    }
}

impl From<ScanError> for DemangleError {
    fn from(err: ScanError) -> Self {
        DemangleError::Malformed {
            position: err.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_errors_become_malformed() {
        let err: DemangleError = ScanError { position: 7 }.into();
        assert_eq!(err, DemangleError::Malformed { position: 7 });
        assert_eq!(err.position(), 7);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DemangleError::Malformed { position: 3 }.to_string(),
            "malformed mangled name at position 3"
        );
        assert_eq!(
            DemangleError::TooDeep { position: 9, limit: 4 }.to_string(),
            "nesting deeper than 4 at position 9"
        );
        assert_eq!(
            DemangleError::TooLong { length: 10, limit: 8 }.to_string(),
            "input of 10 scalars exceeds the limit of 8"
        );
    }

    #[test]
    fn test_too_long_points_past_limit() {
        assert_eq!(DemangleError::TooLong { length: 10, limit: 8 }.position(), 8);
    }
}

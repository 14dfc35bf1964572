//! Standard substitutions.
//!
//! `S` followed by one letter names a well-known standard library
//! declaration without spelling out its module or name. `Sc` followed by a
//! letter does the same for the concurrency library.
//!
//! Also here: the letter code for operator characters, shared by both
//! dialects.

use sym_tree::Kind;

/// One entry of a standard substitution table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StdlibEntry {
    pub kind: Kind,
    pub name: &'static str,
}

const fn entry(kind: Kind, name: &'static str) -> StdlibEntry {
    StdlibEntry { kind, name }
}

/// Entry for `S<code>`.
pub fn standard(code: char) -> Option<StdlibEntry> {
    use Kind::{Enum, Protocol, Structure};
    Some(match code {
        'A' => entry(Structure, "AutoreleasingUnsafeMutablePointer"),
        'a' => entry(Structure, "Array"),
        'b' => entry(Structure, "Bool"),
        'D' => entry(Structure, "Dictionary"),
        'd' => entry(Structure, "Double"),
        'f' => entry(Structure, "Float"),
        'h' => entry(Structure, "Set"),
        'I' => entry(Structure, "DefaultIndices"),
        'i' => entry(Structure, "Int"),
        'J' => entry(Structure, "Character"),
        'N' => entry(Structure, "ClosedRange"),
        'n' => entry(Structure, "Range"),
        'O' => entry(Structure, "ObjectIdentifier"),
        'P' => entry(Structure, "UnsafePointer"),
        'p' => entry(Structure, "UnsafeMutablePointer"),
        'R' => entry(Structure, "UnsafeBufferPointer"),
        'r' => entry(Structure, "UnsafeMutableBufferPointer"),
        'S' => entry(Structure, "String"),
        's' => entry(Structure, "Substring"),
        'u' => entry(Structure, "UInt"),
        'V' => entry(Structure, "UnsafeRawPointer"),
        'v' => entry(Structure, "UnsafeMutableRawPointer"),
        'W' => entry(Structure, "UnsafeRawBufferPointer"),
        'w' => entry(Structure, "UnsafeMutableRawBufferPointer"),

        'q' => entry(Enum, "Optional"),

        'B' => entry(Protocol, "BinaryFloatingPoint"),
        'E' => entry(Protocol, "Encodable"),
        'e' => entry(Protocol, "Decodable"),
        'F' => entry(Protocol, "FloatingPoint"),
        'G' => entry(Protocol, "RandomNumberGenerator"),
        'H' => entry(Protocol, "Hashable"),
        'j' => entry(Protocol, "Numeric"),
        'K' => entry(Protocol, "BidirectionalCollection"),
        'k' => entry(Protocol, "RandomAccessCollection"),
        'L' => entry(Protocol, "Comparable"),
        'l' => entry(Protocol, "Collection"),
        'M' => entry(Protocol, "MutableCollection"),
        'm' => entry(Protocol, "RangeReplaceableCollection"),
        'Q' => entry(Protocol, "Equatable"),
        'T' => entry(Protocol, "Sequence"),
        't' => entry(Protocol, "IteratorProtocol"),
        'U' => entry(Protocol, "UnsignedInteger"),
        'X' => entry(Protocol, "RangeExpression"),
        'x' => entry(Protocol, "Strideable"),
        'Y' => entry(Protocol, "RawRepresentable"),
        'y' => entry(Protocol, "StringProtocol"),
        'Z' => entry(Protocol, "SignedInteger"),
        'z' => entry(Protocol, "BinaryInteger"),
        _ => return None,
    })
}

/// Entry for `Sc<code>`.
pub fn concurrency(code: char) -> Option<StdlibEntry> {
    use Kind::{Class, Protocol, Structure};
    Some(match code {
        'A' => entry(Protocol, "Actor"),
        'C' => entry(Structure, "CheckedContinuation"),
        'c' => entry(Structure, "UnsafeContinuation"),
        'E' => entry(Structure, "CancellationError"),
        'e' => entry(Structure, "UnownedSerialExecutor"),
        'F' => entry(Protocol, "Executor"),
        'f' => entry(Protocol, "SerialExecutor"),
        'G' => entry(Structure, "TaskGroup"),
        'g' => entry(Structure, "ThrowingTaskGroup"),
        'h' => entry(Protocol, "TaskExecutor"),
        'I' => entry(Protocol, "AsyncIteratorProtocol"),
        'i' => entry(Protocol, "AsyncSequence"),
        'J' => entry(Structure, "UnownedJob"),
        'M' => entry(Class, "MainActor"),
        'P' => entry(Structure, "TaskPriority"),
        'S' => entry(Structure, "AsyncStream"),
        's' => entry(Structure, "AsyncThrowingStream"),
        'T' => entry(Structure, "Task"),
        't' => entry(Structure, "UnsafeCurrentTask"),
        _ => return None,
    })
}

/// Entry for the legacy dialect's `S<code>`.
pub fn legacy(code: char) -> Option<StdlibEntry> {
    use Kind::{Enum, Structure};
    Some(match code {
        'a' => entry(Structure, "Array"),
        'b' => entry(Structure, "Bool"),
        'c' => entry(Structure, "UnicodeScalar"),
        'd' => entry(Structure, "Double"),
        'f' => entry(Structure, "Float"),
        'i' => entry(Structure, "Int"),
        'V' => entry(Structure, "UnsafeRawPointer"),
        'v' => entry(Structure, "UnsafeMutableRawPointer"),
        'P' => entry(Structure, "UnsafePointer"),
        'p' => entry(Structure, "UnsafeMutablePointer"),
        'q' => entry(Enum, "Optional"),
        'Q' => entry(Enum, "ImplicitlyUnwrappedOptional"),
        'R' => entry(Structure, "UnsafeBufferPointer"),
        'r' => entry(Structure, "UnsafeMutableBufferPointer"),
        'S' => entry(Structure, "String"),
        'u' => entry(Structure, "UInt"),
        _ => return None,
    })
}

/// Operator character spelled by lowercase `code` in an operator name.
pub fn operator_char(code: char) -> Option<char> {
    Some(match code {
        'a' => '&',
        'c' => '@',
        'd' => '/',
        'e' => '=',
        'g' => '>',
        'l' => '<',
        'm' => '*',
        'n' => '!',
        'o' => '|',
        'p' => '+',
        'q' => '?',
        'r' => '%',
        's' => '-',
        't' => '~',
        'x' => '^',
        'z' => '.',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_size() {
        let count = ('A'..='z').filter_map(standard).count();
        assert_eq!(count, 48);
    }

    #[test]
    fn test_concurrency_table() {
        assert_eq!(concurrency('M'), Some(entry(Kind::Class, "MainActor")));
        assert_eq!(concurrency('z'), None);
    }

    #[test]
    fn test_module_letters_are_not_table_entries() {
        // `So`, `SC` and `Sg` are handled by the grammar, not the table.
        // `Sc` opens the concurrency table.
        assert_eq!(standard('o'), None);
        assert_eq!(standard('c'), None);
        assert_eq!(standard('C'), None);
        assert_eq!(standard('g'), None);
    }

    #[test]
    fn test_operator_chars() {
        let spelled: String = "pseq".chars().filter_map(operator_char).collect();
        assert_eq!(spelled, "+-=?");
        assert_eq!(operator_char('b'), None);
        assert_eq!(operator_char('P'), None);
    }

    #[test]
    fn test_legacy_table() {
        assert_eq!(legacy('Q'), Some(entry(Kind::Enum, "ImplicitlyUnwrappedOptional")));
        assert_eq!(legacy('D'), None);
    }
}

#![allow(clippy::unwrap_used)]

use super::{Cursor, ScanError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn scalars(s: &str) -> Vec<char> {
    s.chars().collect()
}

// === Basic Navigation ===

#[test]
fn peek_does_not_consume() {
    let input = scalars("ab");
    let cursor = Cursor::new(&input);
    assert_eq!(cursor.peek(), Some('a'));
    assert_eq!(cursor.peek(), Some('a'));
    assert_eq!(cursor.pos(), 0);
}

#[test]
fn read_scalar_advances() {
    let input = scalars("xy");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.read_scalar(), Ok('x'));
    assert_eq!(cursor.read_scalar(), Ok('y'));
    assert!(cursor.is_at_end());
    assert_eq!(cursor.read_scalar(), Err(ScanError { position: 2 }));
}

#[test]
fn require_peek_fails_at_end() {
    let input = scalars("");
    let cursor = Cursor::new(&input);
    assert!(cursor.is_empty());
    assert_eq!(cursor.require_peek(), Err(ScanError { position: 0 }));
}

#[test]
fn non_ascii_scalars_count_once() {
    let input = scalars("é🟠z");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.len(), 3);
    assert_eq!(cursor.read_scalars(2), Ok("é🟠".to_string()));
    assert_eq!(cursor.pos(), 2);
}

// === Conditional Consumption ===

#[test]
fn conditional_consumes_only_on_match() {
    let input = scalars("Sx");
    let mut cursor = Cursor::new(&input);
    assert!(!cursor.conditional('x'));
    assert_eq!(cursor.pos(), 0);
    assert!(cursor.conditional('S'));
    assert_eq!(cursor.pos(), 1);
}

#[test]
fn conditional_str_is_all_or_nothing() {
    let input = scalars("_$sab");
    let mut cursor = Cursor::new(&input);
    assert!(!cursor.conditional_str("_$S"));
    assert_eq!(cursor.pos(), 0);
    assert!(cursor.conditional_str("_$s"));
    assert_eq!(cursor.pos(), 3);
}

#[test]
fn conditional_str_past_end_is_false() {
    let input = scalars("_T");
    let mut cursor = Cursor::new(&input);
    assert!(!cursor.conditional_str("_T0"));
    assert_eq!(cursor.pos(), 0);
}

#[test]
fn match_scalar_fails_on_mismatch() {
    let input = scalars("a");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.match_scalar('b'), Err(ScanError { position: 0 }));
    assert_eq!(cursor.match_scalar('a'), Ok(()));
    assert_eq!(cursor.match_scalar('a'), Err(ScanError { position: 1 }));
}

#[test]
fn match_str_leaves_position_on_failure() {
    let input = scalars("_Tt");
    let mut cursor = Cursor::new(&input);
    assert!(cursor.match_str("_TT").is_err());
    assert_eq!(cursor.pos(), 0);
    assert!(cursor.match_str("_Tt").is_ok());
}

#[test]
fn read_with_predicate() {
    let input = scalars("9z");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.read(|c| c.is_ascii_digit()), Ok('9'));
    assert_eq!(cursor.read(|c| c.is_ascii_digit()), Err(ScanError { position: 1 }));
}

// === Counted Reads ===

#[test]
fn read_scalars_exact() {
    let input = scalars("hello");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.read_scalars(3), Ok("hel".to_string()));
    assert_eq!(cursor.remainder(), "lo");
}

#[test]
fn read_scalars_truncated_fails_without_moving() {
    let input = scalars("abc");
    let mut cursor = Cursor::new(&input);
    cursor.skip(1).unwrap();
    assert_eq!(cursor.read_scalars(5), Err(ScanError { position: 1 }));
    assert_eq!(cursor.pos(), 1);
}

#[test]
fn read_scalars_huge_count_does_not_overflow() {
    let input = scalars("abc");
    let mut cursor = Cursor::new(&input);
    assert!(cursor.read_scalars(usize::MAX).is_err());
}

#[test]
fn read_while_may_be_empty() {
    let input = scalars("12ab");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.read_while(|c| c.is_ascii_alphabetic()), "");
    assert_eq!(cursor.read_while(|c| c.is_ascii_digit()), "12");
    assert_eq!(cursor.pos(), 2);
}

#[test]
fn read_until_stops_before_delimiter() {
    let input = scalars("abc_def");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.read_until('_'), Ok("abc".to_string()));
    assert_eq!(cursor.peek(), Some('_'));
    assert!(cursor.read_until('!').is_err());
    assert_eq!(cursor.pos(), 3);
}

// === Integers ===

#[test]
fn read_int_parses_decimal_run() {
    let input = scalars("042x");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.read_int(), Ok(42));
    assert_eq!(cursor.peek(), Some('x'));
    assert_eq!(cursor.read_int(), Err(ScanError { position: 3 }));
}

#[test]
fn conditional_int_saturates_on_overflow() {
    let input = scalars("99999999999999999999999x");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.conditional_int(), Some(u64::MAX));
    assert_eq!(cursor.peek(), Some('x'));
}

#[test]
fn conditional_int_just_past_max_does_not_wrap() {
    // u64::MAX + 2 would wrap to 1.
    let input = scalars("18446744073709551617");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.conditional_int(), Some(u64::MAX));

    let input = scalars("18446744073709551615");
    let mut cursor = Cursor::new(&input);
    assert_eq!(cursor.conditional_int(), Some(u64::MAX));
}

// === Backtracking ===

#[test]
fn backtrack_rewinds() {
    let input = scalars("abcd");
    let mut cursor = Cursor::new(&input);
    cursor.skip(3).unwrap();
    assert_eq!(cursor.backtrack(2), Ok(()));
    assert_eq!(cursor.peek(), Some('b'));
}

#[test]
fn backtrack_past_start_fails() {
    let input = scalars("ab");
    let mut cursor = Cursor::new(&input);
    cursor.skip(1).unwrap();
    assert_eq!(cursor.backtrack(2), Err(ScanError { position: 1 }));
    assert_eq!(cursor.pos(), 1);
}

#[test]
fn skip_past_end_fails() {
    let input = scalars("ab");
    let mut cursor = Cursor::new(&input);
    assert!(cursor.skip(3).is_err());
    assert_eq!(cursor.skip(2), Ok(()));
}

#[test]
fn reset_and_source() {
    let input = scalars("$s3foo");
    let mut cursor = Cursor::new(&input);
    let _ = cursor.remainder();
    assert!(cursor.is_at_end());
    cursor.reset();
    assert_eq!(cursor.pos(), 0);
    assert_eq!(cursor.source(), "$s3foo");
}

// === Properties ===

proptest! {
    #[test]
    fn read_then_backtrack_restores(s in "\\PC{0,40}", n in 0usize..48) {
        let input = scalars(&s);
        let mut cursor = Cursor::new(&input);
        match cursor.read_scalars(n) {
            Ok(text) => {
                prop_assert_eq!(text.chars().count(), n);
                prop_assert_eq!(cursor.pos(), n);
                prop_assert!(cursor.backtrack(n).is_ok());
                prop_assert_eq!(cursor.pos(), 0);
            }
            Err(err) => {
                prop_assert!(n > input.len());
                prop_assert_eq!(err.position, 0);
            }
        }
    }

    #[test]
    fn conditional_int_matches_saturating_parse(digits in "[0-9]{1,30}") {
        let input = scalars(&digits);
        let mut cursor = Cursor::new(&input);
        let expected = digits.parse::<u64>().unwrap_or(u64::MAX);
        prop_assert_eq!(cursor.conditional_int(), Some(expected));
        prop_assert!(cursor.is_at_end());
    }

    #[test]
    fn remainder_concatenates_with_prefix(s in "[a-zA-Z0-9_$]{0,40}", n in 0usize..40) {
        let input = scalars(&s);
        let mut cursor = Cursor::new(&input);
        let prefix = cursor.read_scalars(n.min(input.len())).unwrap_or_default();
        let rest = cursor.remainder();
        prop_assert_eq!(format!("{prefix}{rest}"), s);
    }
}

//! Punycode as used for non-ASCII identifiers.
//!
//! This is RFC 3492 decoding with two changes: the delimiter between the
//! basic code points and the encoded deltas is the *last* `_` instead of
//! `-`, and the digit values 26 to 35 are spelled `A`-`J` instead of `0`-`9`.

const BASE: u64 = 36;
const T_MIN: u64 = 1;
const T_MAX: u64 = 26;
const SKEW: u64 = 38;
const DAMP: u64 = 700;
const INITIAL_BIAS: u64 = 72;
const INITIAL_N: u64 = 128;

/// Value of one encoded digit.
pub(crate) fn digit_value(c: char) -> Option<u64> {
    match c {
        'a'..='z' => Some(u64::from(c) - u64::from('a')),
        'A'..='J' => Some(u64::from(c) - u64::from('A') + 26),
        _ => None,
    }
}

fn adapt(delta: u64, num_points: u64, first_time: bool) -> u64 {
    let mut delta = if first_time { delta / DAMP } else { delta / 2 };
    delta += delta / num_points;
    let mut k = 0;
    while delta > ((BASE - T_MIN) * T_MAX) / 2 {
        delta /= BASE - T_MIN;
        k += BASE;
    }
    k + (BASE * delta) / (delta + SKEW)
}

/// Decode `input`, or `None` if it is not valid punycode.
///
/// Code points that do not form a valid scalar value decode to `.`.
pub fn decode(input: &str) -> Option<String> {
    let (basic, encoded) = match input.rfind('_') {
        Some(delimiter) => (&input[..delimiter], &input[delimiter + 1..]),
        None => ("", input),
    };
    let mut output: Vec<char> = basic.chars().collect();
    let mut digits = encoded.chars().peekable();

    let mut n = INITIAL_N;
    let mut i: u64 = 0;
    let mut bias = INITIAL_BIAS;

    while digits.peek().is_some() {
        let old_i = i;
        let mut weight: u64 = 1;
        let mut k = BASE;
        loop {
            let digit = digit_value(digits.next()?)?;
            i = i.checked_add(digit.checked_mul(weight)?)?;
            let threshold = k.saturating_sub(bias).clamp(T_MIN, T_MAX);
            if digit < threshold {
                break;
            }
            weight = weight.checked_mul(BASE - threshold)?;
            k += BASE;
        }

        let num_points = output.len() as u64 + 1;
        bias = adapt(i - old_i, num_points, old_i == 0);
        n = n.checked_add(i / num_points)?;
        i %= num_points;

        let scalar = u32::try_from(n).ok().and_then(char::from_u32).unwrap_or('.');
        output.insert(usize::try_from(i).ok()?, scalar);
        i += 1;
    }
    Some(output.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_basic_prefix_and_deltas() {
        assert_eq!(decode("Mnchen_Dya").as_deref(), Some("München"));
        assert_eq!(decode("tda").as_deref(), Some("ü"));
    }

    #[test]
    fn test_all_encoded() {
        assert_eq!(
            decode("ihqwcrbEcvIaIdqgAFGpqjye").as_deref(),
            Some("他们为什么不说中文")
        );
    }

    #[test]
    fn test_only_last_underscore_delimits() {
        assert_eq!(decode("a_b_").as_deref(), Some("a_b"));
    }

    #[test]
    fn test_rejects_bad_digits_and_truncation() {
        assert_eq!(decode("Mnchen_D9a"), None);
        assert_eq!(decode("Mnchen_z"), None);
    }

    proptest! {
        #[test]
        fn digit_values_cover_base(c in proptest::char::any()) {
            match digit_value(c) {
                Some(v) => prop_assert!(v < BASE),
                None => prop_assert!(!(c.is_ascii_lowercase() || ('A'..='J').contains(&c))),
            }
        }

        #[test]
        fn decode_never_panics(s in "[a-zA-Z0-9_]{0,24}") {
            let _ = decode(&s);
        }
    }
}

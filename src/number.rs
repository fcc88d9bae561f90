//! The numeric literal sublanguage.
//!
//! [`parse_number`] decides whether a bare token is a number. The parser
//! calls it on every unquoted token; when it returns `None` the token stays
//! a plain string. The accepted grammar:
//!
//! - optional sign (`+` is ignored, `-` is remembered);
//! - the literal specials `NaN` and `Infinity`, signed;
//! - a radix prefix `0x` / `0o` / `0b` selecting base 16 / 8 / 2;
//! - a fractional part and an `e`/`E` exponent, both legal in base 10 only;
//! - any unconsumed character rejects the whole token.
//!
//! The sign is applied to the final magnitude, not to intermediate parts,
//! so `-0` keeps its sign bit.
//!
//! ```rust
//! use dex::parse_number;
//!
//! assert_eq!(parse_number("0o777"), Some(511.0));
//! assert_eq!(parse_number("1.5e3"), Some(1500.0));
//! assert_eq!(parse_number("0x1.8"), None); // fractions need base 10
//! assert_eq!(parse_number("12px"), None);
//! ```

/// Attempts to read `token` as a 64-bit float. Returns `None` if the token
/// is not a valid numeric literal; the caller keeps it as a string.
#[must_use]
pub fn parse_number(token: &str) -> Option<f64> {
    let bytes = token.as_bytes();
    let mut i = 0;

    let mut negative = false;
    match bytes.first() {
        Some(b'-') => {
            negative = true;
            i = 1;
        }
        Some(b'+') => i = 1,
        _ => {}
    }
    if i >= bytes.len() {
        return None;
    }

    match &token[i..] {
        "NaN" => return Some(f64::NAN),
        "Infinity" => {
            return Some(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            })
        }
        _ => {}
    }

    let mut radix = 10u32;
    if bytes[i] == b'0' && i + 1 < bytes.len() {
        match bytes[i + 1] {
            b'x' => {
                radix = 16;
                i += 2;
            }
            b'o' => {
                radix = 8;
                i += 2;
            }
            b'b' => {
                radix = 2;
                i += 2;
            }
            _ => {}
        }
    }

    if radix == 10 {
        parse_decimal(&token[i..]).map(|m| if negative { -m } else { m })
    } else {
        parse_radix(&token[i..], radix).map(|m| if negative { -m } else { m })
    }
}

/// Base-10 magnitude: digits, optional fraction, optional exponent.
///
/// Validation is strict and character-wise; the magnitude itself is read by
/// the standard float parser so decimal literals are correctly rounded.
fn parse_decimal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;

    let digits = |bytes: &[u8], mut i: usize| {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        (i, i > start)
    };

    let (next, saw) = digits(bytes, i);
    if !saw {
        return None;
    }
    i = next;

    if i < bytes.len() && bytes[i] == b'.' {
        let (next, _) = digits(bytes, i + 1);
        i = next;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let (next, saw) = digits(bytes, i);
        if !saw {
            return None;
        }
        i = next;
    }

    if i != bytes.len() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Non-decimal magnitude: plain digit accumulation, no fraction, no
/// exponent.
fn parse_radix(s: &str, radix: u32) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    let mut result = 0f64;
    for c in s.chars() {
        let digit = c.to_digit(radix)?;
        result = result * f64::from(radix) + f64::from(digit);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroes() {
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number("+0"), Some(0.0));
        let neg = parse_number("-0").unwrap();
        assert_eq!(neg, 0.0);
        assert!(neg.is_sign_negative());
    }

    #[test]
    fn specials() {
        assert!(parse_number("NaN").unwrap().is_nan());
        assert_eq!(parse_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_number("+Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
        // Case matters.
        assert_eq!(parse_number("infinity"), None);
        assert_eq!(parse_number("nan"), None);
    }

    #[test]
    fn radix_literals() {
        assert_eq!(parse_number("0xABCDEF"), Some(11259375.0));
        assert_eq!(parse_number("0xabcdef"), Some(11259375.0));
        assert_eq!(parse_number("0b110110001110001"), Some(27761.0));
        assert_eq!(parse_number("0o777"), Some(511.0));
        assert_eq!(parse_number("-0x10"), Some(-16.0));
    }

    #[test]
    fn decimal_with_fraction_and_exponent() {
        assert_eq!(parse_number("12345.6789E-10"), Some(12345.6789e-10));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("2.5e+2"), Some(250.0));
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("3."), Some(3.0));
    }

    #[test]
    fn rejects() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("+"), None);
        assert_eq!(parse_number(".5"), None);
        assert_eq!(parse_number("12px"), None);
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("0xG"), None);
        assert_eq!(parse_number("0o8"), None);
        assert_eq!(parse_number("0b2"), None);
        assert_eq!(parse_number("0x1.8"), None);
        assert_eq!(parse_number("0b1e2"), None);
        assert_eq!(parse_number("1e"), None);
        assert_eq!(parse_number("1e+"), None);
        assert_eq!(parse_number("1 2"), None);
        assert_eq!(parse_number("one"), None);
    }

    #[test]
    fn radix_digits_invalid_for_base_reject_whole_token() {
        // An 8 is not an octal digit; the token must fail, not stop early.
        assert_eq!(parse_number("0o78"), None);
    }
}

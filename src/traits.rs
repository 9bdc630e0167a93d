//! Exact rational helpers shared by the expression engine
//!
//! Every numeric literal is stored as a `BigRational`, so arithmetic inside the
//! symbolic layer never rounds. Floats only appear at the evaluation boundary.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Exact number type used throughout the AST
pub type Rational = BigRational;

/// Tolerance for comparisons made on evaluated (f64) values
pub(crate) const FLOAT_TOLERANCE: f64 = 1e-10;

/// Largest trial divisor used when pulling perfect powers out of a radicand
const ROOT_TRIAL_LIMIT: u64 = 10_000;

/// Exponents above this are left unevaluated instead of expanding huge integers
pub(crate) const MAX_EXACT_EXPONENT: u32 = 4096;

#[inline]
pub fn int(n: i64) -> Rational {
    Rational::from_integer(BigInt::from(n))
}

#[inline]
pub fn ratio(numer: i64, denom: i64) -> Rational {
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

#[inline]
pub(crate) fn to_f64(r: &Rational) -> f64 {
    r.to_f64().unwrap_or(f64::NAN)
}

/// Return the value as `i64` if it is an integer that fits
pub(crate) fn as_small_int(r: &Rational) -> Option<i64> {
    if r.is_integer() { r.numer().to_i64() } else { None }
}

/// Parse a decimal literal (`12`, `0.25`, `.5`, `3e-2`, `1.5E3`) into an exact rational
pub fn parse_decimal(text: &str) -> Option<Rational> {
    let text = text.trim();
    let (body, negative) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text.strip_prefix('+').unwrap_or(text), false),
    };
    if body.is_empty() {
        return None;
    }

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => {
            let exp: i32 = body[idx + 1..].parse().ok()?;
            (&body[..idx], exp)
        }
        None => (body, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    let numer: BigInt = digits.parse().ok()?;
    let scale = exponent - i32::try_from(frac_part.len()).ok()?;
    if scale.unsigned_abs() > MAX_EXACT_EXPONENT {
        return None;
    }
    let ten = BigInt::from(10);
    let value = if scale >= 0 {
        Rational::from_integer(numer * num_traits::pow(ten, scale.unsigned_abs() as usize))
    } else {
        Rational::new(numer, num_traits::pow(ten, scale.unsigned_abs() as usize))
    };

    Some(if negative { -value } else { value })
}

/// Convert a float coming from a UI number widget into the shortest exact rational
/// that prints the same (`0.1` becomes `1/10`, not the binary expansion)
pub fn rational_from_f64(value: f64) -> Option<Rational> {
    if !value.is_finite() {
        return None;
    }
    parse_decimal(&format!("{value}"))
}

/// Raise a rational to an integer power exactly
pub(crate) fn pow_int(base: &Rational, exp: i64) -> Option<Rational> {
    let magnitude = u32::try_from(exp.unsigned_abs()).ok()?;
    if magnitude > MAX_EXACT_EXPONENT {
        return None;
    }
    if exp < 0 && base.is_zero() {
        return None;
    }
    let numer = num_traits::pow(base.numer().clone(), magnitude as usize);
    let denom = num_traits::pow(base.denom().clone(), magnitude as usize);
    let raised = Rational::new(numer, denom);
    Some(if exp < 0 { raised.recip() } else { raised })
}

/// Split a positive integer `n` into `(outside, inside)` with `n = outside^k * inside`
/// and `inside` free of small perfect k-th powers
pub(crate) fn extract_root(n: &BigInt, k: u32) -> (BigInt, BigInt) {
    if n.is_zero() || n.is_one() || k <= 1 {
        return (n.clone(), BigInt::one());
    }

    // Whole-number root first: cheap and covers sqrt(144) style literals
    let root = n.nth_root(k);
    if num_traits::pow(root.clone(), k as usize) == *n {
        return (root, BigInt::one());
    }

    let mut outside = BigInt::one();
    let mut inside = n.clone();
    let mut factor: u64 = 2;
    while factor <= ROOT_TRIAL_LIMIT {
        let f = BigInt::from(factor);
        let fk = num_traits::pow(f.clone(), k as usize);
        if fk > inside {
            break;
        }
        while inside.is_multiple_of(&fk) {
            inside /= &fk;
            outside *= &f;
        }
        factor += 1;
    }

    let rest = inside.nth_root(k);
    if !rest.is_one() && num_traits::pow(rest.clone(), k as usize) == inside {
        outside *= rest;
        inside = BigInt::one();
    }
    (outside, inside)
}

/// All positive divisors of `n`, or `None` when `n` exceeds the search bound
pub(crate) fn divisors(n: &BigInt, limit: u64) -> Option<Vec<BigInt>> {
    let n = n.abs();
    let value = n.to_u64()?;
    if value == 0 || value > limit.saturating_mul(limit) {
        return None;
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d: u64 = 1;
    while d * d <= value {
        if value % d == 0 {
            small.push(BigInt::from(d));
            if d * d != value {
                large.push(BigInt::from(value / d));
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    Some(small)
}

/// Least common multiple of the denominators of `values`
pub(crate) fn denominator_lcm<'a>(values: impl IntoIterator<Item = &'a Rational>) -> BigInt {
    values
        .into_iter()
        .fold(BigInt::one(), |acc, v| acc.lcm(v.denom()))
}

/// Check if a float is approximately zero (within tolerance)
#[inline]
pub(crate) fn is_zero_f64(n: f64) -> bool {
    n.abs() < FLOAT_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!(parse_decimal("12"), Some(int(12)));
        assert_eq!(parse_decimal("0.25"), Some(ratio(1, 4)));
        assert_eq!(parse_decimal(".5"), Some(ratio(1, 2)));
        assert_eq!(parse_decimal("3e-2"), Some(ratio(3, 100)));
        assert_eq!(parse_decimal("1.5E3"), Some(int(1500)));
        assert_eq!(parse_decimal(" -4 "), Some(int(-4)));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("."), None);
        assert_eq!(parse_decimal("1.2.3"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_rational_from_f64_is_shortest() {
        assert_eq!(rational_from_f64(0.1), Some(ratio(1, 10)));
        assert_eq!(rational_from_f64(2.0), Some(int(2)));
        assert_eq!(rational_from_f64(f64::NAN), None);
    }

    #[test]
    fn test_extract_root() {
        let (out, inside) = extract_root(&BigInt::from(8), 2);
        assert_eq!((out, inside), (BigInt::from(2), BigInt::from(2)));

        let (out, inside) = extract_root(&BigInt::from(144), 2);
        assert_eq!((out, inside), (BigInt::from(12), BigInt::from(1)));

        let (out, inside) = extract_root(&BigInt::from(54), 3);
        assert_eq!((out, inside), (BigInt::from(3), BigInt::from(2)));

        let (out, inside) = extract_root(&BigInt::from(7), 2);
        assert_eq!((out, inside), (BigInt::from(1), BigInt::from(7)));
    }

    #[test]
    fn test_pow_int() {
        assert_eq!(pow_int(&ratio(2, 3), 2), Some(ratio(4, 9)));
        assert_eq!(pow_int(&int(2), -3), Some(ratio(1, 8)));
        assert_eq!(pow_int(&int(0), -1), None);
    }

    #[test]
    fn test_divisors() {
        let ds: Vec<i64> = divisors(&BigInt::from(12), 1000)
            .unwrap()
            .iter()
            .map(|d| d.to_i64().unwrap())
            .collect();
        assert_eq!(ds, vec![1, 2, 3, 4, 6, 12]);
        assert!(divisors(&BigInt::from(0), 1000).is_none());
    }
}

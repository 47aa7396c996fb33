pub const SIGNIFICANT_DIGITS: i32 = 10;

/// Renders `value` the way `%.10g` does: ten significant digits, trailing
/// zeros kept, plain notation for decimal exponents in `[-4, 10)` and
/// `d.ddddddddde±XX` otherwise.
pub fn format_significant(value: f64) -> String {
    if value.is_nan() {
        return String::from("NaN");
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    // the exponent is taken after rounding, so 9.9999999999 becomes 10.00000000
    if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        format!("{:.*}", decimals, value)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

/// Rounds `value` to what `format_significant` would print.
pub fn round_significant(value: f64) -> f64 {
    format_significant(value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_notation() {
        let cases = vec![
            (4.0, "4.000000000"),
            (0.0, "0.000000000"),
            (-2.5, "-2.500000000"),
            (1.0 / 3.0, "0.3333333333"),
            (123456.789, "123456.7890"),
            (0.0001, "0.0001000000000"),
            (9.99999999996, "10.00000000"),
            (1234567890.4, "1234567890"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_significant(value), expected, "formatting {value}");
        }
    }

    #[test]
    fn test_scientific_notation() {
        let cases = vec![
            (1e10, "1.000000000e+10"),
            (-6e-5, "-6.000000000e-05"),
            (1.5e-7, "1.500000000e-07"),
            (2.5e120, "2.500000000e+120"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_significant(value), expected, "formatting {value}");
        }
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_significant(f64::NAN), "NaN");
        assert_eq!(format_significant(f64::INFINITY), "Infinity");
        assert_eq!(format_significant(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(1.0 / 3.0), 0.3333333333);
        assert_eq!(round_significant(2.0), 2.0);
    }
}

const DEFAULT_FRACTION_DIGITS: usize = 3;

/// en-US style formatting: thousands separators, and either a fixed number of
/// fraction digits or up to three with trailing zeros dropped.
pub fn to_locale_string(value: f64, decimals: Option<usize>) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = match decimals {
        Some(decimals) => format!("{:.*}", decimals, value),
        None => trim_fraction(format!("{:.*}", DEFAULT_FRACTION_DIGITS, value)),
    };

    group_thousands(&fixed)
}

/// Same as [`to_locale_string`] for decimal strings such as `priceUsd`.
pub fn str_to_locale_string(value: &str, decimals: Option<usize>) -> String {
    match value.trim().parse::<f64>() {
        Ok(n) => to_locale_string(n, decimals),
        Err(_) => f64::NAN.to_string(),
    }
}

pub fn to_short_number(value: f64, decimals: usize) -> String {
    if value > 1e9 {
        format!("{}B", to_locale_string(value / 1e9, Some(decimals)))
    } else if value > 1e6 {
        format!("{}M", to_locale_string(value / 1e6, Some(decimals)))
    } else if value > 1e3 {
        format!("{}K", to_locale_string(value / 1e3, Some(decimals)))
    } else {
        to_locale_string(value, Some(decimals))
    }
}

fn trim_fraction(fixed: String) -> String {
    if !fixed.contains('.') {
        return fixed;
    }

    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };
    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3);

    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[test]
fn test_to_locale_string_default_digits() {
    assert_eq!(to_locale_string(1234567.891234, None), "1,234,567.891");
    assert_eq!(to_locale_string(1000.5, None), "1,000.5");
    assert_eq!(to_locale_string(999.0, None), "999");
    assert_eq!(to_locale_string(-1234.0, None), "-1,234");
    assert_eq!(to_locale_string(0.00002, None), "0");
}

#[test]
fn test_to_locale_string_fixed_digits() {
    assert_eq!(to_locale_string(1234.5, Some(2)), "1,234.50");
    assert_eq!(to_locale_string(8.4, Some(0)), "8");
    assert_eq!(to_locale_string(123456.0, Some(0)), "123,456");
}

#[test]
fn test_str_to_locale_string() {
    assert_eq!(str_to_locale_string("12345.6789", None), "12,345.679");
    assert_eq!(str_to_locale_string("not a number", None), "NaN");
}

#[test]
fn test_to_short_number() {
    assert_eq!(to_short_number(8_400_000_000.0, 0), "8B");
    assert_eq!(to_short_number(12_500_000.0, 1), "12.5M");
    assert_eq!(to_short_number(45_300.0, 0), "45K");
    assert_eq!(to_short_number(999.0, 0), "999");
    assert_eq!(to_short_number(1_000.0, 0), "1,000");
}

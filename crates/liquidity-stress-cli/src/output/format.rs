use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;

const BILLION: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Decimals arrive as JSON strings; accept plain numbers too.
pub fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// `$12,345.68 bn`
pub fn fmt_bn(amount: Decimal) -> String {
    let scaled = (amount / BILLION).round_dp(2);
    let sign = if scaled.is_sign_negative() && !scaled.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", scaled.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}${}.{} bn", sign, group_thousands(whole), frac)
}

/// `0.36` → `0.36x`
pub fn fmt_ratio(rate: Decimal) -> String {
    format!("{:.2}x", rate.round_dp(2))
}

/// `0.64` → `64.00%`
pub fn fmt_pct(rate: Decimal) -> String {
    format!("{:.2}%", (rate * dec!(100)).round_dp(2))
}

/// Money-valued JSON field in billions, or the raw text when not numeric.
pub fn money_cell(value: &Value) -> String {
    decimal_of(value).map(fmt_bn).unwrap_or_else(|| scalar(value))
}

/// Plain rendering of any JSON value for a table cell.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fmt_bn() {
        assert_eq!(fmt_bn(Decimal::from(9_000_000_000i64)), "$9.00 bn");
        assert_eq!(fmt_bn(Decimal::from(29_750_000_000i64)), "$29.75 bn");
        assert_eq!(fmt_bn(Decimal::from(1_234_567_000_000_000i64)), "$1,234,567.00 bn");
        assert_eq!(fmt_bn(Decimal::ZERO), "$0.00 bn");
        assert_eq!(fmt_bn(Decimal::from(-2_500_000_000i64)), "-$2.50 bn");
    }

    #[test]
    fn test_ratio_and_pct() {
        assert_eq!(fmt_ratio(dec!(0.36)), "0.36x");
        assert_eq!(fmt_ratio(Decimal::ONE), "1.00x");
        assert_eq!(fmt_pct(dec!(0.64)), "64.00%");
    }

    #[test]
    fn test_decimal_of_string_and_number() {
        assert_eq!(decimal_of(&Value::String("12.5".into())), Some(dec!(12.5)));
        assert_eq!(decimal_of(&serde_json::json!(3)), Some(dec!(3)));
        assert_eq!(decimal_of(&Value::Bool(true)), None);
    }

    #[test]
    fn test_money_cell_falls_back_to_text() {
        assert_eq!(money_cell(&Value::String("n/a".into())), "n/a");
    }
}

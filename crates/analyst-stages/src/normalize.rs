//! Normalization of judgment payload values
//!
//! Providers answer with whatever a model produced: `0.12`, `"12%"`,
//! `"16.0-16.5"`, `[16.0, 16.5]`. These helpers fold every accepted
//! spelling into the canonical numeric forms of the data model.

use serde_json::Value;

/// Read a plain number, tolerating `"$31.2"`/`"31,200"` string spellings
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Read a fractional change, normalizing percent strings: `"12%"` → `0.12`
pub fn as_fraction(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Some(percent) = trimmed.strip_suffix('%') {
                parse_numeric(percent).map(|n| n / 100.0)
            } else {
                parse_numeric(trimmed)
            }
        }
        _ => None,
    }
}

/// Read a `[low, high]` range, accepting two-element arrays and range
/// strings: `"16.0-16.5"` → `[16.0, 16.5]`
pub fn as_range(value: Option<&Value>) -> Option<[f64; 2]> {
    match value? {
        Value::Array(items) => {
            if items.len() != 2 {
                return None;
            }
            let low = as_number(items.first())?;
            let high = as_number(items.get(1))?;
            Some([low, high])
        }
        Value::String(s) => parse_range(s),
        _ => None,
    }
}

fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse::<f64>()
        .ok()
}

fn parse_range(raw: &str) -> Option<[f64; 2]> {
    let cleaned = raw.trim();
    let (low, high) = cleaned
        .split_once(" to ")
        .or_else(|| cleaned.split_once('-'))
        .or_else(|| cleaned.split_once('–'))?;
    Some([parse_numeric(low)?, parse_numeric(high)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_number_accepts_spellings() {
        assert_eq!(as_number(Some(&json!(31.2))), Some(31.2));
        assert_eq!(as_number(Some(&json!("$31.2"))), Some(31.2));
        assert_eq!(as_number(Some(&json!("31,200"))), Some(31200.0));
        assert_eq!(as_number(Some(&json!(null))), None);
        assert_eq!(as_number(None), None);
    }

    #[test]
    fn test_as_fraction_normalizes_percent_strings() {
        assert_eq!(as_fraction(Some(&json!("12%"))), Some(0.12));
        assert_eq!(as_fraction(Some(&json!("-8%"))), Some(-0.08));
        assert_eq!(as_fraction(Some(&json!(0.12))), Some(0.12));
        assert_eq!(as_fraction(Some(&json!("0.12"))), Some(0.12));
    }

    #[test]
    fn test_as_range_from_array() {
        assert_eq!(as_range(Some(&json!([16.0, 16.5]))), Some([16.0, 16.5]));
        assert_eq!(as_range(Some(&json!([16.0]))), None);
    }

    #[test]
    fn test_as_range_from_string() {
        assert_eq!(as_range(Some(&json!("16.0-16.5"))), Some([16.0, 16.5]));
        assert_eq!(as_range(Some(&json!("$16.0-$16.5"))), Some([16.0, 16.5]));
        assert_eq!(as_range(Some(&json!("16.0 to 16.5"))), Some([16.0, 16.5]));
        assert_eq!(as_range(Some(&json!("16.0"))), None);
    }
}

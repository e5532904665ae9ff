//! Lenient field deserializers for extractor payloads.
//!
//! The extractor is a language model: numbers arrive as floats or strings,
//! enum labels vary in case, and optional fields come back as garbage. These
//! helpers turn anything unusable into "absent" instead of failing the whole
//! record, so a single bad field never discards an otherwise valid entry.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Optional field: unusable values become `None`.
pub fn field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Nullable field for partial updates.
///
/// Pair with `#[serde(default)]`: absent → `None` (keep prior value),
/// explicit `null` → `Some(None)` (clear), valid value → `Some(Some(v))`.
/// Unusable values are treated as absent.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(Some(None));
    }
    Ok(serde_json::from_value(value).ok().map(Some))
}

/// Nullable day count (cycle lengths), accepting floats and numeric strings.
pub fn nullable_days<'de, D>(deserializer: D) -> Result<Option<Option<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(Some(None));
    }
    Ok(as_days(&value).map(Some))
}

/// Optional positive day count.
pub fn days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_days))
}

/// Optional 1-10 scale (severity, intensity). Out-of-range values are
/// clamped into the scale.
pub fn scale<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(as_number)
        .map(|n| n.round().clamp(1.0, 10.0) as u8))
}

/// Optional non-negative finite quantity (millilitres, minutes, hours).
pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_number).filter(|n| *n >= 0.0))
}

/// List of strings; non-string entries are skipped, non-lists become empty.
pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn as_days(value: &Value) -> Option<u32> {
    as_number(value)
        .filter(|n| *n >= 1.0 && *n <= 366.0)
        .map(|n| n.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "scale")]
        severity: Option<u8>,
        #[serde(default, deserialize_with = "amount")]
        water: Option<f64>,
        #[serde(default, deserialize_with = "nullable_days")]
        length: Option<Option<u32>>,
        #[serde(default, deserialize_with = "strings")]
        tags: Vec<String>,
    }

    fn probe(value: serde_json::Value) -> Probe {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn scale_rounds_and_clamps() {
        assert_eq!(probe(serde_json::json!({"severity": 7.4})).severity, Some(7));
        assert_eq!(probe(serde_json::json!({"severity": 42})).severity, Some(10));
        assert_eq!(probe(serde_json::json!({"severity": 0})).severity, Some(1));
        assert_eq!(probe(serde_json::json!({"severity": "6"})).severity, Some(6));
        assert_eq!(probe(serde_json::json!({"severity": "bad"})).severity, None);
    }

    #[test]
    fn amount_rejects_negative() {
        assert_eq!(probe(serde_json::json!({"water": -5})).water, None);
        assert_eq!(probe(serde_json::json!({"water": 2500})).water, Some(2500.0));
    }

    #[test]
    fn nullable_distinguishes_absent_from_null() {
        assert_eq!(probe(serde_json::json!({})).length, None);
        assert_eq!(probe(serde_json::json!({"length": null})).length, Some(None));
        assert_eq!(probe(serde_json::json!({"length": 28.0})).length, Some(Some(28)));
        assert_eq!(probe(serde_json::json!({"length": "soon"})).length, None);
    }

    #[test]
    fn strings_skip_non_strings() {
        let p = probe(serde_json::json!({"tags": ["work", 3, "", "deadline"]}));
        assert_eq!(p.tags, vec!["work", "deadline"]);
        assert!(probe(serde_json::json!({"tags": 12})).tags.is_empty());
    }
}

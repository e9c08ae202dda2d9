// Defensive decoding for vendor counters and flags.
//
// Vendors disagree on how they encode numbers: RouterOS sends every value
// as a string, the firewall appliance mixes numbers and strings, and
// fields go missing or `null` whenever an interface has never carried
// traffic. Counters always decode to a `u64`, falling back to 0.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret any JSON value as a counter. Unusable input becomes 0.
pub fn counter_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(float_to_u64))
            .unwrap_or(0),
        Value::String(s) => parse_counter(s),
        _ => 0,
    }
}

/// Parse a counter from text, accepting surrounding whitespace and a
/// fractional part. Anything else becomes 0.
pub fn parse_counter(raw: &str) -> u64 {
    let trimmed = raw.trim();
    trimmed.parse::<u64>().unwrap_or_else(|_| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map_or(0, float_to_u64)
    })
}

/// Interpret a JSON value as a flag: booleans, `"true"`/`"false"`,
/// `"yes"`/`"no"`, `"1"`/`"0"`, `"on"`/`"off"`, and numbers.
pub fn flag_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" | "enabled" => Some(true),
            "false" | "no" | "0" | "off" | "disabled" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn float_to_u64(f: f64) -> u64 {
    // Saturating cast; callers already reject negatives and non-finite input.
    f.trunc() as u64
}

/// `#[serde(deserialize_with = "lenient::counter", default)]`
pub fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0, counter_from_value))
}

/// `#[serde(deserialize_with = "lenient::flag", default)]`
pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(flag_from_value))
}

/// `#[serde(deserialize_with = "lenient::nullable", default)]`
///
/// Treats an explicit `null` the same as a missing field.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `#[serde(deserialize_with = "lenient::text", default)]`
///
/// Accepts strings and numbers (ports, ids) and renders them as text.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

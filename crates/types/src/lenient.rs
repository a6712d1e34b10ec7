//! Tolerant deserializers for backend records.
//!
//! The backend stores form values verbatim, so the same field can come back
//! as a string in one record and a number in the next (`fCnt`, `port`,
//! `rx1Delay`, ...). These helpers accept either shape and treat `null` as the
//! field default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string, number, bool or null and produce a `String`.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    })
}

/// Accept a number, a numeric string, or null and produce a `u32`.
///
/// Values that cannot be interpreted fall back to zero.
pub fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_u32(deserializer)?.unwrap_or_default())
}

/// Accept a number, a numeric string, or null and produce an `Option<u32>`.
pub fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_u64().and_then(|raw| u32::try_from(raw).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    })
}

/// Accept a number, a numeric string, or null and produce an `Option<f64>`.
pub fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Accept a bool, null, or the strings `"true"`/`"false"`.
pub fn bool_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::String(text) => text.eq_ignore_ascii_case("true"),
        Value::Number(number) => number.as_i64().is_some_and(|raw| raw != 0),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "super::string")]
        port: String,
        #[serde(default, deserialize_with = "super::u32_or_zero")]
        count: u32,
        #[serde(default, deserialize_with = "super::optional_f64")]
        altitude: Option<f64>,
        #[serde(default, deserialize_with = "super::bool_or_false")]
        active: bool,
    }

    #[test]
    fn numbers_and_strings_are_interchangeable() {
        let sample: Sample = serde_json::from_str(r#"{"port": 1701, "count": "12", "altitude": "3.5", "active": "true"}"#).unwrap();
        assert_eq!(sample.port, "1701");
        assert_eq!(sample.count, 12);
        assert_eq!(sample.altitude, Some(3.5));
        assert!(sample.active);
    }

    #[test]
    fn nulls_and_missing_fields_fall_back_to_defaults() {
        let sample: Sample = serde_json::from_str(r#"{"port": null, "count": "n/a"}"#).unwrap();
        assert_eq!(sample.port, "");
        assert_eq!(sample.count, 0);
        assert_eq!(sample.altitude, None);
        assert!(!sample.active);
    }
}

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

/// Deserialize an optional numeric field that may arrive as a JSON number, a numeric string, or
/// something unusable. Anything that does not yield a finite `f64` is treated as missing.
pub fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_f64))
}

/// Deserialize an optional unix-seconds timestamp with the same leniency as [`de_lenient_f64`].
///
/// Fractional seconds are truncated.
pub fn de_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_i64))
}

/// Deserialize a series of records, skipping any element that is not a valid record.
///
/// A series that is `null` or not an array at all is treated as empty.
pub fn de_lenient_series<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(records)) = value else {
        return Ok(Vec::new());
    };

    Ok(records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(record) => Some(record),
            Err(error) => {
                debug!(%error, "skipping malformed series record");
                None
            }
        })
        .collect())
}

fn lenient_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>()
                .ok()
                .or_else(|| lenient_f64(&Value::String(raw.to_string())).map(|f| f as i64))
        }
        _ => None,
    }
}

//! Lenient decoding of upstream JSON.
//!
//! Aggregates come back from PostgREST as `numeric`, which may be encoded as a
//! JSON number or a string, and the Django API passes raw `DecimalField`
//! values through. Anything that is not a usable number decodes to `None`.

use chrono::NaiveDate;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use super::error::{ErrorContext, SourceError, SourceResult};

/// Check the status, read the body and decode it as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    context: ErrorContext,
) -> SourceResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SourceError::from_reqwest(e, context.clone()))?;

    if !status.is_success() {
        return Err(SourceError::query(
            status.as_u16(),
            format!("upstream returned {}: {}", status, body.trim()),
            context,
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        let snippet: String = body.chars().take(200).collect();
        SourceError::decode(e.to_string(), context.with_details(snippet))
    })
}

fn number_from_str(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok()
}

/// `1.5`, `"1.5"`, `"4,50 €"` → `Some`; `null`, `"n/a"`, objects → `None`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => number_from_str(&s),
        _ => None,
    })
}

/// Non-negative counts; anything unusable decodes to 0.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(match value {
        Some(v) if v.is_finite() && v >= 0.0 => v.min(u32::MAX as f64) as u32,
        _ => 0,
    })
}

/// `YYYY-MM-DD`, optionally followed by a time component.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

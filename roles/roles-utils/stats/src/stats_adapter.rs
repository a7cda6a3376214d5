use display_utils::parse_float;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A metric value as the pool's stats endpoint sends it: sometimes a JSON
/// number, sometimes text with units or grouping attached. Anything else
/// (booleans, objects, arrays) is kept as-is so one odd field never sinks
/// the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl RawValue {
    /// Numeric reading of the value; text is read up to its first non-numeric character.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(text) => parse_float(text),
            RawValue::Other(_) => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// The value as shown to the user, or `None` when it carries nothing
    /// worth showing (empty text or a numeric zero).
    pub fn shown(&self) -> Option<String> {
        match self {
            RawValue::Number(n) if *n == 0.0 || n.is_nan() => None,
            RawValue::Text(text) if text.is_empty() => None,
            RawValue::Other(Value::Null | Value::Bool(false)) => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(text) => f.write_str(text),
            RawValue::Other(value) => write!(f, "{}", value),
        }
    }
}

/// One response from the solo pool stats endpoint for a single address.
///
/// Field names on the wire follow the endpoint's JSON; every field is optional
/// because the endpoint omits what it cannot compute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    #[serde(default, rename = "workers", skip_serializing_if = "Option::is_none")]
    pub worker_count: Option<RawValue>,
    #[serde(default, rename = "shares", skip_serializing_if = "Option::is_none")]
    pub share_count: Option<RawValue>,
    #[serde(default, rename = "lastBlock", skip_serializing_if = "Option::is_none")]
    pub last_block_height: Option<RawValue>,
    #[serde(default, rename = "hashrate1hr", skip_serializing_if = "Option::is_none")]
    pub hashrate_1hr: Option<RawValue>,
    #[serde(default, rename = "hashrate5m", skip_serializing_if = "Option::is_none")]
    pub hashrate_5m: Option<RawValue>,
    #[serde(default, rename = "chancePerBlock", skip_serializing_if = "Option::is_none")]
    pub chance_per_block: Option<RawValue>,
    #[serde(default, rename = "chancePerDay", skip_serializing_if = "Option::is_none")]
    pub chance_per_day: Option<RawValue>,
    #[serde(default, rename = "timeEstimate", skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<RawValue>,
    #[serde(default, rename = "bestshare", skip_serializing_if = "Option::is_none")]
    pub best_share: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<RawValue>,
}

/// Read a text field, taking numbers as their decimal text and dropping
/// anything else rather than failing the record.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl MetricRecord {
    /// Best share difficulty, if the endpoint reported a readable number.
    pub fn best_share(&self) -> Option<f64> {
        self.best_share.as_ref().and_then(RawValue::as_f64)
    }

    /// Network difficulty, if the endpoint reported a readable number.
    pub fn difficulty(&self) -> Option<f64> {
        self.difficulty.as_ref().and_then(RawValue::as_f64)
    }

    pub fn worker_count(&self) -> Option<f64> {
        self.worker_count.as_ref().and_then(RawValue::as_f64)
    }

    /// Every field that is present, as `(wire name, raw text)` in wire order.
    pub fn wire_fields(&self) -> Vec<(&'static str, String)> {
        let raw = |value: &Option<RawValue>| value.as_ref().map(RawValue::to_string);

        [
            ("address", self.address.clone()),
            ("workers", raw(&self.worker_count)),
            ("shares", raw(&self.share_count)),
            ("lastBlock", raw(&self.last_block_height)),
            ("hashrate1hr", raw(&self.hashrate_1hr)),
            ("hashrate5m", raw(&self.hashrate_5m)),
            ("chancePerBlock", raw(&self.chance_per_block)),
            ("chancePerDay", raw(&self.chance_per_day)),
            ("timeEstimate", raw(&self.time_estimate)),
            ("bestshare", raw(&self.best_share)),
            ("difficulty", raw(&self.difficulty)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

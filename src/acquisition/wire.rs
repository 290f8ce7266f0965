//! Wire formats of the device-cloud API and raw-to-physical value scaling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{LogEntry, LogPage, StatusReading};

/// Common response wrapper: `{ success, code?, msg?, result? }`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub msg: Option<String>,
    pub result: Option<T>,
}

/// Report-logs result body.
#[derive(Debug, Deserialize)]
pub struct RawLogPage {
    #[serde(default)]
    pub logs: Vec<RawLog>,
    #[serde(default)]
    pub last_row_key: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// One log row as the device reports it. `value` is usually a numeric
/// string, occasionally a number or a boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLog {
    pub code: String,
    pub event_time: i64,
    pub value: serde_json::Value,
}

/// One device-status row.
#[derive(Debug, Deserialize)]
pub struct RawStatus {
    pub code: String,
    pub value: serde_json::Value,
}

/// Parses a wire value as a finite number.
pub fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Raw-to-physical divisors per metric code; codes without an entry pass
/// through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueScaling {
    divisors: BTreeMap<String, f64>,
}

impl ValueScaling {
    pub fn new(divisors: BTreeMap<String, f64>) -> Self {
        Self { divisors }
    }

    pub fn apply(&self, code: &str, raw: f64) -> f64 {
        match self.divisors.get(code) {
            Some(divisor) => raw / divisor,
            None => raw,
        }
    }

    /// Converts a raw log to a physical-unit entry; non-numeric values
    /// yield `None`.
    pub fn log_entry(&self, raw: &RawLog) -> Option<LogEntry> {
        let Some(value) = numeric_value(&raw.value) else {
            tracing::debug!(code = %raw.code, event_time = raw.event_time, "Skipping non-numeric log value");
            return None;
        };
        Some(LogEntry {
            code: raw.code.clone(),
            event_time: raw.event_time,
            value: self.apply(&raw.code, value),
        })
    }

    pub fn status_reading(&self, raw: &RawStatus) -> Option<StatusReading> {
        numeric_value(&raw.value).map(|value| StatusReading {
            code: raw.code.clone(),
            value: self.apply(&raw.code, value),
        })
    }

    pub fn page(&self, raw: RawLogPage) -> LogPage {
        LogPage {
            entries: raw.logs.iter().filter_map(|l| self.log_entry(l)).collect(),
            next_cursor: raw.last_row_key.unwrap_or_default(),
            has_more: raw.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scaling() -> ValueScaling {
        ValueScaling::new(BTreeMap::from([("va_temperature".to_string(), 10.0)]))
    }

    #[test]
    fn test_numeric_value_variants() {
        assert_eq!(numeric_value(&json!("245")), Some(245.0));
        assert_eq!(numeric_value(&json!(" 61 ")), Some(61.0));
        assert_eq!(numeric_value(&json!(12.5)), Some(12.5));
        assert_eq!(numeric_value(&json!(true)), None);
        assert_eq!(numeric_value(&json!("NaN")), None);
        assert_eq!(numeric_value(&json!("off")), None);
    }

    #[test]
    fn test_temperature_divided_by_ten() {
        let raw = RawLog {
            code: "va_temperature".into(),
            event_time: 1,
            value: json!("245"),
        };
        assert_eq!(scaling().log_entry(&raw).map(|e| e.value), Some(24.5));
    }

    #[test]
    fn test_unscaled_code_passes_through() {
        let raw = RawLog {
            code: "va_humidity".into(),
            event_time: 1,
            value: json!("61"),
        };
        assert_eq!(scaling().log_entry(&raw).map(|e| e.value), Some(61.0));
    }

    #[test]
    fn test_page_decoding() {
        let body = json!({
            "success": true,
            "result": {
                "logs": [
                    {"code": "va_temperature", "event_time": 1_700_000_000_000_i64, "value": "231"},
                    {"code": "switch", "event_time": 1_700_000_000_000_i64, "value": true}
                ],
                "last_row_key": "abc",
                "has_more": true
            }
        });
        let envelope: ApiEnvelope<RawLogPage> = serde_json::from_value(body).unwrap();
        assert!(envelope.success);
        let page = scaling().page(envelope.result.unwrap());
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].value, 23.1);
        assert_eq!(page.next_cursor, "abc");
        assert!(page.has_more);
    }
}

//! Snapshot Decoding
//!
//! Turns a snapshot's raw field map into typed cache entries.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SyncError;

// == Mismatch Policy ==
/// What to do with a field whose value cannot be decoded as the cache's value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Reject the whole snapshot and end the subscription
    #[default]
    FailFast,
    /// Drop the field with a warning and keep the rest of the snapshot
    SkipAndLog,
}

impl FromStr for MismatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" | "abort" => Ok(Self::FailFast),
            "skip" | "skip-and-log" => Ok(Self::SkipAndLog),
            other => Err(format!("unknown mismatch policy '{}'", other)),
        }
    }
}

impl fmt::Display for MismatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => f.write_str("fail-fast"),
            Self::SkipAndLog => f.write_str("skip"),
        }
    }
}

// == Decode Fields ==
/// Decodes every field of `data` as a `V`.
///
/// The whole map is decoded before anything is returned, so under
/// [`MismatchPolicy::FailFast`] a bad field means no entry of the snapshot
/// reaches the cache.
pub fn decode_fields<V>(
    document: &str,
    data: Map<String, Value>,
    policy: MismatchPolicy,
) -> Result<Vec<(String, V)>, SyncError>
where
    V: DeserializeOwned,
{
    let mut fields = Vec::with_capacity(data.len());

    for (field, raw) in data {
        match serde_json::from_value::<V>(raw) {
            Ok(value) => fields.push((field, value)),
            Err(e) => match policy {
                MismatchPolicy::FailFast => {
                    return Err(SyncError::TypeMismatch {
                        field,
                        reason: e.to_string(),
                    });
                }
                MismatchPolicy::SkipAndLog => {
                    warn!(document, field = %field, error = %e, "Skipping field with mismatched value type");
                }
            },
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Sample {
        #[serde(rename = "string-1", default)]
        string1: String,
        #[serde(rename = "string-2", default)]
        string2: String,
    }

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fail-fast".parse::<MismatchPolicy>(), Ok(MismatchPolicy::FailFast));
        assert_eq!("Skip".parse::<MismatchPolicy>(), Ok(MismatchPolicy::SkipAndLog));
        assert!("sometimes".parse::<MismatchPolicy>().is_err());
        assert_eq!(MismatchPolicy::default(), MismatchPolicy::FailFast);
        assert_eq!(MismatchPolicy::SkipAndLog.to_string(), "skip");
    }

    #[test]
    fn test_decode_structured_values() {
        let raw = data(json!({
            "sample-1": {"string-1": "a", "string-2": "b"},
            "sample-2": {"string-1": "c"}
        }));

        let mut fields: Vec<(String, Sample)> =
            decode_fields("doc", raw, MismatchPolicy::FailFast).unwrap();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].1.string1, "a");
        assert_eq!(fields[0].1.string2, "b");
        assert_eq!(fields[1].1.string2, "");
    }

    #[test]
    fn test_fail_fast_rejects_snapshot() {
        let raw = data(json!({"good": 1, "bad": "one"}));

        let result = decode_fields::<u64>("doc", raw, MismatchPolicy::FailFast);
        assert!(matches!(result, Err(SyncError::TypeMismatch { ref field, .. }) if field == "bad"));
    }

    #[test]
    fn test_skip_and_log_keeps_good_fields() {
        let raw = data(json!({"good": 1, "bad": "one", "also-good": 2}));

        let mut fields = decode_fields::<u64>("doc", raw, MismatchPolicy::SkipAndLog).unwrap();
        fields.sort();

        assert_eq!(
            fields,
            vec![("also-good".to_string(), 2), ("good".to_string(), 1)]
        );
    }

    #[test]
    fn test_raw_values_always_decode() {
        let raw = data(json!({"n": 1, "s": "x", "o": {"k": []}}));

        let fields = decode_fields::<Value>("doc", raw, MismatchPolicy::FailFast).unwrap();
        assert_eq!(fields.len(), 3);
    }
}

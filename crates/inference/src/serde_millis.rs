//! `#[serde(with = "serde_millis")]` for deadlines written as whole milliseconds.

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Durations beyond `u64::MAX` milliseconds saturate; sub-millisecond parts
/// are truncated.
pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    serializer.serialize_u64(millis)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Budget {
        #[serde(with = "crate::serde_millis")]
        deadline: Duration,
    }

    #[test]
    fn truncates_sub_millisecond_part() {
        let budget = Budget {
            deadline: Duration::from_micros(2_750),
        };
        assert_eq!(
            serde_json::to_string(&budget).unwrap(),
            r#"{"deadline":2}"#
        );
    }

    #[test]
    fn saturates_huge_durations() {
        let budget = Budget {
            deadline: Duration::MAX,
        };
        let json = serde_json::to_value(&budget).unwrap();
        assert_eq!(json["deadline"], u64::MAX);
    }

    #[test]
    fn rejects_negative_millis() {
        assert!(serde_json::from_str::<Budget>(r#"{"deadline":-5}"#).is_err());
    }
}

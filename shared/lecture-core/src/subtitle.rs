//! Subtitle entries as exchanged with the lessons API

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Prefix used when a provisional identifier is rendered as text
const PROVISIONAL_PREFIX: &str = "tmp-";

/// Identifier of a subtitle entry.
///
/// Server identifiers and provisional client identifiers live in separate
/// namespaces: a `Provisional` id never equals a `Persisted` one, whatever
/// their textual forms look like.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubtitleId {
    /// Identifier assigned by the server once the entry is stored
    Persisted(String),

    /// Client-side placeholder for an entry awaiting server confirmation
    Provisional(Uuid),
}

impl SubtitleId {
    /// Generate a fresh provisional identifier
    pub fn provisional() -> Self {
        SubtitleId::Provisional(Uuid::new_v4())
    }

    pub fn persisted(id: impl Into<String>) -> Self {
        SubtitleId::Persisted(id.into())
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, SubtitleId::Provisional(_))
    }

    /// Server identifier, if this entry has been persisted
    pub fn server_id(&self) -> Option<&str> {
        match self {
            SubtitleId::Persisted(id) => Some(id),
            SubtitleId::Provisional(_) => None,
        }
    }
}

impl fmt::Display for SubtitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtitleId::Persisted(id) => f.pad(id),
            SubtitleId::Provisional(uuid) => f.pad(&format!("{}{}", PROVISIONAL_PREFIX, uuid)),
        }
    }
}

impl Serialize for SubtitleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SubtitleId {
    /// Server ids arrive either as integers or strings. Anything missing or
    /// unrecognised becomes a fresh provisional id so the entry still shows up.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => SubtitleId::Persisted(n.to_string()),
            Value::String(s) if !s.is_empty() => SubtitleId::Persisted(s),
            _ => SubtitleId::provisional(),
        })
    }
}

fn missing_id() -> SubtitleId {
    SubtitleId::provisional()
}

/// A time-ranged caption tied to the playback position.
///
/// Times are seconds. Absent or non-numeric times from the server are kept as
/// NaN so the entry simply never matches a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    #[serde(default = "missing_id")]
    pub id: SubtitleId,

    #[serde(default = "nan", deserialize_with = "lenient_seconds")]
    pub start_time: f64,

    #[serde(default = "nan", deserialize_with = "lenient_seconds")]
    pub end_time: f64,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(id: SubtitleId, start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            id,
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// Whether `position` falls inside `[start_time, end_time]`, both ends inclusive
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start_time && position <= self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn is_provisional(&self) -> bool {
        self.id.is_provisional()
    }
}

fn nan() -> f64 {
    f64::NAN
}

fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_ids_parse_from_numbers_and_strings() {
        let entries: Vec<SubtitleEntry> = serde_json::from_str(
            r#"[
                {"id": 17, "start_time": 1.5, "end_time": 3.0, "text": "hola"},
                {"id": "abc", "start_time": "4", "end_time": "6.25", "text": "adios"}
            ]"#,
        )
        .unwrap();

        assert_eq!(entries[0].id, SubtitleId::persisted("17"));
        assert_eq!(entries[1].id, SubtitleId::persisted("abc"));
        assert_eq!(entries[1].start_time, 4.0);
        assert_eq!(entries[1].end_time, 6.25);
    }

    #[test]
    fn test_missing_fields_degrade_instead_of_failing() {
        let entry: SubtitleEntry = serde_json::from_str(r#"{"text": null}"#).unwrap();

        assert!(entry.id.is_provisional());
        assert!(entry.start_time.is_nan());
        assert_eq!(entry.text, "");
        assert!(!entry.contains(0.0));
    }

    #[test]
    fn test_provisional_never_equals_persisted() {
        let provisional = SubtitleId::provisional();
        let lookalike = SubtitleId::persisted(provisional.to_string());

        assert_ne!(provisional, lookalike);
        assert!(provisional.to_string().starts_with("tmp-"));
        assert_eq!(provisional.server_id(), None);
        assert_eq!(lookalike.server_id(), Some(provisional.to_string().as_str()));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let entry = SubtitleEntry::new(SubtitleId::persisted("1"), 10.0, 15.0, "x");
        assert!(entry.contains(10.0));
        assert!(entry.contains(15.0));
        assert!(!entry.contains(9.999));
        assert!(!entry.contains(15.001));
        assert!(!entry.contains(f64::NAN));
    }
}

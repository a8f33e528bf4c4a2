//! Canonical-id boundary.
//!
//! The backend is loose about ids: numeric in some payloads, string in
//! others, and sometimes under entity-specific keys (`channel_id` instead of
//! `id`). Every entity struct normalizes to a single `String` id at
//! deserialization time; malformed rows (`""`, literal `"undefined"`) are
//! filtered out by the API client before they reach any orchestrator state.

use serde::{Deserialize, Deserializer};

/// Deserialize an id that may be a JSON number or string into a `String`.
pub fn string_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n.to_string()),
        Raw::Text(s) => Ok(s),
    }
}

/// Optional variant of [`string_id`] for fields the backend sometimes omits.
pub fn opt_string_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
        None,
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => Ok(Some(n.to_string())),
        Some(Raw::Text(s)) => Ok(Some(s)),
        Some(Raw::None) | None => Ok(None),
    }
}

/// Whether an id is usable as a key. Rejects empty strings and the literal
/// `"undefined"` that malformed backend rows have been observed to carry.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id != "undefined"
}

/// Pull a newly created entity's id out of a response envelope. Backends
/// answer creates with varying shapes: a bare object, `{"data": {...}}`, or
/// an entity-keyed wrapper.
pub fn extract_id(value: &serde_json::Value) -> Option<String> {
    const ID_KEYS: &[&str] = &[
        "id",
        "organization_id",
        "channel_id",
        "topic_id",
        "note_id",
        "invitation_id",
        "user_id",
    ];
    const WRAPPER_KEYS: &[&str] = &["data", "organization", "channel", "topic", "note"];

    if let Some(obj) = value.as_object() {
        for key in ID_KEYS {
            match obj.get(*key) {
                Some(serde_json::Value::Number(n)) => return Some(n.to_string()),
                Some(serde_json::Value::String(s)) if is_valid_id(s) => return Some(s.clone()),
                _ => {}
            }
        }
        for key in WRAPPER_KEYS {
            if let Some(inner) = obj.get(*key) {
                if let Some(id) = extract_id(inner) {
                    return Some(id);
                }
            }
        }
    }
    None
}

//! Dynamic attribute values carried by permissions and resources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use warden_core::{AppError, AppResult};

/// Maximum number of keys in a permission attribute map.
pub const ATTRIBUTE_MAX_KEYS: usize = 10;

/// Maximum length of one attribute key.
pub const ATTRIBUTE_KEY_MAX_LENGTH: usize = 40;

/// Maximum length of one string attribute value.
pub const ATTRIBUTE_STRING_MAX_LENGTH: usize = 256;

/// Ordered attribute map keyed by attribute name.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// One JSON-shaped attribute value.
///
/// Serialized untagged, so any JSON document round-trips through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number, integer or floating point.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<AttributeValue>),
    /// JSON object.
    Object(AttributeMap),
}

impl AttributeValue {
    /// Returns the string payload when the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    fn longest_string(&self) -> usize {
        match self {
            Self::String(value) => value.chars().count(),
            Self::Array(items) => items
                .iter()
                .map(Self::longest_string)
                .max()
                .unwrap_or(0),
            Self::Object(entries) => entries
                .values()
                .map(Self::longest_string)
                .max()
                .unwrap_or(0),
            Self::Null | Self::Bool(_) | Self::Number(_) => 0,
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::String(text),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<AttributeValue> for Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Null => Self::Null,
            AttributeValue::Bool(flag) => Self::Bool(flag),
            AttributeValue::Number(number) => Self::Number(number),
            AttributeValue::String(text) => Self::String(text),
            AttributeValue::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            AttributeValue::Object(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Validates permission attribute limits.
///
/// - At most [`ATTRIBUTE_MAX_KEYS`] keys.
/// - Keys are non-empty and at most [`ATTRIBUTE_KEY_MAX_LENGTH`] characters.
/// - String values, nested ones included, are at most
///   [`ATTRIBUTE_STRING_MAX_LENGTH`] characters.
pub fn validate_attributes(attributes: &AttributeMap) -> AppResult<()> {
    if attributes.len() > ATTRIBUTE_MAX_KEYS {
        return Err(AppError::Validation(format!(
            "attributes must not have more than {ATTRIBUTE_MAX_KEYS} keys, got {}",
            attributes.len()
        )));
    }

    for (key, value) in attributes {
        if key.trim().is_empty() {
            return Err(AppError::Validation(
                "attribute keys must not be empty".to_owned(),
            ));
        }

        if key.chars().count() > ATTRIBUTE_KEY_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "attribute key '{key}' must not exceed {ATTRIBUTE_KEY_MAX_LENGTH} characters"
            )));
        }

        if value.longest_string() > ATTRIBUTE_STRING_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "attribute '{key}' string values must not exceed {ATTRIBUTE_STRING_MAX_LENGTH} characters"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AttributeMap, AttributeValue, validate_attributes};

    #[test]
    fn nested_json_is_accepted_from_the_wire() {
        let value: AttributeValue = serde_json::from_value(json!({
            "regions": ["eu", "us"],
            "limits": {"max": 3, "ratio": 0.5},
            "enabled": true,
            "note": null
        }))
        .unwrap_or(AttributeValue::Null);

        let AttributeValue::Object(entries) = &value else {
            unreachable!("expected an object");
        };
        assert_eq!(entries.len(), 4);
        assert_eq!(entries.get("note"), Some(&AttributeValue::Null));
        assert_eq!(entries.get("enabled"), Some(&AttributeValue::Bool(true)));
        assert!(matches!(entries.get("regions"), Some(AttributeValue::Array(items)) if items.len() == 2));
    }

    #[test]
    fn converts_to_and_from_json_values() {
        let original = json!({"a": [1, "b", {"c": false}]});
        let converted = serde_json::Value::from(AttributeValue::from(original.clone()));
        assert_eq!(converted, original);
    }

    #[test]
    fn rejects_too_many_keys() {
        let attributes: AttributeMap = (0..11)
            .map(|index| (format!("key{index}"), AttributeValue::Bool(true)))
            .collect();

        assert!(validate_attributes(&attributes).is_err());
    }

    #[test]
    fn rejects_long_keys_and_long_nested_strings() {
        let long_key = AttributeMap::from([("k".repeat(41), AttributeValue::Null)]);
        assert!(validate_attributes(&long_key).is_err());

        let long_value = AttributeMap::from([(
            "tags".to_owned(),
            AttributeValue::Array(vec![AttributeValue::String("v".repeat(257))]),
        )]);
        assert!(validate_attributes(&long_value).is_err());

        let at_limit = AttributeMap::from([(
            "k".repeat(40),
            AttributeValue::String("v".repeat(256)),
        )]);
        assert!(validate_attributes(&at_limit).is_ok());
    }
}

use std::collections::BTreeMap;

use serde_json::Value;

use super::Diagnostics;

/// Value kind of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// UTF-8 string.
    String,
    /// List of strings.
    StringList,
    /// Map of arbitrary JSON values.
    DynamicMap,
    /// List of nested objects.
    ObjectList,
}

/// How Terraform treats an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    /// Must be set in configuration.
    Required,
    /// May be set in configuration.
    Optional,
    /// Set by the provider only.
    Computed,
    /// May be set, otherwise filled in by the provider.
    OptionalComputed,
}

/// One attribute in a resource schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Value kind.
    pub kind: AttributeKind,
    /// Configuration mode.
    pub mode: AttributeMode,
    /// User-facing description.
    pub description: &'static str,
    /// Inclusive character length bounds for string attributes.
    pub length: Option<(usize, usize)>,
}

impl Attribute {
    /// Required attribute.
    #[must_use]
    pub fn required(kind: AttributeKind, description: &'static str) -> Self {
        Self::new(kind, AttributeMode::Required, description)
    }

    /// Optional attribute.
    #[must_use]
    pub fn optional(kind: AttributeKind, description: &'static str) -> Self {
        Self::new(kind, AttributeMode::Optional, description)
    }

    /// Provider-computed attribute.
    #[must_use]
    pub fn computed(kind: AttributeKind, description: &'static str) -> Self {
        Self::new(kind, AttributeMode::Computed, description)
    }

    /// Optional attribute the provider fills in when unset.
    #[must_use]
    pub fn optional_computed(kind: AttributeKind, description: &'static str) -> Self {
        Self::new(kind, AttributeMode::OptionalComputed, description)
    }

    /// Adds a string length validator.
    #[must_use]
    pub fn with_length(mut self, min: usize, max: usize) -> Self {
        self.length = Some((min, max));
        self
    }

    fn new(kind: AttributeKind, mode: AttributeMode, description: &'static str) -> Self {
        Self {
            kind,
            mode,
            description,
            length: None,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self.kind {
            AttributeKind::String => value.is_string(),
            AttributeKind::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            AttributeKind::DynamicMap => value.is_object(),
            AttributeKind::ObjectList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
        }
    }
}

/// Resource schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// User-facing description of the resource.
    pub description: &'static str,
    /// Attributes by name.
    pub attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    /// Checks a planned configuration against the schema.
    ///
    /// Unknown attributes are ignored; computed attributes are not checked.
    pub fn validate_config(&self, config: &Value, diagnostics: &mut Diagnostics) {
        let Some(object) = config.as_object() else {
            diagnostics.add_error(
                "Invalid configuration",
                "resource configuration must be a JSON object",
            );
            return;
        };

        for (name, attribute) in &self.attributes {
            if attribute.mode == AttributeMode::Computed {
                continue;
            }

            let value = object.get(*name).filter(|value| !value.is_null());
            let Some(value) = value else {
                if attribute.mode == AttributeMode::Required {
                    diagnostics.add_error(
                        "Missing required attribute",
                        format!("attribute '{name}' is required"),
                    );
                }
                continue;
            };

            if !attribute.accepts(value) {
                diagnostics.add_error(
                    "Invalid attribute type",
                    format!("attribute '{name}' must be a {:?}", attribute.kind),
                );
                continue;
            }

            if let (Some((min, max)), Some(text)) = (attribute.length, value.as_str()) {
                let length = text.chars().count();
                if length < min || length > max {
                    diagnostics.add_error(
                        "Invalid attribute length",
                        format!(
                            "attribute '{name}' must be between {min} and {max} characters, got {length}"
                        ),
                    );
                }
            }
        }
    }
}

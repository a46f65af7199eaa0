use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::attribute::{AttributeMap, validate_attributes};

/// Tenant-defined role granting a set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomRole {
    /// Client-supplied stable identifier.
    pub id: String,
    /// Optional role name.
    pub name: Option<String>,
    /// Optional human-readable title.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
    /// Optional launch stage label.
    pub stage: Option<String>,
    /// Creation timestamp in RFC3339.
    pub created_at: Option<String>,
    /// Last update timestamp in RFC3339.
    pub updated_at: Option<String>,
}

impl CustomRole {
    /// Validates the identifier and every permission.
    pub fn validate(&self) -> AppResult<()> {
        validate_custom_role_id(self.id.as_str())?;
        for permission in &self.permissions {
            permission.validate()?;
        }

        Ok(())
    }
}

/// One permission granted by a custom role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    /// Permission identifier (`sys.resource.action`).
    pub id: String,
    /// Optional ABAC attributes.
    pub attributes: Option<AttributeMap>,
}

impl Permission {
    /// Validates identifier shape and attribute limits.
    pub fn validate(&self) -> AppResult<()> {
        validate_permission_id(self.id.as_str())?;
        if let Some(attributes) = &self.attributes {
            validate_attributes(attributes).map_err(|error| {
                AppError::Validation(format!("permission '{}': {error}", self.id))
            })?;
        }

        Ok(())
    }
}

/// Validates a client-supplied custom role identifier.
pub fn validate_custom_role_id(id: &str) -> AppResult<()> {
    let id = NonEmptyString::new(id)
        .map_err(|_| AppError::Validation("custom role id must not be empty".to_owned()))?;
    let id = id.as_str();

    if id.contains('/') || id.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(format!(
            "custom role id '{id}' must not contain '/' or whitespace"
        )));
    }

    Ok(())
}

/// Validates a permission identifier of the form `sys.resource.action`.
///
/// The system prefix is exactly three lowercase letters; resource and action
/// are 2 to 16 characters of lowercase letters and hyphens.
pub fn validate_permission_id(id: &str) -> AppResult<()> {
    let invalid = || {
        AppError::Validation(format!(
            "permission id '{id}' must match '<3-letter system>.<resource>.<action>' using lowercase letters and hyphens"
        ))
    };

    let segments: Vec<&str> = id.split('.').collect();
    let [system, resource, action] = segments.as_slice() else {
        return Err(invalid());
    };

    let system_valid = system.len() == 3 && system.chars().all(|ch| ch.is_ascii_lowercase());
    if !system_valid || !is_permission_segment(resource) || !is_permission_segment(action) {
        return Err(invalid());
    }

    Ok(())
}

fn is_permission_segment(segment: &str) -> bool {
    (2..=16).contains(&segment.len())
        && segment
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch == '-')
        && !segment.starts_with('-')
        && !segment.ends_with('-')
}

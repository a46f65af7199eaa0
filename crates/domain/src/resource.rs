use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult};

use crate::attribute::AttributeMap;

/// Maximum length of a resource identifier.
pub const RESOURCE_ID_MAX_LENGTH: usize = 1500;

/// Generic IAM resource used for attribute-based tagging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Client-supplied identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Arbitrary JSON properties.
    pub props: AttributeMap,
}

impl Resource {
    /// Validates the identifier.
    pub fn validate(&self) -> AppResult<()> {
        validate_resource_id(self.id.as_str())
    }
}

/// Validates a resource identifier.
///
/// Identifiers are 1 to 1500 characters, never contain `/` or `__`, and are
/// neither `.` nor `..`.
pub fn validate_resource_id(id: &str) -> AppResult<()> {
    if id.is_empty() {
        return Err(AppError::Validation(
            "resource id must not be empty".to_owned(),
        ));
    }

    if id.chars().count() > RESOURCE_ID_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "resource id must not exceed {RESOURCE_ID_MAX_LENGTH} characters"
        )));
    }

    if id.contains('/') {
        return Err(AppError::Validation(format!(
            "resource id '{id}' must not contain '/'"
        )));
    }

    if id == "." || id == ".." {
        return Err(AppError::Validation(format!(
            "resource id must not be '{id}'"
        )));
    }

    if id.contains("__") {
        return Err(AppError::Validation(format!(
            "resource id '{id}' must not contain '__'"
        )));
    }

    Ok(())
}

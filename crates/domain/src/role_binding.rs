//! Role bindings and the identifiers they are addressed by.
//!
//! The IAM backend has no object representing a binding. A binding is a V2
//! group-role assignment addressed by a composite identifier
//! `<group id>-<role identifier>`, where the role identifier is
//! `custom.<name>` for custom roles and the bare name for system roles.
//! Terraform sees roles as `roles/<name>` or `roles/custom.<name>`.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult};

use crate::group::Member;

/// Prefix of every Terraform-facing role string.
pub const ROLE_PREFIX: &str = "roles/";

/// Prefix marking a custom role identifier.
pub const CUSTOM_ROLE_PREFIX: &str = "custom.";

const ID_SEPARATOR: char = '-';

/// Role reference split into the bare name the API expects and its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleRef {
    name: String,
    is_custom: bool,
}

impl RoleRef {
    /// Creates a reference to a system role.
    #[must_use]
    pub fn system(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_custom: false,
        }
    }

    /// Creates a reference to a custom role.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_custom: true,
        }
    }

    /// Decodes a Terraform role string.
    ///
    /// `roles/custom.<name>` is a custom role and `roles/<name>` a system role.
    /// Any other shape is taken verbatim as a system role name. Only an empty
    /// name is rejected.
    pub fn parse(role: &str) -> AppResult<Self> {
        let role = role.trim();
        let parsed = match role.strip_prefix(ROLE_PREFIX) {
            Some(rest) => Self::from_identifier(rest),
            None => Self::system(role),
        };

        if parsed.name.is_empty() {
            return Err(AppError::Validation(format!(
                "role '{role}' must name a role, e.g. 'roles/<name>' or 'roles/custom.<name>'"
            )));
        }

        Ok(parsed)
    }

    /// Decodes a role identifier (`custom.<name>` or `<name>`).
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.strip_prefix(CUSTOM_ROLE_PREFIX) {
            Some(name) => Self::custom(name),
            None => Self::system(identifier),
        }
    }

    /// Returns the bare role name sent to the API.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns true for custom roles.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    /// Returns the role identifier used inside composite binding IDs.
    #[must_use]
    pub fn identifier(&self) -> String {
        if self.is_custom {
            format!("{CUSTOM_ROLE_PREFIX}{}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Encodes the Terraform role string.
    #[must_use]
    pub fn to_role_string(&self) -> String {
        format!("{ROLE_PREFIX}{}", self.identifier())
    }
}

/// Composite role binding identifier `<group id>-<role identifier>`.
///
/// Group IDs are assumed hyphen-free when parsing blindly. When the group ID is
/// already known, [`RoleBindingId::parse_with_group`] strips it as an exact
/// prefix instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleBindingId {
    group_id: String,
    role: RoleRef,
}

impl RoleBindingId {
    /// Creates an identifier from its parts.
    #[must_use]
    pub fn new(group_id: impl Into<String>, role: RoleRef) -> Self {
        Self {
            group_id: group_id.into(),
            role,
        }
    }

    /// Parses an identifier by splitting on the first `-`.
    pub fn parse(id: &str) -> AppResult<Self> {
        let Some((group_id, identifier)) = id.split_once(ID_SEPARATOR) else {
            return Err(malformed_id(id));
        };

        Self::from_parts(id, group_id, identifier)
    }

    /// Parses an identifier whose group ID is already known.
    ///
    /// Falls back to [`RoleBindingId::parse`] when `id` does not start with the
    /// known group ID, which happens for imported bindings.
    pub fn parse_with_group(id: &str, group_id: &str) -> AppResult<Self> {
        let known_prefix = format!("{group_id}{ID_SEPARATOR}");
        match id.strip_prefix(known_prefix.as_str()) {
            Some(identifier) if !group_id.is_empty() => {
                Self::from_parts(id, group_id, identifier)
            }
            _ => Self::parse(id),
        }
    }

    fn from_parts(id: &str, group_id: &str, identifier: &str) -> AppResult<Self> {
        let role = RoleRef::from_identifier(identifier);
        if group_id.is_empty() || role.name().is_empty() {
            return Err(malformed_id(id));
        }

        Ok(Self::new(group_id, role))
    }

    /// Returns the group ID part.
    #[must_use]
    pub fn group_id(&self) -> &str {
        self.group_id.as_str()
    }

    /// Returns the role part.
    #[must_use]
    pub fn role(&self) -> &RoleRef {
        &self.role
    }
}

impl Display for RoleBindingId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}{ID_SEPARATOR}{}",
            self.group_id,
            self.role.identifier()
        )
    }
}

fn malformed_id(id: &str) -> AppError {
    AppError::Validation(format!(
        "role binding id '{id}' must have the form '<group id>-<role>'"
    ))
}

/// Terraform-facing role binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    /// Composite identifier, empty before creation.
    pub id: String,
    /// Optional display name, kept client side.
    pub name: Option<String>,
    /// Role string (`roles/<name>` or `roles/custom.<name>`).
    pub role: String,
    /// Member tags; exactly one `group:<name>` entry.
    pub members: Vec<String>,
    /// Optional condition expression, kept client side.
    pub condition: Option<String>,
    /// Creation timestamp in RFC3339.
    pub created_at: Option<String>,
    /// Last update timestamp in RFC3339.
    pub updated_at: Option<String>,
}

impl RoleBinding {
    /// Returns the name of the single group this binding targets.
    pub fn group_name(&self) -> AppResult<String> {
        let mut group_names = Vec::new();
        for member in &self.members {
            match Member::from_str(member)? {
                Member::Group(name) => group_names.push(name),
                Member::User(_) => {
                    return Err(AppError::Validation(format!(
                        "role binding members must be groups, got '{member}'"
                    )));
                }
            }
        }

        match group_names.len() {
            0 => Err(AppError::Validation(
                "role binding requires a group member".to_owned(),
            )),
            1 => Ok(group_names.remove(0)),
            count => Err(AppError::Validation(format!(
                "role binding supports exactly one group member, got {count}"
            ))),
        }
    }
}

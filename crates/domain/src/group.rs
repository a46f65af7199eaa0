use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

/// IAM group owned by a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Server-assigned identifier. Empty until the group is created.
    pub id: String,
    /// Tenant-unique group name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Member tags (`user:<email>` or `group:<name>`).
    pub members: Vec<String>,
    /// Creation timestamp in RFC3339.
    pub created_at: Option<String>,
    /// Last update timestamp in RFC3339.
    pub updated_at: Option<String>,
}

impl Group {
    /// Validates name and member tags before the group is sent to the backend.
    pub fn validate(&self) -> AppResult<()> {
        NonEmptyString::new(self.name.as_str()).map_err(|_| {
            AppError::Validation("group name must not be empty".to_owned())
        })?;

        for member in &self.members {
            Member::from_str(member)?;
        }

        Ok(())
    }
}

/// Parsed member tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    /// A user identified by email.
    User(String),
    /// A group identified by name.
    Group(String),
}

impl Member {
    /// Returns the group name when the member is a group.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        match self {
            Self::Group(name) => Some(name.as_str()),
            Self::User(_) => None,
        }
    }
}

impl FromStr for Member {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((kind, subject)) = value.split_once(':') else {
            return Err(AppError::Validation(format!(
                "member '{value}' must have the form 'user:<email>' or 'group:<name>'"
            )));
        };

        if subject.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "member '{value}' must not have an empty {kind} value"
            )));
        }

        match kind {
            "user" => {
                let valid_email = subject
                    .split_once('@')
                    .is_some_and(|(local, domain)| {
                        !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                    });
                if !valid_email {
                    return Err(AppError::Validation(format!(
                        "member '{value}' must carry a valid email address"
                    )));
                }

                Ok(Self::User(subject.to_owned()))
            }
            "group" => Ok(Self::Group(subject.to_owned())),
            _ => Err(AppError::Validation(format!(
                "member '{value}' has unsupported kind '{kind}', expected 'user' or 'group'"
            ))),
        }
    }
}

impl Display for Member {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(email) => write!(formatter, "user:{email}"),
            Self::Group(name) => write!(formatter, "group:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use warden_core::AppError;

    use super::{Group, Member};

    #[test]
    fn parses_user_and_group_members() {
        assert_eq!(
            Member::from_str("user:alice@example.com").ok(),
            Some(Member::User("alice@example.com".to_owned()))
        );
        assert_eq!(
            Member::from_str("group:eng").ok(),
            Some(Member::Group("eng".to_owned()))
        );
        assert_eq!(
            Member::Group("eng".to_owned()).to_string(),
            "group:eng".to_owned()
        );
    }

    #[test]
    fn rejects_malformed_members() {
        for value in ["alice", "user:", "user:alice", "role:admin", "group: "] {
            assert!(Member::from_str(value).is_err(), "{value} should be rejected");
        }
    }

    #[test]
    fn group_validation_checks_members() {
        let group = Group {
            name: "eng".to_owned(),
            members: vec!["user:bob@example.com".to_owned(), "bob".to_owned()],
            ..Group::default()
        };

        assert!(group.validate().is_err());
    }

    #[test]
    fn group_validation_rejects_blank_names() {
        let group = Group {
            name: "  ".to_owned(),
            ..Group::default()
        };

        assert!(matches!(
            group.validate(),
            Err(AppError::Validation(ref message)) if message == "group name must not be empty"
        ));
    }
}

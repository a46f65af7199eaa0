//! Wire shapes of the IAM REST API and their mapping to domain types.

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use warden_application::{AssignGroupRoleInput, GroupRoleAssignment};
use warden_core::{AppError, AppResult};
use warden_domain::{AttributeMap, CustomRole, Group, Permission, Resource};

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn is_empty_map(value: &Option<AttributeMap>) -> bool {
    value.as_ref().is_none_or(AttributeMap::is_empty)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupDto {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Group listings come back either bare or wrapped in an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GroupListing {
    Plain(Vec<GroupDto>),
    Envelope { groups: Vec<GroupDto> },
}

impl GroupListing {
    pub(crate) fn into_groups(self) -> Vec<Group> {
        let groups = match self {
            Self::Plain(groups) | Self::Envelope { groups, .. } => groups,
        };
        groups.into_iter().map(group_from_dto).collect()
    }
}

pub(crate) fn group_from_dto(dto: GroupDto) -> Group {
    Group {
        id: dto.id,
        name: dto.name,
        description: non_blank(dto.description),
        members: dto.members,
        created_at: non_blank(dto.created_at),
        updated_at: non_blank(dto.updated_at),
    }
}

/// Create and update payload. Server-owned fields are never sent.
pub(crate) fn group_payload(group: &Group) -> GroupDto {
    GroupDto {
        id: String::new(),
        name: group.name.clone(),
        description: group.description.clone(),
        members: group.members.clone(),
        created_at: None,
        updated_at: None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PermissionDto {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub attributes: Option<AttributeMap>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomRoleDto {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<PermissionDto>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

pub(crate) fn custom_role_from_dto(dto: CustomRoleDto) -> CustomRole {
    CustomRole {
        id: dto.id,
        name: non_blank(dto.name),
        title: non_blank(dto.title),
        description: non_blank(dto.description),
        permissions: dto
            .permissions
            .into_iter()
            .map(|permission| Permission {
                id: permission.id,
                attributes: permission.attributes.filter(|map| !map.is_empty()),
            })
            .collect(),
        stage: non_blank(dto.stage),
        created_at: non_blank(dto.created_at),
        updated_at: non_blank(dto.updated_at),
    }
}

pub(crate) fn custom_role_payload(role: &CustomRole) -> CustomRoleDto {
    CustomRoleDto {
        id: role.id.clone(),
        name: role.name.clone(),
        title: role.title.clone(),
        description: role.description.clone(),
        permissions: role
            .permissions
            .iter()
            .map(|permission| PermissionDto {
                id: permission.id.clone(),
                attributes: permission.attributes.clone(),
            })
            .collect(),
        stage: role.stage.clone(),
        created_at: None,
        updated_at: None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ResourceDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub props: AttributeMap,
}

pub(crate) fn resource_from_dto(dto: ResourceDto) -> Resource {
    Resource {
        id: dto.id,
        name: dto.name,
        props: dto.props,
    }
}

pub(crate) fn resource_payload(resource: &Resource) -> ResourceDto {
    ResourceDto {
        id: resource.id.clone(),
        name: resource.name.clone(),
        props: resource.props.clone(),
    }
}

/// V2 group role assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoleBindingDto {
    #[serde(default)]
    pub is_custom: bool,
    pub role_id: String,
    #[serde(default)]
    pub bindings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_bindings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

pub(crate) fn assignment_from_dto(dto: RoleBindingDto) -> GroupRoleAssignment {
    GroupRoleAssignment {
        role_id: dto.role_id,
        is_custom: dto.is_custom,
        bindings: dto.bindings,
        fixed_bindings: dto.fixed_bindings.unwrap_or_default(),
        created_at: non_blank(dto.created_at),
        updated_at: non_blank(dto.updated_at),
    }
}

pub(crate) fn assignment_payload(input: &AssignGroupRoleInput) -> RoleBindingDto {
    RoleBindingDto {
        is_custom: input.is_custom,
        role_id: input.role_id.clone(),
        bindings: input.bindings.clone(),
        ..RoleBindingDto::default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    OAuth {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    },
    Structured {
        message: String,
        #[serde(default)]
        code: Option<Value>,
        #[serde(default)]
        details: Option<Value>,
    },
}

/// Extracts a human-readable message from an error body.
pub(crate) fn api_error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(ApiErrorBody::OAuth {
            error,
            error_description: Some(description),
        }) if !description.is_empty() => format!("{error}: {description}"),
        Ok(ApiErrorBody::OAuth { error, .. }) => error,
        Ok(ApiErrorBody::Structured {
            message,
            code,
            details,
        }) => {
            let mut rendered = message;
            if let Some(code) = code.filter(|code| !code.is_null()) {
                rendered = format!("{rendered} (code {code})");
            }
            if let Some(details) = details.filter(|details| !details.is_null()) {
                rendered = format!("{rendered}: {details}");
            }
            rendered
        }
        Err(_) => {
            let raw = String::from_utf8_lossy(body).trim().to_owned();
            if raw.is_empty() {
                "<empty response body>".to_owned()
            } else {
                raw
            }
        }
    }
}

/// Maps a non-success status onto the application error taxonomy.
pub(crate) fn classify_status(status: StatusCode, body: &[u8], context: &str) -> AppError {
    let message = format!("{context}: HTTP {}: {}", status.as_u16(), api_error_message(body));
    match status {
        StatusCode::BAD_REQUEST => AppError::Validation(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8], context: &str) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|error| AppError::Internal(format!("{context}: malformed response body: {error}")))
}

pub(crate) fn encode<T: Serialize>(payload: &T, context: &str) -> AppResult<Vec<u8>> {
    serde_json::to_vec(payload)
        .map_err(|error| AppError::Internal(format!("{context}: failed to encode payload: {error}")))
}

use async_trait::async_trait;
use warden_core::AppResult;
use warden_domain::RoleRef;

/// Role assignment attached to a group, as listed by the V2 API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRoleAssignment {
    /// Role identifier exactly as the backend returned it.
    pub role_id: String,
    /// Indicates a custom role.
    pub is_custom: bool,
    /// Business-unit scoping bindings.
    pub bindings: Vec<String>,
    /// Business-unit bindings managed by the backend.
    pub fixed_bindings: Vec<String>,
    /// Assignment creation timestamp in RFC3339, when reported.
    pub created_at: Option<String>,
    /// Assignment update timestamp in RFC3339, when reported.
    pub updated_at: Option<String>,
}

/// Input payload for assigning a role to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignGroupRoleInput {
    /// Bare role name.
    pub role_id: String,
    /// Indicates a custom role.
    pub is_custom: bool,
    /// Business-unit scoping bindings. Unrelated to Terraform members.
    pub bindings: Vec<String>,
}

impl AssignGroupRoleInput {
    /// Builds an unscoped assignment for a role.
    #[must_use]
    pub fn unscoped(role: &RoleRef) -> Self {
        Self {
            role_id: role.name().to_owned(),
            is_custom: role.is_custom(),
            bindings: Vec::new(),
        }
    }
}

/// Port for group role assignments (V2 API).
#[async_trait]
pub trait GroupRoleGateway: Send + Sync {
    /// Lists the roles assigned to a group.
    async fn list_group_roles(&self, group_id: &str) -> AppResult<Vec<GroupRoleAssignment>>;

    /// Assigns a role to a group.
    async fn assign_group_role(&self, group_id: &str, input: &AssignGroupRoleInput)
    -> AppResult<()>;

    /// Removes a role assignment from a group.
    async fn remove_group_role(&self, group_id: &str, role: &RoleRef) -> AppResult<()>;
}

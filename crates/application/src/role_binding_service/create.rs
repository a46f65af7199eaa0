use super::*;

use tracing::info;
use warden_domain::RoleRef;

use crate::iam_ports::AssignGroupRoleInput;

impl RoleBindingService {
    /// Creates the V2 group role assignment behind a planned binding.
    ///
    /// The group is resolved by name through a full listing, since the
    /// backend offers no lookup by name. The returned binding echoes the plan
    /// under the synthesized identifier.
    pub async fn create(&self, plan: RoleBinding) -> AppResult<ReconciledBinding> {
        let group_name = plan.group_name()?;
        let role = RoleRef::parse(plan.role.as_str())?;
        let group = self.resolve_group_by_name(group_name.as_str()).await?;

        self.group_roles
            .assign_group_role(group.id.as_str(), &AssignGroupRoleInput::unscoped(&role))
            .await?;

        let binding_id = RoleBindingId::new(group.id, role);
        info!(
            binding_id = %binding_id,
            group_name = %group_name,
            role = %plan.role,
            "assigned role to group"
        );

        Ok(ReconciledBinding {
            binding: RoleBinding {
                id: binding_id.to_string(),
                ..plan
            },
            binding_id,
            source: BindingSource::Plan,
        })
    }
}

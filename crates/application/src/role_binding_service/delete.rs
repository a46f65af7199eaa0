use super::*;

use tracing::{info, warn};

use crate::iam_ports::AssignGroupRoleInput;

impl RoleBindingService {
    /// Removes the group role assignment behind a binding.
    ///
    /// Some tenants answer the DELETE route with 403. In that case the
    /// assignment is re-posted once with empty business-unit bindings; a
    /// failure of that fallback is terminal. Other failures never fall back.
    pub async fn delete(&self, binding_id: &RoleBindingId) -> AppResult<()> {
        let role = binding_id.role();
        match self
            .group_roles
            .remove_group_role(binding_id.group_id(), role)
            .await
        {
            Ok(()) => {
                info!(binding_id = %binding_id, "removed role from group");
                Ok(())
            }
            Err(AppError::Forbidden(detail)) => {
                warn!(
                    binding_id = %binding_id,
                    detail = %detail,
                    "role removal forbidden, clearing assignment bindings instead"
                );

                self.group_roles
                    .assign_group_role(
                        binding_id.group_id(),
                        &AssignGroupRoleInput::unscoped(role),
                    )
                    .await
                    .map_err(|error| {
                        AppError::Internal(format!(
                            "role binding '{binding_id}' removal was forbidden and the fallback failed: {error}"
                        ))
                    })
            }
            Err(error) => Err(error),
        }
    }
}

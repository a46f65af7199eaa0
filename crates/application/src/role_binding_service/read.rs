use super::*;

use tracing::warn;
use warden_domain::Member;

use super::matching::assignment_matches;

impl RoleBindingService {
    /// Reads a binding back from its group and the group's V2 role listing.
    ///
    /// A missing group means the binding is gone. A role missing from the
    /// listing is not: the binding is rebuilt from the identifier and flagged
    /// as [`BindingSource::Reconstructed`].
    pub async fn read(&self, binding_id: &RoleBindingId) -> AppResult<ReconciledBinding> {
        let group = self
            .groups
            .get_group(binding_id.group_id())
            .await
            .map_err(|error| match error {
                AppError::NotFound(detail) => AppError::NotFound(format!(
                    "role binding '{binding_id}' no longer exists: {detail}"
                )),
                other => other,
            })?;

        let assignments = match self.group_roles.list_group_roles(group.id.as_str()).await {
            Ok(assignments) => assignments,
            Err(AppError::NotFound(detail)) => {
                debug!(
                    group_id = %group.id,
                    detail = %detail,
                    "group role listing not found, treating it as empty"
                );
                Vec::new()
            }
            Err(error) => return Err(error),
        };
        let role = binding_id.role();
        let matched = assignments
            .into_iter()
            .find(|assignment| assignment_matches(assignment, role));

        let (source, created_at, updated_at) = match matched {
            Some(assignment) => (
                BindingSource::Listed,
                assignment.created_at.or_else(|| group.created_at.clone()),
                assignment.updated_at.or_else(|| group.updated_at.clone()),
            ),
            None => {
                warn!(
                    binding_id = %binding_id,
                    group_id = %group.id,
                    "role assignment missing from group role listing, reconstructing binding"
                );
                (
                    BindingSource::Reconstructed,
                    group.created_at.clone(),
                    group.updated_at.clone(),
                )
            }
        };

        Ok(ReconciledBinding {
            binding: RoleBinding {
                id: binding_id.to_string(),
                name: None,
                role: role.to_role_string(),
                members: vec![Member::Group(group.name).to_string()],
                condition: None,
                created_at,
                updated_at,
            },
            binding_id: binding_id.clone(),
            source,
        })
    }
}

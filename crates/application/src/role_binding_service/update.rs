use super::*;

use chrono::{SecondsFormat, Utc};

impl RoleBindingService {
    /// Reconciles an updated plan without calling any mutating endpoint.
    ///
    /// The V2 API cannot change an assignment in place. The binding is read to
    /// confirm it still exists, then identity, members and timestamps come from
    /// the read while role, name and condition come from the plan.
    pub async fn update(
        &self,
        binding_id: &RoleBindingId,
        plan: RoleBinding,
    ) -> AppResult<ReconciledBinding> {
        let existing = self.read(binding_id).await?;
        debug!(
            binding_id = %binding_id,
            existing_role = %existing.binding.role,
            planned_role = %plan.role,
            "merging planned role binding with existing state"
        );

        let (created_at, updated_at) =
            match (existing.binding.created_at, existing.binding.updated_at) {
                (Some(created_at), Some(updated_at))
                    if !created_at.is_empty() && !updated_at.is_empty() =>
                {
                    (created_at, updated_at)
                }
                _ => {
                    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                    (now.clone(), now)
                }
            };

        Ok(ReconciledBinding {
            binding: RoleBinding {
                id: existing.binding.id,
                name: plan.name,
                role: plan.role,
                members: existing.binding.members,
                condition: plan.condition,
                created_at: Some(created_at),
                updated_at: Some(updated_at),
            },
            binding_id: existing.binding_id,
            source: existing.source,
        })
    }
}

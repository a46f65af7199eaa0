use async_trait::async_trait;
use warden_core::AppResult;
use warden_domain::CustomRole;

/// Port for tenant custom role administration (V1 API).
#[async_trait]
pub trait CustomRoleGateway: Send + Sync {
    /// Fetches one custom role by identifier.
    async fn get_custom_role(&self, role_id: &str) -> AppResult<CustomRole>;

    /// Creates a custom role under its client-supplied identifier.
    async fn create_custom_role(&self, role: &CustomRole) -> AppResult<CustomRole>;

    /// Updates a custom role.
    ///
    /// Returns `None` when the backend acknowledged the update without a body.
    async fn update_custom_role(
        &self,
        role_id: &str,
        role: &CustomRole,
    ) -> AppResult<Option<CustomRole>>;

    /// Deletes a custom role.
    async fn delete_custom_role(&self, role_id: &str) -> AppResult<()>;
}

use async_trait::async_trait;
use warden_core::AppResult;
use warden_domain::Group;

/// Port for tenant group administration (V1 API).
#[async_trait]
pub trait GroupGateway: Send + Sync {
    /// Lists every group in the tenant.
    async fn list_groups(&self) -> AppResult<Vec<Group>>;

    /// Fetches one group by identifier.
    async fn get_group(&self, group_id: &str) -> AppResult<Group>;

    /// Creates a group and returns the stored representation.
    async fn create_group(&self, group: &Group) -> AppResult<Group>;

    /// Updates a group.
    ///
    /// Returns `None` when the backend acknowledged the update without a body.
    async fn update_group(&self, group_id: &str, group: &Group) -> AppResult<Option<Group>>;

    /// Deletes a group.
    async fn delete_group(&self, group_id: &str) -> AppResult<()>;
}

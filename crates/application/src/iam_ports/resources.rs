use async_trait::async_trait;
use warden_core::AppResult;
use warden_domain::Resource;

/// Port for tenant ABAC resources (V1 API).
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// Fetches one resource by identifier.
    async fn get_resource(&self, resource_id: &str) -> AppResult<Resource>;

    /// Creates a resource under its client-supplied identifier.
    async fn create_resource(&self, resource: &Resource) -> AppResult<Resource>;

    /// Updates a resource.
    ///
    /// Returns `None` when the backend acknowledged the update without a body.
    async fn update_resource(
        &self,
        resource_id: &str,
        resource: &Resource,
    ) -> AppResult<Option<Resource>>;

    /// Deletes a resource.
    async fn delete_resource(&self, resource_id: &str) -> AppResult<()>;
}

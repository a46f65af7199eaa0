use std::sync::Arc;

use tracing::debug;
use warden_core::AppResult;
use warden_domain::{Resource, validate_resource_id};

use crate::iam_ports::ResourceGateway;

/// Application service for tenant ABAC resources.
#[derive(Clone)]
pub struct ResourceService {
    gateway: Arc<dyn ResourceGateway>,
}

impl ResourceService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(gateway: Arc<dyn ResourceGateway>) -> Self {
        Self { gateway }
    }

    /// Validates and creates a resource.
    pub async fn create(&self, resource: Resource) -> AppResult<Resource> {
        resource.validate()?;
        self.gateway.create_resource(&resource).await
    }

    /// Fetches a resource.
    pub async fn get(&self, resource_id: &str) -> AppResult<Resource> {
        validate_resource_id(resource_id)?;
        self.gateway.get_resource(resource_id).await
    }

    /// Validates and updates a resource, re-fetching it when the backend
    /// returns no body.
    pub async fn update(&self, resource_id: &str, resource: Resource) -> AppResult<Resource> {
        validate_resource_id(resource_id)?;
        resource.validate()?;
        match self.gateway.update_resource(resource_id, &resource).await? {
            Some(updated) => Ok(updated),
            None => {
                debug!(
                    resource_id = resource_id,
                    "resource update returned no body, re-fetching"
                );
                self.gateway.get_resource(resource_id).await
            }
        }
    }

    /// Deletes a resource.
    pub async fn delete(&self, resource_id: &str) -> AppResult<()> {
        validate_resource_id(resource_id)?;
        self.gateway.delete_resource(resource_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use warden_core::{AppError, AppResult};
    use warden_domain::Resource;

    use super::ResourceService;
    use crate::iam_ports::ResourceGateway;

    #[derive(Default)]
    struct CountingResourceGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResourceGateway for CountingResourceGateway {
        async fn get_resource(&self, resource_id: &str) -> AppResult<Resource> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::NotFound(format!("resource '{resource_id}'")))
        }

        async fn create_resource(&self, resource: &Resource) -> AppResult<Resource> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(resource.clone())
        }

        async fn update_resource(
            &self,
            _resource_id: &str,
            resource: &Resource,
        ) -> AppResult<Option<Resource>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(resource.clone()))
        }

        async fn delete_resource(&self, _resource_id: &str) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_ids_never_reach_the_gateway() {
        let gateway = Arc::new(CountingResourceGateway::default());
        let service = ResourceService::new(gateway.clone());

        let created = service
            .create(Resource {
                id: String::new(),
                name: "sales".to_owned(),
                ..Resource::default()
            })
            .await;
        let deleted = service.delete("a__b").await;

        assert!(matches!(created, Err(AppError::Validation(_))));
        assert!(matches!(deleted, Err(AppError::Validation(_))));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_returns_gateway_body_when_present() {
        let service = ResourceService::new(Arc::new(CountingResourceGateway::default()));

        let updated = service
            .update(
                "datasets.sales",
                Resource {
                    id: "datasets.sales".to_owned(),
                    name: "Sales".to_owned(),
                    ..Resource::default()
                },
            )
            .await;

        assert_eq!(updated.ok().map(|resource| resource.name), Some("Sales".to_owned()));
    }
}

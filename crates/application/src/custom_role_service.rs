use std::sync::Arc;

use tracing::debug;
use warden_core::AppResult;
use warden_domain::CustomRole;

use crate::iam_ports::CustomRoleGateway;

/// Application service for tenant custom roles.
#[derive(Clone)]
pub struct CustomRoleService {
    gateway: Arc<dyn CustomRoleGateway>,
}

impl CustomRoleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(gateway: Arc<dyn CustomRoleGateway>) -> Self {
        Self { gateway }
    }

    /// Validates and creates a custom role.
    pub async fn create(&self, role: CustomRole) -> AppResult<CustomRole> {
        role.validate()?;
        self.gateway.create_custom_role(&role).await
    }

    /// Fetches a custom role.
    pub async fn get(&self, role_id: &str) -> AppResult<CustomRole> {
        self.gateway.get_custom_role(role_id).await
    }

    /// Validates and updates a custom role, re-fetching it when the backend
    /// returns no body.
    pub async fn update(&self, role_id: &str, role: CustomRole) -> AppResult<CustomRole> {
        role.validate()?;
        match self.gateway.update_custom_role(role_id, &role).await? {
            Some(updated) => Ok(updated),
            None => {
                debug!(role_id = role_id, "custom role update returned no body, re-fetching");
                self.gateway.get_custom_role(role_id).await
            }
        }
    }

    /// Deletes a custom role.
    pub async fn delete(&self, role_id: &str) -> AppResult<()> {
        self.gateway.delete_custom_role(role_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use warden_core::{AppError, AppResult};
    use warden_domain::{CustomRole, Permission};

    use super::CustomRoleService;
    use crate::iam_ports::CustomRoleGateway;

    #[derive(Default)]
    struct FakeCustomRoleGateway {
        roles: Mutex<Vec<CustomRole>>,
    }

    #[async_trait]
    impl CustomRoleGateway for FakeCustomRoleGateway {
        async fn get_custom_role(&self, role_id: &str) -> AppResult<CustomRole> {
            self.roles
                .lock()
                .await
                .iter()
                .find(|role| role.id == role_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("custom role '{role_id}'")))
        }

        async fn create_custom_role(&self, role: &CustomRole) -> AppResult<CustomRole> {
            self.roles.lock().await.push(role.clone());
            Ok(role.clone())
        }

        async fn update_custom_role(
            &self,
            role_id: &str,
            role: &CustomRole,
        ) -> AppResult<Option<CustomRole>> {
            let mut roles = self.roles.lock().await;
            if let Some(stored) = roles.iter_mut().find(|stored| stored.id == role_id) {
                *stored = role.clone();
            }
            Ok(None)
        }

        async fn delete_custom_role(&self, role_id: &str) -> AppResult<()> {
            self.roles.lock().await.retain(|role| role.id != role_id);
            Ok(())
        }
    }

    fn analyst(permission_id: &str) -> CustomRole {
        CustomRole {
            id: "analyst".to_owned(),
            title: Some("Analyst".to_owned()),
            permissions: vec![Permission {
                id: permission_id.to_owned(),
                attributes: None,
            }],
            ..CustomRole::default()
        }
    }

    #[tokio::test]
    async fn update_returns_refetched_role() {
        let service = CustomRoleService::new(Arc::new(FakeCustomRoleGateway::default()));
        assert!(service.create(analyst("iam.groups.read")).await.is_ok());

        let updated = service
            .update("analyst", analyst("iam.groups.list"))
            .await;

        assert!(updated.is_ok());
        let updated = updated.unwrap_or_else(|_| unreachable!());
        assert_eq!(updated.permissions[0].id, "iam.groups.list");
    }

    #[tokio::test]
    async fn invalid_permission_ids_are_rejected() {
        let gateway = Arc::new(FakeCustomRoleGateway::default());
        let service = CustomRoleService::new(gateway.clone());

        let result = service.create(analyst("groups.read")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(gateway.roles.lock().await.is_empty());
    }
}

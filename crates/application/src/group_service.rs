use std::sync::Arc;

use tracing::debug;
use warden_core::AppResult;
use warden_domain::Group;

use crate::iam_ports::GroupGateway;

/// Application service for tenant groups.
#[derive(Clone)]
pub struct GroupService {
    gateway: Arc<dyn GroupGateway>,
}

impl GroupService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(gateway: Arc<dyn GroupGateway>) -> Self {
        Self { gateway }
    }

    /// Validates and creates a group.
    pub async fn create(&self, group: Group) -> AppResult<Group> {
        group.validate()?;
        self.gateway.create_group(&group).await
    }

    /// Fetches a group.
    pub async fn get(&self, group_id: &str) -> AppResult<Group> {
        self.gateway.get_group(group_id).await
    }

    /// Validates and updates a group, re-fetching it when the backend returns
    /// no body.
    pub async fn update(&self, group_id: &str, group: Group) -> AppResult<Group> {
        group.validate()?;
        match self.gateway.update_group(group_id, &group).await? {
            Some(updated) => Ok(updated),
            None => {
                debug!(group_id = group_id, "group update returned no body, re-fetching");
                self.gateway.get_group(group_id).await
            }
        }
    }

    /// Deletes a group.
    pub async fn delete(&self, group_id: &str) -> AppResult<()> {
        self.gateway.delete_group(group_id).await
    }
}

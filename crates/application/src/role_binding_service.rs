//! Role binding reconciliation.
//!
//! A role binding has no backend object of its own. It is a V2 group-role
//! assignment addressed by a synthesized [`RoleBindingId`], and the V2 listing
//! endpoint is known to omit assignments that were just created. The service
//! therefore reconstructs bindings from the parsed identifier whenever the
//! group still exists, and only reports a binding as gone when its group is.

use std::sync::Arc;

use tracing::debug;
use warden_core::{AppError, AppResult};
use warden_domain::{Group, RoleBinding, RoleBindingId};

use crate::iam_ports::{GroupGateway, GroupRoleGateway};

mod create;
mod delete;
mod matching;
mod read;
mod update;

/// Where a reconciled binding's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// Echoed from the planned binding after a successful write.
    Plan,
    /// Found in the group's V2 role listing.
    Listed,
    /// Rebuilt from the identifier because the listing omitted the role.
    Reconstructed,
}

/// Role binding together with its parsed identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledBinding {
    /// Parsed composite identifier.
    pub binding_id: RoleBindingId,
    /// Terraform-facing binding.
    pub binding: RoleBinding,
    /// Provenance of the binding data.
    pub source: BindingSource,
}

/// Application service reconciling declarative role bindings with V2 group
/// role assignments.
#[derive(Clone)]
pub struct RoleBindingService {
    groups: Arc<dyn GroupGateway>,
    group_roles: Arc<dyn GroupRoleGateway>,
}

impl RoleBindingService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(groups: Arc<dyn GroupGateway>, group_roles: Arc<dyn GroupRoleGateway>) -> Self {
        Self {
            groups,
            group_roles,
        }
    }

    /// Parses a composite binding identifier, preferring a known group ID.
    pub fn parse_id(id: &str, known_group_id: Option<&str>) -> AppResult<RoleBindingId> {
        match known_group_id {
            Some(group_id) => RoleBindingId::parse_with_group(id, group_id),
            None => RoleBindingId::parse(id),
        }
    }

    async fn resolve_group_by_name(&self, group_name: &str) -> AppResult<Group> {
        let groups = self.groups.list_groups().await?;
        debug!(
            group_name = group_name,
            group_count = groups.len(),
            "resolving group name"
        );

        groups
            .into_iter()
            .find(|group| group.name == group_name)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_name}' does not exist")))
    }
}

#[cfg(test)]
mod tests;

//! Terraform resource adapters for the Warden IAM API.

#![forbid(unsafe_code)]

mod abac_resource;
mod custom_role_resource;
pub mod framework;
mod group_resource;
pub mod provider_data;
mod role_binding_resource;

#[cfg(test)]
mod test_support;

pub use abac_resource::{AbacResource, AbacResourceModel};
pub use custom_role_resource::{CustomRoleModel, CustomRoleResource, PermissionModel};
pub use group_resource::{GroupModel, GroupResource};
pub use role_binding_resource::{RoleBindingModel, RoleBindingResource};

use framework::Resource;

/// Builds one unconfigured instance of every resource type.
#[must_use]
pub fn all_resources() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(GroupResource::new()),
        Box::new(CustomRoleResource::new()),
        Box::new(AbacResource::new()),
        Box::new(RoleBindingResource::new()),
    ]
}

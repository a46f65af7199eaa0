//! Application services and ports.

#![forbid(unsafe_code)]

mod custom_role_service;
mod group_service;
mod iam_ports;
mod resource_service;
mod role_binding_service;

pub use custom_role_service::CustomRoleService;
pub use group_service::GroupService;
pub use iam_ports::{
    AssignGroupRoleInput, CustomRoleGateway, GroupGateway, GroupRoleAssignment,
    GroupRoleGateway, ResourceGateway,
};
pub use resource_service::ResourceService;
pub use role_binding_service::{BindingSource, ReconciledBinding, RoleBindingService};

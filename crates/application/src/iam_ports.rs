mod custom_roles;
mod group_roles;
mod groups;
mod resources;

pub use custom_roles::CustomRoleGateway;
pub use group_roles::{AssignGroupRoleInput, GroupRoleAssignment, GroupRoleGateway};
pub use groups::GroupGateway;
pub use resources::ResourceGateway;

//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod attribute;
mod custom_role;
mod group;
mod resource;
mod role_binding;

pub use attribute::{
    ATTRIBUTE_KEY_MAX_LENGTH, ATTRIBUTE_MAX_KEYS, ATTRIBUTE_STRING_MAX_LENGTH, AttributeMap,
    AttributeValue, validate_attributes,
};
pub use custom_role::{CustomRole, Permission, validate_custom_role_id, validate_permission_id};
pub use group::{Group, Member};
pub use resource::{RESOURCE_ID_MAX_LENGTH, Resource, validate_resource_id};
pub use role_binding::{
    CUSTOM_ROLE_PREFIX, ROLE_PREFIX, RoleBinding, RoleBindingId, RoleRef,
};

use warden_domain::{CUSTOM_ROLE_PREFIX, RoleRef};

use crate::iam_ports::GroupRoleAssignment;

const CUSTOM_ROLE_PATH_PREFIX: &str = "custom-roles/";

/// Returns true when a listed assignment refers to `role`.
///
/// The backend reports custom role identifiers inconsistently (`Analyst`,
/// `custom.Analyst` or `custom-roles/custom.Analyst`), so every form is
/// accepted for custom roles. System roles match on the bare name.
pub(super) fn assignment_matches(assignment: &GroupRoleAssignment, role: &RoleRef) -> bool {
    let returned = assignment.role_id.as_str();

    if !role.is_custom() {
        return !assignment.is_custom && returned == role.name();
    }

    let identifier = role.identifier();
    let without_path = returned
        .strip_prefix(CUSTOM_ROLE_PATH_PREFIX)
        .unwrap_or(returned);
    let bare = without_path
        .strip_prefix(CUSTOM_ROLE_PREFIX)
        .unwrap_or(without_path);

    returned == identifier
        || returned == role.name()
        || without_path == identifier
        || bare == role.name()
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::{AppError, AppResult};
use warden_domain::{Group, RoleBinding, RoleBindingId, RoleRef};

use crate::iam_ports::{
    AssignGroupRoleInput, GroupGateway, GroupRoleAssignment, GroupRoleGateway,
};

use super::{BindingSource, RoleBindingService};

#[derive(Default)]
struct FakeGroupGateway {
    groups: Vec<Group>,
}

#[async_trait]
impl GroupGateway for FakeGroupGateway {
    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        Ok(self.groups.clone())
    }

    async fn get_group(&self, group_id: &str) -> AppResult<Group> {
        self.groups
            .iter()
            .find(|group| group.id == group_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' not found")))
    }

    async fn create_group(&self, group: &Group) -> AppResult<Group> {
        Ok(group.clone())
    }

    async fn update_group(&self, _group_id: &str, group: &Group) -> AppResult<Option<Group>> {
        Ok(Some(group.clone()))
    }

    async fn delete_group(&self, _group_id: &str) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum RemoveOutcome {
    Succeed,
    Forbidden,
    NotFound,
}

struct FakeGroupRoleGateway {
    listed: Mutex<HashMap<String, Vec<GroupRoleAssignment>>>,
    posts: Mutex<Vec<(String, AssignGroupRoleInput)>>,
    removals: Mutex<Vec<(String, RoleRef)>>,
    remove_outcome: RemoveOutcome,
    fail_posts: bool,
    listing_failure: Option<ListingFailure>,
}

#[derive(Clone, Copy)]
enum ListingFailure {
    NotFound,
    Unavailable,
}

impl FakeGroupRoleGateway {
    fn new(remove_outcome: RemoveOutcome) -> Self {
        Self {
            listed: Mutex::new(HashMap::new()),
            posts: Mutex::new(Vec::new()),
            removals: Mutex::new(Vec::new()),
            remove_outcome,
            fail_posts: false,
            listing_failure: None,
        }
    }

    fn with_listing(mut self, group_id: &str, assignments: Vec<GroupRoleAssignment>) -> Self {
        self.listed
            .get_mut()
            .insert(group_id.to_owned(), assignments);
        self
    }
}

#[async_trait]
impl GroupRoleGateway for FakeGroupRoleGateway {
    async fn list_group_roles(&self, group_id: &str) -> AppResult<Vec<GroupRoleAssignment>> {
        match self.listing_failure {
            Some(ListingFailure::NotFound) => {
                return Err(AppError::NotFound("HTTP 404: no roles".to_owned()));
            }
            Some(ListingFailure::Unavailable) => {
                return Err(AppError::Unavailable("HTTP 503 after 5 attempt(s)".to_owned()));
            }
            None => {}
        }
        Ok(self
            .listed
            .lock()
            .await
            .get(group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn assign_group_role(
        &self,
        group_id: &str,
        input: &AssignGroupRoleInput,
    ) -> AppResult<()> {
        self.posts
            .lock()
            .await
            .push((group_id.to_owned(), input.clone()));
        if self.fail_posts {
            return Err(AppError::Validation("rejected".to_owned()));
        }
        Ok(())
    }

    async fn remove_group_role(&self, group_id: &str, role: &RoleRef) -> AppResult<()> {
        self.removals
            .lock()
            .await
            .push((group_id.to_owned(), role.clone()));
        match self.remove_outcome {
            RemoveOutcome::Succeed => Ok(()),
            RemoveOutcome::Forbidden => Err(AppError::Forbidden("status 403".to_owned())),
            RemoveOutcome::NotFound => Err(AppError::NotFound("status 404".to_owned())),
        }
    }
}

fn eng_group() -> Group {
    Group {
        id: "g1".to_owned(),
        name: "eng".to_owned(),
        created_at: Some("2024-01-01T00:00:00Z".to_owned()),
        updated_at: Some("2024-02-01T00:00:00Z".to_owned()),
        ..Group::default()
    }
}

fn service(group_roles: Arc<FakeGroupRoleGateway>) -> RoleBindingService {
    let groups = Arc::new(FakeGroupGateway {
        groups: vec![
            eng_group(),
            Group {
                id: "g2".to_owned(),
                name: "ops".to_owned(),
                ..Group::default()
            },
        ],
    });

    RoleBindingService::new(groups, group_roles)
}

fn plan(role: &str, group: &str) -> RoleBinding {
    RoleBinding {
        name: Some("analysts".to_owned()),
        role: role.to_owned(),
        members: vec![format!("group:{group}")],
        condition: Some("request.time < '2030-01-01'".to_owned()),
        ..RoleBinding::default()
    }
}

fn binding_id(id: &str) -> RoleBindingId {
    RoleBindingId::parse(id).unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn create_resolves_group_and_posts_unscoped_assignment() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::Succeed));
    let service = service(group_roles.clone());

    let created = service.create(plan("roles/custom.Analyst", "eng")).await;

    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());
    assert_eq!(created.binding.id, "g1-custom.Analyst");
    assert_eq!(created.binding.role, "roles/custom.Analyst");
    assert_eq!(created.binding.members, vec!["group:eng".to_owned()]);
    assert_eq!(created.binding.name.as_deref(), Some("analysts"));
    assert_eq!(created.binding_id.group_id(), "g1");
    assert_eq!(created.source, BindingSource::Plan);

    let posts = group_roles.posts.lock().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, "g1");
    assert_eq!(
        posts[0].1,
        AssignGroupRoleInput {
            role_id: "Analyst".to_owned(),
            is_custom: true,
            bindings: Vec::new(),
        }
    );
}

#[tokio::test]
async fn create_requires_a_group_member_before_calling_the_api() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::Succeed));
    let service = service(group_roles.clone());

    let mut binding = plan("roles/viewer", "eng");
    binding.members.clear();
    let result = service.create(binding).await;

    assert!(
        matches!(result, Err(AppError::Validation(ref message)) if message.contains("requires a group member"))
    );
    assert!(group_roles.posts.lock().await.is_empty());
}

#[tokio::test]
async fn create_fails_for_unknown_group_names() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::Succeed));
    let service = service(group_roles.clone());

    let result = service.create(plan("roles/viewer", "finance")).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(group_roles.posts.lock().await.is_empty());
}

#[tokio::test]
async fn read_after_create_binds_listed_custom_role() {
    let group_roles = Arc::new(
        FakeGroupRoleGateway::new(RemoveOutcome::Succeed).with_listing(
            "g1",
            vec![GroupRoleAssignment {
                role_id: "Analyst".to_owned(),
                is_custom: true,
                ..GroupRoleAssignment::default()
            }],
        ),
    );
    let service = service(group_roles);

    let read = service.read(&binding_id("g1-custom.Analyst")).await;

    assert!(read.is_ok());
    let read = read.unwrap_or_else(|_| unreachable!());
    assert_eq!(read.source, BindingSource::Listed);
    assert_eq!(read.binding.id, "g1-custom.Analyst");
    assert_eq!(read.binding.role, "roles/custom.Analyst");
    assert_eq!(read.binding.members, vec!["group:eng".to_owned()]);
    assert_eq!(
        read.binding.created_at.as_deref(),
        Some("2024-01-01T00:00:00Z")
    );
}

#[tokio::test]
async fn read_keeps_parsed_role_format_when_backend_reports_path_form() {
    let group_roles = Arc::new(
        FakeGroupRoleGateway::new(RemoveOutcome::Succeed).with_listing(
            "g1",
            vec![GroupRoleAssignment {
                role_id: "custom-roles/custom.Analyst".to_owned(),
                is_custom: true,
                updated_at: Some("2024-03-01T00:00:00Z".to_owned()),
                ..GroupRoleAssignment::default()
            }],
        ),
    );
    let service = service(group_roles);

    let read = service
        .read(&binding_id("g1-custom.Analyst"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(read.source, BindingSource::Listed);
    assert_eq!(read.binding.role, "roles/custom.Analyst");
    assert_eq!(
        read.binding.updated_at.as_deref(),
        Some("2024-03-01T00:00:00Z")
    );
}

#[tokio::test]
async fn read_reconstructs_binding_missing_from_listing() {
    let group_roles = Arc::new(
        FakeGroupRoleGateway::new(RemoveOutcome::Succeed).with_listing(
            "g1",
            vec![GroupRoleAssignment {
                role_id: "viewer".to_owned(),
                ..GroupRoleAssignment::default()
            }],
        ),
    );
    let service = service(group_roles);

    let read = service.read(&binding_id("g1-custom.Analyst")).await;

    assert!(read.is_ok());
    let read = read.unwrap_or_else(|_| unreachable!());
    assert_eq!(read.source, BindingSource::Reconstructed);
    assert_eq!(read.binding.role, "roles/custom.Analyst");
    assert_eq!(read.binding.members, vec!["group:eng".to_owned()]);
}

#[tokio::test]
async fn read_reconstructs_binding_when_listing_is_not_found() {
    let mut gateway = FakeGroupRoleGateway::new(RemoveOutcome::Succeed);
    gateway.listing_failure = Some(ListingFailure::NotFound);
    let service = service(Arc::new(gateway));

    let read = service.read(&binding_id("g1-custom.Analyst")).await;

    assert!(read.is_ok());
    let read = read.unwrap_or_else(|_| unreachable!());
    assert_eq!(read.source, BindingSource::Reconstructed);
    assert_eq!(read.binding.role, "roles/custom.Analyst");
    assert_eq!(read.binding.members, vec!["group:eng".to_owned()]);
}

#[tokio::test]
async fn read_propagates_other_listing_failures() {
    let mut gateway = FakeGroupRoleGateway::new(RemoveOutcome::Succeed);
    gateway.listing_failure = Some(ListingFailure::Unavailable);
    let service = service(Arc::new(gateway));

    let result = service.read(&binding_id("g1-custom.Analyst")).await;

    assert!(matches!(result, Err(AppError::Unavailable(_))));
}

#[tokio::test]
async fn read_reports_not_found_when_group_is_gone() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::Succeed));
    let service = service(group_roles);

    let result = service.read(&binding_id("g9-viewer")).await;

    assert!(matches!(result, Err(AppError::NotFound(ref message)) if message.contains("g9-viewer")));
}

#[tokio::test]
async fn update_keeps_plan_intent_and_existing_identity() {
    let group_roles = Arc::new(
        FakeGroupRoleGateway::new(RemoveOutcome::Succeed).with_listing(
            "g1",
            vec![GroupRoleAssignment {
                role_id: "viewer".to_owned(),
                ..GroupRoleAssignment::default()
            }],
        ),
    );
    let service = service(group_roles.clone());

    let updated = service
        .update(&binding_id("g1-viewer"), plan("roles/editor", "ops"))
        .await;

    assert!(updated.is_ok());
    let updated = updated.unwrap_or_else(|_| unreachable!());
    assert_eq!(updated.binding.id, "g1-viewer");
    assert_eq!(updated.binding.role, "roles/editor");
    assert_eq!(updated.binding.name.as_deref(), Some("analysts"));
    assert_eq!(updated.binding.members, vec!["group:eng".to_owned()]);
    assert_eq!(
        updated.binding.created_at.as_deref(),
        Some("2024-01-01T00:00:00Z")
    );
    assert!(group_roles.posts.lock().await.is_empty());
    assert!(group_roles.removals.lock().await.is_empty());
}

#[tokio::test]
async fn update_stamps_missing_timestamps() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::Succeed));
    let service = service(group_roles);

    let updated = service
        .update(&binding_id("g2-viewer"), plan("roles/viewer", "ops"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(updated.binding.created_at.is_some());
    assert_eq!(updated.binding.created_at, updated.binding.updated_at);
}

#[tokio::test]
async fn update_of_missing_binding_is_not_found() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::Succeed));
    let service = service(group_roles);

    let result = service
        .update(&binding_id("g9-viewer"), plan("roles/viewer", "eng"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_removes_bare_role_name() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::Succeed));
    let service = service(group_roles.clone());

    let result = service.delete(&binding_id("g1-custom.Analyst")).await;

    assert!(result.is_ok());
    let removals = group_roles.removals.lock().await;
    assert_eq!(
        removals.as_slice(),
        &[("g1".to_owned(), RoleRef::custom("Analyst"))]
    );
    assert!(group_roles.posts.lock().await.is_empty());
}

#[tokio::test]
async fn delete_falls_back_to_empty_bindings_once_on_forbidden() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::Forbidden));
    let service = service(group_roles.clone());

    let result = service.delete(&binding_id("g1-viewer")).await;

    assert!(result.is_ok());
    let posts = group_roles.posts.lock().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].1.role_id, "viewer");
    assert!(!posts[0].1.is_custom);
    assert!(posts[0].1.bindings.is_empty());
}

#[tokio::test]
async fn delete_fallback_failure_is_terminal() {
    let mut gateway = FakeGroupRoleGateway::new(RemoveOutcome::Forbidden);
    gateway.fail_posts = true;
    let group_roles = Arc::new(gateway);
    let service = service(group_roles.clone());

    let result = service.delete(&binding_id("g1-viewer")).await;

    assert!(matches!(result, Err(AppError::Internal(ref message)) if message.contains("g1-viewer")));
    assert_eq!(group_roles.posts.lock().await.len(), 1);
}

#[tokio::test]
async fn delete_never_falls_back_on_other_failures() {
    let group_roles = Arc::new(FakeGroupRoleGateway::new(RemoveOutcome::NotFound));
    let service = service(group_roles.clone());

    let result = service.delete(&binding_id("g1-viewer")).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(group_roles.posts.lock().await.is_empty());
}

#[test]
fn parse_id_prefers_known_group() {
    let parsed = RoleBindingService::parse_id("team-a-viewer", Some("team-a"));
    assert_eq!(
        parsed.ok().map(|id| id.group_id().to_owned()),
        Some("team-a".to_owned())
    );

    let malformed = RoleBindingService::parse_id("abc", None);
    assert!(matches!(malformed, Err(AppError::Validation(_))));
}

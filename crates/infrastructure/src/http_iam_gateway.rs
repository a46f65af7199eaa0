use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderName, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use warden_application::{
    AssignGroupRoleInput, CustomRoleGateway, GroupGateway, GroupRoleAssignment, GroupRoleGateway,
    ResourceGateway,
};
use warden_core::{AppError, AppResult, TenantId};
use warden_domain::{CustomRole, Group, Resource, RoleRef};

use crate::http_transport::{HttpRequest, HttpTransport};
use crate::iam_wire::{
    CustomRoleDto, GroupDto, GroupListing, ResourceDto, RoleBindingDto, assignment_from_dto,
    assignment_payload, classify_status, custom_role_from_dto, custom_role_payload, decode,
    encode, group_from_dto, group_payload, resource_from_dto, resource_payload,
};

const TENANT_HEADER: &str = "x-tenant-id";

/// IAM REST API adapter implementing every gateway port for one tenant.
#[derive(Clone)]
pub struct HttpIamGateway {
    base_url: Url,
    tenant_id: TenantId,
    transport: Arc<dyn HttpTransport>,
}

impl HttpIamGateway {
    /// Creates a gateway for one tenant.
    pub fn new(
        base_url: &str,
        tenant_id: TenantId,
        transport: Arc<dyn HttpTransport>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid IAM base URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "IAM base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            base_url,
            tenant_id,
            transport,
        })
    }

    /// Returns the tenant every request is scoped to.
    #[must_use]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn endpoint(&self, version: &str, segments: &[&str]) -> AppResult<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!("IAM base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", version, "tenants", self.tenant_id.as_str()])
            .extend(segments);

        Ok(url.into())
    }

    /// Sends a request and returns the status and body of a success response.
    async fn execute(
        &self,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
        context: &str,
    ) -> AppResult<(StatusCode, Vec<u8>)> {
        let mut request = HttpRequest::new(method, url)
            .with_header(HeaderName::from_static(TENANT_HEADER), self.tenant_id.as_str())?
            .with_header(http::header::ACCEPT, "application/json")?;
        if let Some(body) = body {
            request = request.with_json_body(body);
        }

        debug!(method = %request.method, url = %request.url, "calling IAM API");
        let (status, body) = self.transport.send(&request).await?.into_parts().await?;
        if !status.is_success() {
            return Err(classify_status(status, &body, context));
        }

        Ok((status, body))
    }

    async fn fetch<T: DeserializeOwned>(&self, url: String, context: &str) -> AppResult<T> {
        let (_, body) = self.execute(Method::GET, url, None, context).await?;
        decode(&body, context)
    }

    async fn submit<P: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        payload: &P,
        context: &str,
    ) -> AppResult<Option<T>> {
        let body = encode(payload, context)?;
        let (status, body) = self.execute(method, url, Some(body), context).await?;
        if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        decode(&body, context).map(Some)
    }

    async fn remove(&self, url: String, context: &str) -> AppResult<()> {
        self.execute(Method::DELETE, url, None, context).await?;
        Ok(())
    }
}

fn created<T>(created: Option<T>, context: &str) -> AppResult<T> {
    created.ok_or_else(|| AppError::Internal(format!("{context}: response body was empty")))
}

#[async_trait]
impl GroupGateway for HttpIamGateway {
    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        let listing: GroupListing = self
            .fetch(self.endpoint("v1", &["groups"])?, "list groups")
            .await?;
        Ok(listing.into_groups())
    }

    async fn get_group(&self, group_id: &str) -> AppResult<Group> {
        let context = format!("get group '{group_id}'");
        let dto: GroupDto = self
            .fetch(self.endpoint("v1", &["groups", group_id])?, &context)
            .await?;
        Ok(group_from_dto(dto))
    }

    async fn create_group(&self, group: &Group) -> AppResult<Group> {
        let context = format!("create group '{}'", group.name);
        let dto: Option<GroupDto> = self
            .submit(
                Method::POST,
                self.endpoint("v1", &["groups"])?,
                &group_payload(group),
                &context,
            )
            .await?;
        created(dto, &context).map(group_from_dto)
    }

    async fn update_group(&self, group_id: &str, group: &Group) -> AppResult<Option<Group>> {
        let context = format!("update group '{group_id}'");
        let dto: Option<GroupDto> = self
            .submit(
                Method::PUT,
                self.endpoint("v1", &["groups", group_id])?,
                &group_payload(group),
                &context,
            )
            .await?;
        Ok(dto.map(group_from_dto))
    }

    async fn delete_group(&self, group_id: &str) -> AppResult<()> {
        self.remove(
            self.endpoint("v1", &["groups", group_id])?,
            &format!("delete group '{group_id}'"),
        )
        .await
    }
}

#[async_trait]
impl CustomRoleGateway for HttpIamGateway {
    async fn get_custom_role(&self, role_id: &str) -> AppResult<CustomRole> {
        let context = format!("get custom role '{role_id}'");
        let dto: CustomRoleDto = self
            .fetch(self.endpoint("v1", &["custom-roles", role_id])?, &context)
            .await?;
        Ok(custom_role_from_dto(dto))
    }

    async fn create_custom_role(&self, role: &CustomRole) -> AppResult<CustomRole> {
        let context = format!("create custom role '{}'", role.id);
        let dto: Option<CustomRoleDto> = self
            .submit(
                Method::POST,
                self.endpoint("v1", &["custom-roles"])?,
                &custom_role_payload(role),
                &context,
            )
            .await?;
        created(dto, &context).map(custom_role_from_dto)
    }

    async fn update_custom_role(
        &self,
        role_id: &str,
        role: &CustomRole,
    ) -> AppResult<Option<CustomRole>> {
        let context = format!("update custom role '{role_id}'");
        let dto: Option<CustomRoleDto> = self
            .submit(
                Method::PUT,
                self.endpoint("v1", &["custom-roles", role_id])?,
                &custom_role_payload(role),
                &context,
            )
            .await?;
        Ok(dto.map(custom_role_from_dto))
    }

    async fn delete_custom_role(&self, role_id: &str) -> AppResult<()> {
        self.remove(
            self.endpoint("v1", &["custom-roles", role_id])?,
            &format!("delete custom role '{role_id}'"),
        )
        .await
    }
}

#[async_trait]
impl ResourceGateway for HttpIamGateway {
    async fn get_resource(&self, resource_id: &str) -> AppResult<Resource> {
        let context = format!("get resource '{resource_id}'");
        let dto: ResourceDto = self
            .fetch(self.endpoint("v1", &["resources", resource_id])?, &context)
            .await?;
        Ok(resource_from_dto(dto))
    }

    async fn create_resource(&self, resource: &Resource) -> AppResult<Resource> {
        let context = format!("create resource '{}'", resource.id);
        let dto: Option<ResourceDto> = self
            .submit(
                Method::POST,
                self.endpoint("v1", &["resources"])?,
                &resource_payload(resource),
                &context,
            )
            .await?;
        created(dto, &context).map(resource_from_dto)
    }

    async fn update_resource(
        &self,
        resource_id: &str,
        resource: &Resource,
    ) -> AppResult<Option<Resource>> {
        let context = format!("update resource '{resource_id}'");
        let dto: Option<ResourceDto> = self
            .submit(
                Method::PUT,
                self.endpoint("v1", &["resources", resource_id])?,
                &resource_payload(resource),
                &context,
            )
            .await?;
        Ok(dto.map(resource_from_dto))
    }

    async fn delete_resource(&self, resource_id: &str) -> AppResult<()> {
        self.remove(
            self.endpoint("v1", &["resources", resource_id])?,
            &format!("delete resource '{resource_id}'"),
        )
        .await
    }
}

#[async_trait]
impl GroupRoleGateway for HttpIamGateway {
    async fn list_group_roles(&self, group_id: &str) -> AppResult<Vec<GroupRoleAssignment>> {
        let context = format!("list roles of group '{group_id}'");
        let dtos: Vec<RoleBindingDto> = self
            .fetch(self.endpoint("v2", &["groups", group_id, "roles"])?, &context)
            .await?;
        Ok(dtos.into_iter().map(assignment_from_dto).collect())
    }

    async fn assign_group_role(
        &self,
        group_id: &str,
        input: &AssignGroupRoleInput,
    ) -> AppResult<()> {
        let context = format!("assign role '{}' to group '{group_id}'", input.role_id);
        let body = encode(&assignment_payload(input), &context)?;
        // The V2 route answers with no usable body, so any 2xx payload is ignored.
        self.execute(
            Method::POST,
            self.endpoint("v2", &["groups", group_id, "roles"])?,
            Some(body),
            &context,
        )
        .await?;
        Ok(())
    }

    async fn remove_group_role(&self, group_id: &str, role: &RoleRef) -> AppResult<()> {
        self.remove(
            self.endpoint("v2", &["groups", group_id, "roles", role.name()])?,
            &format!("remove role '{}' from group '{group_id}'", role.name()),
        )
        .await
    }
}

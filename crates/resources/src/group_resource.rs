use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use warden_application::GroupService;
use warden_domain::Group;

use crate::framework::{
    Attribute, AttributeKind, Diagnostics, Resource, ResourceMetadata, Schema, decode_model,
    encode_state, report_unconfigured,
};
use crate::provider_data::{ProviderData, configure_gateway};

const TYPE_NAME: &str = "warden_group";

/// Terraform model of `warden_group`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupModel {
    /// Server-assigned identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Group name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Member tags.
    #[serde(default)]
    pub members: Option<Vec<String>>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl GroupModel {
    fn to_domain(&self) -> Group {
        Group {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.clone(),
            description: self.description.clone(),
            members: self.members.clone().unwrap_or_default(),
            created_at: None,
            updated_at: None,
        }
    }

    fn from_domain(group: Group, prior: &Self) -> Self {
        Self {
            id: Some(group.id),
            name: group.name,
            description: group.description,
            members: if group.members.is_empty() && prior.members.is_none() {
                None
            } else {
                Some(group.members)
            },
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

/// `warden_group` resource.
#[derive(Default)]
pub struct GroupResource {
    service: Option<GroupService>,
}

impl GroupResource {
    /// Creates an unconfigured resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn service(&self, diagnostics: &mut Diagnostics) -> Option<&GroupService> {
        if self.service.is_none() {
            report_unconfigured(TYPE_NAME, diagnostics);
        }
        self.service.as_ref()
    }
}

#[async_trait]
impl Resource for GroupResource {
    fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            type_name: TYPE_NAME,
        }
    }

    fn schema(&self) -> Schema {
        Schema::new("Manages an IAM group within the tenant.")
            .attribute(
                "id",
                Attribute::computed(AttributeKind::String, "Server-assigned group identifier."),
            )
            .attribute(
                "name",
                Attribute::required(AttributeKind::String, "Tenant-unique group name.")
                    .with_length(1, 256),
            )
            .attribute(
                "description",
                Attribute::optional(AttributeKind::String, "Group description."),
            )
            .attribute(
                "members",
                Attribute::optional(
                    AttributeKind::StringList,
                    "Members as `user:<email>` or `group:<name>`.",
                ),
            )
            .attribute(
                "created_at",
                Attribute::computed(AttributeKind::String, "Creation timestamp."),
            )
            .attribute(
                "updated_at",
                Attribute::computed(AttributeKind::String, "Last update timestamp."),
            )
    }

    fn configure(&mut self, provider_data: Option<&dyn ProviderData>, diagnostics: &mut Diagnostics) {
        if let Some(gateway) = configure_gateway(TYPE_NAME, provider_data, diagnostics) {
            self.service = Some(GroupService::new(gateway));
        }
    }

    async fn create(&self, plan: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: GroupModel = decode_model(plan, TYPE_NAME, diagnostics)?;

        match service.create(model.to_domain()).await {
            Ok(group) => {
                info!(group_id = %group.id, name = %group.name, "created group");
                encode_state(&GroupModel::from_domain(group, &model), TYPE_NAME, diagnostics)
            }
            Err(error) => {
                diagnostics.add_app_error("create", &format!("group '{}'", model.name), &error);
                None
            }
        }
    }

    async fn read(&self, state: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: GroupModel = decode_model(state, TYPE_NAME, diagnostics)?;
        let group_id = model.id.clone().unwrap_or_default();

        match service.get(group_id.as_str()).await {
            Ok(group) => encode_state(&GroupModel::from_domain(group, &model), TYPE_NAME, diagnostics),
            Err(error) if error.is_not_found() => None,
            Err(error) => {
                diagnostics.add_app_error("read", &format!("group '{group_id}'"), &error);
                None
            }
        }
    }

    async fn update(
        &self,
        plan: &Value,
        prior_state: &Value,
        diagnostics: &mut Diagnostics,
    ) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: GroupModel = decode_model(plan, TYPE_NAME, diagnostics)?;
        let prior: GroupModel = decode_model(prior_state, TYPE_NAME, diagnostics)?;
        let group_id = prior.id.clone().unwrap_or_default();

        match service.update(group_id.as_str(), model.to_domain()).await {
            Ok(group) => encode_state(&GroupModel::from_domain(group, &model), TYPE_NAME, diagnostics),
            Err(error) => {
                diagnostics.add_app_error("update", &format!("group '{group_id}'"), &error);
                None
            }
        }
    }

    async fn delete(&self, state: &Value, diagnostics: &mut Diagnostics) {
        let Some(service) = self.service(diagnostics) else {
            return;
        };
        let Some(model) = decode_model::<GroupModel>(state, TYPE_NAME, diagnostics) else {
            return;
        };
        let group_id = model.id.unwrap_or_default();

        match service.delete(group_id.as_str()).await {
            Ok(()) => info!(group_id = %group_id, "deleted group"),
            Err(error) if error.is_not_found() => {}
            Err(error) => {
                diagnostics.add_app_error("delete", &format!("group '{group_id}'"), &error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::Method;
    use serde_json::json;

    use super::GroupResource;
    use crate::framework::{Diagnostics, Resource};
    use crate::test_support::{FakeIamApi, configured};

    #[tokio::test]
    async fn update_with_no_content_refreshes_from_the_api() {
        let api = Arc::new(
            FakeIamApi::default()
                .route(Method::PUT, "v1/tenants/t1/groups/g1", 204, "")
                .route(
                    Method::GET,
                    "v1/tenants/t1/groups/g1",
                    200,
                    r#"{"id":"g1","name":"eng","description":"Engineering","updatedAt":"2026-03-01T00:00:00Z"}"#,
                ),
        );
        let resource = configured(GroupResource::new(), &api);
        let mut diagnostics = Diagnostics::default();

        let state = resource
            .update(
                &json!({"name": "eng", "description": "Engineering"}),
                &json!({"id": "g1", "name": "eng"}),
                &mut diagnostics,
            )
            .await;

        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let state = state.unwrap_or_else(|| unreachable!());
        assert_eq!(state["updated_at"], "2026-03-01T00:00:00Z");
        assert_eq!(state["members"], json!(null));
    }

    #[tokio::test]
    async fn read_removes_missing_group_from_state() {
        let api = Arc::new(FakeIamApi::default());
        let resource = configured(GroupResource::new(), &api);
        let mut diagnostics = Diagnostics::default();

        let state = resource
            .read(&json!({"id": "g404", "name": "gone"}), &mut diagnostics)
            .await;

        assert!(state.is_none());
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn create_reports_conflicts_with_the_api_message() {
        let api = Arc::new(FakeIamApi::default().route(
            Method::POST,
            "v1/tenants/t1/groups",
            409,
            r#"{"message":"group name already in use"}"#,
        ));
        let resource = configured(GroupResource::new(), &api);
        let mut diagnostics = Diagnostics::default();

        let state = resource.create(&json!({"name": "eng"}), &mut diagnostics).await;

        assert!(state.is_none());
        assert!(diagnostics.has_error());
        let detail = &diagnostics.entries()[0].detail;
        assert!(detail.contains("create group 'eng'"), "{detail}");
        assert!(detail.contains("group name already in use"), "{detail}");
    }

    #[tokio::test]
    async fn invalid_members_never_reach_the_api() {
        let api = Arc::new(FakeIamApi::default());
        let resource = configured(GroupResource::new(), &api);
        let mut diagnostics = Diagnostics::default();

        let state = resource
            .create(
                &json!({"name": "eng", "members": ["robot:r2d2"]}),
                &mut diagnostics,
            )
            .await;

        assert!(state.is_none());
        assert!(diagnostics.has_error());
        assert!(api.calls().await.is_empty());
    }
}

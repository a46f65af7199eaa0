use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use warden_application::CustomRoleService;
use warden_domain::{AttributeMap, CustomRole, Permission};

use crate::framework::{
    Attribute, AttributeKind, Diagnostics, Resource, ResourceMetadata, Schema, decode_model,
    encode_state, report_unconfigured,
};
use crate::provider_data::{ProviderData, configure_gateway};

const TYPE_NAME: &str = "warden_custom_role";

/// One permission block of `warden_custom_role`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionModel {
    /// Permission identifier.
    pub id: String,
    /// Optional ABAC attributes.
    #[serde(default)]
    pub attributes: Option<AttributeMap>,
}

/// Terraform model of `warden_custom_role`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomRoleModel {
    /// Client-supplied identifier.
    pub id: String,
    /// Role name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Granted permissions.
    #[serde(default)]
    pub permissions: Vec<PermissionModel>,
    /// Launch stage label.
    #[serde(default)]
    pub stage: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl From<&CustomRoleModel> for CustomRole {
    fn from(model: &CustomRoleModel) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            title: model.title.clone(),
            description: model.description.clone(),
            permissions: model
                .permissions
                .iter()
                .map(|permission| Permission {
                    id: permission.id.clone(),
                    attributes: permission.attributes.clone(),
                })
                .collect(),
            stage: model.stage.clone(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<CustomRole> for CustomRoleModel {
    fn from(role: CustomRole) -> Self {
        Self {
            id: role.id,
            name: role.name,
            title: role.title,
            description: role.description,
            permissions: role
                .permissions
                .into_iter()
                .map(|permission| PermissionModel {
                    id: permission.id,
                    attributes: permission.attributes,
                })
                .collect(),
            stage: role.stage,
            created_at: role.created_at,
            updated_at: role.updated_at,
        }
    }
}

/// `warden_custom_role` resource.
#[derive(Default)]
pub struct CustomRoleResource {
    service: Option<CustomRoleService>,
}

impl CustomRoleResource {
    /// Creates an unconfigured resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn service(&self, diagnostics: &mut Diagnostics) -> Option<&CustomRoleService> {
        if self.service.is_none() {
            report_unconfigured(TYPE_NAME, diagnostics);
        }
        self.service.as_ref()
    }
}

#[async_trait]
impl Resource for CustomRoleResource {
    fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            type_name: TYPE_NAME,
        }
    }

    fn schema(&self) -> Schema {
        Schema::new("Manages a tenant custom role.")
            .attribute(
                "id",
                Attribute::required(AttributeKind::String, "Stable role identifier.")
                    .with_length(1, 256),
            )
            .attribute("name", Attribute::optional_computed(AttributeKind::String, "Role name."))
            .attribute("title", Attribute::optional(AttributeKind::String, "Role title."))
            .attribute(
                "description",
                Attribute::optional(AttributeKind::String, "Role description."),
            )
            .attribute(
                "permissions",
                Attribute::optional(
                    AttributeKind::ObjectList,
                    "Permissions as `{id, attributes}` objects.",
                ),
            )
            .attribute("stage", Attribute::optional(AttributeKind::String, "Launch stage."))
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
            self.service = Some(CustomRoleService::new(gateway));
        }
    }

    async fn create(&self, plan: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: CustomRoleModel = decode_model(plan, TYPE_NAME, diagnostics)?;

        match service.create(CustomRole::from(&model)).await {
            Ok(role) => {
                info!(role_id = %role.id, "created custom role");
                encode_state(&CustomRoleModel::from(role), TYPE_NAME, diagnostics)
            }
            Err(error) => {
                diagnostics.add_app_error("create", &format!("custom role '{}'", model.id), &error);
                None
            }
        }
    }

    async fn read(&self, state: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: CustomRoleModel = decode_model(state, TYPE_NAME, diagnostics)?;

        match service.get(model.id.as_str()).await {
            Ok(role) => encode_state(&CustomRoleModel::from(role), TYPE_NAME, diagnostics),
            Err(error) if error.is_not_found() => None,
            Err(error) => {
                diagnostics.add_app_error("read", &format!("custom role '{}'", model.id), &error);
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
        let model: CustomRoleModel = decode_model(plan, TYPE_NAME, diagnostics)?;
        let prior: CustomRoleModel = decode_model(prior_state, TYPE_NAME, diagnostics)?;

        match service
            .update(prior.id.as_str(), CustomRole::from(&model))
            .await
        {
            Ok(role) => encode_state(&CustomRoleModel::from(role), TYPE_NAME, diagnostics),
            Err(error) => {
                diagnostics.add_app_error("update", &format!("custom role '{}'", prior.id), &error);
                None
            }
        }
    }

    async fn delete(&self, state: &Value, diagnostics: &mut Diagnostics) {
        let Some(service) = self.service(diagnostics) else {
            return;
        };
        let Some(model) = decode_model::<CustomRoleModel>(state, TYPE_NAME, diagnostics) else {
            return;
        };

        match service.delete(model.id.as_str()).await {
            Ok(()) => info!(role_id = %model.id, "deleted custom role"),
            Err(error) if error.is_not_found() => {}
            Err(error) => {
                diagnostics.add_app_error("delete", &format!("custom role '{}'", model.id), &error);
            }
        }
    }
}

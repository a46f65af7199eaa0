use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use warden_application::{BindingSource, ReconciledBinding, RoleBindingService};
use warden_domain::{RoleBinding, RoleBindingId, RoleRef};

use crate::framework::{
    Attribute, AttributeKind, Diagnostics, Resource, ResourceMetadata, Schema, decode_model,
    encode_state, report_unconfigured,
};
use crate::provider_data::{ProviderData, configure_gateway};

const TYPE_NAME: &str = "warden_role_binding";

/// Terraform model of `warden_role_binding`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBindingModel {
    /// Composite `<group id>-<role identifier>` identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Group the role is assigned to. Computed; disambiguates `id`.
    #[serde(default)]
    pub group_id: Option<String>,
    /// Optional label. Not stored by the backend.
    #[serde(default)]
    pub name: Option<String>,
    /// `roles/<name>` or `roles/custom.<name>`.
    #[serde(default)]
    pub role: String,
    /// Exactly one `group:<name>` entry.
    #[serde(default)]
    pub members: Vec<String>,
    /// Optional condition expression. Not stored by the backend.
    #[serde(default)]
    pub condition: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RoleBindingModel {
    fn to_domain(&self) -> RoleBinding {
        RoleBinding {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.clone(),
            role: self.role.clone(),
            members: self.members.clone(),
            condition: self.condition.clone(),
            created_at: None,
            updated_at: None,
        }
    }

    fn from_reconciled(reconciled: ReconciledBinding) -> Self {
        Self {
            id: Some(reconciled.binding_id.to_string()),
            group_id: Some(reconciled.binding_id.group_id().to_owned()),
            name: reconciled.binding.name,
            role: reconciled.binding.role,
            members: reconciled.binding.members,
            condition: reconciled.binding.condition,
            created_at: reconciled.binding.created_at,
            updated_at: reconciled.binding.updated_at,
        }
    }

    fn binding_id(&self, diagnostics: &mut Diagnostics) -> Option<RoleBindingId> {
        let id = self.id.as_deref().unwrap_or_default();
        match RoleBindingService::parse_id(id, self.group_id.as_deref()) {
            Ok(binding_id) => Some(binding_id),
            Err(error) => {
                diagnostics.add_error(
                    "Invalid role binding identifier",
                    format!("role binding id '{id}' could not be parsed: {error}"),
                );
                None
            }
        }
    }
}

/// `warden_role_binding` resource.
#[derive(Default)]
pub struct RoleBindingResource {
    service: Option<RoleBindingService>,
}

impl RoleBindingResource {
    /// Creates an unconfigured resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn service(&self, diagnostics: &mut Diagnostics) -> Option<&RoleBindingService> {
        if self.service.is_none() {
            report_unconfigured(TYPE_NAME, diagnostics);
        }
        self.service.as_ref()
    }
}

#[async_trait]
impl Resource for RoleBindingResource {
    fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            type_name: TYPE_NAME,
        }
    }

    fn schema(&self) -> Schema {
        Schema::new("Assigns a system or custom role to a group.")
            .attribute(
                "id",
                Attribute::computed(AttributeKind::String, "Composite `<group id>-<role>` identifier."),
            )
            .attribute(
                "group_id",
                Attribute::computed(AttributeKind::String, "Identifier of the bound group."),
            )
            .attribute("name", Attribute::optional(AttributeKind::String, "Binding label."))
            .attribute(
                "role",
                Attribute::required(
                    AttributeKind::String,
                    "Role as `roles/<name>` or `roles/custom.<name>`.",
                )
                .with_length(1, 256),
            )
            .attribute(
                "members",
                Attribute::required(AttributeKind::StringList, "A single `group:<name>` member."),
            )
            .attribute(
                "condition",
                Attribute::optional(AttributeKind::String, "Condition expression."),
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
            self.service = Some(RoleBindingService::new(gateway.clone(), gateway));
        }
    }

    async fn create(&self, plan: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: RoleBindingModel = decode_model(plan, TYPE_NAME, diagnostics)?;

        match service.create(model.to_domain()).await {
            Ok(reconciled) => encode_state(
                &RoleBindingModel::from_reconciled(reconciled),
                TYPE_NAME,
                diagnostics,
            ),
            Err(error) => {
                diagnostics.add_app_error(
                    "create",
                    &format!("role binding for role '{}'", model.role),
                    &error,
                );
                None
            }
        }
    }

    async fn read(&self, state: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let prior: RoleBindingModel = decode_model(state, TYPE_NAME, diagnostics)?;
        let binding_id = prior.binding_id(diagnostics)?;

        let reconciled = match service.read(&binding_id).await {
            Ok(reconciled) => reconciled,
            Err(error) if error.is_not_found() => return None,
            Err(error) => {
                diagnostics.add_app_error("read", &format!("role binding '{binding_id}'"), &error);
                return None;
            }
        };

        if reconciled.source == BindingSource::Reconstructed {
            diagnostics.add_warning(
                "Role binding reconstructed",
                format!(
                    "role '{}' was not listed for group '{}'; state for '{binding_id}' was rebuilt from its identifier",
                    binding_id.role().identifier(),
                    binding_id.group_id()
                ),
            );
        }

        // Keep the configured spelling when it names the same role.
        let keep_prior_role = RoleRef::parse(prior.role.as_str())
            .is_ok_and(|role| &role == binding_id.role());

        let mut model = RoleBindingModel::from_reconciled(reconciled);
        model.name = prior.name;
        model.condition = prior.condition;
        if keep_prior_role {
            model.role = prior.role;
        }

        encode_state(&model, TYPE_NAME, diagnostics)
    }

    async fn update(
        &self,
        plan: &Value,
        prior_state: &Value,
        diagnostics: &mut Diagnostics,
    ) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: RoleBindingModel = decode_model(plan, TYPE_NAME, diagnostics)?;
        let prior: RoleBindingModel = decode_model(prior_state, TYPE_NAME, diagnostics)?;
        let binding_id = prior.binding_id(diagnostics)?;

        match service.update(&binding_id, model.to_domain()).await {
            Ok(reconciled) => encode_state(
                &RoleBindingModel::from_reconciled(reconciled),
                TYPE_NAME,
                diagnostics,
            ),
            Err(error) => {
                diagnostics.add_app_error("update", &format!("role binding '{binding_id}'"), &error);
                None
            }
        }
    }

    async fn delete(&self, state: &Value, diagnostics: &mut Diagnostics) {
        let Some(service) = self.service(diagnostics) else {
            return;
        };
        let Some(model) = decode_model::<RoleBindingModel>(state, TYPE_NAME, diagnostics) else {
            return;
        };
        let Some(binding_id) = model.binding_id(diagnostics) else {
            return;
        };

        match service.delete(&binding_id).await {
            Ok(()) => {}
            Err(error) if error.is_not_found() => {}
            Err(error) => {
                diagnostics.add_app_error("delete", &format!("role binding '{binding_id}'"), &error);
            }
        }
    }

    fn import_state(&self, id: &str, diagnostics: &mut Diagnostics) -> Option<Value> {
        match RoleBindingId::parse(id) {
            Ok(_) => Some(json!({ "id": id })),
            Err(error) => {
                diagnostics.add_error(
                    "Invalid import identifier",
                    format!("role binding import expects '<group id>-<role>': {error}"),
                );
                None
            }
        }
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use warden_application::ResourceService;
use warden_domain::{AttributeMap, Resource as IamResource};

use crate::framework::{
    Attribute, AttributeKind, Diagnostics, Resource, ResourceMetadata, Schema, decode_model,
    encode_state, report_unconfigured,
};
use crate::provider_data::{ProviderData, configure_gateway};

const TYPE_NAME: &str = "warden_resource";

/// Terraform model of `warden_resource`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbacResourceModel {
    /// Client-supplied identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Arbitrary JSON properties.
    #[serde(default)]
    pub props: Option<AttributeMap>,
}

impl AbacResourceModel {
    fn to_domain(&self) -> IamResource {
        IamResource {
            id: self.id.clone(),
            name: self.name.clone(),
            props: self.props.clone().unwrap_or_default(),
        }
    }

    fn from_domain(resource: IamResource, prior: &Self) -> Self {
        let props = if resource.props.is_empty() && prior.props.is_none() {
            None
        } else {
            Some(resource.props)
        };

        Self {
            id: resource.id,
            name: resource.name,
            props,
        }
    }
}

/// `warden_resource` resource: a generic ABAC-tagged object.
#[derive(Default)]
pub struct AbacResource {
    service: Option<ResourceService>,
}

impl AbacResource {
    /// Creates an unconfigured resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn service(&self, diagnostics: &mut Diagnostics) -> Option<&ResourceService> {
        if self.service.is_none() {
            report_unconfigured(TYPE_NAME, diagnostics);
        }
        self.service.as_ref()
    }
}

#[async_trait]
impl Resource for AbacResource {
    fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            type_name: TYPE_NAME,
        }
    }

    fn schema(&self) -> Schema {
        Schema::new("Manages a generic resource used for attribute-based access control.")
            .attribute(
                "id",
                Attribute::required(AttributeKind::String, "Resource identifier.")
                    .with_length(1, warden_domain::RESOURCE_ID_MAX_LENGTH),
            )
            .attribute("name", Attribute::required(AttributeKind::String, "Display name."))
            .attribute(
                "props",
                Attribute::optional(AttributeKind::DynamicMap, "Arbitrary JSON properties."),
            )
    }

    fn configure(&mut self, provider_data: Option<&dyn ProviderData>, diagnostics: &mut Diagnostics) {
        if let Some(gateway) = configure_gateway(TYPE_NAME, provider_data, diagnostics) {
            self.service = Some(ResourceService::new(gateway));
        }
    }

    async fn create(&self, plan: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: AbacResourceModel = decode_model(plan, TYPE_NAME, diagnostics)?;

        match service.create(model.to_domain()).await {
            Ok(resource) => {
                info!(resource_id = %resource.id, "created resource");
                encode_state(
                    &AbacResourceModel::from_domain(resource, &model),
                    TYPE_NAME,
                    diagnostics,
                )
            }
            Err(error) => {
                diagnostics.add_app_error("create", &format!("resource '{}'", model.id), &error);
                None
            }
        }
    }

    async fn read(&self, state: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let service = self.service(diagnostics)?;
        let model: AbacResourceModel = decode_model(state, TYPE_NAME, diagnostics)?;

        match service.get(model.id.as_str()).await {
            Ok(resource) => encode_state(
                &AbacResourceModel::from_domain(resource, &model),
                TYPE_NAME,
                diagnostics,
            ),
            Err(error) if error.is_not_found() => None,
            Err(error) => {
                diagnostics.add_app_error("read", &format!("resource '{}'", model.id), &error);
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
        let model: AbacResourceModel = decode_model(plan, TYPE_NAME, diagnostics)?;
        let prior: AbacResourceModel = decode_model(prior_state, TYPE_NAME, diagnostics)?;

        match service.update(prior.id.as_str(), model.to_domain()).await {
            Ok(resource) => encode_state(
                &AbacResourceModel::from_domain(resource, &model),
                TYPE_NAME,
                diagnostics,
            ),
            Err(error) => {
                diagnostics.add_app_error("update", &format!("resource '{}'", prior.id), &error);
                None
            }
        }
    }

    async fn delete(&self, state: &Value, diagnostics: &mut Diagnostics) {
        let Some(service) = self.service(diagnostics) else {
            return;
        };
        let Some(model) = decode_model::<AbacResourceModel>(state, TYPE_NAME, diagnostics) else {
            return;
        };

        match service.delete(model.id.as_str()).await {
            Ok(()) => info!(resource_id = %model.id, "deleted resource"),
            Err(error) if error.is_not_found() => {}
            Err(error) => {
                diagnostics.add_app_error("delete", &format!("resource '{}'", model.id), &error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::Method;
    use serde_json::json;

    use super::AbacResource;
    use crate::framework::{Diagnostics, Resource};
    use crate::test_support::{FakeIamApi, configured};

    #[tokio::test]
    async fn create_sends_nested_props() {
        let api = Arc::new(FakeIamApi::default().route(
            Method::POST,
            "v1/tenants/t1/resources",
            201,
            r#"{"id":"datasets.sales","name":"Sales","props":{"owner":{"team":"bi"},"tier":2}}"#,
        ));
        let resource = configured(AbacResource::new(), &api);
        let mut diagnostics = Diagnostics::default();
        let plan = json!({
            "id": "datasets.sales",
            "name": "Sales",
            "props": {"owner": {"team": "bi"}, "tier": 2}
        });

        let state = resource.create(&plan, &mut diagnostics).await;

        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(state, Some(plan.clone()));
        assert_eq!(api.calls().await[0].2, Some(plan));
    }

    #[tokio::test]
    async fn delete_of_missing_resource_succeeds() {
        let api = Arc::new(FakeIamApi::default());
        let resource = configured(AbacResource::new(), &api);
        let mut diagnostics = Diagnostics::default();

        resource
            .delete(&json!({"id": "datasets.sales", "name": "Sales"}), &mut diagnostics)
            .await;

        assert!(diagnostics.is_empty());
        assert_eq!(api.calls().await.len(), 1);
    }

    #[test]
    fn import_seeds_only_the_id() {
        let resource = AbacResource::new();
        let mut diagnostics = Diagnostics::default();

        assert_eq!(
            resource.import_state("datasets.sales", &mut diagnostics),
            Some(json!({"id": "datasets.sales"}))
        );
        assert!(resource.import_state(" ", &mut diagnostics).is_none());
    }
}

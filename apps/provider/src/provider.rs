use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use warden_resources::all_resources;
use warden_resources::framework::{Diagnostics, Resource};
use warden_resources::provider_data::ProviderData;

/// Lifecycle operation requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

/// One request line.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProviderRequest {
    pub resource: String,
    pub operation: Operation,
    #[serde(default)]
    pub plan: Option<Value>,
    #[serde(default)]
    pub state: Option<Value>,
    #[serde(default)]
    pub id: Option<String>,
}

/// One response line.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct ProviderResponse {
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl ProviderResponse {
    pub(crate) fn error(summary: &str, detail: impl Into<String>) -> Self {
        let mut diagnostics = Diagnostics::default();
        diagnostics.add_error(summary, detail);
        Self {
            state: None,
            diagnostics,
        }
    }
}

/// Registry of configured resources keyed by type name.
pub(crate) struct Provider {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl Provider {
    /// Builds every resource and hands it the provider configuration.
    pub(crate) fn configure(
        provider_data: Option<&dyn ProviderData>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let resources = all_resources()
            .into_iter()
            .map(|mut resource| {
                resource.configure(provider_data, diagnostics);
                (resource.metadata().type_name, resource)
            })
            .collect();

        Self { resources }
    }

    /// Returns the registered resource type names.
    pub(crate) fn type_names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Dispatches one request to its resource.
    pub(crate) async fn handle(&self, request: ProviderRequest) -> ProviderResponse {
        let Some(resource) = self.resources.get(request.resource.as_str()) else {
            warn!(resource = %request.resource, "request for unknown resource type");
            return ProviderResponse::error(
                "Unknown resource type",
                format!(
                    "'{}' is not one of: {}",
                    request.resource,
                    self.type_names().join(", ")
                ),
            );
        };

        debug!(
            resource = %request.resource,
            operation = ?request.operation,
            "dispatching lifecycle operation"
        );

        let mut diagnostics = Diagnostics::default();
        let state = match request.operation {
            Operation::Create => {
                let Some(plan) = required(request.plan.as_ref(), "plan", &mut diagnostics) else {
                    return finish(None, diagnostics);
                };
                resource.schema().validate_config(plan, &mut diagnostics);
                if diagnostics.has_error() {
                    return finish(None, diagnostics);
                }
                resource.create(plan, &mut diagnostics).await
            }
            Operation::Read => {
                let Some(state) = required(request.state.as_ref(), "state", &mut diagnostics)
                else {
                    return finish(None, diagnostics);
                };
                resource.read(state, &mut diagnostics).await
            }
            Operation::Update => {
                let plan = required(request.plan.as_ref(), "plan", &mut diagnostics);
                let prior = required(request.state.as_ref(), "state", &mut diagnostics);
                let (Some(plan), Some(prior)) = (plan, prior) else {
                    return finish(None, diagnostics);
                };
                resource.schema().validate_config(plan, &mut diagnostics);
                if diagnostics.has_error() {
                    return finish(None, diagnostics);
                }
                resource.update(plan, prior, &mut diagnostics).await
            }
            Operation::Delete => {
                let Some(state) = required(request.state.as_ref(), "state", &mut diagnostics)
                else {
                    return finish(None, diagnostics);
                };
                resource.delete(state, &mut diagnostics).await;
                None
            }
            Operation::Import => {
                resource.import_state(request.id.as_deref().unwrap_or_default(), &mut diagnostics)
            }
        };

        finish(state, diagnostics)
    }
}

fn required<'a>(
    value: Option<&'a Value>,
    field: &str,
    diagnostics: &mut Diagnostics,
) -> Option<&'a Value> {
    if value.is_none() {
        diagnostics.add_error(
            "Malformed request",
            format!("operation requires a '{field}' object"),
        );
    }
    value
}

fn finish(state: Option<Value>, diagnostics: Diagnostics) -> ProviderResponse {
    ProviderResponse { state, diagnostics }
}

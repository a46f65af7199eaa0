//! Terraform resource lifecycle contract.
//!
//! Plans and states travel as JSON objects. Each resource decodes them into its
//! own model and reports problems through [`Diagnostics`] rather than errors,
//! mirroring how Terraform surfaces provider feedback.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::provider_data::ProviderData;

mod diagnostics;
mod schema;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use schema::{Attribute, AttributeKind, AttributeMode, Schema};

/// Static resource metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceMetadata {
    /// Terraform resource type name.
    pub type_name: &'static str,
}

/// Lifecycle implemented by every managed resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Returns the resource type name.
    fn metadata(&self) -> ResourceMetadata;

    /// Returns the resource schema.
    fn schema(&self) -> Schema;

    /// Receives the provider-level configuration. `None` means the provider
    /// itself is not configured yet and must be ignored.
    fn configure(&mut self, provider_data: Option<&dyn ProviderData>, diagnostics: &mut Diagnostics);

    /// Creates the remote object and returns the new state.
    async fn create(&self, plan: &Value, diagnostics: &mut Diagnostics) -> Option<Value>;

    /// Refreshes state. `None` without errors removes the resource from state.
    async fn read(&self, state: &Value, diagnostics: &mut Diagnostics) -> Option<Value>;

    /// Applies a plan over the prior state and returns the new state.
    async fn update(
        &self,
        plan: &Value,
        prior_state: &Value,
        diagnostics: &mut Diagnostics,
    ) -> Option<Value>;

    /// Deletes the remote object.
    async fn delete(&self, state: &Value, diagnostics: &mut Diagnostics);

    /// Seeds state for `terraform import`; the next read fills in the rest.
    fn import_state(&self, id: &str, diagnostics: &mut Diagnostics) -> Option<Value> {
        if id.trim().is_empty() {
            diagnostics.add_error(
                "Invalid import identifier",
                format!("{} import requires a non-empty id", self.metadata().type_name),
            );
            return None;
        }

        Some(json!({ "id": id }))
    }
}

/// Decodes a plan or state object into a resource model.
pub fn decode_model<T: DeserializeOwned>(
    value: &Value,
    type_name: &str,
    diagnostics: &mut Diagnostics,
) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(model) => Some(model),
        Err(error) => {
            diagnostics.add_error(
                "Invalid resource data",
                format!("{type_name} data could not be decoded: {error}"),
            );
            None
        }
    }
}

/// Encodes a resource model as a state object.
pub fn encode_state<T: Serialize>(
    model: &T,
    type_name: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Value> {
    match serde_json::to_value(model) {
        Ok(state) => Some(state),
        Err(error) => {
            diagnostics.add_error(
                "Invalid resource state",
                format!("{type_name} state could not be encoded: {error}"),
            );
            None
        }
    }
}

/// Reports an adapter used before the provider configured it.
pub(crate) fn report_unconfigured(type_name: &str, diagnostics: &mut Diagnostics) {
    diagnostics.add_error(
        "Unconfigured resource",
        format!(
            "{type_name} was used before the provider was configured; check the provider block"
        ),
    );
}

//! Provider configuration seen through capabilities.
//!
//! Resources never name the provider configuration type. Any type exposing a
//! base URL, a tenant and an HTTP client qualifies as [`ProviderData`].

use std::sync::Arc;

use tracing::debug;
use url::Url;
use warden_core::TenantId;
use warden_infrastructure::{HttpIamGateway, HttpTransport};

use crate::framework::Diagnostics;

/// Exposes the IAM API base URL.
pub trait HasBaseUrl {
    /// Returns the configured base URL, if any.
    fn base_url(&self) -> Option<&str>;
}

/// Exposes the tenant all requests are scoped to.
pub trait HasTenantId {
    /// Returns the configured tenant, if any.
    fn tenant_id(&self) -> Option<&str>;
}

/// Exposes an authenticated HTTP client.
pub trait HasHttpClient {
    /// Returns the shared client, if one was built.
    fn http_client(&self) -> Option<Arc<dyn HttpTransport>>;
}

/// Everything a resource needs from the provider.
pub trait ProviderData: HasBaseUrl + HasTenantId + HasHttpClient + Send + Sync {}

impl<T> ProviderData for T where T: HasBaseUrl + HasTenantId + HasHttpClient + Send + Sync {}

/// Fields extracted from provider data.
#[derive(Clone)]
pub struct ProviderFields {
    /// Absolute base URL without a trailing `/`.
    pub base_url: String,
    /// Tenant scope.
    pub tenant_id: TenantId,
    /// Shared HTTP client.
    pub http_client: Arc<dyn HttpTransport>,
}

/// Pulls the base URL, tenant and client out of provider data.
///
/// Returns `None` when there is no provider data or any capability yields
/// nothing usable.
pub fn extract_provider_fields(provider_data: Option<&dyn ProviderData>) -> Option<ProviderFields> {
    let provider_data = provider_data?;

    let base_url = provider_data.base_url()?.trim();
    let parsed = match Url::parse(base_url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
        Ok(parsed) => {
            debug!(scheme = parsed.scheme(), "provider base URL has unsupported scheme");
            return None;
        }
        Err(error) => {
            debug!(error = %error, "provider base URL does not parse");
            return None;
        }
    };

    let tenant_id = TenantId::new(provider_data.tenant_id()?).ok()?;
    let http_client = provider_data.http_client()?;

    Some(ProviderFields {
        base_url: parsed.as_str().trim_end_matches('/').to_owned(),
        tenant_id,
        http_client,
    })
}

/// Builds the tenant gateway during `configure`.
///
/// Missing provider data is silently ignored; present but incomplete data is
/// reported as an error diagnostic.
pub(crate) fn configure_gateway(
    type_name: &str,
    provider_data: Option<&dyn ProviderData>,
    diagnostics: &mut Diagnostics,
) -> Option<Arc<HttpIamGateway>> {
    provider_data?;

    let Some(fields) = extract_provider_fields(provider_data) else {
        diagnostics.add_error(
            "Unexpected provider configuration",
            format!(
                "{type_name} requires a provider with an absolute http(s) base URL, a tenant id and an HTTP client"
            ),
        );
        return None;
    };

    match HttpIamGateway::new(
        fields.base_url.as_str(),
        fields.tenant_id,
        fields.http_client,
    ) {
        Ok(gateway) => Some(Arc::new(gateway)),
        Err(error) => {
            diagnostics.add_error(
                "Unexpected provider configuration",
                format!("{type_name} could not build its IAM client: {error}"),
            );
            None
        }
    }
}

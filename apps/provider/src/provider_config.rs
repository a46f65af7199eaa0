use std::env;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use warden_core::{AppError, AppResult};
use warden_infrastructure::{HttpTransport, ReqwestTransport, RetryPolicy, RetryingHttpClient};
use warden_resources::provider_data::{HasBaseUrl, HasHttpClient, HasTenantId};

/// Settings read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ProviderSettings {
    pub base_url: String,
    pub tenant_id: String,
    pub access_token: String,
    pub retry_max: u32,
    pub retry_wait_min_ms: u64,
    pub retry_wait_max_ms: u64,
    pub http_timeout_secs: u64,
}

impl Debug for ProviderSettings {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("tenant_id", &self.tenant_id)
            .field("access_token", &"<redacted>")
            .field("retry_max", &self.retry_max)
            .field("retry_wait_min_ms", &self.retry_wait_min_ms)
            .field("retry_wait_max_ms", &self.retry_wait_max_ms)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl ProviderSettings {
    pub(crate) fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        Ok(Self {
            base_url: required(&lookup, "WARDEN_BASE_URL")?,
            tenant_id: required(&lookup, "WARDEN_TENANT_ID")?,
            access_token: required(&lookup, "WARDEN_ACCESS_TOKEN")?,
            retry_max: parse_or(&lookup, "WARDEN_RETRY_MAX", 4)?,
            retry_wait_min_ms: parse_or(&lookup, "WARDEN_RETRY_WAIT_MIN_MS", 1000)?,
            retry_wait_max_ms: parse_or(&lookup, "WARDEN_RETRY_WAIT_MAX_MS", 30_000)?,
            http_timeout_secs: parse_or(&lookup, "WARDEN_HTTP_TIMEOUT_SECS", 30)?,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

/// Provider configuration handed to every resource at configure time.
pub(crate) struct ProviderConfig {
    base_url: String,
    tenant_id: String,
    retry_policy: RetryPolicy,
    http_client: Arc<dyn HttpTransport>,
}

impl ProviderConfig {
    /// Builds the authenticated, retrying HTTP client for the configured tenant.
    pub(crate) fn from_settings(settings: &ProviderSettings) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let mut authorization =
            HeaderValue::from_str(format!("Bearer {}", settings.access_token).as_str()).map_err(
                |error| AppError::Validation(format!("invalid WARDEN_ACCESS_TOKEN: {error}")),
            )?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            HeaderName::from_static("x-tenant-id"),
            HeaderValue::from_str(settings.tenant_id.as_str()).map_err(|error| {
                AppError::Validation(format!("invalid WARDEN_TENANT_ID: {error}"))
            })?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        let policy = RetryPolicy::new(
            settings.retry_max,
            Duration::from_millis(settings.retry_wait_min_ms),
            Duration::from_millis(settings.retry_wait_max_ms),
        )?;

        Ok(Self {
            base_url: settings.base_url.clone(),
            tenant_id: settings.tenant_id.clone(),
            retry_policy: policy,
            http_client: Arc::new(RetryingHttpClient::new(
                Arc::new(ReqwestTransport::new(http_client)),
                policy,
            )),
        })
    }

    /// Returns the retry policy wrapped around the HTTP client.
    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

impl HasBaseUrl for ProviderConfig {
    fn base_url(&self) -> Option<&str> {
        Some(self.base_url.as_str())
    }
}

impl HasTenantId for ProviderConfig {
    fn tenant_id(&self) -> Option<&str> {
        Some(self.tenant_id.as_str())
    }
}

impl HasHttpClient for ProviderConfig {
    fn http_client(&self) -> Option<Arc<dyn HttpTransport>> {
        Some(self.http_client.clone())
    }
}

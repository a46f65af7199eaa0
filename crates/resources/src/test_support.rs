use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use tokio::sync::Mutex;
use warden_core::AppResult;
use warden_infrastructure::{HttpRequest, HttpResponse, HttpTransport, ResponseBody};

use crate::framework::{Diagnostics, Resource};
use crate::provider_data::{HasBaseUrl, HasHttpClient, HasTenantId};

pub(crate) const BASE_URL: &str = "https://iam.example.test";

struct Route {
    method: Method,
    path: String,
    status: StatusCode,
    body: String,
}

struct StaticBody(Vec<u8>);

#[async_trait]
impl ResponseBody for StaticBody {
    async fn read_all(&mut self) -> AppResult<Vec<u8>> {
        Ok(std::mem::take(&mut self.0))
    }
}

/// In-memory IAM API answering scripted routes in order.
#[derive(Default)]
pub(crate) struct FakeIamApi {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<(Method, String, Option<serde_json::Value>)>>,
}

impl FakeIamApi {
    /// Queues one response for `method path`, path relative to the tenant root.
    pub(crate) fn route(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.routes.get_mut().push(Route {
            method,
            path: format!("/api/{path}"),
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.to_owned(),
        });
        self
    }

    pub(crate) async fn calls(&self) -> Vec<(Method, String, Option<serde_json::Value>)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl HttpTransport for FakeIamApi {
    async fn send(&self, request: &HttpRequest) -> AppResult<HttpResponse> {
        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(request.url.as_str())
            .to_owned();
        let body = request
            .body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok());
        self.calls
            .lock()
            .await
            .push((request.method.clone(), path.clone(), body));

        let mut routes = self.routes.lock().await;
        let position = routes
            .iter()
            .position(|route| route.method == request.method && route.path == path);
        let (status, body) = match position {
            Some(position) => {
                let route = routes.remove(position);
                (route.status, route.body)
            }
            None => (
                StatusCode::NOT_FOUND,
                format!(r#"{{"message":"no route for {} {path}"}}"#, request.method),
            ),
        };

        Ok(HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: Box::new(StaticBody(body.into_bytes())),
        })
    }
}

/// Provider configuration pointing at a [`FakeIamApi`].
pub(crate) struct TestProviderConfig {
    api: Arc<FakeIamApi>,
}

impl HasBaseUrl for TestProviderConfig {
    fn base_url(&self) -> Option<&str> {
        Some(BASE_URL)
    }
}

impl HasTenantId for TestProviderConfig {
    fn tenant_id(&self) -> Option<&str> {
        Some("t1")
    }
}

impl HasHttpClient for TestProviderConfig {
    fn http_client(&self) -> Option<Arc<dyn HttpTransport>> {
        Some(self.api.clone())
    }
}

/// Configures `resource` against `api` and asserts configuration succeeded.
pub(crate) fn configured<R: Resource>(mut resource: R, api: &Arc<FakeIamApi>) -> R {
    let config = TestProviderConfig { api: api.clone() };
    let mut diagnostics = Diagnostics::default();
    resource.configure(Some(&config), &mut diagnostics);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    resource
}

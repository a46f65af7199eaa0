//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_iam_gateway;
mod http_transport;
mod iam_wire;
mod retrying_http_client;

pub use http_iam_gateway::HttpIamGateway;
pub use http_transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, ResponseBody};
pub use retrying_http_client::{RetryPolicy, RetryingHttpClient, should_retry};

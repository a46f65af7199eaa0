//! Warden IAM provider host.
//!
//! Reads one JSON lifecycle request per stdin line and answers with one JSON
//! response per stdout line. Logs go to stderr.

#![forbid(unsafe_code)]

mod provider;
mod provider_config;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use warden_core::{AppError, AppResult};
use warden_resources::framework::Diagnostics;

use crate::provider::{Provider, ProviderRequest, ProviderResponse};
use crate::provider_config::{ProviderConfig, ProviderSettings};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = ProviderSettings::load()?;
    let config = ProviderConfig::from_settings(&settings)?;

    let mut diagnostics = Diagnostics::default();
    let provider = Provider::configure(Some(&config), &mut diagnostics);
    if diagnostics.has_error() {
        let details = diagnostics
            .entries()
            .iter()
            .map(|entry| entry.detail.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::Validation(format!(
            "provider configuration rejected: {details}"
        )));
    }

    info!(
        base_url = %settings.base_url,
        tenant_id = %settings.tenant_id,
        retry_max = config.retry_policy().retry_max(),
        resources = ?provider.type_names(),
        "warden-provider started"
    );

    serve(&provider).await
}

async fn serve(provider: &Provider) -> AppResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|error| AppError::Internal(format!("failed to read request line: {error}")))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ProviderRequest>(line.as_str()) {
            Ok(request) => provider.handle(request).await,
            Err(parse_error) => {
                error!(error = %parse_error, "rejected malformed request line");
                ProviderResponse::error("Malformed request", parse_error.to_string())
            }
        };

        let mut encoded = serde_json::to_vec(&response)
            .map_err(|error| AppError::Internal(format!("failed to encode response: {error}")))?;
        encoded.push(b'\n');
        stdout
            .write_all(encoded.as_slice())
            .await
            .map_err(|error| AppError::Internal(format!("failed to write response: {error}")))?;
        stdout
            .flush()
            .await
            .map_err(|error| AppError::Internal(format!("failed to flush response: {error}")))?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

//! Partilha backoffice command-line client.

#![forbid(unsafe_code)]

mod admin_command;
mod admin_config;
mod collection_runner;

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use partilha_core::{AppError, AppResult};
use partilha_infrastructure::{HttpCollectionGateway, Session, SessionCredentialProvider};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::admin_command::AdminCommand;
use crate::admin_config::AdminConfig;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", error_sentence(&error));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AppResult<String> {
    let command = AdminCommand::parse(env::args().skip(1))?;
    let config = AdminConfig::load()?;
    let credentials = Arc::new(SessionCredentialProvider::load(config.session_file.clone()).await?);

    let output = match command {
        AdminCommand::SessionSet { token, expires_at } => {
            let session = Session::new(token)?;
            let session = match expires_at {
                Some(expires_at) => session.with_expiry(expires_at),
                None => session,
            };
            credentials.replace(session).await?;
            serde_json::json!({ "session": "stored" })
        }
        AdminCommand::SessionClear => {
            credentials.clear().await?;
            serde_json::json!({ "session": "cleared" })
        }
        AdminCommand::Collection { resource, action } => {
            if !config.features.allows(resource) {
                return Err(AppError::Validation(format!(
                    "resource '{}' is disabled by feature flag",
                    resource.as_str()
                )));
            }

            let http_client = reqwest::Client::builder()
                .timeout(config.http_timeout)
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build HTTP client: {error}"))
                })?;
            let gateway = HttpCollectionGateway::new(
                http_client,
                config.api_base_url.clone(),
                credentials.clone(),
            )
            .with_service_key(config.service_key.clone());

            info!(
                resource = resource.as_str(),
                api_base_url = %config.api_base_url,
                "running collection command"
            );
            collection_runner::run(Arc::new(gateway), config.page_size, resource, action).await?
        }
    };

    render(&output)
}

fn render(output: &Value) -> AppResult<String> {
    serde_json::to_string_pretty(output)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))
}

fn error_sentence(error: &AppError) -> String {
    warn!(error = %error, "command failed");
    match error {
        AppError::Validation(message)
        | AppError::Unauthorized(message)
        | AppError::Internal(message) => message.clone(),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

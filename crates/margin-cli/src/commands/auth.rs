use std::path::Path;

use margin_core::readwise::{AuthStatus, ReadwiseClient};

use crate::commands::common::{print_json, readwise_client};
use crate::error::CliError;

/// Print the auth probe result as JSON on stdout. Exits non-zero on failure.
pub async fn run_auth(secrets_file: Option<&Path>) -> Result<(), CliError> {
    let status = match readwise_client(secrets_file) {
        Ok(client) => check_auth_with(&client).await,
        Err(error) => AuthStatus {
            success: false,
            message: error.to_string(),
        },
    };

    print_json(&status)?;
    if status.success {
        Ok(())
    } else {
        Err(CliError::Reported)
    }
}

pub async fn check_auth_with(client: &ReadwiseClient) -> AuthStatus {
    let status = client.check_auth().await;
    tracing::debug!("Auth probe: {}", status.message);
    status
}

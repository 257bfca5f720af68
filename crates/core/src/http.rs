//! HTTP plumbing for providers that fetch from remote APIs.
//!
//! Every transport failure and non-success status is turned into a
//! [`ProviderError`] here, so handlers only deal with values.

use std::path::{Path, PathBuf};

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ProviderError;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("mcmm/", env!("CARGO_PKG_VERSION"));

/// Build the shared client.
///
/// # Errors
///
/// Fails only if the TLS backend cannot be initialized.
pub fn client() -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::failed(format!("Failed to create HTTP client: {e}")))
}

/// Path of the remotely named file `name` inside `dir`.
///
/// # Errors
///
/// [`ProviderError::InvalidMetadata`] unless `name` is a bare file name, so a
/// server-supplied name can never point outside `dir`.
pub fn artifact_path(dir: &Path, name: &str) -> Result<PathBuf, ProviderError> {
    match Path::new(name).file_name() {
        Some(file_name) if file_name == name => Ok(dir.join(file_name)),
        _ => Err(ProviderError::invalid_metadata(format!(
            "refusing artifact name '{name}': not a plain file name"
        ))),
    }
}

/// Send `request`, mapping transport failures and error statuses.
///
/// # Errors
///
/// [`ProviderError::Network`] if no response arrived, [`ProviderError::Http`]
/// for any non-2xx status.
pub async fn send(request: RequestBuilder) -> Result<Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::http(status.as_u16(), response.url().as_str()));
    }
    Ok(response)
}

/// Send `request` and decode the JSON body.
///
/// # Errors
///
/// Everything [`send`] reports, plus undecodable bodies.
pub async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
    let response = send(request).await?;
    let url = response.url().to_string();
    response
        .json()
        .await
        .map_err(|e| ProviderError::network(format!("Failed to parse response from {url}: {e}")))
}

/// Download the body of `request` into `dest`, replacing any existing file.
///
/// # Errors
///
/// Everything [`send`] reports, plus read and write failures.
pub async fn download_to(request: RequestBuilder, dest: &Path) -> Result<PathBuf, ProviderError> {
    let response = send(request).await?;
    debug!(url = %response.url(), dest = %dest.display(), "Downloading artifact");
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ProviderError::network(format!("Failed to read response body: {e}")))?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, &bytes)?;
    Ok(dest.to_path_buf())
}

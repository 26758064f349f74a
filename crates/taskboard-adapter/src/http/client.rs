/*
[INPUT]:  HTTP configuration (base URL, timeouts)
[OUTPUT]: Configured reqwest client and response decoding helpers
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::http::{Result, TaskboardError};
use crate::types::ErrorBody;

/// Base URL of a locally running task server
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the task API
#[derive(Debug, Clone)]
pub struct TaskboardClient {
    http_client: Client,
    base_url: Url,
}

impl TaskboardClient {
    /// Create a new client against the default local server
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a new client with custom configuration and API root
    ///
    /// `base_url` is the API root under which `/task` lives, e.g. `http://host:8080/api`.
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(TaskboardError::Config(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// API root this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/task` or `{base}/task/{id}`, percent-encoding the id
    pub(crate) fn task_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TaskboardError::Config(format!("base URL cannot carry a path: {}", self.base_url))
            })?;
            segments.pop_if_empty().push("task");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Build request builder for task endpoints
    pub(crate) fn task_request(&self, method: Method, id: Option<&str>) -> Result<RequestBuilder> {
        let url = self.task_url(id)?;
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and decode a JSON body from a 2xx response
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request whose success response carries no body
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        let response = builder.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into an `Api` error, reading the error payload if it parses
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|payload| payload.summary())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    debug!(status = status.as_u16(), %message, "task API returned error status");
    Err(TaskboardError::api_error(status, message))
}

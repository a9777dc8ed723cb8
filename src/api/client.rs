use std::time::Duration;

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::ApiResult;
use crate::core::ApiError;

/// Error body shape shared by every mutating endpoint: `{ errors: { body } }`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    errors: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    body: Option<String>,
}

/// Pull `errors.body` out of a failure response; anything else yields `None`
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.errors)
        .and_then(|detail| detail.body)
}

/// Console server API client wrapper
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    root: Url,
}

impl ApiClient {
    /// Create a client for the given API root (e.g. `http://host:9090/api/v1`)
    pub fn new(api_root: &str, timeout: Duration) -> ApiResult<Self> {
        info!("Creating API client for {}", api_root);

        let root = Url::parse(api_root).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", api_root, e)))?;
        if root.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(api_root.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portside/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self { http, root })
    }

    /// The API root this client talks to
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Build an endpoint URL from path segments; each segment is percent-encoded
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.root.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.root.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON resource
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let response = self.send(Method::GET, url, None::<&()>).await?;
        Self::decode(response).await
    }

    /// Send a request whose response body is ignored on success
    pub(crate) async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<()> {
        self.send(method, url, body).await.map(|_| ())
    }

    /// Send a request and decode a JSON response body
    pub(crate) async fn execute_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let response = self.send(method, url, body).await?;
        Self::decode(response).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<reqwest::Response> {
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, url, e);
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = extract_error_message(&text);
        warn!(
            "{} {} rejected with {}: {}",
            method,
            url,
            status,
            message.as_deref().unwrap_or("<no error body>")
        );

        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status: StatusCode = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Could not decode {} response body: {}", status, e);
            ApiError::MalformedBody(e.to_string())
        })
    }
}

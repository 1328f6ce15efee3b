//! Executes `HttpRequest` values against the network.
//!
//! `Transport` is the seam between request building and I/O. The production
//! implementation wraps a `reqwest::Client`; tests substitute a double that
//! records requests and replays canned responses. Non-2xx statuses are
//! returned as data; interpreting them is `ApiClient`'s job.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::cancel::CancelToken;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the round-trip. Resolves to `ApiError::Cancelled` if `cancel`
    /// fires first.
    async fn execute(&self, request: HttpRequest, cancel: &CancelToken) -> Result<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let res = builder.send().await.map_err(|err| map_reqwest_error(&request.path, err))?;
        let status = res.status().as_u16();
        let headers = res
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = res
            .text()
            .await
            .map_err(|err| map_reqwest_error(&request.path, err))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest, cancel: &CancelToken) -> Result<HttpResponse> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            res = self.round_trip(request) => res,
        }
    }
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        warn!(%url, "request timed out; backend may not be running");
        return ApiError::Timeout;
    }
    if err.is_connect() {
        warn!(%url, "cannot reach backend");
    }
    ApiError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: "http://127.0.0.1:9/never".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(request, &cancel).await.unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let transport = ReqwestTransport::with_client(http);
        let request = HttpRequest {
            method: HttpMethod::Get,
            // Port 9 (discard) is closed on test hosts.
            path: "http://127.0.0.1:9/countries".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(request, &CancelToken::none()).await.unwrap_err();
        assert!(err.is_transport());
    }
}

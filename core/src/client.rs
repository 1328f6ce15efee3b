//! Authenticated request builder and executor for the Spendly API.
//!
//! # Design
//! `ApiClient` splits every call into a `build_*` step that produces an
//! `HttpRequest` and a `send` step that hands it to the injected `Transport`
//! and interprets the `HttpResponse`. The builder attaches the default
//! headers and, when the injected `SessionStore` holds a token, the bearer
//! `Authorization` header. A 401 from any endpoint clears the session.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::SessionStore;
use crate::transport::{ReqwestTransport, Transport};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    locale: String,
    session: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("locale", &self.locale)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            locale: "en".to_string(),
            session,
            transport,
        }
    }

    /// Client backed by `reqwest` with the configured timeout and locale.
    pub fn from_config(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::new(&config.api_base_url, session, Arc::new(transport)).with_locale(&config.locale))
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    pub fn build_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("accept-language".to_string(), self.locale.clone()),
        ];
        if let Some(token) = self.session.get() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}/{}", self.base_url, path.trim_start_matches('/')),
            headers,
            body: None,
        }
    }

    pub fn build_json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut request = self.build_request(method, path);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    /// Execute `request` and return the response if its status is 2xx.
    pub async fn send(&self, request: HttpRequest, cancel: &CancelToken) -> Result<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.path, "api request");
        let path = request.path.clone();
        let sent_token = request
            .header("authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);
        let response = self.transport.execute(request, cancel).await?;
        // A 401 only revokes the token it was answered for; a newer login
        // may have replaced it while the request was in flight.
        if response.status == 401 {
            if let Some(token) = sent_token.as_deref() {
                if self.session.clear_if(token) {
                    warn!(url = %path, "session rejected by server; clearing token");
                }
            }
        }
        check_status(&response)?;
        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, cancel: &CancelToken) -> Result<T> {
        let request = self.build_request(HttpMethod::Get, path);
        let response = self.send(request, cancel).await?;
        parse_json(&response)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, cancel: &CancelToken) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_json_request(HttpMethod::Post, path, body)?;
        let response = self.send(request, cancel).await?;
        parse_json(&response)
    }

    /// POST with no body, ignoring whatever the server answers.
    pub async fn post_empty(&self, path: &str, cancel: &CancelToken) -> Result<()> {
        let request = self.build_request(HttpMethod::Post, path);
        self.send(request, cancel).await?;
        Ok(())
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, cancel: &CancelToken) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_json_request(HttpMethod::Put, path, body)?;
        let response = self.send(request, cancel).await?;
        parse_json(&response)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, cancel: &CancelToken) -> Result<T> {
        let request = self.build_request(HttpMethod::Delete, path);
        let response = self.send(request, cancel).await?;
        parse_json(&response)
    }

    /// DELETE that accepts either 204 or a JSON acknowledgement.
    pub async fn delete_empty(&self, path: &str, cancel: &CancelToken) -> Result<()> {
        let request = self.build_request(HttpMethod::Delete, path);
        self.send(request, cancel).await?;
        Ok(())
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_response(response))
}

/// Decode a JSON body. An empty body decodes as JSON `null`.
pub(crate) fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::session::MemorySessionStore;

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn execute(&self, _request: HttpRequest, _cancel: &CancelToken) -> Result<HttpResponse> {
            Err(ApiError::Transport("offline".to_string()))
        }
    }

    fn client() -> ApiClient {
        ApiClient::new(
            "http://localhost:3000/api",
            Arc::new(MemorySessionStore::new()),
            Arc::new(Unreachable),
        )
    }

    #[test]
    fn build_request_joins_paths() {
        let req = client().build_request(HttpMethod::Get, "/goals");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/goals");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ApiClient::new(
            "http://localhost:3000/api/",
            Arc::new(MemorySessionStore::new()),
            Arc::new(Unreachable),
        );
        let req = client.build_request(HttpMethod::Get, "countries");
        assert_eq!(req.path, "http://localhost:3000/api/countries");
    }

    #[test]
    fn default_headers_without_session() {
        let req = client().with_locale("fr").build_request(HttpMethod::Get, "/goals");
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("accept-language"), Some("fr"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn bearer_header_follows_session() {
        let client = client();
        client.session().set("tok-1".to_string());
        let req = client.build_request(HttpMethod::Get, "/auth/me");
        assert_eq!(req.header("authorization"), Some("Bearer tok-1"));

        client.session().clear();
        let req = client.build_request(HttpMethod::Get, "/auth/me");
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn json_request_sets_content_type_and_body() {
        let body = serde_json::json!({ "name": "Trip", "target_amount": 500.0 });
        let req = client().build_json_request(HttpMethod::Post, "/goals", &body).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["target_amount"], 500.0);
    }

    #[test]
    fn parse_json_bad_body() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "not json".to_string(),
        };
        let err = parse_json::<serde_json::Value>(&response).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_json_empty_body_is_null() {
        let response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        let value: serde_json::Value = parse_json(&response).unwrap();
        assert!(value.is_null());
    }

    /// Installs a newer token while the request is in flight, then answers 401.
    #[derive(Debug)]
    struct ReloginThenReject {
        session: Arc<MemorySessionStore>,
    }

    #[async_trait]
    impl Transport for ReloginThenReject {
        async fn execute(&self, _request: HttpRequest, _cancel: &CancelToken) -> Result<HttpResponse> {
            self.session.set("fresh-token".to_string());
            Ok(HttpResponse {
                status: 401,
                headers: Vec::new(),
                body: r#"{"message":"Unauthenticated."}"#.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn late_401_keeps_newer_token() {
        let session = Arc::new(MemorySessionStore::new());
        session.set("stale-token".to_string());
        let transport = ReloginThenReject {
            session: session.clone(),
        };
        let client = ApiClient::new("http://localhost:3000/api", session.clone(), Arc::new(transport));

        let err = client
            .get::<serde_json::Value>("/goals", &CancelToken::none())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(session.get().as_deref(), Some("fresh-token"));
    }

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new(
            "http://localhost:3000/api//",
            Arc::new(MemorySessionStore::new()),
            Arc::new(Unreachable),
        );
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let err = client()
            .get::<serde_json::Value>("/goals", &CancelToken::none())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}

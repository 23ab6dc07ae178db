//! Transport for Graph requests.
//!
//! [`RequestSender`] is the seam between [`GraphService`](super::GraphService)
//! and the network: it attaches the bearer token, serializes the payload and
//! hands back the raw status and body. Any HTTP status is a successful send;
//! only transport failures are errors.

use std::time::Duration;

use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::RuntimeConfig;
use crate::{CoreError, Result};

/// Raw response from Graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for `status`, empty if the code has none.
    pub reason: String,
    /// Response body as text.
    pub body: String,
}

impl GraphResponse {
    /// Build a response, deriving the reason phrase from the status code.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Deserialize the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-success response into [`CoreError::Status`].
    ///
    /// # Errors
    ///
    /// Returns the status error when the response is not 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CoreError::Status {
                status: self.status,
                reason: self.reason,
            })
        }
    }
}

/// Sends one authenticated Graph request.
pub trait RequestSender {
    /// Send `method uri` with `Authorization: Bearer {access_token}` and an
    /// optional JSON body.
    fn send(
        &self,
        method: Method,
        uri: &str,
        access_token: &str,
        payload: Option<&Value>,
    ) -> impl Future<Output = Result<GraphResponse>> + Send;
}

/// `reqwest`-backed [`RequestSender`].
#[derive(Debug, Clone)]
pub struct HttpSender {
    http_client: Client,
}

impl HttpSender {
    /// Create a sender whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Http(format!("creating HTTP client: {e}")))?;
        Ok(Self { http_client })
    }

    /// Create a sender from runtime settings.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn from_runtime(runtime: &RuntimeConfig) -> Result<Self> {
        Self::new(Duration::from_secs(runtime.timeout_secs()))
    }
}

impl RequestSender for HttpSender {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        access_token: &str,
        payload: Option<&Value>,
    ) -> Result<GraphResponse> {
        debug!("{method} {uri}");

        let mut request = self
            .http_client
            .request(method, uri)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json");
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::Http(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::Http(format!("reading response body: {e}")))?;
        debug!("{uri} -> {status}");

        Ok(GraphResponse::new(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn sender() -> HttpSender {
        HttpSender::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn reason_phrase_follows_status_code() {
        assert_eq!(GraphResponse::new(404, "").reason, "Not Found");
        assert_eq!(GraphResponse::new(201, "").reason, "Created");
        assert_eq!(GraphResponse::new(599, "").reason, "");
    }

    #[test]
    fn error_for_status_keeps_success() {
        let ok = GraphResponse::new(204, "").error_for_status().unwrap();
        assert_eq!(ok.status, 204);

        let err = GraphResponse::new(409, "{}").error_for_status().unwrap_err();
        assert_eq!(err.to_string(), "Conflict");
        assert!(matches!(err, CoreError::Status { status: 409, .. }));
    }

    #[tokio::test]
    async fn send_attaches_bearer_token_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/things"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"name": "a"})))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"t-1"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let payload = json!({"name": "a"});
        let response = sender()
            .send(
                Method::POST,
                &format!("{}/v1.0/things", server.uri()),
                "test-token",
                Some(&payload),
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.reason, "Created");
        let value: Value = response.json().unwrap();
        assert_eq!(value["id"], "t-1");
    }

    #[tokio::test]
    async fn non_success_status_is_not_a_send_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let response = sender()
            .send(
                Method::GET,
                &format!("{}/v1.0/missing", server.uri()),
                "test-token",
                None,
            )
            .await
            .unwrap();

        assert!(!response.is_success());
        assert_eq!(response.status, 404);
        assert_eq!(response.reason, "Not Found");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let result = sender()
            .send(Method::GET, "http://127.0.0.1:9/v1.0/me", "t", None)
            .await;
        assert!(matches!(result, Err(CoreError::Http(_))));
    }
}

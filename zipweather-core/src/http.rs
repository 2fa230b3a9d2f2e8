use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Upper bound for any single outbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// api.weather.gov rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("zipweather/", env!("CARGO_PKG_VERSION"));

/// Timeout-bounded JSON GET client that reports every failure as an [`ApiError`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::unexpected().with_details(e.to_string()))?;

        Ok(Self { http })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!(url, "GET");

        let res = self.http.get(url).send().await.map_err(transport_error)?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!(url, %status, "request returned non-success status");
            return Err(status_error(status));
        }

        let body = res.text().await.map_err(transport_error)?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(url, error = %e, "response body did not match expected shape");
            ApiError::unexpected().with_details(format!("{e}: {}", truncate_body(&body)))
        })
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::timeout()
    } else if err.is_connect() || err.is_request() {
        ApiError::network().with_details(err.to_string())
    } else {
        ApiError::unexpected().with_details(err.to_string())
    }
}

fn status_error(status: StatusCode) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::not_found();
    }
    if status.is_server_error() {
        return ApiError::server();
    }
    let reason = status.canonical_reason().unwrap_or("Unknown status");
    ApiError::new(crate::error::ErrorCode::Unknown, format!("Request failed: {reason}"))
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Probe {
        ok: bool,
    }

    #[tokio::test]
    async fn get_json_parses_body_and_sends_accept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let probe: Probe = client.get_json(&format!("{}/probe", server.uri())).await.unwrap();
        assert!(probe.ok);
    }

    #[tokio::test]
    async fn status_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .unwrap()
            .get_json::<Probe>(&server.uri())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Resource not found");
    }

    #[tokio::test]
    async fn status_503_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .unwrap()
            .get_json::<Probe>(&server.uri())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ServerError);
        assert_eq!(err.message, "Service temporarily unavailable");
    }

    #[tokio::test]
    async fn other_status_carries_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .unwrap()
            .get_json::<Probe>(&server.uri())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unknown);
        assert_eq!(err.message, "Request failed: Bad Request");
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = HttpClient::with_timeout(Duration::from_millis(50))
            .unwrap()
            .get_json::<Probe>(&server.uri())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Timeout);
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let err = HttpClient::new()
            .unwrap()
            .get_json::<Probe>("http://127.0.0.1:9/unreachable")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
    }

    #[tokio::test]
    async fn malformed_body_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .unwrap()
            .get_json::<Probe>(&server.uri())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unknown);
        assert!(err.details.is_some());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}

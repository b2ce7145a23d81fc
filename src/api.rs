//! HTTP access to the vision backend
//!
//! One `reqwest::Client` for request/response calls (with the request
//! timeout) and one without a total timeout for the long-lived preview
//! stream. Every failed response goes through [`extract_error_message`].

use crate::constants::*;
use crate::error::{extract_error_message, ApiError};
use crate::types::*;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    stream_client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let trimmed = base_url.trim();
        let base = Url::parse(trimmed).map_err(|e| ApiError::InvalidBaseUrl(format!("{trimmed}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(trimmed.to_string()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Transport)?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Transport)?;

        debug!(base = %base, "API client configured");
        Ok(Self {
            base,
            client,
            stream_client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn health(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["health"]);
        let _: serde_json::Value = send_json(self.client.get(url)).await?;
        Ok(())
    }

    pub async fn start_session(&self, player_name: &str) -> Result<SessionStart, ApiError> {
        let name = player_name.trim();
        let body = StartSessionRequest {
            player_name: (!name.is_empty()).then(|| name.to_string()),
        };
        let url = self.endpoint(&["api", "session", "start"]);
        send_json(self.client.post(url).json(&body)).await
    }

    pub async fn play_round(&self, session_id: &str) -> Result<RoundResult, ApiError> {
        let url = self.endpoint(&["api", "session", session_id, "play-round"]);
        send_json(self.client.post(url)).await
    }

    pub async fn capture_expression(&self, session_id: &str) -> Result<ExpressionResult, ApiError> {
        let url = self.endpoint(&["api", "session", session_id, "final-expression"]);
        send_json(self.client.post(url)).await
    }

    pub async fn fetch_session_status(&self, session_id: &str) -> Result<SessionStatus, ApiError> {
        let url = self.endpoint(&["api", "session", session_id]);
        send_json(self.client.get(url)).await
    }

    /// Completed sessions, newest first as ordered by the backend
    pub async fn fetch_logs(&self) -> Result<Vec<SessionLogEntry>, ApiError> {
        let url = self.endpoint(&["api", "logs"]);
        let logs: LogsResponse = send_json(self.client.get(url)).await?;
        Ok(logs.sessions)
    }

    pub async fn fetch_preview_status(&self) -> Result<PreviewStatus, ApiError> {
        let url = self.endpoint(&["api", "preview", "status"]);
        send_json(self.client.get(url)).await
    }

    /// Stream URL with a cache-busting nonce as the query string
    pub fn preview_stream_url(&self, nonce: u64) -> Url {
        let mut url = self.endpoint(&["api", "preview", "stream"]);
        url.set_query(Some(&nonce.to_string()));
        url
    }

    pub async fn open_preview_stream(&self, nonce: u64) -> Result<Response, ApiError> {
        let url = self.preview_stream_url(nonce);
        debug!(url = %url, "Opening preview stream");
        let response = self.stream_client.get(url).send().await?;
        check_status(response).await
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await.map_err(|e| {
        warn!(error = %e, "Request to backend failed");
        ApiError::from(e)
    })?;
    let response = check_status(response).await?;
    response.json::<T>().await.map_err(|e| {
        warn!(error = %e, "Failed to decode backend response");
        ApiError::from(e)
    })
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.bytes().await.unwrap_or_default();
    let message = extract_error_message(&body);
    warn!(status = %status, url = %url, message = %message, "Backend returned an error");
    Err(ApiError::Backend { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn round_json(n: usize, outcome: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "session_id": "abc",
            "round_number": n,
            "player_move": "paper",
            "bot_move": "rock",
            "outcome": outcome,
            "stats": {"rock": 2, "paper": 30, "scissors": 1},
            "remaining_rounds": 3 - n,
            "status": status
        })
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(ApiClient::new("not a url"), Err(ApiError::InvalidBaseUrl(_))));
        assert!(matches!(ApiClient::new("ftp://host"), Err(ApiError::InvalidBaseUrl(_))));
        assert!(ApiClient::new(" http://localhost:8000 ").is_ok());
    }

    #[test]
    fn endpoints_respect_base_path() {
        let api = ApiClient::new("http://host:8000/").unwrap();
        assert_eq!(
            api.endpoint(&["api", "logs"]).as_str(),
            "http://host:8000/api/logs"
        );

        let api = ApiClient::new("http://host/rps").unwrap();
        assert_eq!(
            api.endpoint(&["api", "session", "x y", "play-round"]).as_str(),
            "http://host/rps/api/session/x%20y/play-round"
        );
    }

    #[test]
    fn stream_url_carries_nonce() {
        let api = ApiClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            api.preview_stream_url(1700000000).as_str(),
            "http://localhost:8000/api/preview/stream?1700000000"
        );
    }

    #[tokio::test]
    async fn start_session_sends_null_for_blank_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/session/start"))
            .and(body_json(serde_json::json!({"player_name": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "session_id": "abc",
                "total_rounds": 3,
                "status": "active"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let start = api.start_session("   ").await.unwrap();
        assert_eq!(start.session_id, "abc");
        assert_eq!(start.status, SessionPhase::Active);
    }

    #[tokio::test]
    async fn start_session_sends_trimmed_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/session/start"))
            .and(body_json(serde_json::json!({"player_name": "Ada"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "session_id": "abc",
                "total_rounds": 3,
                "status": "active"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        api.start_session(" Ada ").await.unwrap();
    }

    #[tokio::test]
    async fn play_round_decodes_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/session/abc/play-round"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(round_json(3, "player", "needs_expression")),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let result = api.play_round("abc").await.unwrap();
        assert_eq!(result.outcome, Outcome::Player);
        assert_eq!(result.status, SessionPhase::NeedsExpression);
        assert_eq!(result.votes("paper"), 30);
    }

    #[tokio::test]
    async fn backend_detail_becomes_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/session/abc/final-expression"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "detail": "You must finish all rounds first"
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let err = api.capture_expression("abc").await.unwrap_err();
        assert_eq!(err.to_string(), "You must finish all rounds first");
        assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn plain_text_error_uses_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/preview/status"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let err = api.fetch_preview_status().await.unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/session/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let err = api.fetch_session_status("abc").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn logs_default_to_empty_without_sessions_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        assert!(api.fetch_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn logs_keep_backend_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sessions": [
                    {"session_id": "new", "played_at": "2024-05-02T10:00:00", "scoreboard": {"player": 1, "bot": 2, "draws": 0}},
                    {"session_id": "old", "played_at": "2024-05-01T10:00:00", "scoreboard": {"player": 3, "bot": 0, "draws": 0}}
                ]
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let ids: Vec<String> = api
            .fetch_logs()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn health_accepts_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        assert!(api.health().await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = api.fetch_logs().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}

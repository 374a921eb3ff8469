//! REST client for the hosted PRISM backend.

use crate::config::{AuthConfig, TuiConfig};
use crate::source::RecordSource;
use async_trait::async_trait;
use prism_core::{AgentId, AgentRecord, CorrelationRecord, SemanticEntityRecord};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

/// Any failure of a read query. The UI treats every variant as
/// "fetch failed"; the variants exist for the log.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{code}: {message}")]
    Backend { code: String, message: String },
    #[error("Config error: {0}")]
    Config(String),
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct BackendError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(&config.auth)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(url)
            .headers(self.auth_header.clone())
            .query(query)
            .send()
            .await?;
        parse_response(response).await
    }
}

#[async_trait]
impl RecordSource for RestClient {
    async fn list_correlations(&self) -> Result<Vec<CorrelationRecord>, FetchError> {
        self.get_json("/api/v1/correlations", &[("order", "strength.desc")])
            .await
    }

    async fn list_agents(&self) -> Result<Vec<AgentRecord>, FetchError> {
        self.get_json("/api/v1/agents", &[("select", "id,name")])
            .await
    }

    async fn count_agent_data(&self, agent_id: AgentId) -> Result<u64, FetchError> {
        let response: CountResponse = self
            .get_json("/api/v1/agent-data/count", &[("agent_id", agent_id.to_string())])
            .await?;
        Ok(response.count)
    }

    async fn list_semantic_entities(
        &self,
        limit: usize,
    ) -> Result<Vec<SemanticEntityRecord>, FetchError> {
        self.get_json(
            "/api/v1/semantic-entities",
            &[
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let status = response.status();
    let body = response.bytes().await?;
    decode_body(status.as_u16(), status.is_success(), &body)
}

/// Decode a response body, mapping error statuses to [`FetchError`].
pub(crate) fn decode_body<T: serde::de::DeserializeOwned>(
    status: u16,
    success: bool,
    body: &[u8],
) -> Result<T, FetchError> {
    if success {
        return Ok(serde_json::from_slice::<T>(body)?);
    }
    if let Ok(backend) = serde_json::from_slice::<BackendError>(body) {
        return Err(FetchError::Backend {
            code: backend.code,
            message: backend.message,
        });
    }
    Err(FetchError::Status {
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

fn build_auth_headers(auth: &AuthConfig) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| FetchError::Config(e.to_string()))?,
        );
    }
    if let Some(jwt) = &auth.jwt {
        let value = format!("Bearer {}", jwt);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| FetchError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_body() {
        let count: CountResponse = decode_body(200, true, br#"{"count": 12}"#).unwrap();
        assert_eq!(count.count, 12);
    }

    #[test]
    fn test_decode_malformed_success_body() {
        let result: Result<CountResponse, _> = decode_body(200, true, b"<html>");
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_decode_backend_error_body() {
        let result: Result<CountResponse, _> = decode_body(
            401,
            false,
            br#"{"code": "PGRST301", "message": "JWT expired"}"#,
        );
        match result {
            Err(FetchError::Backend { code, message }) => {
                assert_eq!(code, "PGRST301");
                assert_eq!(message, "JWT expired");
            }
            other => panic!("unexpected result: {:?}", other.map(|c| c.count)),
        }
    }

    #[test]
    fn test_decode_plain_error_body() {
        let result: Result<CountResponse, _> = decode_body(503, false, b"upstream unavailable");
        assert!(matches!(
            result,
            Err(FetchError::Status { status: 503, ref body }) if body == "upstream unavailable"
        ));
    }

    #[test]
    fn test_auth_headers_include_both_credentials() {
        let headers = build_auth_headers(&AuthConfig {
            api_key: Some("anon".to_string()),
            jwt: Some("token".to_string()),
        })
        .unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "anon");
        assert_eq!(headers.get("authorization").unwrap(), "Bearer token");
    }

    #[test]
    fn test_auth_header_rejects_control_characters() {
        let result = build_auth_headers(&AuthConfig {
            api_key: Some("bad\nkey".to_string()),
            jwt: None,
        });
        assert!(matches!(result, Err(FetchError::Config(_))));
    }
}

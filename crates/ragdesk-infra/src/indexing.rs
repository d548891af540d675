//! HTTP client for the indexing service.
//!
//! Every submission is one multipart `POST {base}/indexData` carrying a
//! `type` field and a `file` field (a file part for uploads, plain text for
//! URLs and context).

use std::time::Duration;

use ragdesk_core::upload::IndexingClient;
use ragdesk_types::config::ClientConfig;
use ragdesk_types::error::IndexError;
use ragdesk_types::source::{IndexPayload, IndexRequest, IndexResponse};
use reqwest::multipart::{Form, Part};

const INDEX_PATH: &str = "/indexData";

/// Indexing service client backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpIndexingClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIndexingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}{INDEX_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, IndexError> {
        Self::new(
            &config.indexing_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(request: IndexRequest) -> Result<Form, IndexError> {
        let form = Form::new().text("type", request.index_type.as_str());
        let form = match request.payload {
            IndexPayload::Bytes {
                file_name,
                mime,
                data,
            } => {
                let part = Part::bytes(data)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| IndexError::Client(format!("invalid content type '{mime}': {e}")))?;
                form.part("file", part)
            }
            IndexPayload::Text(text) => form.text("file", text),
        };
        Ok(form)
    }
}

impl IndexingClient for HttpIndexingClient {
    async fn index(&self, request: IndexRequest) -> Result<IndexResponse, IndexError> {
        let index_type = request.index_type;
        let form = Self::build_form(request)?;

        tracing::debug!(endpoint = %self.endpoint, %index_type, "posting to indexing service");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;

        if !status.is_success() {
            // Prefer the service's own explanation over the status line.
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(IndexError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<IndexResponse>(&body)
            .map_err(|e| IndexError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdesk_types::source::IndexType;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpIndexingClient {
        HttpIndexingClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn text_request(index_type: IndexType, text: &str) -> IndexRequest {
        IndexRequest {
            index_type,
            payload: IndexPayload::Text(text.to_string()),
        }
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client =
            HttpIndexingClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/indexData");
    }

    #[tokio::test]
    async fn success_body_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexData"))
            .and(body_string_contains("name=\"type\""))
            .and(body_string_contains("website"))
            .and(body_string_contains("https://nodejs.org/docs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "message": "Indexed 12 chunks"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .index(text_request(IndexType::Website, "https://nodejs.org/docs"))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("Indexed 12 chunks"));
        assert_eq!(response.error, None);
    }

    #[tokio::test]
    async fn file_part_carries_name_and_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexData"))
            .and(body_string_contains("filename=\"guide.md\""))
            .and(body_string_contains("text/markdown"))
            .and(body_string_contains("# Guide"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let request = IndexRequest {
            index_type: IndexType::Text,
            payload: IndexPayload::Bytes {
                file_name: "guide.md".to_string(),
                mime: "text/markdown".to_string(),
                data: b"# Guide".to_vec(),
            },
        };
        let response = client(&server).index(request).await.unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexData"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"success": false, "error": "Unsupported file type"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .index(text_request(IndexType::Text, "notes"))
            .await
            .unwrap_err();

        assert!(matches!(err, IndexError::Status { status: 400, .. }));
        assert_eq!(err.to_string(), "Unsupported file type");
    }

    #[tokio::test]
    async fn status_without_body_uses_status_line() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexData"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = client(&server)
            .index(text_request(IndexType::Text, "notes"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error");
    }

    #[tokio::test]
    async fn malformed_success_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexData"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .index(text_request(IndexType::Text, "notes"))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let client = HttpIndexingClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client
            .index(text_request(IndexType::Text, "notes"))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Transport(_)));
    }
}

use super::{BackendError, ChatBackend, ChatQuery};
use async_trait::async_trait;
use reqwest::{Client, Url};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    origin: Option<Url>,
}

impl HttpBackend {
    /// `base_url` comes from the endpoint resolver. When it is empty, requests
    /// go to `/chat` on `origin`, the page the client is served from.
    pub fn new(base_url: String, origin: Option<Url>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            origin,
        }
    }

    pub fn chat_url(&self) -> Result<Url, BackendError> {
        if self.base_url.is_empty() {
            let origin = self.origin.as_ref().ok_or_else(|| {
                BackendError::Endpoint("same-origin request without a page origin".to_string())
            })?;
            return origin
                .join("/chat")
                .map_err(|e| BackendError::Endpoint(e.to_string()));
        }
        Url::parse(&format!("{}/chat", self.base_url))
            .map_err(|e| BackendError::Endpoint(format!("{}: {}", self.base_url, e)))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn ask(&self, query: &str) -> Result<String, BackendError> {
        let url = self.chat_url()?;
        let body = ChatQuery {
            query: query.to_string(),
        };

        tracing::debug!(%url, query_len = query.len(), "sending chat request");

        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status,
                message: text,
            });
        }

        let text = resp.text().await?;
        tracing::debug!(response_len = text.len(), "received chat response");
        Ok(text)
    }
}

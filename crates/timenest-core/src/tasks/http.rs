//! Task store over the REST API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use super::model::{NewTask, Task, TaskUpdate};
use super::store::TaskStore;
use crate::credentials::TokenProvider;
use crate::error::TaskStoreError;
use crate::storage::TaskStoreConfig;

#[derive(Debug, Deserialize)]
struct ItemsEnvelope {
    #[serde(default)]
    items: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope {
    item: Task,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

pub struct HttpTaskStore {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpTaskStore {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, TaskStoreError> {
        let base_url =
            Url::parse(base_url).map_err(|e| TaskStoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TaskStoreError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn from_config(
        config: &TaskStoreConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, TaskStoreError> {
        Self::new(&config.base_url, config.request_timeout(), tokens)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TaskStoreError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| TaskStoreError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn collection_url(&self) -> Result<Url, TaskStoreError> {
        self.endpoint(&["tasks", ""])
    }

    fn item_url(&self, id: &str) -> Result<Url, TaskStoreError> {
        if id.trim().is_empty() {
            return Err(TaskStoreError::InvalidRequest("Task id is required".into()));
        }
        self.endpoint(&["tasks", id])
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, TaskStoreError> {
        let token = self
            .tokens
            .token()
            .map_err(|e| {
                tracing::debug!("token lookup failed: {e}");
                TaskStoreError::NotAuthenticated
            })?
            .ok_or(TaskStoreError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder, verb: &str) -> Result<Response, TaskStoreError> {
        let response = self.authorize(request)?.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(http_error(response, verb).await)
    }
}

async fn http_error(response: Response, verb: &str) -> TaskStoreError {
    let status = response.status();
    let message = response
        .json::<ErrorEnvelope>()
        .await
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback_message(verb, status));
    TaskStoreError::Http {
        status: status.as_u16(),
        message,
    }
}

fn fallback_message(verb: &str, status: StatusCode) -> String {
    format!("{verb} failed ({})", status.as_u16())
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn list(&self) -> Result<Vec<Task>, TaskStoreError> {
        let url = self.collection_url()?;
        let response = self.send(self.client.get(url), "Load").await?;
        let body: ItemsEnvelope = response
            .json()
            .await
            .map_err(|e| TaskStoreError::Decode(e.to_string()))?;
        Ok(body.items)
    }

    async fn create(&self, task: &NewTask) -> Result<Task, TaskStoreError> {
        task.validate()
            .map_err(|e| TaskStoreError::InvalidRequest(e.to_string()))?;
        let url = self.collection_url()?;
        let response = self.send(self.client.post(url).json(task), "Create").await?;
        let body: ItemEnvelope = response
            .json()
            .await
            .map_err(|e| TaskStoreError::Decode(e.to_string()))?;
        Ok(body.item)
    }

    async fn update(&self, id: &str, update: &TaskUpdate) -> Result<Task, TaskStoreError> {
        update
            .validate()
            .map_err(|e| TaskStoreError::InvalidRequest(e.to_string()))?;
        let url = self.item_url(id)?;
        let response = self.send(self.client.put(url).json(update), "Update").await?;
        let body: ItemEnvelope = response
            .json()
            .await
            .map_err(|e| TaskStoreError::Decode(e.to_string()))?;
        Ok(body.item)
    }

    async fn delete(&self, id: &str) -> Result<(), TaskStoreError> {
        let url = self.item_url(id)?;
        self.send(self.client.delete(url), "Delete").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticTokenProvider;

    fn store(base: &str) -> HttpTaskStore {
        HttpTaskStore::new(
            base,
            Duration::from_secs(5),
            Arc::new(StaticTokenProvider::new("t0k3n")),
        )
        .unwrap()
    }

    #[test]
    fn endpoints_follow_base_path() {
        let s = store("http://127.0.0.1:5000/api");
        assert_eq!(s.collection_url().unwrap().as_str(), "http://127.0.0.1:5000/api/tasks/");
        assert_eq!(s.item_url("abc").unwrap().as_str(), "http://127.0.0.1:5000/api/tasks/abc");

        let trailing = store("http://127.0.0.1:5000/api/");
        assert_eq!(trailing.collection_url().unwrap().as_str(), "http://127.0.0.1:5000/api/tasks/");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let err = HttpTaskStore::new(
            "mailto:someone@example.com",
            Duration::from_secs(1),
            Arc::new(StaticTokenProvider::signed_out()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, TaskStoreError::InvalidUrl(_)));
    }

    #[test]
    fn blank_id_is_rejected_before_sending() {
        assert!(matches!(
            store("http://localhost/api").item_url(" "),
            Err(TaskStoreError::InvalidRequest(_))
        ));
    }

    #[test]
    fn fallback_message_names_verb_and_status() {
        assert_eq!(
            fallback_message("Delete", StatusCode::INTERNAL_SERVER_ERROR),
            "Delete failed (500)"
        );
    }
}

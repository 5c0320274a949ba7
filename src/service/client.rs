//! HTTP backend for the Azure AI Agents API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::error::ServiceError;
use super::types::*;
use super::{AgentService, Result};
use crate::auth::Credentials;

/// API version sent with every request unless configured otherwise
pub const DEFAULT_API_VERSION: &str = "v1";

/// Page size for list operations
const PAGE_LIMIT: &str = "100";

/// Connection options for [`AgentsClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Azure AI Agents API client, rooted at a project endpoint
#[derive(Debug)]
pub struct AgentsClient {
    http_client: reqwest::Client,
    endpoint: Url,
    api_version: String,
    credentials: Credentials,
}

impl AgentsClient {
    /// Create a new client for the given project endpoint
    pub fn new(endpoint: &str, credentials: Credentials, options: ClientOptions) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with '/'
        let mut base = endpoint.trim().trim_end_matches('/').to_string();
        base.push('/');
        let endpoint = Url::parse(&base)
            .map_err(|e| ServiceError::Other(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let http_client = reqwest::Client::builder().timeout(options.timeout).build()?;

        Ok(Self {
            http_client,
            endpoint,
            api_version: options.api_version,
            credentials,
        })
    }

    /// Get the project endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build headers for API requests
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let (name, value) = self
            .credentials
            .header()
            .map_err(|e| ServiceError::Auth(e.to_string()))?;
        headers.insert(name, value);

        Ok(headers)
    }

    /// Resolve a path under the endpoint, with the api-version attached
    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .endpoint
            .join(path)
            .map_err(|e| ServiceError::Other(format!("Invalid request path '{}': {}", path, e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", &self.api_version);
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path, query)?;
        tracing::debug!("GET {}", url.path());
        let response = self
            .http_client
            .get(url)
            .headers(self.headers()?)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path, &[])?;
        tracing::debug!("POST {}", url.path());
        let response = self
            .http_client
            .post(url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::from_response(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    /// Follow `after` cursors until the list is exhausted
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        order: ListSortOrder,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("order", order.as_str()), ("limit", PAGE_LIMIT)];
            if let Some(ref cursor) = after {
                query.push(("after", cursor.as_str()));
            }

            let page: Page<T> = self.get(path, &query).await?;
            let fetched = page.data.len();
            items.extend(page.data);

            match page.last_id {
                Some(last_id) if page.has_more && fetched > 0 => after = Some(last_id),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl AgentService for AgentsClient {
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent> {
        self.post("assistants", request).await
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent> {
        self.get(&format!("assistants/{}", agent_id), &[]).await
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.post("threads", &serde_json::json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage> {
        let request = CreateMessageRequest {
            role,
            content: content.to_string(),
        };
        self.post(&format!("threads/{}/messages", thread_id), &request)
            .await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        order: ListSortOrder,
    ) -> Result<Vec<ThreadMessage>> {
        self.list_all(&format!("threads/{}/messages", thread_id), order)
            .await
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run> {
        let request = CreateRunRequest {
            assistant_id: agent_id.to_string(),
        };
        self.post(&format!("threads/{}/runs", thread_id), &request)
            .await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get(&format!("threads/{}/runs/{}", thread_id, run_id), &[])
            .await
    }

    async fn submit_tool_approvals(
        &self,
        thread_id: &str,
        run_id: &str,
        approvals: &[ToolApproval],
    ) -> Result<Run> {
        let request = SubmitApprovalsRequest {
            tool_approvals: approvals.to_vec(),
        };
        self.post(
            &format!("threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
            &request,
        )
        .await
    }

    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> Result<Vec<RunStep>> {
        self.list_all(
            &format!("threads/{}/runs/{}/steps", thread_id, run_id),
            ListSortOrder::Asc,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> AgentsClient {
        AgentsClient::new(
            endpoint,
            Credentials::ApiKey("k".to_string()),
            ClientOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_url_keeps_project_path() {
        let client = client("https://res.services.ai.azure.com/api/projects/demo");
        let url = client.url("threads/t1/runs", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://res.services.ai.azure.com/api/projects/demo/threads/t1/runs?api-version=v1"
        );
    }

    #[test]
    fn test_url_with_trailing_slash_and_query() {
        let client = client("https://res.services.ai.azure.com/api/projects/demo/");
        let url = client
            .url("threads/t1/messages", &[("order", "asc"), ("after", "msg_9")])
            .unwrap();
        assert_eq!(url.path(), "/api/projects/demo/threads/t1/messages");
        assert_eq!(url.query(), Some("api-version=v1&order=asc&after=msg_9"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = AgentsClient::new(
            "not a url",
            Credentials::ApiKey("k".to_string()),
            ClientOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_header() {
        let headers = client("https://example.com/api/projects/p").headers().unwrap();
        assert_eq!(headers.get("api-key").unwrap(), "k");
    }
}

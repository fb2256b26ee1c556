use async_trait::async_trait;

use super::ports::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RestMethod {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone)]
pub(crate) struct RestRequest {
    pub method: RestMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub(crate) struct RestResponse {
    pub status: u16,
    pub content_range: Option<String>,
    pub body: Vec<u8>,
}

impl RestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Internal seam between the REST adapters and the actual HTTP transport, so
/// tests can fake the backend without a server.
#[async_trait]
pub(crate) trait HttpExec: Send + Sync {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse, RemoteError>;
}

pub(crate) struct ReqwestExec {
    client: reqwest::Client,
}

impl ReqwestExec {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpExec for ReqwestExec {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse, RemoteError> {
        let method = match request.method {
            RestMethod::Get => reqwest::Method::GET,
            RestMethod::Post => reqwest::Method::POST,
            RestMethod::Patch => reqwest::Method::PATCH,
            RestMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?
            .to_vec();

        Ok(RestResponse {
            status,
            content_range,
            body,
        })
    }
}

// Commits API HTTP client.
// Issues GET requests against the commits endpoint and converts error statuses.

use std::future::Future;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::error::{Result, ViewError};

/// Default server the commits pages are served from.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8181";

/// Something that can produce the raw body for a request descriptor.
pub trait CommitSource: Send + Sync + 'static {
    /// Fetch the raw response body for `request` (a path such as `/repo/x/commits/json`).
    fn fetch(&self, request: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// HTTP client for the commits JSON endpoint.
#[derive(Debug, Clone)]
pub struct CommitsClient {
    client: Client,
    base_url: String,
}

impl CommitsClient {
    /// Create a new client for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("commitview/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ViewError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for a request descriptor.
    pub fn url_for(&self, request: &str) -> String {
        format!("{}{}", self.base_url, request)
    }

    /// Make a GET request against the server.
    pub async fn get(&self, request: &str) -> Result<Response> {
        let url = self.url_for(request);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(ViewError::Http)?;
        check_response(response).await
    }
}

impl CommitSource for CommitsClient {
    async fn fetch(&self, request: &str) -> Result<Vec<u8>> {
        let response = self.get(request).await?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(ViewError::NotFound(response.url().to_string())),
        status => Err(ViewError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        }),
    }
}

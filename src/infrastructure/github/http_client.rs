use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LINK;
use reqwest::{StatusCode, Url};

use crate::domain::{DomainError, RemoteError};

/// Decoded JSON body plus the pagination cursor from the `Link` header
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub body: serde_json::Value,
    pub next_page: Option<u32>,
}

impl JsonResponse {
    pub fn new(body: serde_json::Value) -> Self {
        Self {
            body,
            next_page: None,
        }
    }

    pub fn with_next_page(mut self, page: u32) -> Self {
        self.next_page = Some(page);
        self
    }
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<JsonResponse, RemoteError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<JsonResponse, RemoteError> {
        let mut request = self.client.get(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                RemoteError::other(format!("Invalid request: {}", e))
            } else {
                RemoteError::transient(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &error_body));
        }

        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_next_page);

        let body = response.json().await.map_err(|e| {
            if e.is_decode() {
                RemoteError::other(format!("Failed to parse response: {}", e))
            } else {
                RemoteError::transient(format!("Failed to read response: {}", e))
            }
        })?;

        Ok(JsonResponse { body, next_page })
    }
}

/// Map a non-success status to a remote error kind
pub fn classify_status(status: StatusCode, body: &str) -> RemoteError {
    let message = format!("HTTP {}: {}", status, body.trim());

    match status {
        StatusCode::NOT_FOUND => RemoteError::not_found(message),
        StatusCode::FORBIDDEN | StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            RemoteError::transient(message)
        }
        s if s.is_server_error() => RemoteError::transient(message),
        _ => RemoteError::other(message),
    }
}

/// Extract the `page` query parameter of the `rel="next"` entry of a `Link` header
pub fn parse_next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| param.trim() == "rel=\"next\"");

        if !is_next {
            return None;
        }

        let url = Url::parse(target.strip_prefix('<')?.strip_suffix('>')?).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, JsonResponse>>,
        errors: RwLock<HashMap<String, RemoteError>>,
        requests: RwLock<Vec<String>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: JsonResponse) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: RemoteError) -> Self {
            self.errors.write().unwrap().insert(url.into(), error);
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn get_json(
            &self,
            url: &str,
            _headers: Vec<(&str, &str)>,
        ) -> Result<JsonResponse, RemoteError> {
            self.requests.write().unwrap().push(url.to_string());

            if let Some(error) = self.errors.read().unwrap().get(url) {
                return Err(error.clone());
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| RemoteError::other(format!("No mock response for {}", url)))
        }
    }
}

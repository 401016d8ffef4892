//! Async HTTP client wrapping reqwest.
//!
//! One request per call: no retries and no backoff. The strategy chain is
//! the only fallback mechanism, and every call is bounded by the timeout the
//! caller derives from its deadline.

use crate::error::StrategyError;
use serde::Serialize;
use std::time::Duration;

/// Response from an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client shared by the network strategies.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with the given user agent and a default timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// GET a URL with extra headers.
    pub async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, StrategyError> {
        let mut builder = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let r = builder.send().await?;
        Self::collect(r).await
    }

    /// POST a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        timeout: Duration,
    ) -> Result<HttpResponse, StrategyError> {
        let r = self
            .client
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        Self::collect(r).await
    }

    async fn collect(r: reqwest::Response) -> Result<HttpResponse, StrategyError> {
        let status = r.status().as_u16();
        let body = r.text().await?;

        Ok(HttpResponse { status, body })
    }
}

//! Retrying HTTP transport shared by the API clients

use std::time::Duration;

use capture_domain::{CaptureError, RetryPolicy};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// HTTP client applying a [`RetryPolicy`] to every request.
///
/// Attempt `n` runs with `policy.timeout_for_attempt(n)`; timeouts,
/// connection failures and 5xx statuses are retried until the policy is
/// exhausted. Client errors (4xx) are returned after one attempt. There is no sleep between attempts; the
/// growing per-attempt timeout is the backoff.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, CaptureError> {
        Self::builder().build()
    }

    /// Retry policy applied to every request
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// A response with a non-retryable status is returned as `Ok`; the
    /// caller decides how to classify it. A retryable status that survives
    /// every attempt is returned as well.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, CaptureError> {
        let attempts = self.policy.max_attempts();

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                CaptureError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let mut request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                CaptureError::from(infra)
            })?;
            let timeout = self.policy.timeout_for_attempt(attempt);
            if let Some(timeout) = timeout {
                *request.timeout_mut() = Some(timeout);
            }

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, %url, ?timeout, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if is_retryable_status(status) && attempt < self.policy.max_retries() {
                        warn!(attempt = attempt + 1, %method, %url, %status, "retrying after server status");
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    let infra: InfraError = err.into();
                    let error = CaptureError::from(infra);
                    debug!(attempt = attempt + 1, %method, %url, error = %error, "HTTP request failed");

                    if self.policy.should_retry(attempt, &error) {
                        warn!(attempt = attempt + 1, %method, %url, error_type = error.label(), "retrying failed request");
                        continue;
                    }

                    return Err(error);
                }
            }
        }

        Err(CaptureError::Internal("http client exhausted retries without producing a result".into()))
    }
}

/// Statuses worth another attempt
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    policy: RetryPolicy,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            connect_timeout: None,
            user_agent: Some(concat!("capture-core/", env!("CARGO_PKG_VERSION")).to_string()),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Set the retry policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound the TCP connect phase
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Override the `User-Agent` header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers sent with every request
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HttpClient, CaptureError> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            CaptureError::from(infra)
        })?;

        Ok(HttpClient { client, policy: self.policy })
    }
}

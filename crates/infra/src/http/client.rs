//! Reqwest-backed [`RpcTransport`] implementation

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method, Response};
use storedesk_core::rpc::{FailedAttempt, RetryPolicy, RpcTransport};
use storedesk_domain::{
    HttpVerb, Result, RpcConfig, RpcEnvelope, RpcError, RpcRequest, TimeoutTiers,
};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::{connection_error, InfraError};

/// HTTP transport for stored-procedure endpoints with tiered timeouts,
/// bearer credentials and retries.
///
/// Holds only immutable configuration and a pooled reqwest client, so one
/// instance can be shared by every caller.
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: String,
    api_key: Option<Arc<str>>,
    timeouts: TimeoutTiers,
    retry: RetryPolicy,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeouts", &self.timeouts)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Start building a new transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Build a transport from the loaded client configuration.
    pub fn from_config(config: &RpcConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Base address without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry policy applied to idempotent requests.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Absolute URL for an endpoint path.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let path = endpoint.trim_start_matches('/');
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| RpcError::config(format!("Invalid endpoint '{endpoint}': {e}")))
    }

    async fn attempt(
        &self,
        request: &RpcRequest,
        url: &Url,
        attempt: u32,
    ) -> std::result::Result<RpcEnvelope, FailedAttempt> {
        let timeout = self.timeouts.for_tier(request.tier);
        let mut builder = self
            .client
            .request(method_for(request.verb), url.clone())
            .timeout(timeout)
            .json(&request.payload);

        match &self.api_key {
            Some(key) => builder = builder.bearer_auth(key),
            None => warn!(endpoint = %request.endpoint, "no API credential configured"),
        }

        debug!(attempt, method = %request.verb, %url, tier = %request.tier, "sending rpc request");

        let response = builder
            .send()
            .await
            .map_err(|err| FailedAttempt::no_response(connection_error(&err, timeout)))?;

        read_envelope(response, timeout).await
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    #[instrument(skip(self, request), fields(endpoint = %request.endpoint, tier = %request.tier))]
    async fn execute(&self, request: &RpcRequest) -> Result<RpcEnvelope> {
        let url = self.endpoint_url(&request.endpoint)?;
        let url = &url;

        let envelope = self
            .retry
            .run(&request.endpoint, request.is_idempotent(), |attempt| {
                self.attempt(request, url, attempt)
            })
            .await?;

        debug!(status = envelope.status_code, "rpc envelope received");
        Ok(envelope)
    }
}

async fn read_envelope(
    response: Response,
    timeout: Duration,
) -> std::result::Result<RpcEnvelope, FailedAttempt> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FailedAttempt::http_status(
            status.as_u16(),
            RpcError::from_http_response(status.as_u16(), &body),
        ));
    }

    response.json::<RpcEnvelope>().await.map_err(|err| {
        if err.is_timeout() {
            FailedAttempt::no_response(connection_error(&err, timeout))
        } else {
            let infra: InfraError = err.into();
            FailedAttempt::invalid_response(infra.0)
        }
    })
}

fn method_for(verb: HttpVerb) -> Method {
    match verb {
        HttpVerb::Get => Method::GET,
        HttpVerb::Head => Method::HEAD,
        HttpVerb::Options => Method::OPTIONS,
        HttpVerb::Post => Method::POST,
        HttpVerb::Put => Method::PUT,
        HttpVerb::Patch => Method::PATCH,
        HttpVerb::Delete => Method::DELETE,
    }
}

/// Builder for [`HttpTransport`].
pub struct HttpTransportBuilder {
    base_url: String,
    api_key: Option<String>,
    timeouts: TimeoutTiers,
    retry: RetryPolicy,
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        let config = RpcConfig::default();
        Self {
            base_url: config.base_url,
            api_key: None,
            timeouts: config.timeouts,
            retry: RetryPolicy::from_settings(&config.retry),
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
        }
    }
}

impl HttpTransportBuilder {
    /// Take base address, credential, timeouts and retry settings from
    /// `config`.
    pub fn config(mut self, config: &RpcConfig) -> Self {
        self.base_url = config.base_url.clone();
        self.api_key = config.api_key.clone();
        self.timeouts = config.timeouts;
        self.retry = RetryPolicy::from_settings(&config.retry);
        self
    }

    /// Base address of the API.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bearer credential sent with every request.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Per-tier timeouts.
    pub fn timeouts(mut self, timeouts: TimeoutTiers) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// `User-Agent` header value.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    /// Returns `RpcError::Config` for an invalid base URL or if the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<HttpTransport> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| RpcError::config(format!("Invalid base URL '{base_url}': {e}")))?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("storedesk-rpc/{}", env!("CARGO_PKG_VERSION")));

        let client = ReqwestClient::builder()
            .timeout(self.timeouts.max())
            .connect_timeout(self.connect_timeout)
            .user_agent(user_agent)
            .no_proxy()
            .build()
            .map_err(|err| {
                let infra: InfraError = err.into();
                infra.0
            })?;

        let api_key = self.api_key.filter(|key| !key.trim().is_empty()).map(Arc::from);
        if api_key.is_none() {
            warn!(base_url = %base_url, "RPC transport built without an API credential");
        }

        Ok(HttpTransport { client, base_url, api_key, timeouts: self.timeouts, retry: self.retry })
    }
}

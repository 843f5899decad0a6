//! # HTTP Transport
//!
//! Every upstream call goes through the [`Transport`] trait: a GET that
//! returns a JSON body. The production implementation wraps a shared
//! `reqwest::Client`; tests substitute scripted fakes.
//!
//! ## Invariants
//!
//! - Every [`ApiRequest`] carries a timeout; there is no unbounded call.
//! - Session cookies are attached only to requests marked credentialed.
//! - The query string is sent exactly as built, so signed values reach the
//!   server byte-for-byte as they were hashed.

use crate::credentials::Credentials;
use crate::endpoints::{REFERER, USER_AGENT};
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use ddcheck_wbi::{encode_component, SignedParams};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A single GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Endpoint URL without query.
    pub endpoint: String,
    /// Encoded query string without the leading `?`.
    pub query: String,
    /// Whether session cookies are attached.
    pub credentialed: bool,
    /// Upper bound on the whole request.
    pub timeout: Duration,
}

impl ApiRequest {
    /// A request with no query, no cookies and the given timeout.
    pub fn get(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: String::new(),
            credentialed: false,
            timeout,
        }
    }

    /// Sets the query from plain key/value pairs.
    pub fn params(mut self, params: &[(&str, String)]) -> Self {
        self.query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");
        self
    }

    /// Sets the query from a signed parameter set.
    pub fn signed(mut self, params: &SignedParams) -> Self {
        self.query = params.to_query_string();
        self
    }

    /// Attaches session cookies.
    pub fn with_credentials(mut self) -> Self {
        self.credentialed = true;
        self
    }

    /// Full URL including the query.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            self.endpoint.clone()
        } else {
            format!("{}?{}", self.endpoint, self.query)
        }
    }
}

/// Performs GET requests and returns parsed JSON bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Timeout`] when the request exceeds its timeout
    /// - [`ClientError::Status`] on a non-2xx status
    /// - [`ClientError::Transport`] on connection or body errors
    async fn get_json(&self, request: &ApiRequest) -> Result<Value>;
}

/// `reqwest`-backed transport with fixed browser headers.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    credentials: Credentials,
}

impl ReqwestTransport {
    /// Builds a transport with the default User-Agent and Referer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_headers(credentials, USER_AGENT, REFERER)
    }

    /// Builds a transport with custom User-Agent and Referer values.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if a header value is invalid or the
    /// HTTP client cannot be built.
    pub fn with_headers(credentials: Credentials, user_agent: &str, referer: &str) -> Result<Self> {
        let build_error = |reason: String| ClientError::Transport {
            endpoint: "client".to_string(),
            reason,
        };

        let mut headers = HeaderMap::new();
        let referer = HeaderValue::from_str(referer).map_err(|e| build_error(e.to_string()))?;
        headers.insert(reqwest::header::REFERER, referer);

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| build_error(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
        })
    }

    fn classify(endpoint: &str, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(endpoint.to_string())
        } else {
            ClientError::Transport {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_json(&self, request: &ApiRequest) -> Result<Value> {
        debug!("GET {} (timeout {:?})", request.endpoint, request.timeout);

        let mut builder = self.client.get(request.url()).timeout(request.timeout);
        if request.credentialed {
            if let Some(cookie) = self.credentials.header_value() {
                builder = builder.header(COOKIE, cookie);
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::classify(&request.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: request.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Self::classify(&request.endpoint, e))
    }
}

//! HTTP Client
//!
//! The real-network backend. Sent requests are queued; `run_pending` drains
//! the queue on the calling thread with a blocking reqwest client and
//! resolves each handle, which is the event-loop turn in which the `load`
//! and `error` signals fire.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use url::Url;

use crate::loader::Request;
use crate::xhr::{Backend, ReadyState, XmlHttpRequest};
use crate::{NetError, Response};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Max redirects to follow (0 = disable)
    pub max_redirects: usize,
    /// Default headers
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("Backbone.Native/", env!("CARGO_PKG_VERSION")).into(),
            connect_timeout: Duration::from_secs(30),
            max_redirects: 10,
            default_headers: Vec::new(),
        }
    }
}

/// HTTP backend builder
pub struct HttpBackendBuilder {
    config: ClientConfig,
}

impl HttpBackendBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.config.user_agent = ua.to_string();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        self.config.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> Result<HttpBackend, NetError> {
        HttpBackend::with_config(self.config)
    }
}

impl Default for HttpBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Backend performing real HTTP requests
pub struct HttpBackend {
    config: ClientConfig,
    client: reqwest::blocking::Client,
    queue: RefCell<VecDeque<(XmlHttpRequest, Request)>>,
}

impl HttpBackend {
    /// Create a backend with default settings
    pub fn new() -> Result<Self, NetError> {
        Self::builder().build()
    }

    /// Create a backend builder
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::new()
    }

    /// Create with custom config
    pub fn with_config(config: ClientConfig) -> Result<Self, NetError> {
        let redirects = if config.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(config.max_redirects)
        };
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .redirect(redirects)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            queue: RefCell::new(VecDeque::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of requests waiting for `run_pending`
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Perform every queued request and resolve its handle.
    ///
    /// Returns how many requests were resolved.
    pub fn run_pending(&self) -> usize {
        let mut resolved = 0;
        loop {
            let Some((xhr, request)) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            // Aborted while queued
            if xhr.ready_state() == ReadyState::Done {
                continue;
            }

            let outcome = match self.execute(&request) {
                Ok(response) => xhr.complete(response),
                Err(err) => xhr.fail(&err.to_string()),
            };
            match outcome {
                Ok(()) => resolved += 1,
                Err(err) => tracing::debug!(%err, url = %request.url, "request already resolved"),
            }
        }
        resolved
    }

    /// Make an HTTP request
    pub fn execute(&self, request: &Request) -> Result<Response, NetError> {
        let url = Url::parse(&request.url)
            .map_err(|e| NetError::InvalidUrl(format!("{}: {e}", request.url)))?;
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| NetError::Network(e.to_string()))?;

        tracing::info!("HTTP {} {}", request.method, url);

        let mut builder = self.client.request(method, url);
        for (name, value) in self.config.default_headers.iter().chain(&request.headers) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_body());
        }

        let response = builder
            .send()
            .map_err(|e| NetError::Network(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .map_err(|e| NetError::Network(e.to_string()))?;

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

impl Backend for HttpBackend {
    fn start(&self, xhr: &XmlHttpRequest, request: Request) {
        tracing::debug!(method = %request.method, url = %request.url, "request queued");
        self.queue.borrow_mut().push_back((xhr.clone(), request));
    }
}

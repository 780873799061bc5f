//! Backbone.Native Networking
//!
//! XMLHttpRequest handles, the backends that carry them, and the
//! jQuery-style `ajax` / model `sync` helpers built on top.

mod ajax;
mod client;
mod loader;
mod sync;
mod xhr;

pub mod testing;

pub use ajax::{ajax, AjaxOptions, AjaxState, Data, ResponseData};
pub use client::{ClientConfig, HttpBackend, HttpBackendBuilder};
pub use loader::{Method, Request};
pub use sync::{sync, SyncMethod, SyncOptions};
pub use url::Url;
pub use xhr::{Backend, Payload, ReadyState, XhrError, XmlHttpRequest};

/// Fetch a URL with a one-off blocking request; non-2xx statuses are errors
pub fn fetch(url: &str) -> Result<Response, NetError> {
    let response = HttpBackend::new()?.execute(&Request::get(url))?;
    if !(200..300).contains(&response.status) {
        return Err(NetError::HttpError { status: response.status });
    }
    Ok(response)
}

/// HTTP Response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    /// Response with the canonical reason phrase for `status`
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_status_text(mut self, text: &str) -> Self {
        self.status_text = text.to_string();
        self
    }
}

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

//! XMLHttpRequest
//!
//! A shared request handle. Cloning yields the same request, so a backend,
//! the ajax layer and application code can all hold it. Backends resolve the
//! request through [`XmlHttpRequest::complete`] or [`XmlHttpRequest::fail`];
//! the matching `load`/`error`/`abort` signal then fires exactly once.

use crate::loader::{Method, Request};
use crate::Response;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// XMLHttpRequest ready states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ReadyState {
    /// Client has been created, open() not called yet
    #[default]
    Unsent = 0,
    /// open() has been called
    Opened = 1,
    /// send() has been called, headers received
    HeadersReceived = 2,
    /// Downloading, responseText holds partial data
    Loading = 3,
    /// Operation complete
    Done = 4,
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Text sent as-is
    Text(String),
    /// Unprocessed object data
    Object(Map<String, Value>),
}

impl Payload {
    /// Wire form of the body; objects are written as JSON
    pub fn to_body(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Object(map) => Value::Object(map.clone()).to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Object(_) => None,
        }
    }
}

/// Something that carries requests to a server
pub trait Backend {
    /// Begin transmitting `request`; resolve `xhr` once the outcome is known
    fn start(&self, xhr: &XmlHttpRequest, request: Request);
}

type Signal = Rc<dyn Fn(&XmlHttpRequest)>;

#[derive(Default)]
struct Signals {
    load: Option<Signal>,
    error: Option<Signal>,
    abort: Option<Signal>,
}

struct XhrState {
    ready_state: ReadyState,
    status: u16,
    status_text: String,
    response_text: String,
    response_headers: Vec<(String, String)>,
    method: Method,
    url: String,
    request_headers: Vec<(String, String)>,
    body: Option<Payload>,
    send_flag: bool,
    error_flag: bool,
    signals: Signals,
    backend: Rc<dyn Backend>,
}

/// XMLHttpRequest handle
#[derive(Clone)]
pub struct XmlHttpRequest {
    state: Rc<RefCell<XhrState>>,
}

impl std::fmt::Debug for XmlHttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("XmlHttpRequest")
            .field("ready_state", &state.ready_state)
            .field("method", &state.method)
            .field("url", &state.url)
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

impl PartialEq for XmlHttpRequest {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl XmlHttpRequest {
    /// Create a request that will be carried by `backend`
    pub fn new(backend: Rc<dyn Backend>) -> Self {
        Self {
            state: Rc::new(RefCell::new(XhrState {
                ready_state: ReadyState::Unsent,
                status: 0,
                status_text: String::new(),
                response_text: String::new(),
                response_headers: Vec::new(),
                method: Method::Get,
                url: String::new(),
                request_headers: Vec::new(),
                body: None,
                send_flag: false,
                error_flag: false,
                signals: Signals::default(),
                backend,
            })),
        }
    }

    /// Whether both handles refer to the same request
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Open the request
    pub fn open(&self, method: &str, url: &str) -> Result<(), XhrError> {
        let method = Method::parse(method)?;
        let mut state = self.state.borrow_mut();
        if state.send_flag && state.ready_state != ReadyState::Done {
            return Err(XhrError::InvalidState);
        }
        state.method = method;
        state.url = url.to_string();
        state.ready_state = ReadyState::Opened;
        state.send_flag = false;
        state.error_flag = false;
        state.request_headers.clear();
        state.body = None;
        Ok(())
    }

    /// Set request header
    pub fn set_request_header(&self, name: &str, value: &str) -> Result<(), XhrError> {
        let mut state = self.state.borrow_mut();
        if state.ready_state != ReadyState::Opened || state.send_flag {
            return Err(XhrError::InvalidState);
        }

        if is_forbidden_header(&name.to_ascii_lowercase()) {
            return Err(XhrError::ForbiddenHeader(name.to_string()));
        }

        // Repeated headers are combined
        match state
            .request_headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => state.request_headers.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Hand the request to the backend
    pub fn send(&self, body: Option<Payload>) -> Result<(), XhrError> {
        let (backend, request) = {
            let mut state = self.state.borrow_mut();
            if state.ready_state != ReadyState::Opened || state.send_flag {
                return Err(XhrError::InvalidState);
            }
            state.send_flag = true;
            state.body = body.clone();
            let request = Request {
                method: state.method,
                url: state.url.clone(),
                headers: state.request_headers.clone(),
                body,
            };
            (Rc::clone(&state.backend), request)
        };

        tracing::debug!(method = %request.method, url = %request.url, "xhr sent");
        backend.start(self, request);
        Ok(())
    }

    /// Abort an in-flight request; fires `abort`
    pub fn abort(&self) {
        {
            let mut state = self.state.borrow_mut();
            if !state.send_flag || state.ready_state == ReadyState::Done {
                return;
            }
            state.ready_state = ReadyState::Done;
            state.send_flag = false;
            state.error_flag = true;
            state.status = 0;
            state.status_text.clear();
            state.response_text.clear();
            state.response_headers.clear();
        }
        tracing::debug!(url = %self.url(), "xhr aborted");
        self.emit(|s| s.abort.clone());
    }

    /// Record a server response and fire `load`
    pub fn complete(&self, response: Response) -> Result<(), XhrError> {
        {
            let mut state = self.state.borrow_mut();
            if !state.send_flag || state.ready_state == ReadyState::Done {
                return Err(XhrError::InvalidState);
            }
            state.ready_state = ReadyState::HeadersReceived;
            state.status = response.status;
            state.status_text = response.status_text;
            state.response_headers = response.headers;
            state.ready_state = ReadyState::Loading;
            state.response_text = response.body;
            state.ready_state = ReadyState::Done;
        }
        tracing::debug!(url = %self.url(), status = self.status(), "xhr loaded");
        self.emit(|s| s.load.clone());
        Ok(())
    }

    /// Record a transport failure and fire `error`
    pub fn fail(&self, reason: &str) -> Result<(), XhrError> {
        {
            let mut state = self.state.borrow_mut();
            if !state.send_flag || state.ready_state == ReadyState::Done {
                return Err(XhrError::InvalidState);
            }
            state.ready_state = ReadyState::Done;
            state.error_flag = true;
            state.status = 0;
            state.status_text.clear();
        }
        tracing::warn!(url = %self.url(), reason, "xhr failed");
        self.emit(|s| s.error.clone());
        Ok(())
    }

    fn emit(&self, pick: impl FnOnce(&Signals) -> Option<Signal>) {
        let signal = pick(&self.state.borrow().signals);
        if let Some(signal) = signal {
            signal(self);
        }
    }

    pub fn set_onload(&self, f: impl Fn(&XmlHttpRequest) + 'static) {
        self.state.borrow_mut().signals.load = Some(Rc::new(f));
    }

    pub fn set_onerror(&self, f: impl Fn(&XmlHttpRequest) + 'static) {
        self.state.borrow_mut().signals.error = Some(Rc::new(f));
    }

    pub fn set_onabort(&self, f: impl Fn(&XmlHttpRequest) + 'static) {
        self.state.borrow_mut().signals.abort = Some(Rc::new(f));
    }

    pub fn ready_state(&self) -> ReadyState {
        self.state.borrow().ready_state
    }

    pub fn status(&self) -> u16 {
        self.state.borrow().status
    }

    pub fn status_text(&self) -> String {
        self.state.borrow().status_text.clone()
    }

    pub fn response_text(&self) -> String {
        self.state.borrow().response_text.clone()
    }

    pub fn method(&self) -> Method {
        self.state.borrow().method
    }

    pub fn url(&self) -> String {
        self.state.borrow().url.clone()
    }

    /// Body passed to `send`
    pub fn body(&self) -> Option<Payload> {
        self.state.borrow().body.clone()
    }

    /// Whether the request ended through an error or abort
    pub fn is_error(&self) -> bool {
        self.state.borrow().error_flag
    }

    /// Request header value, case-insensitive
    pub fn request_header(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .request_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    pub fn request_headers(&self) -> Vec<(String, String)> {
        self.state.borrow().request_headers.clone()
    }

    /// Get response header
    pub fn get_response_header(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    /// Get all response headers as string
    pub fn get_all_response_headers(&self) -> String {
        self.state
            .borrow()
            .response_headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}\r\n"))
            .collect()
    }

    /// Get response as JSON
    pub fn response_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, XhrError> {
        serde_json::from_str(&self.state.borrow().response_text)
            .map_err(|e| XhrError::ParseError(e.to_string()))
    }
}

/// Check if header is forbidden
fn is_forbidden_header(name: &str) -> bool {
    matches!(name,
        "accept-charset" | "accept-encoding" | "access-control-request-headers" |
        "access-control-request-method" | "connection" | "content-length" |
        "cookie" | "cookie2" | "date" | "dnt" | "expect" | "host" |
        "keep-alive" | "origin" | "referer" | "te" | "trailer" |
        "transfer-encoding" | "upgrade" | "via"
    ) || name.starts_with("proxy-") || name.starts_with("sec-")
}

/// XHR errors
#[derive(Debug, thiserror::Error)]
pub enum XhrError {
    #[error("Invalid state")]
    InvalidState,

    #[error("Forbidden header: {0}")]
    ForbiddenHeader(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Encoding error: {0}")]
    Encode(String),
}

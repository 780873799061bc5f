//! jQuery-style ajax
//!
//! Builds one request from [`AjaxOptions`], sends it and routes the outcome
//! to exactly one of the `success` / `error` callbacks. A 2xx `load` is a
//! success; any other status, a transport error, an abort or a JSON parse
//! failure is an error. The first resolution is final.

use crate::loader::Method;
use crate::xhr::{Backend, Payload, XhrError, XmlHttpRequest};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

type BeforeSend = Box<dyn FnOnce(&XmlHttpRequest)>;
type Success = Box<dyn FnOnce(ResponseData, &str, &XmlHttpRequest)>;
type Failure = Box<dyn FnOnce(&XmlHttpRequest)>;

/// Request data
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Pre-encoded text, never processed
    Text(String),
    /// Key/value pairs, form-encoded unless processing is disabled
    Params(Map<String, Value>),
}

impl From<&str> for Data {
    fn from(text: &str) -> Self {
        Data::Text(text.to_string())
    }
}

impl From<String> for Data {
    fn from(text: String) -> Self {
        Data::Text(text)
    }
}

impl From<Map<String, Value>> for Data {
    fn from(map: Map<String, Value>) -> Self {
        Data::Params(map)
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Data::Params(map),
            Value::String(text) => Data::Text(text),
            other => Data::Text(other.to_string()),
        }
    }
}

/// What `success` receives
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Text(String),
    Json(Value),
}

impl ResponseData {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            ResponseData::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            ResponseData::Text(_) => None,
        }
    }
}

/// Ajax request options
pub struct AjaxOptions {
    url: String,
    method: String,
    data: Option<Data>,
    data_type: Option<String>,
    content_type: Option<String>,
    process_data: bool,
    headers: Vec<(String, String)>,
    before_send: Option<BeforeSend>,
    success: Option<Success>,
    error: Option<Failure>,
}

impl std::fmt::Debug for AjaxOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AjaxOptions")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("data", &self.data)
            .field("data_type", &self.data_type)
            .field("content_type", &self.content_type)
            .field("process_data", &self.process_data)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl AjaxOptions {
    /// GET request for `url`
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: "GET".to_string(),
            data: None,
            data_type: None,
            content_type: None,
            process_data: true,
            headers: Vec::new(),
            before_send: None,
            success: None,
            error: None,
        }
    }

    /// HTTP method (`type` in jQuery terms)
    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn data(mut self, data: impl Into<Data>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// `"json"` parses the response text before `success`
    pub fn data_type(mut self, data_type: &str) -> Self {
        self.data_type = Some(data_type.to_string());
        self
    }

    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// `false` sends object data unmodified
    pub fn process_data(mut self, process: bool) -> Self {
        self.process_data = process;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn before_send(mut self, f: impl FnOnce(&XmlHttpRequest) + 'static) -> Self {
        self.before_send = Some(Box::new(f));
        self
    }

    pub fn success(mut self, f: impl FnOnce(ResponseData, &str, &XmlHttpRequest) + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    pub fn error(mut self, f: impl FnOnce(&XmlHttpRequest) + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Lifecycle of one ajax call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AjaxState {
    Built,
    Sent,
    Succeeded,
    Failed,
}

impl AjaxState {
    pub fn is_resolved(self) -> bool {
        matches!(self, AjaxState::Succeeded | AjaxState::Failed)
    }
}

struct Pending {
    state: AjaxState,
    parse_json: bool,
    success: Option<Success>,
    error: Option<Failure>,
}

impl Pending {
    /// Move to a terminal state; false when already resolved
    fn resolve(&mut self, to: AjaxState) -> bool {
        if self.state.is_resolved() {
            return false;
        }
        self.state = to;
        true
    }

    fn take_success(&mut self) -> Option<Success> {
        if !self.resolve(AjaxState::Succeeded) {
            return None;
        }
        self.error = None;
        self.success.take()
    }

    fn take_error(&mut self) -> Option<Failure> {
        if !self.resolve(AjaxState::Failed) {
            return None;
        }
        self.success = None;
        self.error.take()
    }
}

fn on_load(pending: &RefCell<Pending>, xhr: &XmlHttpRequest) {
    let status = xhr.status();
    if !(200..300).contains(&status) {
        tracing::debug!(status, url = %xhr.url(), "ajax error status");
        return on_failure(pending, xhr);
    }

    let data = if pending.borrow().parse_json {
        match xhr.response_json::<Value>() {
            Ok(value) => ResponseData::Json(value),
            Err(err) => {
                tracing::warn!(%err, url = %xhr.url(), "ajax response is not valid JSON");
                return on_failure(pending, xhr);
            }
        }
    } else {
        ResponseData::Text(xhr.response_text())
    };

    let callback = pending.borrow_mut().take_success();
    if let Some(success) = callback {
        success(data, &xhr.status_text(), xhr);
    }
}

fn on_failure(pending: &RefCell<Pending>, xhr: &XmlHttpRequest) {
    let callback = pending.borrow_mut().take_error();
    if let Some(error) = callback {
        error(xhr);
    }
}

/// Stringify a parameter value the way form encoding expects
fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `key=value&...`, keys in insertion order
///
/// Spaces become `%20` rather than `+`. A literal `+` is already escaped
/// as `%2B`, so the swap cannot collide.
fn form_encode(params: &Map<String, Value>) -> Result<String, XhrError> {
    let pairs: Vec<(&str, String)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), param_value(v)))
        .collect();
    let encoded = serde_urlencoded::to_string(pairs).map_err(|e| XhrError::Encode(e.to_string()))?;
    Ok(encoded.replace('+', "%20"))
}

fn append_query(mut url: String, query: &str) -> String {
    if query.is_empty() {
        return url;
    }
    if !url.contains('?') {
        url.push('?');
    } else if !url.ends_with('?') && !url.ends_with('&') {
        url.push('&');
    }
    url.push_str(query);
    url
}

/// Final URL and body for a request
fn prepare(
    method: Method,
    url: String,
    data: Option<Data>,
    process_data: bool,
) -> Result<(String, Option<Payload>), XhrError> {
    let Some(data) = data else {
        return Ok((url, None));
    };

    if method.uses_query() {
        let query = match data {
            Data::Text(text) => text,
            Data::Params(params) if process_data => form_encode(&params)?,
            Data::Params(_) => String::new(),
        };
        return Ok((append_query(url, &query), None));
    }

    let body = match data {
        Data::Text(text) => Payload::Text(text),
        Data::Params(params) if process_data => Payload::Text(form_encode(&params)?),
        Data::Params(params) => Payload::Object(params),
    };
    Ok((url, Some(body)))
}

/// Issue a request; the handle is returned before the request resolves
pub fn ajax(options: AjaxOptions, backend: Rc<dyn Backend>) -> Result<XmlHttpRequest, XhrError> {
    let AjaxOptions {
        url,
        method,
        data,
        data_type,
        content_type,
        process_data,
        headers,
        before_send,
        success,
        error,
    } = options;

    let method = Method::parse(&method)?;
    let (url, body) = prepare(method, url, data, process_data)?;

    let xhr = XmlHttpRequest::new(backend);
    xhr.open(method.as_str(), &url)?;
    if let Some(content_type) = &content_type {
        xhr.set_request_header("Content-Type", content_type)?;
    }
    for (name, value) in &headers {
        xhr.set_request_header(name, value)?;
    }

    let pending = Rc::new(RefCell::new(Pending {
        state: AjaxState::Built,
        parse_json: data_type.is_some_and(|t| t.eq_ignore_ascii_case("json")),
        success,
        error,
    }));

    let p = Rc::clone(&pending);
    xhr.set_onload(move |xhr| on_load(&p, xhr));
    let p = Rc::clone(&pending);
    xhr.set_onerror(move |xhr| on_failure(&p, xhr));
    let p = Rc::clone(&pending);
    xhr.set_onabort(move |xhr| on_failure(&p, xhr));

    if let Some(before_send) = before_send {
        before_send(&xhr);
    }

    tracing::debug!(%method, %url, "ajax request");
    pending.borrow_mut().state = AjaxState::Sent;
    xhr.send(body)?;
    Ok(xhr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> Map<String, Value> {
        match json!({"page": 3, "arg": "section"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_form_encode_keeps_order() {
        assert_eq!(form_encode(&params()).unwrap(), "page=3&arg=section");

        let mut map = Map::new();
        map.insert("q".into(), json!("a b&c"));
        map.insert("none".into(), Value::Null);
        assert_eq!(form_encode(&map).unwrap(), "q=a%20b%26c&none=");
    }

    #[test]
    fn test_form_encode_spaces_and_plus() {
        let mut map = Map::new();
        map.insert("q".into(), json!("1 + 1"));
        assert_eq!(form_encode(&map).unwrap(), "q=1%20%2B%201");
    }

    #[test]
    fn test_append_query() {
        assert_eq!(append_query("http://x/p".into(), "a=1"), "http://x/p?a=1");
        assert_eq!(append_query("http://x/p?t=v".into(), "a=1"), "http://x/p?t=v&a=1");
        assert_eq!(append_query("http://x/p?".into(), "a=1"), "http://x/p?a=1");
        assert_eq!(append_query("http://x/p".into(), ""), "http://x/p");
    }

    #[test]
    fn test_prepare_get_ignores_unprocessed_params() {
        let (url, body) = prepare(Method::Get, "http://x/".into(), Some(Data::Params(params())), false).unwrap();
        assert_eq!(url, "http://x/");
        assert_eq!(body, None);
    }

    #[test]
    fn test_prepare_delete_form_body() {
        let (url, body) = prepare(Method::Delete, "http://x/".into(), Some(Data::Params(params())), true).unwrap();
        assert_eq!(url, "http://x/");
        assert_eq!(body, Some(Payload::Text("page=3&arg=section".into())));
    }

    #[test]
    fn test_pending_resolves_once() {
        let mut pending = Pending {
            state: AjaxState::Sent,
            parse_json: false,
            success: Some(Box::new(|_: ResponseData, _: &str, _: &XmlHttpRequest| {})),
            error: Some(Box::new(|_: &XmlHttpRequest| {})),
        };
        assert!(pending.take_success().is_some());
        assert_eq!(pending.state, AjaxState::Succeeded);
        assert!(pending.take_error().is_none());
        assert!(pending.take_success().is_none());
        assert_eq!(pending.state, AjaxState::Succeeded);
    }
}

//! Model persistence over ajax
//!
//! Maps the CRUD verbs a model layer uses onto HTTP requests.

use crate::ajax::{ajax, AjaxOptions, ResponseData};
use crate::xhr::{Backend, XhrError, XmlHttpRequest};
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;

/// Persistence operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMethod {
    Create,
    Read,
    Update,
    Patch,
    Delete,
}

impl SyncMethod {
    pub fn http_method(self) -> &'static str {
        match self {
            SyncMethod::Create => "POST",
            SyncMethod::Read => "GET",
            SyncMethod::Update => "PUT",
            SyncMethod::Patch => "PATCH",
            SyncMethod::Delete => "DELETE",
        }
    }

    /// Whether the model travels in the request body
    pub fn sends_model(self) -> bool {
        matches!(self, SyncMethod::Create | SyncMethod::Update | SyncMethod::Patch)
    }
}

type SyncSuccess = Box<dyn FnOnce(Value, &XmlHttpRequest)>;
type SyncFailure = Box<dyn FnOnce(&XmlHttpRequest)>;

/// Callbacks and extra headers for [`sync`]
#[derive(Default)]
pub struct SyncOptions {
    success: Option<SyncSuccess>,
    error: Option<SyncFailure>,
    headers: Vec<(String, String)>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(mut self, f: impl FnOnce(Value, &XmlHttpRequest) + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    pub fn error(mut self, f: impl FnOnce(&XmlHttpRequest) + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Persist or load `model` at `url`.
///
/// The response is parsed as JSON; success receives the parsed value.
pub fn sync<M: Serialize + ?Sized>(
    method: SyncMethod,
    url: &str,
    model: &M,
    backend: Rc<dyn Backend>,
    options: SyncOptions,
) -> Result<XmlHttpRequest, XhrError> {
    let SyncOptions { success, error, headers } = options;

    let mut request = AjaxOptions::new(url)
        .method(method.http_method())
        .data_type("json");
    if method.sends_model() {
        let body = serde_json::to_string(model).map_err(|e| XhrError::Encode(e.to_string()))?;
        request = request.content_type("application/json").data(body);
    }
    for (name, value) in &headers {
        request = request.header(name, value);
    }
    if let Some(success) = success {
        request = request.success(move |data: ResponseData, _: &str, xhr: &XmlHttpRequest| {
            let value = match data {
                ResponseData::Json(value) => value,
                ResponseData::Text(text) => Value::String(text),
            };
            success(value, xhr);
        });
    }
    if let Some(error) = error {
        request = request.error(error);
    }

    tracing::debug!(?method, url, "sync");
    ajax(request, backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_mapping() {
        assert_eq!(SyncMethod::Create.http_method(), "POST");
        assert_eq!(SyncMethod::Read.http_method(), "GET");
        assert_eq!(SyncMethod::Update.http_method(), "PUT");
        assert_eq!(SyncMethod::Patch.http_method(), "PATCH");
        assert_eq!(SyncMethod::Delete.http_method(), "DELETE");
        assert!(!SyncMethod::Read.sends_model());
        assert!(!SyncMethod::Delete.sends_model());
    }
}

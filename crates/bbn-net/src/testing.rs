//! In-memory backend for tests
//!
//! Records every request it is asked to start and keeps the handle, so the
//! test decides when and how each request resolves.

use crate::loader::Request;
use crate::xhr::{Backend, XmlHttpRequest};
use std::cell::RefCell;

#[derive(Default)]
pub struct RecordingBackend {
    started: RefCell<Vec<(XmlHttpRequest, Request)>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests started so far, oldest first
    pub fn requests(&self) -> Vec<Request> {
        self.started.borrow().iter().map(|(_, r)| r.clone()).collect()
    }

    /// Handle of the `index`-th started request
    pub fn handle(&self, index: usize) -> Option<XmlHttpRequest> {
        self.started.borrow().get(index).map(|(x, _)| x.clone())
    }

    /// Most recent request and its handle
    pub fn last(&self) -> Option<(XmlHttpRequest, Request)> {
        self.started.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.started.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.started.borrow().is_empty()
    }
}

impl Backend for RecordingBackend {
    fn start(&self, xhr: &XmlHttpRequest, request: Request) {
        tracing::trace!(method = %request.method, url = %request.url, "request recorded");
        self.started.borrow_mut().push((xhr.clone(), request));
    }
}

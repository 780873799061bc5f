//! View event declarations
//!
//! A view declares `"type[.ns] [selector]"` → handler pairs. Delegating
//! binds each pair on the view element under the view's own namespace,
//! so undelegating removes that view's bindings and nothing else.

use crate::{Collection, Handler, Native, NativeResult};

/// Event declarations of one view instance
#[derive(Debug, Clone)]
pub struct ViewEvents {
    cid: String,
    declarations: Vec<(String, Handler)>,
}

impl ViewEvents {
    /// Declarations for the view with client id `cid` (e.g. `"view3"`)
    pub fn new(cid: &str) -> Self {
        Self {
            cid: cid.to_string(),
            declarations: Vec::new(),
        }
    }

    /// Declare `handler` for `key` (`"click .open"`, `"keyup.search input"`)
    pub fn event(mut self, key: &str, handler: Handler) -> Self {
        self.declarations.push((key.to_string(), handler));
        self
    }

    pub fn cid(&self) -> &str {
        &self.cid
    }

    fn namespace(&self) -> String {
        format!(".delegateEvents{}", self.cid)
    }

    /// Bind every declaration on `el`, replacing earlier bindings of this view.
    ///
    /// Each handler is rebound per view, so two views sharing a handler can
    /// be undelegated independently.
    pub fn delegate_events(&self, el: &Collection) -> NativeResult<()> {
        self.undelegate_events(el);
        let namespace = self.namespace();
        for (key, handler) in &self.declarations {
            let key = key.trim();
            let (event_name, selector) = match key.split_once(char::is_whitespace) {
                Some((name, rest)) => (name, rest.trim()),
                None => (key, ""),
            };
            let events = format!("{event_name}{namespace}");
            let bound = handler.rebind();
            if selector.is_empty() {
                el.bind(&events, &bound)?;
            } else {
                el.delegate(selector, &events, &bound)?;
            }
        }
        tracing::debug!(cid = %self.cid, count = self.declarations.len(), "view events delegated");
        Ok(())
    }

    /// Remove every binding this view made on `el`
    pub fn undelegate_events(&self, el: &Collection) {
        el.off(Some(&self.namespace()), None, None);
    }
}

/// How to build a view element that does not exist yet
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag_name: String,
    id: Option<String>,
    class_name: Option<String>,
    attributes: Vec<(String, String)>,
}

impl Default for ElementSpec {
    fn default() -> Self {
        Self::new("div")
    }
}

impl ElementSpec {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            id: None,
            class_name: None,
            attributes: Vec::new(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class_name(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    /// Extra attribute; `html` and `text` set content as with `attr`
    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Create the detached element and apply the attributes
    pub fn build(&self, native: &Native) -> NativeResult<Collection> {
        let el = native.select(format!("<{}>", self.tag_name))?;
        let mut attrs = self.attributes.clone();
        if let Some(id) = &self.id {
            attrs.push(("id".to_string(), id.clone()));
        }
        if let Some(class_name) = &self.class_name {
            attrs.push(("class".to_string(), class_name.clone()));
        }
        el.attr(attrs)?;
        Ok(el)
    }
}

//! Event strings
//!
//! `"click.a.b mouseup"` is a list of specs; each names an optional raw
//! type followed by any number of namespaces.

/// One `type.ns1.ns2` entry of an event string
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EventSpec {
    /// Raw event type; `None` for a namespace-only spec such as `.ns`
    pub event_type: Option<String>,
    pub namespaces: Vec<String>,
}

impl EventSpec {
    fn parse(token: &str) -> Self {
        let mut parts = token.split('.');
        let event_type = parts
            .next()
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let mut namespaces: Vec<String> = parts
            .filter(|ns| !ns.is_empty())
            .map(str::to_string)
            .collect();
        namespaces.sort();
        namespaces.dedup();
        Self {
            event_type,
            namespaces,
        }
    }

    /// Whether a registration tagged with `tags` carries every namespace of this spec
    pub fn namespaces_match(&self, tags: &[String]) -> bool {
        self.namespaces.iter().all(|ns| tags.contains(ns))
    }
}

/// Split an event string into its specs
pub(crate) fn parse_events(events: &str) -> Vec<EventSpec> {
    events.split_whitespace().map(EventSpec::parse).collect()
}

//! Façade configuration

use bbn_net::ClientConfig;

/// Native configuration
#[derive(Debug, Clone)]
pub struct NativeConfig {
    /// Short global slot (`$`)
    pub global_name: String,
    /// Framework-owned slot (`Backbone.Native`)
    pub framework_name: String,
    /// URL of the document a fresh window starts with
    pub url: String,
    /// HTTP backend settings
    pub client: ClientConfig,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            global_name: "$".into(),
            framework_name: "Backbone.Native".into(),
            url: "about:blank".into(),
            client: ClientConfig::default(),
        }
    }
}

impl NativeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_name(mut self, name: &str) -> Self {
        self.global_name = name.to_string();
        self
    }

    pub fn framework_name(mut self, name: &str) -> Self {
        self.framework_name = name.to_string();
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }
}

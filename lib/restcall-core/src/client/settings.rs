//! The global layer: process-wide defaults read once from a configuration source.

use indexmap::IndexMap;
use tracing::{trace, warn};

use super::HttpMethod;
use super::config::{ConfigError, ConfigSource};

/// Namespace of the configuration keys.
pub const DEFAULT_PREFIX: &str = "restcall.";

/// Process-wide defaults applied first on every call.
///
/// Read from a [`ConfigSource`], all keys living under a namespace prefix
/// (`restcall.` by default):
///
/// | key                                           | value                            |
/// |-----------------------------------------------|----------------------------------|
/// | `host`, `protocol`, `port`                    | URL parts                        |
/// | `basePath`, `resourcePath`, `fragment`        | URL parts                        |
/// | `actionName`                                  | action name                      |
/// | `defaultValidation.enabled`                   | `true` (default) or `false`      |
/// | `http.method`                                 | HTTP method name                 |
/// | `queryParams`, `queryParam.<name>`            | query parameters                 |
/// | `http.headers`, `http.header.<name>`          | HTTP headers                     |
/// | `placeholders`, `placeholder.<name>`          | placeholders                     |
/// | `preprocess.class`                            | name of a registered hook        |
/// | `preprocess.reuseInstance`                    | `true` or `false` (default)      |
///
/// Multi-valued settings are either a comma separated list of `key:value` pairs or
/// individual `<name>` keys. Individual keys are applied last, they win on collision.
///
/// ```rust
/// use restcall_core::{GlobalSettings, HttpMethod, Properties};
///
/// let properties = Properties::parse(
///     "
///     restcall.host = api.example.com
///     restcall.http.method = post
///     restcall.http.headers = Accept:text/plain, X-Trace:on
///     restcall.http.header.Accept = application/json
///     ",
/// );
///
/// let settings = GlobalSettings::from_source(&properties)?;
///
/// assert_eq!(settings.host(), Some("api.example.com"));
/// assert_eq!(settings.http_method(), Some(HttpMethod::Post));
/// assert_eq!(settings.http_headers()["Accept"], "application/json");
/// assert_eq!(settings.http_headers()["X-Trace"], "on");
/// # Ok::<(), restcall_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    host: Option<String>,
    protocol: Option<String>,
    port: Option<u16>,
    base_path: Option<String>,
    resource_path: Option<String>,
    fragment: Option<String>,
    action_name: Option<String>,
    default_validation_enabled: bool,
    http_method: Option<HttpMethod>,
    query_params: IndexMap<String, String>,
    http_headers: IndexMap<String, String>,
    placeholders: IndexMap<String, String>,
    preprocess_hook: Option<String>,
    preprocess_reuse_instance: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            host: None,
            protocol: None,
            port: None,
            base_path: None,
            resource_path: None,
            fragment: None,
            action_name: None,
            default_validation_enabled: true,
            http_method: None,
            query_params: IndexMap::new(),
            http_headers: IndexMap::new(),
            placeholders: IndexMap::new(),
            preprocess_hook: None,
            preprocess_reuse_instance: false,
        }
    }
}

// Read
impl GlobalSettings {
    /// Reads the settings under the `restcall.` namespace.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a typed value (port, boolean) cannot be parsed.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        Self::from_source_with_prefix(source, DEFAULT_PREFIX)
    }

    /// Reads the settings under a custom namespace.
    ///
    /// The prefix is used as is, it should end with a `.`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a typed value (port, boolean) cannot be parsed.
    pub fn from_source_with_prefix(
        source: &dyn ConfigSource,
        prefix: &str,
    ) -> Result<Self, ConfigError> {
        let reader = Reader { source, prefix };
        let mut result = Self {
            host: reader.string("host"),
            protocol: reader.string("protocol"),
            port: reader.source.get_u16(&reader.key("port"))?,
            base_path: reader.string("basePath"),
            resource_path: reader.string("resourcePath"),
            fragment: reader.string("fragment"),
            action_name: reader.string("actionName"),
            query_params: reader.map("queryParams", "queryParam."),
            http_headers: reader.map("http.headers", "http.header."),
            placeholders: reader.map("placeholders", "placeholder."),
            preprocess_hook: reader.string("preprocess.class"),
            ..Self::default()
        };

        if let Some(enabled) = reader.source.get_bool(&reader.key("defaultValidation.enabled"))? {
            result.default_validation_enabled = enabled;
        }
        if let Some(reuse) = reader.source.get_bool(&reader.key("preprocess.reuseInstance"))? {
            result.preprocess_reuse_instance = reuse;
        }
        if let Some(method) = reader.string("http.method") {
            match method.parse::<HttpMethod>() {
                Ok(method) => result.http_method = Some(method),
                Err(error) => warn!(%error, "ignoring the configured HTTP method"),
            }
        }

        trace!(
            host = ?result.host,
            method = ?result.http_method,
            headers = ?result.http_headers.keys().collect::<Vec<_>>(),
            "global settings loaded"
        );
        Ok(result)
    }
}

struct Reader<'a> {
    source: &'a dyn ConfigSource,
    prefix: &'a str,
}

impl Reader<'_> {
    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    fn string(&self, name: &str) -> Option<String> {
        self.source
            .get(&self.key(name))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn map(&self, list_name: &str, entry_prefix: &str) -> IndexMap<String, String> {
        let mut result = self
            .string(list_name)
            .map(|list| parse_pairs(&list))
            .unwrap_or_default();
        for (name, value) in self.source.entries_with_prefix(&self.key(entry_prefix)) {
            result.insert(name, value.trim().to_string());
        }
        result
    }
}

/// Parses a `key:value,key:value` list.
///
/// Pairs are trimmed, a pair without exactly one `:` or with an empty side is skipped.
pub fn parse_pairs(list: &str) -> IndexMap<String, String> {
    let mut result = IndexMap::new();
    for pair in list.split(',').map(str::trim).filter(|it| !it.is_empty()) {
        let parts = pair.split(':').map(str::trim).collect::<Vec<_>>();
        match parts.as_slice() {
            [key, value] if !key.is_empty() && !value.is_empty() => {
                result.insert((*key).to_string(), (*value).to_string());
            }
            _ => trace!(pair, "skipping invalid key:value pair"),
        }
    }
    result
}

// Build
impl GlobalSettings {
    /// Sets the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Sets the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the base path.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Sets the resource path.
    #[must_use]
    pub fn with_resource_path(mut self, resource_path: impl Into<String>) -> Self {
        self.resource_path = Some(resource_path.into());
        self
    }

    /// Sets the fragment.
    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Sets the action name.
    #[must_use]
    pub fn with_action_name(mut self, action_name: impl Into<String>) -> Self {
        self.action_name = Some(action_name.into());
        self
    }

    /// Sets the default validation flag.
    #[must_use]
    pub fn with_default_validation_enabled(mut self, enabled: bool) -> Self {
        self.default_validation_enabled = enabled;
        self
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Adds an HTTP header.
    #[must_use]
    pub fn with_http_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }

    /// Adds a placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.placeholders.insert(name.into(), value.into());
        self
    }

    /// Configures the hook resolved from the client hook registry.
    #[must_use]
    pub fn with_preprocess_hook(mut self, name: impl Into<String>, reuse_instance: bool) -> Self {
        self.preprocess_hook = Some(name.into());
        self.preprocess_reuse_instance = reuse_instance;
        self
    }
}

// Getters
impl GlobalSettings {
    /// The host.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The protocol.
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    /// The port.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The base path.
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// The resource path.
    pub fn resource_path(&self) -> Option<&str> {
        self.resource_path.as_deref()
    }

    /// The fragment.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The action name.
    pub fn action_name(&self) -> Option<&str> {
        self.action_name.as_deref()
    }

    /// Whether validators run by default.
    pub fn default_validation_enabled(&self) -> bool {
        self.default_validation_enabled
    }

    /// The HTTP method.
    pub fn http_method(&self) -> Option<HttpMethod> {
        self.http_method
    }

    /// The query parameters.
    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query_params
    }

    /// The HTTP headers.
    pub fn http_headers(&self) -> &IndexMap<String, String> {
        &self.http_headers
    }

    /// The placeholders.
    pub fn placeholders(&self) -> &IndexMap<String, String> {
        &self.placeholders
    }

    /// Name of the configured preprocess hook and its reuse flag.
    pub fn preprocess_hook(&self) -> Option<(&str, bool)> {
        self.preprocess_hook
            .as_deref()
            .map(|name| (name, self.preprocess_reuse_instance))
    }
}

use std::fmt::Write;

use indexmap::IndexMap;
use tracing::trace;

use super::auth::Credentials;

/// Protocol used when none has been configured.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Separators that are collapsed when they appear several times in a row.
const COLLAPSED_SEPARATORS: [char; 3] = ['/', '?', '#'];

/// Structured representation of a REST call URL.
///
/// ```text
/// protocol://[user[:password]@]host[:port][/basePath][/resourcePath][?k=v&...][#fragment]
/// ```
///
/// A `CallUrl` is filled either field by field, or by [`split`](Self::split)ting a raw
/// URL, and turned back into text with [`compose`](Self::compose). Both operations are
/// inverse of each other modulo separator normalization.
///
/// ```rust
/// use restcall_core::CallUrl;
///
/// let url = "https://my.url.test.com:8080/base/path/resource?param1=foo&param2=bar#fragment";
/// let model = CallUrl::parse(url);
///
/// assert_eq!(model.host(), "my.url.test.com");
/// assert_eq!(model.base_path(), "base/path");
/// assert_eq!(model.resource_path(), "resource");
/// assert_eq!(model.compose().as_deref(), Some(url));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallUrl {
    /// `None` means the implicit default, which is never serialized.
    protocol: Option<String>,
    host: String,
    port: Option<u16>,
    base_path: String,
    resource_path: String,
    query_params: IndexMap<String, String>,
    fragment: String,
    credentials: Option<Credentials>,
}

// Parse
impl CallUrl {
    /// Creates a model from a raw URL, see [`split`](Self::split).
    pub fn parse(raw: &str) -> Self {
        let mut result = Self::default();
        result.split(raw);
        result
    }

    /// Splits a raw URL and stores its parts into this model.
    ///
    /// Only the parts present in `raw` are written, the other fields keep their value.
    /// An empty input does nothing.
    ///
    /// Normalization applied on the way:
    /// - repeated `/`, `?` and `#` are collapsed
    /// - only the first fragment is kept (`a#b#c` has fragment `b`)
    /// - query pairs without `=` or with an empty key are dropped
    /// - a non numeric (or out of range) port is ignored, the host is kept
    pub fn split(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }

        let mut rest = raw;
        if let Some((protocol, remainder)) = raw.split_once("://") {
            self.protocol = Some(protocol.to_string());
            rest = remainder;
        }
        if rest.is_empty() {
            return;
        }

        let normalized = normalize_separators(rest);
        let mut rest = normalized.as_str();

        if let Some((head, fragment)) = rest.split_once('#') {
            let fragment = fragment.split_once('#').map_or(fragment, |(first, _)| first);
            if !fragment.is_empty() {
                self.fragment = fragment.to_string();
            }
            rest = head;
        }
        if rest.is_empty() {
            return;
        }

        if let Some((head, query)) = rest.split_once('?') {
            self.split_query(query);
            rest = head;
        }
        if rest.is_empty() {
            return;
        }

        let (host_and_port, path) = rest.split_once('/').unwrap_or((rest, ""));
        self.split_host_and_port(host_and_port);
        if path.is_empty() {
            return;
        }

        let (base_path, resource_path) = path.rsplit_once('/').unwrap_or(("", path));
        if !resource_path.is_empty() {
            self.resource_path = resource_path.to_string();
        }
        let base_path = base_path.trim_matches('/');
        if !base_path.is_empty() {
            self.base_path = base_path.to_string();
        }
    }

    fn split_query(&mut self, query: &str) {
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    self.query_params.insert(key.to_string(), value.to_string());
                }
                _ if pair.is_empty() => {}
                _ => trace!(?pair, "dropping invalid query pair"),
            }
        }
    }

    fn split_host_and_port(&mut self, host_and_port: &str) {
        let Some((host, port)) = host_and_port.split_once(':') else {
            if !host_and_port.is_empty() {
                self.host = host_and_port.to_string();
            }
            return;
        };

        if !host.is_empty() {
            self.host = host.to_string();
        }

        let is_numeric = !port.is_empty() && port.bytes().all(|it| it.is_ascii_digit());
        match port.parse::<u16>() {
            Ok(port) if is_numeric && port > 0 => self.port = Some(port),
            _ => trace!(?port, "ignoring invalid port"),
        }
    }
}

// Compose
impl CallUrl {
    /// Composes the URL text.
    ///
    /// Returns `None` when no host is configured, a URL without host does not make
    /// any sense. The protocol is only emitted when it was configured, and the port is
    /// omitted when it is the default port of the protocol (`http:80`, `https:443`).
    ///
    /// Placeholders are not substituted here, see
    /// [`RestCall::url`](crate::RestCall::url).
    pub fn compose(&self) -> Option<String> {
        if self.host.is_empty() {
            return None;
        }

        let mut result = String::new();
        if let Some(protocol) = self.protocol.as_deref().filter(|it| !it.is_empty()) {
            result.push_str(protocol);
            result.push_str("://");
        }
        if let Some(credentials) = &self.credentials {
            result.push_str(&credentials.to_userinfo());
            result.push('@');
        }
        result.push_str(&self.host);
        if let Some(port) = self.port.filter(|port| !self.is_default_port(*port)) {
            let _ = write!(result, ":{port}");
        }
        if !self.base_path.is_empty() {
            result.push('/');
            result.push_str(&self.base_path);
        }
        if !self.resource_path.is_empty() {
            result.push('/');
            result.push_str(&self.resource_path);
        }
        if !self.query_params.is_empty() {
            result.push('?');
            for (index, (key, value)) in self.query_params.iter().enumerate() {
                if index > 0 {
                    result.push('&');
                }
                let _ = write!(result, "{key}={value}");
            }
        }
        if !self.fragment.is_empty() {
            result.push('#');
            result.push_str(&self.fragment);
        }

        Some(result)
    }

    fn is_default_port(&self, port: u16) -> bool {
        let protocol = self.protocol();
        (port == 80 && protocol.eq_ignore_ascii_case("http"))
            || (port == 443 && protocol.eq_ignore_ascii_case("https"))
    }
}

// Getters
impl CallUrl {
    /// The protocol, the implicit default being `http`.
    pub fn protocol(&self) -> &str {
        self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL)
    }

    /// The host name, empty when unset.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port, `None` when unset.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The base path, without leading or trailing `/`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The resource path, without leading or trailing `/`.
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// A single query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// All query parameters, in insertion order.
    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query_params
    }

    /// The fragment, without the leading `#`.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The credentials carried into the URL.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

// Setters, an empty argument leaves the field untouched
impl CallUrl {
    /// Sets the protocol, separator characters (`:` and `/`) are removed.
    pub fn set_protocol(&mut self, protocol: &str) {
        let protocol = protocol.replace([':', '/'], "");
        if !protocol.is_empty() {
            self.protocol = Some(protocol);
        }
    }

    /// Sets the port, `0` is ignored.
    pub fn set_port(&mut self, port: u16) {
        if port > 0 {
            self.port = Some(port);
        }
    }

    /// Sets the host name.
    pub fn set_host(&mut self, host: &str) {
        if !host.is_empty() {
            self.host = host.to_string();
        }
    }

    /// Sets the base path, see [`sanitize_path_segment`].
    pub fn set_base_path(&mut self, base_path: &str) {
        let base_path = sanitize_path_segment(base_path);
        if !base_path.is_empty() {
            self.base_path = base_path;
        }
    }

    /// Sets the resource path, see [`sanitize_path_segment`].
    pub fn set_resource_path(&mut self, resource_path: &str) {
        let resource_path = sanitize_path_segment(resource_path);
        if !resource_path.is_empty() {
            self.resource_path = resource_path;
        }
    }

    /// Sets the fragment, a leading `#` is removed.
    pub fn set_fragment(&mut self, fragment: &str) {
        let fragment = fragment.trim_start_matches('#');
        if !fragment.is_empty() {
            self.fragment = fragment.to_string();
        }
    }

    /// Adds or replaces a query parameter. Parameters with an empty name are ignored.
    pub fn add_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.query_params.insert(name, value.into());
        }
    }

    /// Removes a query parameter.
    pub fn remove_query_param(&mut self, name: &str) {
        self.query_params.shift_remove(name);
    }

    /// Removes all query parameters.
    pub fn remove_all_query_params(&mut self) {
        self.query_params.clear();
    }

    /// Removes the fragment.
    pub fn remove_fragment(&mut self) {
        self.fragment.clear();
    }

    /// Sets the credentials carried as URL user info.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Removes the credentials.
    pub fn remove_credentials(&mut self) {
        self.credentials = None;
    }
}

/// Collapses repeated `/`, `?` and `#` into a single occurrence.
///
/// The operation is idempotent.
pub fn normalize_separators(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous = None;
    for current in value.chars() {
        if previous == Some(current) && COLLAPSED_SEPARATORS.contains(&current) {
            continue;
        }
        result.push(current);
        previous = Some(current);
    }
    result
}

/// Collapses repeated `/` and removes a leading and a trailing `/`.
pub fn sanitize_path_segment(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous = None;
    for current in value.chars() {
        if current == '/' && previous == Some('/') {
            continue;
        }
        result.push(current);
        previous = Some(current);
    }

    let trimmed = result.strip_prefix('/').unwrap_or(&result);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.to_string()
}

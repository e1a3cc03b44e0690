use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use super::RestCall;
use crate::client::auth::Credentials;
use crate::client::descriptor::{DescriptorId, DescriptorReader, ResourceDescriptor};
use crate::client::executor::HttpExecutor;
use crate::client::preprocess::{AssignedHook, HookRegistry, PreprocessHook};
use crate::client::settings::GlobalSettings;
use crate::client::url::CallUrl;
use crate::client::validation::ValidationDispatcher;
use crate::client::HttpMethod;

/// `If-Match` request header.
const IF_MATCH: &str = "If-Match";

/// `If-None-Match` request header.
const IF_NONE_MATCH: &str = "If-None-Match";

impl RestCall {
    /// Creates a call with the global layer applied.
    pub(in crate::client) fn build(
        settings: Arc<GlobalSettings>,
        executor: Arc<dyn HttpExecutor>,
        hooks: Arc<HookRegistry>,
    ) -> Self {
        let validation = ValidationDispatcher::new(settings.default_validation_enabled());
        let mut result = Self {
            settings,
            executor,
            hooks,
            action_name: String::new(),
            url: CallUrl::default(),
            http_method: None,
            http_headers: IndexMap::new(),
            placeholders: IndexMap::new(),
            request_body: None,
            validation,
            assigned_hook: None,
            declared_hook: None,
            response: None,
        };
        result.apply_settings();
        result
    }

    fn apply_settings(&mut self) {
        let settings = Arc::clone(&self.settings);
        trace!("applying global settings");

        if let Some(protocol) = settings.protocol() {
            self.url.set_protocol(protocol);
        }
        if let Some(host) = settings.host() {
            self.url.set_host(host);
        }
        if let Some(port) = settings.port() {
            self.url.set_port(port);
        }
        if let Some(base_path) = settings.base_path() {
            self.url.set_base_path(base_path);
        }
        if let Some(resource_path) = settings.resource_path() {
            self.url.set_resource_path(resource_path);
        }
        if let Some(fragment) = settings.fragment() {
            self.url.set_fragment(fragment);
        }
        if let Some(action_name) = settings.action_name() {
            self.set_action_name(action_name);
        }
        if let Some(method) = settings.http_method() {
            self.http_method = Some(method);
        }
        self.add_all_query_params(settings.query_params().clone());
        self.add_all_http_headers(settings.http_headers().clone());
        self.add_all_placeholders(settings.placeholders().clone());
    }
}

// Descriptors
impl RestCall {
    /// Applies a resource descriptor.
    ///
    /// The descriptor URL (if any) is split first, then each URL part set on the
    /// descriptor overrides the call. Query parameters, headers and placeholders are
    /// merged, the descriptor wins on collision. The validator of the descriptor is
    /// registered once, whatever the number of applications.
    ///
    /// ```rust
    /// use restcall_core::testing::MockExecutor;
    /// use restcall_core::{ResourceDescriptor, RestClient};
    ///
    /// # fn main() -> Result<(), restcall_core::RestCallError> {
    /// let client = RestClient::builder().with_executor(MockExecutor::default()).build()?;
    /// let json = ResourceDescriptor::new("json").with_http_header("Accept", "application/json");
    /// let text = ResourceDescriptor::new("text").with_http_header("Accept", "text/plain");
    ///
    /// let mut call = client.call_url("api.example.com/notes");
    /// call.apply_descriptor(&json).apply_descriptor(&text);
    ///
    /// assert_eq!(call.http_header("Accept"), Some("text/plain"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn apply_descriptor(&mut self, descriptor: &ResourceDescriptor) -> &mut Self {
        self.apply_descriptor_values(descriptor);
        self.validation.register(descriptor);
        self
    }

    /// Applies a resource descriptor, explicitly enabling or disabling its validator.
    ///
    /// The explicit choice wins over both the descriptor marker and the global flag.
    pub fn apply_descriptor_with_validation(
        &mut self,
        descriptor: &ResourceDescriptor,
        validation_enabled: bool,
    ) -> &mut Self {
        self.apply_descriptor_values(descriptor);
        self.validation.register_with(descriptor, validation_enabled);
        self
    }

    /// Applies the descriptor yielded by a reader.
    pub fn apply<R>(&mut self, reader: &R) -> &mut Self
    where
        R: DescriptorReader + ?Sized,
    {
        let descriptor = reader.descriptor();
        self.apply_descriptor(&descriptor)
    }

    fn apply_descriptor_values(&mut self, descriptor: &ResourceDescriptor) {
        trace!(descriptor = %descriptor.id(), "applying descriptor");

        if let Some(action_name) = descriptor.action_name() {
            self.set_action_name(action_name);
        }
        if let Some(base_url) = descriptor.base_url() {
            self.url.split(base_url);
        }
        if let Some(protocol) = descriptor.protocol() {
            self.url.set_protocol(protocol);
        }
        if let Some(port) = descriptor.port() {
            self.url.set_port(port);
        }
        if let Some(base_path) = descriptor.base_path() {
            self.url.set_base_path(base_path);
        }
        if let Some(resource_path) = descriptor.resource_path() {
            self.url.set_resource_path(resource_path);
        }
        if let Some(fragment) = descriptor.fragment() {
            self.url.set_fragment(fragment);
        }
        if let Some(method) = descriptor.http_method() {
            self.http_method = Some(method);
        }
        self.add_all_query_params(descriptor.query_params().clone());
        self.add_all_http_headers(descriptor.http_headers().clone());
        self.add_all_placeholders(descriptor.placeholders().clone());
        if let Some(declaration) = descriptor.preprocess() {
            self.declared_hook = Some(declaration.clone());
        }
    }
}

// Validation
impl RestCall {
    /// Enables or disables validation for every descriptor without explicit choice.
    pub fn set_default_validation_enabled(&mut self, enabled: bool) -> &mut Self {
        self.validation.set_enabled(enabled);
        self
    }

    /// Explicitly enables or disables the validator of a descriptor.
    ///
    /// The validator is registered if the descriptor was not applied yet, the other
    /// values of the descriptor are not applied.
    pub fn set_validation_enabled_for(
        &mut self,
        descriptor: &ResourceDescriptor,
        enabled: bool,
    ) -> &mut Self {
        self.validation.register_with(descriptor, enabled);
        self
    }

    /// Removes the validator registered by a descriptor.
    ///
    /// Returns `false` if the descriptor did not register any validator.
    pub fn remove_validator(&mut self, descriptor: &DescriptorId) -> bool {
        self.validation.remove(descriptor)
    }
}

// Preprocess hook
impl RestCall {
    /// Assigns the preprocess hook, taking precedence over every other source.
    ///
    /// With `reuse_instance`, the hook is also retained by the execution context and
    /// used by the later calls of the context that do not declare their own hook.
    pub fn set_preprocess_hook(
        &mut self,
        hook: impl PreprocessHook + 'static,
        reuse_instance: bool,
    ) -> &mut Self {
        self.set_shared_preprocess_hook(Arc::new(hook), reuse_instance)
    }

    /// Same as [`set_preprocess_hook`](Self::set_preprocess_hook) with a shared hook.
    pub fn set_shared_preprocess_hook(
        &mut self,
        hook: Arc<dyn PreprocessHook>,
        reuse_instance: bool,
    ) -> &mut Self {
        self.assigned_hook = Some(AssignedHook {
            hook,
            reuse_instance,
        });
        self
    }

    /// Removes the assigned hook and the hook declared by descriptors.
    pub fn remove_preprocess_hook(&mut self) -> &mut Self {
        self.assigned_hook = None;
        self.declared_hook = None;
        self
    }
}

// URL
impl RestCall {
    /// Sets the action name used in logs and call records.
    pub fn set_action_name(&mut self, action_name: &str) -> &mut Self {
        if !action_name.is_empty() {
            self.action_name = action_name.to_string();
        }
        self
    }

    /// Splits a raw URL into the call, see [`CallUrl::split`].
    pub fn set_url(&mut self, url: &str) -> &mut Self {
        self.url.split(url);
        self
    }

    /// Sets the protocol, `:` and `/` characters are removed.
    pub fn set_protocol(&mut self, protocol: &str) -> &mut Self {
        self.url.set_protocol(protocol);
        self
    }

    /// Sets the host.
    pub fn set_host(&mut self, host: &str) -> &mut Self {
        self.url.set_host(host);
        self
    }

    /// Sets the port, `0` is ignored.
    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.url.set_port(port);
        self
    }

    /// Sets the base path, repeated and surrounding `/` are removed.
    pub fn set_base_path(&mut self, base_path: &str) -> &mut Self {
        self.url.set_base_path(base_path);
        self
    }

    /// Sets the resource path, repeated and surrounding `/` are removed.
    pub fn set_resource_path(&mut self, resource_path: &str) -> &mut Self {
        self.url.set_resource_path(resource_path);
        self
    }

    /// Sets the fragment.
    pub fn set_fragment(&mut self, fragment: &str) -> &mut Self {
        self.url.set_fragment(fragment);
        self
    }

    /// Removes the fragment.
    pub fn remove_fragment(&mut self) -> &mut Self {
        self.url.remove_fragment();
        self
    }

    /// Adds or replaces a query parameter.
    pub fn add_query_param(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.url.add_query_param(name, value);
        self
    }

    /// Adds or replaces several query parameters.
    pub fn add_all_query_params<K, V>(
        &mut self,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.url.add_query_param(name, value);
        }
        self
    }

    /// Removes a query parameter.
    pub fn remove_query_param(&mut self, name: &str) -> &mut Self {
        self.url.remove_query_param(name);
        self
    }

    /// Removes several query parameters.
    pub fn remove_query_params<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> &mut Self {
        for name in names {
            self.url.remove_query_param(name);
        }
        self
    }

    /// Removes every query parameter.
    pub fn remove_all_query_params(&mut self) -> &mut Self {
        self.url.remove_all_query_params();
        self
    }

    /// Sets the credentials carried as URL user info.
    ///
    /// Credentials are validated when created, see [`Credentials::new`].
    pub fn set_credentials(&mut self, credentials: Credentials) -> &mut Self {
        self.url.set_credentials(credentials);
        self
    }

    /// Removes the credentials.
    pub fn remove_credentials(&mut self) -> &mut Self {
        self.url.remove_credentials();
        self
    }
}

// Request
impl RestCall {
    /// Sets the HTTP method.
    pub fn set_http_method(&mut self, method: HttpMethod) -> &mut Self {
        self.http_method = Some(method);
        self
    }

    /// Sets the request body, an empty body is ignored.
    ///
    /// Placeholders in the body are substituted when it is read.
    pub fn set_request_body(&mut self, body: impl Into<String>) -> &mut Self {
        let body = body.into();
        if !body.is_empty() {
            self.request_body = Some(body);
        }
        self
    }

    /// Removes the request body.
    pub fn remove_request_body(&mut self) -> &mut Self {
        self.request_body = None;
        self
    }

    /// Adds or replaces an HTTP header. Headers with an empty name are ignored.
    pub fn add_http_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        insert_named(&mut self.http_headers, name.into(), value.into());
        self
    }

    /// Adds or replaces several HTTP headers.
    pub fn add_all_http_headers<K, V>(
        &mut self,
        headers: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            insert_named(&mut self.http_headers, name.into(), value.into());
        }
        self
    }

    /// Removes an HTTP header.
    pub fn remove_http_header(&mut self, name: &str) -> &mut Self {
        self.http_headers.shift_remove(name);
        self
    }

    /// Removes several HTTP headers.
    pub fn remove_http_headers<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> &mut Self {
        for name in names {
            self.http_headers.shift_remove(name);
        }
        self
    }

    /// Removes every HTTP header.
    pub fn remove_all_http_headers(&mut self) -> &mut Self {
        self.http_headers.clear();
        self
    }

    /// Sets the `If-Match` header, an empty entity tag is ignored.
    pub fn set_if_match_header(&mut self, etag: &str) -> &mut Self {
        if !etag.is_empty() {
            self.add_http_header(IF_MATCH, etag);
        }
        self
    }

    /// Sets the `If-None-Match` header, an empty entity tag is ignored.
    pub fn set_if_none_match_header(&mut self, etag: &str) -> &mut Self {
        if !etag.is_empty() {
            self.add_http_header(IF_NONE_MATCH, etag);
        }
        self
    }

    /// Adds or replaces a placeholder. Placeholders with an empty name are ignored.
    pub fn add_placeholder(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        insert_named(&mut self.placeholders, name.into(), value.into());
        self
    }

    /// Adds or replaces several placeholders.
    pub fn add_all_placeholders<K, V>(
        &mut self,
        placeholders: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in placeholders {
            insert_named(&mut self.placeholders, name.into(), value.into());
        }
        self
    }

    /// Removes a placeholder.
    pub fn remove_placeholder(&mut self, name: &str) -> &mut Self {
        self.placeholders.shift_remove(name);
        self
    }

    /// Removes several placeholders.
    pub fn remove_placeholders<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> &mut Self {
        for name in names {
            self.placeholders.shift_remove(name);
        }
        self
    }

    /// Removes every placeholder.
    pub fn remove_all_placeholders(&mut self) -> &mut Self {
        self.placeholders.clear();
        self
    }
}

fn insert_named(map: &mut IndexMap<String, String>, name: String, value: String) {
    if name.is_empty() {
        trace!("ignoring entry without name");
        return;
    }
    map.insert(name, value);
}

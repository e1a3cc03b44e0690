use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::HttpMethod;
use super::preprocess::HookDeclaration;
use super::validation::Validator;

/// Identity of a resource descriptor.
///
/// Validators are registered, enabled, disabled and removed by descriptor identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct DescriptorId(String);

impl DescriptorId {
    /// The descriptor name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DescriptorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DescriptorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Declarative default values for one REST resource.
///
/// Descriptors are applied on a call after the global settings and before the explicit
/// setters. Only the values set on the descriptor override the call, and for the maps
/// (query parameters, headers, placeholders) entries are merged key by key.
///
/// ```rust
/// use restcall_core::{HttpMethod, ResourceDescriptor};
///
/// let posts = ResourceDescriptor::new("posts")
///     .with_base_url("https://jsonplaceholder.typicode.com")
///     .with_resource_path("posts/${id}")
///     .with_http_method(HttpMethod::Get)
///     .with_http_header("Accept", "application/json");
///
/// assert_eq!(posts.id().as_str(), "posts");
/// assert_eq!(posts.http_method(), Some(HttpMethod::Get));
/// ```
#[derive(Clone)]
pub struct ResourceDescriptor {
    id: DescriptorId,
    action_name: Option<String>,
    base_url: Option<String>,
    protocol: Option<String>,
    port: Option<u16>,
    base_path: Option<String>,
    resource_path: Option<String>,
    query_params: IndexMap<String, String>,
    fragment: Option<String>,
    http_method: Option<HttpMethod>,
    http_headers: IndexMap<String, String>,
    placeholders: IndexMap<String, String>,
    disable_default_validation: bool,
    validator: Option<Arc<dyn Validator>>,
    preprocess: Option<HookDeclaration>,
}

// Create
impl ResourceDescriptor {
    /// Creates an empty descriptor.
    pub fn new(id: impl Into<DescriptorId>) -> Self {
        Self {
            id: id.into(),
            action_name: None,
            base_url: None,
            protocol: None,
            port: None,
            base_path: None,
            resource_path: None,
            query_params: IndexMap::new(),
            fragment: None,
            http_method: None,
            http_headers: IndexMap::new(),
            placeholders: IndexMap::new(),
            disable_default_validation: false,
            validator: None,
            preprocess: None,
        }
    }

    /// Sets the action name.
    #[must_use]
    pub fn with_action_name(mut self, action_name: impl Into<String>) -> Self {
        self.action_name = Some(action_name.into());
        self
    }

    /// Sets a URL that is split into the call before the other URL parts are applied.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
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

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Sets the fragment.
    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
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

    /// Marks the validator of this descriptor as disabled unless explicitly enabled.
    #[must_use]
    pub fn with_disable_default_validation(mut self, disabled: bool) -> Self {
        self.disable_default_validation = disabled;
        self
    }

    /// Sets the validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Declares the preprocess hook.
    #[must_use]
    pub fn with_preprocess(mut self, declaration: HookDeclaration) -> Self {
        self.preprocess = Some(declaration);
        self
    }
}

// Getters
impl ResourceDescriptor {
    /// The descriptor identity.
    pub fn id(&self) -> &DescriptorId {
        &self.id
    }

    /// The action name.
    pub fn action_name(&self) -> Option<&str> {
        self.action_name.as_deref()
    }

    /// The URL split before the other URL parts.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
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

    /// The query parameters.
    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query_params
    }

    /// The fragment.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The HTTP method.
    pub fn http_method(&self) -> Option<HttpMethod> {
        self.http_method
    }

    /// The HTTP headers.
    pub fn http_headers(&self) -> &IndexMap<String, String> {
        &self.http_headers
    }

    /// The placeholders.
    pub fn placeholders(&self) -> &IndexMap<String, String> {
        &self.placeholders
    }

    /// Whether the validator is disabled unless explicitly enabled.
    pub fn disable_default_validation(&self) -> bool {
        self.disable_default_validation
    }

    /// The validator.
    pub fn validator(&self) -> Option<&Arc<dyn Validator>> {
        self.validator.as_ref()
    }

    /// The preprocess hook declaration.
    pub fn preprocess(&self) -> Option<&HookDeclaration> {
        self.preprocess.as_ref()
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("id", &self.id)
            .field("action_name", &self.action_name)
            .field("base_url", &self.base_url)
            .field("protocol", &self.protocol)
            .field("port", &self.port)
            .field("base_path", &self.base_path)
            .field("resource_path", &self.resource_path)
            .field("query_params", &self.query_params)
            .field("fragment", &self.fragment)
            .field("http_method", &self.http_method)
            .field("http_headers", &self.http_headers)
            .field("placeholders", &self.placeholders)
            .field("disable_default_validation", &self.disable_default_validation)
            .field("validator", &self.validator.is_some())
            .field("preprocess", &self.preprocess)
            .finish()
    }
}

/// Yields the descriptor of a resource.
///
/// Implemented by the types standing for REST resources, so a call can be configured
/// from a type:
///
/// ```rust
/// use restcall_core::{DescriptorReader, HttpMethod, ResourceDescriptor};
///
/// struct Users;
///
/// impl DescriptorReader for Users {
///     fn descriptor(&self) -> ResourceDescriptor {
///         ResourceDescriptor::new("users")
///             .with_resource_path("users")
///             .with_http_method(HttpMethod::Get)
///     }
/// }
///
/// assert_eq!(Users.descriptor().resource_path(), Some("users"));
/// ```
pub trait DescriptorReader {
    /// Returns the descriptor.
    fn descriptor(&self) -> ResourceDescriptor;
}

impl DescriptorReader for ResourceDescriptor {
    fn descriptor(&self) -> ResourceDescriptor {
        self.clone()
    }
}

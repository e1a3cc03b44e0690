use std::sync::Arc;

mod builder;
pub use self::builder::RestClientBuilder;

mod call;
pub use self::call::RestCall;

mod url;
pub use self::url::{CallUrl, DEFAULT_PROTOCOL, normalize_separators, sanitize_path_segment};

mod placeholder;
pub use self::placeholder::{substitute, substitute_opt};

mod config;
pub use self::config::{ConfigError, ConfigSource, Properties};

mod settings;
pub use self::settings::{DEFAULT_PREFIX, GlobalSettings, parse_pairs};

mod descriptor;
pub use self::descriptor::{DescriptorId, DescriptorReader, ResourceDescriptor};

mod validation;
pub use self::validation::{ValidationDispatcher, ValidationError, Validator};

mod preprocess;
pub use self::preprocess::{
    HookDeclaration, HookFactory, HookRegistry, PreprocessHook, hook_factory,
};

mod context;
pub use self::context::{CallRecord, ExecutionContext, HookSource, SessionId, SessionRegistry};

mod executor;
#[cfg(feature = "reqwest")]
pub use self::executor::ReqwestExecutor;
pub use self::executor::{HttpExecutor, HttpRequest, HttpResponse, ResponseHeader, TransportError};

mod response;
pub use self::response::JsonDocument;

mod auth;
pub use self::auth::{Credentials, CredentialsError, SecureString};

mod method;
pub use self::method::HttpMethod;

mod error;
pub use self::error::RestCallError;

/// Entry point creating [`RestCall`]s that share settings, executor and hooks.
///
/// The global settings are read once when the client is built, every call created by
/// the client starts from them. Cloning a client is cheap.
///
/// ```rust
/// use restcall_core::testing::MockExecutor;
/// use restcall_core::{GlobalSettings, HttpMethod, ResourceDescriptor, RestClient};
///
/// # fn main() -> Result<(), restcall_core::RestCallError> {
/// let client = RestClient::builder()
///     .with_settings(GlobalSettings::default().with_host("api.example.com"))
///     .with_executor(MockExecutor::default())
///     .build()?;
///
/// let users = ResourceDescriptor::new("users")
///     .with_resource_path("users")
///     .with_http_method(HttpMethod::Get);
///
/// let call = client.call_with([&users]);
/// assert_eq!(call.url().as_deref(), Some("api.example.com/users"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    settings: Arc<GlobalSettings>,
    executor: Arc<dyn HttpExecutor>,
    hooks: Arc<HookRegistry>,
}

// Create
impl RestClient {
    /// Creates a builder.
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    /// The global settings.
    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// The hook registry.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }
}

// Calls
impl RestClient {
    /// Creates a call configured by the global settings only.
    pub fn call(&self) -> RestCall {
        RestCall::build(
            Arc::clone(&self.settings),
            Arc::clone(&self.executor),
            Arc::clone(&self.hooks),
        )
    }

    /// Creates a call and splits a URL into it, after the global settings.
    pub fn call_url(&self, url: &str) -> RestCall {
        let mut result = self.call();
        result.set_url(url);
        result
    }

    /// Creates a call and applies descriptors in order, after the global settings.
    pub fn call_with<'a>(
        &self,
        descriptors: impl IntoIterator<Item = &'a ResourceDescriptor>,
    ) -> RestCall {
        let mut result = self.call();
        for descriptor in descriptors {
            result.apply_descriptor(descriptor);
        }
        result
    }
}

use std::fmt::Debug;
use std::sync::Arc;

use super::config::{ConfigError, ConfigSource};
use super::executor::HttpExecutor;
use super::preprocess::{HookFactory, HookRegistry};
use super::settings::GlobalSettings;
use super::{RestCallError, RestClient};

/// Builder for [`RestClient`].
///
/// # Default Configuration
///
/// - **Settings**: [`GlobalSettings::default`], no URL part, validation enabled
/// - **Executor**: none, except with the `reqwest` feature where a default
///   `ReqwestExecutor` is used
/// - **Hooks**: empty registry
///
/// # Example
///
/// ```rust
/// use restcall_core::testing::MockExecutor;
/// use restcall_core::{Properties, RestCall, RestClient, hook_factory};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let properties = Properties::parse(
///     "
///     restcall.host = api.example.com
///     restcall.preprocess.class = auth
///     ",
/// );
///
/// let client = RestClient::builder()
///     .with_config_source(&properties)?
///     .with_executor(MockExecutor::default())
///     .register_hook(
///         "auth",
///         hook_factory(|| |call: &mut RestCall| {
///             call.add_http_header("Authorization", "Bearer token");
///         }),
///     )
///     .build()?;
///
/// assert_eq!(client.settings().host(), Some("api.example.com"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct RestClientBuilder {
    settings: GlobalSettings,
    executor: Option<Arc<dyn HttpExecutor>>,
    hooks: HookRegistry,
}

impl RestClientBuilder {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::MissingExecutor`] when no executor is configured and
    /// the `reqwest` feature is disabled.
    pub fn build(self) -> Result<RestClient, RestCallError> {
        let executor = match self.executor {
            Some(executor) => executor,
            None => Self::default_executor()?,
        };

        Ok(RestClient {
            settings: Arc::new(self.settings),
            executor,
            hooks: Arc::new(self.hooks),
        })
    }

    #[cfg(feature = "reqwest")]
    #[allow(clippy::unnecessary_wraps)]
    fn default_executor() -> Result<Arc<dyn HttpExecutor>, RestCallError> {
        Ok(Arc::new(super::executor::ReqwestExecutor::default()))
    }

    #[cfg(not(feature = "reqwest"))]
    fn default_executor() -> Result<Arc<dyn HttpExecutor>, RestCallError> {
        Err(RestCallError::MissingExecutor)
    }

    /// Uses these global settings.
    #[must_use]
    pub fn with_settings(mut self, settings: GlobalSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Reads the global settings from a configuration source, under `restcall.`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a typed value cannot be parsed.
    pub fn with_config_source(mut self, source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        self.settings = GlobalSettings::from_source(source)?;
        Ok(self)
    }

    /// Uses this HTTP executor.
    #[must_use]
    pub fn with_executor(self, executor: impl HttpExecutor + 'static) -> Self {
        self.with_shared_executor(Arc::new(executor))
    }

    /// Uses this shared HTTP executor.
    #[must_use]
    pub fn with_shared_executor(mut self, executor: Arc<dyn HttpExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Registers a hook factory, resolvable from the `preprocess.class` setting.
    #[must_use]
    pub fn register_hook(mut self, name: impl Into<String>, factory: HookFactory) -> Self {
        self.hooks.register(name, factory);
        self
    }
}

impl Debug for RestClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClientBuilder")
            .field("settings", &self.settings)
            .field("executor", &self.executor)
            .field("hooks", &self.hooks)
            .finish()
    }
}

//! # RestCall Core
//!
//! Configure, compose and validate outbound REST calls from layered settings.
//!
//! A [`RestCall`] is configured by three layers, each overriding the previous one:
//! - **[`GlobalSettings`]** - read once from a [`ConfigSource`] when the [`RestClient`] is built
//! - **[`ResourceDescriptor`]s** - reusable declarations applied in order
//! - **setters** - programmatic calls on the [`RestCall`] itself
//!
//! On execution, the call runs its preprocess hook, composes the URL from its
//! [`CallUrl`] model, substitutes `${name}` placeholders, performs the request through
//! an [`HttpExecutor`] and finally runs the active [`Validator`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use restcall_core::testing::MockExecutor;
//! use restcall_core::{ExecutionContext, HttpResponse, Properties, RestClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let properties = Properties::parse(
//!     "
//!     restcall.host = api.example.com
//!     restcall.basePath = v1
//!     restcall.http.headers = Accept:application/json
//!     ",
//! );
//!
//! let executor = MockExecutor::new(
//!     HttpResponse::new(200).with_body(r#"{"id": 42, "name": "Ada"}"#),
//! );
//! let client = RestClient::builder()
//!     .with_config_source(&properties)?
//!     .with_executor(executor.clone())
//!     .build()?;
//!
//! let mut ctx = ExecutionContext::new();
//! let mut call = client.call();
//! call.set_resource_path("users/${id}")
//!     .add_placeholder("id", "42")
//!     .get(&mut ctx)?;
//!
//! assert_eq!(call.url().as_deref(), Some("api.example.com/v1/users/42"));
//! assert_eq!(call.response_status_code()?, 200);
//! assert!(call.response_body_as_json()?.exists("$.name")?);
//!
//! let request = executor.last_request().expect("a request");
//! assert_eq!(request.headers.get("Accept").map(String::as_str), Some("application/json"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Descriptors
//!
//! ```rust
//! use restcall_core::testing::MockExecutor;
//! use restcall_core::{HttpMethod, ResourceDescriptor, RestClient};
//!
//! # fn main() -> Result<(), restcall_core::RestCallError> {
//! let client = RestClient::builder()
//!     .with_executor(MockExecutor::default())
//!     .build()?;
//!
//! let service = ResourceDescriptor::new("service")
//!     .with_base_url("https://api.example.com:8443")
//!     .with_base_path("v2")
//!     .with_http_header("Accept", "application/json");
//! let orders = ResourceDescriptor::new("orders")
//!     .with_resource_path("orders")
//!     .with_http_method(HttpMethod::Get);
//!
//! let call = client.call_with([&service, &orders]);
//! assert_eq!(
//!     call.url().as_deref(),
//!     Some("https://api.example.com:8443/v2/orders")
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `reqwest`: provides `ReqwestExecutor`, a blocking executor used by default when
//!   the builder has no executor.

mod client;

pub mod testing;

pub use self::client::{
    CallRecord, CallUrl, ConfigError, ConfigSource, Credentials, CredentialsError,
    DEFAULT_PREFIX, DEFAULT_PROTOCOL, DescriptorId, DescriptorReader, ExecutionContext,
    GlobalSettings, HookDeclaration, HookFactory, HookRegistry, HookSource, HttpExecutor,
    HttpMethod, HttpRequest, HttpResponse, JsonDocument, PreprocessHook, Properties,
    ResourceDescriptor, ResponseHeader, RestCall, RestCallError, RestClient, RestClientBuilder,
    SecureString, SessionId, SessionRegistry, TransportError, ValidationDispatcher,
    ValidationError, Validator, hook_factory, normalize_separators, parse_pairs,
    sanitize_path_segment, substitute, substitute_opt,
};

#[cfg(feature = "reqwest")]
pub use self::client::ReqwestExecutor;

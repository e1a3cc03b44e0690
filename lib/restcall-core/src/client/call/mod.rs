use std::sync::Arc;

use indexmap::IndexMap;

use super::executor::HttpExecutor;
use super::preprocess::{AssignedHook, HookDeclaration, HookRegistry};
use super::response::ResponseView;
use super::settings::GlobalSettings;
use super::url::CallUrl;
use super::validation::ValidationDispatcher;
use super::HttpMethod;

mod accessors;
mod builder;
mod execution;

/// The configuration of one outbound REST call, and its outcome once executed.
///
/// A call is created by a [`RestClient`](super::RestClient) and configured in three
/// layers, each one overriding the previous one field by field:
///
/// 1. the global settings of the client, applied at creation,
/// 2. resource descriptors, see [`apply_descriptor`](Self::apply_descriptor),
/// 3. explicit setters such as [`set_host`](Self::set_host).
///
/// Within a layer only non-empty values override: a setter given an empty value does
/// nothing, it never resets a field.
///
/// # Method Groups
///
/// ## Descriptors
/// - [`apply_descriptor`](Self::apply_descriptor), [`apply`](Self::apply)
/// - [`apply_descriptor_with_validation`](Self::apply_descriptor_with_validation)
///
/// ## URL
/// - [`set_url`](Self::set_url) splits a raw URL into the call
/// - [`set_protocol`](Self::set_protocol), [`set_host`](Self::set_host),
///   [`set_port`](Self::set_port), [`set_base_path`](Self::set_base_path),
///   [`set_resource_path`](Self::set_resource_path), [`set_fragment`](Self::set_fragment)
/// - [`add_query_param`](Self::add_query_param) and the matching removals
/// - [`set_credentials`](Self::set_credentials)
///
/// ## Request
/// - [`set_http_method`](Self::set_http_method), [`set_request_body`](Self::set_request_body)
/// - [`add_http_header`](Self::add_http_header), [`add_placeholder`](Self::add_placeholder)
///   and the matching removals
///
/// ## Execution
/// - [`process`](Self::process) and the verbs [`get`](Self::get), [`post`](Self::post), ...
///
/// ## Response
/// - [`response_status_code`](Self::response_status_code),
///   [`response_body_as_json`](Self::response_body_as_json), ...
///
/// # Example
///
/// ```rust
/// use restcall_core::testing::MockExecutor;
/// use restcall_core::{ExecutionContext, HttpResponse, RestClient};
///
/// # fn main() -> Result<(), restcall_core::RestCallError> {
/// let executor = MockExecutor::new(HttpResponse::new(200).with_body(r#"{"id": 42}"#));
/// let client = RestClient::builder().with_executor(executor.clone()).build()?;
/// let mut ctx = ExecutionContext::new();
///
/// let mut call = client.call_url("https://api.example.com/users/${id}");
/// call.add_placeholder("id", "42");
///
/// assert_eq!(call.url().as_deref(), Some("https://api.example.com/users/42"));
///
/// call.get(&mut ctx)?;
/// assert_eq!(call.response_status_code()?, 200);
/// assert!(call.response_body_as_json()?.exists("/id")?);
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct RestCall {
    #[debug(skip)]
    pub(super) settings: Arc<GlobalSettings>,
    #[debug(skip)]
    pub(super) executor: Arc<dyn HttpExecutor>,
    #[debug(skip)]
    pub(super) hooks: Arc<HookRegistry>,

    pub(super) action_name: String,
    pub(super) url: CallUrl,
    pub(super) http_method: Option<HttpMethod>,
    pub(super) http_headers: IndexMap<String, String>,
    pub(super) placeholders: IndexMap<String, String>,
    #[debug(ignore)]
    pub(super) request_body: Option<String>,

    pub(super) validation: ValidationDispatcher,
    pub(super) assigned_hook: Option<AssignedHook>,
    pub(super) declared_hook: Option<HookDeclaration>,

    #[debug(skip)]
    pub(super) response: Option<ResponseView>,
}

use indexmap::IndexMap;

use super::RestCall;
use crate::client::HttpMethod;
use crate::client::auth::Credentials;
use crate::client::context::HookSource;
use crate::client::error::RestCallError;
use crate::client::executor::ResponseHeader;
use crate::client::placeholder::{substitute, substitute_opt};
use crate::client::response::{JsonDocument, ResponseView};
use crate::client::url::CallUrl;
use crate::client::validation::ValidationDispatcher;

// Request
impl RestCall {
    /// The action name, falling back to the resource path when unset.
    pub fn action_name(&self) -> &str {
        if self.action_name.is_empty() {
            self.url.resource_path()
        } else {
            &self.action_name
        }
    }

    /// The composed URL with placeholders substituted, `None` without host.
    pub fn url(&self) -> Option<String> {
        let url = self.url.compose()?;
        Some(substitute(&url, &self.placeholders).into_owned())
    }

    /// Source and reuse flag of the preprocess hook the next execution starts from.
    ///
    /// Same order as an execution: assigned hook, then declared hook, then the hook
    /// configured in the global settings when the client registered it. The instance an
    /// execution context may retain is not considered.
    pub fn preprocess_hook(&self) -> Option<(HookSource, bool)> {
        if let Some(assigned) = &self.assigned_hook {
            return Some((HookSource::Assigned, assigned.reuse_instance));
        }
        if let Some(declared) = &self.declared_hook {
            let source = HookSource::Named(declared.name().to_string());
            return Some((source, declared.reuse_instance()));
        }
        let (name, reuse_instance) = self.settings.preprocess_hook()?;
        self.hooks
            .contains(name)
            .then(|| (HookSource::Named(name.to_string()), reuse_instance))
    }

    /// The structured URL, placeholders not substituted.
    pub fn url_model(&self) -> &CallUrl {
        &self.url
    }

    /// The protocol, `http` when unset.
    pub fn protocol(&self) -> &str {
        self.url.protocol()
    }

    /// The host.
    pub fn host(&self) -> &str {
        self.url.host()
    }

    /// The port.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// The base path.
    pub fn base_path(&self) -> &str {
        self.url.base_path()
    }

    /// The resource path.
    pub fn resource_path(&self) -> &str {
        self.url.resource_path()
    }

    /// The query parameters.
    pub fn query_params(&self) -> &IndexMap<String, String> {
        self.url.query_params()
    }

    /// A query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.url.query_param(name)
    }

    /// The fragment.
    pub fn fragment(&self) -> &str {
        self.url.fragment()
    }

    /// The credentials.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.url.credentials()
    }

    /// The HTTP method.
    pub fn http_method(&self) -> Option<HttpMethod> {
        self.http_method
    }

    /// The HTTP headers.
    pub fn http_headers(&self) -> &IndexMap<String, String> {
        &self.http_headers
    }

    /// An HTTP header.
    pub fn http_header(&self, name: &str) -> Option<&str> {
        self.http_headers.get(name).map(String::as_str)
    }

    /// The placeholders.
    pub fn placeholders(&self) -> &IndexMap<String, String> {
        &self.placeholders
    }

    /// A placeholder.
    pub fn placeholder(&self, name: &str) -> Option<&str> {
        self.placeholders.get(name).map(String::as_str)
    }

    /// The request body with placeholders substituted.
    pub fn request_body(&self) -> Option<String> {
        substitute_opt(self.request_body.as_deref(), &self.placeholders)
    }

    /// Returns `true` if a request body is set.
    pub fn has_request_body(&self) -> bool {
        self.request_body.is_some()
    }

    /// The validators and their activation state.
    pub fn validation(&self) -> &ValidationDispatcher {
        &self.validation
    }
}

// Response
impl RestCall {
    /// Returns `true` once the call has been executed.
    pub fn is_executed(&self) -> bool {
        self.response.is_some()
    }

    fn executed(&self, accessor: &'static str) -> Result<&ResponseView, RestCallError> {
        self.response
            .as_ref()
            .ok_or(RestCallError::NotYetExecuted { accessor })
    }

    /// The response status code.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::NotYetExecuted`] before the call is executed.
    pub fn response_status_code(&self) -> Result<u16, RestCallError> {
        let response = self.executed("RestCall::response_status_code")?;
        Ok(response.status_code())
    }

    /// The response status message.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::NotYetExecuted`] before the call is executed.
    pub fn response_status_message(&self) -> Result<&str, RestCallError> {
        let response = self.executed("RestCall::response_status_message")?;
        Ok(response.status_message())
    }

    /// Every response header, in reception order.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::NotYetExecuted`] before the call is executed.
    pub fn response_headers(&self) -> Result<&[ResponseHeader], RestCallError> {
        let response = self.executed("RestCall::response_headers")?;
        Ok(response.headers())
    }

    /// The first response header with this name, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::NotYetExecuted`] before the call is executed.
    pub fn response_header(&self, name: &str) -> Result<Option<&str>, RestCallError> {
        let response = self.executed("RestCall::response_header")?;
        Ok(response.header(name))
    }

    /// The `Content-Type` response header.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::NotYetExecuted`] before the call is executed.
    pub fn response_content_type(&self) -> Result<Option<&str>, RestCallError> {
        let response = self.executed("RestCall::response_content_type")?;
        Ok(response.header("Content-Type"))
    }

    /// The `ETag` response header.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::NotYetExecuted`] before the call is executed.
    pub fn response_etag(&self) -> Result<Option<&str>, RestCallError> {
        let response = self.executed("RestCall::response_etag")?;
        Ok(response.header("ETag"))
    }

    /// The response body as text.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::NotYetExecuted`] before the call is executed.
    pub fn response_body_as_string(&self) -> Result<&str, RestCallError> {
        let response = self.executed("RestCall::response_body_as_string")?;
        Ok(response.body())
    }

    /// The response body as a JSON document, parsed on first access.
    ///
    /// # Errors
    ///
    /// Returns [`RestCallError::NotYetExecuted`] before the call is executed, and
    /// [`RestCallError::JsonError`] if the body is not JSON.
    pub fn response_body_as_json(&self) -> Result<&JsonDocument, RestCallError> {
        let response = self.executed("RestCall::response_body_as_json")?;
        response.document()
    }
}

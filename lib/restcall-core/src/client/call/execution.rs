use std::sync::Arc;

use tracing::{debug, info_span};

use super::RestCall;
use crate::client::context::ExecutionContext;
use crate::client::error::RestCallError;
use crate::client::executor::HttpRequest;
use crate::client::preprocess::{HookCandidates, PreprocessHook};
use crate::client::response::ResponseView;
use crate::client::HttpMethod;

impl RestCall {
    /// Executes the call with its configured HTTP method.
    ///
    /// The steps are, in order:
    /// 1. drop the response of a previous execution,
    /// 2. check the method is set and supported by the executor,
    /// 3. run the preprocess hook resolved for this call and context,
    /// 4. compose the URL and the body, substituting placeholders,
    /// 5. perform the request and store the response,
    /// 6. record the call as the previous call of the context,
    /// 7. run the active validators.
    ///
    /// # Errors
    ///
    /// - [`RestCallError::MethodNotSet`] without HTTP method
    /// - [`RestCallError::UnsupportedMethod`] if the executor does not support the method
    /// - [`RestCallError::MissingHost`] if the URL has no host
    /// - [`RestCallError::Transport`] if the request fails
    /// - [`RestCallError::Validation`] if a validator rejects the response, the response
    ///   stays available
    pub fn process(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.response = None;
        self.check_method()?;

        let span = info_span!("rest_call", action = %self.action_name(), session = %ctx.id());
        let _entered = span.enter();

        if let Some(hook) = self.resolve_hook(ctx) {
            hook.preprocess(self);
        }

        let method = self.check_method()?;
        let url = self.url().ok_or(RestCallError::MissingHost)?;
        let request = HttpRequest {
            url,
            method,
            headers: self.http_headers.clone(),
            body: self.request_body(),
        };
        debug!(
            %method,
            url = %request.redacted_url(),
            headers = ?request.redacted_headers(),
            "sending request"
        );

        let response = self.executor.execute(&request)?;
        debug!(
            status_code = response.status_code,
            status_message = %response.status_message,
            "response received"
        );

        let record = ctx.record_call(
            self.action_name().to_string(),
            method,
            request.url,
            response.status_code,
        );
        debug!(sequence = record.sequence, "call recorded");
        self.response = Some(ResponseView::new(response));

        self.validation.run(self)?;
        Ok(self)
    }

    fn check_method(&self) -> Result<HttpMethod, RestCallError> {
        let method = self.http_method.ok_or(RestCallError::MethodNotSet)?;
        if !self.executor.supports(method) {
            return Err(RestCallError::UnsupportedMethod { method });
        }
        Ok(method)
    }

    fn resolve_hook(&self, ctx: &mut ExecutionContext) -> Option<Arc<dyn PreprocessHook>> {
        HookCandidates {
            assigned: self.assigned_hook.as_ref(),
            declared: self.declared_hook.as_ref(),
            configured: self.settings.preprocess_hook(),
            registry: &self.hooks,
        }
        .resolve(ctx.hook_slot_mut())
    }

    fn process_with(
        &mut self,
        ctx: &mut ExecutionContext,
        method: HttpMethod,
    ) -> Result<&mut Self, RestCallError> {
        self.http_method = Some(method);
        self.process(ctx)
    }
}

// Verbs
impl RestCall {
    /// Executes the call as a `GET`, see [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn get(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.process_with(ctx, HttpMethod::Get)
    }

    /// Executes the call as a `POST`, see [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn post(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.process_with(ctx, HttpMethod::Post)
    }

    /// Sets the body and executes the call as a `POST`.
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn post_body(
        &mut self,
        ctx: &mut ExecutionContext,
        body: impl Into<String>,
    ) -> Result<&mut Self, RestCallError> {
        self.set_request_body(body);
        self.process_with(ctx, HttpMethod::Post)
    }

    /// Executes the call as a `PUT`, see [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn put(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.process_with(ctx, HttpMethod::Put)
    }

    /// Sets the body and executes the call as a `PUT`.
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn put_body(
        &mut self,
        ctx: &mut ExecutionContext,
        body: impl Into<String>,
    ) -> Result<&mut Self, RestCallError> {
        self.set_request_body(body);
        self.process_with(ctx, HttpMethod::Put)
    }

    /// Executes the call as a `PATCH`, see [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn patch(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.process_with(ctx, HttpMethod::Patch)
    }

    /// Sets the body and executes the call as a `PATCH`.
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn patch_body(
        &mut self,
        ctx: &mut ExecutionContext,
        body: impl Into<String>,
    ) -> Result<&mut Self, RestCallError> {
        self.set_request_body(body);
        self.process_with(ctx, HttpMethod::Patch)
    }

    /// Executes the call as a `DELETE`, see [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn delete(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.process_with(ctx, HttpMethod::Delete)
    }

    /// Executes the call as a `HEAD`, see [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn head(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.process_with(ctx, HttpMethod::Head)
    }

    /// Executes the call as an `OPTIONS`, see [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn options(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.process_with(ctx, HttpMethod::Options)
    }

    /// Executes the call as a `TRACE`, see [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub fn trace(&mut self, ctx: &mut ExecutionContext) -> Result<&mut Self, RestCallError> {
        self.process_with(ctx, HttpMethod::Trace)
    }
}
